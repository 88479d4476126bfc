//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.
//!
//! Reference solutions (`Challenge::correct_code`) never appear here.

use serde::{Deserialize, Serialize};

use crate::domain::{Badge, Challenge, ChallengeSource, Level};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    ListLevels,
    ListChallenges {
        level: String,
    },
    OpenChallenge {
        #[serde(default)]
        level: Option<String>,
        #[serde(default, rename = "challengeId")]
        challenge_id: Option<String>,
    },
    RunCode {
        code: String,
    },
    Hint {
        #[serde(rename = "challengeId")]
        challenge_id: String,
        code: String,
    },
    Submit {
        #[serde(rename = "challengeId")]
        challenge_id: String,
        code: String,
    },
    Dashboard,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Session {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    Levels {
        levels: Vec<LevelOut>,
    },
    Challenges {
        challenges: Vec<ChallengeSummaryOut>,
    },
    Challenge {
        challenge: ChallengeOut,
    },
    RunOutput {
        output: String,
    },
    Hint {
        text: String,
    },
    SubmitResult {
        result: SubmitOut,
    },
    Dashboard {
        dashboard: DashboardOut,
    },
    Error {
        message: String,
    },
}

/// Level card: what the tier is and how far the session got.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LevelOut {
    pub id: Level,
    pub title: String,
    pub description: String,
    pub completed_challenges: usize,
    pub total_challenges: usize,
    pub progress_percent: f32,
    /// Entry point of the level ("View Challenges").
    pub first_challenge_id: Option<String>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeSummaryOut {
    pub id: String,
    pub title: String,
    pub level: Level,
    pub points: u32,
    pub time_limit_minutes: u32,
    pub completed: bool,
}

/// DTO used by both WS and HTTP for challenge delivery.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeOut {
    pub id: String,
    pub title: String,
    pub description: String,
    pub level: Level,
    pub points: u32,
    pub time_limit_minutes: u32,
    pub language: String,
    pub source: ChallengeSource,
    pub initial_code: String,
    pub hints: Vec<String>,

    /// 1-based position within the level.
    pub position: usize,
    pub level_size: usize,
    pub next_challenge_id: Option<String>,
    pub completed: bool,
    /// Only present when opened within a session.
    pub time_left_secs: Option<u64>,
    pub time_left: Option<String>,
}

/// Convert full `Challenge` (internal) to the public DTO, minus session fields.
pub fn to_out(c: &Challenge, position: usize, level_size: usize, next: Option<&str>) -> ChallengeOut {
    ChallengeOut {
        id: c.id.clone(),
        title: c.title.clone(),
        description: c.description.clone(),
        level: c.level,
        points: c.points,
        time_limit_minutes: c.time_limit_minutes,
        language: c.language.clone(),
        source: c.source,
        initial_code: c.initial_code.clone(),
        hints: c.hints.clone(),

        position,
        level_size,
        next_challenge_id: next.map(str::to_string),
        completed: false,
        time_left_secs: None,
        time_left: None,
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOut {
    pub correct: bool,
    pub message: String,
    pub points_awarded: u32,
    pub total_points: u32,
    pub attempts: u32,
    pub new_badges: Vec<BadgeOut>,
    pub next_challenge_id: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct BadgeOut {
    pub id: Badge,
    pub name: String,
    pub description: String,
}

impl From<Badge> for BadgeOut {
    fn from(b: Badge) -> Self {
        BadgeOut { id: b, name: b.name().into(), description: b.description().into() }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityOut {
    pub action: String,
    pub name: String,
    pub points: u32,
    pub seconds_ago: u64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOut {
    pub session_id: String,
    pub active_secs: u64,
    pub points: u32,
    pub rank: String,
    pub overall_progress_percent: f32,
    pub levels: Vec<LevelOut>,
    pub badges: Vec<BadgeOut>,
    pub recent_activity: Vec<ActivityOut>,
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
pub struct SessionOut {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// `level` stays a raw string so unknown names reach the handler (404, not a 400 rejection).
#[derive(Debug, Deserialize)]
pub struct ChallengeQuery {
    pub level: Option<String>,
    pub id: Option<String>,
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

#[derive(Deserialize)]
pub struct RunIn {
    pub code: String,
}
#[derive(Serialize)]
pub struct RunOut {
    pub output: String,
}

#[derive(Deserialize)]
pub struct HintIn {
    #[serde(rename = "challengeId")]
    pub challenge_id: String,
    pub code: String,
}
#[derive(Serialize)]
pub struct HintOut {
    pub text: String,
}

#[derive(Deserialize)]
pub struct SubmitIn {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(rename = "challengeId")]
    pub challenge_id: String,
    pub code: String,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

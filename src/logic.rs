//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Level and challenge listings (with per-session progress)
//!   - Opening a challenge (starts the session clock)
//!   - Simulated runs, line-diff hints, and graded submissions
//!   - The dashboard summary
//!
//! Grading itself lives in `grading`; this layer looks challenges up and owns
//! every side effect (delay, points, badges, logging).

use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::domain::{Challenge, Level};
use crate::grading::{diff_hint, evaluate, simulate_run};
use crate::protocol::{
  to_out, ActivityOut, BadgeOut, ChallengeOut, ChallengeSummaryOut, DashboardOut, LevelOut, SubmitOut,
};
use crate::session::{rank_for, Session};
use crate::state::AppState;
use crate::util::{format_time, percent};

pub const CORRECT_MESSAGE: &str = "Congratulations! Your solution is correct.";
pub const RETRY_MESSAGE: &str = "Your solution is not quite right. Try again or check the hint.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LogicError {
  #[error("Unknown sessionId: {0}")]
  UnknownSession(String),
  #[error("Unknown challengeId: {0}")]
  UnknownChallenge(String),
  #[error("Unknown level: {0}")]
  UnknownLevel(String),
  #[error("Level {0} has no challenges")]
  EmptyLevel(Level),
  #[error("Either a level or a challenge id is required")]
  MissingSelector,
  #[error("sessionId is required")]
  MissingSession,
}

fn first_of(state: &AppState, level: Level) -> Result<&Challenge, LogicError> {
  state.first_challenge(level).ok_or(LogicError::EmptyLevel(level))
}

/// Parse a level name coming from a path, query, or WS message.
pub fn parse_level(raw: &str) -> Result<Level, LogicError> {
  raw.parse::<Level>().map_err(|_| LogicError::UnknownLevel(raw.to_string()))
}

fn level_out(state: &AppState, level: Level, session: Option<&Session>) -> LevelOut {
  let ids = state.level_ids(level);
  let completed = session
    .map(|s| ids.iter().filter(|id| s.is_completed(id)).count())
    .unwrap_or(0);
  LevelOut {
    id: level,
    title: level.title().into(),
    description: level.description().into(),
    completed_challenges: completed,
    total_challenges: ids.len(),
    progress_percent: percent(completed, ids.len()),
    first_challenge_id: state.first_challenge(level).map(|c| c.id.clone()),
  }
}

async fn lookup_session(state: &AppState, session_id: Option<&str>) -> Result<Option<Session>, LogicError> {
  match session_id {
    Some(id) => state
      .session_snapshot(id)
      .await
      .map(Some)
      .ok_or_else(|| LogicError::UnknownSession(id.to_string())),
    None => Ok(None),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn list_levels(state: &AppState, session_id: Option<&str>) -> Result<Vec<LevelOut>, LogicError> {
  let session = lookup_session(state, session_id).await?;
  Ok(Level::ALL.iter().map(|l| level_out(state, *l, session.as_ref())).collect())
}

#[instrument(level = "info", skip(state), fields(%level))]
pub async fn list_challenges(
  state: &AppState,
  level: Level,
  session_id: Option<&str>,
) -> Result<Vec<ChallengeSummaryOut>, LogicError> {
  let session = lookup_session(state, session_id).await?;
  Ok(
    state
      .challenges_for_level(level)
      .into_iter()
      .map(|c| ChallengeSummaryOut {
        id: c.id.clone(),
        title: c.title.clone(),
        level: c.level,
        points: c.points,
        time_limit_minutes: c.time_limit_minutes,
        completed: session.as_ref().map(|s| s.is_completed(&c.id)).unwrap_or(false),
      })
      .collect(),
  )
}

/// Open a challenge by id, or the first challenge of `level`.
/// When both are given, an id outside `level` falls back to the level's
/// first challenge. With a session, the challenge clock starts on first open.
#[instrument(level = "info", skip(state))]
pub async fn open_challenge(
  state: &AppState,
  level: Option<Level>,
  challenge_id: Option<&str>,
  session_id: Option<&str>,
) -> Result<ChallengeOut, LogicError> {
  let ch = match (challenge_id, level) {
    (Some(id), Some(level)) => match state.get_challenge(id).filter(|c| c.level == level) {
      Some(c) => c,
      None => {
        warn!(target: "challenge", %id, %level, "Challenge not in level; serving first of level");
        first_of(state, level)?
      }
    },
    (Some(id), None) => state
      .get_challenge(id)
      .ok_or_else(|| LogicError::UnknownChallenge(id.to_string()))?,
    (None, Some(level)) => first_of(state, level)?,
    (None, None) => return Err(LogicError::MissingSelector),
  };

  let ids = state.level_ids(ch.level);
  let position = ids.iter().position(|id| *id == ch.id).map(|p| p + 1).unwrap_or(0);
  let next = state.next_challenge_id(ch.level, &ch.id);
  let mut out = to_out(ch, position, ids.len(), next);

  if let Some(sid) = session_id {
    let now = Instant::now();
    let (left, completed) = state
      .with_session(sid, |s| {
        s.start_challenge(ch, now);
        (s.time_left_secs(ch, now), s.is_completed(&ch.id))
      })
      .await
      .ok_or_else(|| LogicError::UnknownSession(sid.to_string()))?;
    out.time_left_secs = left;
    out.time_left = left.map(format_time);
    out.completed = completed;
  }

  info!(target: "challenge", id = %ch.id, level = %ch.level, position, "Challenge opened");
  Ok(out)
}

/// Simulated run: pause for the configured delay, then a canned diagnostic.
#[instrument(level = "info", skip(state, code), fields(code_len = code.len()))]
pub async fn run_code(state: &AppState, code: &str) -> String {
  if !state.run_delay.is_zero() {
    tokio::time::sleep(state.run_delay).await;
  }
  let diagnostic = simulate_run(code);
  debug!(target: "challenge", is_error = diagnostic.is_error(), "Simulated run");
  diagnostic.to_string()
}

#[instrument(level = "info", skip(state, code), fields(%challenge_id, code_len = code.len()))]
pub async fn hint_for(state: &AppState, challenge_id: &str, code: &str) -> Result<String, LogicError> {
  let ch = state
    .get_challenge(challenge_id)
    .ok_or_else(|| LogicError::UnknownChallenge(challenge_id.to_string()))?;
  Ok(diff_hint(code, &ch.correct_code))
}

/// Grade a final attempt and apply it to the session.
#[instrument(level = "info", skip(state, code), fields(%session_id, %challenge_id, code_len = code.len()))]
pub async fn submit(
  state: &AppState,
  session_id: &str,
  challenge_id: &str,
  code: &str,
) -> Result<SubmitOut, LogicError> {
  let ch = state
    .get_challenge(challenge_id)
    .ok_or_else(|| LogicError::UnknownChallenge(challenge_id.to_string()))?;
  let correct = evaluate(code, &ch.correct_code);
  let level_ids = state.level_ids(ch.level);
  let now = Instant::now();

  let (record, total_points) = state
    .with_session(session_id, |s| {
      let rec = s.record_submission(ch, correct, level_ids, now);
      (rec, s.points)
    })
    .await
    .ok_or_else(|| LogicError::UnknownSession(session_id.to_string()))?;

  if correct {
    info!(target: "challenge", id = %ch.id, points = record.points_awarded, newly = record.newly_completed, total_points, "Submission correct");
  } else {
    warn!(target: "challenge", id = %ch.id, attempts = record.attempts, "Submission incorrect");
  }

  Ok(SubmitOut {
    correct,
    message: (if correct { CORRECT_MESSAGE } else { RETRY_MESSAGE }).into(),
    points_awarded: record.points_awarded,
    total_points,
    attempts: record.attempts,
    new_badges: record.new_badges.into_iter().map(BadgeOut::from).collect(),
    next_challenge_id: if correct {
      state.next_challenge_id(ch.level, &ch.id).map(str::to_string)
    } else {
      None
    },
  })
}

#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn dashboard(state: &AppState, session_id: &str) -> Result<DashboardOut, LogicError> {
  let s = state
    .session_snapshot(session_id)
    .await
    .ok_or_else(|| LogicError::UnknownSession(session_id.to_string()))?;
  let now = Instant::now();

  let levels: Vec<LevelOut> = Level::ALL.iter().map(|l| level_out(state, *l, Some(&s))).collect();
  let completed: usize = levels.iter().map(|l| l.completed_challenges).sum();

  Ok(DashboardOut {
    session_id: s.id.clone(),
    active_secs: now.saturating_duration_since(s.created_at).as_secs(),
    points: s.points,
    rank: rank_for(s.points).into(),
    overall_progress_percent: percent(completed, state.total_challenges()),
    levels,
    badges: s.badges.iter().copied().map(BadgeOut::from).collect(),
    recent_activity: s
      .activity
      .iter()
      .map(|a| ActivityOut {
        action: a.kind.label().into(),
        name: a.name.clone(),
        points: a.points,
        seconds_ago: now.saturating_duration_since(a.at).as_secs(),
      })
      .collect(),
  })
}

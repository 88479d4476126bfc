//! Domain models used by the backend: levels, challenges, badges.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Difficulty tier a challenge belongs to.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Level {
  Beginner,
  Intermediate,
  Pro,
}

impl Level {
  pub const ALL: [Level; 3] = [Level::Beginner, Level::Intermediate, Level::Pro];

  pub fn as_str(&self) -> &'static str {
    match self {
      Level::Beginner => "beginner",
      Level::Intermediate => "intermediate",
      Level::Pro => "pro",
    }
  }

  pub fn title(&self) -> &'static str {
    match self {
      Level::Beginner => "Beginner Challenges",
      Level::Intermediate => "Intermediate Challenges",
      Level::Pro => "Pro Challenges",
    }
  }

  pub fn description(&self) -> &'static str {
    match self {
      Level::Beginner => "Master the basics of debugging with simple syntax and common errors.",
      Level::Intermediate => "Tackle more complex bugs involving logic errors and runtime exceptions.",
      Level::Pro => "Push your skills to the limit with advanced, multi-faceted debugging challenges.",
    }
  }
}

impl fmt::Display for Level {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Level {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "beginner" => Ok(Level::Beginner),
      "intermediate" => Ok(Level::Intermediate),
      "pro" => Ok(Level::Pro),
      other => Err(other.to_string()),
    }
  }
}

/// Where did we get the challenge from?
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeSource {
  LocalBank, // from user-provided TOML bank
  Seed,      // built-in catalog
}

/// A broken snippet plus the fixed version it is graded against.
/// Not serializable: clients only ever see `protocol::ChallengeOut`.
#[derive(Clone, Debug)]
pub struct Challenge {
  pub id: String,
  pub title: String,
  pub description: String,
  pub level: Level,
  pub points: u32,
  pub time_limit_minutes: u32,
  pub language: String,
  pub source: ChallengeSource,

  pub initial_code: String,
  /// Reference solution. Never leaves the server.
  pub correct_code: String,
  pub hints: Vec<String>,
}

/// Achievements awarded at most once per session.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
  FirstBugSquashed,
  QuickFixer,
  LevelMaster,
}

impl Badge {
  pub fn name(&self) -> &'static str {
    match self {
      Badge::FirstBugSquashed => "First Bug Squashed",
      Badge::QuickFixer => "Quick Fixer",
      Badge::LevelMaster => "Level Master",
    }
  }

  pub fn description(&self) -> &'static str {
    match self {
      Badge::FirstBugSquashed => "Fixed your first bug",
      Badge::QuickFixer => "Fixed a bug in under 2 minutes",
      Badge::LevelMaster => "Completed every challenge in a level",
    }
  }
}

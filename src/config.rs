//! Loading service configuration (run delay + optional challenge bank) from TOML.
//!
//! See `AppConfig` and `ChallengeCfg` for expected schema. Example:
//!
//! ```toml
//! run_delay_ms = 500
//!
//! [[challenges]]
//! id = "off-by-one"
//! title = "Off By One"
//! level = "intermediate"
//! points = 35
//! initial_code = "for (let i = 0; i <= n; i++) {}"
//! correct_code = "for (let i = 0; i < n; i++) {}"
//! hints = ["Count the iterations"]
//! ```

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::domain::Level;

/// Cosmetic "running..." pause before a simulated run result is returned.
pub const DEFAULT_RUN_DELAY_MS: u64 = 800;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub run_delay_ms: Option<u64>,
  #[serde(default)]
  pub challenges: Vec<ChallengeCfg>,
}

/// Challenge entry accepted in TOML configuration.
/// `correct_code` is mandatory; entries without it are skipped at startup.
#[derive(Clone, Debug, Deserialize)]
pub struct ChallengeCfg {
  #[serde(default)] pub id: Option<String>,
  pub title: String,
  #[serde(default)] pub description: String,
  pub level: Level,
  #[serde(default = "default_points")] pub points: u32,
  #[serde(default = "default_time_limit")] pub time_limit_minutes: u32,
  #[serde(default = "default_language")] pub language: String,
  #[serde(default)] pub initial_code: String,
  #[serde(default)] pub correct_code: Option<String>,
  #[serde(default)] pub hints: Vec<String>,
}

fn default_points() -> u32 { 20 }
fn default_time_limit() -> u32 { 5 }
fn default_language() -> String { "javascript".into() }

impl AppConfig {
  /// Effective run delay: `RUN_DELAY_MS` env, then the file, then the default.
  pub fn run_delay_ms(&self) -> u64 {
    match std::env::var("RUN_DELAY_MS") {
      Ok(v) => match v.parse::<u64>() {
        Ok(ms) => ms,
        Err(e) => {
          warn!(target: "bugbattle", value = %v, error = %e, "Ignoring invalid RUN_DELAY_MS");
          self.run_delay_ms.unwrap_or(DEFAULT_RUN_DELAY_MS)
        }
      },
      Err(_) => self.run_delay_ms.unwrap_or(DEFAULT_RUN_DELAY_MS),
    }
  }
}

pub fn parse_config(s: &str) -> Result<AppConfig, toml::de::Error> {
  toml::from_str::<AppConfig>(s)
}

/// Attempt to load `AppConfig` from CHALLENGE_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("CHALLENGE_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_config(&s) {
      Ok(cfg) => {
        info!(target: "bugbattle", %path, challenges = cfg.challenges.len(), "Loaded challenge config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "bugbattle", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "bugbattle", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

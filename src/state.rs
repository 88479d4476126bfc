//! Application state: challenge catalog, session store, and selection logic.
//!
//! This module owns:
//!   - the catalog (by id, by level in serving order), fixed after startup
//!   - the in-memory session store
//!   - the cosmetic run delay
//!
//! Catalog order: TOML bank entries first, then built-in seeds. A bank entry
//! with a seed's id replaces the seed.

use std::{collections::HashMap, sync::Arc, time::{Duration, Instant}};
use tokio::sync::RwLock;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::config::{load_config_from_env, AppConfig};
use crate::domain::{Challenge, ChallengeSource, Level};
use crate::seeds::seed_challenges;
use crate::session::Session;

#[derive(Clone)]
pub struct AppState {
    pub by_id: Arc<HashMap<String, Challenge>>,
    pub by_level: Arc<HashMap<Level, Vec<String>>>,
    pub sessions: Arc<RwLock<HashMap<String, Session>>>,
    pub run_delay: Duration,
}

impl AppState {
    /// Build state from env: load config, merge the bank with seeds, build indices.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_config_from_env().unwrap_or_default();
        Self::from_config(cfg)
    }

    pub fn from_config(cfg: AppConfig) -> Self {
        let run_delay = Duration::from_millis(cfg.run_delay_ms());

        let mut id_map = HashMap::<String, Challenge>::new();
        let mut level_map = HashMap::<Level, Vec<String>>::new();

        for cc in cfg.challenges {
            let id = cc.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
            let correct_code = match cc.correct_code {
                Some(s) if !s.trim().is_empty() => s,
                _ => {
                    error!(target: "challenge", %id, level = %cc.level, "Skipping bank item: missing correct_code.");
                    continue;
                }
            };
            if id_map.contains_key(&id) {
                error!(target: "challenge", %id, "Skipping bank item: duplicate id.");
                continue;
            }
            let ch = Challenge {
                id: id.clone(),
                title: cc.title,
                description: cc.description,
                level: cc.level,
                points: cc.points,
                time_limit_minutes: cc.time_limit_minutes,
                language: cc.language,
                source: ChallengeSource::LocalBank,
                initial_code: cc.initial_code,
                correct_code,
                hints: cc.hints,
            };
            level_map.entry(ch.level).or_default().push(id.clone());
            id_map.insert(id, ch);
        }

        // Seeds never overwrite bank entries.
        for c in seed_challenges() {
            if id_map.contains_key(&c.id) {
                continue;
            }
            level_map.entry(c.level).or_default().push(c.id.clone());
            id_map.insert(c.id.clone(), c);
        }

        for level in Level::ALL {
            let ids = level_map.get(&level).map(Vec::as_slice).unwrap_or_default();
            let bank = ids
                .iter()
                .filter(|id| id_map.get(*id).map(|c| c.source == ChallengeSource::LocalBank).unwrap_or(false))
                .count();
            info!(target: "challenge", %level, local_bank = bank, seed = ids.len() - bank, "Startup challenge inventory");
        }
        info!(target: "bugbattle", run_delay_ms = run_delay.as_millis() as u64, "Simulated run delay");

        Self {
            by_id: Arc::new(id_map),
            by_level: Arc::new(level_map),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            run_delay,
        }
    }

    #[cfg(test)]
    pub fn with_run_delay(mut self, delay: Duration) -> Self {
        self.run_delay = delay;
        self
    }

    /// Read-only access to a challenge by id.
    pub fn get_challenge(&self, id: &str) -> Option<&Challenge> {
        self.by_id.get(id)
    }

    /// Ids of a level in serving order.
    pub fn level_ids(&self, level: Level) -> &[String] {
        self.by_level.get(&level).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn challenges_for_level(&self, level: Level) -> Vec<&Challenge> {
        self.level_ids(level)
            .iter()
            .filter_map(|id| self.by_id.get(id))
            .collect()
    }

    pub fn total_challenges(&self) -> usize {
        self.by_id.len()
    }

    /// Entry point of a level: what is served when no id is asked for.
    pub fn first_challenge(&self, level: Level) -> Option<&Challenge> {
        self.level_ids(level).first().and_then(|id| self.by_id.get(id))
    }

    /// The challenge after `current_id` within its level; `None` at the end.
    pub fn next_challenge_id(&self, level: Level, current_id: &str) -> Option<&str> {
        let ids = self.level_ids(level);
        let pos = ids.iter().position(|id| id == current_id)?;
        ids.get(pos + 1).map(String::as_str)
    }

    /// Create an anonymous progress context and return its id.
    #[instrument(level = "info", skip(self))]
    pub async fn open_session(&self) -> String {
        let session = Session::new(Instant::now());
        let id = session.id.clone();
        self.sessions.write().await.insert(id.clone(), session);
        info!(target: "bugbattle", session = %id, "Session opened");
        id
    }

    /// Run `f` against a session under the write lock. `None` if unknown.
    pub async fn with_session<R>(&self, id: &str, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(id).map(f)
    }

    pub async fn session_snapshot(&self, id: &str) -> Option<Session> {
        self.sessions.read().await.get(id).cloned()
    }

    pub async fn close_session(&self, id: &str) {
        if self.sessions.write().await.remove(id).is_some() {
            info!(target: "bugbattle", session = %id, "Session closed");
        }
    }
}

//! Per-user progress context: points, completed challenges, badges, activity.
//!
//! A `Session` is plain data owned by the session store in `AppState`.
//! Callers pass `now` explicitly so the clock-dependent rules (time limit,
//! quick-fix badge) stay deterministic under test.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::domain::{Badge, Challenge};

/// Completing within this window of opening a challenge earns `QuickFixer`.
pub const QUICK_FIX_WINDOW: Duration = Duration::from_secs(120);
const ACTIVITY_CAP: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivityKind {
  Started,
  Completed,
  EarnedBadge,
}

impl ActivityKind {
  pub fn label(&self) -> &'static str {
    match self {
      ActivityKind::Started => "Started challenge",
      ActivityKind::Completed => "Completed challenge",
      ActivityKind::EarnedBadge => "Earned badge",
    }
  }
}

#[derive(Clone, Debug)]
pub struct Activity {
  pub kind: ActivityKind,
  pub name: String,
  pub points: u32,
  pub at: Instant,
}

/// What a single submission changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubmissionRecord {
  pub newly_completed: bool,
  pub points_awarded: u32,
  pub new_badges: Vec<Badge>,
  pub attempts: u32,
}

#[derive(Clone, Debug)]
pub struct Session {
  pub id: String,
  pub created_at: Instant,
  pub points: u32,
  pub completed: Vec<String>,
  pub attempts: HashMap<String, u32>,
  pub started: HashMap<String, Instant>,
  pub badges: Vec<Badge>,
  /// Most recent first.
  pub activity: VecDeque<Activity>,
}

impl Session {
  pub fn new(now: Instant) -> Self {
    Self {
      id: Uuid::new_v4().to_string(),
      created_at: now,
      points: 0,
      completed: Vec::new(),
      attempts: HashMap::new(),
      started: HashMap::new(),
      badges: Vec::new(),
      activity: VecDeque::new(),
    }
  }

  pub fn is_completed(&self, challenge_id: &str) -> bool {
    self.completed.iter().any(|id| id == challenge_id)
  }

  pub fn has_badge(&self, badge: Badge) -> bool {
    self.badges.contains(&badge)
  }

  /// Start the clock for a challenge. Re-opening keeps the first start time.
  pub fn start_challenge(&mut self, challenge: &Challenge, now: Instant) {
    if self.started.contains_key(&challenge.id) {
      return;
    }
    self.started.insert(challenge.id.clone(), now);
    self.push_activity(ActivityKind::Started, &challenge.title, 0, now);
  }

  /// Seconds left on the challenge timer; `None` if it was never opened.
  pub fn time_left_secs(&self, challenge: &Challenge, now: Instant) -> Option<u64> {
    let start = self.started.get(&challenge.id)?;
    let limit = u64::from(challenge.time_limit_minutes) * 60;
    let elapsed = now.saturating_duration_since(*start).as_secs();
    Some(limit.saturating_sub(elapsed))
  }

  /// Apply a graded submission. Points and badges are only granted the first
  /// time a challenge is solved. `level_ids` lists every challenge of the
  /// challenge's level and drives `LevelMaster`.
  pub fn record_submission(
    &mut self,
    challenge: &Challenge,
    correct: bool,
    level_ids: &[String],
    now: Instant,
  ) -> SubmissionRecord {
    let attempts = {
      let n = self.attempts.entry(challenge.id.clone()).or_insert(0);
      *n += 1;
      *n
    };

    if !correct || self.is_completed(&challenge.id) {
      return SubmissionRecord { attempts, ..Default::default() };
    }

    self.completed.push(challenge.id.clone());
    self.points += challenge.points;
    self.push_activity(ActivityKind::Completed, &challenge.title, challenge.points, now);

    let mut earned = Vec::new();
    if !self.has_badge(Badge::FirstBugSquashed) {
      earned.push(Badge::FirstBugSquashed);
    }
    let quick = self
      .started
      .get(&challenge.id)
      .map(|start| now.saturating_duration_since(*start) <= QUICK_FIX_WINDOW)
      .unwrap_or(false);
    if quick && !self.has_badge(Badge::QuickFixer) {
      earned.push(Badge::QuickFixer);
    }
    let level_done = !level_ids.is_empty() && level_ids.iter().all(|id| self.is_completed(id));
    if level_done && !self.has_badge(Badge::LevelMaster) {
      earned.push(Badge::LevelMaster);
    }

    for badge in &earned {
      self.badges.push(*badge);
      self.push_activity(ActivityKind::EarnedBadge, badge.name(), 0, now);
    }

    SubmissionRecord {
      newly_completed: true,
      points_awarded: challenge.points,
      new_badges: earned,
      attempts,
    }
  }

  fn push_activity(&mut self, kind: ActivityKind, name: &str, points: u32, at: Instant) {
    self.activity.push_front(Activity { kind, name: name.to_string(), points, at });
    self.activity.truncate(ACTIVITY_CAP);
  }
}

/// Rank title by accumulated points.
pub fn rank_for(points: u32) -> &'static str {
  match points {
    0..=99 => "Bug Spotter",
    100..=299 => "Bug Hunter",
    300..=599 => "Code Detective",
    _ => "Debug Master",
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::seeds::seed_challenges;

  fn challenge(id: &str) -> Challenge {
    seed_challenges().into_iter().find(|c| c.id == id).unwrap()
  }

  fn beginner_ids() -> Vec<String> {
    vec!["syntax-error".into(), "variable-typo".into()]
  }

  #[test]
  fn wrong_answer_only_counts_attempt() {
    let now = Instant::now();
    let mut s = Session::new(now);
    let c = challenge("syntax-error");
    let rec = s.record_submission(&c, false, &beginner_ids(), now);
    assert_eq!(rec, SubmissionRecord { attempts: 1, ..Default::default() });
    assert_eq!(s.points, 0);
    assert!(s.completed.is_empty());
  }

  #[test]
  fn first_solve_awards_points_once() {
    let now = Instant::now();
    let mut s = Session::new(now);
    let c = challenge("syntax-error");
    let first = s.record_submission(&c, true, &beginner_ids(), now);
    assert!(first.newly_completed);
    assert_eq!(first.points_awarded, 20);
    assert_eq!(first.new_badges, vec![Badge::FirstBugSquashed]);

    let again = s.record_submission(&c, true, &beginner_ids(), now);
    assert!(!again.newly_completed);
    assert_eq!(again.points_awarded, 0);
    assert_eq!(again.attempts, 2);
    assert_eq!(s.points, 20);
  }

  #[test]
  fn quick_fix_requires_started_clock_inside_window() {
    let t0 = Instant::now();
    let mut s = Session::new(t0);
    let fast = challenge("syntax-error");
    s.start_challenge(&fast, t0);
    let rec = s.record_submission(&fast, true, &beginner_ids(), t0 + Duration::from_secs(30));
    assert!(rec.new_badges.contains(&Badge::QuickFixer));

    let mut slow_session = Session::new(t0);
    slow_session.start_challenge(&fast, t0);
    let rec = slow_session.record_submission(&fast, true, &beginner_ids(), t0 + Duration::from_secs(121));
    assert!(!rec.new_badges.contains(&Badge::QuickFixer));

    let mut unopened = Session::new(t0);
    let rec = unopened.record_submission(&fast, true, &beginner_ids(), t0);
    assert!(!rec.new_badges.contains(&Badge::QuickFixer));
  }

  #[test]
  fn level_master_after_whole_level() {
    let now = Instant::now();
    let mut s = Session::new(now);
    let a = s.record_submission(&challenge("syntax-error"), true, &beginner_ids(), now);
    assert!(!a.new_badges.contains(&Badge::LevelMaster));
    let b = s.record_submission(&challenge("variable-typo"), true, &beginner_ids(), now);
    assert_eq!(b.new_badges, vec![Badge::LevelMaster]);
    assert_eq!(s.points, 45);
    assert_eq!(s.badges, vec![Badge::FirstBugSquashed, Badge::LevelMaster]);
  }

  #[test]
  fn timer_counts_down_and_floors_at_zero() {
    let t0 = Instant::now();
    let mut s = Session::new(t0);
    let c = challenge("syntax-error");
    assert_eq!(s.time_left_secs(&c, t0), None);
    s.start_challenge(&c, t0);
    s.start_challenge(&c, t0 + Duration::from_secs(100));
    assert_eq!(s.time_left_secs(&c, t0 + Duration::from_secs(61)), Some(239));
    assert_eq!(s.time_left_secs(&c, t0 + Duration::from_secs(999)), Some(0));
    assert_eq!(s.activity.len(), 1);
  }

  #[test]
  fn activity_is_newest_first_and_capped() {
    let now = Instant::now();
    let mut s = Session::new(now);
    for i in 0..30 {
      let mut c = challenge("syntax-error");
      c.id = format!("c{i}");
      c.title = format!("Challenge {i}");
      s.start_challenge(&c, now);
    }
    assert_eq!(s.activity.len(), ACTIVITY_CAP);
    assert_eq!(s.activity[0].name, "Challenge 29");
    assert_eq!(s.activity[0].kind.label(), "Started challenge");
  }

  #[test]
  fn ranks_follow_point_bands() {
    assert_eq!(rank_for(0), "Bug Spotter");
    assert_eq!(rank_for(100), "Bug Hunter");
    assert_eq!(rank_for(420), "Code Detective");
    assert_eq!(rank_for(600), "Debug Master");
  }
}

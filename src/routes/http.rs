//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{
  extract::{Path, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument, warn};

use crate::logic::{self, LogicError};
use crate::protocol::*;
use crate::state::AppState;

impl IntoResponse for LogicError {
  fn into_response(self) -> Response {
    let status = match self {
      LogicError::MissingSelector | LogicError::MissingSession => StatusCode::BAD_REQUEST,
      _ => StatusCode::NOT_FOUND,
    };
    warn!(target: "bugbattle", %status, error = %self, "Request rejected");
    (status, Json(ErrorOut { error: self.to_string() })).into_response()
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_post_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let session_id = state.open_session().await;
  Json(SessionOut { session_id })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_levels(
  State(state): State<Arc<AppState>>,
  Query(q): Query<SessionQuery>,
) -> Result<Json<Vec<LevelOut>>, LogicError> {
  logic::list_levels(&state, q.session_id.as_deref()).await.map(Json)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_level_challenges(
  State(state): State<Arc<AppState>>,
  Path(level): Path<String>,
  Query(q): Query<SessionQuery>,
) -> Result<Json<Vec<ChallengeSummaryOut>>, LogicError> {
  let level = logic::parse_level(&level)?;
  logic::list_challenges(&state, level, q.session_id.as_deref()).await.map(Json)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_challenge(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ChallengeQuery>,
) -> Result<Json<ChallengeOut>, LogicError> {
  let level = q.level.as_deref().map(logic::parse_level).transpose()?;
  let ch = logic::open_challenge(&state, level, q.id.as_deref(), q.session_id.as_deref()).await?;
  info!(target: "challenge", id = %ch.id, level = %ch.level, "HTTP challenge served");
  Ok(Json(ch))
}

#[instrument(level = "info", skip(state, body), fields(code_len = body.code.len()))]
pub async fn http_post_run(
  State(state): State<Arc<AppState>>,
  Json(body): Json<RunIn>,
) -> impl IntoResponse {
  let output = logic::run_code(&state, &body.code).await;
  Json(RunOut { output })
}

#[instrument(level = "info", skip(state, body), fields(%body.challenge_id, code_len = body.code.len()))]
pub async fn http_post_hint(
  State(state): State<Arc<AppState>>,
  Json(body): Json<HintIn>,
) -> Result<Json<HintOut>, LogicError> {
  let text = logic::hint_for(&state, &body.challenge_id, &body.code).await?;
  info!(target: "challenge", id = %body.challenge_id, "HTTP hint served");
  Ok(Json(HintOut { text }))
}

#[instrument(level = "info", skip(state, body), fields(%body.session_id, %body.challenge_id, code_len = body.code.len()))]
pub async fn http_post_submit(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SubmitIn>,
) -> Result<Json<SubmitOut>, LogicError> {
  let out = logic::submit(&state, &body.session_id, &body.challenge_id, &body.code).await?;
  info!(target: "challenge", id = %body.challenge_id, correct = out.correct, "HTTP submit evaluated");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_dashboard(
  State(state): State<Arc<AppState>>,
  Query(q): Query<SessionQuery>,
) -> Result<Json<DashboardOut>, LogicError> {
  let sid = q.session_id.ok_or(LogicError::MissingSession)?;
  logic::dashboard(&state, &sid).await.map(Json)
}

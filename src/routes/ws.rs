//! WebSocket upgrade + message loop. Each connection owns one session.
//! Each client message is parsed as JSON and forwarded to core logic.
//! We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::logic::{self, LogicError};
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "bugbattle", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

fn encode(msg: &ServerWsMessage) -> String {
  serde_json::to_string(msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  })
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  let session_id = state.open_session().await;
  info!(target: "bugbattle", session = %session_id, "WebSocket connected");

  let hello = encode(&ServerWsMessage::Session { session_id: session_id.clone() });
  if let Err(e) = socket.send(Message::Text(hello)).await {
    error!(target: "bugbattle", error = %e, "WS send error");
    state.close_session(&session_id).await;
    return;
  }

  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "bugbattle", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state, &session_id).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        if let Err(e) = socket.send(Message::Text(encode(&reply_msg))).await {
          error!(target: "bugbattle", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }

  state.close_session(&session_id).await;
  info!(target: "bugbattle", session = %session_id, "WebSocket disconnected");
}

fn or_error<T>(res: Result<T, LogicError>, ok: impl FnOnce(T) -> ServerWsMessage) -> ServerWsMessage {
  match res {
    Ok(v) => ok(v),
    Err(e) => ServerWsMessage::Error { message: e.to_string() },
  }
}

#[instrument(level = "info", skip(state, msg))]
pub(crate) async fn handle_client_ws(msg: ClientWsMessage, state: &AppState, session_id: &str) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::ListLevels => or_error(
      logic::list_levels(state, Some(session_id)).await,
      |levels| ServerWsMessage::Levels { levels },
    ),

    ClientWsMessage::ListChallenges { level } => {
      let res = match logic::parse_level(&level) {
        Ok(level) => logic::list_challenges(state, level, Some(session_id)).await,
        Err(e) => Err(e),
      };
      or_error(res, |challenges| ServerWsMessage::Challenges { challenges })
    }

    ClientWsMessage::OpenChallenge { level, challenge_id } => {
      let res = match level.as_deref().map(logic::parse_level).transpose() {
        Ok(level) => logic::open_challenge(state, level, challenge_id.as_deref(), Some(session_id)).await,
        Err(e) => Err(e),
      };
      if let Ok(ch) = &res {
        tracing::info!(target: "challenge", id = %ch.id, level = %ch.level, "WS challenge served");
      }
      or_error(res, |challenge| ServerWsMessage::Challenge { challenge })
    }

    ClientWsMessage::RunCode { code } => {
      let output = logic::run_code(state, &code).await;
      ServerWsMessage::RunOutput { output }
    }

    ClientWsMessage::Hint { challenge_id, code } => or_error(
      logic::hint_for(state, &challenge_id, &code).await,
      |text| ServerWsMessage::Hint { text },
    ),

    ClientWsMessage::Submit { challenge_id, code } => {
      let res = logic::submit(state, session_id, &challenge_id, &code).await;
      if let Ok(out) = &res {
        tracing::info!(target: "challenge", id = %challenge_id, correct = out.correct, "WS submit evaluated");
      }
      or_error(res, |result| ServerWsMessage::SubmitResult { result })
    }

    ClientWsMessage::Dashboard => or_error(
      logic::dashboard(state, session_id).await,
      |dashboard| ServerWsMessage::Dashboard { dashboard },
    ),
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use super::*;
  use crate::config::AppConfig;

  async fn dispatch(state: &AppState, sid: &str, json: &str) -> serde_json::Value {
    let msg: ClientWsMessage = serde_json::from_str(json).unwrap();
    let reply = handle_client_ws(msg, state, sid).await;
    serde_json::to_value(&reply).unwrap()
  }

  #[tokio::test]
  async fn ws_flow_open_hint_submit() {
    let state = AppState::from_config(AppConfig::default()).with_run_delay(Duration::ZERO);
    let sid = state.open_session().await;

    let pong = dispatch(&state, &sid, r#"{"type":"ping"}"#).await;
    assert_eq!(pong["type"], "pong");

    let opened = dispatch(&state, &sid, r#"{"type":"open_challenge","challengeId":"logical-error"}"#).await;
    assert_eq!(opened["type"], "challenge");
    assert_eq!(opened["challenge"]["timeLeft"], "10:00");
    assert!(opened["challenge"].get("correctCode").is_none());

    let initial = opened["challenge"]["initialCode"].as_str().unwrap().to_string();
    let hint_req = serde_json::json!({ "type": "hint", "challengeId": "logical-error", "code": initial });
    let hint = dispatch(&state, &sid, &hint_req.to_string()).await;
    assert_eq!(hint["text"], "Check line 4");

    let fixed = initial.replace("i <= numbers", "i < numbers");
    let submit_req = serde_json::json!({ "type": "submit", "challengeId": "logical-error", "code": fixed });
    let result = dispatch(&state, &sid, &submit_req.to_string()).await;
    assert_eq!(result["type"], "submit_result");
    assert_eq!(result["result"]["correct"], true);
    assert_eq!(result["result"]["pointsAwarded"], 40);

    let dash = dispatch(&state, &sid, r#"{"type":"dashboard"}"#).await;
    assert_eq!(dash["dashboard"]["points"], 40);
  }

  #[tokio::test]
  async fn ws_errors_are_messages() {
    let state = AppState::from_config(AppConfig::default()).with_run_delay(Duration::ZERO);
    let sid = state.open_session().await;
    let err = dispatch(&state, &sid, r#"{"type":"hint","challengeId":"nope","code":""}"#).await;
    assert_eq!(err["type"], "error");
    assert_eq!(err["message"], "Unknown challengeId: nope");

    let bad_level = dispatch(&state, &sid, r#"{"type":"list_challenges","level":"expert"}"#).await;
    assert_eq!(bad_level["type"], "error");
    assert_eq!(bad_level["message"], "Unknown level: expert");

    let run = dispatch(&state, &sid, r#"{"type":"run_code","code":"printtt(1)"}"#).await;
    assert_eq!(run["output"], "NameError: name 'printtt' is not defined");
  }
}

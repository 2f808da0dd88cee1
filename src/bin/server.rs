use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use haunted_rescue_server::session::{Session, SessionError};
use haunted_rescue_server::types::PolicyMode;
use rand::Rng;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;

type SharedState = Arc<Mutex<Session>>;

#[derive(Debug, Deserialize)]
struct StartQuery {
    seed: Option<u32>,
}

#[tokio::main]
async fn main() {
    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let state: SharedState = Arc::new(Mutex::new(Session::new()));

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/start/{mode}", get(start_handler))
        .route("/turn", get(turn_handler))
        .route("/turn/{id}", get(replay_handler))
        .with_state(state);

    let bind_addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("failed to bind server socket");

    println!("[server] listening on :{port}");
    axum::serve(listener, app)
        .await
        .expect("server runtime failed");
}

async fn healthz() -> &'static str {
    "ok"
}

/// Starts a fresh run. Any mode string other than "naive" selects the
/// strategic policy; the seed comes from the query or the clock.
async fn start_handler(
    Path(mode): Path<String>,
    Query(query): Query<StartQuery>,
    State(state): State<SharedState>,
) -> Response {
    let mode = PolicyMode::parse(&mode);
    let seed = query.seed.unwrap_or_else(|| rand::rng().random());
    let mut session = state.lock().await;
    session.start(mode, seed);
    emit_log("info", "session_started", json!({ "mode": mode, "seed": seed }));
    Json(json!({ "mode": mode, "seed": seed })).into_response()
}

async fn turn_handler(State(state): State<SharedState>) -> Response {
    let mut session = state.lock().await;
    match session.turn() {
        Ok(report) => Json(report).into_response(),
        Err(error) => error_response(error),
    }
}

async fn replay_handler(Path(id): Path<usize>, State(state): State<SharedState>) -> Response {
    let session = state.lock().await;
    match session.replay(id) {
        Ok(report) => Json(report).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: SessionError) -> Response {
    let status = match error {
        SessionError::NotStarted | SessionError::Finished => StatusCode::BAD_REQUEST,
        SessionError::TurnOutOfRange(_) => StatusCode::NOT_FOUND,
    };
    emit_log("warn", "request_rejected", json!({ "error": error.to_string() }));
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}

fn emit_log(level: &str, event: &str, details: Value) {
    let timestamp_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;
    eprintln!(
        "{}",
        json!({
            "timestampMs": timestamp_ms,
            "level": level,
            "event": event,
            "details": details,
        })
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_errors_map_to_client_errors() {
        assert_eq!(
            error_response(SessionError::NotStarted).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_response(SessionError::Finished).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_response(SessionError::TurnOutOfRange(9)).status(),
            StatusCode::NOT_FOUND
        );
    }
}

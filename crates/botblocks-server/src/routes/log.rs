use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use serde_json::Value;
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;

use crate::state::AppState;

/// GET /api/log
pub async fn get_log(State(app): State<AppState>) -> Json<Value> {
    Json(serde_json::json!({ "lines": app.log.lines() }))
}

/// DELETE /api/log
pub async fn clear_log(State(app): State<AppState>) -> Json<Value> {
    let cleared = app.log.len();
    app.log.clear();
    Json(serde_json::json!({ "cleared": cleared }))
}

/// GET /api/log/events — SSE stream with one `line` event per appended line.
///
/// Lines dropped because the client fell behind are skipped; `GET /api/log`
/// always has the full list.
pub async fn log_events(State(app): State<AppState>) -> impl axum::response::IntoResponse {
    let rx = app.log.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| {
        msg.ok()
            .map(|line| Ok::<Event, Infallible>(Event::default().event("line").data(line)))
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

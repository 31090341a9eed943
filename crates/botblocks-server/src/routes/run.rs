use axum::extract::State;
use axum::Json;
use botblocks_core::SkipReason;
use serde_json::Value;

use crate::error::AppError;
use crate::state::AppState;

/// POST /api/run — start running a snapshot of the program.
///
/// Returns as soon as the run is accepted; progress shows up in the log and
/// in `GET /api/status`. 409 while another run is active.
pub async fn start_run(State(app): State<AppState>) -> Result<Json<Value>, AppError> {
    let (actions, ticket) = {
        let program = app.program.lock().await;
        let actions = program.snapshot();
        match app.runner.try_start(&actions) {
            Ok(ticket) => (actions, ticket),
            Err(SkipReason::Empty) => {
                return Ok(Json(serde_json::json!({
                    "status": "skipped",
                    "reason": SkipReason::Empty,
                })));
            }
            Err(SkipReason::AlreadyRunning) => {
                return Err(AppError::conflict("a run is already in progress"));
            }
        }
    };

    let base_url = app.base_url();
    let total = actions.len();
    app.begin_run(total);

    let state = app.clone();
    let base = base_url.clone();
    tokio::spawn(async move {
        ticket
            .execute_then(&actions, &base, |outcome| state.finish_run(outcome.clone()))
            .await;
    });

    Ok(Json(serde_json::json!({
        "status": "started",
        "actions": total,
        "base_url": base_url,
    })))
}

/// GET /api/status — runner state plus the robot address in use.
pub async fn get_status(State(app): State<AppState>) -> Json<Value> {
    Json(serde_json::json!({
        "run": app.runner.status(),
        "running": app.runner.is_running(),
        "base_url": app.base_url(),
        "log_lines": app.log.len(),
        "last_run": app.last_run(),
    }))
}

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RobotBody {
    pub base_url: String,
}

/// GET /api/robot
pub async fn get_robot(State(app): State<AppState>) -> Json<Value> {
    Json(serde_json::json!({ "base_url": app.base_url() }))
}

/// PUT /api/robot — point the server at another robot. Takes effect on the
/// next run; a run in progress keeps the address it started with.
pub async fn put_robot(
    State(app): State<AppState>,
    Json(body): Json<RobotBody>,
) -> Result<Json<Value>, AppError> {
    botblocks_core::config::parse_base_url(&body.base_url)?;
    app.set_base_url(&body.base_url);
    tracing::info!(base_url = %app.base_url(), "robot address changed");
    Ok(Json(serde_json::json!({ "base_url": app.base_url() })))
}

use axum::extract::State;
use axum::Json;
use botblocks_core::{PanelStatus, RainbowSettings};

use crate::state::AppState;

/// POST /api/rainbow/start — body fields are optional; missing ones use the
/// panel defaults.
pub async fn start_rainbow(
    State(app): State<AppState>,
    body: Option<Json<RainbowSettings>>,
) -> Json<PanelStatus> {
    let settings = body.map(|Json(s)| s).unwrap_or_default();
    Json(app.panel.start(&app.base_url(), &settings).await)
}

/// POST /api/rainbow/stop
pub async fn stop_rainbow(State(app): State<AppState>) -> Json<PanelStatus> {
    Json(app.panel.stop(&app.base_url()).await)
}

use axum::extract::State;

use crate::state::AppState;

/// GET /api/script — the program as a read-only script, as text.
pub async fn get_script(State(app): State<AppState>) -> String {
    let program = app.program.lock().await;
    botblocks_core::script::compile(program.actions())
}

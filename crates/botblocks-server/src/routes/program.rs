use axum::extract::{Path, State};
use axum::Json;
use botblocks_core::{Action, BlockKind};
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/program — the current action list.
pub async fn get_program(State(app): State<AppState>) -> Json<Value> {
    let program = app.program.lock().await;
    Json(serde_json::json!({
        "actions": program.actions(),
        "len": program.len(),
    }))
}

/// DELETE /api/program — remove every action.
pub async fn clear_program(State(app): State<AppState>) -> Result<Json<Value>, AppError> {
    let mut program = app.program.lock().await;
    app.ensure_idle()?;
    let removed = program.len();
    program.clear();
    app.persist(&program).await?;
    Ok(Json(serde_json::json!({ "removed": removed })))
}

/// GET /api/kinds — the block palette.
pub async fn list_kinds() -> Json<Value> {
    let kinds: Vec<Value> = BlockKind::all()
        .iter()
        .map(|k| {
            serde_json::json!({
                "type": k.as_str(),
                "label": k.label(),
                "fields": k.fields(),
            })
        })
        .collect();
    Json(Value::Array(kinds))
}

/// POST /api/program/actions — append a block.
///
/// The body names the block `type`; any other fields override the palette
/// defaults for that kind.
pub async fn add_action(
    State(app): State<AppState>,
    Json(mut body): Json<Map<String, Value>>,
) -> Result<Json<Value>, AppError> {
    let kind: BlockKind = match body.remove("type") {
        Some(Value::String(s)) => s.parse()?,
        Some(other) => return Err(AppError::bad_request(format!("invalid type: {other}"))),
        None => return Err(AppError::bad_request("missing field 'type'")),
    };

    // Build off to the side so a bad override leaves the program untouched.
    let mut draft = Action::new(0, botblocks_core::Block::with_defaults(kind));
    draft.apply_patch(&body)?;

    let mut program = app.program.lock().await;
    app.ensure_idle()?;
    let id = program.push(draft.block);
    app.persist(&program).await?;
    let action = program.get(id)?;
    Ok(Json(serde_json::json!({ "id": id, "action": action })))
}

/// PATCH /api/program/actions/{id} — change some fields of one action.
pub async fn patch_action(
    State(app): State<AppState>,
    Path(id): Path<u64>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<Value>, AppError> {
    let mut program = app.program.lock().await;
    app.ensure_idle()?;
    let action = program.patch(id, &body)?.clone();
    app.persist(&program).await?;
    Ok(Json(serde_json::json!({ "action": action })))
}

/// DELETE /api/program/actions/{id}
pub async fn remove_action(
    State(app): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, AppError> {
    let mut program = app.program.lock().await;
    app.ensure_idle()?;
    let removed = program.remove(id)?;
    app.persist(&program).await?;
    Ok(Json(serde_json::json!({ "removed": removed })))
}

/// POST /api/program/actions/{id}/up
pub async fn move_up(
    State(app): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, AppError> {
    let mut program = app.program.lock().await;
    app.ensure_idle()?;
    let moved = program.move_up(id)?;
    if moved {
        app.persist(&program).await?;
    }
    Ok(Json(serde_json::json!({ "id": id, "moved": moved })))
}

/// POST /api/program/actions/{id}/down
pub async fn move_down(
    State(app): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, AppError> {
    let mut program = app.program.lock().await;
    app.ensure_idle()?;
    let moved = program.move_down(id)?;
    if moved {
        app.persist(&program).await?;
    }
    Ok(Json(serde_json::json!({ "id": id, "moved": moved })))
}

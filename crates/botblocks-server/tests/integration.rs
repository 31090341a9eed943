use axum::http::StatusCode;
use botblocks_core::RobotConfig;
use botblocks_server::{build_router, AppState};
use http_body_util::BodyExt;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Router for a fresh project in `dir` aimed at `base_url`, with no pacing.
fn app_for(dir: &TempDir, base_url: &str, settle_ms: u64) -> (axum::Router, AppState) {
    let config = RobotConfig {
        base_url: base_url.to_string(),
        gap_ms: 0,
        settle_ms,
        timeout_ms: Some(2_000),
    };
    let state = AppState::new(dir.path().to_path_buf(), &config).unwrap();
    (build_router(state.clone()), state)
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = axum::http::Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(axum::body::Body::from(serde_json::to_vec(&b).unwrap()))
            .unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, "GET", uri, None).await
}

async fn post_json(
    app: &axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "POST", uri, Some(body)).await
}

async fn wait_until_idle(state: &AppState) {
    for _ in 0..500 {
        if !state.runner.is_running() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("run did not finish");
}

// ---------------------------------------------------------------------------
// Program editing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_with_defaults_and_overrides() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app_for(&dir, "http://127.0.0.1:1", 0);

    let (status, body) =
        post_json(&app, "/api/program/actions", serde_json::json!({ "type": "move" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);
    assert_eq!(body["action"]["direction"], "forward");
    assert_eq!(body["action"]["seconds"], 0.8);

    let (status, body) = post_json(
        &app,
        "/api/program/actions",
        serde_json::json!({ "type": "lcd", "msg": "Hi", "row": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 2);
    assert_eq!(body["action"]["msg"], "Hi");
    assert_eq!(body["action"]["align"], "left");

    let (_, body) = get(&app, "/api/program").await;
    assert_eq!(body["len"], 2);
    assert_eq!(body["actions"][1]["type"], "lcd");

    // Edits are saved to the project.
    let saved =
        botblocks_core::Program::load(&botblocks_core::paths::program_path(dir.path())).unwrap();
    assert_eq!(saved.len(), 2);
}

#[tokio::test]
async fn add_rejects_bad_bodies() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app_for(&dir, "http://127.0.0.1:1", 0);

    let (status, _) = post_json(&app, "/api/program/actions", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) =
        post_json(&app, "/api/program/actions", serde_json::json!({ "type": "dance" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("dance"));

    let (status, _) = post_json(
        &app,
        "/api/program/actions",
        serde_json::json!({ "type": "beep", "seconds": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = get(&app, "/api/program").await;
    assert_eq!(body["len"], 0);
}

#[tokio::test]
async fn patch_reorder_and_remove() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app_for(&dir, "http://127.0.0.1:1", 0);
    for kind in ["beep", "wait", "mary"] {
        post_json(&app, "/api/program/actions", serde_json::json!({ "type": kind })).await;
    }

    let (status, body) = send(
        &app,
        "PATCH",
        "/api/program/actions/2",
        Some(serde_json::json!({ "seconds": 2.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["action"]["seconds"], 2.5);

    let (status, body) = post_json(&app, "/api/program/actions/3/up", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["moved"], true);

    let (_, body) = post_json(&app, "/api/program/actions/1/up", serde_json::json!({})).await;
    assert_eq!(body["moved"], false);

    let (status, _) = send(&app, "DELETE", "/api/program/actions/1", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get(&app, "/api/program").await;
    let ids: Vec<u64> = body["actions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![3, 2]);
}

#[tokio::test]
async fn unknown_id_is_404() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app_for(&dir, "http://127.0.0.1:1", 0);

    let (status, _) = send(&app, "DELETE", "/api/program/actions/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "PATCH",
        "/api/program/actions/42",
        Some(serde_json::json!({ "seconds": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn clear_keeps_ids_moving_forward() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app_for(&dir, "http://127.0.0.1:1", 0);
    post_json(&app, "/api/program/actions", serde_json::json!({ "type": "beep" })).await;

    let (status, body) = send(&app, "DELETE", "/api/program", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 1);

    let (_, body) =
        post_json(&app, "/api/program/actions", serde_json::json!({ "type": "beep" })).await;
    assert_eq!(body["id"], 2);
}

#[tokio::test]
async fn kinds_lists_palette() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app_for(&dir, "http://127.0.0.1:1", 0);
    let (status, body) = get(&app, "/api/kinds").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 9);
    assert_eq!(body[0]["type"], "move");
}

// ---------------------------------------------------------------------------
// Running
// ---------------------------------------------------------------------------

#[tokio::test]
async fn run_empty_program_is_skipped() {
    let dir = TempDir::new().unwrap();
    let (app, state) = app_for(&dir, "http://127.0.0.1:1", 0);

    let (status, body) = post_json(&app, "/api/run", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "skipped");
    assert_eq!(body["reason"], "empty");
    assert!(state.log.is_empty());
    assert!(state.last_run().is_none());
}

#[tokio::test]
async fn run_reaches_robot_and_logs() {
    let mut server = mockito::Server::new_async().await;
    let beep = server
        .mock("GET", "/beep")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    let dir = TempDir::new().unwrap();
    let (app, state) = app_for(&dir, &server.url(), 0);
    post_json(&app, "/api/program/actions", serde_json::json!({ "type": "beep" })).await;

    let (status, body) = post_json(&app, "/api/run", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "started");
    assert_eq!(body["actions"], 1);

    wait_until_idle(&state).await;
    beep.assert_async().await;

    let (_, body) = get(&app, "/api/log").await;
    let lines: Vec<&str> = body["lines"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l.as_str().unwrap())
        .collect();
    assert_eq!(
        lines,
        vec![
            format!("GET {}/beep", server.url()).as_str(),
            "→ OK",
            "done: 1 action(s)"
        ]
    );

    let (_, body) = get(&app, "/api/status").await;
    assert_eq!(body["run"]["state"], "idle");
    assert_eq!(body["last_run"]["outcome"]["outcome"], "completed");
}

#[tokio::test]
async fn second_run_and_edits_conflict_while_running() {
    let mut server = mockito::Server::new_async().await;
    let beep = server
        .mock("GET", "/beep")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    let dir = TempDir::new().unwrap();
    // A long settle delay keeps the first run active.
    let (app, state) = app_for(&dir, &server.url(), 60_000);
    post_json(&app, "/api/program/actions", serde_json::json!({ "type": "beep" })).await;

    let (status, _) = post_json(&app, "/api/run", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post_json(&app, "/api/run", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("in progress"));

    let (status, _) =
        post_json(&app, "/api/program/actions", serde_json::json!({ "type": "mary" })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = get(&app, "/api/status").await;
    assert_eq!(body["running"], true);
    assert_eq!(body["run"]["state"], "running");

    for _ in 0..500 {
        if state.log.lines().iter().any(|l| l.starts_with("done:")) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    beep.assert_async().await;
}

#[tokio::test]
async fn unreachable_robot_marks_run_failed() {
    let dir = TempDir::new().unwrap();
    let (app, state) = app_for(&dir, "http://127.0.0.1:1", 0);
    post_json(&app, "/api/program/actions", serde_json::json!({ "type": "beep" })).await;
    post_json(&app, "/api/program/actions", serde_json::json!({ "type": "mary" })).await;

    post_json(&app, "/api/run", serde_json::json!({})).await;
    wait_until_idle(&state).await;

    let (_, body) = get(&app, "/api/status").await;
    assert_eq!(body["run"]["state"], "failed");
    assert_eq!(body["run"]["position"], 1);
    assert_eq!(body["last_run"]["outcome"]["outcome"], "failed");

    let lines = state.log.lines();
    assert!(lines.iter().any(|l| l.starts_with("error:")));
    assert!(!lines.iter().any(|l| l.contains("/mary")));
}

// ---------------------------------------------------------------------------
// Log, robot, rainbow, script
// ---------------------------------------------------------------------------

#[tokio::test]
async fn clear_log_empties_it() {
    let dir = TempDir::new().unwrap();
    let (app, state) = app_for(&dir, "http://127.0.0.1:1", 0);
    state.log.append("GET http://robot/beep");

    let (status, body) = send(&app, "DELETE", "/api/log", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cleared"], 1);
    assert!(state.log.is_empty());
}

#[tokio::test]
async fn log_events_is_an_event_stream() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app_for(&dir, "http://127.0.0.1:1", 0);
    let req = axum::http::Request::builder()
        .uri("/api/log/events")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let ct = response
        .headers()
        .get(axum::http::header::CONTENT_TYPE)
        .unwrap();
    assert!(ct.to_str().unwrap().starts_with("text/event-stream"));
}

#[tokio::test]
async fn put_robot_validates_and_trims() {
    let dir = TempDir::new().unwrap();
    let (app, state) = app_for(&dir, "http://127.0.0.1:1", 0);

    let (status, body) = send(
        &app,
        "PUT",
        "/api/robot",
        Some(serde_json::json!({ "base_url": "http://10.1.2.3/" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["base_url"], "http://10.1.2.3");
    assert_eq!(state.base_url(), "http://10.1.2.3");

    let (status, _) = send(
        &app,
        "PUT",
        "/api/robot",
        Some(serde_json::json!({ "base_url": "ftp://10.1.2.3" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = get(&app, "/api/robot").await;
    assert_eq!(body["base_url"], "http://10.1.2.3");
}

#[tokio::test]
async fn rainbow_start_uses_defaults_and_reports_status() {
    let mut server = mockito::Server::new_async().await;
    let start = server
        .mock("GET", "/fx/rainbow/start")
        .match_query("interval=40&sat=255&val=160")
        .with_status(200)
        .create_async()
        .await;
    let _stop = server
        .mock("GET", "/fx/rainbow/stop")
        .with_status(500)
        .create_async()
        .await;
    let dir = TempDir::new().unwrap();
    let (app, _) = app_for(&dir, &server.url(), 0);

    let (status, body) = post_json(&app, "/api/rainbow/start", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    start.assert_async().await;

    let (_, body) = post_json(&app, "/api/rainbow/stop", serde_json::json!({})).await;
    assert_eq!(body["status"], "http_error");
    assert_eq!(body["code"], 500);
}

#[tokio::test]
async fn script_renders_program() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app_for(&dir, "http://127.0.0.1:1", 0);
    post_json(&app, "/api/program/actions", serde_json::json!({ "type": "beep" })).await;
    post_json(&app, "/api/program/actions", serde_json::json!({ "type": "wait" })).await;

    let req = axum::http::Request::builder()
        .uri("/api/script")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(
        std::str::from_utf8(&body).unwrap(),
        "robot.beep();\nrobot.wait(1);\n"
    );
}

#[tokio::test]
async fn add_accepts_numeric_hex() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app_for(&dir, "http://127.0.0.1:1", 0);

    let (status, body) = post_json(
        &app,
        "/api/program/actions",
        serde_json::json!({ "type": "rgb", "hex": 112233 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["action"]["hex"], "112233");

    let req = axum::http::Request::builder()
        .uri("/api/script")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(std::str::from_utf8(&body).unwrap(), "robot.rgb(\"#112233\");\n");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn back_to_back_runs_each_get_their_own_record() {
    let mut server = mockito::Server::new_async().await;
    let beep = server
        .mock("GET", "/beep")
        .with_status(200)
        .expect(3)
        .create_async()
        .await;
    let dir = TempDir::new().unwrap();
    let (app, state) = app_for(&dir, &server.url(), 0);
    post_json(&app, "/api/program/actions", serde_json::json!({ "type": "beep" })).await;

    post_json(&app, "/api/run", serde_json::json!({})).await;
    wait_until_idle(&state).await;
    // The record is complete as soon as the runner accepts a new run.
    assert!(state.last_run().unwrap().finished_at.is_some());

    post_json(&app, "/api/program/actions", serde_json::json!({ "type": "beep" })).await;
    let (status, body) = post_json(&app, "/api/run", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["actions"], 2);
    wait_until_idle(&state).await;

    let record = state.last_run().unwrap();
    assert_eq!(record.actions, 2);
    assert_eq!(
        record.outcome,
        Some(botblocks_core::RunOutcome::Completed { actions: 2 })
    );
    beep.assert_async().await;
}

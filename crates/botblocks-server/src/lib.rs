pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use botblocks_core::RobotConfig;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Program editing
        .route(
            "/api/program",
            get(routes::program::get_program).delete(routes::program::clear_program),
        )
        .route("/api/kinds", get(routes::program::list_kinds))
        .route("/api/program/actions", post(routes::program::add_action))
        .route(
            "/api/program/actions/{id}",
            axum::routing::patch(routes::program::patch_action)
                .delete(routes::program::remove_action),
        )
        .route(
            "/api/program/actions/{id}/up",
            post(routes::program::move_up),
        )
        .route(
            "/api/program/actions/{id}/down",
            post(routes::program::move_down),
        )
        // Running
        .route("/api/run", post(routes::run::start_run))
        .route("/api/status", get(routes::run::get_status))
        // Log
        .route(
            "/api/log",
            get(routes::log::get_log).delete(routes::log::clear_log),
        )
        .route("/api/log/events", get(routes::log::log_events))
        // Robot
        .route(
            "/api/robot",
            get(routes::robot::get_robot).put(routes::robot::put_robot),
        )
        .route("/api/rainbow/start", post(routes::rainbow::start_rainbow))
        .route("/api/rainbow/stop", post(routes::rainbow::stop_rainbow))
        // Script
        .route("/api/script", get(routes::script::get_script))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the botblocks API server for the project at `root`.
pub async fn serve(root: PathBuf, config: RobotConfig, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    serve_on(root, config, listener).await
}

/// Start the server on a pre-bound listener.
///
/// Lets the caller read the actual port first when binding port 0.
pub async fn serve_on(
    root: PathBuf,
    config: RobotConfig,
    listener: tokio::net::TcpListener,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app_state = AppState::new(root, &config)?;
    let app = build_router(app_state);

    tracing::info!(
        robot = %config.trimmed_base_url(),
        "botblocks server listening on http://localhost:{actual_port}"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

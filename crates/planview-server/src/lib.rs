pub mod error;
pub mod hub;
pub mod routes;
pub mod state;
pub mod watch;

use crate::state::AppState;
use crate::watch::PlanWatcher;
use axum::routing::{get, post};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};

/// Assemble the API router for one planning tree.
pub fn build_router(planning_dir: PathBuf) -> Router {
    build_router_with_state(AppState::new(planning_dir))
}

fn build_router_with_state(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/events", get(routes::events::subscribe))
        .route("/api/snapshot", get(routes::snapshot::get))
        .route("/api/state", get(routes::state::get))
        .route("/api/drift", get(routes::drift::get))
        .route("/api/notes", post(routes::notes::append))
        .layer(cors)
        .with_state(app_state)
}

/// Bind `0.0.0.0:{port}` and serve until shutdown. Port 0 picks a free
/// port.
pub async fn serve(planning_dir: PathBuf, port: u16, open_browser: bool) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    serve_on(planning_dir, listener, open_browser).await
}

/// Serve on an already-bound listener, with the file watcher feeding the
/// update hub for as long as the server runs.
pub async fn serve_on(
    planning_dir: PathBuf,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let port = listener.local_addr()?.port();
    let app_state = AppState::new(planning_dir.clone());

    let _watcher = match PlanWatcher::spawn(planning_dir, app_state.hub.clone()) {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            tracing::warn!("file watching disabled: {e}");
            None
        }
    };

    let app = build_router_with_state(app_state);
    let url = format!("http://localhost:{port}");
    tracing::info!("planview server listening on {url}");
    if open_browser {
        if let Err(e) = open::that(&url) {
            tracing::warn!("could not open browser: {e}");
        }
    }
    axum::serve(listener, app).await?;
    Ok(())
}

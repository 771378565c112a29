use crate::error::AppError;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use planview_core::drift::{self, DriftReport};

pub async fn get(State(state): State<AppState>) -> Result<Json<DriftReport>, AppError> {
    let planning_dir = state.planning_dir.clone();
    let report = tokio::task::spawn_blocking(move || drift::check(&planning_dir))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(report))
}

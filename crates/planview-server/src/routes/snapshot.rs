use crate::error::AppError;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde_json::Value;

pub async fn get(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let snapshot = state.hub.current().await?;
    Ok(Json(serde_json::to_value(&*snapshot)?))
}

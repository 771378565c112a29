use crate::error::AppError;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use planview_core::state::StateRecord;
use planview_core::{builder, paths, PlanviewError};
use serde_json::{json, Value};

/// The persisted state record, its decisions, and the conflict report, or
/// nulls when no STATE.md exists.
pub async fn get(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let planning_dir = state.planning_dir.clone();
    let value = tokio::task::spawn_blocking(move || {
        let path = builder::authoritative_state_path(&planning_dir)
            .unwrap_or_else(|| paths::state_path(&planning_dir));
        let value = match StateRecord::load(&path)? {
            Some((record, conflict)) => json!({
                "record": &record,
                "decisions": &record.decisions,
                "conflict": &conflict,
            }),
            None => json!({
                "record": Value::Null,
                "decisions": [],
                "conflict": Value::Null,
            }),
        };
        Ok::<_, PlanviewError>(value)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(value))
}

use crate::error::AppError;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use planview_core::notes::{self, NoteTarget};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendNoteRequest {
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub source_path: Option<String>,
    pub content: String,
}

enum Target {
    Id(String),
    Path(String),
}

/// Append a note to a plan, then rebuild and broadcast so dashboards see
/// the change without waiting on the file watcher.
pub async fn append(
    State(state): State<AppState>,
    Json(request): Json<AppendNoteRequest>,
) -> Result<Json<Value>, AppError> {
    if request.content.trim().is_empty() {
        return Err(AppError::bad_request("note content must not be empty"));
    }
    let target = match (request.task_id, request.source_path) {
        (Some(id), _) => Target::Id(id),
        (None, Some(path)) => Target::Path(path),
        (None, None) => return Err(AppError::bad_request("taskId or sourcePath is required")),
    };
    let content = request.content;

    let planning_dir = state.planning_dir.clone();
    let count = tokio::task::spawn_blocking(move || {
        let target = match &target {
            Target::Id(id) => NoteTarget::TaskId(id),
            Target::Path(path) => NoteTarget::SourcePath(path),
        };
        notes::append_note(&planning_dir, target, &content)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    state.hub.refresh().await?;

    Ok(Json(json!({ "success": true, "noteCount": count })))
}

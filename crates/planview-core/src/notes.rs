use crate::builder;
use crate::error::{PlanviewError, Result};
use crate::frontmatter;
use crate::io;
use crate::paths;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

/// How a note request names the plan it belongs to.
#[derive(Debug, Clone, Copy)]
pub enum NoteTarget<'a> {
    TaskId(&'a str),
    SourcePath(&'a str),
}

/// Append a timestamped note to a plan's frontmatter `notes` list.
///
/// The plan body is kept byte for byte; only the header is rewritten. A
/// source path must point at a `-PLAN.md` file inside the planning tree.
/// Returns the note count after the append.
pub fn append_note(planning_dir: &Path, target: NoteTarget<'_>, content: &str) -> Result<usize> {
    let path = resolve_target(planning_dir, target)?;
    let text = std::fs::read_to_string(&path)?;
    let (mut fields, body) = frontmatter::mapping(&text);

    let mut notes = match fields.remove("notes") {
        Some(Value::Sequence(seq)) => seq,
        _ => Vec::new(),
    };
    let mut note = Mapping::new();
    note.insert(
        Value::from("timestamp"),
        Value::from(chrono::Utc::now().to_rfc3339()),
    );
    note.insert(Value::from("content"), Value::from(content));
    notes.push(Value::Mapping(note));
    let count = notes.len();
    fields.insert(Value::from("notes"), Value::Sequence(notes));

    let updated = frontmatter::render(&fields, body)?;
    io::atomic_write(&path, &updated)?;
    Ok(count)
}

fn resolve_target(planning_dir: &Path, target: NoteTarget<'_>) -> Result<PathBuf> {
    match target {
        NoteTarget::TaskId(id) => {
            let snapshot = builder::build_snapshot(planning_dir)?;
            let task = snapshot
                .tasks
                .iter()
                .find(|t| t.id == id)
                .ok_or_else(|| PlanviewError::TaskNotFound(id.to_string()))?;
            Ok(PathBuf::from(&task.source_path))
        }
        NoteTarget::SourcePath(raw) => {
            let candidate = if Path::new(raw).is_absolute() {
                PathBuf::from(raw)
            } else {
                planning_dir.join(raw)
            };
            let is_plan = candidate
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(paths::PLAN_SUFFIX));
            if !is_plan {
                return Err(PlanviewError::NotAPlanFile(raw.to_string()));
            }
            let resolved = candidate
                .canonicalize()
                .map_err(|_| PlanviewError::PlanNotFound(raw.to_string()))?;
            let root = planning_dir
                .canonicalize()
                .map_err(|_| PlanviewError::PlanNotFound(raw.to_string()))?;
            if !resolved.starts_with(&root) {
                return Err(PlanviewError::PlanNotFound(raw.to_string()));
            }
            Ok(resolved)
        }
    }
}

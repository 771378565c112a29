use crate::output;
use anyhow::Result;
use planview_core::notes::{append_note, NoteTarget};
use planview_core::paths;
use serde_json::json;
use std::path::Path;

pub fn run(root: &Path, task: &str, content: &str, json: bool) -> Result<()> {
    let planning_dir = paths::planning_dir(root);
    let count = append_note(&planning_dir, NoteTarget::TaskId(task), content)?;

    if json {
        output::print_json(&json!({ "success": true, "noteCount": count }))
    } else {
        println!("Note added ({count} total).");
        Ok(())
    }
}

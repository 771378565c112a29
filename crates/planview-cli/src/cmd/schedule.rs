use crate::output;
use anyhow::Result;
use planview_core::builder::build_snapshot;
use planview_core::paths;
use planview_core::schedule::{build_wave_schedule, detect_complexity, format_wave_message};
use serde_json::json;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> Result<()> {
    let planning_dir = paths::planning_dir(root);
    let snapshot = build_snapshot(&planning_dir)?;
    let schedule = build_wave_schedule(&snapshot.tasks);
    let complexity = detect_complexity(&snapshot.tasks);

    if json {
        return output::print_json(&json!({
            "schedule": schedule,
            "complexity": complexity,
        }));
    }

    println!("{}", format_wave_message(&schedule));
    println!("{}", complexity.message);
    Ok(())
}

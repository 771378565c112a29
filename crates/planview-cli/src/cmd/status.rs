use crate::output;
use anyhow::Result;
use planview_core::{builder, paths};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> Result<()> {
    let snapshot = builder::build_snapshot(&paths::planning_dir(root))?;
    if json {
        return output::print_json(&snapshot);
    }

    println!(
        "Current position: phase {}, plan {}",
        snapshot.current_phase, snapshot.current_plan
    );

    if !snapshot.phases.is_empty() {
        println!();
        let rows: Vec<Vec<String>> = snapshot
            .phases
            .iter()
            .map(|phase| {
                vec![
                    phase.id.to_string(),
                    phase.name.clone(),
                    phase.status.as_str().to_string(),
                    format!("{}/{}", phase.plans_complete, phase.plans_total),
                ]
            })
            .collect();
        output::print_table(&["ID", "NAME", "STATUS", "PLANS"], &rows);
    }

    if snapshot.tasks.is_empty() {
        println!("\nNo plans found.");
    } else {
        println!();
        let rows: Vec<Vec<String>> = snapshot
            .tasks
            .iter()
            .map(|task| {
                vec![
                    task.id.clone(),
                    task.status.as_str().to_string(),
                    task.wave.to_string(),
                    task.name.clone(),
                ]
            })
            .collect();
        output::print_table(&["ID", "STATUS", "WAVE", "NAME"], &rows);
    }
    Ok(())
}

use crate::output;
use anyhow::Result;
use planview_core::state::StateRecord;
use planview_core::{builder, paths};
use serde_json::{json, Value};
use std::path::Path;

pub fn show(root: &Path, json: bool) -> Result<()> {
    let planning_dir = paths::planning_dir(root);
    let path = builder::authoritative_state_path(&planning_dir)
        .unwrap_or_else(|| paths::state_path(&planning_dir));
    let loaded = StateRecord::load(&path)?;

    if json {
        let value = match &loaded {
            Some((record, conflict)) => json!({
                "record": record,
                "decisions": record.decisions,
                "conflict": conflict,
            }),
            None => json!({
                "record": Value::Null,
                "decisions": [],
                "conflict": Value::Null,
            }),
        };
        return output::print_json(&value);
    }

    let Some((record, conflict)) = loaded else {
        println!("No STATE.md found at {}", path.display());
        return Ok(());
    };

    println!("Version:       {}", record.version);
    println!("Phase:         {} of {}", record.phase, record.total_phases);
    println!("Plan:          {} of {}", record.plan_index, record.total_plans);
    println!("Status:        {}", record.status);
    println!("Last activity: {}", record.last_activity);
    println!("Checksum:      {}", record.checksum);

    if conflict.has_conflict {
        if let Some(message) = &conflict.message {
            println!("\nwarning: {message}");
        }
    }

    if !record.decisions.is_empty() {
        println!("\nDecisions:");
        for decision in &record.decisions {
            let marker = if decision.rejected { " [rejected]" } else { "" };
            println!("  - {}{}: {}", decision.id, marker, decision.decision);
        }
    }
    Ok(())
}

use crate::output;
use anyhow::Result;
use planview_core::{drift, paths};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> Result<()> {
    let report = drift::check(&paths::planning_dir(root))?;
    if json {
        return output::print_json(&report);
    }

    if !report.drifted {
        println!("No drift detected.");
        return Ok(());
    }
    println!("Drift detected: {}", report.kind);
    for detail in &report.details {
        println!("  - {detail}");
    }
    if report.auto_fixable {
        println!("Re-saving STATE.md will refresh the checksum.");
    }
    Ok(())
}

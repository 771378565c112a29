use crate::error::Result;
use crate::paths;
use crate::state::StateRecord;
use crate::types::RecordStatus;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftKind {
    None,
    FileChanges,
    StateMismatch,
}

impl DriftKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DriftKind::None => "none",
            DriftKind::FileChanges => "file_changes",
            DriftKind::StateMismatch => "state_mismatch",
        }
    }
}

impl std::fmt::Display for DriftKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftReport {
    pub drifted: bool,
    pub kind: DriftKind,
    pub details: Vec<String>,
    pub auto_fixable: bool,
}

impl DriftReport {
    pub fn clean() -> Self {
        DriftReport {
            drifted: false,
            kind: DriftKind::None,
            details: Vec::new(),
            auto_fixable: false,
        }
    }
}

/// Compare STATE.md against the files it refers to.
///
/// Checks run in order and the first hit wins: a checksum conflict (the
/// file was edited out of band, fixable by rewriting it), a claimed
/// completion with no SUMMARY.md behind it, and a position pointing at a
/// phase directory or plan file that does not exist. No state file means
/// nothing to drift from.
pub fn detect_drift(state_path: &Path, planning_dir: &Path) -> Result<DriftReport> {
    let Some((record, conflict)) = StateRecord::load(state_path)? else {
        return Ok(DriftReport::clean());
    };

    if conflict.has_conflict {
        return Ok(DriftReport {
            drifted: true,
            kind: DriftKind::FileChanges,
            details: vec![
                "State checksum mismatch - file was modified outside planview".to_string(),
            ],
            auto_fixable: true,
        });
    }

    let prefix = format!("{:02}-{:02}", record.phase, record.plan_index);
    let phase_dir = find_phase_dir(planning_dir, record.phase);

    if matches!(record.status, RecordStatus::Complete | RecordStatus::InProgress) {
        if let Some(dir) = &phase_dir {
            if !dir_has_entry(dir, &prefix, paths::SUMMARY_SUFFIX) {
                return Ok(DriftReport {
                    drifted: true,
                    kind: DriftKind::StateMismatch,
                    details: vec![format!(
                        "State claims plan {prefix} is {} but no SUMMARY.md exists",
                        record.status
                    )],
                    auto_fixable: false,
                });
            }
        }
    }

    match &phase_dir {
        None => Ok(DriftReport {
            drifted: true,
            kind: DriftKind::StateMismatch,
            details: vec![format!(
                "Phase directory for phase {} not found",
                record.phase
            )],
            auto_fixable: false,
        }),
        Some(dir) if !dir_has_entry(dir, &prefix, paths::PLAN_SUFFIX) => Ok(DriftReport {
            drifted: true,
            kind: DriftKind::StateMismatch,
            details: vec![format!(
                "State references plan {prefix} but no PLAN.md exists"
            )],
            auto_fixable: false,
        }),
        Some(_) => Ok(DriftReport::clean()),
    }
}

/// Run drift detection against whichever STATE.md currently drives the
/// tree.
pub fn check(planning_dir: &Path) -> Result<DriftReport> {
    let state_path = crate::builder::authoritative_state_path(planning_dir)
        .unwrap_or_else(|| paths::state_path(planning_dir));
    detect_drift(&state_path, planning_dir)
}

/// First directory under `phases/` whose name starts with the zero-padded
/// phase number.
fn find_phase_dir(planning_dir: &Path, phase: u32) -> Option<PathBuf> {
    let wanted = format!("{phase:02}-");
    let entries = std::fs::read_dir(paths::phases_dir(planning_dir)).ok()?;
    let mut dirs: Vec<PathBuf> = entries
        .flatten()
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(&wanted))
        })
        .collect();
    dirs.sort();
    dirs.into_iter().next()
}

fn dir_has_entry(dir: &Path, prefix: &str, suffix: &str) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };
    entries.flatten().any(|entry| {
        entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(prefix) && name.ends_with(suffix))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn saved_record(path: &Path, phase: u32, plan_index: u32, status: RecordStatus) {
        let mut record = StateRecord {
            phase,
            plan_index,
            status,
            ..StateRecord::default()
        };
        record.save(path).unwrap();
    }

    #[test]
    fn consistent_tree_is_clean() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(&root.join("phases/01-found/01-02-PLAN.md"), "# p\n");
        write(&root.join("phases/01-found/01-02-SUMMARY.md"), "done\n");
        saved_record(&root.join("STATE.md"), 1, 2, RecordStatus::Complete);

        let report = detect_drift(&root.join("STATE.md"), root).unwrap();
        assert_eq!(report, DriftReport::clean());
    }

    #[test]
    fn no_state_file_is_clean() {
        let dir = TempDir::new().unwrap();
        let report = detect_drift(&dir.path().join("STATE.md"), dir.path()).unwrap();
        assert!(!report.drifted);
        assert_eq!(report.kind, DriftKind::None);
    }

    #[test]
    fn checksum_mismatch_is_auto_fixable_file_drift() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(&root.join("phases/01-found/01-02-PLAN.md"), "# p\n");
        saved_record(&root.join("STATE.md"), 1, 2, RecordStatus::InProgress);

        let content = std::fs::read_to_string(root.join("STATE.md")).unwrap();
        std::fs::write(root.join("STATE.md"), content.replace("phase: 1", "phase: 2")).unwrap();

        let report = detect_drift(&root.join("STATE.md"), root).unwrap();
        assert!(report.drifted);
        assert_eq!(report.kind, DriftKind::FileChanges);
        assert!(report.auto_fixable);
        assert_eq!(
            report.details,
            vec!["State checksum mismatch - file was modified outside planview"]
        );
    }

    #[test]
    fn in_progress_without_summary_is_state_mismatch() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(&root.join("phases/01-found/01-02-PLAN.md"), "# p\n");
        saved_record(&root.join("STATE.md"), 1, 2, RecordStatus::InProgress);

        let report = detect_drift(&root.join("STATE.md"), root).unwrap();
        assert!(report.drifted);
        assert_eq!(report.kind, DriftKind::StateMismatch);
        assert!(!report.auto_fixable);
        assert_eq!(
            report.details,
            vec!["State claims plan 01-02 is in-progress but no SUMMARY.md exists"]
        );
    }

    #[test]
    fn missing_phase_directory_is_reported() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(&root.join("phases/01-found/01-01-PLAN.md"), "# p\n");
        saved_record(&root.join("STATE.md"), 2, 1, RecordStatus::NotStarted);

        let report = detect_drift(&root.join("STATE.md"), root).unwrap();
        assert!(report.drifted);
        assert_eq!(report.details, vec!["Phase directory for phase 2 not found"]);
    }

    #[test]
    fn missing_plan_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(&root.join("phases/01-found/01-01-PLAN.md"), "# p\n");
        saved_record(&root.join("STATE.md"), 1, 3, RecordStatus::Blocked);

        let report = detect_drift(&root.join("STATE.md"), root).unwrap();
        assert!(report.drifted);
        assert_eq!(
            report.details,
            vec!["State references plan 01-03 but no PLAN.md exists"]
        );
    }

    #[test]
    fn checksum_drift_wins_over_structural_checks() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        saved_record(&root.join("STATE.md"), 1, 2, RecordStatus::InProgress);

        let content = std::fs::read_to_string(root.join("STATE.md")).unwrap();
        std::fs::write(
            root.join("STATE.md"),
            content.replace("planIndex: 2", "planIndex: 5"),
        )
        .unwrap();

        let report = detect_drift(&root.join("STATE.md"), root).unwrap();
        assert_eq!(report.kind, DriftKind::FileChanges);
    }

    #[test]
    fn check_resolves_the_state_path_itself() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(&root.join("phases/01-found/01-01-PLAN.md"), "# p\n");
        saved_record(&root.join("STATE.md"), 1, 1, RecordStatus::NotStarted);

        let report = check(root).unwrap();
        assert!(!report.drifted);
    }
}

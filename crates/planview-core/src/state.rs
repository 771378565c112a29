use crate::error::Result;
use crate::frontmatter;
use crate::io;
use crate::types::RecordStatus;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::OnceLock;

pub const CONFLICT_MESSAGE: &str =
    "State file was modified outside planview. Content has changed since last save.";

/// A decision bullet from the `## Decisions` section of STATE.md.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub id: String,
    pub decision: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    pub phase: String,
    pub date: String,
    #[serde(default)]
    pub rejected: bool,
}

/// Result of comparing a stored checksum against the one derived from the
/// record's own fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport {
    pub has_conflict: bool,
    pub expected_checksum: String,
    pub actual_checksum: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// The structured header of STATE.md.
///
/// The checksum covers the position fields, so any out-of-band edit to them
/// is detectable on the next load. Decisions live in the markdown body, not
/// the YAML header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StateRecord {
    pub version: String,
    pub phase: u32,
    pub plan_index: u32,
    pub total_phases: u32,
    pub total_plans: u32,
    pub status: RecordStatus,
    pub last_activity: String,
    pub checksum: String,
    #[serde(skip)]
    pub decisions: Vec<Decision>,
}

impl Default for StateRecord {
    fn default() -> Self {
        StateRecord {
            version: "1.0.0".to_string(),
            phase: 1,
            plan_index: 0,
            total_phases: 1,
            total_plans: 1,
            status: RecordStatus::NotStarted,
            last_activity: String::new(),
            checksum: String::new(),
            decisions: Vec::new(),
        }
    }
}

impl StateRecord {
    /// First 8 hex chars of the SHA-256 over the pipe-joined position
    /// fields.
    pub fn compute_checksum(&self) -> String {
        let input = format!(
            "{}|{}|{}|{}|{}",
            self.phase, self.plan_index, self.total_phases, self.total_plans, self.status
        );
        let digest = Sha256::digest(input.as_bytes());
        hex::encode(digest)[..8].to_string()
    }

    /// Read STATE.md from `path`.
    ///
    /// Returns `Ok(None)` when the file does not exist. A malformed header
    /// degrades to default fields. The returned report flags a conflict
    /// only when a non-empty stored checksum disagrees with the recomputed
    /// one; a record that has never been saved carries no checksum and is
    /// never in conflict.
    pub fn load(path: &Path) -> Result<Option<(StateRecord, ConflictReport)>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut record: StateRecord = match frontmatter::split(&content) {
            Some((header, _)) => serde_yaml::from_str(header).unwrap_or_default(),
            None => StateRecord::default(),
        };
        record.decisions = extract_decisions(&content);

        let stored = record.checksum.clone();
        let actual = record.compute_checksum();
        let conflict = if !stored.is_empty() && stored != actual {
            ConflictReport {
                has_conflict: true,
                expected_checksum: stored,
                actual_checksum: actual,
                message: Some(CONFLICT_MESSAGE.to_string()),
            }
        } else {
            ConflictReport {
                has_conflict: false,
                expected_checksum: if stored.is_empty() {
                    actual.clone()
                } else {
                    stored
                },
                actual_checksum: actual,
                message: None,
            }
        };
        Ok(Some((record, conflict)))
    }

    /// Write STATE.md to `path`, refreshing the checksum and activity date
    /// and rendering the status table and decision list into the body.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.checksum = self.compute_checksum();
        self.last_activity = chrono::Local::now().format("%Y-%m-%d").to_string();
        let body = render_body(self);
        let content = frontmatter::render(self, &body)?;
        io::atomic_write(path, &content)
    }
}

/// Compare a stored checksum against `record`'s fields, nothing else.
pub fn detect_conflict(stored: &str, record: &StateRecord) -> ConflictReport {
    let actual = record.compute_checksum();
    let has_conflict = stored != actual;
    ConflictReport {
        has_conflict,
        expected_checksum: stored.to_string(),
        actual_checksum: actual,
        message: has_conflict.then(|| CONFLICT_MESSAGE.to_string()),
    }
}

fn render_body(record: &StateRecord) -> String {
    let mut body = format!(
        "## Status\n\n\
         | Phase | Plan | Total Phases | Total Plans | Status |\n\
         |-------|------|--------------|-------------|--------|\n\
         | {} | {} | {} | {} | {} |\n\n\
         ## Decisions\n\n",
        record.phase, record.plan_index, record.total_phases, record.total_plans, record.status
    );
    if record.decisions.is_empty() {
        body.push_str("No decisions recorded yet.\n");
    } else {
        for decision in &record.decisions {
            let rejected = if decision.rejected { "[REJECTED] " } else { "" };
            body.push_str(&format!(
                "- **{rejected}{}** ({}, {}): {}\n",
                decision.id, decision.phase, decision.date, decision.decision
            ));
            if let Some(reasoning) = &decision.reasoning {
                body.push_str(&format!("  - Reasoning: {reasoning}\n"));
            }
        }
    }
    body
}

/// Parse decision bullets from the `## Decisions` section, picking up an
/// indented `- Reasoning:` line when one directly follows a bullet.
pub fn extract_decisions(content: &str) -> Vec<Decision> {
    let Some(start) = content.find("## Decisions") else {
        return Vec::new();
    };
    let section = &content[start..];
    let section = match section.find("\n## ") {
        Some(end) => &section[..end],
        None => section,
    };

    let mut decisions = Vec::new();
    let mut lines = section.lines().peekable();
    while let Some(line) = lines.next() {
        let Some(caps) = decision_re().captures(line) else {
            continue;
        };
        let mut decision = Decision {
            id: caps[2].to_string(),
            decision: caps[5].trim().to_string(),
            reasoning: None,
            phase: caps[3].trim().to_string(),
            date: caps[4].trim().to_string(),
            rejected: caps.get(1).is_some(),
        };
        if let Some(next) = lines.peek() {
            if let Some(reason) = reasoning_re().captures(next) {
                decision.reasoning = Some(reason[1].trim().to_string());
                lines.next();
            }
        }
        decisions.push(decision);
    }
    decisions
}

static DECISION_RE: OnceLock<Regex> = OnceLock::new();
static REASONING_RE: OnceLock<Regex> = OnceLock::new();

fn decision_re() -> &'static Regex {
    DECISION_RE.get_or_init(|| {
        Regex::new(r"^- \*\*(\[REJECTED\] )?(.+?)\*\* \(([^,]+), ([^)]+)\): (.+)$")
            .expect("valid regex")
    })
}

fn reasoning_re() -> &'static Regex {
    REASONING_RE.get_or_init(|| Regex::new(r"^\s+- Reasoning: (.+)$").expect("valid regex"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_record() -> StateRecord {
        StateRecord {
            version: "1.0.0".into(),
            phase: 2,
            plan_index: 3,
            total_phases: 4,
            total_plans: 9,
            status: RecordStatus::InProgress,
            last_activity: String::new(),
            checksum: String::new(),
            decisions: vec![
                Decision {
                    id: "arch-01".into(),
                    decision: "Use server-sent events for updates".into(),
                    reasoning: Some("Single direction, simple reconnect".into()),
                    phase: "01-foundation".into(),
                    date: "2026-01-10".into(),
                    rejected: false,
                },
                Decision {
                    id: "arch-02".into(),
                    decision: "Poll the filesystem every second".into(),
                    reasoning: None,
                    phase: "01-foundation".into(),
                    date: "2026-01-11".into(),
                    rejected: true,
                },
            ],
        }
    }

    #[test]
    fn checksum_is_stable_and_short() {
        let record = sample_record();
        let first = record.compute_checksum();
        let second = record.compute_checksum();
        assert_eq!(first, second);
        assert_eq!(first.len(), 8);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn checksum_changes_with_position() {
        let record = sample_record();
        let mut moved = record.clone();
        moved.plan_index += 1;
        assert_ne!(record.compute_checksum(), moved.compute_checksum());
    }

    #[test]
    fn detect_conflict_is_plain_comparison() {
        let record = sample_record();
        let actual = record.compute_checksum();

        let clean = detect_conflict(&actual, &record);
        assert!(!clean.has_conflict);
        assert!(clean.message.is_none());

        let dirty = detect_conflict("deadbeef", &record);
        assert!(dirty.has_conflict);
        assert_eq!(dirty.expected_checksum, "deadbeef");
        assert_eq!(dirty.actual_checksum, actual);
        assert_eq!(dirty.message.as_deref(), Some(CONFLICT_MESSAGE));

        let empty = detect_conflict("", &record);
        assert!(empty.has_conflict);
    }

    #[test]
    fn save_then_load_round_trips_without_conflict() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("STATE.md");
        let mut record = sample_record();
        record.save(&path).unwrap();

        let (loaded, conflict) = StateRecord::load(&path).unwrap().unwrap();
        assert!(!conflict.has_conflict);
        assert_eq!(loaded.phase, 2);
        assert_eq!(loaded.plan_index, 3);
        assert_eq!(loaded.status, RecordStatus::InProgress);
        assert_eq!(loaded.checksum, loaded.compute_checksum());
        assert!(!loaded.last_activity.is_empty());
        assert_eq!(loaded.decisions, record.decisions);
    }

    #[test]
    fn rendered_body_has_status_table_and_decisions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("STATE.md");
        let mut record = sample_record();
        record.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("## Status"));
        assert!(content.contains("| 2 | 3 | 4 | 9 | in-progress |"));
        assert!(content.contains("- **arch-01** (01-foundation, 2026-01-10): Use server-sent events for updates"));
        assert!(content.contains("  - Reasoning: Single direction, simple reconnect"));
        assert!(content.contains("- **[REJECTED] arch-02** (01-foundation, 2026-01-11): Poll the filesystem every second"));
    }

    #[test]
    fn empty_decisions_render_placeholder() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("STATE.md");
        let mut record = StateRecord::default();
        record.save(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("No decisions recorded yet."));
    }

    #[test]
    fn load_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(StateRecord::load(&dir.path().join("STATE.md"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn load_flags_out_of_band_edit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("STATE.md");
        let mut record = sample_record();
        record.save(&path).unwrap();

        // Bump the phase without refreshing the checksum, like a hand edit.
        let content = std::fs::read_to_string(&path).unwrap();
        let tampered = content.replace("phase: 2", "phase: 3");
        std::fs::write(&path, tampered).unwrap();

        let (loaded, conflict) = StateRecord::load(&path).unwrap().unwrap();
        assert_eq!(loaded.phase, 3);
        assert!(conflict.has_conflict);
        assert_eq!(conflict.message.as_deref(), Some(CONFLICT_MESSAGE));
        assert_eq!(conflict.expected_checksum, record.checksum);
    }

    #[test]
    fn load_without_stored_checksum_is_clean() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("STATE.md");
        std::fs::write(&path, "---\nphase: 2\nplanIndex: 1\n---\n").unwrap();

        let (record, conflict) = StateRecord::load(&path).unwrap().unwrap();
        assert!(!conflict.has_conflict);
        assert_eq!(record.phase, 2);
        assert_eq!(record.plan_index, 1);
        assert_eq!(record.version, "1.0.0");
        assert_eq!(record.status, RecordStatus::NotStarted);
        assert_eq!(conflict.expected_checksum, conflict.actual_checksum);
    }

    #[test]
    fn malformed_header_degrades_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("STATE.md");
        std::fs::write(&path, "---\n: : nope : :\n---\nbody\n").unwrap();

        let (record, conflict) = StateRecord::load(&path).unwrap().unwrap();
        assert_eq!(record, StateRecord::default());
        assert!(!conflict.has_conflict);
    }

    #[test]
    fn extract_decisions_ignores_other_sections() {
        let content = "\
## Status

a table

## Decisions

- **d-1** (02-engine, 2026-02-01): Cache snapshots in memory
  - Reasoning: Rebuilds are cheap but not free
- not a decision bullet

## Notes

- **not-d** (x, y): outside the section
";
        let decisions = extract_decisions(content);
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].id, "d-1");
        assert_eq!(decisions[0].phase, "02-engine");
        assert_eq!(decisions[0].reasoning.as_deref(), Some("Rebuilds are cheap but not free"));
        assert!(!decisions[0].rejected);
    }
}

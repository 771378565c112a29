use crate::types::TaskStatus;
use serde::{Deserialize, Serialize};

/// A timestamped annotation attached to a plan's frontmatter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub timestamp: String,
    pub content: String,
}

/// One plan file, normalized for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Stable identity `NN-MM` (zero-padded phase and plan numbers).
    pub id: String,
    /// Phase directory or feature folder the plan came from.
    pub phase_label: String,
    pub plan_number: u32,
    #[serde(default = "default_wave")]
    pub wave: u32,
    #[serde(default)]
    pub depends_on: Vec<String>,
    pub status: TaskStatus,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files_modified: Vec<String>,
    pub source_path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<Note>,
}

fn default_wave() -> u32 {
    1
}

impl Task {
    /// Compose the canonical `NN-MM` identity from phase and plan numbers.
    pub fn compose_id(phase: u32, plan: u32) -> String {
        format!("{phase:02}-{plan:02}")
    }

    /// Parse an `NN-MM` identity back into `(phase, plan)` numbers.
    pub fn id_parts(id: &str) -> Option<(u32, u32)> {
        let (phase, plan) = id.split_once('-')?;
        Some((phase.parse().ok()?, plan.parse().ok()?))
    }
}

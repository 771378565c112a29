use crate::task::Task;
use crate::types::{ConnectionStatus, PhaseStatus};
use serde::{Deserialize, Serialize};

/// A roadmap phase rolled up from its plan checklist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub id: u32,
    /// Slug form of the phase title, e.g. `core-engine`.
    pub name: String,
    /// Display form, e.g. `Phase 2: Core Engine`.
    pub full_name: String,
    pub status: PhaseStatus,
    pub plans_total: u32,
    pub plans_complete: u32,
}

/// The complete dashboard state derived from one planning tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub tasks: Vec<Task>,
    pub phases: Vec<Phase>,
    pub current_phase: u32,
    pub current_plan: u32,
    /// Raw roadmap markdown, empty when no ROADMAP.md exists.
    pub roadmap: String,
    pub connection_status: ConnectionStatus,
}

impl Snapshot {
    /// The snapshot of a missing or empty planning tree.
    pub fn empty() -> Self {
        Snapshot {
            tasks: Vec::new(),
            phases: Vec::new(),
            current_phase: 1,
            current_plan: 1,
            roadmap: String::new(),
            connection_status: ConnectionStatus::Connected,
        }
    }
}

use crate::config::RuntimeConfig;
use crate::error::Result;
use crate::parser::{self, FileKind, ParseContext};
use crate::paths;
use crate::snapshot::{Phase, Snapshot};
use crate::task::Task;
use crate::types::{LayoutMode, PhaseStatus, TaskStatus};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Reduce a planning tree to a [`Snapshot`].
///
/// The walk is tolerant: unreadable files and directories are skipped with
/// a warning, malformed plan files degrade to filename identity, and a
/// missing tree yields the empty snapshot. Tasks are keyed by their
/// `NN-MM` identity; later duplicates of an identity are dropped.
pub fn build_snapshot(planning_dir: &Path) -> Result<Snapshot> {
    if !planning_dir.is_dir() {
        return Ok(Snapshot::empty());
    }

    let layout = detect_layout(planning_dir);
    let feature_phases = feature_phase_numbers(&layout.features, layout.active.as_deref());

    let mut position = None;
    if let Some(path) = state_path_for(planning_dir, &layout) {
        if let Ok(content) = std::fs::read_to_string(&path) {
            position = parser::parse_position(&content);
        }
    }

    let roadmap_file = paths::roadmap_path(planning_dir);
    let (roadmap_phases, roadmap) = match std::fs::read_to_string(&roadmap_file) {
        Ok(content) => (parser::parse_roadmap(&content), content),
        Err(_) => (Vec::new(), String::new()),
    };

    let mut files = Vec::new();
    collect_files(planning_dir, &mut files);
    files.sort();

    let ctx = ParseContext {
        position,
        feature_phases: feature_phases.clone(),
    };

    let mut by_id: BTreeMap<(u32, u32), Task> = BTreeMap::new();
    let mut skipped = 0usize;
    let mut collisions = 0usize;
    for path in &files {
        if parser::classify(path) != Some(FileKind::Plan) {
            continue;
        }
        let segment = parser::feature_segment(path);
        let keep = if layout.feature_mode {
            matches!((&segment, &layout.active), (Some(s), Some(a)) if s == a)
        } else {
            segment.is_none()
        };
        if !keep {
            continue;
        }
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("skipping unreadable plan {}: {e}", path.display());
                continue;
            }
        };
        match parser::parse_plan(path, &content, &ctx) {
            Some(task) => match Task::id_parts(&task.id) {
                Some(key) => {
                    use std::collections::btree_map::Entry;
                    match by_id.entry(key) {
                        Entry::Vacant(slot) => {
                            slot.insert(task);
                        }
                        Entry::Occupied(_) => collisions += 1,
                    }
                }
                None => skipped += 1,
            },
            None => skipped += 1,
        }
    }
    if skipped > 0 || collisions > 0 {
        tracing::debug!(
            "snapshot build skipped {skipped} plan file(s), dropped {collisions} duplicate id(s)"
        );
    }
    let tasks: Vec<Task> = by_id.into_values().collect();

    let phases = if layout.feature_mode && roadmap_phases.is_empty() && !tasks.is_empty() {
        synthesize_phases(&tasks, &feature_phases)
    } else {
        roadmap_phases
    };

    let (current_phase, current_plan) = match position {
        Some(p) => (p.phase, p.plan_index),
        None => (1, 1),
    };

    Ok(Snapshot {
        tasks,
        phases,
        current_phase,
        current_plan,
        roadmap,
        connection_status: crate::types::ConnectionStatus::Connected,
    })
}

/// The STATE.md that drives the dashboard position, when one exists.
///
/// Feature mode prefers the active feature's own state file, then any
/// feature's, then the planning root; project mode uses the root only.
pub fn authoritative_state_path(planning_dir: &Path) -> Option<PathBuf> {
    let layout = detect_layout(planning_dir);
    state_path_for(planning_dir, &layout)
}

struct Layout {
    feature_mode: bool,
    active: Option<String>,
    features: Vec<String>,
}

fn detect_layout(planning_dir: &Path) -> Layout {
    let config = RuntimeConfig::load(planning_dir);
    let features = enumerate_features(planning_dir);
    let feature_mode = match config.mode {
        Some(LayoutMode::Feature) => true,
        Some(LayoutMode::Project) => false,
        None => !features.is_empty() && !paths::roadmap_path(planning_dir).is_file(),
    };
    let active = if feature_mode {
        resolve_active_feature(&config, &features)
    } else {
        None
    };
    Layout {
        feature_mode,
        active,
        features,
    }
}

fn enumerate_features(planning_dir: &Path) -> Vec<String> {
    let mut features = Vec::new();
    let Ok(entries) = std::fs::read_dir(paths::features_dir(planning_dir)) else {
        return features;
    };
    for entry in entries.flatten() {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if !file_type.is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if name.starts_with(paths::FEATURE_PREFIX) {
                features.push(name.to_string());
            }
        }
    }
    features.sort();
    features
}

/// A configured selector is trusted even when the folder does not exist
/// yet; without one, exactly one feature folder selects itself.
fn resolve_active_feature(config: &RuntimeConfig, features: &[String]) -> Option<String> {
    if let Some(selector) = config.active_selector() {
        return Some(paths::feature_folder_name(selector));
    }
    if features.len() == 1 {
        return features.first().cloned();
    }
    None
}

/// Assign synthetic phase numbers to feature folders, the active feature
/// first, the rest in sorted order.
fn feature_phase_numbers(features: &[String], active: Option<&str>) -> BTreeMap<String, u32> {
    let mut numbers = BTreeMap::new();
    let mut next = 1;
    if let Some(active) = active {
        numbers.insert(active.to_string(), next);
        next += 1;
    }
    for folder in features {
        if !numbers.contains_key(folder.as_str()) {
            numbers.insert(folder.clone(), next);
            next += 1;
        }
    }
    numbers
}

fn state_path_for(planning_dir: &Path, layout: &Layout) -> Option<PathBuf> {
    if layout.feature_mode {
        if let Some(active) = &layout.active {
            let candidate = paths::feature_dir(planning_dir, active).join(paths::STATE_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        for folder in &layout.features {
            let candidate = paths::feature_dir(planning_dir, folder).join(paths::STATE_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    let root = paths::state_path(planning_dir);
    root.is_file().then_some(root)
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("skipping unreadable directory {}: {e}", dir.display());
            return;
        }
    };
    for entry in entries.flatten() {
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        let path = entry.path();
        if file_type.is_dir() {
            collect_files(&path, out);
        } else {
            out.push(path);
        }
    }
}

fn synthesize_phases(tasks: &[Task], feature_phases: &BTreeMap<String, u32>) -> Vec<Phase> {
    let mut grouped: BTreeMap<u32, (String, Vec<&Task>)> = BTreeMap::new();
    for task in tasks {
        let id = feature_phases.get(&task.phase_label).copied().unwrap_or(0);
        grouped
            .entry(id)
            .or_insert_with(|| (task.phase_label.clone(), Vec::new()))
            .1
            .push(task);
    }
    grouped
        .into_iter()
        .map(|(id, (folder, tasks))| {
            let plans_total = tasks.len() as u32;
            let plans_complete = tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Complete)
                .count() as u32;
            let status = if plans_complete == plans_total {
                PhaseStatus::Complete
            } else if plans_complete > 0
                || tasks.iter().any(|t| t.status == TaskStatus::InProgress)
            {
                PhaseStatus::InProgress
            } else {
                PhaseStatus::Pending
            };
            let name = folder
                .strip_prefix(paths::FEATURE_PREFIX)
                .unwrap_or(&folder)
                .to_string();
            let full_name = title_case(&name);
            Phase {
                id,
                name,
                full_name,
                status,
                plans_total,
                plans_complete,
            }
        })
        .collect()
}

fn title_case(slug: &str) -> String {
    slug.split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

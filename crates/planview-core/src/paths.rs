use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory and file-name constants
// ---------------------------------------------------------------------------

pub const PLANNING_DIR: &str = ".planning";
pub const PHASES_DIR: &str = "phases";
pub const FEATURES_DIR: &str = "features";
pub const FEATURE_PREFIX: &str = "feature-";

pub const STATE_FILE: &str = "STATE.md";
pub const ROADMAP_FILE: &str = "ROADMAP.md";
pub const CONFIG_FILE: &str = "config.json";

pub const PLAN_SUFFIX: &str = "-PLAN.md";
pub const SUMMARY_SUFFIX: &str = "-SUMMARY.md";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn planning_dir(root: &Path) -> PathBuf {
    root.join(PLANNING_DIR)
}

pub fn state_path(planning_dir: &Path) -> PathBuf {
    planning_dir.join(STATE_FILE)
}

pub fn roadmap_path(planning_dir: &Path) -> PathBuf {
    planning_dir.join(ROADMAP_FILE)
}

pub fn config_path(planning_dir: &Path) -> PathBuf {
    planning_dir.join(CONFIG_FILE)
}

pub fn phases_dir(planning_dir: &Path) -> PathBuf {
    planning_dir.join(PHASES_DIR)
}

pub fn features_dir(planning_dir: &Path) -> PathBuf {
    planning_dir.join(FEATURES_DIR)
}

pub fn feature_dir(planning_dir: &Path, folder: &str) -> PathBuf {
    features_dir(planning_dir).join(folder)
}

/// Normalize a feature selector to its on-disk folder name: `"search"` and
/// `"feature-search"` both resolve to `"feature-search"`.
pub fn feature_folder_name(selector: &str) -> String {
    if selector.starts_with(FEATURE_PREFIX) {
        selector.to_string()
    } else {
        format!("{FEATURE_PREFIX}{selector}")
    }
}

/// The summary path that marks a plan file complete: same directory, same
/// stem, `-SUMMARY.md` in place of `-PLAN.md`. Returns `None` for paths that
/// are not plan files.
pub fn summary_sibling(plan_path: &Path) -> Option<PathBuf> {
    let name = plan_path.file_name()?.to_str()?;
    let stem = name.strip_suffix(PLAN_SUFFIX)?;
    Some(plan_path.with_file_name(format!("{stem}{SUMMARY_SUFFIX}")))
}

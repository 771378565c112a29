use planview_core::paths;
use std::path::{Path, PathBuf};

/// Resolve the project root: an explicit flag wins, then the nearest
/// ancestor containing a `.planning` directory, then the nearest with
/// `.git`, then the current directory itself.
pub fn resolve_root(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(root) = explicit {
        return root;
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_root_from(&cwd)
}

fn find_root_from(start: &Path) -> PathBuf {
    for marker in [paths::PLANNING_DIR, ".git"] {
        let mut dir = start;
        loop {
            if dir.join(marker).is_dir() {
                return dir.to_path_buf();
            }
            match dir.parent() {
                Some(parent) => dir = parent,
                None => break,
            }
        }
    }
    start.to_path_buf()
}

use crate::paths;
use crate::types::LayoutMode;
use serde::Deserialize;
use std::path::Path;

/// Optional `config.json` at the planning root.
///
/// Everything in it is advisory: a missing or corrupt file falls back to
/// autodetection from the directory layout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub mode: Option<LayoutMode>,
    pub feature_name: Option<String>,
    pub active_feature: Option<String>,
}

impl RuntimeConfig {
    pub fn load(planning_dir: &Path) -> Self {
        let path = paths::config_path(planning_dir);
        let Ok(content) = std::fs::read_to_string(&path) else {
            return RuntimeConfig::default();
        };
        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("ignoring malformed {}: {e}", path.display());
                RuntimeConfig::default()
            }
        }
    }

    /// Which feature folder the dashboard should show, `active_feature`
    /// winning over `feature_name`.
    pub fn active_selector(&self) -> Option<&str> {
        self.active_feature.as_deref().or(self.feature_name.as_deref())
    }
}

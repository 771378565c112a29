use crate::hub::Hub;
use std::path::PathBuf;

/// Shared state for all routes: the tree being served and the update hub.
#[derive(Clone)]
pub struct AppState {
    pub planning_dir: PathBuf,
    pub hub: Hub,
}

impl AppState {
    pub fn new(planning_dir: PathBuf) -> Self {
        let hub = Hub::new(planning_dir.clone());
        AppState { planning_dir, hub }
    }
}

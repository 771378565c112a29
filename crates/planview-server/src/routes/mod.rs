pub mod drift;
pub mod events;
pub mod notes;
pub mod snapshot;
pub mod state;

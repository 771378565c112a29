pub mod drift;
pub mod note;
pub mod schedule;
pub mod serve;
pub mod state;
pub mod status;

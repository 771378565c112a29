pub mod builder;
pub mod config;
pub mod drift;
pub mod error;
pub mod frontmatter;
pub mod io;
pub mod notes;
pub mod parser;
pub mod paths;
pub mod schedule;
pub mod snapshot;
pub mod state;
pub mod task;
pub mod types;

pub use error::{PlanviewError, Result};

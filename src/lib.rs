pub mod backfill;
pub mod cli;
pub mod config;
pub mod dates;
pub mod error;
pub mod git;
pub mod merge;
pub mod model;
pub mod ports;
pub mod show;

pub use error::{BackfillError, Result};

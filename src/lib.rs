//! Black-box regression harness for the database CLI
//!
//! The harness invokes the CLI's compiled binary, parses the JSON it prints
//! and checks selected fields, reporting `INF/` and `ERR/` lines and an exit
//! code suitable for CI gating.

pub mod cli;
pub mod commands;
pub mod common;
pub mod report;
pub mod scenario;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use report::{Outcome, Reporter};
pub use scenario::{FieldCheck, Predicate, RunSummary, Runner, Scenario};

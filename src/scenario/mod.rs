//! Regression scenarios
//!
//! A scenario prepares its preconditions, invokes the target binary with a
//! fixed argument list, evaluates a predicate against the JSON it prints and
//! hands the verdict to the reporter. Scenarios run strictly in order and the
//! run stops at the first failure, since later scenarios build on the state
//! earlier ones left behind.

mod builtin;
mod config;
mod predicate;
mod runner;
mod setup;

pub use builtin::{create_scenarios, JSON_FLAG};
pub use config::{load_suite, load_suites, ScenarioConfig, ScenarioSuite};
pub use predicate::{FieldCheck, Predicate, Verdict};
pub use runner::{Invocation, RunSummary, Runner};
pub use setup::SetupStep;

/// One ordered step of a regression run
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    /// Preconditions, applied in order before the invocation
    pub setup: Vec<SetupStep>,
    /// Arguments passed to the target binary
    pub args: Vec<String>,
    pub predicate: Predicate,
    pub success_label: String,
    pub failure_label: String,
    /// Overrides the run timeout; `Some(0)` waits indefinitely
    pub timeout_secs: Option<u64>,
}

impl Scenario {
    pub fn new<I, S>(name: &str, args: I, predicate: Predicate) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            description: None,
            setup: Vec::new(),
            args: args.into_iter().map(Into::into).collect(),
            predicate,
            success_label: name.to_string(),
            failure_label: format!("{name} failed"),
            timeout_secs: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_setup(mut self, step: SetupStep) -> Self {
        self.setup.push(step);
        self
    }

    pub fn with_labels(mut self, success: &str, failure: &str) -> Self {
        self.success_label = success.to_string();
        self.failure_label = failure.to_string();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

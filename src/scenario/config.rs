//! Scenario suite files
//!
//! Defines the data structures for deserializing YAML scenario suites and
//! turning them into runnable [`Scenario`]s.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::builtin::JSON_FLAGS;
use super::predicate::{FieldCheck, Predicate};
use super::setup::SetupStep;
use super::Scenario;
use crate::common::{Error, Result};

/// An ordered list of scenarios loaded from one YAML file
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct ScenarioSuite {
    pub scenarios: Vec<ScenarioConfig>,
}

/// One scenario as written in a suite file
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Name of the scenario, also the default success label
    pub name: String,
    /// Optional description of what the scenario verifies
    pub description: Option<String>,
    /// Preconditions run before the invocation
    #[serde(default, with = "serde_yaml::with::singleton_map_recursive")]
    pub setup: Vec<SetupStep>,
    /// Arguments for the target binary; must request JSON output
    pub args: Vec<String>,
    /// Per-scenario timeout override in seconds
    pub timeout_secs: Option<u64>,
    /// Checks that must all hold on the JSON response
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub expect: Vec<FieldCheck>,
    /// Label reported on success
    pub success: Option<String>,
    /// Label reported on failure
    pub failure: Option<String>,
}

impl ScenarioConfig {
    /// Validate and convert, resolving relative setup paths against `base`
    pub fn into_scenario(self, base: &Path) -> Result<Scenario> {
        if !self.args.iter().any(|arg| JSON_FLAGS.contains(&arg.as_str())) {
            return Err(Error::ScenarioParse(format!(
                "scenario '{}': args must request JSON output (one of {})",
                self.name,
                JSON_FLAGS.join(", ")
            )));
        }
        if self.expect.is_empty() {
            return Err(Error::ScenarioParse(format!(
                "scenario '{}': expect must contain at least one check",
                self.name
            )));
        }
        for check in &self.expect {
            check
                .validate()
                .map_err(|e| Error::ScenarioParse(format!("scenario '{}': {e}", self.name)))?;
        }

        let mut scenario = Scenario::new(&self.name, self.args, Predicate::all(self.expect));
        scenario.description = self.description;
        scenario.setup = self
            .setup
            .into_iter()
            .map(|step| step.relative_to(base))
            .collect();
        scenario.timeout_secs = self.timeout_secs;
        if let Some(success) = self.success {
            scenario.success_label = success;
        }
        if let Some(failure) = self.failure {
            scenario.failure_label = failure;
        }
        Ok(scenario)
    }
}

/// Load the scenarios of one suite file, in file order
pub fn load_suite(path: &Path) -> Result<Vec<Scenario>> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;

    let suite: ScenarioSuite = serde_yaml::from_str(&content).map_err(|e| {
        Error::ScenarioParse(format!("'{}': {}", path.display(), e))
    })?;

    let base = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    suite
        .scenarios
        .into_iter()
        .map(|config| config.into_scenario(&base))
        .collect()
}

/// Load several suites, concatenated in the order given
pub fn load_suites(paths: &[PathBuf]) -> Result<Vec<Scenario>> {
    let mut scenarios = Vec::new();
    for path in paths {
        scenarios.extend(load_suite(path)?);
    }
    Ok(scenarios)
}

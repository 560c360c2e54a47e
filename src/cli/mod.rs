//! CLI command handling
//!
//! Loads configuration, selects scenarios and maps the run to an exit code.

use colored::Colorize;

use crate::commands::{Commands, RunArgs, ScenarioArgs};
use crate::common::config::{Config, Overrides};
use crate::common::{paths, Result};
use crate::report::Reporter;
use crate::scenario::{self, Runner, Scenario};

/// Dispatch a CLI command, returning the process exit code
pub async fn dispatch(command: Commands) -> Result<i32> {
    match command {
        Commands::Run(args) => run(args).await,
        Commands::List(args) => list(args),
    }
}

async fn run(args: RunArgs) -> Result<i32> {
    let root = paths::project_root();
    let config = load_config(
        &args.scenarios,
        Overrides {
            binary: args.binary,
            timeout_secs: args.timeout,
            color: args.color,
            ..Default::default()
        },
    )?;

    let scenarios = select_scenarios(&args.scenarios.files, &config)?;
    let binary = paths::resolve_binary(&config.binary(), &root)?;

    let color = config.run.color.enabled();
    colored::control::set_override(color);

    tracing::info!(
        binary = %binary.display(),
        scenarios = scenarios.len(),
        timeout_secs = config.run.timeout_secs,
        ci = paths::in_ci(),
        "starting regression run"
    );

    let runner = Runner::new(binary, config.timeout());
    let mut reporter = Reporter::stdout(color);
    let summary = runner.run_all(&scenarios, &mut reporter).await?;

    tracing::info!(
        passed = summary.passed,
        total = summary.total,
        failed = ?summary.failed,
        "regression run finished"
    );

    Ok(summary.exit_code())
}

fn list(args: ScenarioArgs) -> Result<i32> {
    let config = load_config(&args, Overrides::default())?;
    let scenarios = select_scenarios(&args.files, &config)?;
    colored::control::set_override(config.run.color.enabled());

    for (i, scenario) in scenarios.iter().enumerate() {
        match &scenario.description {
            Some(desc) => println!("{:>3}  {}  {}", i + 1, scenario.name.bold(), desc.dimmed()),
            None => println!("{:>3}  {}", i + 1, scenario.name.bold()),
        }
    }

    Ok(0)
}

fn load_config(args: &ScenarioArgs, overrides: Overrides) -> Result<Config> {
    let root = paths::project_root();
    let config = Config::load(args.config.as_deref(), &root)?;
    Ok(config.with_overrides(Overrides {
        name: args.name.clone(),
        directory: args.directory.clone(),
        ..overrides
    }))
}

/// Suite files when given, the built-in `create` scenarios otherwise
fn select_scenarios(files: &[std::path::PathBuf], config: &Config) -> Result<Vec<Scenario>> {
    if files.is_empty() {
        Ok(scenario::create_scenarios(
            &config.create.name,
            &config.create.directory,
        ))
    } else {
        scenario::load_suites(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_builtin_scenarios_when_no_files() {
        let mut config = Config::default();
        config.create.name = "Named".to_string();

        let scenarios = select_scenarios(&[], &config).unwrap();
        assert_eq!(scenarios.len(), 3);
        assert_eq!(scenarios[0].args[2], "Named");
    }

    #[test]
    fn test_files_replace_builtin_scenarios() {
        let dir = tempfile::tempdir().unwrap();
        let suite = dir.path().join("suite.yaml");
        std::fs::write(
            &suite,
            "scenarios:\n  - name: only\n    args: [create, --json]\n    expect:\n      - exists: /status\n",
        )
        .unwrap();

        let scenarios = select_scenarios(&[suite], &Config::default()).unwrap();
        assert_eq!(scenarios.len(), 1);
        assert_eq!(scenarios[0].name, "only");
    }

    #[test]
    fn test_missing_suite_is_an_error() {
        let missing = vec![PathBuf::from("/nonexistent/suite.yaml")];
        assert!(select_scenarios(&missing, &Config::default()).is_err());
    }
}

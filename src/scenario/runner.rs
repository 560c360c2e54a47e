//! Scenario runner implementation
//!
//! Executes scenarios one at a time against the target binary. Each
//! invocation is awaited to completion (or timeout) before the next
//! scenario starts, and the first failed scenario ends the run.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command as TokioCommand;

use crate::common::{Error, Result};
use crate::report::{Outcome, Reporter};

use super::predicate::Verdict;
use super::Scenario;

/// What happened when the target binary was invoked
#[derive(Debug)]
pub enum Invocation {
    /// The process exited; only stdout takes part in the verdict
    Completed {
        stdout: String,
        exit_code: Option<i32>,
        elapsed: Duration,
    },
    /// The process was killed after the timeout elapsed
    TimedOut(Duration),
    /// The process could not be started
    SpawnFailed(String),
}

impl Invocation {
    /// Payload reported when the scenario fails
    pub fn payload(&self) -> String {
        match self {
            Invocation::Completed { stdout, .. } => stdout.clone(),
            Invocation::TimedOut(after) => {
                format!("no result: target binary killed after {}s", after.as_secs())
            }
            Invocation::SpawnFailed(error) => format!("no result: {error}"),
        }
    }
}

/// Totals of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Scenarios defined for the run
    pub total: usize,
    /// Scenarios that passed before the run ended
    pub passed: usize,
    /// Name of the scenario that stopped the run
    pub failed: Option<String>,
}

impl RunSummary {
    pub fn success(&self) -> bool {
        self.failed.is_none() && self.passed == self.total
    }

    /// Process exit code for CI gating
    pub fn exit_code(&self) -> i32 {
        if self.success() {
            0
        } else {
            1
        }
    }
}

/// Runs scenarios against one target binary
#[derive(Debug, Clone)]
pub struct Runner {
    binary: PathBuf,
    timeout: Option<Duration>,
}

impl Runner {
    /// `timeout` applies to each invocation; `None` waits indefinitely
    pub fn new(binary: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Run scenarios in order, stopping at the first failure
    ///
    /// Setup errors abort the run with an error; everything the target
    /// binary does wrong is a failed scenario instead.
    pub async fn run_all<W: Write>(
        &self,
        scenarios: &[Scenario],
        reporter: &mut Reporter<W>,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary {
            total: scenarios.len(),
            passed: 0,
            failed: None,
        };

        for scenario in scenarios {
            match self.run_scenario(scenario, reporter).await? {
                Outcome::Passed => summary.passed += 1,
                Outcome::Failed => {
                    summary.failed = Some(scenario.name.clone());
                    let skipped = summary.total - summary.passed - 1;
                    if skipped > 0 {
                        tracing::info!(skipped, "stopping after failed scenario");
                    }
                    break;
                }
            }
        }

        Ok(summary)
    }

    /// Run one scenario: setup, invoke, evaluate, report
    pub async fn run_scenario<W: Write>(
        &self,
        scenario: &Scenario,
        reporter: &mut Reporter<W>,
    ) -> Result<Outcome> {
        tracing::debug!(scenario = %scenario.name, "running scenario");

        for step in &scenario.setup {
            step.apply().await?;
        }

        let timeout = match scenario.timeout_secs {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => self.timeout,
        };

        let invocation = self.invoke(&scenario.args, timeout).await;
        let verdict = match &invocation {
            Invocation::Completed { stdout, .. } => scenario.predicate.evaluate_output(stdout),
            Invocation::TimedOut(after) => {
                Verdict::fail(format!("timed out after {}s", after.as_secs()))
            }
            Invocation::SpawnFailed(error) => Verdict::fail(error.clone()),
        };

        if let Some(reason) = &verdict.reason {
            tracing::warn!(scenario = %scenario.name, %reason, "scenario failed");
        }

        Ok(reporter.assert(
            verdict.passed,
            &scenario.success_label,
            &scenario.failure_label,
            &invocation.payload(),
        ))
    }

    /// Invoke the target binary and capture its stdout
    ///
    /// The exit code is recorded but never judged; the JSON `status` field
    /// carries the result.
    pub async fn invoke(&self, args: &[String], timeout: Option<Duration>) -> Invocation {
        tracing::debug!(binary = %self.binary.display(), ?args, "invoking target");

        let child = TokioCommand::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                let error = Error::Spawn {
                    binary: self.binary.display().to_string(),
                    error: e.to_string(),
                };
                return Invocation::SpawnFailed(error.to_string());
            }
        };

        let started = Instant::now();
        let output = match timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(output) => output,
                // Dropping the future drops the child, which kills it
                Err(_) => return Invocation::TimedOut(limit),
            },
            None => child.wait_with_output().await,
        };

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                return Invocation::SpawnFailed(format!(
                    "failed to collect output of '{}': {e}",
                    self.binary.display()
                ))
            }
        };

        let elapsed = started.elapsed();
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::debug!(
            exit_code = ?output.status.code(),
            elapsed_ms = elapsed.as_millis() as u64,
            stderr = %stderr.trim(),
            "target finished"
        );

        Invocation::Completed {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            exit_code: output.status.code(),
            elapsed,
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::scenario::{FieldCheck, Predicate, SetupStep};

    /// Scenario whose "binary" is `sh -c <script>`
    fn shell_scenario(name: &str, script: &str) -> Scenario {
        Scenario::new(
            name,
            ["-c", script, "--json"],
            Predicate::all([
                FieldCheck::equals("/status", 0),
                FieldCheck::path_equals("/data/path", ["/tmp", "CLI_Regression_DB"]),
            ]),
        )
        .with_labels(&format!("{name} ok"), &format!("{name} broken"))
    }

    const GOOD: &str =
        r#"printf '{"status":0,"data":{"path":"/tmp/CLI_Regression_DB"}}'"#;
    const BAD_STATUS: &str =
        r#"printf '{"status":-1,"error":{"cause":"Directory already exists"}}'; exit 1"#;

    fn reporter() -> Reporter<Vec<u8>> {
        Reporter::new(Vec::new(), false)
    }

    fn lines(reporter: Reporter<Vec<u8>>) -> Vec<String> {
        String::from_utf8(reporter.into_inner())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn sh() -> Runner {
        Runner::new("sh", Some(Duration::from_secs(10)))
    }

    #[tokio::test]
    async fn test_all_passing() {
        let scenarios = vec![shell_scenario("one", GOOD), shell_scenario("two", GOOD)];
        let mut out = reporter();

        let summary = sh().run_all(&scenarios, &mut out).await.unwrap();

        assert!(summary.success());
        assert_eq!(summary.exit_code(), 0);
        assert_eq!(summary.passed, 2);
        assert_eq!(lines(out), ["INF/one ok", "INF/two ok"]);
    }

    #[tokio::test]
    async fn test_stops_at_first_failure() {
        let scenarios = vec![
            shell_scenario("one", GOOD),
            shell_scenario("two", BAD_STATUS),
            shell_scenario("three", GOOD),
        ];
        let mut out = reporter();

        let summary = sh().run_all(&scenarios, &mut out).await.unwrap();

        assert_eq!(
            summary,
            RunSummary {
                total: 3,
                passed: 1,
                failed: Some("two".to_string()),
            }
        );
        assert_eq!(summary.exit_code(), 1);

        let lines = lines(out);
        assert_eq!(lines[0], "INF/one ok");
        assert_eq!(lines[1], "ERR/two broken");
        assert!(lines.iter().any(|l| l.contains("\"status\": -1")));
        assert!(!lines.iter().any(|l| l.contains("three")));
    }

    #[tokio::test]
    async fn test_exit_code_of_target_is_ignored() {
        let script = format!("{GOOD}; exit 7");
        let mut out = reporter();

        let outcome = sh()
            .run_scenario(&shell_scenario("nonzero", &script), &mut out)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Passed);
    }

    #[tokio::test]
    async fn test_empty_stdout_is_a_failure() {
        let mut out = reporter();
        let outcome = sh()
            .run_scenario(&shell_scenario("silent", "true"), &mut out)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(lines(out), ["ERR/silent broken", "(empty output)"]);
    }

    #[tokio::test]
    async fn test_wrong_path_is_a_failure() {
        let script = r#"printf '{"status":0,"data":{"path":"/elsewhere/CLI_Regression_DB"}}'"#;
        let mut out = reporter();
        let outcome = sh()
            .run_scenario(&shell_scenario("moved", script), &mut out)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Failed);
    }

    #[tokio::test]
    async fn test_timeout_is_a_failure() {
        let runner = Runner::new("sh", Some(Duration::from_millis(200)));
        let mut out = reporter();

        let started = Instant::now();
        let outcome = runner
            .run_scenario(&shell_scenario("slow", "sleep 5"), &mut out)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Failed);
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(lines(out)[0], "ERR/slow broken");
    }

    #[tokio::test]
    async fn test_scenario_timeout_overrides_runner() {
        let runner = Runner::new("sh", None);
        let scenario = shell_scenario("slow", "sleep 5").with_timeout_secs(1);
        let mut out = reporter();

        let started = Instant::now();
        let outcome = runner.run_scenario(&scenario, &mut out).await.unwrap();

        assert_eq!(outcome, Outcome::Failed);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_missing_binary_is_a_failure_not_an_error() {
        let runner = Runner::new("/nonexistent/db-cli", None);
        let mut out = reporter();

        let outcome = runner
            .run_scenario(&shell_scenario("absent", GOOD), &mut out)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Failed);
        let lines = lines(out);
        assert!(lines[1].contains("/nonexistent/db-cli"));
    }

    #[tokio::test]
    async fn test_setup_runs_before_invocation() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        std::fs::write(&marker, "stale").unwrap();

        // Succeeds only if the marker was removed by setup
        let script = format!(
            "test -e '{}' && printf '{{}}' || {GOOD}",
            marker.display()
        );
        let scenario =
            shell_scenario("clean", &script).with_setup(SetupStep::RemovePath(marker.clone()));
        let mut out = reporter();

        let outcome = sh().run_scenario(&scenario, &mut out).await.unwrap();

        assert_eq!(outcome, Outcome::Passed);
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn test_setup_failure_is_an_error() {
        let scenario =
            shell_scenario("broken setup", GOOD).with_setup(SetupStep::Shell("exit 1".into()));
        let mut out = reporter();

        let err = sh().run_scenario(&scenario, &mut out).await.unwrap_err();
        assert!(matches!(err, Error::Setup { .. }));
        assert!(lines(out).is_empty());
    }

    #[tokio::test]
    async fn test_runs_are_repeatable() {
        let scenarios = vec![shell_scenario("one", GOOD), shell_scenario("two", BAD_STATUS)];

        let mut first = reporter();
        let mut second = reporter();
        let a = sh().run_all(&scenarios, &mut first).await.unwrap();
        let b = sh().run_all(&scenarios, &mut second).await.unwrap();

        assert_eq!(a, b);
        assert_eq!(lines(first), lines(second));
    }
}

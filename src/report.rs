//! Pass/fail reporting
//!
//! Turns a verdict into a report line on stdout and an [`Outcome`] for the
//! caller. The reporter never stops the process itself; the runner decides
//! what a failed outcome means for the rest of the run.
//!
//! Line format:
//! - success: `INF/<label>`
//! - failure: `ERR/<label>` followed by the payload, pretty-printed when it
//!   is JSON and verbatim otherwise

use std::io::{self, IsTerminal, Write};

use colored::Colorize;
use serde::Deserialize;

/// When report lines are colorized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ColorChoice {
    /// Colorize when stdout is a terminal and `NO_COLOR` is unset
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    /// Resolve the choice against the current stdout
    pub fn enabled(self) -> bool {
        match self {
            ColorChoice::Auto => {
                io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
            }
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        }
    }
}

/// Kind of report line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Success,
    Failure,
}

impl ReportKind {
    /// Line prefix for this kind
    pub fn tag(self) -> &'static str {
        match self {
            ReportKind::Success => "INF",
            ReportKind::Failure => "ERR",
        }
    }

    fn paint(self, text: &str, color: bool) -> String {
        if !color {
            return text.to_string();
        }
        match self {
            ReportKind::Success => text.green().to_string(),
            ReportKind::Failure => text.red().bold().to_string(),
        }
    }
}

/// Result of asserting one verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed,
}

impl Outcome {
    pub fn is_passed(self) -> bool {
        self == Outcome::Passed
    }
}

/// Writes report lines to an output stream
pub struct Reporter<W> {
    out: W,
    color: bool,
}

impl Reporter<io::Stdout> {
    /// Reporter on the process stdout
    pub fn stdout(color: bool) -> Self {
        Self::new(io::stdout(), color)
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    /// Write an `INF/<label>` line
    pub fn report_success(&mut self, label: &str) {
        let line = format!("{}/{}", ReportKind::Success.tag(), label);
        let line = ReportKind::Success.paint(&line, self.color);
        self.write_line(&line);
    }

    /// Write an `ERR/<label>` line followed by the rendered payload
    pub fn report_failure(&mut self, label: &str, payload: &str) {
        let line = format!("{}/{}", ReportKind::Failure.tag(), label);
        let line = ReportKind::Failure.paint(&line, self.color);
        self.write_line(&line);
        self.write_line(&render_payload(payload));
    }

    /// Report a verdict and return the matching outcome
    pub fn assert(
        &mut self,
        verdict: bool,
        success_label: &str,
        failure_label: &str,
        payload: &str,
    ) -> Outcome {
        if verdict {
            self.report_success(success_label);
            Outcome::Passed
        } else {
            self.report_failure(failure_label, payload);
            Outcome::Failed
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            tracing::warn!(error = %e, "failed to write report line");
        }
    }
}

/// Pretty-print a JSON payload, or return it verbatim when it is not JSON
pub fn render_payload(payload: &str) -> String {
    if payload.trim().is_empty() {
        return "(empty output)".to_string();
    }
    serde_json::from_str::<serde_json::Value>(payload)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or_else(|_| payload.to_string())
}

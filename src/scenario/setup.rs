//! Scenario preconditions

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::Deserialize;
use tokio::process::Command as TokioCommand;

use crate::common::{Error, Result};

/// A precondition applied before the target binary is invoked
///
/// Every step is idempotent: applying it to an already satisfied state
/// succeeds without changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupStep {
    /// Ensure nothing exists at the path
    RemovePath(PathBuf),
    /// Ensure the directory and its parents exist
    CreateDir(PathBuf),
    /// Run a command with `sh -c`; a non-zero exit fails the run
    Shell(String),
}

impl fmt::Display for SetupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupStep::RemovePath(path) => write!(f, "remove {}", path.display()),
            SetupStep::CreateDir(path) => write!(f, "create dir {}", path.display()),
            SetupStep::Shell(command) => write!(f, "$ {command}"),
        }
    }
}

impl SetupStep {
    /// Resolve relative paths against `base`
    pub fn relative_to(self, base: &Path) -> Self {
        match self {
            SetupStep::RemovePath(path) if path.is_relative() => {
                SetupStep::RemovePath(base.join(path))
            }
            SetupStep::CreateDir(path) if path.is_relative() => {
                SetupStep::CreateDir(base.join(path))
            }
            other => other,
        }
    }

    pub async fn apply(&self) -> Result<()> {
        tracing::debug!(step = %self, "applying setup step");
        match self {
            SetupStep::RemovePath(path) => remove_path(path).map_err(|e| Error::setup(self, e)),
            SetupStep::CreateDir(path) => {
                std::fs::create_dir_all(path).map_err(|e| Error::setup(self, e))
            }
            SetupStep::Shell(command) => {
                let status = TokioCommand::new("sh")
                    .arg("-c")
                    .arg(command)
                    .stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::inherit())
                    .status()
                    .await
                    .map_err(|e| Error::setup(self, e))?;

                if status.success() {
                    Ok(())
                } else {
                    Err(Error::setup(
                        self,
                        format!("exited with code {:?}", status.code()),
                    ))
                }
            }
        }
    }
}

fn remove_path(path: &Path) -> std::io::Result<()> {
    // symlink_metadata so a link is removed rather than its target
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };

    let result = if metadata.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };

    match result {
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

//! Project, configuration and target binary paths
//!
//! The harness runs from the repository of the database tool. Inside CI the
//! checkout directory is taken from the provider's environment instead of the
//! current directory.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::{Error, Result};

/// Name used for configuration directories and files
const APP_NAME: &str = "db-regress";

/// Local configuration file looked up in the project root
pub const LOCAL_CONFIG_FILE: &str = "db-regress.toml";

/// Where the pre-built target binary is expected, relative to the project root
pub const DEFAULT_BINARY: &str = "target/debug/cli";

/// Environment variable overriding the configured target binary
pub const BINARY_ENV: &str = "DB_REGRESS_BIN";

/// Checkout directory variables set by common CI providers
const CI_WORKSPACE_VARS: &[&str] = &["GITHUB_WORKSPACE", "CI_PROJECT_DIR"];

/// Whether the harness runs inside a CI environment
pub fn in_ci() -> bool {
    ci_from(|name| std::env::var_os(name))
}

/// Get the project root used to resolve relative paths
///
/// Inside CI this is the provider's checkout directory when one is exported,
/// otherwise the current working directory.
pub fn project_root() -> PathBuf {
    root_from(|name| std::env::var_os(name)).unwrap_or_else(|| {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    })
}

/// `CI` counts when set to anything but empty, `false` or `0`
fn ci_from(lookup: impl Fn(&str) -> Option<OsString>) -> bool {
    lookup("CI").is_some_and(|v| !v.is_empty() && v != "false" && v != "0")
}

/// CI checkout directory, first non-empty workspace variable wins
fn root_from(lookup: impl Fn(&str) -> Option<OsString>) -> Option<PathBuf> {
    if !ci_from(&lookup) {
        return None;
    }
    CI_WORKSPACE_VARS
        .iter()
        .find_map(|var| lookup(*var).filter(|dir| !dir.is_empty()))
        .map(PathBuf::from)
}

/// Get the configuration directory path
///
/// Uses the directories crate for platform-appropriate locations:
/// - Linux: `~/.config/db-regress/`
/// - macOS: `~/Library/Application Support/db-regress/`
/// - Windows: `%APPDATA%\db-regress\`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the user configuration file
pub fn user_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Resolve the target binary to an existing file
///
/// Values containing a path separator are taken relative to `root`; bare
/// names are searched on `PATH` only.
pub fn resolve_binary(value: &Path, root: &Path) -> Result<PathBuf> {
    let is_bare_name = value.components().count() == 1 && !value.is_absolute();

    if is_bare_name {
        return which::which(value).map_err(|_| Error::BinaryNotFound {
            path: value.to_path_buf(),
        });
    }

    let path = if value.is_relative() {
        root.join(value)
    } else {
        value.to_path_buf()
    };

    if path.is_file() {
        Ok(path)
    } else {
        Err(Error::BinaryNotFound { path })
    }
}

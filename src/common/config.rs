//! Configuration file handling

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::paths::{self, BINARY_ENV, DEFAULT_BINARY, LOCAL_CONFIG_FILE};
use super::{Error, Result};
use crate::report::ColorChoice;

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Target binary settings
    #[serde(default)]
    pub target: TargetConfig,

    /// Run settings
    #[serde(default)]
    pub run: RunConfig,

    /// Parameters of the built-in `create` scenarios
    #[serde(default)]
    pub create: CreateConfig,
}

/// Target binary settings
#[derive(Debug, Deserialize, Default)]
pub struct TargetConfig {
    /// Path or bare name of the database CLI
    pub binary: Option<PathBuf>,
}

/// Run settings
#[derive(Debug, Deserialize)]
pub struct RunConfig {
    /// Per-invocation timeout, 0 waits indefinitely
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// When to colorize report lines
    #[serde(default)]
    pub color: ColorChoice,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            color: ColorChoice::default(),
        }
    }
}

fn default_timeout() -> u64 {
    60
}

/// Parameters shared by the built-in scenarios
#[derive(Debug, Deserialize)]
pub struct CreateConfig {
    /// Database name passed to `create --name`
    #[serde(default = "default_db_name")]
    pub name: String,

    /// Parent directory passed to `create --directory`
    #[serde(default = "default_db_directory")]
    pub directory: PathBuf,
}

impl Default for CreateConfig {
    fn default() -> Self {
        Self {
            name: default_db_name(),
            directory: default_db_directory(),
        }
    }
}

fn default_db_name() -> String {
    "CLI_Regression_DB".to_string()
}

fn default_db_directory() -> PathBuf {
    PathBuf::from("/tmp")
}

/// Command-line values that take precedence over the file
#[derive(Debug, Default)]
pub struct Overrides {
    pub binary: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub color: Option<ColorChoice>,
    pub name: Option<String>,
    pub directory: Option<PathBuf>,
}

impl Config {
    /// Load configuration
    ///
    /// An explicit path must exist. Otherwise `db-regress.toml` in `root` is
    /// tried, then the user config file; defaults apply when neither exists.
    pub fn load(explicit: Option<&Path>, root: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(Error::Config(format!(
                    "Config file '{}' does not exist",
                    path.display()
                )));
            }
            return Self::from_file(path);
        }

        let local = root.join(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Self::from_file(&local);
        }

        if let Some(path) = paths::user_config_path() {
            if path.is_file() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    fn from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "loading configuration");
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
        toml::from_str(&content).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// Apply command-line overrides and the binary environment variable
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        let env_binary = std::env::var_os(BINARY_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        self.target.binary = Some(pick_binary(
            overrides.binary,
            env_binary,
            self.target.binary.take(),
        ));

        if let Some(secs) = overrides.timeout_secs {
            self.run.timeout_secs = secs;
        }
        if let Some(color) = overrides.color {
            self.run.color = color;
        }
        if let Some(name) = overrides.name {
            self.create.name = name;
        }
        if let Some(directory) = overrides.directory {
            self.create.directory = directory;
        }
        self
    }

    /// The configured target binary, before resolution
    pub fn binary(&self) -> PathBuf {
        self.target
            .binary
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BINARY))
    }

    /// Per-invocation timeout, `None` when disabled
    pub fn timeout(&self) -> Option<Duration> {
        match self.run.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

fn pick_binary(
    flag: Option<PathBuf>,
    env: Option<PathBuf>,
    configured: Option<PathBuf>,
) -> PathBuf {
    flag.or(env)
        .or(configured)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_BINARY))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.binary(), PathBuf::from("target/debug/cli"));
        assert_eq!(config.timeout(), Some(Duration::from_secs(60)));
        assert_eq!(config.create.name, "CLI_Regression_DB");
        assert_eq!(config.create.directory, PathBuf::from("/tmp"));
        assert_eq!(config.run.color, ColorChoice::Auto);
    }

    #[test]
    fn test_parse_partial_file() {
        let config: Config = toml::from_str(
            r#"
[target]
binary = "build/dbcli"

[run]
timeout_secs = 0
color = "never"
"#,
        )
        .unwrap();

        assert_eq!(config.binary(), PathBuf::from("build/dbcli"));
        assert_eq!(config.timeout(), None);
        assert_eq!(config.run.color, ColorChoice::Never);
        assert_eq!(config.create.name, "CLI_Regression_DB");
    }

    #[test]
    fn test_local_file_is_picked_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(LOCAL_CONFIG_FILE),
            "[create]\nname = \"Local_DB\"\n",
        )
        .unwrap();

        let config = Config::load(None, dir.path()).unwrap();
        assert_eq!(config.create.name, "Local_DB");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml")), dir.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_invalid_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[run]\ntimeout_secs = \"soon\"\n").unwrap();

        let err = Config::load(Some(&path), dir.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_binary_precedence() {
        let flag = Some(PathBuf::from("flag"));
        let env = Some(PathBuf::from("env"));
        let file = Some(PathBuf::from("file"));

        assert_eq!(pick_binary(flag, env.clone(), file.clone()), PathBuf::from("flag"));
        assert_eq!(pick_binary(None, env, file.clone()), PathBuf::from("env"));
        assert_eq!(pick_binary(None, None, file), PathBuf::from("file"));
        assert_eq!(pick_binary(None, None, None), PathBuf::from(DEFAULT_BINARY));
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let config = Config::default().with_overrides(Overrides {
            binary: Some(PathBuf::from("/opt/cli")),
            timeout_secs: Some(5),
            color: Some(ColorChoice::Always),
            name: Some("Other".to_string()),
            directory: Some(PathBuf::from("/var/tmp")),
        });

        assert_eq!(config.binary(), PathBuf::from("/opt/cli"));
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.run.color, ColorChoice::Always);
        assert_eq!(config.create.name, "Other");
        assert_eq!(config.create.directory, PathBuf::from("/var/tmp"));
    }
}

use config::{Config, ConfigError, Environment, File as ConfigFile, FileFormat};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Cli;
use crate::error::Error;

pub const DEFAULT_MAX_FILE_COUNT: i64 = 150;
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 250;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    pub max_file_count: i64,
    pub ignore_hidden_files: bool,
    pub refresh_interval_ms: u64,
    pub package_query_program: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_file_count: DEFAULT_MAX_FILE_COUNT,
            ignore_hidden_files: false,
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            package_query_program: crate::scan::packages::DEFAULT_PROGRAM.to_string(),
        }
    }
}

/// Defaults, then the optional config file, then `FSSIZE_*` environment variables.
pub fn load_configuration() -> Result<AppConfig, Error> {
    Ok(load_from(config_file_path(), Environment::with_prefix("FSSIZE"))?)
}

fn load_from(file: Option<PathBuf>, environment: Environment) -> Result<AppConfig, ConfigError> {
    let defaults = AppConfig::default();
    let mut builder = Config::builder()
        .set_default("max_file_count", defaults.max_file_count)?
        .set_default("ignore_hidden_files", defaults.ignore_hidden_files)?
        .set_default("refresh_interval_ms", defaults.refresh_interval_ms)?
        .set_default("package_query_program", defaults.package_query_program)?;

    if let Some(path) = file {
        builder = builder.add_source(ConfigFile::from(path).format(FileFormat::Toml).required(false));
    }

    builder
        .add_source(environment)
        .build()?
        .try_deserialize::<AppConfig>()
}

fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = env::var("FSSIZE_CONFIG") {
        return Some(PathBuf::from(path));
    }
    let base = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|home| PathBuf::from(home).join(".config")))
        .ok()?;
    Some(base.join("fssize").join("config.toml"))
}

/// Effective run settings: configuration overridden by command line flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub max_file_count: i64,
    pub ignore_hidden_files: bool,
    pub refresh_interval: Duration,
    pub package_query_program: String,
}

impl Settings {
    pub fn resolve(cli: &Cli, config: &AppConfig) -> Self {
        Self {
            max_file_count: cli.max_file_count.unwrap_or(config.max_file_count),
            ignore_hidden_files: cli.ignore_hidden_files || config.ignore_hidden_files,
            refresh_interval: Duration::from_millis(config.refresh_interval_ms.max(1)),
            package_query_program: config.package_query_program.clone(),
        }
    }

    /// The list bound, or `None` when the count asks for no output at all.
    pub fn max_count(&self) -> Option<usize> {
        usize::try_from(self.max_file_count).ok().filter(|n| *n > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::tempdir;

    fn no_env() -> Environment {
        Environment::with_prefix("FSSIZE").source(Some(HashMap::new()))
    }

    #[test]
    fn test_defaults_without_file() {
        let config = load_from(None, no_env()).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.max_file_count, 150);
    }

    #[test]
    fn test_file_then_environment_precedence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "max_file_count = 20\nignore_hidden_files = true\nrefresh_interval_ms = 100\n",
        )
        .unwrap();

        let env = HashMap::from([("FSSIZE_MAX_FILE_COUNT".to_string(), "7".to_string())]);
        let environment = Environment::with_prefix("FSSIZE")
            .try_parsing(true)
            .source(Some(env));

        let config = load_from(Some(path), environment).unwrap();
        assert_eq!(config.max_file_count, 7);
        assert!(config.ignore_hidden_files);
        assert_eq!(config.refresh_interval_ms, 100);
        assert_eq!(config.package_query_program, "dpkg-query");
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let dir = tempdir().unwrap();
        let config = load_from(Some(dir.path().join("absent.toml")), no_env()).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_cli_overrides_config() {
        let config = AppConfig {
            max_file_count: 20,
            ..AppConfig::default()
        };

        let cli = Cli::parse_from(["fssize", "-i", "-c", "3"]);
        let settings = Settings::resolve(&cli, &config);
        assert_eq!(settings.max_file_count, 3);
        assert!(settings.ignore_hidden_files);

        let cli = Cli::parse_from(["fssize"]);
        let settings = Settings::resolve(&cli, &config);
        assert_eq!(settings.max_count(), Some(20));
        assert!(!settings.ignore_hidden_files);
    }

    #[test]
    fn test_non_positive_count_means_no_output() {
        let cli = Cli::parse_from(["fssize", "-c", "-5"]);
        let settings = Settings::resolve(&cli, &AppConfig::default());
        assert_eq!(settings.max_count(), None);

        let cli = Cli::parse_from(["fssize", "-c", "0"]);
        assert_eq!(Settings::resolve(&cli, &AppConfig::default()).max_count(), None);
    }
}

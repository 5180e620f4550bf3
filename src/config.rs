// Configuration management for the LPM router
// Supports CLI arguments, config file (TOML), and environment variables

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::Level;

use crate::driver::{DriverOptions, DumpFormat};
use crate::error::AppResult;

/// Longest-prefix-match IPv4 router - loads routes and resolves destination addresses
#[derive(Parser, Debug, Clone)]
#[command(name = "lpm-router")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Read routes and queries from this file instead of stdin
    #[arg(short, long, env = "LPM_INPUT")]
    pub input: Option<PathBuf>,

    /// Text printed for an address with no matching route
    #[arg(long, env = "LPM_MISS_MARKER")]
    pub miss_marker: Option<String>,

    /// Logging level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LPM_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Path to configuration file
    #[arg(short, long, env = "LPM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the loaded routing table to stderr before answering queries
    #[arg(long, env = "LPM_DUMP_ROUTES")]
    pub dump_routes: bool,

    /// Format of the routing table dump
    #[arg(long, value_enum, env = "LPM_DUMP_FORMAT")]
    pub dump_format: Option<DumpFormat>,
}

/// Configuration file structure (TOML format)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Text printed for an address with no matching route
    #[serde(default = "default_miss_marker")]
    pub miss_marker: String,

    /// Dump the routing table after loading
    #[serde(default)]
    pub dump_routes: bool,

    /// Dump format (text or json)
    #[serde(default)]
    pub dump_format: DumpFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_miss_marker() -> String {
    "-1".to_string()
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            miss_marker: default_miss_marker(),
            dump_routes: false,
            dump_format: DumpFormat::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
        }
    }
}

impl ConfigFile {
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let config_content = std::fs::read_to_string(path)?;
        Ok(toml::from_str::<ConfigFile>(&config_content)?)
    }
}

/// Merged configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    pub input: Option<PathBuf>,
    pub log_level: Level,
    pub driver: DriverOptions,
}

impl Config {
    /// Load configuration from all sources (CLI args, config file, defaults)
    /// Priority: CLI args / environment variables > Config file > Defaults
    pub fn load() -> anyhow::Result<Self> {
        let cli_args = CliArgs::parse();

        // Load config file if specified
        let config_file = if let Some(config_path) = &cli_args.config {
            ConfigFile::from_path(config_path)?
        } else {
            // Try loading from default locations
            let default_paths = vec![PathBuf::from("lpm-router.toml"), PathBuf::from("config.toml")];

            let mut loaded_config = None;
            for path in default_paths {
                if path.exists() {
                    loaded_config = Some(ConfigFile::from_path(&path)?);
                    break;
                }
            }

            loaded_config.unwrap_or_default()
        };

        Self::merge(cli_args, config_file)
    }

    /// Merge configuration (CLI args override config file)
    pub fn merge(cli_args: CliArgs, config_file: ConfigFile) -> anyhow::Result<Self> {
        let level = cli_args.log_level.unwrap_or(config_file.logging.level);
        let log_level = parse_log_level(&level)?;

        let driver = DriverOptions {
            miss_marker: cli_args.miss_marker.unwrap_or(config_file.output.miss_marker),
            dump_routes: cli_args.dump_routes || config_file.output.dump_routes,
            dump_format: cli_args.dump_format.unwrap_or(config_file.output.dump_format),
        };

        Ok(Config {
            input: cli_args.input,
            log_level,
            driver,
        })
    }
}

fn parse_log_level(level_str: &str) -> anyhow::Result<Level> {
    match level_str.to_lowercase().as_str() {
        "error" => Ok(Level::ERROR),
        "warn" => Ok(Level::WARN),
        "info" => Ok(Level::INFO),
        "debug" => Ok(Level::DEBUG),
        "trace" => Ok(Level::TRACE),
        _ => Err(anyhow::anyhow!("Invalid log level: {}", level_str)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();
        assert_eq!(config.output.miss_marker, "-1");
        assert!(!config.output.dump_routes);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_parse_config_file() {
        let config: ConfigFile = toml::from_str(
            r#"
            [output]
            miss_marker = "unreachable"
            dump_format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.output.miss_marker, "unreachable");
        assert_eq!(config.output.dump_format, DumpFormat::Json);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_cli_overrides_file() {
        let cli = CliArgs::parse_from(["lpm-router", "--miss-marker", "x", "--log-level", "debug"]);
        let file = ConfigFile {
            output: OutputConfig {
                miss_marker: "from-file".to_string(),
                dump_routes: true,
                dump_format: DumpFormat::Json,
            },
            ..Default::default()
        };
        let config = Config::merge(cli, file).unwrap();
        assert_eq!(config.driver.miss_marker, "x");
        assert!(config.driver.dump_routes);
        assert_eq!(config.driver.dump_format, DumpFormat::Json);
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    fn test_bad_log_level_rejected() {
        let cli = CliArgs::parse_from(["lpm-router", "--log-level", "loud"]);
        assert!(Config::merge(cli, ConfigFile::default()).is_err());
    }

    #[test]
    fn test_parse_log_level() {
        assert!(matches!(parse_log_level("info"), Ok(Level::INFO)));
        assert!(matches!(parse_log_level("DEBUG"), Ok(Level::DEBUG)));
        assert!(parse_log_level("invalid").is_err());
    }
}

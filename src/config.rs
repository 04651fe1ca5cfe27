use crate::cli::{Cli, VerbosityLevel};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Document checked on every run, relative to the working directory
pub const DOCUMENT_PATH: &str = "sample_herds.xml";

/// Schema the document is checked against, relative to the working directory
pub const SCHEMA_PATH: &str = "herds.xsd";

/// File names tried in each search directory, in order
const CONFIG_NAMES: [&str; 4] = [
    "validate-herds.toml",
    ".validate-herds.toml",
    "validate-herds.json",
    ".validate-herds.json",
];

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable error: {0}")]
    Environment(String),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),

    #[error("Cannot load {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: Box<ConfigError>,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

fn default_document() -> PathBuf {
    PathBuf::from(DOCUMENT_PATH)
}

fn default_schema() -> PathBuf {
    PathBuf::from(SCHEMA_PATH)
}

/// Main application configuration
///
/// The input paths are fixed; no configuration source can change them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(skip, default = "default_document")]
    pub document: PathBuf,
    #[serde(skip, default = "default_schema")]
    pub schema: PathBuf,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct OutputConfig {
    /// Verbose diagnostics
    pub verbose: bool,
    /// Fatal errors only
    pub quiet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            document: default_document(),
            schema: default_schema(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    pub fn verbosity(&self) -> VerbosityLevel {
        if self.output.quiet {
            VerbosityLevel::Quiet
        } else if self.output.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }
}

/// Configuration manager for loading and merging configurations
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: defaults -> file -> environment -> CLI
    ///
    /// Only a file named with `--config` is required to load. A discovered file
    /// or environment value that cannot be used is skipped and returned alongside
    /// the configuration so the caller can warn about it.
    pub fn load_config(cli: &Cli) -> Result<(Config, Vec<ConfigError>)> {
        Self::load_config_with(cli, &SystemEnvProvider)
    }

    /// Load configuration using a custom environment provider
    pub fn load_config_with(
        cli: &Cli,
        env: &impl EnvProvider,
    ) -> Result<(Config, Vec<ConfigError>)> {
        let mut config = Config::default();
        let mut skipped = Vec::new();

        if let Some(config_path) = &cli.config {
            let file_config = Self::load_from_file(config_path)?;
            config = Self::merge_configs(config, file_config);
        } else {
            match Self::find_config_file() {
                Ok(Some(found_config)) => config = Self::merge_configs(config, found_config),
                Ok(None) => {}
                Err(err) => skipped.push(err),
            }
        }

        config = Self::apply_environment_overrides_with(env, config, &mut skipped);

        if let Err(err) = Self::validate_config(&config) {
            skipped.push(err);
            config.output = OutputConfig::default();
        }

        config = Self::merge_with_cli(config, cli);

        Ok((config, skipped))
    }

    /// Load configuration from a file (TOML or JSON)
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => {
                // Try to parse as TOML first, then JSON
                if let Ok(config) = toml::from_str::<Config>(&content) {
                    Ok(config)
                } else {
                    Ok(serde_json::from_str(&content)?)
                }
            }
        }
    }

    /// Find a configuration file in the working directory, then the user config directory
    pub fn find_config_file() -> Result<Option<Config>> {
        let mut search_dirs = vec![PathBuf::from(".")];
        if let Some(config_dir) = dirs::config_dir() {
            search_dirs.push(config_dir.join("validate-herds"));
        }
        Self::find_config_file_in(&search_dirs)
    }

    /// Find the first known configuration file name in `search_dirs`, in order
    pub fn find_config_file_in(search_dirs: &[PathBuf]) -> Result<Option<Config>> {
        for dir in search_dirs {
            for name in &CONFIG_NAMES {
                let path = dir.join(name);
                if path.is_file() {
                    return Self::load_from_file(&path)
                        .map(Some)
                        .map_err(|source| ConfigError::File {
                            path,
                            source: Box::new(source),
                        });
                }
            }
        }
        Ok(None)
    }

    /// Apply environment variable overrides with a custom environment provider
    ///
    /// A variable that is not a boolean is ignored and recorded in `skipped`.
    pub fn apply_environment_overrides_with(
        env: &impl EnvProvider,
        mut config: Config,
        skipped: &mut Vec<ConfigError>,
    ) -> Config {
        for (key, field) in [
            ("VALIDATE_HERDS_VERBOSE", &mut config.output.verbose),
            ("VALIDATE_HERDS_QUIET", &mut config.output.quiet),
        ] {
            let Some(value) = env.get(key) else {
                continue;
            };
            match parse_bool(&value) {
                Some(flag) => *field = flag,
                None => skipped.push(ConfigError::Environment(format!(
                    "Invalid {} value: {}",
                    key, value
                ))),
            }
        }

        config
    }

    /// Merge CLI arguments with configuration (CLI takes precedence when a flag is given)
    pub fn merge_with_cli(mut config: Config, cli: &Cli) -> Config {
        if cli.verbose || cli.quiet {
            config.output.verbose = cli.verbose;
            config.output.quiet = cli.quiet;
        }
        config
    }

    /// Merge two configurations (second takes precedence)
    pub fn merge_configs(mut base: Config, override_config: Config) -> Config {
        base.output.verbose = override_config.output.verbose;
        base.output.quiet = override_config.output.quiet;
        base
    }

    /// Validate configuration values
    pub fn validate_config(config: &Config) -> Result<()> {
        if config.output.verbose && config.output.quiet {
            return Err(ConfigError::Validation(
                "Cannot enable both verbose and quiet modes".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

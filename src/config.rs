//! Logger configuration.
//!
//! The configuration is layered: the embedded defaults from
//! `etc/defaults/config.yaml` come first, then user configuration files,
//! then `LOGKIT_*` environment variables.

// std imports
use std::include_str;
use std::path::{Path, PathBuf};

// third-party imports
use config::{Config, Environment, File, FileFormat};
use env_logger::{self as logger};
use serde::{Deserialize, Serialize};
use strum::Display;

// local imports
use crate::error::Result;
use crate::level::Level;
use crate::states::{self, Env};

// ---

pub const APP_NAME: &str = "logkit";

/// Prefix of environment variables overriding configuration keys, e.g. `LOGKIT_LEVEL=debug`.
pub const ENV_PREFIX: &str = "LOGKIT";

static DEFAULT_CONFIG: &str = include_str!("../etc/defaults/config.yaml");

// ---

/// Record format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Format {
    #[default]
    Text,
    Json,
}

/// Destination of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogTarget {
    #[default]
    Console,
    File,
    #[serde(rename = "console+file")]
    #[strum(serialize = "console+file")]
    ConsoleFile,
}

// ---

/// Logger configuration.
///
/// Only `enabled`, `level` and the timestamp options affect the console backend
/// installed by [`LoggerConfig::init`]. The file and rotation options are carried
/// so that configuration files shared with other tools still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LoggerConfig {
    pub enabled: bool,
    pub backend: String,
    pub level: String,
    pub format: Format,
    pub target: LogTarget,
    pub directory: String,
    #[serde(alias = "all_to_error_device")]
    pub all_to_error_device: bool,
    #[serde(alias = "debug_mode")]
    pub debug_mode: bool,
    #[serde(alias = "trace_mode")]
    pub trace_mode: bool,
    /// Maximum size of a log file in megabytes.
    #[serde(alias = "max_size")]
    pub max_size: u64,
    /// Maximum age of rotated files in days.
    #[serde(alias = "max_age")]
    pub max_age: u32,
    #[serde(alias = "max_backups")]
    pub max_backups: u32,
    #[serde(alias = "local_time")]
    pub local_time: bool,
    pub compress: bool,
    #[serde(alias = "extra_skip")]
    pub extra_skip: i32,
    #[serde(alias = "short_timestamp")]
    pub short_timestamp: bool,
    #[serde(alias = "timestamp_format")]
    pub timestamp_format: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: "sugar".into(),
            level: Level::Info.to_string(),
            format: Format::Text,
            target: LogTarget::Console,
            directory: "/var/log".into(),
            all_to_error_device: false,
            debug_mode: false,
            trace_mode: false,
            max_size: 1024,
            max_age: 7,
            max_backups: 3,
            local_time: false,
            compress: true,
            extra_skip: -1,
            short_timestamp: false,
            timestamp_format: String::new(),
        }
    }
}

impl LoggerConfig {
    /// Returns the default configuration adjusted to the global debug and trace modes.
    pub fn new() -> Self {
        Self::new_with(true, "sugar", Level::Info.as_ref())
    }

    /// Same as [`LoggerConfig::new`] with explicit `enabled`, `backend` and `level`.
    ///
    /// Debug mode raises the level to debug, trace mode raises it to trace.
    /// The global debug and trace flags are then updated from the resolved level.
    pub fn new_with(enabled: bool, backend: impl Into<String>, level: impl Into<String>) -> Self {
        Self {
            enabled,
            backend: backend.into(),
            ..Default::default()
        }
        .resolved(states::env(), level.into())
    }

    fn resolved(mut self, env: &Env, level: String) -> Self {
        self.level = if env.trace_mode() {
            Level::Trace.to_string()
        } else if env.debug_mode() {
            Level::Debug.to_string()
        } else {
            level
        };

        let level: Level = self.level.parse().unwrap_or_default();
        self.debug_mode = level >= Level::Debug;
        self.trace_mode = level >= Level::Trace;
        env.set_debug_mode(self.debug_mode);
        env.set_trace_mode(self.trace_mode);
        self
    }

    pub fn with_timestamp(mut self, short: bool, format: impl Into<String>) -> Self {
        self.short_timestamp = short;
        self.timestamp_format = format.into();
        self
    }

    pub fn with_extra_skip(mut self, skip: i32) -> Self {
        self.extra_skip = skip;
        self
    }

    /// Returns the configured level, or [`Level::Off`] if logging is disabled.
    pub fn effective_level(&self) -> Result<Level> {
        if !self.enabled {
            return Ok(Level::Off);
        }
        Ok(self.level.parse()?)
    }

    /// Returns an `env_logger` builder writing to stderr with the configured level and timestamps.
    pub fn builder(&self) -> Result<logger::Builder> {
        let mut builder = logger::Builder::new();
        builder
            .filter_level(self.effective_level()?.into())
            .target(logger::Target::Stderr);
        if self.short_timestamp {
            builder.format_timestamp_secs();
        } else {
            builder.format_timestamp_millis();
        }
        Ok(builder)
    }

    /// Installs the console backend and sets the level of the global logger.
    ///
    /// Fails if a `log` backend is already installed.
    pub fn init(&self) -> Result<()> {
        let level = self.effective_level()?;
        self.builder()?.try_init()?;
        crate::logger::set_level(level);
        log::debug!("logging initialized at level {}", level);
        Ok(())
    }
}

// ---

/// Returns the path of the user configuration file, e.g. `~/.config/logkit/config.yaml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join("config.yaml"))
}

/// Loads the configuration from the defaults, the user configuration file and the environment.
pub fn load() -> Result<LoggerConfig> {
    ConfigLoader::new().load()
}

/// Returns a loader reading the given configuration files on top of the defaults.
pub fn at<I, P>(paths: I) -> ConfigLoader
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    ConfigLoader::at(paths)
}

/// Configuration loader.
///
/// Explicit files must exist. Without explicit files the user configuration
/// file is read if present, unless the defaults are disabled.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    paths: Vec<PathBuf>,
    no_default: bool,
    no_env: bool,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            paths: Vec::new(),
            no_default: false,
            no_env: false,
        }
    }

    pub fn at<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self {
            paths: paths.into_iter().map(|p| p.as_ref().to_owned()).collect(),
            ..Self::new()
        }
    }

    /// Skips the embedded defaults and the user configuration file.
    pub fn no_default(mut self, val: bool) -> Self {
        self.no_default = val;
        self
    }

    /// Skips the `LOGKIT_*` environment variables.
    pub fn no_env(mut self, val: bool) -> Self {
        self.no_env = val;
        self
    }

    pub fn load(self) -> Result<LoggerConfig> {
        let mut builder = Config::builder();

        if !self.no_default {
            builder = builder.add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Yaml));
            if self.paths.is_empty() {
                if let Some(path) = default_config_path() {
                    log::debug!("checking user config file {}", path.display());
                    builder = builder.add_source(File::from(path).required(false));
                }
            }
        }

        for path in &self.paths {
            log::debug!("loading config file {}", path.display());
            builder = builder.add_source(File::from(path.as_path()).required(true));
        }

        if !self.no_env {
            builder = builder.add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        Ok(builder.build()?.try_deserialize()?)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

// ---

pub mod global {
    // third-party imports
    use once_cell::sync::{Lazy, OnceCell};

    // local imports
    use super::LoggerConfig;

    static CONFIG: OnceCell<LoggerConfig> = OnceCell::new();
    static DEFAULT: Lazy<LoggerConfig> = Lazy::new(LoggerConfig::default);

    /// Stores the process-wide configuration. Only the first call has an effect.
    pub fn initialize(config: LoggerConfig) {
        CONFIG.set(config).ok();
    }

    /// Returns the process-wide configuration, or the defaults if it was never initialized.
    pub fn get() -> &'static LoggerConfig {
        CONFIG.get().unwrap_or(&DEFAULT)
    }
}

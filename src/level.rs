// std imports
use std::str::FromStr;

// third-party imports
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, FromRepr, IntoEnumIterator, IntoStaticStr};

// local imports
use crate::error::InvalidLevelError;

// ---

/// Logging level, ordered from the most restrictive to the most verbose.
///
/// A message at level `m` passes a logger configured at level `l` when `l >= m`.
#[derive(
    ValueEnum,
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Serialize,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
    Display,
    FromRepr,
)]
#[repr(u32)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Level {
    Off,
    Panic,
    Fatal,
    Error,
    #[serde(alias = "warning")]
    #[value(alias = "warning")]
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl Level {
    /// Iterates over all levels from `Off` to `Trace`.
    pub fn all() -> impl Iterator<Item = Level> {
        Level::iter()
    }

    /// Returns the names accepted by [`Level::from_str`].
    pub fn names() -> Vec<String> {
        Level::iter().map(|l| l.as_ref().to_owned()).collect()
    }

    /// Returns `true` if a message at `level` passes this level.
    #[inline]
    pub fn enables(self, level: Level) -> bool {
        level != Level::Off && self >= level
    }

    /// Converts to the nearest `log` crate level, if any.
    pub fn to_log_level(self) -> Option<log::Level> {
        match self {
            Level::Off => None,
            Level::Panic | Level::Fatal | Level::Error => Some(log::Level::Error),
            Level::Warn => Some(log::Level::Warn),
            Level::Info => Some(log::Level::Info),
            Level::Debug => Some(log::Level::Debug),
            Level::Trace => Some(log::Level::Trace),
        }
    }
}

impl FromStr for Level {
    type Err = InvalidLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "warning" {
            return Ok(Level::Warn);
        }
        Level::iter()
            .find(|l| l.as_ref() == lower)
            .ok_or_else(|| InvalidLevelError {
                value: s.to_owned(),
                valid_values: Level::names(),
            })
    }
}

impl From<Level> for log::LevelFilter {
    fn from(level: Level) -> Self {
        match level.to_log_level() {
            Some(l) => l.to_level_filter(),
            None => log::LevelFilter::Off,
        }
    }
}

/// Parses a level name, case-insensitively.
pub fn parse_level(s: &str) -> Result<Level, InvalidLevelError> {
    s.parse()
}

/// Returns the name of the level with the given numeric value, or `"unknown"`.
pub fn level_name(value: u32) -> &'static str {
    Level::from_repr(value).map(<&'static str>::from).unwrap_or("unknown")
}

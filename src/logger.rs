//! Leveled logging facade.
//!
//! A process-wide [`Logger`] receives messages from the free functions in this
//! module and from the [`tracef!`](crate::tracef) family of macros. The default
//! logger is a [`StdLogger`] forwarding to the `log` crate, so any `log` backend
//! can be used to actually write the records.

// std imports
use std::fmt;
use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

// third-party imports
use once_cell::sync::Lazy;

// local imports
use crate::detects;
use crate::level::Level;

// ---

/// Target of records forwarded to the `log` crate.
pub const TARGET: &str = "logkit";

/// Is `true` when built with the `very-quiet` feature, which turns
/// trace, debug, info, warn and error messages into no-ops.
pub const VERY_QUIET_ENABLED: bool = cfg!(feature = "very-quiet");

// ---

/// A leveled logger.
///
/// Only [`Logger::log`] writes anything. The level methods decide whether to
/// call it: trace, debug and info are gated by [`Logger::level`] while warn,
/// error, fatal, panic and print always pass.
pub trait Logger: Send + Sync {
    /// Writes a message at the given level unconditionally.
    fn log(&self, level: Level, args: fmt::Arguments);

    fn level(&self) -> Level;

    fn set_level(&self, level: Level);

    /// Returns a logger that appends `key=value` to every message.
    fn with(&self, key: &str, value: &dyn fmt::Display) -> Box<dyn Logger>;

    /// Prepares the logger for use.
    fn setup(&self) {}

    fn trace(&self, args: fmt::Arguments) {
        if self.level().enables(Level::Trace) {
            self.log(Level::Trace, args)
        }
    }

    fn debug(&self, args: fmt::Arguments) {
        if self.level().enables(Level::Debug) {
            self.log(Level::Debug, args)
        }
    }

    fn info(&self, args: fmt::Arguments) {
        if self.level().enables(Level::Info) {
            self.log(Level::Info, args)
        }
    }

    fn warn(&self, args: fmt::Arguments) {
        self.log(Level::Warn, args)
    }

    fn error(&self, args: fmt::Arguments) {
        self.log(Level::Error, args)
    }

    /// Logs the message and terminates: panics under tests, exits with status 1 otherwise.
    fn fatal(&self, args: fmt::Arguments) {
        self.log(Level::Fatal, args);
        terminate(args)
    }

    /// Logs the message and panics with it.
    fn panic(&self, args: fmt::Arguments) -> ! {
        self.log(Level::Panic, args);
        panic!("{}", args)
    }

    /// Logs the message at info level regardless of the logger level.
    fn print(&self, args: fmt::Arguments) {
        self.log(Level::Info, args)
    }
}

fn terminate(args: fmt::Arguments) -> ! {
    if detects::in_testing() {
        panic!("{}", args);
    }
    std::process::exit(1)
}

// ---

#[derive(Debug)]
struct AtomicLevel(AtomicU32);

impl AtomicLevel {
    fn new(level: Level) -> Self {
        Self(AtomicU32::new(level as u32))
    }

    fn get(&self) -> Level {
        Level::from_repr(self.0.load(Ordering::Relaxed)).unwrap_or_default()
    }

    fn set(&self, level: Level) {
        self.0.store(level as u32, Ordering::Relaxed)
    }
}

// ---

/// Logger forwarding to the `log` crate under the [`TARGET`] target.
///
/// Panic and fatal messages are forwarded at `log::Level::Error`.
#[derive(Debug)]
pub struct StdLogger {
    level: AtomicLevel,
    fields: Vec<(String, String)>,
}

impl StdLogger {
    pub fn new() -> Self {
        Self::with_level(Level::Info)
    }

    pub fn with_level(level: Level) -> Self {
        Self {
            level: AtomicLevel::new(level),
            fields: Vec::new(),
        }
    }
}

impl Default for StdLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for StdLogger {
    fn log(&self, level: Level, args: fmt::Arguments) {
        if let Some(level) = level.to_log_level() {
            log::log!(target: TARGET, level, "{}{}", args, Fields(&self.fields));
        }
    }

    fn level(&self) -> Level {
        self.level.get()
    }

    fn set_level(&self, level: Level) {
        self.level.set(level)
    }

    fn with(&self, key: &str, value: &dyn fmt::Display) -> Box<dyn Logger> {
        let mut fields = self.fields.clone();
        fields.push((key.to_owned(), value.to_string()));
        Box::new(Self {
            level: AtomicLevel::new(self.level()),
            fields,
        })
    }
}

struct Fields<'a>(&'a [(String, String)]);

impl fmt::Display for Fields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (key, value) in self.0 {
            write!(f, " {}={}", key, value)?;
        }
        Ok(())
    }
}

// ---

/// Logger discarding all messages. Panics still panic.
#[derive(Debug, Default, Clone, Copy)]
pub struct DummyLogger;

impl Logger for DummyLogger {
    fn log(&self, _: Level, _: fmt::Arguments) {}

    fn level(&self) -> Level {
        Level::Info
    }

    fn set_level(&self, _: Level) {}

    fn with(&self, _: &str, _: &dyn fmt::Display) -> Box<dyn Logger> {
        Box::new(DummyLogger)
    }

    fn fatal(&self, _: fmt::Arguments) {}

    fn panic(&self, args: fmt::Arguments) -> ! {
        panic!("{}", args)
    }
}

// ---

/// Minimal logger interface of service managers such as systemd.
pub trait SystemdLogger: Send + Sync {
    fn error(&self, args: fmt::Arguments) -> io::Result<()>;
    fn warning(&self, args: fmt::Arguments) -> io::Result<()>;
    fn info(&self, args: fmt::Arguments) -> io::Result<()>;
}

/// Adapts a [`Logger`] to the [`SystemdLogger`] interface.
pub fn as_systemd_logger(logger: Arc<dyn Logger>) -> Box<dyn SystemdLogger> {
    Box::new(AsSystemdLogger(logger))
}

struct AsSystemdLogger(Arc<dyn Logger>);

impl SystemdLogger for AsSystemdLogger {
    fn error(&self, args: fmt::Arguments) -> io::Result<()> {
        self.0.error(args);
        Ok(())
    }

    fn warning(&self, args: fmt::Arguments) -> io::Result<()> {
        self.0.warn(args);
        Ok(())
    }

    fn info(&self, args: fmt::Arguments) -> io::Result<()> {
        self.0.info(args);
        Ok(())
    }
}

/// Adapts a [`SystemdLogger`] to the [`Logger`] interface.
///
/// The returned logger starts at the current global level and also
/// forwards every message to the currently installed global logger.
pub fn from_systemd_logger(sl: Arc<dyn SystemdLogger>) -> Box<dyn Logger> {
    Box::new(FromSystemdLogger {
        level: AtomicLevel::new(level()),
        sl,
        old: Some(logger()),
    })
}

struct FromSystemdLogger {
    level: AtomicLevel,
    sl: Arc<dyn SystemdLogger>,
    old: Option<Arc<dyn Logger>>,
}

impl Logger for FromSystemdLogger {
    fn log(&self, level: Level, args: fmt::Arguments) {
        let result = match level {
            Level::Off => return,
            Level::Panic | Level::Fatal | Level::Error => self.sl.error(args),
            Level::Warn => self.sl.warning(args),
            Level::Info | Level::Debug | Level::Trace => self.sl.info(args),
        };
        if let Err(e) = result {
            log::debug!("systemd logger failed: {}", e);
        }
        if let Some(old) = &self.old {
            match level {
                Level::Off => {}
                Level::Trace => old.trace(args),
                Level::Debug => old.debug(args),
                Level::Info => old.info(args),
                Level::Warn => old.warn(args),
                Level::Panic | Level::Fatal | Level::Error => old.error(args),
            }
        }
    }

    fn level(&self) -> Level {
        self.level.get()
    }

    fn set_level(&self, level: Level) {
        self.level.set(level)
    }

    fn with(&self, _: &str, _: &dyn fmt::Display) -> Box<dyn Logger> {
        Box::new(FromSystemdLogger {
            level: AtomicLevel::new(self.level()),
            sl: self.sl.clone(),
            old: self.old.clone(),
        })
    }

    fn info(&self, args: fmt::Arguments) {
        self.log(Level::Info, args)
    }
}

// ---

static LOGGER: Lazy<RwLock<Arc<dyn Logger>>> = Lazy::new(|| RwLock::new(Arc::new(StdLogger::new())));

/// Replaces the global logger. The new logger takes over the current level.
pub fn set_logger(logger: Box<dyn Logger>) {
    let mut current = LOGGER.write().unwrap_or_else(PoisonError::into_inner);
    logger.set_level(current.level());
    *current = Arc::from(logger);
}

/// Returns the global logger.
pub fn logger() -> Arc<dyn Logger> {
    LOGGER.read().unwrap_or_else(PoisonError::into_inner).clone()
}

pub fn set_level(level: Level) {
    logger().set_level(level)
}

pub fn level() -> Level {
    logger().level()
}

pub fn setup() {
    logger().setup()
}

pub fn trace(args: fmt::Arguments) {
    if !VERY_QUIET_ENABLED {
        logger().trace(args)
    }
}

pub fn debug(args: fmt::Arguments) {
    if !VERY_QUIET_ENABLED {
        logger().debug(args)
    }
}

pub fn info(args: fmt::Arguments) {
    if !VERY_QUIET_ENABLED {
        logger().info(args)
    }
}

pub fn warn(args: fmt::Arguments) {
    if !VERY_QUIET_ENABLED {
        logger().warn(args)
    }
}

pub fn error(args: fmt::Arguments) {
    if !VERY_QUIET_ENABLED {
        logger().error(args)
    }
}

pub fn fatal(args: fmt::Arguments) {
    logger().fatal(args)
}

pub fn panic(args: fmt::Arguments) -> ! {
    logger().panic(args)
}

pub fn print(args: fmt::Arguments) {
    logger().print(args)
}

// ---

/// Logs a formatted message at trace level through the global logger.
#[macro_export]
macro_rules! tracef {
    ($($arg:tt)+) => {
        $crate::logger::trace(format_args!($($arg)+))
    };
}

/// Logs a formatted message at debug level through the global logger.
#[macro_export]
macro_rules! debugf {
    ($($arg:tt)+) => {
        $crate::logger::debug(format_args!($($arg)+))
    };
}

/// Logs a formatted message at info level through the global logger.
#[macro_export]
macro_rules! infof {
    ($($arg:tt)+) => {
        $crate::logger::info(format_args!($($arg)+))
    };
}

/// Logs a formatted message at warn level through the global logger.
#[macro_export]
macro_rules! warnf {
    ($($arg:tt)+) => {
        $crate::logger::warn(format_args!($($arg)+))
    };
}

/// Logs a formatted message at error level through the global logger.
#[macro_export]
macro_rules! errorf {
    ($($arg:tt)+) => {
        $crate::logger::error(format_args!($($arg)+))
    };
}

/// Logs a formatted message and terminates, see [`Logger::fatal`].
#[macro_export]
macro_rules! fatalf {
    ($($arg:tt)+) => {
        $crate::logger::fatal(format_args!($($arg)+))
    };
}

/// Logs a formatted message and panics.
#[macro_export]
macro_rules! panicf {
    ($($arg:tt)+) => {
        $crate::logger::panic(format_args!($($arg)+))
    };
}

/// Logs a formatted message regardless of the level.
#[macro_export]
macro_rules! printf {
    ($($arg:tt)+) => {
        $crate::logger::print(format_args!($($arg)+))
    };
}

#[cfg(test)]
mod tests;

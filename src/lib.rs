//! Logging facade with wildcard matching, directory walking, process
//! execution, environment detection and graceful shutdown helpers.

// public modules
pub mod cli;
pub mod closers;
pub mod color;
pub mod config;
pub mod detects;
pub mod dir;
pub mod error;
pub mod exec;
pub mod level;
pub mod logger;
pub mod states;

// conditional private modules
#[cfg_attr(unix, path = "signal_unix.rs")]
#[cfg_attr(windows, path = "signal_windows.rs")]
mod signal;

// public uses
pub use closers::{CloseHandler, Peripheral};
pub use config::LoggerConfig;
pub use error::{Error, Result};
pub use level::Level;
pub use logger::{DummyLogger, Logger, StdLogger};
pub use wildcard::{self, Pattern};

//! Process-wide mode flags shared by the logger, the detectors and the CLI.

// std imports
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

// local imports
use crate::detects;

// ---

/// Environment variable that turns trace mode on regardless of the flags.
pub const TRACE_ENV: &str = "LOGKIT_TRACE";

static ENV: Env = Env::new();

/// Returns the process-wide environment state.
pub fn env() -> &'static Env {
    &ENV
}

/// Debug, trace, no-color, verbose and quiet modes along with their hit counts,
/// e.g. how many times `--debug` was given on the command line.
#[derive(Debug, Default)]
pub struct Env {
    debug_mode: AtomicBool,
    debug_level: AtomicUsize,
    trace_mode: AtomicBool,
    trace_level: AtomicUsize,
    no_color_mode: AtomicBool,
    no_color_count: AtomicUsize,
    verbose_mode: AtomicBool,
    verbose_count: AtomicUsize,
    quiet_mode: AtomicBool,
    quiet_count: AtomicUsize,
}

impl Env {
    pub const fn new() -> Self {
        Self {
            debug_mode: AtomicBool::new(false),
            debug_level: AtomicUsize::new(0),
            trace_mode: AtomicBool::new(false),
            trace_level: AtomicUsize::new(0),
            no_color_mode: AtomicBool::new(false),
            no_color_count: AtomicUsize::new(0),
            verbose_mode: AtomicBool::new(false),
            verbose_count: AtomicUsize::new(0),
            quiet_mode: AtomicBool::new(false),
            quiet_count: AtomicUsize::new(0),
        }
    }

    /// Returns `true` if a debugger is attached to the process.
    pub fn in_debugging(&self) -> bool {
        detects::is_debugger_attached()
    }

    /// Debug mode is on if it was set explicitly or a debugger is attached.
    pub fn debug_mode(&self) -> bool {
        self.debug_mode.load(Ordering::Relaxed) || self.in_debugging()
    }

    pub fn set_debug_mode(&self, value: bool) {
        self.debug_mode.store(value, Ordering::Relaxed);
    }

    pub fn debug_level(&self) -> usize {
        self.debug_level.load(Ordering::Relaxed)
    }

    pub fn set_debug_level(&self, hits: usize) {
        self.debug_level.store(hits, Ordering::Relaxed);
    }

    /// Trace mode is on if it was set explicitly or [`TRACE_ENV`] is set.
    pub fn trace_mode(&self) -> bool {
        self.trace_mode.load(Ordering::Relaxed) || std::env::var_os(TRACE_ENV).is_some()
    }

    pub fn set_trace_mode(&self, value: bool) {
        self.trace_mode.store(value, Ordering::Relaxed);
    }

    pub fn trace_level(&self) -> usize {
        self.trace_level.load(Ordering::Relaxed)
    }

    pub fn set_trace_level(&self, hits: usize) {
        self.trace_level.store(hits, Ordering::Relaxed);
    }

    pub fn is_no_color_mode(&self) -> bool {
        self.no_color_mode.load(Ordering::Relaxed)
    }

    pub fn set_no_color_mode(&self, value: bool) {
        self.no_color_mode.store(value, Ordering::Relaxed);
    }

    pub fn count_of_no_color(&self) -> usize {
        self.no_color_count.load(Ordering::Relaxed)
    }

    pub fn set_no_color_count(&self, hits: usize) {
        self.no_color_count.store(hits, Ordering::Relaxed);
    }

    /// Verbose mode is on for builds with the `verbose` feature or if it was set explicitly.
    pub fn is_verbose_mode(&self) -> bool {
        detects::is_verbose_build() || self.is_verbose_mode_pure()
    }

    /// Returns only the explicitly set verbose flag.
    pub fn is_verbose_mode_pure(&self) -> bool {
        self.verbose_mode.load(Ordering::Relaxed)
    }

    pub fn set_verbose_mode(&self, value: bool) {
        self.verbose_mode.store(value, Ordering::Relaxed);
    }

    pub fn count_of_verbose(&self) -> usize {
        self.verbose_count.load(Ordering::Relaxed)
    }

    pub fn set_verbose_count(&self, hits: usize) {
        self.verbose_count.store(hits, Ordering::Relaxed);
    }

    pub fn is_quiet_mode(&self) -> bool {
        self.quiet_mode.load(Ordering::Relaxed)
    }

    pub fn set_quiet_mode(&self, value: bool) {
        self.quiet_mode.store(value, Ordering::Relaxed);
    }

    pub fn count_of_quiet(&self) -> usize {
        self.quiet_count.load(Ordering::Relaxed)
    }

    pub fn set_quiet_count(&self, hits: usize) {
        self.quiet_count.store(hits, Ordering::Relaxed);
    }

    /// Sets a mode from a flag hit count: the mode is on when `hits > 0`.
    pub fn apply_counts(&self, counts: ModeCounts) {
        self.set_debug_level(counts.debug);
        if counts.debug > 0 {
            self.set_debug_mode(true);
        }
        self.set_trace_level(counts.trace);
        if counts.trace > 0 {
            self.set_trace_mode(true);
        }
        self.set_verbose_count(counts.verbose);
        if counts.verbose > 0 {
            self.set_verbose_mode(true);
        }
        self.set_quiet_count(counts.quiet);
        if counts.quiet > 0 {
            self.set_quiet_mode(true);
        }
        self.set_no_color_count(counts.no_color);
        if counts.no_color > 0 {
            self.set_no_color_mode(true);
        }
    }
}

/// Hit counts of the mode flags, as collected from a command line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ModeCounts {
    pub debug: usize,
    pub trace: usize,
    pub verbose: usize,
    pub quiet: usize,
    pub no_color: usize,
}

// std imports
use std::path::PathBuf;

// third-party imports
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

// local imports
use crate::states::ModeCounts;

// ---

/// Options needed before the main command line can be parsed.
#[derive(Args, Debug, Default)]
pub struct BootstrapArgs {
    /// Configuration file path, may be repeated. Use '-' to skip the default and user configuration.
    #[arg(long, value_name = "FILE", env = "LOGKIT_CONFIG", num_args = 1, global = true)]
    pub config: Vec<String>,
}

impl BootstrapArgs {
    /// Returns the configuration files to load and whether the defaults are disabled.
    ///
    /// Everything up to and including the last `-` (or empty value) is discarded.
    pub fn configs(&self) -> (&[String], bool) {
        let (offset, no_default) = self
            .config
            .iter()
            .rposition(|x| x.is_empty() || x == "-")
            .map(|x| (x + 1, true))
            .unwrap_or_default();
        (&self.config[offset..], no_default)
    }
}

/// Lenient parser picking up the bootstrap options only.
#[derive(Parser, Debug)]
#[command(ignore_errors = true, disable_help_flag = true, disable_version_flag = true)]
pub struct BootstrapOpt {
    #[command(flatten)]
    pub args: BootstrapArgs,
}

// ---

/// Wildcard matching, directory walking and process helpers.
#[derive(Parser, Debug)]
#[command(version)]
pub struct Opt {
    #[command(flatten)]
    pub bootstrap: BootstrapArgs,

    /// Color output options.
    #[arg(long, default_value = "auto", env = "LOGKIT_COLOR", overrides_with = "color", global = true)]
    #[arg(value_enum)]
    pub color: ColorOption,

    /// Enable debug mode, repeat to raise the debug level.
    #[arg(long, short = 'D', action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Enable trace mode, repeat to raise the trace level.
    #[arg(long, action = ArgAction::Count, global = true)]
    pub trace: u8,

    /// Print more details, may be repeated.
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print less, may be repeated.
    #[arg(long, short = 'q', action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl Opt {
    /// Collects the mode flag hit counts, `no_color` being the resolved color choice.
    pub fn mode_counts(&self, no_color: bool) -> ModeCounts {
        ModeCounts {
            debug: self.debug.into(),
            trace: self.trace.into(),
            verbose: self.verbose.into(),
            quiet: self.quiet.into(),
            no_color: no_color.into(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Exit with 0 if the subject matches any of the patterns, with 1 otherwise.
    Match {
        /// Text to match.
        subject: String,

        /// Wildcard patterns, '*' matches any run of characters and '?' matches one character.
        #[arg(required = true)]
        patterns: Vec<String>,
    },

    /// Print the entries of a directory tree in name order.
    Walk {
        /// Directory to walk, '~' and environment variables are expanded.
        root: String,

        /// Print regular files only.
        #[arg(long, short = 'f')]
        files: bool,

        /// Maximum depth to descend into, 0 means unlimited.
        #[arg(long, short = 'd', default_value_t = 0)]
        max_depth: i32,

        /// Skip entries whose path matches the wildcard pattern.
        #[arg(long, short = 'x', number_of_values = 1)]
        exclude: Vec<String>,
    },

    /// Print what is known about the runtime environment.
    Detect,

    /// Run a command and report its exit code.
    Run {
        /// Do not print the output of the command.
        #[arg(long)]
        silent: bool,

        /// Working directory of the command.
        #[arg(long, short = 'C')]
        work_dir: Option<PathBuf>,

        /// Command and its arguments.
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Parse a level name and print its canonical form and numeric value.
    Level {
        name: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorOption {
    Auto,
    Always,
    Never,
}

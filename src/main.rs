// std imports
use std::io::{IsTerminal, stdout};
use std::process;

// third-party imports
use clap::Parser;
use env_logger::{self as logger};

// local imports
use logkit::{
    cli::{self, Command},
    closers,
    color::{self, Color},
    config::{self, LoggerConfig},
    detects::Detections,
    dir,
    error::*,
    exec::Calling,
    level::parse_level,
    states, wildcard,
};

const LOGKIT_DEBUG_LOG: &str = "LOGKIT_DEBUG_LOG";
const LOGKIT_DEBUG_LOG_STYLE: &str = "LOGKIT_DEBUG_LOG_STYLE";

// ---

fn bootstrap() -> Result<LoggerConfig> {
    if std::env::var(LOGKIT_DEBUG_LOG).is_ok() {
        logger::Builder::from_env(logger::Env::new().filter(LOGKIT_DEBUG_LOG).write_style(LOGKIT_DEBUG_LOG_STYLE))
            .format_timestamp_micros()
            .init();
        log::debug!("logging initialized");
    } else {
        logger::Builder::new()
            .filter_level(log::LevelFilter::Error)
            .format_timestamp_millis()
            .init()
    }

    let opt = cli::BootstrapOpt::parse().args;
    let (configs, no_default_configs) = opt.configs();

    let config = config::at(configs).no_default(no_default_configs).load()?;
    config::global::initialize(config.clone());

    Ok(config)
}

fn run() -> Result<i32> {
    let config = bootstrap()?;

    let opt = cli::Opt::parse();

    let use_colors = match opt.color {
        cli::ColorOption::Auto => stdout().is_terminal(),
        cli::ColorOption::Always => true,
        cli::ColorOption::Never => false,
    };
    states::env().apply_counts(opt.mode_counts(!use_colors));

    // Debug and trace flags raise the level of the facade.
    let config = LoggerConfig::new_with(config.enabled, config.backend, config.level);
    logkit::logger::set_level(config.effective_level()?);
    log::debug!("logger config: {:?}", config);

    let handler = closers::setup_close_handler(Vec::new())?;

    let result = match opt.command {
        Command::Match { subject, patterns } => match_patterns(&subject, &patterns),
        Command::Walk {
            root,
            files,
            max_depth,
            exclude,
        } => walk(&root, files, max_depth, &exclude),
        Command::Detect => detect(),
        Command::Run {
            silent,
            work_dir,
            command,
        } => run_command(silent, work_dir, &command),
        Command::Level { name } => level(&name),
    };

    handler.close_now();
    result
}

fn match_patterns(subject: &str, patterns: &[String]) -> Result<i32> {
    match patterns.iter().find(|p| wildcard::matches(subject, p.as_str())) {
        Some(pattern) => {
            color::colored_v(Color::Green, format_args!("{} matches {}", subject, pattern));
            Ok(0)
        }
        None => {
            color::dim_v(format_args!("{} matches none of {}", subject, patterns.join(" ")));
            Ok(1)
        }
    }
}

fn walk(root: &str, files: bool, max_depth: i32, exclude: &[String]) -> Result<i32> {
    let excludes: Vec<&str> = exclude.iter().map(String::as_str).collect();
    let indent = |depth: i32| "  ".repeat(depth.max(0) as usize);

    if files {
        dir::for_file_max(root, 0, max_depth, &excludes, |depth, path, _| {
            color::text(format_args!("{}{}\n", indent(depth), path.display()));
            Ok(false)
        })?;
    } else {
        dir::for_dir_max(root, 0, max_depth, &excludes, |depth, path, _| {
            color::text(format_args!(
                "{}{}\n",
                indent(depth),
                color::to_color(Color::Blue, format_args!("{}", path.display()))
            ));
            Ok(false)
        })?;
    }
    Ok(0)
}

fn detect() -> Result<i32> {
    for (name, value) in Detections::collect().entries() {
        let value = if value {
            color::to_color(Color::Green, format_args!("yes"))
        } else {
            color::to_dim(format_args!("no"))
        };
        color::text(format_args!("{:<20} {}\n", name, value));
    }
    Ok(0)
}

fn run_command(silent: bool, work_dir: Option<std::path::PathBuf>, command: &[String]) -> Result<i32> {
    let mut calling = Calling::new().command_slice(command);
    if let Some(dir) = work_dir {
        calling = calling.work_dir(dir);
    }
    if silent {
        calling = calling.capture_stdout().capture_stderr().quiet();
    }

    match calling.run_and_check_error() {
        Ok(()) => Ok(0),
        Err(Error::CommandFailed { code, .. }) => {
            color::dim_v(format_args!("exit code {}", code));
            Ok(code)
        }
        Err(err) => Err(err),
    }
}

fn level(name: &str) -> Result<i32> {
    let level = parse_level(name)?;
    color::highlight(format_args!("{} {}", level, level as u32));
    Ok(0)
}

fn main() {
    match run() {
        Ok(0) => {}
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("{} {}", color::to_color(Color::LightRed, format_args!("error:")), err);
            process::exit(1);
        }
    }
}

//! Running external commands.

// std imports
use std::ffi::{OsStr, OsString};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

// local imports
use crate::error::*;

// ---

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Output {
    pub command: String,
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl Output {
    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// Turns a non-zero exit code into [`Error::CommandFailed`].
    pub fn check(self) -> Result<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(Error::CommandFailed {
                command: self.command,
                code: self.code,
                stderr: self.stderr,
            })
        }
    }
}

/// Finds an executable in `PATH`.
pub fn look_path(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|e| Error::CommandNotFound(name.to_owned(), e))
}

/// Runs a command with inherited standard streams and waits for it.
pub fn run<C, I, S>(cmd: C, args: I) -> Result<()>
where
    C: AsRef<OsStr>,
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(cmd);
    command.args(args);
    let status = command.status()?;
    exit_code(&describe(&command), status, String::new()).map(|_| ())
}

/// Runs a command discarding all of its output.
pub fn run_quiet<C, I, S>(cmd: C, args: I) -> Result<()>
where
    C: AsRef<OsStr>,
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(cmd);
    command.args(args).stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());
    let status = command.status()?;
    exit_code(&describe(&command), status, String::new()).map(|_| ())
}

/// Runs a command capturing its standard output and error.
///
/// A non-zero exit code is not an error here, see [`Output::check`].
/// A command killed by a signal gives [`Error::CommandTerminated`].
pub fn run_with_output<C, I, S>(cmd: C, args: I) -> Result<Output>
where
    C: AsRef<OsStr>,
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(cmd);
    command.args(args);
    let description = describe(&command);
    let output = command.output()?;
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    match output.status.code() {
        Some(code) => Ok(Output {
            command: description,
            code,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr,
        }),
        None => Err(Error::CommandTerminated {
            command: description,
            stderr,
        }),
    }
}

/// Runs a command with superuser privileges, prefixing it with `sudo` unless already root.
pub fn sudo<C, I, S>(cmd: C, args: I) -> Result<Output>
where
    C: AsRef<OsStr>,
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    if is_root() {
        return run_with_output(cmd, args)?.check();
    }
    let sudo = look_path("sudo")?;
    let args = std::iter::once(cmd.as_ref().to_owned()).chain(args.into_iter().map(|a| a.as_ref().to_owned()));
    run_with_output(sudo, args)?.check()
}

/// Returns `true` if the effective user is root.
#[cfg(unix)]
pub fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and never fails.
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
pub fn is_root() -> bool {
    false
}

// ---

/// Runs a command line and calls `f` with the exit code and the output on success.
///
/// The command line is split by [`split_command_string`].
/// Failures are logged before being returned.
pub fn call(cmdline: &str, f: impl FnOnce(i32, &str)) -> Result<()> {
    call_impl(&split_command_string(cmdline), f, true)
}

/// Same as [`call`] but does not log failures.
pub fn call_quiet(cmdline: &str, f: impl FnOnce(i32, &str)) -> Result<()> {
    call_impl(&split_command_string(cmdline), f, false)
}

/// Same as [`call`] with the command already split into parts.
pub fn call_slice<S: AsRef<OsStr>>(parts: &[S], f: impl FnOnce(i32, &str)) -> Result<()> {
    call_impl(parts, f, true)
}

/// Same as [`call_slice`] but does not log failures.
pub fn call_slice_quiet<S: AsRef<OsStr>>(parts: &[S], f: impl FnOnce(i32, &str)) -> Result<()> {
    call_impl(parts, f, false)
}

fn call_impl<S: AsRef<OsStr>>(parts: &[S], f: impl FnOnce(i32, &str), report: bool) -> Result<()> {
    let result = match parts.split_first() {
        Some((cmd, args)) => run_with_output(cmd, args).and_then(Output::check),
        None => Err(Error::EmptyCommand),
    };
    match result {
        Ok(output) => {
            f(output.code, &output.stdout);
            Ok(())
        }
        Err(e) => {
            if report {
                log::error!("failed to run {:?}: {}", describe_parts(parts), e);
            }
            Err(e)
        }
    }
}

// ---

type OnOk<'a> = Box<dyn FnMut(i32, &str) + 'a>;
type OnError<'a> = Box<dyn FnMut(&Error, i32, &str, &str) + 'a>;

/// Command builder with output capturing and completion callbacks.
///
/// ```no_run
/// use logkit::exec::Calling;
///
/// let mut calling = Calling::new()
///     .command("git", ["status", "--short"])
///     .capture_stdout()
///     .quiet();
/// if calling.run_and_check_error().is_ok() {
///     print!("{}", calling.output_text());
/// }
/// ```
#[derive(Default)]
pub struct Calling<'a> {
    command: Option<Command>,
    envs: Vec<(OsString, OsString)>,
    work_dir: Option<PathBuf>,
    capture_stdout: bool,
    capture_stderr: bool,
    stdout_writer: Option<Box<dyn Write + 'a>>,
    stderr_writer: Option<Box<dyn Write + 'a>>,
    quiet: bool,
    on_ok: Option<OnOk<'a>>,
    on_error: Option<OnError<'a>>,
    ret_code: i32,
    output: String,
    slurp: String,
}

impl<'a> Calling<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn command<C, I, S>(mut self, cmd: C, args: I) -> Self
    where
        C: AsRef<OsStr>,
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(cmd);
        command.args(args);
        self.command = Some(command);
        self
    }

    /// Sets the command from a command line split by [`split_command_string`].
    pub fn command_string(self, cmdline: &str) -> Self {
        self.command_slice(&split_command_string(cmdline))
    }

    /// Sets the command from its parts, the first one being the program.
    pub fn command_slice<S: AsRef<OsStr>>(mut self, parts: &[S]) -> Self {
        self.command = parts.split_first().map(|(cmd, args)| {
            let mut command = Command::new(cmd);
            command.args(args);
            command
        });
        self
    }

    /// Adds an environment variable on top of the inherited environment.
    /// An empty key is ignored.
    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        if !key.as_ref().is_empty() {
            self.envs.push((key.as_ref().to_owned(), value.as_ref().to_owned()));
        }
        self
    }

    pub fn work_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.work_dir = Some(dir.as_ref().to_owned());
        self
    }

    /// Captures standard output, see [`Calling::output_text`].
    pub fn capture_stdout(mut self) -> Self {
        self.capture_stdout = true;
        self
    }

    /// Captures standard output into `writer`.
    pub fn capture_stdout_to(mut self, writer: impl Write + 'a) -> Self {
        self.capture_stdout = true;
        self.stdout_writer = Some(Box::new(writer));
        self
    }

    /// Captures standard error, see [`Calling::slurp_text`].
    pub fn capture_stderr(mut self) -> Self {
        self.capture_stderr = true;
        self
    }

    /// Captures standard error into `writer`.
    pub fn capture_stderr_to(mut self, writer: impl Write + 'a) -> Self {
        self.capture_stderr = true;
        self.stderr_writer = Some(Box::new(writer));
        self
    }

    /// Suppresses logging of failures.
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    pub fn on_ok(mut self, f: impl FnMut(i32, &str) + 'a) -> Self {
        self.on_ok = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl FnMut(&Error, i32, &str, &str) + 'a) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    /// Runs the command and invokes the callbacks.
    ///
    /// Without an error callback, a failure is logged along with the captured
    /// output unless [`Calling::quiet`] was set.
    pub fn run(&mut self) {
        self.run_and_check_error().ok();
    }

    /// Same as [`Calling::run`] but also returns the error.
    pub fn run_and_check_error(&mut self) -> Result<()> {
        match self.run_now() {
            Ok(()) => {
                if let Some(on_ok) = &mut self.on_ok {
                    on_ok(self.ret_code, &self.output);
                }
                Ok(())
            }
            Err(e) => {
                if let Some(on_error) = &mut self.on_error {
                    on_error(&e, self.ret_code, &self.output, &self.slurp);
                } else if !self.quiet {
                    if !self.output.is_empty() {
                        log::info!("output:\n{}", self.output);
                    }
                    if !self.slurp.is_empty() {
                        log::error!("stderr:\n{}", self.slurp);
                    }
                    log::error!("command failed: {}", e);
                }
                Err(e)
            }
        }
    }

    fn run_now(&mut self) -> Result<()> {
        let mut command = self.command.take().ok_or(Error::EmptyCommand)?;
        let description = describe(&command);
        command.envs(self.envs.iter().map(|(k, v)| (k, v)));
        if let Some(dir) = &self.work_dir {
            command.current_dir(dir);
        }
        command.stdout(if self.capture_stdout { Stdio::piped() } else { Stdio::inherit() });
        command.stderr(if self.capture_stderr { Stdio::piped() } else { Stdio::inherit() });

        let output = command.spawn()?.wait_with_output()?;
        match &mut self.stdout_writer {
            Some(writer) => writer.write_all(&output.stdout)?,
            None => self.output = String::from_utf8_lossy(&output.stdout).into_owned(),
        }
        match &mut self.stderr_writer {
            Some(writer) => writer.write_all(&output.stderr)?,
            None => self.slurp = String::from_utf8_lossy(&output.stderr).into_owned(),
        }

        self.ret_code = output.status.code().unwrap_or(-1);
        exit_code(&description, output.status, self.slurp.clone()).map(|_| ())
    }

    /// Returns the captured standard output.
    pub fn output_text(&self) -> &str {
        &self.output
    }

    /// Returns the captured standard error.
    pub fn slurp_text(&self) -> &str {
        &self.slurp
    }

    pub fn ret_code(&self) -> i32 {
        self.ret_code
    }
}

// ---

fn exit_code(command: &str, status: ExitStatus, stderr: String) -> Result<i32> {
    match status.code() {
        Some(0) => Ok(0),
        Some(code) => Err(Error::CommandFailed {
            command: command.to_owned(),
            code,
            stderr,
        }),
        None => Err(Error::CommandTerminated {
            command: command.to_owned(),
            stderr,
        }),
    }
}

fn describe(command: &Command) -> String {
    std::iter::once(command.get_program())
        .chain(command.get_args())
        .map(|s| s.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

fn describe_parts<S: AsRef<OsStr>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(|s| s.as_ref().to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

// ---

/// Splits a command line into words honoring shell quoting.
///
/// Falls back to splitting on whitespace if the quotes are unbalanced.
pub fn split_command_string(s: &str) -> Vec<String> {
    shellwords::split(s).unwrap_or_else(|_| s.split_whitespace().map(String::from).collect())
}

/// Strips a matching pair of surrounding double or single quotes.
pub fn trim_quotes(s: &str) -> &str {
    let bytes = s.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(&first), Some(&last)) if s.len() >= 2 && first == last && (first == b'"' || first == b'\'') => {
            &s[1..s.len() - 1]
        }
        _ => s,
    }
}

/// Prefixes every line of `s` with `pad` spaces, terminating each line with `\n`.
pub fn left_pad(s: &str, pad: usize) -> String {
    if pad == 0 {
        return s.to_owned();
    }
    let prefix = " ".repeat(pad);
    let mut result = String::with_capacity(s.len() + pad * 4);
    for line in s.lines() {
        result.push_str(&prefix);
        result.push_str(line);
        result.push('\n');
    }
    result
}

#[cfg(test)]
mod tests;

//! File system helpers: path normalization, file modes, copying and directory walking.

// std imports
use std::borrow::Cow;
use std::env;
use std::ffi::OsStr;
use std::fs::{self, DirEntry, Metadata};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

// third-party imports
use clean_path::Clean;

// local imports
use crate::error::*;
use crate::exec;

// ---

/// Returns the absolute path of the running executable.
pub fn executable_path() -> PathBuf {
    env::current_exe().unwrap_or_else(|_| abs_path(env::args().next().unwrap_or_default()))
}

/// Returns the directory containing the running executable.
pub fn executable_dir() -> PathBuf {
    let path = executable_path();
    path.parent().map(Path::to_path_buf).unwrap_or(path)
}

/// Returns the current working directory, or `.` if it is unavailable.
pub fn current_dir() -> PathBuf {
    env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Normalizes a directory name.
///
/// Environment variables (`$VAR`, `${VAR}`) are expanded with unset ones
/// replaced by an empty string, a leading `~/` is replaced with the home
/// directory and a leading `./` or `../` is resolved against the current
/// directory. The result is cleaned lexically.
pub fn normalize_dir(s: impl AsRef<str>) -> PathBuf {
    let s = expand_env(s.as_ref());
    if s.starts_with("./") || s.starts_with("../") {
        current_dir().join(&*s).clean()
    } else {
        expand_home(&s).clean()
    }
}

/// Normalizes a path name the same way as [`normalize_dir`] but leaves
/// relative paths relative.
pub fn normalize_path(s: impl AsRef<str>) -> PathBuf {
    expand_home(&expand_env(s.as_ref())).clean()
}

/// Returns a normalized absolute path.
pub fn abs_path(s: impl AsRef<str>) -> PathBuf {
    let path = normalize_path(s);
    match std::path::absolute(&path) {
        Ok(abs) => abs.clean(),
        Err(_) => path,
    }
}

/// Resolves all symbolic links in `path`, returning `path` itself on failure.
pub fn follow_symlink(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn expand_env(s: &str) -> Cow<'_, str> {
    shellexpand::env_with_context_no_errors(s, |name| Some(env::var(name).unwrap_or_default()))
}

fn expand_home(s: &str) -> PathBuf {
    match (s.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(s),
    }
}

fn expand_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(expand_env(s).into_owned()),
        None => path.to_path_buf(),
    }
}

// ---

/// Returns `true` if `path` is a directory.
pub fn is_directory(path: impl AsRef<Path>) -> io::Result<bool> {
    Ok(fs::metadata(path)?.is_dir())
}

/// Returns `true` if `path` is a regular file.
pub fn is_regular_file(path: impl AsRef<Path>) -> io::Result<bool> {
    Ok(fs::metadata(path)?.is_file())
}

/// Returns `true` if `path` exists.
///
/// Environment variables in `path` are expanded first. Only a definite
/// "not found" makes the file absent, any other error counts as existing.
pub fn file_exists(path: impl AsRef<Path>) -> bool {
    match fs::metadata(expand_path(path.as_ref())) {
        Ok(_) => true,
        Err(e) => e.kind() != ErrorKind::NotFound,
    }
}

/// Tests the mode of `path` with `tester`. Returns `false` if the file cannot be stat'ed.
pub fn file_mode_is(path: impl AsRef<Path>, tester: impl FnOnce(FileMode) -> bool) -> bool {
    fs::metadata(path).map(|m| tester(FileMode::from(&m))).unwrap_or(false)
}

// ---

/// File type and permission bits in the POSIX `st_mode` layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileMode(u32);

impl FileMode {
    const TYPE_MASK: u32 = 0o170000;
    const SOCKET: u32 = 0o140000;
    const SYMLINK: u32 = 0o120000;
    const REGULAR: u32 = 0o100000;
    const BLOCK_DEVICE: u32 = 0o060000;
    const DIRECTORY: u32 = 0o040000;
    const CHAR_DEVICE: u32 = 0o020000;
    const NAMED_PIPE: u32 = 0o010000;

    const SETUID: u32 = 0o4000;
    const SETGID: u32 = 0o2000;
    const STICKY: u32 = 0o1000;

    const EXEC: u32 = 0o111;
    const WRITE: u32 = 0o222;
    const READ: u32 = 0o444;
    const OWNER: u32 = 0o700;
    const GROUP: u32 = 0o070;
    const OTHER: u32 = 0o007;

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    fn file_type(self) -> u32 {
        self.0 & Self::TYPE_MASK
    }

    fn has(self, bits: u32) -> bool {
        self.0 & bits != 0
    }

    fn has_all(self, bits: u32) -> bool {
        self.0 & bits == bits
    }

    pub fn is_regular(self) -> bool {
        self.file_type() == Self::REGULAR
    }

    pub fn is_directory(self) -> bool {
        self.file_type() == Self::DIRECTORY
    }

    pub fn is_symlink(self) -> bool {
        self.file_type() == Self::SYMLINK
    }

    /// Returns `true` for both block and character devices.
    pub fn is_device(self) -> bool {
        matches!(self.file_type(), Self::BLOCK_DEVICE | Self::CHAR_DEVICE)
    }

    pub fn is_char_device(self) -> bool {
        self.file_type() == Self::CHAR_DEVICE
    }

    pub fn is_named_pipe(self) -> bool {
        self.file_type() == Self::NAMED_PIPE
    }

    pub fn is_socket(self) -> bool {
        self.file_type() == Self::SOCKET
    }

    pub fn is_setuid(self) -> bool {
        self.has(Self::SETUID)
    }

    pub fn is_setgid(self) -> bool {
        self.has(Self::SETGID)
    }

    pub fn is_sticky(self) -> bool {
        self.has(Self::STICKY)
    }

    /// Returns `true` if the file type is none of the known ones.
    pub fn is_irregular(self) -> bool {
        !matches!(
            self.file_type(),
            Self::SOCKET
                | Self::SYMLINK
                | Self::REGULAR
                | Self::BLOCK_DEVICE
                | Self::DIRECTORY
                | Self::CHAR_DEVICE
                | Self::NAMED_PIPE
        )
    }

    pub fn is_exec_owner(self) -> bool {
        self.has(Self::EXEC & Self::OWNER)
    }

    pub fn is_exec_group(self) -> bool {
        self.has(Self::EXEC & Self::GROUP)
    }

    pub fn is_exec_other(self) -> bool {
        self.has(Self::EXEC & Self::OTHER)
    }

    pub fn is_exec_any(self) -> bool {
        self.has(Self::EXEC)
    }

    pub fn is_exec_all(self) -> bool {
        self.has_all(Self::EXEC)
    }

    pub fn is_write_owner(self) -> bool {
        self.has(Self::WRITE & Self::OWNER)
    }

    pub fn is_write_group(self) -> bool {
        self.has(Self::WRITE & Self::GROUP)
    }

    pub fn is_write_other(self) -> bool {
        self.has(Self::WRITE & Self::OTHER)
    }

    pub fn is_write_any(self) -> bool {
        self.has(Self::WRITE)
    }

    pub fn is_write_all(self) -> bool {
        self.has_all(Self::WRITE)
    }

    pub fn is_read_owner(self) -> bool {
        self.has(Self::READ & Self::OWNER)
    }

    pub fn is_read_group(self) -> bool {
        self.has(Self::READ & Self::GROUP)
    }

    pub fn is_read_other(self) -> bool {
        self.has(Self::READ & Self::OTHER)
    }

    pub fn is_read_any(self) -> bool {
        self.has(Self::READ)
    }

    pub fn is_read_all(self) -> bool {
        self.has_all(Self::READ)
    }

    /// Returns a short human readable name of the file type.
    pub fn kind(self) -> &'static str {
        match self.file_type() {
            Self::SOCKET => "socket",
            Self::SYMLINK => "symlink",
            Self::REGULAR => "regular file",
            Self::BLOCK_DEVICE => "block device",
            Self::DIRECTORY => "directory",
            Self::CHAR_DEVICE => "character device",
            Self::NAMED_PIPE => "named pipe",
            _ => "irregular file",
        }
    }
}

#[cfg(unix)]
impl From<&Metadata> for FileMode {
    fn from(metadata: &Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;
        Self(metadata.mode())
    }
}

#[cfg(not(unix))]
impl From<&Metadata> for FileMode {
    fn from(metadata: &Metadata) -> Self {
        let kind = if metadata.is_dir() {
            Self::DIRECTORY | Self::EXEC
        } else if metadata.is_symlink() {
            Self::SYMLINK
        } else {
            Self::REGULAR
        };
        let access = if metadata.permissions().readonly() {
            Self::READ
        } else {
            Self::READ | Self::WRITE
        };
        Self(kind | access)
    }
}

// ---

/// Creates directory `dir` with all its parents unless it already exists.
pub fn ensure_dir(dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    if dir.as_os_str().is_empty() {
        return Err(Error::EmptyDirectory);
    }
    if !file_exists(dir) {
        create_dir_all(&expand_path(dir))?;
    }
    Ok(())
}

/// Same as [`ensure_dir`] but retries with `sudo mkdir -p` when permission is denied,
/// then hands the directory over to the current user.
pub fn ensure_dir_enh(dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    if dir.as_os_str().is_empty() {
        return Err(Error::EmptyDirectory);
    }
    if file_exists(dir) {
        return Ok(());
    }
    let dir = expand_path(dir);
    match create_dir_all(&dir) {
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            log::debug!("permission denied creating {}, retrying with sudo", dir.display());
            exec::sudo("mkdir", &[OsStr::new("-p"), dir.as_os_str()])?;
            if let Some(user) = env::var_os("USER").or_else(|| env::var_os("LOGNAME")) {
                let mut owner = user;
                owner.push(":");
                exec::sudo("chown", &[owner.as_os_str(), dir.as_os_str()])?;
            }
            Ok(())
        }
        result => Ok(result?),
    }
}

fn create_dir_all(dir: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder.create(dir)
}

/// Removes `path` and everything below it. A missing path is not an error.
pub fn remove_dir_recursive(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let result = match fs::symlink_metadata(path) {
        Ok(m) if m.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) => Err(e),
    };
    match result {
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        result => Ok(result?),
    }
}

/// Deletes file `path` if it exists.
pub fn delete_file(path: impl AsRef<Path>) -> Result<()> {
    let path = expand_path(path.as_ref());
    if file_exists(&path) {
        fs::remove_file(&path)?;
    }
    Ok(())
}

/// Copies the contents of regular file `src` to `dst`, replacing its contents if it exists.
pub fn copy_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> Result<()> {
    copy_file_impl(src.as_ref(), dst.as_ref(), false)
}

/// Copies regular file `src` to `dst`, trying to create a hard link first.
///
/// If `src` and `dst` are already the same file, nothing is done.
pub fn copy_file_by_link_first(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> Result<()> {
    copy_file_impl(src.as_ref(), dst.as_ref(), true)
}

fn copy_file_impl(src: &Path, dst: &Path, link_first: bool) -> Result<()> {
    let src = expand_path(src);
    let dst = expand_path(dst);

    let src_meta = fs::metadata(&src)?;
    if !src_meta.is_file() {
        return Err(Error::NonRegularFile {
            path: src,
            role: FileRole::Source,
            kind: FileMode::from(&src_meta).kind().into(),
        });
    }

    match fs::metadata(&dst) {
        Ok(dst_meta) => {
            if !dst_meta.is_file() {
                return Err(Error::NonRegularFile {
                    path: dst,
                    role: FileRole::Destination,
                    kind: FileMode::from(&dst_meta).kind().into(),
                });
            }
            if same_file(&src, &src_meta, &dst, &dst_meta) {
                return Ok(());
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    if link_first && fs::hard_link(&src, &dst).is_ok() {
        return Ok(());
    }

    copy_file_contents(&src, &dst)
}

fn copy_file_contents(src: &Path, dst: &Path) -> Result<()> {
    let mut input = fs::File::open(src)?;
    let mut output = fs::File::create(dst)?;
    io::copy(&mut input, &mut output)?;
    output.sync_all()?;
    Ok(())
}

#[cfg(unix)]
fn same_file(_: &Path, a: &Metadata, _: &Path, b: &Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;
    a.dev() == b.dev() && a.ino() == b.ino()
}

#[cfg(not(unix))]
fn same_file(a: &Path, _: &Metadata, b: &Path, _: &Metadata) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

// ---

/// Changes the current directory and restores the previous one when dropped.
///
/// ```no_run
/// let _guard = logkit::dir::push_dir("/tmp");
/// // work in /tmp ...
/// ```
#[must_use]
pub struct PushDir {
    saved: Option<PathBuf>,
}

/// Enters `dir`. If that fails, the returned guard does nothing.
pub fn push_dir(dir: impl AsRef<Path>) -> PushDir {
    let saved = current_dir();
    match env::set_current_dir(dir.as_ref()) {
        Ok(()) => PushDir { saved: Some(saved) },
        Err(e) => {
            log::debug!("failed to enter {}: {}", dir.as_ref().display(), e);
            PushDir { saved: None }
        }
    }
}

impl Drop for PushDir {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            if let Err(e) = env::set_current_dir(&saved) {
                log::debug!("failed to return to {}: {}", saved.display(), e);
            }
        }
    }
}

// ---

/// Walks `root` and all of its subdirectories, see [`for_dir_max`].
pub fn for_dir<F>(root: impl AsRef<str>, excludes: &[&str], cb: F) -> Result<()>
where
    F: FnMut(i32, &Path, &Metadata) -> Result<bool>,
{
    for_dir_max(root, 0, -1, excludes, cb)
}

/// Walks `root` and its subdirectories up to `max_depth` levels deep.
///
/// The callback is called for `root` itself first and then for each
/// subdirectory with its depth, its path and its metadata. Returning `true`
/// from the callback stops the walk. A zero or negative `max_depth` means
/// no limit. Directories whose full path matches any of the `excludes`
/// wildcard patterns are skipped together with their contents.
pub fn for_dir_max<F>(root: impl AsRef<str>, initial_depth: i32, max_depth: i32, excludes: &[&str], mut cb: F) -> Result<()>
where
    F: FnMut(i32, &Path, &Metadata) -> Result<bool>,
{
    if max_depth > 0 && initial_depth >= max_depth {
        return Ok(());
    }
    let root = normalize_dir(root);
    let (entries, metadata) = open_dir(&root)?;
    walk_dirs(&root, entries, &metadata, initial_depth, max_depth, excludes, &mut cb).map(|_| ())
}

fn walk_dirs<F>(
    dir: &Path,
    entries: Vec<DirEntry>,
    metadata: &Metadata,
    depth: i32,
    max_depth: i32,
    excludes: &[&str],
    cb: &mut F,
) -> Result<bool>
where
    F: FnMut(i32, &Path, &Metadata) -> Result<bool>,
{
    if cb(depth, dir, metadata)? {
        return Ok(true);
    }
    if max_depth > 0 && depth + 1 >= max_depth {
        return Ok(false);
    }

    for entry in entries {
        if !entry.file_type().is_ok_and(|t| t.is_dir()) {
            continue;
        }
        let path = entry.path();
        if excluded(&path, excludes) {
            continue;
        }
        let (children, metadata) = match open_dir(&path) {
            Ok(opened) => opened,
            Err(e) => {
                log::error!("failed to walk {}: {}", path.display(), e);
                continue;
            }
        };
        if walk_dirs(&path, children, &metadata, depth + 1, max_depth, excludes, cb)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Walks all files below `root`, see [`for_file_max`].
pub fn for_file<F>(root: impl AsRef<str>, excludes: &[&str], cb: F) -> Result<()>
where
    F: FnMut(i32, &Path, &DirEntry) -> Result<bool>,
{
    for_file_max(root, 0, -1, excludes, cb)
}

/// Walks the non-directory entries below `root` up to `max_depth` levels deep.
///
/// The callback receives the depth, the directory containing the entry and
/// the entry itself. Returning `true` from the callback stops the walk.
/// A zero or negative `max_depth` means no limit. Entries whose full path
/// matches any of the `excludes` wildcard patterns are skipped, and so are
/// the contents of matching directories.
pub fn for_file_max<F>(
    root: impl AsRef<str>,
    initial_depth: i32,
    max_depth: i32,
    excludes: &[&str],
    mut cb: F,
) -> Result<()>
where
    F: FnMut(i32, &Path, &DirEntry) -> Result<bool>,
{
    if max_depth > 0 && initial_depth >= max_depth {
        return Ok(());
    }
    let root = normalize_dir(root);
    let entries = read_dir_sorted(&root)?;
    walk_files(&root, entries, initial_depth, max_depth, excludes, &mut cb).map(|_| ())
}

fn walk_files<F>(
    dir: &Path,
    entries: Vec<DirEntry>,
    depth: i32,
    max_depth: i32,
    excludes: &[&str],
    cb: &mut F,
) -> Result<bool>
where
    F: FnMut(i32, &Path, &DirEntry) -> Result<bool>,
{
    for entry in entries {
        let path = entry.path();
        if excluded(&path, excludes) {
            continue;
        }
        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            if max_depth > 0 && depth + 1 >= max_depth {
                continue;
            }
            let children = match read_dir_sorted(&path) {
                Ok(children) => children,
                Err(e) => {
                    log::error!("failed to walk {}: {}", path.display(), e);
                    continue;
                }
            };
            if walk_files(&path, children, depth + 1, max_depth, excludes, cb)? {
                return Ok(true);
            }
        } else if cb(depth, dir, &entry)? {
            return Ok(true);
        }
    }
    Ok(false)
}

// Failures here are the walker's own, callback errors never pass through.
fn open_dir(dir: &Path) -> io::Result<(Vec<DirEntry>, Metadata)> {
    let entries = read_dir_sorted(dir)?;
    let metadata = fs::metadata(dir)?;
    Ok((entries, metadata))
}

fn read_dir_sorted(dir: &Path) -> io::Result<Vec<DirEntry>> {
    let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());
    Ok(entries)
}

fn excluded(path: &Path, excludes: &[&str]) -> bool {
    !excludes.is_empty() && wildcard::matches_any(&path.to_string_lossy(), excludes)
}

// ---

/// Interprets a string as a boolean.
///
/// `1`, `y`, `t`, `yes`, `true`, `ok` and `on` (in any case) are `true`,
/// an empty string gives `default` and anything else is `false`.
pub fn to_bool(value: &str, default: bool) -> bool {
    match value.to_ascii_lowercase().as_str() {
        "1" | "y" | "t" | "yes" | "true" | "ok" | "on" => true,
        "" => default,
        _ => false,
    }
}

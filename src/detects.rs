//! Runtime environment detection: tests, debuggers, containers and build features.

// std imports
use std::{env, fs, path::Path};

// local imports
use crate::{dir::file_exists, states};

// ---

const DOCKER_ENV_FILE: &str = "/.dockerenv";
const K8S_SERVICE_HOST: &str = "KUBERNETES_SERVICE_HOST";
const K8S_SECRETS_DIR: &str = "/var/run/secrets/kubernetes.io";
const PODINFO_LABELS: &str = "/etc/podinfo/labels";
const ISTIO_LABEL: &str = "service.istio.io/canonical-name";

const LIBTEST_FLAGS: &[&str] = &[
    "--nocapture",
    "--test-threads",
    "--exact",
    "--include-ignored",
    "--show-output",
];

// ---

/// Returns `true` if the process is a test harness, judging by its arguments
/// or by the variables cargo-nextest and libtest set.
pub fn in_testing() -> bool {
    let args: Vec<String> = env::args().collect();
    in_testing_with(&args) || env::var_os("NEXTEST").is_some() || env::var_os("RUST_TEST_THREADS").is_some()
}

/// Returns `true` if `args` look like the command line of a cargo test binary.
///
/// The program is considered a test binary if it lives in a `deps` directory and
/// its file name ends with a 16-digit hex hash, or if any argument is a libtest flag.
pub fn in_testing_with<S: AsRef<str>>(args: &[S]) -> bool {
    let Some(program) = args.first() else {
        return false;
    };
    if is_test_binary(Path::new(program.as_ref())) {
        return true;
    }
    args.iter().skip(1).any(|arg| {
        let arg = arg.as_ref();
        LIBTEST_FLAGS
            .iter()
            .any(|flag| arg == *flag || arg.strip_prefix(flag).is_some_and(|rest| rest.starts_with('=')))
    })
}

fn is_test_binary(program: &Path) -> bool {
    let in_deps = program
        .parent()
        .and_then(|p| p.file_name())
        .is_some_and(|name| name == "deps");
    let hashed = program
        .file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.rsplit_once('-'))
        .is_some_and(|(_, hash)| hash.len() == 16 && hash.bytes().all(|b| b.is_ascii_hexdigit()));
    in_deps && hashed
}

/// Returns `true` if a debugger is attached to the process.
///
/// On Linux, this checks the `TracerPid` field of `/proc/self/status`.
/// On other platforms it is always `false`.
pub fn in_debugging() -> bool {
    is_debugger_attached()
}

/// Synonym for [`in_debugging`].
#[cfg(target_os = "linux")]
pub fn is_debugger_attached() -> bool {
    fs::read_to_string("/proc/self/status")
        .map(|status| tracer_pid(&status).is_some_and(|pid| pid != 0))
        .unwrap_or(false)
}

/// Synonym for [`in_debugging`].
#[cfg(not(target_os = "linux"))]
pub fn is_debugger_attached() -> bool {
    false
}

fn tracer_pid(status: &str) -> Option<u32> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("TracerPid:"))
        .and_then(|v| v.trim().parse().ok())
}

/// Returns `true` if trace mode is on.
pub fn in_tracing() -> bool {
    states::env().trace_mode()
}

/// Returns `true` while developing: under a debugger or in tests.
pub fn in_developing_time() -> bool {
    in_debugging() || in_testing()
}

/// Returns `true` for builds with debug assertions.
pub const fn is_debug_build() -> bool {
    cfg!(debug_assertions)
}

/// Returns `true` if running inside a docker container, i.e. `/.dockerenv` exists.
pub fn in_docker_env_simple() -> bool {
    Path::new(DOCKER_ENV_FILE).exists()
}

/// Returns `true` if running inside docker or built with the `docker` feature.
pub fn in_docker() -> bool {
    in_docker_env_simple() || is_docker_build()
}

/// Returns `true` if the Kubernetes service host variable is set or built with the `k8s` feature.
pub fn in_k8s() -> bool {
    env::var_os(K8S_SERVICE_HOST).is_some_and(|v| !v.is_empty()) || is_k8s_build()
}

/// Alternative Kubernetes detector checking for mounted service account secrets.
pub fn in_k8s_yn() -> bool {
    file_exists(K8S_SECRETS_DIR) || is_k8s_build()
}

/// Returns `true` if the pod was injected by istio.
///
/// The pod labels must be exposed at `/etc/podinfo/labels` through a downward API volume.
pub fn in_istio() -> bool {
    if env::var_os(K8S_SERVICE_HOST).is_some_and(|v| !v.is_empty()) {
        if let Ok(labels) = fs::read_to_string(PODINFO_LABELS) {
            if labels.contains(ISTIO_LABEL) {
                return true;
            }
        }
    }
    is_istio_build()
}

pub const fn is_docker_build() -> bool {
    cfg!(feature = "docker")
}

pub const fn is_k8s_build() -> bool {
    cfg!(feature = "k8s")
}

pub const fn is_istio_build() -> bool {
    cfg!(feature = "istio")
}

pub const fn is_verbose_build() -> bool {
    cfg!(feature = "verbose")
}

pub fn is_verbose_mode_enabled() -> bool {
    states::env().is_verbose_mode()
}

pub fn verbose_level() -> usize {
    states::env().count_of_verbose()
}

pub fn is_quiet_mode_enabled() -> bool {
    states::env().is_quiet_mode()
}

pub fn quiet_level() -> usize {
    states::env().count_of_quiet()
}

pub fn is_no_color_mode_enabled() -> bool {
    states::env().is_no_color_mode()
}

pub fn no_color_level() -> usize {
    states::env().count_of_no_color()
}

pub fn is_debug_mode_enabled() -> bool {
    states::env().debug_mode()
}

pub fn debug_level() -> usize {
    states::env().debug_level()
}

pub fn is_trace_mode_enabled() -> bool {
    states::env().trace_mode()
}

pub fn trace_level() -> usize {
    states::env().trace_level()
}

// ---

/// A snapshot of all detections, used by the `detect` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detections {
    pub in_testing: bool,
    pub in_debugging: bool,
    pub in_tracing: bool,
    pub in_developing_time: bool,
    pub debug_build: bool,
    pub in_docker: bool,
    pub in_k8s: bool,
    pub in_istio: bool,
    pub verbose: bool,
    pub quiet: bool,
    pub no_color: bool,
}

impl Detections {
    pub fn collect() -> Self {
        Self {
            in_testing: in_testing(),
            in_debugging: in_debugging(),
            in_tracing: in_tracing(),
            in_developing_time: in_developing_time(),
            debug_build: is_debug_build(),
            in_docker: in_docker(),
            in_k8s: in_k8s(),
            in_istio: in_istio(),
            verbose: is_verbose_mode_enabled(),
            quiet: is_quiet_mode_enabled(),
            no_color: is_no_color_mode_enabled(),
        }
    }

    /// Returns the detections as `(name, value)` pairs in a stable order.
    pub fn entries(&self) -> [(&'static str, bool); 11] {
        [
            ("in-testing", self.in_testing),
            ("in-debugging", self.in_debugging),
            ("in-tracing", self.in_tracing),
            ("in-developing-time", self.in_developing_time),
            ("debug-build", self.debug_build),
            ("in-docker", self.in_docker),
            ("in-k8s", self.in_k8s),
            ("in-istio", self.in_istio),
            ("verbose", self.verbose),
            ("quiet", self.quiet),
            ("no-color", self.no_color),
        ]
    }
}

//! C library flavor detection for Linux hosts.
//!
//! The running process is asked for its glibc version first. Only when the
//! process offers no way to ask is `/usr/bin/ldd` inspected, and a failed
//! inspection counts as musl.

use std::path::PathBuf;

use tracing::debug;

use crate::platform::LibcFlavor;

/// The system binary inspected when the runtime cannot report a glibc version.
pub const LDD_PATH: &str = "/usr/bin/ldd";

/// What the runtime reports about glibc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlibcReport {
    /// The runtime has no way to report a glibc version.
    Unavailable,
    /// Reporting works, but no glibc version is present.
    Absent,
    /// The glibc version string.
    Version(String),
}

/// Source of the facts needed to tell glibc from musl.
pub trait LibcProbe {
    /// Asks the runtime for the glibc version it is linked against.
    fn glibc_report(&self) -> GlibcReport;

    /// Reads the contents of the `ldd` binary.
    fn read_ldd(&self) -> std::io::Result<Vec<u8>>;
}

/// Determines the libc flavor of the host.
pub fn detect_libc_flavor(probe: &impl LibcProbe) -> LibcFlavor {
    match probe.glibc_report() {
        GlibcReport::Version(version) if !version.is_empty() => {
            debug!("Runtime reports glibc {}", version);
            LibcFlavor::Gnu
        }
        GlibcReport::Version(_) | GlibcReport::Absent => {
            debug!("Runtime reports no glibc version");
            LibcFlavor::Musl
        }
        GlibcReport::Unavailable => match probe.read_ldd() {
            Ok(contents) => {
                if String::from_utf8_lossy(&contents).contains("musl") {
                    LibcFlavor::Musl
                } else {
                    LibcFlavor::Gnu
                }
            }
            Err(e) => {
                debug!("Failed to inspect ldd ({}), assuming musl", e);
                LibcFlavor::Musl
            }
        },
    }
}

/// Probe backed by the running process and the real filesystem.
#[derive(Debug, Clone)]
pub struct RuntimeProbe {
    ldd_path: PathBuf,
}

impl RuntimeProbe {
    /// Creates a probe that inspects `path` instead of [`LDD_PATH`].
    pub fn with_ldd_path(path: impl Into<PathBuf>) -> Self {
        Self {
            ldd_path: path.into(),
        }
    }
}

impl Default for RuntimeProbe {
    fn default() -> Self {
        Self::with_ldd_path(LDD_PATH)
    }
}

impl LibcProbe for RuntimeProbe {
    fn glibc_report(&self) -> GlibcReport {
        runtime_glibc_report()
    }

    fn read_ldd(&self) -> std::io::Result<Vec<u8>> {
        std::fs::read(&self.ldd_path)
    }
}

#[cfg(target_os = "linux")]
fn runtime_glibc_report() -> GlibcReport {
    use std::ffi::{CStr, c_char};

    type GnuGetLibcVersion = unsafe extern "C" fn() -> *const c_char;

    let this = libloading::os::unix::Library::this();

    // SAFETY: the signature matches glibc's declaration of the function.
    let symbol = match unsafe { this.get::<GnuGetLibcVersion>(b"gnu_get_libc_version\0") } {
        Ok(symbol) => symbol,
        Err(_) => return GlibcReport::Absent,
    };

    // SAFETY: takes no arguments and returns a pointer to a static string.
    let version = unsafe { (*symbol)() };
    if version.is_null() {
        return GlibcReport::Absent;
    }

    // SAFETY: non-null and NUL-terminated for the life of the process.
    let version = unsafe { CStr::from_ptr(version) };
    GlibcReport::Version(version.to_string_lossy().into_owned())
}

#[cfg(not(target_os = "linux"))]
fn runtime_glibc_report() -> GlibcReport {
    GlibcReport::Unavailable
}

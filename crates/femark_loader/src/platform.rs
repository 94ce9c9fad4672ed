//! Host facts and the artifact table.

use std::fmt;

use tracing::debug;

use crate::error::ResolveError;
use crate::libc::{LibcProbe, RuntimeProbe, detect_libc_flavor};

/// Operating system of the host, named the way artifact keys spell it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Os {
    Android,
    Windows,
    MacOs,
    FreeBsd,
    Linux,
    /// Anything else, kept verbatim for error messages.
    Other(String),
}

impl Os {
    /// The OS this process is running on.
    pub fn current() -> Self {
        Self::from_name(std::env::consts::OS)
    }

    /// Parses an OS name. Accepts both Rust (`macos`, `windows`) and
    /// artifact (`darwin`, `win32`) spellings.
    pub fn from_name(name: &str) -> Self {
        match name {
            "android" => Self::Android,
            "windows" | "win32" => Self::Windows,
            "macos" | "darwin" => Self::MacOs,
            "freebsd" => Self::FreeBsd,
            "linux" => Self::Linux,
            other => Self::Other(other.to_string()),
        }
    }

    /// Name used inside artifact keys.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Android => "android",
            Self::Windows => "win32",
            Self::MacOs => "darwin",
            Self::FreeBsd => "freebsd",
            Self::Linux => "linux",
            Self::Other(name) => name,
        }
    }

    /// Human readable name, `None` for unrecognised systems.
    pub fn display_name(&self) -> Option<&'static str> {
        match self {
            Self::Android => Some("Android"),
            Self::Windows => Some("Windows"),
            Self::MacOs => Some("macOS"),
            Self::FreeBsd => Some("FreeBSD"),
            Self::Linux => Some("Linux"),
            Self::Other(_) => None,
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architecture of the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Arch {
    X64,
    Ia32,
    Arm64,
    Arm,
    /// Anything else, kept verbatim for error messages.
    Other(String),
}

impl Arch {
    /// The architecture this process was built for.
    pub fn current() -> Self {
        Self::from_name(std::env::consts::ARCH)
    }

    /// Parses an architecture name in either Rust or artifact spelling.
    pub fn from_name(name: &str) -> Self {
        match name {
            "x86_64" | "x64" => Self::X64,
            "x86" | "ia32" => Self::Ia32,
            "aarch64" | "arm64" => Self::Arm64,
            "arm" => Self::Arm,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::X64 => "x64",
            Self::Ia32 => "ia32",
            Self::Arm64 => "arm64",
            Self::Arm => "arm",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// C library implementation on Linux hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LibcFlavor {
    Gnu,
    Musl,
}

impl fmt::Display for LibcFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gnu => f.write_str("gnu"),
            Self::Musl => f.write_str("musl"),
        }
    }
}

/// Identifier of one precompiled native artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKey {
    AndroidArm64,
    AndroidArmEabi,
    Win32X64Msvc,
    Win32Ia32Msvc,
    Win32Arm64Msvc,
    DarwinX64,
    DarwinArm64,
    FreebsdX64,
    LinuxX64Gnu,
    LinuxX64Musl,
    LinuxArm64Gnu,
    LinuxArm64Musl,
    LinuxArmGnueabihf,
}

impl ArtifactKey {
    /// Every artifact key, in table order.
    pub const ALL: [ArtifactKey; 13] = [
        Self::AndroidArm64,
        Self::AndroidArmEabi,
        Self::Win32X64Msvc,
        Self::Win32Ia32Msvc,
        Self::Win32Arm64Msvc,
        Self::DarwinX64,
        Self::DarwinArm64,
        Self::FreebsdX64,
        Self::LinuxX64Gnu,
        Self::LinuxX64Musl,
        Self::LinuxArm64Gnu,
        Self::LinuxArm64Musl,
        Self::LinuxArmGnueabihf,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AndroidArm64 => "android-arm64",
            Self::AndroidArmEabi => "android-arm-eabi",
            Self::Win32X64Msvc => "win32-x64-msvc",
            Self::Win32Ia32Msvc => "win32-ia32-msvc",
            Self::Win32Arm64Msvc => "win32-arm64-msvc",
            Self::DarwinX64 => "darwin-x64",
            Self::DarwinArm64 => "darwin-arm64",
            Self::FreebsdX64 => "freebsd-x64",
            Self::LinuxX64Gnu => "linux-x64-gnu",
            Self::LinuxX64Musl => "linux-x64-musl",
            Self::LinuxArm64Gnu => "linux-arm64-gnu",
            Self::LinuxArm64Musl => "linux-arm64-musl",
            Self::LinuxArmGnueabihf => "linux-arm-gnueabihf",
        }
    }

    /// Looks up the key for a host. `None` means the host is unsupported.
    pub fn lookup(os: &Os, arch: &Arch, libc: Option<LibcFlavor>) -> Option<Self> {
        ARTIFACT_TABLE
            .iter()
            .find(|(o, a, l, _)| o == os && a == arch && *l == libc)
            .map(|(_, _, _, key)| *key)
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported hosts. A libc flavor is only part of the entry where the
/// artifact depends on it.
static ARTIFACT_TABLE: [(Os, Arch, Option<LibcFlavor>, ArtifactKey); 13] = [
    (Os::Android, Arch::Arm64, None, ArtifactKey::AndroidArm64),
    (Os::Android, Arch::Arm, None, ArtifactKey::AndroidArmEabi),
    (Os::Windows, Arch::X64, None, ArtifactKey::Win32X64Msvc),
    (Os::Windows, Arch::Ia32, None, ArtifactKey::Win32Ia32Msvc),
    (Os::Windows, Arch::Arm64, None, ArtifactKey::Win32Arm64Msvc),
    (Os::MacOs, Arch::X64, None, ArtifactKey::DarwinX64),
    (Os::MacOs, Arch::Arm64, None, ArtifactKey::DarwinArm64),
    (Os::FreeBsd, Arch::X64, None, ArtifactKey::FreebsdX64),
    (Os::Linux, Arch::X64, Some(LibcFlavor::Gnu), ArtifactKey::LinuxX64Gnu),
    (Os::Linux, Arch::X64, Some(LibcFlavor::Musl), ArtifactKey::LinuxX64Musl),
    (Os::Linux, Arch::Arm64, Some(LibcFlavor::Gnu), ArtifactKey::LinuxArm64Gnu),
    (Os::Linux, Arch::Arm64, Some(LibcFlavor::Musl), ArtifactKey::LinuxArm64Musl),
    (Os::Linux, Arch::Arm, None, ArtifactKey::LinuxArmGnueabihf),
];

/// Snapshot of the host, taken once before resolving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostFacts {
    os: Os,
    arch: Arch,
    libc: Option<LibcFlavor>,
}

impl HostFacts {
    pub fn new(os: Os, arch: Arch, libc: Option<LibcFlavor>) -> Self {
        Self { os, arch, libc }
    }

    /// Detects the running host, probing the C library where it matters.
    pub fn detect() -> Self {
        Self::detect_with(Os::current(), Arch::current(), &RuntimeProbe::default())
    }

    /// Builds host facts for `os`/`arch`, asking `probe` for the libc flavor
    /// only on Linux x64 and arm64.
    pub fn detect_with(os: Os, arch: Arch, probe: &impl LibcProbe) -> Self {
        let libc = if needs_libc_flavor(&os, &arch) {
            Some(detect_libc_flavor(probe))
        } else {
            None
        };

        let facts = Self { os, arch, libc };
        debug!("Detected host: {}", facts);
        facts
    }

    pub fn os(&self) -> &Os {
        &self.os
    }

    pub fn arch(&self) -> &Arch {
        &self.arch
    }

    pub fn libc(&self) -> Option<LibcFlavor> {
        self.libc
    }

    /// Maps the host to its artifact key.
    pub fn artifact_key(&self) -> Result<ArtifactKey, ResolveError> {
        ArtifactKey::lookup(&self.os, &self.arch, self.libc)
            .ok_or_else(|| ResolveError::unsupported(self.os.clone(), self.arch.clone()))
    }
}

impl fmt::Display for HostFacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)?;
        if let Some(libc) = self.libc {
            write!(f, " ({})", libc)?;
        }
        Ok(())
    }
}

fn needs_libc_flavor(os: &Os, arch: &Arch) -> bool {
    *os == Os::Linux && matches!(arch, Arch::X64 | Arch::Arm64)
}

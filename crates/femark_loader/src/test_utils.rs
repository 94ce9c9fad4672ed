//! Test doubles for femark_loader.

use std::cell::{Cell, RefCell};
use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Once;

use crate::error::{CallError, LoadError};
use crate::libc::{GlibcReport, LibcProbe};
use crate::loader::{ModuleIdentifier, NativeLoader};
use crate::module::{MarkdownModule, ModuleHandle};

/// Scripted [`LibcProbe`].
pub struct FakeProbe {
    report: GlibcReport,
    ldd: Option<Vec<u8>>,
    calls: Cell<usize>,
    ldd_reads: Cell<usize>,
}

impl FakeProbe {
    fn with_report(report: GlibcReport) -> Self {
        Self {
            report,
            ldd: None,
            calls: Cell::new(0),
            ldd_reads: Cell::new(0),
        }
    }

    pub fn glibc(version: &str) -> Self {
        Self::with_report(GlibcReport::Version(version.to_string()))
    }

    pub fn absent() -> Self {
        Self::with_report(GlibcReport::Absent)
    }

    /// No runtime report; reading ldd fails unless [`Self::with_ldd`] is used.
    pub fn unavailable() -> Self {
        Self::with_report(GlibcReport::Unavailable)
    }

    pub fn with_ldd(mut self, contents: &str) -> Self {
        self.ldd = Some(contents.as_bytes().to_vec());
        self
    }

    /// Number of times the runtime report was requested.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn ldd_reads(&self) -> usize {
        self.ldd_reads.get()
    }
}

impl LibcProbe for FakeProbe {
    fn glibc_report(&self) -> GlibcReport {
        self.calls.set(self.calls.get() + 1);
        self.report.clone()
    }

    fn read_ldd(&self) -> io::Result<Vec<u8>> {
        self.ldd_reads.set(self.ldd_reads.get() + 1);
        self.ldd
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "ldd not found"))
    }
}

/// Wraps the input in a fixed prefix and suffix.
pub struct EchoModule {
    prefix: String,
    suffix: String,
}

impl EchoModule {
    pub fn new(prefix: &str, suffix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        }
    }
}

impl MarkdownModule for EchoModule {
    fn process_markdown_to_html(&self, markdown: &str) -> Result<String, CallError> {
        Ok(format!("{}{}{}", self.prefix, markdown, self.suffix))
    }
}

/// Returns the same output for every input.
pub struct StaticModule(String);

impl StaticModule {
    pub fn new(output: &str) -> Self {
        Self(output.to_string())
    }
}

impl MarkdownModule for StaticModule {
    fn process_markdown_to_html(&self, _markdown: &str) -> Result<String, CallError> {
        Ok(self.0.clone())
    }
}

/// Fails every call the way a native module returning NULL would.
pub struct FailingModule;

impl MarkdownModule for FailingModule {
    fn process_markdown_to_html(&self, _markdown: &str) -> Result<String, CallError> {
        Err(CallError::NullOutput)
    }
}

/// Scripted [`NativeLoader`] recording every attempt.
///
/// By default every load fails: files with an I/O error, packages with
/// [`LoadError::PackageNotFound`].
pub struct FakeLoader {
    files_succeed: bool,
    packages_succeed: bool,
    attempts: RefCell<Vec<ModuleIdentifier>>,
}

impl FakeLoader {
    pub fn new() -> Self {
        Self {
            files_succeed: false,
            packages_succeed: false,
            attempts: RefCell::new(Vec::new()),
        }
    }

    pub fn succeed_all(mut self) -> Self {
        self.files_succeed = true;
        self.packages_succeed = true;
        self
    }

    pub fn succeed_packages(mut self) -> Self {
        self.packages_succeed = true;
        self
    }

    pub fn attempts(&self) -> Vec<ModuleIdentifier> {
        self.attempts.borrow().clone()
    }
}

impl NativeLoader for FakeLoader {
    fn load(&self, identifier: &ModuleIdentifier) -> Result<ModuleHandle, LoadError> {
        self.attempts.borrow_mut().push(identifier.clone());

        match identifier {
            ModuleIdentifier::File(_) if self.files_succeed => {
                Ok(ModuleHandle::new(EchoModule::new("<file>", "</file>")))
            }
            ModuleIdentifier::Package { .. } if self.packages_succeed => {
                Ok(ModuleHandle::new(EchoModule::new("<package>", "</package>")))
            }
            ModuleIdentifier::File(path) => Err(LoadError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{} is not a shared library", path.display()),
            ))),
            ModuleIdentifier::Package { name, .. } => Err(LoadError::PackageNotFound {
                name: name.clone(),
                searched: Vec::new(),
            }),
        }
    }
}

static BUILD_RENDERER: Once = Once::new();

/// Builds the test_renderer fixture and returns the path to its shared
/// library.
pub fn build_test_renderer() -> PathBuf {
    let fixture_dir =
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/test_renderer");
    let library = fixture_dir
        .join("target/debug")
        .join(format!("{}test_renderer{}", DLL_PREFIX, DLL_SUFFIX));

    BUILD_RENDERER.call_once(|| {
        let status = Command::new(env!("CARGO"))
            .arg("build")
            .current_dir(&fixture_dir)
            .status()
            .expect("Failed to execute cargo build for test_renderer fixture");

        if !status.success() {
            panic!("Failed to build test_renderer fixture");
        }
    });

    if !library.exists() {
        panic!("test_renderer not found at expected path: {}", library.display());
    }

    library
}

/// Copies the test renderer into `dir` as `file_name`.
///
/// Every copy is loaded as its own library instance, so buffer counts are
/// not shared between tests.
pub fn install_test_renderer(dir: &Path, file_name: &str) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::copy(build_test_renderer(), &path).unwrap();
    path
}

/// Number of buffers the test renderer at `path` has released.
///
/// Opening the same file again reaches the instance already loaded.
pub fn freed_buffers(path: &Path) -> usize {
    type CountFn = unsafe extern "C" fn() -> usize;

    let library = unsafe { libloading::Library::new(path) }.unwrap();
    let count = unsafe { library.get::<CountFn>(b"test_renderer_freed_buffers\0") }.unwrap();
    unsafe { count() }
}

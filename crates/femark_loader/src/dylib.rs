//! Shared library backend.
//!
//! # Native ABI
//!
//! A femark artifact is a shared library exporting two C functions:
//!
//! ```c
//! typedef struct { uint8_t *ptr; size_t len; } FemarkBuffer;
//!
//! FemarkBuffer process_markdown_to_html(const uint8_t *input, size_t input_len);
//! void free_html_buffer(FemarkBuffer buffer);
//! ```
//!
//! Strings cross the boundary as UTF-8 bytes plus an explicit length and are
//! never NUL-terminated. A buffer with a NULL `ptr` signals failure. Every
//! non-NULL buffer is handed back to `free_html_buffer` exactly once, so the
//! library that allocated it also releases it.

use std::path::{Path, PathBuf};
use std::slice;

use libloading::Library;
use tracing::debug;

use crate::error::{CallError, LoadError};
use crate::loader::{ModuleIdentifier, NativeLoader};
use crate::module::{MarkdownModule, ModuleHandle};
use crate::package::PackageLocator;

/// Exported conversion function.
pub const PROCESS_SYMBOL: &str = "process_markdown_to_html";
/// Exported function releasing a returned buffer.
pub const FREE_SYMBOL: &str = "free_html_buffer";

/// Output buffer owned by the native library.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct FemarkBuffer {
    pub ptr: *mut u8,
    pub len: usize,
}

type ProcessFn = unsafe extern "C" fn(*const u8, usize) -> FemarkBuffer;
type FreeFn = unsafe extern "C" fn(FemarkBuffer);

/// A femark artifact opened as a shared library.
pub struct DylibModule {
    process: ProcessFn,
    free: FreeFn,
    path: PathBuf,
    // Keeps the code behind the function pointers mapped.
    _library: Library,
}

impl DylibModule {
    /// Opens the library at `path` and resolves its exports.
    pub fn open(path: &Path) -> Result<Self, LoadError> {
        // SAFETY: opening runs the library's initialisers. Artifacts are
        // build outputs of this project, selected for this exact platform.
        let library = unsafe { Library::new(path) }.map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let process = lookup::<ProcessFn>(&library, PROCESS_SYMBOL, path)?;
        let free = lookup::<FreeFn>(&library, FREE_SYMBOL, path)?;

        Ok(Self {
            process,
            free,
            path: path.to_path_buf(),
            _library: library,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn lookup<T: Copy>(library: &Library, symbol: &'static str, path: &Path) -> Result<T, LoadError> {
    let name = format!("{}\0", symbol);
    // SAFETY: `T` is one of the function pointer types of the documented ABI.
    unsafe { library.get::<T>(name.as_bytes()) }
        .map(|s| *s)
        .map_err(|source| LoadError::MissingSymbol {
            symbol,
            path: path.to_path_buf(),
            source,
        })
}

impl MarkdownModule for DylibModule {
    fn process_markdown_to_html(&self, markdown: &str) -> Result<String, CallError> {
        // SAFETY: the input pointer and length describe a live UTF-8 slice.
        let buffer = unsafe { (self.process)(markdown.as_ptr(), markdown.len()) };
        if buffer.ptr.is_null() {
            return Err(CallError::NullOutput);
        }

        // SAFETY: a non-NULL buffer points to `len` initialised bytes that
        // stay valid until passed to the free function.
        let bytes = unsafe { slice::from_raw_parts(buffer.ptr, buffer.len) }.to_vec();
        // SAFETY: the buffer came from this library and is released once.
        unsafe { (self.free)(buffer) };

        Ok(String::from_utf8(bytes)?)
    }
}

/// [`NativeLoader`] that opens shared libraries from disk.
pub struct DylibLoader {
    locator: PackageLocator,
}

impl DylibLoader {
    pub fn new(locator: PackageLocator) -> Self {
        Self { locator }
    }

    pub fn locator(&self) -> &PackageLocator {
        &self.locator
    }
}

impl NativeLoader for DylibLoader {
    fn load(&self, identifier: &ModuleIdentifier) -> Result<ModuleHandle, LoadError> {
        let path = match identifier {
            ModuleIdentifier::File(path) => path.clone(),
            ModuleIdentifier::Package { name, entry } => self.locator.locate(name, entry)?,
        };

        debug!("Opening native library {}", path.display());
        Ok(ModuleHandle::new(DylibModule::open(&path)?))
    }
}

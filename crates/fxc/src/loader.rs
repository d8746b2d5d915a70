//! Lazy, memoized resolution of the native compiler entry point.
//!
//! The library is not touched until the first compile call. The first use
//! resolves `D3DCompile` exactly once and caches the outcome, success or
//! failure, for the rest of the process. There is no teardown; the OS
//! reclaims the mapping at process exit.

use std::ffi::{c_char, c_void};
use std::sync::OnceLock;

use libloading::{Library, Symbol};

use crate::blob::Blob;
use crate::error::{Error, Result};

/// Dynamic library holding the legacy HLSL compiler.
pub(crate) const LIBRARY_NAME: &str = "d3dcompiler_47.dll";

/// Exported symbol name, NUL-terminated for lookup.
const ENTRY_SYMBOL: &[u8] = b"D3DCompile\0";

/// `D3DCompile` in its exact parameter order and calling convention.
///
/// The source-name, macro-definition, and include-handler parameters are
/// always passed null by this crate.
pub(crate) type CompileFn = unsafe extern "system" fn(
    src_data: *const c_void,
    src_data_size: usize,
    source_name: *const c_char,
    defines: *const c_void,
    include: *const c_void,
    entry_point: *const c_char,
    target: *const c_char,
    flags1: u32,
    flags2: u32,
    code: *mut *mut Blob,
    error_msgs: *mut *mut Blob,
) -> i32;

type Resolver = Box<dyn Fn() -> std::result::Result<CompileFn, String> + Send + Sync>;

/// Resolve-once holder for the native entry point.
///
/// Concurrent first uses converge on a single resolver run; later calls
/// return the cached function pointer, or the cached failure as
/// `LibraryUnavailable`.
pub(crate) struct CompilerLoader {
    resolver: Resolver,
    cache: OnceLock<std::result::Result<CompileFn, String>>,
}

impl CompilerLoader {
    /// Loader backed by the system compiler library.
    pub fn system() -> Self {
        Self::with_resolver(Box::new(resolve_system))
    }

    /// Loader backed by an arbitrary resolver. Used by tests to count
    /// resolutions and substitute fake entry points.
    pub fn with_resolver(resolver: Resolver) -> Self {
        Self {
            resolver,
            cache: OnceLock::new(),
        }
    }

    /// The resolved entry point, running the resolver on first use only.
    pub fn get(&self) -> Result<CompileFn> {
        self.cache
            .get_or_init(|| (self.resolver)())
            .clone()
            .map_err(Error::LibraryUnavailable)
    }
}

/// The process-wide loader. This cached resolution is the crate's only
/// global mutable state.
pub(crate) fn process_loader() -> &'static CompilerLoader {
    static LOADER: OnceLock<CompilerLoader> = OnceLock::new();
    LOADER.get_or_init(CompilerLoader::system)
}

fn resolve_system() -> std::result::Result<CompileFn, String> {
    let library = unsafe { Library::new(LIBRARY_NAME) }.map_err(|e| e.to_string())?;
    let entry = {
        let symbol: Symbol<CompileFn> =
            unsafe { library.get(ENTRY_SYMBOL) }.map_err(|e| e.to_string())?;
        *symbol
    };
    // The cached raw pointer must stay valid for the process lifetime, so
    // the library handle is never dropped.
    std::mem::forget(library);
    tracing::debug!("resolved D3DCompile from {LIBRARY_NAME}");
    Ok(entry)
}

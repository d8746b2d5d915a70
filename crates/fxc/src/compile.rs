//! Compile invocation against the native entry point.

use std::ffi::{c_char, c_void};
use std::ptr;

use crate::blob::{Blob, OwnedBlob};
use crate::error::{Error, Result};
use crate::flags::{CompileOptions, EffectOptions};
use crate::loader::{CompilerLoader, process_loader};

/// One compilation request: source bytes plus everything the native call
/// needs to interpret them. Built per invocation, never reused.
#[derive(Debug, Clone)]
pub struct CompileRequest {
    /// HLSL source text as raw bytes. Must be non-empty.
    pub source: Vec<u8>,
    /// Name of the shader's entry function, e.g. `main`.
    pub entry_point: String,
    /// Target profile, e.g. `vs_2_0`, `ps_4_0`, `fx_5_0`.
    pub target: String,
    /// General compile options.
    pub options: CompileOptions,
    /// Effect-file options.
    pub effect_options: EffectOptions,
}

impl CompileRequest {
    /// Request with default options.
    pub fn new(
        source: impl Into<Vec<u8>>,
        entry_point: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            entry_point: entry_point.into(),
            target: target.into(),
            options: CompileOptions::default(),
            effect_options: EffectOptions::default(),
        }
    }
}

/// Compile `request` with the process-wide compiler.
///
/// Returns the compiled bytecode, or `CompileFailed` carrying the
/// compiler's diagnostic text. `LibraryUnavailable` means the compiler
/// library or its entry point could not be resolved; `EmptyInput` means
/// the source buffer was empty and the native call was never made.
pub fn compile(request: &CompileRequest) -> Result<Vec<u8>> {
    compile_with(process_loader(), request)
}

pub(crate) fn compile_with(loader: &CompilerLoader, request: &CompileRequest) -> Result<Vec<u8>> {
    // The native contract takes the address of the first source byte, so
    // an empty buffer must never reach it. Checked before the loader so a
    // caller error does not trigger library resolution.
    if request.source.is_empty() {
        return Err(Error::EmptyInput);
    }

    let entry = loader.get()?;
    let flags1 = request.options.bits();
    let flags2 = request.effect_options.bits();

    // The native side expects C strings; Rust strings carry no terminator.
    let mut entry_point = request.entry_point.clone().into_bytes();
    entry_point.push(0);
    let mut target = request.target.clone().into_bytes();
    target.push(0);

    let mut code: *mut Blob = ptr::null_mut();
    let mut errors: *mut Blob = ptr::null_mut();

    tracing::debug!(
        entry_point = %request.entry_point,
        target = %request.target,
        flags1,
        flags2,
        source_len = request.source.len(),
        "invoking native compiler"
    );

    let hresult = unsafe {
        entry(
            request.source.as_ptr() as *const c_void,
            request.source.len(),
            ptr::null(), // source name
            ptr::null(), // macro definitions
            ptr::null(), // include handler
            entry_point.as_ptr() as *const c_char,
            target.as_ptr() as *const c_char,
            flags1,
            flags2,
            &mut code,
            &mut errors,
        )
    };

    // Take ownership of both slots immediately, whichever are populated;
    // dropping the wrappers releases each blob exactly once on every path
    // below.
    let code = unsafe { OwnedBlob::from_raw(code) };
    let errors = unsafe { OwnedBlob::from_raw(errors) };

    if hresult == 0 {
        match code {
            Some(blob) => Ok(blob.to_bytes()),
            None => Err(Error::CompileFailed(
                "compiler reported success but returned no code".to_string(),
            )),
        }
    } else {
        let diagnostic = match errors {
            Some(blob) => String::from_utf8_lossy(&blob.to_bytes()).into_owned(),
            None => format!("HRESULT {:#010x}", hresult as u32),
        };
        tracing::debug!(hresult, "native compiler reported failure");
        Err(Error::CompileFailed(diagnostic))
    }
}

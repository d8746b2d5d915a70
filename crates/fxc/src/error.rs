//! Error types for fxc.

use thiserror::Error;

/// Result type for fxc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when invoking the native compiler.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The compiler library or its entry point could not be resolved.
    /// Raised at first use, never at load time, and never retried.
    #[error("compiler library unavailable: {0}")]
    LibraryUnavailable(String),

    /// The source buffer is empty. The native call requires the address of
    /// the first source byte, so an empty buffer is rejected up front.
    #[error("source code is empty")]
    EmptyInput,

    /// The native compiler rejected the input; the payload is the
    /// diagnostic text it produced, verbatim.
    #[error("compilation failed: {0}")]
    CompileFailed(String),
}

//! Safe bridge to the legacy HLSL compiler (`D3DCompile`).
//!
//! This crate provides:
//! - Lazy, resolve-once loading of `d3dcompiler_47.dll`
//! - Typed assembly of the two `D3DCompile` flag words
//! - Owned extraction of the compiler's reference-counted output blobs
//! - A single `compile` call turning source bytes into bytecode or a
//!   diagnostic
//!
//! The compiler itself is an opaque black box reached only through its
//! exported entry point; nothing here emulates its semantics.

pub mod error;
pub mod flags;

mod blob;
mod compile;
mod loader;

pub use compile::{CompileRequest, compile};
pub use error::{Error, Result};
pub use flags::{CompileOptions, EffectOptions, FlowControl, MatrixPacking, OptimizationLevel};

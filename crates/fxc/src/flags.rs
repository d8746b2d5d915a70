//! Compile and effect flag assembly.
//!
//! `D3DCompile` takes two independent `u32` bit-fields: one for general
//! compile behavior, one for effect-file behavior. The raw bit values here
//! are part of the d3dcompiler ABI and must match it exactly.
//!
//! Options that the native ABI encodes as multiple mutually exclusive bit
//! patterns (optimization level, matrix packing, flow control) are modeled
//! as enums, so a conflicting combination cannot be constructed in the
//! first place.

/// Insert debug file/line/type/symbol information into the output code.
pub const DEBUG: u32 = 1 << 0;

/// Skip validation of the generated code against known capabilities and
/// constraints. Only safe for shaders that have compiled successfully
/// before.
pub const SKIP_VALIDATION: u32 = 1 << 1;

/// Skip optimization steps during code generation. Intended for debug
/// builds only.
pub const SKIP_OPTIMIZATION: u32 = 1 << 2;

/// Pack matrices in row-major order on shader input and output.
pub const PACK_MATRIX_ROW_MAJOR: u32 = 1 << 3;

/// Pack matrices in column-major order on shader input and output.
/// Generally more efficient, since vector-matrix multiplication becomes a
/// series of dot products.
pub const PACK_MATRIX_COLUMN_MAJOR: u32 = 1 << 4;

/// Perform all computations with partial precision; may run faster on some
/// hardware.
pub const PARTIAL_PRECISION: u32 = 1 << 5;

/// Compile a vertex shader for the next highest shader profile with
/// debugging on and optimizations off.
pub const FORCE_VS_SOFTWARE_NO_OPT: u32 = 1 << 6;

/// Compile a pixel shader for the next highest shader profile with
/// debugging on and optimizations off.
pub const FORCE_PS_SOFTWARE_NO_OPT: u32 = 1 << 7;

/// Disable preshaders: the compiler will not pull out static expressions
/// for separate evaluation.
pub const NO_PRESHADER: u32 = 1 << 8;

/// Avoid flow-control constructs where possible.
pub const AVOID_FLOW_CONTROL: u32 = 1 << 9;

/// Prefer flow-control constructs where possible.
pub const PREFER_FLOW_CONTROL: u32 = 1 << 10;

/// Force strict compilation, which may reject legacy syntax.
pub const ENABLE_STRICTNESS: u32 = 1 << 11;

/// Allow older shaders to compile to 5_0 targets.
pub const ENABLE_BACKWARDS_COMPATIBILITY: u32 = 1 << 12;

/// Force IEEE strict compilation.
pub const IEEE_STRICTNESS: u32 = 1 << 13;

/// Lowest optimization level: slower code, produced more quickly.
pub const OPTIMIZATION_LEVEL0: u32 = 1 << 14;

/// Second lowest optimization level. This is the compiler default and is
/// numerically zero.
pub const OPTIMIZATION_LEVEL1: u32 = 0;

/// Second highest optimization level.
pub const OPTIMIZATION_LEVEL2: u32 = (1 << 14) | (1 << 15);

/// Highest optimization level: best code, longest compile time.
pub const OPTIMIZATION_LEVEL3: u32 = 1 << 15;

/// Treat all warnings as errors.
pub const WARNINGS_ARE_ERRORS: u32 = 1 << 18;

/// Assume that UAVs and SRVs may alias for cs_5_0.
pub const RESOURCES_MAY_ALIAS: u32 = 1 << 19;

/// Enable unbounded descriptor tables.
pub const ENABLE_UNBOUNDED_DESCRIPTOR_TABLES: u32 = 1 << 20;

/// Ensure all resources are bound.
pub const ALL_RESOURCES_BOUND: u32 = 1 << 21;

/// Compile an effect (.fx) file to a child effect, without initializers
/// for shared values.
pub const EFFECT_CHILD_EFFECT: u32 = 1 << 0;

/// Disable effect performance mode, allowing mutable state objects.
pub const EFFECT_ALLOW_SLOW_OPS: u32 = 1 << 1;

/// Optimization level selector.
///
/// The native ABI encodes the level in two bits at positions 14-15, with
/// level 1 (the default) encoded as all-zero. Exactly one pattern is ever
/// emitted per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptimizationLevel {
    /// Level 0: fastest compilation, least optimized output.
    O0,
    /// Level 1: the compiler default.
    #[default]
    O1,
    /// Level 2.
    O2,
    /// Level 3: most optimized output, longest compilation.
    O3,
}

impl OptimizationLevel {
    /// Bit pattern for this level.
    pub fn bits(self) -> u32 {
        match self {
            Self::O0 => OPTIMIZATION_LEVEL0,
            Self::O1 => OPTIMIZATION_LEVEL1,
            Self::O2 => OPTIMIZATION_LEVEL2,
            Self::O3 => OPTIMIZATION_LEVEL3,
        }
    }

    /// Map a numeric level in `0..=3` to the selector.
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(Self::O0),
            1 => Some(Self::O1),
            2 => Some(Self::O2),
            3 => Some(Self::O3),
            _ => None,
        }
    }
}

/// Matrix packing order for shader input and output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatrixPacking {
    /// Leave the choice to the compiler.
    #[default]
    Default,
    /// Row-major packing.
    RowMajor,
    /// Column-major packing.
    ColumnMajor,
}

impl MatrixPacking {
    fn bits(self) -> u32 {
        match self {
            Self::Default => 0,
            Self::RowMajor => PACK_MATRIX_ROW_MAJOR,
            Self::ColumnMajor => PACK_MATRIX_COLUMN_MAJOR,
        }
    }
}

/// Flow-control preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowControl {
    /// Leave the choice to the compiler.
    #[default]
    Default,
    /// Avoid flow-control constructs where possible.
    Avoid,
    /// Prefer flow-control constructs where possible.
    Prefer,
}

impl FlowControl {
    fn bits(self) -> u32 {
        match self {
            Self::Default => 0,
            Self::Avoid => AVOID_FLOW_CONTROL,
            Self::Prefer => PREFER_FLOW_CONTROL,
        }
    }
}

/// General compile options, assembled into the first flag word.
///
/// Each boolean maps to exactly one bit; the enum fields map to exactly one
/// of their fixed patterns. Assembly is a pure OR, so it is total,
/// commutative, and monotone.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOptions {
    /// Emit debug information into the output code.
    pub debug: bool,
    /// Skip validation of the generated code.
    pub skip_validation: bool,
    /// Skip optimization during code generation.
    pub skip_optimization: bool,
    /// Matrix packing order.
    pub matrix_packing: MatrixPacking,
    /// Compute with partial precision.
    pub partial_precision: bool,
    /// Disable preshaders.
    pub no_preshader: bool,
    /// Flow-control preference.
    pub flow_control: FlowControl,
    /// Force strict compilation.
    pub strictness: bool,
    /// Enable backwards compatibility with older shaders.
    pub backwards_compatibility: bool,
    /// Force IEEE strictness.
    pub ieee_strictness: bool,
    /// Optimization level.
    pub optimization_level: OptimizationLevel,
    /// Treat warnings as errors.
    pub warnings_are_errors: bool,
    /// Assume UAVs/SRVs may alias.
    pub resources_may_alias: bool,
}

impl CompileOptions {
    /// Assemble the first `D3DCompile` flag word.
    pub fn bits(&self) -> u32 {
        let mut flags = 0;
        let mut set = |on: bool, bit: u32| {
            if on {
                flags |= bit;
            }
        };
        set(self.debug, DEBUG);
        set(self.skip_validation, SKIP_VALIDATION);
        set(self.skip_optimization, SKIP_OPTIMIZATION);
        set(self.partial_precision, PARTIAL_PRECISION);
        set(self.no_preshader, NO_PRESHADER);
        set(self.strictness, ENABLE_STRICTNESS);
        set(self.backwards_compatibility, ENABLE_BACKWARDS_COMPATIBILITY);
        set(self.ieee_strictness, IEEE_STRICTNESS);
        set(self.warnings_are_errors, WARNINGS_ARE_ERRORS);
        set(self.resources_may_alias, RESOURCES_MAY_ALIAS);
        flags | self.matrix_packing.bits() | self.flow_control.bits() | self.optimization_level.bits()
    }
}

/// Effect-file options, assembled into the second flag word.
#[derive(Debug, Clone, Copy, Default)]
pub struct EffectOptions {
    /// Compile as a child effect for FX 4.x targets.
    pub child_effect: bool,
    /// Disable performance mode, allowing mutable state objects.
    pub allow_slow_ops: bool,
}

impl EffectOptions {
    /// Assemble the second `D3DCompile` flag word.
    pub fn bits(&self) -> u32 {
        let mut flags = 0;
        if self.child_effect {
            flags |= EFFECT_CHILD_EFFECT;
        }
        if self.allow_slow_ops {
            flags |= EFFECT_ALLOW_SLOW_OPS;
        }
        flags
    }
}

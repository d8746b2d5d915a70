//! fxc CLI - compile HLSL read from stdin with the system compiler.
//!
//! The compiled bytecode goes to stdout; diagnostics go to stderr with a
//! nonzero exit status.

use std::io::{Read, Write};

use anyhow::Context;
use clap::Parser;
use fxc::{CompileRequest, FlowControl, MatrixPacking, OptimizationLevel};

#[derive(Parser)]
#[command(name = "fxc")]
#[command(about = "Compile HLSL from stdin using the system D3DCompile")]
#[command(version)]
struct Cli {
    /// Target profile, e.g. vs_2_0, ps_4_1, fx_5_0
    #[arg(short = 'T', long)]
    target: String,

    /// Entry point name
    #[arg(short = 'E', long, default_value = "main")]
    entry: String,

    /// Optimization level 0..3
    #[arg(short = 'O', long, default_value_t = 1,
          value_parser = clap::value_parser!(u8).range(0..=3))]
    opt_level: u8,

    /// Enable debug information in the output
    #[arg(long)]
    debug: bool,

    /// Disable validation of the generated code
    #[arg(long)]
    skip_validation: bool,

    /// Disable optimizations; only use this for debug builds
    #[arg(long)]
    skip_optimization: bool,

    /// Pack matrices in row-major order
    #[arg(long, conflicts_with = "column_major")]
    row_major: bool,

    /// Pack matrices in column-major order
    #[arg(long)]
    column_major: bool,

    /// Force partial precision
    #[arg(long)]
    partial_precision: bool,

    /// Disable preshaders
    #[arg(long)]
    no_preshader: bool,

    /// Avoid flow-control constructs
    #[arg(long, conflicts_with = "prefer_flow_control")]
    avoid_flow_control: bool,

    /// Prefer flow-control constructs
    #[arg(long)]
    prefer_flow_control: bool,

    /// Enable strict mode
    #[arg(long)]
    strict: bool,

    /// Enable backwards compatibility mode
    #[arg(long)]
    backwards_compat: bool,

    /// Force IEEE strictness
    #[arg(long)]
    ieee_strict: bool,

    /// Treat warnings as errors
    #[arg(long)]
    warnings_as_errors: bool,

    /// Assume that UAVs/SRVs may alias for cs_5_0+
    #[arg(long)]
    res_may_alias: bool,

    /// Compile as a child effect for FX 4.x targets
    #[arg(long)]
    child_effect: bool,

    /// Disable effect performance mode
    #[arg(long)]
    allow_slow_ops: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_request(self, source: Vec<u8>) -> CompileRequest {
        let mut request = CompileRequest::new(source, self.entry, self.target);

        let options = &mut request.options;
        options.debug = self.debug;
        options.skip_validation = self.skip_validation;
        options.skip_optimization = self.skip_optimization;
        options.matrix_packing = if self.row_major {
            MatrixPacking::RowMajor
        } else if self.column_major {
            MatrixPacking::ColumnMajor
        } else {
            MatrixPacking::Default
        };
        options.partial_precision = self.partial_precision;
        options.no_preshader = self.no_preshader;
        options.flow_control = if self.avoid_flow_control {
            FlowControl::Avoid
        } else if self.prefer_flow_control {
            FlowControl::Prefer
        } else {
            FlowControl::Default
        };
        options.strictness = self.strict;
        options.backwards_compatibility = self.backwards_compat;
        options.ieee_strictness = self.ieee_strict;
        // The parser bounds the level to 0..=3.
        options.optimization_level =
            OptimizationLevel::from_level(self.opt_level).unwrap_or_default();
        options.warnings_are_errors = self.warnings_as_errors;
        options.resources_may_alias = self.res_may_alias;

        request.effect_options.child_effect = self.child_effect;
        request.effect_options.allow_slow_ops = self.allow_slow_ops;

        request
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut source = Vec::new();
    std::io::stdin()
        .read_to_end(&mut source)
        .context("reading shader source from stdin")?;

    let request = cli.into_request(source);
    let bytecode = fxc::compile(&request)?;

    std::io::stdout()
        .write_all(&bytecode)
        .context("writing bytecode to stdout")?;

    Ok(())
}

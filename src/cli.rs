// stepper - Command-line arguments
// Copyright (c) 2025 Tom Waddington. MIT licensed.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use stepper_core::StepOptions;
use stepper_runtime::RuntimeOptions;

/// Step into function and macro calls by inlining one evaluation step.
#[derive(Debug, Parser)]
#[command(name = "stepper", version)]
pub struct Cli {
    /// Source files to load before stepping, in order
    pub files: Vec<PathBuf>,

    /// Step into FORM and print the rewritten expression; starts a REPL
    /// when omitted
    #[arg(short = 'e', long = "expr", value_name = "FORM")]
    pub expr: Option<String>,

    /// Rewrite to apply to FORM
    #[arg(long, value_enum, default_value_t = Mode::StepIn)]
    pub mode: Mode,

    /// Also evaluate the rewritten expression and print its value
    #[arg(long)]
    pub eval: bool,

    /// Never evaluate a callee that cannot be found statically
    #[arg(long)]
    pub no_speculative_eval: bool,

    /// Reject `#=` read-time evaluation in loaded and stepped source
    #[arg(long)]
    pub no_read_eval: bool,

    /// Keep `x x` bindings in the output
    #[arg(long)]
    pub keep_self_bindings: bool,

    /// Log filter, e.g. `debug` or `stepper::resolve=trace` (overrides STEPPER_LOG)
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Bind the arguments and summarise the bindings as a map
    StepIn,
    /// Bind the arguments and inline the callee's body
    Flatten,
}

impl Cli {
    /// Stepping options from the environment, overridden by flags.
    pub fn step_options(&self) -> StepOptions {
        let mut options = StepOptions::from_env();
        if self.no_speculative_eval {
            options = options.with_speculative_eval(false);
        }
        if self.keep_self_bindings {
            options = options.with_elide_self_bindings(false);
        }
        options
    }

    /// Runtime options from the environment, overridden by flags.
    pub fn runtime_options(&self) -> RuntimeOptions {
        let options = RuntimeOptions::from_env();
        if self.no_read_eval {
            options.with_read_eval(false)
        } else {
            options
        }
    }
}

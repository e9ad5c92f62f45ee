// stepper-runtime - Runtime options
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Options for the reference runtime.

use std::env;

use stepper_core::config::parse_flag;

/// Environment variable controlling `#=` read-time evaluation.
pub const ENV_READ_EVAL: &str = "STEPPER_READ_EVAL";
/// Environment variable overriding the maximum evaluation depth.
pub const ENV_MAX_EVAL_DEPTH: &str = "STEPPER_MAX_EVAL_DEPTH";

pub const DEFAULT_MAX_EVAL_DEPTH: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeOptions {
    /// Accept `#=form` when reading source
    pub read_eval: bool,
    /// Maximum nesting of `eval` before failing with a stack overflow error
    pub max_eval_depth: usize,
}

impl RuntimeOptions {
    pub const DEFAULT: Self = Self {
        read_eval: true,
        max_eval_depth: DEFAULT_MAX_EVAL_DEPTH,
    };

    #[must_use]
    pub fn with_read_eval(self, enabled: bool) -> Self {
        Self {
            read_eval: enabled,
            ..self
        }
    }

    #[must_use]
    pub fn with_max_eval_depth(self, depth: usize) -> Self {
        Self {
            max_eval_depth: depth,
            ..self
        }
    }

    /// Defaults overridden by `STEPPER_READ_EVAL` and `STEPPER_MAX_EVAL_DEPTH`.
    /// Unparseable values are ignored.
    #[must_use]
    pub fn from_env() -> Self {
        let read_eval = env::var(ENV_READ_EVAL).ok();
        let depth = env::var(ENV_MAX_EVAL_DEPTH).ok();
        apply_env_overrides(Self::DEFAULT, read_eval.as_deref(), depth.as_deref())
    }
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn apply_env_overrides(
    mut options: RuntimeOptions,
    read_eval: Option<&str>,
    depth: Option<&str>,
) -> RuntimeOptions {
    if let Some(enabled) = read_eval.and_then(parse_flag) {
        options.read_eval = enabled;
    }
    if let Some(depth) = depth.and_then(|d| d.trim().parse::<usize>().ok()) {
        options.max_eval_depth = depth;
    }
    options
}

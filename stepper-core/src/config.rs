// stepper-core - Stepping options
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Options controlling resolution and binding output.

use std::env;

/// Environment variable enabling speculative evaluation of unresolved callees.
pub const ENV_SPECULATIVE_EVAL: &str = "STEPPER_SPECULATIVE_EVAL";
/// Environment variable controlling self-binding elision.
pub const ENV_ELIDE_SELF_BINDINGS: &str = "STEPPER_ELIDE_SELF_BINDINGS";

/// Options for a [`Flattener`](crate::Flattener).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOptions {
    /// When static lookup fails, evaluate the symbol and report its printed
    /// value as a literal variable.
    pub speculative_eval: bool,
    /// Omit bindings of the form `x x`, where a parameter is bound to the
    /// identically named symbol from the calling scope.
    pub elide_self_bindings: bool,
}

impl StepOptions {
    pub const DEFAULT: Self = Self {
        speculative_eval: true,
        elide_self_bindings: true,
    };

    #[must_use]
    pub fn with_speculative_eval(self, enabled: bool) -> Self {
        Self {
            speculative_eval: enabled,
            ..self
        }
    }

    #[must_use]
    pub fn with_elide_self_bindings(self, enabled: bool) -> Self {
        Self {
            elide_self_bindings: enabled,
            ..self
        }
    }

    /// Defaults overridden by `STEPPER_SPECULATIVE_EVAL` and
    /// `STEPPER_ELIDE_SELF_BINDINGS`.
    #[must_use]
    pub fn from_env() -> Self {
        let speculative = env::var(ENV_SPECULATIVE_EVAL).ok();
        let elide = env::var(ENV_ELIDE_SELF_BINDINGS).ok();
        apply_env_overrides(Self::DEFAULT, speculative.as_deref(), elide.as_deref())
    }
}

impl Default for StepOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Parse a boolean flag value. Unrecognised text yields `None`.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn apply_env_overrides(
    mut options: StepOptions,
    speculative: Option<&str>,
    elide: Option<&str>,
) -> StepOptions {
    if let Some(flag) = speculative.and_then(parse_flag) {
        options.speculative_eval = flag;
    }
    if let Some(flag) = elide.and_then(parse_flag) {
        options.elide_self_bindings = flag;
    }
    options
}

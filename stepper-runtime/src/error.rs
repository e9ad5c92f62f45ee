// stepper-runtime - Error types for the evaluator
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Error types for evaluation.

use std::fmt;

use stepper_parser::{Expr, ParseError, Symbol};
use thiserror::Error;

/// Result type for evaluation.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during evaluation.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Undefined symbol reference
    #[error("Unable to resolve symbol: {0}")]
    UndefinedSymbol(Symbol),

    /// Wrong number of arguments to a function
    #[error("Wrong number of arguments{}: expected {expected}, got {got}", name_suffix(.name))]
    Arity {
        expected: AritySpec,
        got: usize,
        name: Option<String>,
    },

    /// Wrong type for an operation
    #[error("{}: expected {expected}, got {got}", context_or_default(.context))]
    Type {
        expected: &'static str,
        got: &'static str,
        context: Option<String>,
    },

    /// Attempted to call something that isn't callable
    #[error("Cannot call value: {0}")]
    NotCallable(String),

    /// Invalid special form syntax
    #[error("Invalid '{form}' syntax: {message}")]
    Syntax { form: &'static str, message: String },

    /// Source text could not be read
    #[error("{0}")]
    Read(#[from] ParseError),

    /// User-thrown value (via throw)
    #[error("{0}")]
    Thrown(Expr),

    /// General evaluation error
    #[error("{0}")]
    Eval(String),

    /// Internal error - invariant violation
    #[error("Internal error: {0}")]
    Internal(String),
}

fn name_suffix(name: &Option<String>) -> String {
    name.as_ref()
        .map(|n| format!(" to '{}'", n))
        .unwrap_or_default()
}

fn context_or_default(context: &Option<String>) -> &str {
    context.as_deref().unwrap_or("Type error")
}

/// Expected argument count of a callable.
#[derive(Debug, Clone)]
pub enum AritySpec {
    Exact(usize),
    AtLeast(usize),
    Range(usize, usize),
}

impl fmt::Display for AritySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AritySpec::Exact(n) => write!(f, "{}", n),
            AritySpec::AtLeast(n) => write!(f, "at least {}", n),
            AritySpec::Range(min, max) => write!(f, "{} to {}", min, max),
        }
    }
}

impl Error {
    /// Arity error for an exact count.
    pub fn arity_named(name: impl Into<String>, expected: usize, got: usize) -> Self {
        Error::Arity {
            expected: AritySpec::Exact(expected),
            got,
            name: Some(name.into()),
        }
    }

    /// Arity error for a minimum count.
    pub fn arity_at_least(name: impl Into<String>, expected: usize, got: usize) -> Self {
        Error::Arity {
            expected: AritySpec::AtLeast(expected),
            got,
            name: Some(name.into()),
        }
    }

    /// Arity error for an inclusive range.
    pub fn arity_range(name: impl Into<String>, min: usize, max: usize, got: usize) -> Self {
        Error::Arity {
            expected: AritySpec::Range(min, max),
            got,
            name: Some(name.into()),
        }
    }

    pub fn type_error_in(
        context: impl Into<String>,
        expected: &'static str,
        got: &'static str,
    ) -> Self {
        Error::Type {
            expected,
            got,
            context: Some(context.into()),
        }
    }

    pub fn syntax(form: &'static str, message: impl Into<String>) -> Self {
        Error::Syntax {
            form,
            message: message.into(),
        }
    }

    /// Stable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::UndefinedSymbol(_) => "UndefinedSymbol",
            Error::Arity { .. } => "Arity",
            Error::Type { .. } => "Type",
            Error::NotCallable(_) => "NotCallable",
            Error::Syntax { .. } => "Syntax",
            Error::Read(_) => "Read",
            Error::Thrown(_) => "Thrown",
            Error::Eval(_) => "Eval",
            Error::Internal(_) => "Internal",
        }
    }
}

impl From<stepper_core::Error> for Error {
    fn from(e: stepper_core::Error) -> Self {
        Error::Eval(e.to_string())
    }
}

/// Check an exact argument count.
pub(crate) fn check_arity(name: &str, args: &[Expr], expected: usize) -> Result<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(Error::arity_named(name, expected, args.len()))
    }
}

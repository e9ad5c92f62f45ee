// stepper-core - Error types for the stepper
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Error types for resolving and flattening calls.

use stepper_parser::{Expr, Symbol};
use thiserror::Error;

/// Result type for stepping operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while stepping into a call.
///
/// Every error is final for the call that raised it; no partially built
/// expression is ever returned alongside one.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The callee could not be found statically or by evaluation
    #[error("Unable to resolve symbol: {symbol}")]
    UnresolvedSymbol { symbol: Symbol },

    /// No clause of the callee accepts the supplied argument count
    #[error("No matching arity for {callee}: {got} argument(s) supplied, clauses accept {accepted}")]
    NoMatchingArity {
        callee: Expr,
        got: usize,
        accepted: String,
    },

    /// The callee's source is missing or not shaped like a definition
    #[error("Malformed definition of {name}: {message}")]
    MalformedDefinition { name: String, message: String },

    /// Reading the callee's source would require read-time evaluation
    #[error("Cannot read the definition of {name}: read-time evaluation is disabled")]
    EvaluationDeferred { name: String },

    /// The expression is not a call that can be stepped into
    #[error("Cannot step into {form}: {message}")]
    InvalidCall { form: Expr, message: String },

    /// A parameter pattern is malformed
    #[error("Invalid binding pattern {pattern}: {message}")]
    InvalidPattern { pattern: Expr, message: String },
}

impl Error {
    pub fn malformed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::MalformedDefinition {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn invalid_call(form: &Expr, message: impl Into<String>) -> Self {
        Error::InvalidCall {
            form: form.clone(),
            message: message.into(),
        }
    }

    pub fn invalid_pattern(pattern: &Expr, message: impl Into<String>) -> Self {
        Error::InvalidPattern {
            pattern: pattern.clone(),
            message: message.into(),
        }
    }

    /// Stable name of the failure kind, for display and matching.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::UnresolvedSymbol { .. } => "UnresolvedSymbol",
            Error::NoMatchingArity { .. } => "NoMatchingArity",
            Error::MalformedDefinition { .. } => "MalformedDefinition",
            Error::EvaluationDeferred { .. } => "EvaluationDeferred",
            Error::InvalidCall { .. } => "InvalidCall",
            Error::InvalidPattern { .. } => "InvalidPattern",
        }
    }

    /// The sub-expression the user should look at.
    pub fn offending_form(&self) -> Expr {
        match self {
            Error::UnresolvedSymbol { symbol } => Expr::Symbol(symbol.clone()),
            Error::NoMatchingArity { callee, .. } => callee.clone(),
            Error::MalformedDefinition { name, .. } | Error::EvaluationDeferred { name } => {
                Expr::sym(name)
            }
            Error::InvalidCall { form, .. } => form.clone(),
            Error::InvalidPattern { pattern, .. } => pattern.clone(),
        }
    }
}

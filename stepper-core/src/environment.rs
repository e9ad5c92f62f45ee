// stepper-core - Symbol environment interface
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The seam between the stepper and whatever hosts it.
//!
//! The stepper never evaluates or reads source on its own. Lookups, reads
//! and speculative evaluation all go through a [`SymbolEnvironment`].

use stepper_parser::{Expr, Symbol};
use thiserror::Error;

use crate::special_forms;

/// Metadata describing a resolved var.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SymbolInfo {
    /// Namespace the var is defined in
    pub ns: String,
    pub name: String,
    /// File the definition was loaded from
    pub file: Option<String>,
    /// 1-indexed line of the definition
    pub line: Option<usize>,
    /// Exact source text of the defining form
    pub source: Option<String>,
    pub is_macro: bool,
    /// Vector of parameter vectors, e.g. `([x] [x y])`
    pub arglists: Option<Expr>,
    pub doc: Option<String>,
}

impl SymbolInfo {
    pub fn new(ns: impl Into<String>, name: impl Into<String>) -> Self {
        SymbolInfo {
            ns: ns.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// `ns/name`
    pub fn qualified_name(&self) -> String {
        format!("{}/{}", self.ns, self.name)
    }
}

/// Failures reported by an environment.
#[derive(Debug, Clone, Error)]
pub enum EnvironmentError {
    /// Source text could not be read
    #[error("read error: {0}")]
    Read(String),
    /// The reader refused a read-time evaluation form
    #[error("read-time evaluation is disabled")]
    ReadEvalDisabled,
    /// Evaluation failed
    #[error("evaluation error: {0}")]
    Evaluation(String),
}

/// Symbol lookup, reading and evaluation supplied by the host.
pub trait SymbolEnvironment {
    /// Resolve `sym` in the current namespace scope, including referred and
    /// aliased names.
    fn lookup(&self, sym: &Symbol) -> Option<SymbolInfo>;

    /// Names of all loaded namespaces, in the order they should be searched.
    fn namespaces(&self) -> Vec<String>;

    /// Resolve `sym` as if `ns` were the current namespace.
    fn lookup_in(&self, ns: &str, sym: &Symbol) -> Option<SymbolInfo>;

    /// Evaluate an expression in the current namespace.
    fn evaluate(&self, expr: &Expr) -> Result<Expr, EnvironmentError>;

    /// Read the first form of `text`.
    fn read_expression(&self, text: &str) -> Result<Expr, EnvironmentError>;

    fn is_special_form(&self, sym: &Symbol) -> bool {
        special_forms::is_special_form(sym)
    }
}

impl<E: SymbolEnvironment + ?Sized> SymbolEnvironment for &E {
    fn lookup(&self, sym: &Symbol) -> Option<SymbolInfo> {
        (**self).lookup(sym)
    }

    fn namespaces(&self) -> Vec<String> {
        (**self).namespaces()
    }

    fn lookup_in(&self, ns: &str, sym: &Symbol) -> Option<SymbolInfo> {
        (**self).lookup_in(ns, sym)
    }

    fn evaluate(&self, expr: &Expr) -> Result<Expr, EnvironmentError> {
        (**self).evaluate(expr)
    }

    fn read_expression(&self, text: &str) -> Result<Expr, EnvironmentError> {
        (**self).read_expression(text)
    }

    fn is_special_form(&self, sym: &Symbol) -> bool {
        (**self).is_special_form(sym)
    }
}

// stepper-core - Common test utilities
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Shared test helpers for stepper-core integration tests.
//!
//! # Usage
//!
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! - [`MockEnvironment`] - an in-memory [`SymbolEnvironment`] built from
//!   source snippets
//! - [`expr`] - read a single form

use std::collections::BTreeMap;

#[allow(unused_imports)]
pub use stepper_core::{
    EnvironmentError, Error, Expr, Flattener, Resolved, StepOptions, Symbol, SymbolEnvironment,
    SymbolInfo,
};
use stepper_parser::{ParseErrorKind, ReaderOptions, read, read_all_with};

/// Read a single form, panicking on failure.
#[must_use]
pub fn expr(src: &str) -> Expr {
    read(src)
        .expect("form should parse")
        .expect("source should contain a form")
}

/// An environment whose vars are registered from source text.
///
/// Namespaces are searched in insertion order. Only the current namespace is
/// visible to [`SymbolEnvironment::lookup`].
#[derive(Debug, Default)]
pub struct MockEnvironment {
    current: String,
    namespaces: Vec<String>,
    vars: BTreeMap<(String, String), SymbolInfo>,
    values: BTreeMap<String, Expr>,
    read_eval: bool,
}

#[allow(dead_code)]
impl MockEnvironment {
    #[must_use]
    pub fn new() -> Self {
        MockEnvironment {
            current: "user".to_string(),
            namespaces: vec!["user".to_string()],
            read_eval: true,
            ..Default::default()
        }
    }

    /// Register the definition in `source` under `ns`. The defined name is
    /// taken from the second element of the form.
    #[must_use]
    pub fn define(mut self, ns: &str, source: &str) -> Self {
        let form = expr(source);
        let items = form.as_items().expect("definition should be a list");
        let name = items[1]
            .as_symbol()
            .expect("definition name should be a symbol")
            .name()
            .to_string();
        let mut info = SymbolInfo::new(ns, name.clone());
        info.is_macro = form.is_call_to("defmacro");
        info.source = Some(source.to_string());
        info.line = Some(1);
        if !self.namespaces.iter().any(|n| n == ns) {
            self.namespaces.push(ns.to_string());
        }
        self.vars.insert((ns.to_string(), name), info);
        self
    }

    /// Register a var with explicit metadata.
    #[must_use]
    pub fn define_info(mut self, info: SymbolInfo) -> Self {
        if !self.namespaces.iter().any(|n| n == &info.ns) {
            self.namespaces.push(info.ns.clone());
        }
        self.vars.insert((info.ns.clone(), info.name.clone()), info);
        self
    }

    /// Make `name` evaluate to `value`.
    #[must_use]
    pub fn with_value(mut self, name: &str, value: Expr) -> Self {
        self.values.insert(name.to_string(), value);
        self
    }

    #[must_use]
    pub fn with_read_eval(mut self, enabled: bool) -> Self {
        self.read_eval = enabled;
        self
    }
}

impl SymbolEnvironment for MockEnvironment {
    fn lookup(&self, sym: &Symbol) -> Option<SymbolInfo> {
        let ns = sym.namespace().unwrap_or(&self.current);
        self.vars.get(&(ns.to_string(), sym.name().to_string())).cloned()
    }

    fn namespaces(&self) -> Vec<String> {
        self.namespaces.clone()
    }

    fn lookup_in(&self, ns: &str, sym: &Symbol) -> Option<SymbolInfo> {
        if sym.namespace().is_some_and(|q| q != ns) {
            return None;
        }
        self.vars.get(&(ns.to_string(), sym.name().to_string())).cloned()
    }

    fn evaluate(&self, expr: &Expr) -> Result<Expr, EnvironmentError> {
        match expr {
            Expr::Symbol(sym) => self
                .values
                .get(&sym.to_string())
                .cloned()
                .ok_or_else(|| EnvironmentError::Evaluation(format!("Unable to resolve {}", sym))),
            other => Ok(other.clone()),
        }
    }

    fn read_expression(&self, text: &str) -> Result<Expr, EnvironmentError> {
        let options = ReaderOptions {
            read_eval: self.read_eval,
        };
        let forms = read_all_with(text, options).map_err(|e| match e.kind {
            ParseErrorKind::ReadEvalDisabled => EnvironmentError::ReadEvalDisabled,
            _ => EnvironmentError::Read(e.to_string()),
        })?;
        forms
            .into_iter()
            .next()
            .ok_or_else(|| EnvironmentError::Read("no form in source".to_string()))
    }
}

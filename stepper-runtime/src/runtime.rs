// stepper-runtime - Runtime and symbol environment
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The [`Runtime`]: an evaluator with the core library loaded, which also
//! serves as the stepper's [`SymbolEnvironment`].

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use stepper_core::{EnvironmentError, SymbolEnvironment, SymbolInfo};
use stepper_parser::{
    Expr, ParseErrorKind, Parser, READ_EVAL, ReaderOptions, Symbol, read_all_with,
};
use tracing::{debug, trace};

use crate::builtins::register_builtins;
use crate::env::Env;
use crate::error::{Error, Result};
use crate::eval::{EVALUATOR_FORMS, eval, set_max_eval_depth};
use crate::namespace::{NamespaceRegistry, Var};
use crate::options::RuntimeOptions;

/// Source of the core library.
const CORE_SOURCE: &str = include_str!("core.clj");
const CORE_FILE: &str = "stepper/core.clj";

/// Name recorded for definitions evaluated from a string.
pub const EVAL_FILE: &str = "<eval>";

/// An evaluator with the core library loaded.
///
/// **`Runtime` is NOT thread-safe.** Values use `Rc` and `RefCell`
/// internally; create one runtime per thread.
///
/// ```
/// use stepper_runtime::Runtime;
///
/// let runtime = Runtime::new().unwrap();
/// let result = runtime.eval_str("(def x 42) (* x 2)").unwrap();
/// assert_eq!(result.to_string(), "84");
/// ```
pub struct Runtime {
    env: Env,
    registry: NamespaceRegistry,
    options: RuntimeOptions,
    output: Rc<RefCell<String>>,
}

impl Runtime {
    /// Create a runtime with default options.
    pub fn new() -> Result<Self> {
        Self::with_options(RuntimeOptions::DEFAULT)
    }

    /// Create a runtime with the given options, builtins registered and the
    /// core library loaded. `user` is the current namespace afterwards.
    pub fn with_options(options: RuntimeOptions) -> Result<Self> {
        set_max_eval_depth(options.max_eval_depth);
        let env = Env::new();
        let registry = env.registry()?;
        let output = Rc::new(RefCell::new(String::new()));
        register_builtins(&env, Rc::clone(&output))?;

        let runtime = Runtime {
            env,
            registry,
            options,
            output,
        };
        runtime.load_str(CORE_SOURCE, CORE_FILE)?;
        runtime.registry.set_current("user");
        debug!(target: "stepper::runtime", ?options, "runtime ready");
        Ok(runtime)
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn registry(&self) -> &NamespaceRegistry {
        &self.registry
    }

    pub fn options(&self) -> RuntimeOptions {
        self.options
    }

    /// Turn `#=` read-time evaluation on or off for subsequent reads,
    /// including the stepper's reads of recorded definitions.
    pub fn set_read_eval(&mut self, enabled: bool) {
        self.options.read_eval = enabled;
    }

    fn reader_options(&self) -> ReaderOptions {
        ReaderOptions {
            read_eval: self.options.read_eval,
        }
    }

    /// Evaluate every form in `source`, returning the last value.
    pub fn eval_str(&self, source: &str) -> Result<Expr> {
        self.load_str(source, EVAL_FILE)
    }

    /// Evaluate an already-read form.
    pub fn eval(&self, expr: &Expr) -> Result<Expr> {
        eval(expr, &self.env)
    }

    /// Evaluate every form in `source` as if loaded from `file`.
    ///
    /// Top-level `def`, `defn`, `defn-` and `defmacro` forms record the
    /// file, line and exact source text on the var they define.
    pub fn load_str(&self, source: &str, file: &str) -> Result<Expr> {
        let mut parser = Parser::with_options(source, self.reader_options())?;
        let forms = parser.parse_all_spanned()?;

        let mut result = Expr::Nil;
        for (form, span) in forms {
            result = eval(&form, &self.env)?;
            if is_definition(&form)
                && let Expr::Symbol(sym) = &result
                && let Some(var) = self.registry.resolve(sym)
            {
                let text = span.slice(source).to_string();
                var.update_meta(|meta| {
                    meta.file = Some(file.to_string());
                    meta.line = Some(span.line);
                    meta.source = Some(text);
                });
                trace!(target: "stepper::runtime", var = %sym, file, line = span.line, "recorded source");
            }
        }
        Ok(result)
    }

    /// Evaluate the file at `path`.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Expr> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| Error::Eval(format!("cannot read {}: {}", path.display(), e)))?;
        self.load_str(&source, &path.display().to_string())
    }

    /// Everything printed so far.
    #[must_use]
    pub fn output(&self) -> String {
        self.output.borrow().clone()
    }

    /// Take and clear everything printed so far.
    pub fn take_output(&self) -> String {
        std::mem::take(&mut *self.output.borrow_mut())
    }

    /// Replace `(read-eval* form)` markers with the value of `form`.
    fn expand_read_eval(&self, form: &Expr) -> Result<Expr> {
        match form {
            Expr::List(items) if form.is_call_to(READ_EVAL) && items.len() == 2 => {
                eval(&items[1], &self.env)
            }
            Expr::List(items) => Ok(Expr::list(self.expand_all(items.iter())?)),
            Expr::Vector(items) => Ok(Expr::vector(self.expand_all(items.iter())?)),
            Expr::Map(map) => {
                let mut pairs = Vec::with_capacity(map.len());
                for (k, v) in map.iter() {
                    pairs.push((self.expand_read_eval(k)?, self.expand_read_eval(v)?));
                }
                Ok(Expr::map(pairs))
            }
            Expr::Set(set) => Ok(Expr::set(self.expand_all(set.iter())?)),
            other => Ok(other.clone()),
        }
    }

    fn expand_all<'a>(&self, items: impl Iterator<Item = &'a Expr>) -> Result<Vec<Expr>> {
        items.map(|item| self.expand_read_eval(item)).collect()
    }
}

fn is_definition(form: &Expr) -> bool {
    ["def", "defn", "defn-", "defmacro"]
        .iter()
        .any(|head| form.is_call_to(head))
}

fn symbol_info(var: &Var) -> SymbolInfo {
    let meta = var.meta();
    SymbolInfo {
        ns: var.ns().to_string(),
        name: var.name().to_string(),
        file: meta.file,
        line: meta.line,
        source: meta.source,
        is_macro: meta.is_macro,
        arglists: meta.arglists,
        doc: meta.doc,
    }
}

// ============================================================================
// Symbol environment
// ============================================================================

impl SymbolEnvironment for Runtime {
    fn lookup(&self, sym: &Symbol) -> Option<SymbolInfo> {
        self.registry.resolve(sym).map(|var| symbol_info(&var))
    }

    fn namespaces(&self) -> Vec<String> {
        self.registry.names()
    }

    fn lookup_in(&self, ns: &str, sym: &Symbol) -> Option<SymbolInfo> {
        let ns = self.registry.find(ns)?;
        self.registry
            .resolve_in(&ns, sym)
            .map(|var| symbol_info(&var))
    }

    fn evaluate(&self, expr: &Expr) -> std::result::Result<Expr, EnvironmentError> {
        eval(expr, &self.env).map_err(|e| EnvironmentError::Evaluation(e.to_string()))
    }

    fn is_special_form(&self, sym: &Symbol) -> bool {
        stepper_core::is_special_form(sym)
            || (!sym.has_namespace() && EVALUATOR_FORMS.contains(&sym.name()))
    }

    fn read_expression(&self, text: &str) -> std::result::Result<Expr, EnvironmentError> {
        let forms = read_all_with(text, self.reader_options()).map_err(|e| match e.kind {
            ParseErrorKind::ReadEvalDisabled => EnvironmentError::ReadEvalDisabled,
            _ => EnvironmentError::Read(e.to_string()),
        })?;
        let form = forms
            .into_iter()
            .next()
            .ok_or_else(|| EnvironmentError::Read("no form in source text".to_string()))?;
        self.expand_read_eval(&form)
            .map_err(|e| EnvironmentError::Evaluation(e.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================

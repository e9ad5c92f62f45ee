// stepper-core - Symbol resolution
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Classifying the head of a call.
//!
//! Resolution order:
//! 1. Keywords resolve to themselves.
//! 2. Special forms of the embedding language.
//! 3. The environment's current namespace scope.
//! 4. Every loaded namespace, in the environment's order.
//! 5. Speculative evaluation, when enabled.

use std::fmt;

use stepper_parser::{Expr, Keyword, Symbol};
use tracing::{debug, trace};

use crate::config::StepOptions;
use crate::environment::{SymbolEnvironment, SymbolInfo};

/// What a callee expression turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    SpecialForm(Symbol),
    Macro(SymbolInfo),
    Function(SymbolInfo),
    Keyword(Keyword),
    /// Found only by evaluation; carries the printed value
    LiteralVariable { symbol: Symbol, printed: String },
    Unknown(Expr),
}

impl Resolved {
    /// Variant name, for logs and messages.
    pub fn tag(&self) -> &'static str {
        match self {
            Resolved::SpecialForm(_) => "special-form",
            Resolved::Macro(_) => "macro",
            Resolved::Function(_) => "function",
            Resolved::Keyword(_) => "keyword",
            Resolved::LiteralVariable { .. } => "literal-variable",
            Resolved::Unknown(_) => "unknown",
        }
    }

    /// Metadata for a macro or function.
    pub fn info(&self) -> Option<&SymbolInfo> {
        match self {
            Resolved::Macro(info) | Resolved::Function(info) => Some(info),
            _ => None,
        }
    }
}

impl fmt::Display for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolved::SpecialForm(sym) => write!(f, "special form {}", sym),
            Resolved::Macro(info) => write!(f, "macro {}", info.qualified_name()),
            Resolved::Function(info) => write!(f, "function {}", info.qualified_name()),
            Resolved::Keyword(kw) => write!(f, "keyword {}", kw),
            Resolved::LiteralVariable { symbol, printed } => {
                write!(f, "{} = {}", symbol, printed)
            }
            Resolved::Unknown(expr) => write!(f, "unknown {}", expr),
        }
    }
}

/// Resolves callee expressions against an environment.
pub struct Resolver<'e, E: SymbolEnvironment + ?Sized> {
    env: &'e E,
    options: StepOptions,
}

impl<'e, E: SymbolEnvironment + ?Sized> Resolver<'e, E> {
    pub fn new(env: &'e E, options: StepOptions) -> Self {
        Resolver { env, options }
    }

    /// Classify `expr`. Never fails: anything that cannot be found is
    /// [`Resolved::Unknown`].
    pub fn resolve(&self, expr: &Expr) -> Resolved {
        let resolved = match expr {
            Expr::Keyword(kw) => Resolved::Keyword(kw.clone()),
            Expr::Symbol(sym) => self.resolve_symbol(sym),
            other => Resolved::Unknown(other.clone()),
        };
        debug!(target: "stepper::resolve", expr = %expr, resolved = resolved.tag(), "resolved");
        resolved
    }

    fn resolve_symbol(&self, sym: &Symbol) -> Resolved {
        if self.env.is_special_form(sym) {
            return Resolved::SpecialForm(sym.clone());
        }

        trace!(target: "stepper::resolve", %sym, "looking up in current scope");
        if let Some(info) = self.env.lookup(sym) {
            return classify(info);
        }

        for ns in self.env.namespaces() {
            trace!(target: "stepper::resolve", %sym, ns = %ns, "looking up in namespace");
            if let Some(info) = self.env.lookup_in(&ns, sym) {
                return classify(info);
            }
        }

        if !self.options.speculative_eval {
            return Resolved::Unknown(Expr::Symbol(sym.clone()));
        }

        trace!(target: "stepper::resolve", %sym, "evaluating speculatively");
        match self.env.evaluate(&Expr::Symbol(sym.clone())) {
            Ok(value) => Resolved::LiteralVariable {
                symbol: sym.clone(),
                printed: value.to_string(),
            },
            Err(err) => {
                trace!(target: "stepper::resolve", %sym, error = %err, "speculative evaluation failed");
                Resolved::Unknown(Expr::Symbol(sym.clone()))
            }
        }
    }
}

fn classify(info: SymbolInfo) -> Resolved {
    if info.is_macro {
        Resolved::Macro(info)
    } else {
        Resolved::Function(info)
    }
}

/// Resolve `expr` with default options.
pub fn resolve<E: SymbolEnvironment + ?Sized>(env: &E, expr: &Expr) -> Resolved {
    Resolver::new(env, StepOptions::DEFAULT).resolve(expr)
}

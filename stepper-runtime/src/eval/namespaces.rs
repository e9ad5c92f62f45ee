// stepper-runtime - Namespace special forms
// Copyright (c) 2025 Tom Waddington. MIT licensed.

use stepper_parser::{Expr, Symbol};

use super::eval;
use crate::env::Env;
use crate::error::{Error, Result};

/// (ns name clauses*) - switch to `name`, creating it if needed.
///
/// Reference clauses such as `(:require ...)` are accepted and ignored;
/// every namespace already sees the core library.
pub(super) fn eval_ns(args: &[Expr], env: &Env) -> Result<Expr> {
    let name = match args.first() {
        Some(Expr::Symbol(sym)) if !sym.has_namespace() => sym.name().to_string(),
        Some(other) => {
            return Err(Error::syntax(
                "ns",
                format!("name must be a symbol, got {}", other.type_name()),
            ));
        }
        None => return Err(Error::syntax("ns", "requires a namespace name")),
    };
    let ns = env.registry()?.set_current(&name);
    tracing::debug!(target: "stepper::runtime", ns = %name, "entered namespace");
    Ok(Expr::Symbol(Symbol::new(&ns.name())))
}

/// (in-ns 'name) - like `ns`, but evaluates its argument
pub(super) fn eval_in_ns(args: &[Expr], env: &Env) -> Result<Expr> {
    let [arg] = args else {
        return Err(Error::syntax("in-ns", "requires exactly 1 argument"));
    };
    let name = match eval(arg, env)? {
        Expr::Symbol(s) => s.name().to_string(),
        Expr::String(s) => s.to_string(),
        other => {
            return Err(Error::syntax(
                "in-ns",
                format!(
                    "argument must be a symbol or string, got {}",
                    other.type_name()
                ),
            ));
        }
    };
    let ns = env.registry()?.set_current(&name);
    Ok(Expr::Symbol(Symbol::new(&ns.name())))
}

/// (var sym) - the fully qualified name of the var `sym` resolves to
pub(super) fn eval_var(args: &[Expr], env: &Env) -> Result<Expr> {
    let sym = match args {
        [Expr::Symbol(s)] => s,
        [other] => {
            return Err(Error::syntax(
                "var",
                format!("argument must be a symbol, got {}", other.type_name()),
            ));
        }
        _ => return Err(Error::syntax("var", "requires exactly 1 argument")),
    };
    env.registry()?
        .resolve(sym)
        .map(|var| Expr::Symbol(var.symbol()))
        .ok_or_else(|| Error::UndefinedSymbol(sym.clone()))
}

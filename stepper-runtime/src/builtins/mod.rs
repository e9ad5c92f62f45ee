// stepper-runtime - Built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Native functions of the `stepper.core` namespace.
//!
//! Every builtin is interned as a public var of the core namespace, so the
//! stepper can resolve `+` or `map` the same way it resolves user code.

mod arithmetic;
mod atoms;
mod collections;
mod io;
mod predicates;
mod sequences;
mod strings;

use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;

use stepper_parser::Expr;

use crate::env::Env;
use crate::error::{Error, Result};

/// Signature shared by the stateless builtins.
pub(crate) type Builtin = fn(&[Expr]) -> Result<Expr>;

/// Register all built-in functions in the given environment.
///
/// Printing functions append to `output` as well as writing to stdout.
pub fn register_builtins(env: &Env, output: Rc<RefCell<String>>) -> Result<()> {
    let tables: [&[(&'static str, Builtin)]; 7] = [
        arithmetic::BUILTINS,
        predicates::BUILTINS,
        collections::BUILTINS,
        sequences::BUILTINS,
        atoms::BUILTINS,
        strings::BUILTINS,
        io::BUILTINS,
    ];
    let mut count = 0;
    for table in tables {
        for &(name, func) in table {
            env.define_native(name, func)?;
            count += 1;
        }
    }
    io::register_printers(env, output)?;
    tracing::trace!(target: "stepper::runtime", count, "registered builtins");
    Ok(())
}

// ============================================================================
// Shared Helpers
// ============================================================================

/// The elements of a seqable value. Maps yield `[k v]` entries and strings
/// yield characters; nil is empty.
pub(crate) fn seq_items(val: &Expr, context: &str) -> Result<Vec<Expr>> {
    match val {
        Expr::Nil => Ok(Vec::new()),
        Expr::List(items) | Expr::Vector(items) => Ok(items.iter().cloned().collect()),
        Expr::Set(items) => Ok(items.iter().cloned().collect()),
        Expr::Map(map) => Ok(map
            .iter()
            .map(|(k, v)| Expr::vector(vec![k.clone(), v.clone()]))
            .collect()),
        Expr::String(s) => Ok(s.chars().map(Expr::Char).collect()),
        other => Err(Error::type_error_in(
            context.to_string(),
            "seqable collection",
            other.type_name(),
        )),
    }
}

/// A list of `items`, or nil when empty.
pub(crate) fn seq_or_nil(items: Vec<Expr>) -> Expr {
    if items.is_empty() {
        Expr::Nil
    } else {
        Expr::list(items)
    }
}

pub(crate) fn compare_numbers(a: &Expr, b: &Expr) -> Result<Ordering> {
    let nan = || Error::Eval("Cannot compare NaN".into());
    match (a, b) {
        (Expr::Int(x), Expr::Int(y)) => Ok(x.cmp(y)),
        (Expr::Float(x), Expr::Float(y)) => x.partial_cmp(y).ok_or_else(nan),
        (Expr::Int(x), Expr::Float(y)) => (*x as f64).partial_cmp(y).ok_or_else(nan),
        (Expr::Float(x), Expr::Int(y)) => x.partial_cmp(&(*y as f64)).ok_or_else(nan),
        (a, b) => Err(Error::type_error_in(
            "comparison",
            "number",
            if matches!(a, Expr::Int(_) | Expr::Float(_)) {
                b.type_name()
            } else {
                a.type_name()
            },
        )),
    }
}

/// Require an integer argument.
pub(crate) fn require_int(val: &Expr, context: &str) -> Result<i64> {
    match val {
        Expr::Int(n) => Ok(*n),
        other => Err(Error::type_error_in(
            context.to_string(),
            "integer",
            other.type_name(),
        )),
    }
}

/// Require a non-negative integer usable as an index or count.
pub(crate) fn require_index(val: &Expr, context: &str) -> Result<usize> {
    let n = require_int(val, context)?;
    usize::try_from(n).map_err(|_| Error::Eval(format!("{}: index {} is negative", context, n)))
}

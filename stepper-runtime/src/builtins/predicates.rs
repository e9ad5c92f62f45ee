// stepper-runtime - Predicates, equality and logic
// Copyright (c) 2025 Tom Waddington. MIT licensed.

use stepper_parser::{Expr, Symbol};

use super::Builtin;
use crate::error::{Error, Result, check_arity};

pub(super) const BUILTINS: &[(&str, Builtin)] = &[
    ("=", builtin_eq),
    ("not=", builtin_not_eq),
    ("not", builtin_not),
    ("identity", builtin_identity),
    ("boolean", builtin_boolean),
    ("type", builtin_type),
    ("nil?", builtin_nil_p),
    ("some?", builtin_some_p),
    ("true?", builtin_true_p),
    ("false?", builtin_false_p),
    ("number?", builtin_number_p),
    ("integer?", builtin_integer_p),
    ("float?", builtin_float_p),
    ("string?", builtin_string_p),
    ("char?", builtin_char_p),
    ("symbol?", builtin_symbol_p),
    ("keyword?", builtin_keyword_p),
    ("fn?", builtin_fn_p),
    ("list?", builtin_list_p),
    ("vector?", builtin_vector_p),
    ("map?", builtin_map_p),
    ("set?", builtin_set_p),
    ("coll?", builtin_coll_p),
    ("seq?", builtin_seq_p),
    ("sequential?", builtin_sequential_p),
];

// ============================================================================
// Equality
// ============================================================================

/// Value equality; lists and vectors with equal elements are equal.
pub(crate) fn equiv(a: &Expr, b: &Expr) -> bool {
    match (a, b) {
        (Expr::List(x) | Expr::Vector(x), Expr::List(y) | Expr::Vector(y)) => {
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(a, b)| equiv(a, b))
        }
        (Expr::Map(x), Expr::Map(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).is_some_and(|other| equiv(v, other)))
        }
        _ => a == b,
    }
}

pub(crate) fn builtin_eq(args: &[Expr]) -> Result<Expr> {
    if args.is_empty() {
        return Err(Error::arity_at_least("=", 1, 0));
    }
    Ok(Expr::Bool(args.windows(2).all(|w| equiv(&w[0], &w[1]))))
}

pub(crate) fn builtin_not_eq(args: &[Expr]) -> Result<Expr> {
    let Expr::Bool(eq) = builtin_eq(args)? else {
        return Err(Error::Internal("= returned a non-boolean".into()));
    };
    Ok(Expr::Bool(!eq))
}

// ============================================================================
// Logic
// ============================================================================

pub(crate) fn builtin_not(args: &[Expr]) -> Result<Expr> {
    check_arity("not", args, 1)?;
    Ok(Expr::Bool(!args[0].is_truthy()))
}

pub(crate) fn builtin_identity(args: &[Expr]) -> Result<Expr> {
    check_arity("identity", args, 1)?;
    Ok(args[0].clone())
}

pub(crate) fn builtin_boolean(args: &[Expr]) -> Result<Expr> {
    check_arity("boolean", args, 1)?;
    Ok(Expr::Bool(args[0].is_truthy()))
}

/// The type name as a symbol.
pub(crate) fn builtin_type(args: &[Expr]) -> Result<Expr> {
    check_arity("type", args, 1)?;
    Ok(Expr::Symbol(Symbol::new(args[0].type_name())))
}

// ============================================================================
// Type predicates
// ============================================================================

fn test(name: &str, args: &[Expr], pred: fn(&Expr) -> bool) -> Result<Expr> {
    check_arity(name, args, 1)?;
    Ok(Expr::Bool(pred(&args[0])))
}

pub(crate) fn builtin_nil_p(args: &[Expr]) -> Result<Expr> {
    test("nil?", args, Expr::is_nil)
}

pub(crate) fn builtin_some_p(args: &[Expr]) -> Result<Expr> {
    test("some?", args, |v| !v.is_nil())
}

pub(crate) fn builtin_true_p(args: &[Expr]) -> Result<Expr> {
    test("true?", args, |v| matches!(v, Expr::Bool(true)))
}

pub(crate) fn builtin_false_p(args: &[Expr]) -> Result<Expr> {
    test("false?", args, |v| matches!(v, Expr::Bool(false)))
}

pub(crate) fn builtin_number_p(args: &[Expr]) -> Result<Expr> {
    test("number?", args, |v| matches!(v, Expr::Int(_) | Expr::Float(_)))
}

pub(crate) fn builtin_integer_p(args: &[Expr]) -> Result<Expr> {
    test("integer?", args, |v| matches!(v, Expr::Int(_)))
}

pub(crate) fn builtin_float_p(args: &[Expr]) -> Result<Expr> {
    test("float?", args, |v| matches!(v, Expr::Float(_)))
}

pub(crate) fn builtin_string_p(args: &[Expr]) -> Result<Expr> {
    test("string?", args, |v| matches!(v, Expr::String(_)))
}

pub(crate) fn builtin_char_p(args: &[Expr]) -> Result<Expr> {
    test("char?", args, |v| matches!(v, Expr::Char(_)))
}

pub(crate) fn builtin_symbol_p(args: &[Expr]) -> Result<Expr> {
    test("symbol?", args, |v| matches!(v, Expr::Symbol(_)))
}

pub(crate) fn builtin_keyword_p(args: &[Expr]) -> Result<Expr> {
    test("keyword?", args, |v| matches!(v, Expr::Keyword(_)))
}

pub(crate) fn builtin_fn_p(args: &[Expr]) -> Result<Expr> {
    test("fn?", args, |v| matches!(v, Expr::Fn(_) | Expr::NativeFn(_)))
}

pub(crate) fn builtin_list_p(args: &[Expr]) -> Result<Expr> {
    test("list?", args, |v| matches!(v, Expr::List(_)))
}

pub(crate) fn builtin_vector_p(args: &[Expr]) -> Result<Expr> {
    test("vector?", args, |v| matches!(v, Expr::Vector(_)))
}

pub(crate) fn builtin_map_p(args: &[Expr]) -> Result<Expr> {
    test("map?", args, |v| matches!(v, Expr::Map(_)))
}

pub(crate) fn builtin_set_p(args: &[Expr]) -> Result<Expr> {
    test("set?", args, |v| matches!(v, Expr::Set(_)))
}

pub(crate) fn builtin_coll_p(args: &[Expr]) -> Result<Expr> {
    test("coll?", args, |v| {
        matches!(v, Expr::List(_) | Expr::Vector(_) | Expr::Map(_) | Expr::Set(_))
    })
}

/// Only lists are seqs; a rest argument or `nthnext` result is a list.
pub(crate) fn builtin_seq_p(args: &[Expr]) -> Result<Expr> {
    test("seq?", args, |v| matches!(v, Expr::List(_)))
}

pub(crate) fn builtin_sequential_p(args: &[Expr]) -> Result<Expr> {
    test("sequential?", args, |v| matches!(v, Expr::List(_) | Expr::Vector(_)))
}

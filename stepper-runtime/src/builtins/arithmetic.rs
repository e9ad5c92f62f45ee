// stepper-runtime - Arithmetic built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Arithmetic: +, -, *, /, quot, rem, mod, inc, dec, max, min, abs, and the
//! numeric comparisons and predicates.
//!
//! ## Integer Overflow Behaviour
//!
//! Integer operations are checked and return an error on overflow. There
//! are no ratios: dividing integers that do not divide evenly yields a
//! float. Operations involving floats do not check for overflow.

use std::cmp::Ordering;

use stepper_parser::Expr;

use super::{Builtin, compare_numbers, require_int};
use crate::error::{Error, Result, check_arity};

pub(super) const BUILTINS: &[(&str, Builtin)] = &[
    ("+", builtin_add),
    ("-", builtin_sub),
    ("*", builtin_mul),
    ("/", builtin_div),
    ("quot", builtin_quot),
    ("rem", builtin_rem),
    ("mod", builtin_mod),
    ("inc", builtin_inc),
    ("dec", builtin_dec),
    ("max", builtin_max),
    ("min", builtin_min),
    ("abs", builtin_abs),
    ("<", builtin_lt),
    (">", builtin_gt),
    ("<=", builtin_le),
    (">=", builtin_ge),
    ("==", builtin_num_eq),
    ("zero?", builtin_zero_p),
    ("pos?", builtin_pos_p),
    ("neg?", builtin_neg_p),
    ("even?", builtin_even_p),
    ("odd?", builtin_odd_p),
];

// ============================================================================
// Helper functions for numeric arithmetic
// ============================================================================

fn to_float(val: &Expr) -> Result<f64> {
    match val {
        Expr::Int(n) => Ok(*n as f64),
        Expr::Float(n) => Ok(*n),
        other => Err(Error::type_error_in(
            "arithmetic",
            "number",
            other.type_name(),
        )),
    }
}

/// True if any argument is a float; errors on non-numbers.
fn any_float(args: &[Expr]) -> Result<bool> {
    let mut float = false;
    for arg in args {
        match arg {
            Expr::Int(_) => {}
            Expr::Float(_) => float = true,
            other => {
                return Err(Error::type_error_in(
                    "arithmetic",
                    "number",
                    other.type_name(),
                ));
            }
        }
    }
    Ok(float)
}

fn overflow(operation: &str) -> Error {
    Error::Eval(format!("Integer overflow in {}", operation))
}

/// Fold integer or float arguments with the matching operation.
fn fold_numeric(
    name: &str,
    args: &[Expr],
    init: Expr,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Expr> {
    let (first, rest) = match args.split_first() {
        Some((first, rest)) => (first.clone(), rest),
        None => return Ok(init),
    };
    if any_float(args)? {
        let mut acc = to_float(&first)?;
        for arg in rest {
            acc = float_op(acc, to_float(arg)?);
        }
        Ok(Expr::Float(acc))
    } else {
        let mut acc = require_int(&first, name)?;
        for arg in rest {
            acc = int_op(acc, require_int(arg, name)?).ok_or_else(|| overflow(name))?;
        }
        Ok(Expr::Int(acc))
    }
}

// ============================================================================
// Arithmetic
// ============================================================================

pub(crate) fn builtin_add(args: &[Expr]) -> Result<Expr> {
    fold_numeric("+", args, Expr::Int(0), i64::checked_add, |a, b| a + b)
}

pub(crate) fn builtin_mul(args: &[Expr]) -> Result<Expr> {
    fold_numeric("*", args, Expr::Int(1), i64::checked_mul, |a, b| a * b)
}

pub(crate) fn builtin_sub(args: &[Expr]) -> Result<Expr> {
    match args {
        [] => Err(Error::arity_at_least("-", 1, 0)),
        [Expr::Int(n)] => n.checked_neg().map(Expr::Int).ok_or_else(|| overflow("-")),
        [Expr::Float(n)] => Ok(Expr::Float(-n)),
        [other] => Err(Error::type_error_in("-", "number", other.type_name())),
        _ => fold_numeric("-", args, Expr::Int(0), i64::checked_sub, |a, b| a - b),
    }
}

/// Integer division that divides evenly stays an integer; anything else
/// is computed in floating point.
pub(crate) fn builtin_div(args: &[Expr]) -> Result<Expr> {
    let (first, rest) = match args {
        [] => return Err(Error::arity_at_least("/", 1, 0)),
        [only] => (Expr::Int(1), std::slice::from_ref(only)),
        [first, rest @ ..] => (first.clone(), rest),
    };
    any_float(args)?;
    let mut acc = first;
    for divisor in rest {
        acc = match (&acc, divisor) {
            (_, Expr::Int(0)) => return Err(Error::Eval("Divide by zero".into())),
            (Expr::Int(a), Expr::Int(b)) if a.checked_rem(*b) == Some(0) => {
                Expr::Int(a.checked_div(*b).ok_or_else(|| overflow("/"))?)
            }
            (a, b) => {
                let divisor = to_float(b)?;
                if divisor == 0.0 {
                    return Err(Error::Eval("Divide by zero".into()));
                }
                Expr::Float(to_float(a)? / divisor)
            }
        };
    }
    Ok(acc)
}

fn int_pair(name: &str, args: &[Expr]) -> Result<(i64, i64)> {
    check_arity(name, args, 2)?;
    let a = require_int(&args[0], name)?;
    let b = require_int(&args[1], name)?;
    if b == 0 {
        return Err(Error::Eval("Divide by zero".into()));
    }
    Ok((a, b))
}

pub(crate) fn builtin_quot(args: &[Expr]) -> Result<Expr> {
    let (a, b) = int_pair("quot", args)?;
    a.checked_div(b).map(Expr::Int).ok_or_else(|| overflow("quot"))
}

pub(crate) fn builtin_rem(args: &[Expr]) -> Result<Expr> {
    let (a, b) = int_pair("rem", args)?;
    a.checked_rem(b).map(Expr::Int).ok_or_else(|| overflow("rem"))
}

/// Modulus with the sign of the divisor.
pub(crate) fn builtin_mod(args: &[Expr]) -> Result<Expr> {
    let (a, b) = int_pair("mod", args)?;
    let r = a.checked_rem(b).ok_or_else(|| overflow("mod"))?;
    Ok(Expr::Int(if r != 0 && (r < 0) != (b < 0) { r + b } else { r }))
}

pub(crate) fn builtin_inc(args: &[Expr]) -> Result<Expr> {
    check_arity("inc", args, 1)?;
    match &args[0] {
        Expr::Int(n) => n.checked_add(1).map(Expr::Int).ok_or_else(|| overflow("inc")),
        Expr::Float(n) => Ok(Expr::Float(n + 1.0)),
        other => Err(Error::type_error_in("inc", "number", other.type_name())),
    }
}

pub(crate) fn builtin_dec(args: &[Expr]) -> Result<Expr> {
    check_arity("dec", args, 1)?;
    match &args[0] {
        Expr::Int(n) => n.checked_sub(1).map(Expr::Int).ok_or_else(|| overflow("dec")),
        Expr::Float(n) => Ok(Expr::Float(n - 1.0)),
        other => Err(Error::type_error_in("dec", "number", other.type_name())),
    }
}

fn extremum(name: &str, args: &[Expr], keep: Ordering) -> Result<Expr> {
    let Some((first, rest)) = args.split_first() else {
        return Err(Error::arity_at_least(name, 1, 0));
    };
    let mut best = first.clone();
    compare_numbers(&best, &best)?;
    for arg in rest {
        if compare_numbers(arg, &best)? == keep {
            best = arg.clone();
        }
    }
    Ok(best)
}

pub(crate) fn builtin_max(args: &[Expr]) -> Result<Expr> {
    extremum("max", args, Ordering::Greater)
}

pub(crate) fn builtin_min(args: &[Expr]) -> Result<Expr> {
    extremum("min", args, Ordering::Less)
}

pub(crate) fn builtin_abs(args: &[Expr]) -> Result<Expr> {
    check_arity("abs", args, 1)?;
    match &args[0] {
        Expr::Int(n) => n.checked_abs().map(Expr::Int).ok_or_else(|| overflow("abs")),
        Expr::Float(n) => Ok(Expr::Float(n.abs())),
        other => Err(Error::type_error_in("abs", "number", other.type_name())),
    }
}

// ============================================================================
// Comparison
// ============================================================================

/// True if every adjacent pair satisfies `ok`.
fn chain(name: &str, args: &[Expr], ok: fn(Ordering) -> bool) -> Result<Expr> {
    if args.is_empty() {
        return Err(Error::arity_at_least(name, 1, 0));
    }
    let mut result = true;
    for pair in args.windows(2) {
        if !ok(compare_numbers(&pair[0], &pair[1])?) {
            result = false;
        }
    }
    if let [only] = args {
        compare_numbers(only, only)?;
    }
    Ok(Expr::Bool(result))
}

pub(crate) fn builtin_lt(args: &[Expr]) -> Result<Expr> {
    chain("<", args, Ordering::is_lt)
}

pub(crate) fn builtin_gt(args: &[Expr]) -> Result<Expr> {
    chain(">", args, Ordering::is_gt)
}

pub(crate) fn builtin_le(args: &[Expr]) -> Result<Expr> {
    chain("<=", args, Ordering::is_le)
}

pub(crate) fn builtin_ge(args: &[Expr]) -> Result<Expr> {
    chain(">=", args, Ordering::is_ge)
}

pub(crate) fn builtin_num_eq(args: &[Expr]) -> Result<Expr> {
    chain("==", args, Ordering::is_eq)
}

// ============================================================================
// Numeric predicates
// ============================================================================

fn sign_test(name: &str, args: &[Expr], ok: fn(Ordering) -> bool) -> Result<Expr> {
    check_arity(name, args, 1)?;
    Ok(Expr::Bool(ok(compare_numbers(&args[0], &Expr::Int(0))?)))
}

pub(crate) fn builtin_zero_p(args: &[Expr]) -> Result<Expr> {
    sign_test("zero?", args, Ordering::is_eq)
}

pub(crate) fn builtin_pos_p(args: &[Expr]) -> Result<Expr> {
    sign_test("pos?", args, Ordering::is_gt)
}

pub(crate) fn builtin_neg_p(args: &[Expr]) -> Result<Expr> {
    sign_test("neg?", args, Ordering::is_lt)
}

pub(crate) fn builtin_even_p(args: &[Expr]) -> Result<Expr> {
    check_arity("even?", args, 1)?;
    Ok(Expr::Bool(require_int(&args[0], "even?")? % 2 == 0))
}

pub(crate) fn builtin_odd_p(args: &[Expr]) -> Result<Expr> {
    check_arity("odd?", args, 1)?;
    Ok(Expr::Bool(require_int(&args[0], "odd?")? % 2 != 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(ns: &[i64]) -> Vec<Expr> {
        ns.iter().map(|n| Expr::Int(*n)).collect()
    }

    #[test]
    fn test_add_and_overflow() {
        assert_eq!(builtin_add(&[]).unwrap(), Expr::Int(0));
        assert_eq!(builtin_add(&ints(&[1, 2, 3])).unwrap(), Expr::Int(6));
        assert_eq!(
            builtin_add(&[Expr::Int(1), Expr::Float(0.5)]).unwrap(),
            Expr::Float(1.5)
        );
        assert!(builtin_add(&ints(&[i64::MAX, 1])).is_err());
        assert!(builtin_inc(&ints(&[i64::MAX])).is_err());
    }

    #[test]
    fn test_sub_and_negate() {
        assert_eq!(builtin_sub(&ints(&[5])).unwrap(), Expr::Int(-5));
        assert_eq!(builtin_sub(&ints(&[10, 3, 2])).unwrap(), Expr::Int(5));
        assert!(builtin_sub(&ints(&[i64::MIN])).is_err());
    }

    #[test]
    fn test_division() {
        assert_eq!(builtin_div(&ints(&[10, 2])).unwrap(), Expr::Int(5));
        assert_eq!(builtin_div(&ints(&[1, 2])).unwrap(), Expr::Float(0.5));
        assert_eq!(builtin_div(&ints(&[4])).unwrap(), Expr::Float(0.25));
        assert!(builtin_div(&ints(&[1, 0])).is_err());
        assert_eq!(builtin_mod(&ints(&[-7, 3])).unwrap(), Expr::Int(2));
        assert_eq!(builtin_rem(&ints(&[-7, 3])).unwrap(), Expr::Int(-1));
    }

    #[test]
    fn test_comparison() {
        assert_eq!(builtin_lt(&ints(&[1, 2, 3])).unwrap(), Expr::Bool(true));
        assert_eq!(builtin_lt(&ints(&[1, 3, 2])).unwrap(), Expr::Bool(false));
        assert_eq!(
            builtin_num_eq(&[Expr::Int(1), Expr::Float(1.0)]).unwrap(),
            Expr::Bool(true)
        );
        assert!(builtin_lt(&[Expr::Int(1), Expr::string("a")]).is_err());
        assert_eq!(builtin_max(&ints(&[3, 9, 2])).unwrap(), Expr::Int(9));
    }
}

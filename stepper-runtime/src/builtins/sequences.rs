// stepper-runtime - Sequence built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Sequence functions. Everything is eager: results are lists, and an
//! empty result from `seq`, `next` or `nthnext` is nil.

use stepper_parser::Expr;

use super::{Builtin, require_index, require_int, seq_items, seq_or_nil};
use crate::error::{Error, Result, check_arity};
use crate::eval::apply;

pub(super) const BUILTINS: &[(&str, Builtin)] = &[
    ("seq", builtin_seq),
    ("first", builtin_first),
    ("rest", builtin_rest),
    ("next", builtin_next),
    ("last", builtin_last),
    ("nth", builtin_nth),
    ("nthnext", builtin_nthnext),
    ("cons", builtin_cons),
    ("concat", builtin_concat),
    ("empty?", builtin_empty_p),
    ("range", builtin_range),
    ("take", builtin_take),
    ("drop", builtin_drop),
    ("reverse", builtin_reverse),
    ("into", builtin_into),
    ("map", builtin_map),
    ("mapv", builtin_mapv),
    ("filter", builtin_filter),
    ("remove", builtin_remove),
    ("reduce", builtin_reduce),
    ("apply", builtin_apply),
    ("some", builtin_some),
    ("every?", builtin_every_p),
];

fn one_seq(name: &str, args: &[Expr]) -> Result<Vec<Expr>> {
    check_arity(name, args, 1)?;
    seq_items(&args[0], name)
}

// ============================================================================
// Access
// ============================================================================

pub(crate) fn builtin_seq(args: &[Expr]) -> Result<Expr> {
    Ok(seq_or_nil(one_seq("seq", args)?))
}

pub(crate) fn builtin_first(args: &[Expr]) -> Result<Expr> {
    Ok(one_seq("first", args)?.into_iter().next().unwrap_or(Expr::Nil))
}

pub(crate) fn builtin_rest(args: &[Expr]) -> Result<Expr> {
    Ok(Expr::list(one_seq("rest", args)?.into_iter().skip(1).collect()))
}

pub(crate) fn builtin_next(args: &[Expr]) -> Result<Expr> {
    Ok(seq_or_nil(one_seq("next", args)?.into_iter().skip(1).collect()))
}

pub(crate) fn builtin_last(args: &[Expr]) -> Result<Expr> {
    Ok(one_seq("last", args)?.pop().unwrap_or(Expr::Nil))
}

/// (nth coll index default?)
pub(crate) fn builtin_nth(args: &[Expr]) -> Result<Expr> {
    let (coll, index, default) = match args {
        [coll, index] => (coll, index, None),
        [coll, index, default] => (coll, index, Some(default)),
        _ => return Err(Error::arity_range("nth", 2, 3, args.len())),
    };
    let i = require_int(index, "nth")?;
    let items = seq_items(coll, "nth")?;
    let found = usize::try_from(i).ok().and_then(|i| items.into_iter().nth(i));
    match (found, default) {
        (Some(item), _) => Ok(item),
        (None, Some(default)) => Ok(default.clone()),
        (None, None) => Err(Error::Eval(format!("nth: index {} out of bounds", i))),
    }
}

/// (nthnext coll n) - the elements after the first `n`, or nil
pub(crate) fn builtin_nthnext(args: &[Expr]) -> Result<Expr> {
    check_arity("nthnext", args, 2)?;
    let n = require_index(&args[1], "nthnext")?;
    Ok(seq_or_nil(
        seq_items(&args[0], "nthnext")?.into_iter().skip(n).collect(),
    ))
}

pub(crate) fn builtin_empty_p(args: &[Expr]) -> Result<Expr> {
    Ok(Expr::Bool(one_seq("empty?", args)?.is_empty()))
}

// ============================================================================
// Construction
// ============================================================================

pub(crate) fn builtin_cons(args: &[Expr]) -> Result<Expr> {
    check_arity("cons", args, 2)?;
    let mut items = vec![args[0].clone()];
    items.extend(seq_items(&args[1], "cons")?);
    Ok(Expr::list(items))
}

pub(crate) fn builtin_concat(args: &[Expr]) -> Result<Expr> {
    let mut items = Vec::new();
    for arg in args {
        items.extend(seq_items(arg, "concat")?);
    }
    Ok(Expr::list(items))
}

/// (range end), (range start end) or (range start end step)
pub(crate) fn builtin_range(args: &[Expr]) -> Result<Expr> {
    let ints = args
        .iter()
        .map(|a| require_int(a, "range"))
        .collect::<Result<Vec<_>>>()?;
    let (start, end, step) = match ints.as_slice() {
        [end] => (0, *end, 1),
        [start, end] => (*start, *end, 1),
        [start, end, step] => (*start, *end, *step),
        _ => return Err(Error::arity_range("range", 1, 3, args.len())),
    };
    if step == 0 {
        return Err(Error::Eval("range: step must not be zero".into()));
    }
    let mut items = Vec::new();
    let mut i = start;
    while (step > 0 && i < end) || (step < 0 && i > end) {
        items.push(Expr::Int(i));
        i = match i.checked_add(step) {
            Some(next) => next,
            None => break,
        };
    }
    Ok(Expr::list(items))
}

pub(crate) fn builtin_take(args: &[Expr]) -> Result<Expr> {
    check_arity("take", args, 2)?;
    let n = require_int(&args[0], "take")?.max(0);
    let n = usize::try_from(n).unwrap_or(usize::MAX);
    Ok(Expr::list(
        seq_items(&args[1], "take")?.into_iter().take(n).collect(),
    ))
}

pub(crate) fn builtin_drop(args: &[Expr]) -> Result<Expr> {
    check_arity("drop", args, 2)?;
    let n = require_int(&args[0], "drop")?.max(0);
    let n = usize::try_from(n).unwrap_or(usize::MAX);
    Ok(Expr::list(
        seq_items(&args[1], "drop")?.into_iter().skip(n).collect(),
    ))
}

pub(crate) fn builtin_reverse(args: &[Expr]) -> Result<Expr> {
    let mut items = one_seq("reverse", args)?;
    items.reverse();
    Ok(Expr::list(items))
}

/// (into to from) - conj every element of `from` onto `to`
pub(crate) fn builtin_into(args: &[Expr]) -> Result<Expr> {
    check_arity("into", args, 2)?;
    let mut conj_args = vec![args[0].clone()];
    conj_args.extend(seq_items(&args[1], "into")?);
    super::collections::builtin_conj(&conj_args)
}

// ============================================================================
// Higher-order functions
// ============================================================================

/// (map f coll+) - stops at the shortest collection
pub(crate) fn builtin_map(args: &[Expr]) -> Result<Expr> {
    let Some((f, colls)) = args.split_first() else {
        return Err(Error::arity_at_least("map", 2, 0));
    };
    if colls.is_empty() {
        return Err(Error::arity_at_least("map", 2, 1));
    }
    let seqs = colls
        .iter()
        .map(|c| seq_items(c, "map"))
        .collect::<Result<Vec<_>>>()?;
    let len = seqs.iter().map(Vec::len).min().unwrap_or(0);
    let mut result = Vec::with_capacity(len);
    for i in 0..len {
        let call_args: Vec<Expr> = seqs.iter().map(|s| s[i].clone()).collect();
        result.push(apply(f, &call_args)?);
    }
    Ok(Expr::list(result))
}

pub(crate) fn builtin_mapv(args: &[Expr]) -> Result<Expr> {
    match builtin_map(args)? {
        Expr::List(items) => Ok(Expr::Vector(items)),
        other => Ok(other),
    }
}

fn keep_matching(name: &str, args: &[Expr], keep: bool) -> Result<Expr> {
    check_arity(name, args, 2)?;
    let mut result = Vec::new();
    for item in seq_items(&args[1], name)? {
        if apply(&args[0], std::slice::from_ref(&item))?.is_truthy() == keep {
            result.push(item);
        }
    }
    Ok(Expr::list(result))
}

pub(crate) fn builtin_filter(args: &[Expr]) -> Result<Expr> {
    keep_matching("filter", args, true)
}

pub(crate) fn builtin_remove(args: &[Expr]) -> Result<Expr> {
    keep_matching("remove", args, false)
}

/// (reduce f coll) or (reduce f init coll)
pub(crate) fn builtin_reduce(args: &[Expr]) -> Result<Expr> {
    let (f, init, coll) = match args {
        [f, coll] => (f, None, coll),
        [f, init, coll] => (f, Some(init.clone()), coll),
        _ => return Err(Error::arity_range("reduce", 2, 3, args.len())),
    };
    let mut items = seq_items(coll, "reduce")?.into_iter();
    let mut acc = match init {
        Some(init) => init,
        None => match items.next() {
            Some(first) => first,
            None => return apply(f, &[]),
        },
    };
    for item in items {
        acc = apply(f, &[acc, item])?;
    }
    Ok(acc)
}

/// (apply f x* coll)
pub(crate) fn builtin_apply(args: &[Expr]) -> Result<Expr> {
    let [f, middle @ .., last] = args else {
        return Err(Error::arity_at_least("apply", 2, args.len()));
    };
    let mut call_args = middle.to_vec();
    call_args.extend(seq_items(last, "apply")?);
    apply(f, &call_args)
}

/// (some pred coll) - the first truthy `(pred x)`, or nil
pub(crate) fn builtin_some(args: &[Expr]) -> Result<Expr> {
    check_arity("some", args, 2)?;
    for item in seq_items(&args[1], "some")? {
        let result = apply(&args[0], &[item])?;
        if result.is_truthy() {
            return Ok(result);
        }
    }
    Ok(Expr::Nil)
}

pub(crate) fn builtin_every_p(args: &[Expr]) -> Result<Expr> {
    check_arity("every?", args, 2)?;
    for item in seq_items(&args[1], "every?")? {
        if !apply(&args[0], &[item])?.is_truthy() {
            return Ok(Expr::Bool(false));
        }
    }
    Ok(Expr::Bool(true))
}

// stepper-runtime - Atom built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

use stepper_parser::{AtomCell, Expr};

use super::Builtin;
use crate::error::{Error, Result, check_arity};
use crate::eval::apply;

pub(super) const BUILTINS: &[(&str, Builtin)] = &[
    ("atom", builtin_atom),
    ("deref", builtin_deref),
    ("reset!", builtin_reset),
    ("swap!", builtin_swap),
    ("atom?", builtin_atom_p),
];

fn require_atom<'a>(val: &'a Expr, context: &str) -> Result<&'a AtomCell> {
    match val {
        Expr::Atom(cell) => Ok(cell),
        other => Err(Error::type_error_in(
            context.to_string(),
            "atom",
            other.type_name(),
        )),
    }
}

pub(crate) fn builtin_atom(args: &[Expr]) -> Result<Expr> {
    check_arity("atom", args, 1)?;
    Ok(Expr::atom(args[0].clone()))
}

pub(crate) fn builtin_deref(args: &[Expr]) -> Result<Expr> {
    check_arity("deref", args, 1)?;
    Ok(require_atom(&args[0], "deref")?.deref())
}

pub(crate) fn builtin_reset(args: &[Expr]) -> Result<Expr> {
    check_arity("reset!", args, 2)?;
    require_atom(&args[0], "reset!")?.reset(args[1].clone());
    Ok(args[1].clone())
}

/// (swap! atom f args*) - set the atom to `(f @atom args*)`
pub(crate) fn builtin_swap(args: &[Expr]) -> Result<Expr> {
    let [atom, f, extra @ ..] = args else {
        return Err(Error::arity_at_least("swap!", 2, args.len()));
    };
    let cell = require_atom(atom, "swap!")?;
    let mut call_args = vec![cell.deref()];
    call_args.extend(extra.iter().cloned());
    let new_value = apply(f, &call_args)?;
    cell.reset(new_value.clone());
    Ok(new_value)
}

pub(crate) fn builtin_atom_p(args: &[Expr]) -> Result<Expr> {
    check_arity("atom?", args, 1)?;
    Ok(Expr::Bool(matches!(args[0], Expr::Atom(_))))
}

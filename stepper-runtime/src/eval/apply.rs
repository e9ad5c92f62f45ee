// stepper-runtime - Function application
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Applying functions, natives and callable collections.

use std::any::Any;
use std::rc::Rc;

use stepper_parser::{Expr, Lambda, NativeFn};

use super::eval;
use crate::env::Env;
use crate::error::{Error, Result};

/// Type alias for native function signature.
pub type NativeFnImpl = dyn Fn(&[Expr]) -> Result<Expr>;

/// Apply a callable value to already evaluated arguments.
pub fn apply(func: &Expr, args: &[Expr]) -> Result<Expr> {
    match func {
        Expr::Fn(f) => apply_fn(f, args),
        Expr::NativeFn(f) => apply_native(f, args),
        Expr::Keyword(kw) => {
            // (:key map) => (get map :key)
            let (target, default) = lookup_args(&kw.to_string(), args)?;
            match target {
                Expr::Map(map) => Ok(map
                    .get(&Expr::Keyword(kw.clone()))
                    .cloned()
                    .unwrap_or(default)),
                _ => Ok(default),
            }
        }
        Expr::Map(map) => {
            let (key, default) = lookup_args("map", args)?;
            Ok(map.get(key).cloned().unwrap_or(default))
        }
        Expr::Set(set) => {
            let (key, default) = lookup_args("set", args)?;
            Ok(if set.contains(key) { key.clone() } else { default })
        }
        Expr::Vector(items) => {
            let (index, default) = lookup_args("vector", args)?;
            match index {
                Expr::Int(i) => Ok(usize::try_from(*i)
                    .ok()
                    .and_then(|i| items.get(i).cloned())
                    .unwrap_or(default)),
                other => Err(Error::type_error_in(
                    "vector lookup",
                    "integer",
                    other.type_name(),
                )),
            }
        }
        other => Err(Error::NotCallable(other.to_string())),
    }
}

/// Arguments of a collection lookup: the key and an optional default.
fn lookup_args<'a>(name: &str, args: &'a [Expr]) -> Result<(&'a Expr, Expr)> {
    match args {
        [key] => Ok((key, Expr::Nil)),
        [key, default] => Ok((key, default.clone())),
        _ => Err(Error::arity_range(name, 1, 2, args.len())),
    }
}

/// Apply a user-defined function or macro body to its arguments.
pub(crate) fn apply_fn(func: &Lambda, args: &[Expr]) -> Result<Expr> {
    let arity = func.find_arity(args.len()).ok_or_else(|| {
        let accepted: Vec<String> = func
            .arities
            .iter()
            .map(|a| {
                if a.rest.is_some() {
                    format!("{}+", a.params.len())
                } else {
                    a.params.len().to_string()
                }
            })
            .collect();
        Error::Eval(format!(
            "Wrong number of args ({}) passed to {}; expected {}",
            args.len(),
            func.name.as_ref().map_or_else(|| "fn".to_string(), |n| n.to_string()),
            accepted.join(" or ")
        ))
    })?;

    let captured_env = func
        .env
        .downcast_ref::<Env>()
        .ok_or_else(|| Error::Internal("function environment has invalid type".into()))?;
    let fn_env = captured_env.child();

    // Self-reference for named fns
    if let Some(name) = &func.name {
        fn_env.define(name.clone(), Expr::Fn(func.clone()));
    }

    for (param, arg) in arity.params.iter().zip(args.iter()) {
        fn_env.define(param.clone(), arg.clone());
    }
    if let Some(rest) = &arity.rest {
        let extra = &args[arity.params.len()..];
        let rest_val = if extra.is_empty() {
            Expr::Nil
        } else {
            Expr::list(extra.to_vec())
        };
        fn_env.define(rest.clone(), rest_val);
    }

    let mut result = Expr::Nil;
    for expr in &arity.body {
        result = eval(expr, &fn_env)?;
    }
    Ok(result)
}

pub(crate) fn apply_native(func: &NativeFn, args: &[Expr]) -> Result<Expr> {
    let f = func
        .func()
        .downcast_ref::<Rc<NativeFnImpl>>()
        .ok_or_else(|| Error::Internal("native function has invalid type".into()))?;
    f(args)
}

/// Create a native function value.
pub fn make_native_fn(
    name: &'static str,
    func: impl Fn(&[Expr]) -> Result<Expr> + 'static,
) -> NativeFn {
    let func_rc: Rc<NativeFnImpl> = Rc::new(func);
    let func_any: Rc<dyn Any> = Rc::new(func_rc);
    NativeFn::new(name, func_any)
}

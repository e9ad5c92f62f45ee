// stepper-runtime - Functions, definitions and local bindings
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! `fn`, `def`, `defn`, `defmacro` and `let`.
//!
//! Destructuring is handled by the stepper's own pattern binder: a `let`
//! pattern is expanded into plain bindings, and a destructured parameter is
//! replaced by a fresh symbol that the body rebinds with a `let*`.

use std::any::Any;
use std::rc::Rc;

use stepper_core::{Binder, Clause, Definition, StepOptions};
use stepper_parser::{Expr, Lambda, LambdaArity, Symbol};

use super::{eval, eval_body, has_flag};
use crate::env::Env;
use crate::error::{Error, Result};

/// Local destructuring binds every pattern target literally.
const LOCAL_BINDING: StepOptions = StepOptions {
    speculative_eval: false,
    elide_self_bindings: false,
};

// ============================================================================
// let
// ============================================================================

/// (let* [pattern value ...] body*)
pub(super) fn eval_let(args: &[Expr], env: &Env) -> Result<Expr> {
    let Some((Expr::Vector(pairs), body)) = args.split_first() else {
        return Err(Error::syntax("let", "requires a binding vector"));
    };
    if pairs.len() % 2 != 0 {
        return Err(Error::syntax(
            "let",
            "binding vector requires an even number of forms",
        ));
    }

    let local = env.child();
    let mut binder = Binder::new(&LOCAL_BINDING);
    for form in pairs.iter().chain(body) {
        binder.reserve(form);
    }
    let mut done = 0;
    let pairs: Vec<&Expr> = pairs.iter().collect();
    for pair in pairs.chunks(2) {
        let (pattern, value) = (pair[0], pair[1]);
        if let Expr::Symbol(sym) = pattern
            && !sym.has_namespace()
        {
            let val = eval(value, &local)?;
            local.define(sym.clone(), val);
            continue;
        }
        binder
            .bind(pattern, value.clone())
            .map_err(|e| Error::syntax("let", e.to_string()))?;
        for binding in &binder.bindings()[done..] {
            let val = eval(&binding.value, &local)?;
            local.define(binding.name.clone(), val);
        }
        done = binder.bindings().len();
    }

    eval_body(body, &local)
}

// ============================================================================
// fn
// ============================================================================

/// (fn name? [params] body*) and the multi-clause form
pub(super) fn eval_fn(form: &Expr, env: &Env) -> Result<Expr> {
    let definition = Definition::parse(form).map_err(|e| Error::syntax("fn", e.to_string()))?;
    Ok(Expr::Fn(make_lambda(definition.name.clone(), &definition.clauses, env)?))
}

fn make_lambda(name: Option<Symbol>, clauses: &[Clause], env: &Env) -> Result<Lambda> {
    let arities = clauses
        .iter()
        .map(lambda_arity)
        .collect::<Result<Vec<_>>>()?;
    let captured: Rc<dyn Any> = Rc::new(env.clone());
    Ok(Lambda::new(name, arities, captured))
}

/// Turn a clause into plain parameters plus a body that destructures them.
fn lambda_arity(clause: &Clause) -> Result<LambdaArity> {
    let items = clause.param_items();
    let mut params = Vec::new();
    let mut rest = None;
    let mut patterns: Vec<Expr> = Vec::new();

    let mut iter = items.iter();
    while let Some(item) = iter.next() {
        if item.is_symbol_named("&") {
            let target = iter
                .next()
                .ok_or_else(|| Error::syntax("fn", "& must be followed by a binding"))?;
            if iter.next().is_some() {
                return Err(Error::syntax("fn", "only one binding may follow &"));
            }
            rest = Some(plain_param(target, &mut patterns, true)?);
            break;
        }
        params.push(plain_param(item, &mut patterns, false)?);
    }

    let mut body = clause.checked_body();
    if !patterns.is_empty() {
        let mut form = vec![Expr::sym("let*"), Expr::vector(patterns)];
        form.extend(body);
        body = vec![Expr::list(form)];
    }
    Ok(LambdaArity::new(params, rest, body))
}

/// A symbol parameter as-is; a pattern is replaced by `arg__N` and queued
/// for destructuring in the body.
fn plain_param(target: &Expr, patterns: &mut Vec<Expr>, is_rest: bool) -> Result<Symbol> {
    match target {
        Expr::Symbol(sym) if !sym.has_namespace() => Ok(sym.clone()),
        Expr::Vector(_) | Expr::Map(_) => {
            let sym = Symbol::new(&format!("arg__{}", patterns.len() / 2));
            let arg = Expr::Symbol(sym.clone());
            // Keyword arguments: pour the rest sequence into a map
            let value = if is_rest && matches!(target, Expr::Map(_)) {
                Expr::list(vec![
                    Expr::sym("if"),
                    Expr::list(vec![Expr::sym("seq?"), arg.clone()]),
                    Expr::list(vec![Expr::sym("apply"), Expr::sym("hash-map"), arg.clone()]),
                    arg,
                ])
            } else {
                arg
            };
            patterns.push(target.clone());
            patterns.push(value);
            Ok(sym)
        }
        other => Err(Error::syntax(
            "fn",
            format!("invalid parameter {}", other),
        )),
    }
}

// ============================================================================
// def, defn, defmacro
// ============================================================================

/// The defined name and its reader metadata map, looking through
/// `(with-meta name m)`.
fn def_target(form: &Expr) -> Option<(Symbol, Option<Expr>)> {
    match form {
        Expr::Symbol(sym) if !sym.has_namespace() => Some((sym.clone(), None)),
        Expr::List(items) if form.is_call_to("with-meta") && items.len() == 3 => {
            let (sym, _) = def_target(&items[1])?;
            Some((sym, items.get(2).cloned()))
        }
        _ => None,
    }
}

/// (def name doc? value?)
pub(super) fn eval_def(args: &[Expr], env: &Env) -> Result<Expr> {
    let (target, doc, init) = match args {
        [target] => (target, None, None),
        [target, init] => (target, None, Some(init)),
        [target, Expr::String(doc), init] => (target, Some(doc.to_string()), Some(init)),
        _ => return Err(Error::syntax("def", "expected (def name doc? value?)")),
    };
    let (name, meta) =
        def_target(target).ok_or_else(|| Error::syntax("def", "name must be a symbol"))?;

    let var = env.registry()?.current().intern(name.name());
    if let Some(init) = init {
        let value = eval(init, env)?;
        var.set(value);
    }
    var.update_meta(|m| {
        m.doc = doc;
        m.private = meta.as_ref().is_some_and(|meta| has_flag(meta, "private"));
    });
    Ok(Expr::Symbol(var.symbol()))
}

/// (defn name doc? attr-map? clauses...), also defn- and defmacro
pub(super) fn eval_defn(form: &Expr, env: &Env) -> Result<Expr> {
    let head = form.head_symbol().map(|s| s.name().to_string()).unwrap_or_default();
    let definition =
        Definition::parse(form).map_err(|e| Error::Syntax {
            form: if head == "defmacro" { "defmacro" } else { "defn" },
            message: e.to_string(),
        })?;
    let name = definition
        .name
        .clone()
        .ok_or_else(|| Error::syntax("defn", "name must be a symbol"))?;

    let private = head == "defn-"
        || form
            .as_items()
            .and_then(|items| items.get(1))
            .and_then(def_target)
            .and_then(|(_, meta)| meta)
            .is_some_and(|meta| has_flag(&meta, "private"))
        || definition
            .attr_map
            .as_ref()
            .is_some_and(|attrs| has_flag(attrs, "private"));

    let lambda = make_lambda(Some(name.clone()), &definition.clauses, env)?;
    let value = if definition.is_macro() {
        Expr::Macro(lambda)
    } else {
        Expr::Fn(lambda)
    };

    let var = env.registry()?.current().intern_with_value(name.name(), value);
    var.update_meta(|m| {
        m.doc = definition.doc.clone();
        m.arglists = Some(Expr::list(
            definition.clauses.iter().map(|c| c.params.clone()).collect(),
        ));
        m.is_macro = definition.is_macro();
        m.private = private;
    });
    Ok(Expr::Symbol(var.symbol()))
}

// ============================================================================
// Tests
// ============================================================================

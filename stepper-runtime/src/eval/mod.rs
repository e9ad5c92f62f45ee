// stepper-runtime - AST-walking evaluator
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! AST-walking evaluator for [`Expr`] trees.

pub mod apply;
mod functions;
mod namespaces;
mod syntax_quote;

pub use apply::{NativeFnImpl, apply, make_native_fn};
pub use syntax_quote::gensym;

use std::cell::Cell;

use stepper_parser::{Expr, Keyword, Symbol, Vector};

use crate::env::Env;
use crate::error::{Error, Result};
use crate::options::DEFAULT_MAX_EVAL_DEPTH;
use apply::apply_fn;

// ============================================================================
// Stack Overflow Protection
// ============================================================================

thread_local! {
    static EVAL_DEPTH: Cell<usize> = const { Cell::new(0) };
    static MAX_EVAL_DEPTH: Cell<usize> = const { Cell::new(DEFAULT_MAX_EVAL_DEPTH) };
}

/// Set the maximum eval recursion depth. Returns the previous value.
pub fn set_max_eval_depth(depth: usize) -> usize {
    MAX_EVAL_DEPTH.with(|d| d.replace(depth))
}

#[must_use]
pub fn get_max_eval_depth() -> usize {
    MAX_EVAL_DEPTH.with(|d| d.get())
}

#[must_use]
pub fn get_eval_depth() -> usize {
    EVAL_DEPTH.with(|d| d.get())
}

/// RAII guard for the eval depth counter.
struct EvalDepthGuard;

impl EvalDepthGuard {
    fn new() -> Result<Self> {
        let (current, max) = EVAL_DEPTH.with(|d| {
            let current = d.get() + 1;
            d.set(current);
            (current, get_max_eval_depth())
        });
        if current > max {
            EVAL_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
            Err(Error::Eval(format!(
                "Stack overflow: maximum recursion depth ({}) exceeded",
                max
            )))
        } else {
            Ok(EvalDepthGuard)
        }
    }
}

impl Drop for EvalDepthGuard {
    fn drop(&mut self) {
        EVAL_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

// ============================================================================
// Evaluation
// ============================================================================

/// Forms the evaluator handles itself rather than through a var.
pub const EVALUATOR_FORMS: &[&str] = &[
    "quote",
    "syntax-quote",
    "if",
    "do",
    "let",
    "let*",
    "fn",
    "fn*",
    "def",
    "defn",
    "defn-",
    "defmacro",
    "when",
    "and",
    "or",
    "ns",
    "in-ns",
    "var",
    "throw",
    "macroexpand-1",
    stepper_parser::READ_EVAL,
];

/// Evaluate an expression in the given environment.
///
/// ```
/// use stepper_runtime::Runtime;
///
/// let runtime = Runtime::new().unwrap();
/// assert_eq!(runtime.eval_str("(+ 1 (* 2 3))").unwrap().to_string(), "7");
/// ```
#[must_use = "eval returns a value that should be used"]
pub fn eval(expr: &Expr, env: &Env) -> Result<Expr> {
    let _guard = EvalDepthGuard::new()?;

    match expr {
        Expr::Symbol(sym) => eval_symbol(sym, env),
        Expr::List(items) => eval_list(expr, items, env),
        Expr::Vector(items) => {
            let evaluated: Result<Vector<Expr>> = items.iter().map(|e| eval(e, env)).collect();
            Ok(Expr::Vector(evaluated?))
        }
        Expr::Map(map) => {
            let mut result = Vec::with_capacity(map.len());
            for (k, v) in map.iter() {
                result.push((eval(k, env)?, eval(v, env)?));
            }
            Ok(Expr::map(result))
        }
        Expr::Set(items) => {
            let evaluated: Result<Vec<Expr>> = items.iter().map(|e| eval(e, env)).collect();
            Ok(Expr::set(evaluated?))
        }
        // Everything else is self-evaluating
        _ => Ok(expr.clone()),
    }
}

/// Evaluate each form in turn, returning the last value.
pub fn eval_body(body: &[Expr], env: &Env) -> Result<Expr> {
    let mut result = Expr::Nil;
    for expr in body {
        result = eval(expr, env)?;
    }
    Ok(result)
}

/// Locals first, then vars visible from the current namespace.
fn eval_symbol(sym: &Symbol, env: &Env) -> Result<Expr> {
    if !sym.has_namespace()
        && let Some(val) = env.lookup(sym)
    {
        return Ok(val);
    }
    env.registry()?
        .resolve(sym)
        .map(|var| var.get())
        .ok_or_else(|| Error::UndefinedSymbol(sym.clone()))
}

/// Evaluate a list form (special form, macro call or function call).
fn eval_list(form: &Expr, items: &Vector<Expr>, env: &Env) -> Result<Expr> {
    if items.is_empty() {
        return Ok(form.clone());
    }
    let items: Vec<Expr> = items.iter().cloned().collect();
    let args = &items[1..];

    if let Expr::Symbol(sym) = &items[0]
        && !sym.has_namespace()
    {
        match sym.name() {
            "quote" => return eval_quote(args),
            "syntax-quote" => return syntax_quote::eval_syntax_quote(args, env),
            "if" => return eval_if(args, env),
            "do" => return eval_body(args, env),
            "let" | "let*" => return functions::eval_let(args, env),
            "fn" | "fn*" => return functions::eval_fn(form, env),
            "def" => return functions::eval_def(args, env),
            "defn" | "defn-" | "defmacro" => return functions::eval_defn(form, env),
            "when" => return eval_when(args, env),
            "and" => return eval_and(args, env),
            "or" => return eval_or(args, env),
            "ns" => return namespaces::eval_ns(args, env),
            "in-ns" => return namespaces::eval_in_ns(args, env),
            "var" => return namespaces::eval_var(args, env),
            "throw" => return eval_throw(args, env),
            "macroexpand-1" => return eval_macroexpand_1(args, env),
            stepper_parser::READ_EVAL => return eval_read_eval(args, env),
            _ => {}
        }
    }

    let op = eval(&items[0], env)?;
    if let Expr::Macro(m) = &op {
        let expanded = apply_fn(m, args)?;
        return eval(&expanded, env);
    }

    let evaluated: Result<Vec<Expr>> = args.iter().map(|e| eval(e, env)).collect();
    apply(&op, &evaluated?)
}

// ============================================================================
// Special Forms
// ============================================================================

/// (quote form)
fn eval_quote(args: &[Expr]) -> Result<Expr> {
    match args {
        [form] => Ok(form.clone()),
        _ => Err(Error::syntax("quote", "requires exactly 1 argument")),
    }
}

/// (if test then else?)
fn eval_if(args: &[Expr], env: &Env) -> Result<Expr> {
    let (test, then, otherwise) = match args {
        [test, then] => (test, then, None),
        [test, then, otherwise] => (test, then, Some(otherwise)),
        _ => return Err(Error::syntax("if", "requires 2 or 3 arguments")),
    };
    if eval(test, env)?.is_truthy() {
        eval(then, env)
    } else {
        otherwise.map_or(Ok(Expr::Nil), |e| eval(e, env))
    }
}

/// (when test body*)
fn eval_when(args: &[Expr], env: &Env) -> Result<Expr> {
    let Some((test, body)) = args.split_first() else {
        return Err(Error::syntax("when", "requires a test"));
    };
    if eval(test, env)?.is_truthy() {
        eval_body(body, env)
    } else {
        Ok(Expr::Nil)
    }
}

/// (and form*) - first falsy value, or the last value
fn eval_and(args: &[Expr], env: &Env) -> Result<Expr> {
    let mut result = Expr::Bool(true);
    for arg in args {
        result = eval(arg, env)?;
        if !result.is_truthy() {
            break;
        }
    }
    Ok(result)
}

/// (or form*) - first truthy value, or the last value
fn eval_or(args: &[Expr], env: &Env) -> Result<Expr> {
    let mut result = Expr::Nil;
    for arg in args {
        result = eval(arg, env)?;
        if result.is_truthy() {
            break;
        }
    }
    Ok(result)
}

/// (throw value)
fn eval_throw(args: &[Expr], env: &Env) -> Result<Expr> {
    match args {
        [value] => Err(Error::Thrown(eval(value, env)?)),
        _ => Err(Error::syntax("throw", "requires exactly 1 argument")),
    }
}

/// (macroexpand-1 form) - expand a macro call once, leaving other forms alone
fn eval_macroexpand_1(args: &[Expr], env: &Env) -> Result<Expr> {
    let [form] = args else {
        return Err(Error::syntax("macroexpand-1", "requires exactly 1 argument"));
    };
    let form = eval(form, env)?;
    let Expr::List(items) = &form else {
        return Ok(form);
    };
    let Some(Expr::Symbol(head)) = items.front() else {
        return Ok(form);
    };
    if (head.has_namespace() || env.lookup(head).is_none())
        && let Some(var) = env.registry()?.resolve(head)
        && let Expr::Macro(m) = var.get()
    {
        let args: Vec<Expr> = items.iter().skip(1).cloned().collect();
        return apply_fn(&m, &args);
    }
    Ok(form)
}

/// (read-eval* form) - the reader's expansion of `#=form`
fn eval_read_eval(args: &[Expr], env: &Env) -> Result<Expr> {
    match args {
        [form] => eval(form, env),
        _ => Err(Error::syntax("read-eval*", "requires exactly 1 argument")),
    }
}

/// True if `map` holds `key` with a truthy value.
pub(crate) fn has_flag(map: &Expr, key: &str) -> bool {
    match map {
        Expr::Map(m) => m
            .get(&Expr::Keyword(Keyword::new(key)))
            .is_some_and(Expr::is_truthy),
        _ => false,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Runtime;

    fn run(src: &str) -> Result<Expr> {
        Runtime::new()?.eval_str(src)
    }

    fn show(src: &str) -> String {
        run(src).unwrap().to_string()
    }

    #[test]
    fn test_self_evaluating() {
        assert_eq!(show("42"), "42");
        assert_eq!(show("\"hi\""), "\"hi\"");
        assert_eq!(show(":k"), ":k");
        assert_eq!(show("[1 (+ 1 1)]"), "[1 2]");
        assert_eq!(show("{:a (+ 1 1)}"), "{:a 2}");
        assert_eq!(show("()"), "()");
    }

    #[test]
    fn test_if_when_and_or() {
        assert_eq!(show("(if nil 1 2)"), "2");
        assert_eq!(show("(if false 1)"), "nil");
        assert_eq!(show("(when true 1 2)"), "2");
        assert_eq!(show("(and 1 nil 2)"), "nil");
        assert_eq!(show("(and)"), "true");
        assert_eq!(show("(or nil false 3)"), "3");
        assert_eq!(show("(or)"), "nil");
    }

    #[test]
    fn test_quote_and_throw() {
        assert_eq!(show("'(a b)"), "(a b)");
        let err = run("(throw \"boom\")").unwrap_err();
        assert_eq!(err.kind(), "Thrown");
        assert!(matches!(run("(quote)"), Err(Error::Syntax { form: "quote", .. })));
    }

    #[test]
    fn test_undefined_symbol() {
        assert!(matches!(run("nope"), Err(Error::UndefinedSymbol(_))));
    }

    #[test]
    fn test_read_eval_marker() {
        assert_eq!(show("#=(+ 1 2)"), "3");
    }

    #[test]
    fn test_depth_limit() {
        let runtime = Runtime::with_options(
            crate::RuntimeOptions::DEFAULT.with_max_eval_depth(200),
        )
        .unwrap();
        runtime.eval_str("(defn down [n] (if (= n 0) 0 (down (- n 1))))").unwrap();
        assert_eq!(runtime.eval_str("(down 5)").unwrap(), Expr::Int(0));
        let err = runtime.eval_str("(down 1000)").unwrap_err();
        assert!(err.to_string().contains("Stack overflow"));
        assert_eq!(get_eval_depth(), 0);
    }
}

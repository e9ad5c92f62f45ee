// stepper-runtime - Syntax quote
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! `` `form `` with `~x` unquote, `~@xs` splicing and `x#` auto-gensyms.
//!
//! Symbols are left unqualified, so macro expansions print the way they
//! were written.

use std::cell::Cell;
use std::collections::HashMap;

use stepper_parser::{Expr, Symbol};

use super::eval;
use crate::env::Env;
use crate::error::{Error, Result};

thread_local! {
    static GENSYM_COUNTER: Cell<u64> = const { Cell::new(0) };
}

fn next_id() -> u64 {
    GENSYM_COUNTER.with(|c| {
        let id = c.get();
        c.set(id + 1);
        id
    })
}

/// A fresh symbol `prefix__N`, unique for this thread.
pub fn gensym(prefix: &str) -> Symbol {
    Symbol::new(&format!("{}__{}", prefix, next_id()))
}

/// (syntax-quote form)
pub(super) fn eval_syntax_quote(args: &[Expr], env: &Env) -> Result<Expr> {
    let [form] = args else {
        return Err(Error::syntax("syntax-quote", "requires exactly 1 argument"));
    };
    // One name per `x#` across the whole template
    let mut gensyms: HashMap<String, Symbol> = HashMap::new();
    process(form, env, &mut gensyms)
}

fn process(form: &Expr, env: &Env, gensyms: &mut HashMap<String, Symbol>) -> Result<Expr> {
    match form {
        Expr::List(items) => {
            if form.is_call_to("unquote") {
                return match items.get(1) {
                    Some(inner) if items.len() == 2 => eval(inner, env),
                    _ => Err(Error::syntax("unquote", "requires exactly 1 argument")),
                };
            }
            if form.is_call_to("unquote-splicing") {
                return Err(Error::syntax(
                    "unquote-splicing",
                    "can only be used inside a list or vector",
                ));
            }
            Ok(Expr::list(process_items(items.iter(), env, gensyms)?))
        }
        Expr::Vector(items) => Ok(Expr::vector(process_items(items.iter(), env, gensyms)?)),
        Expr::Map(map) => {
            let mut result = Vec::with_capacity(map.len());
            for (k, v) in map.iter() {
                result.push((process(k, env, gensyms)?, process(v, env, gensyms)?));
            }
            Ok(Expr::map(result))
        }
        Expr::Set(set) => {
            let result = set
                .iter()
                .map(|item| process(item, env, gensyms))
                .collect::<Result<Vec<_>>>()?;
            Ok(Expr::set(result))
        }
        Expr::Symbol(sym) if !sym.has_namespace() && sym.name().len() > 1 && sym.name().ends_with('#') => {
            let name = sym.name();
            let gensym = gensyms.entry(name.to_string()).or_insert_with(|| {
                let base = &name[..name.len() - 1];
                Symbol::new(&format!("{}__auto__{}", base, next_id()))
            });
            Ok(Expr::Symbol(gensym.clone()))
        }
        other => Ok(other.clone()),
    }
}

/// Process sequence elements, splicing `~@` forms in place.
fn process_items<'a>(
    items: impl Iterator<Item = &'a Expr>,
    env: &Env,
    gensyms: &mut HashMap<String, Symbol>,
) -> Result<Vec<Expr>> {
    let mut result = Vec::new();
    for item in items {
        if !item.is_call_to("unquote-splicing") {
            result.push(process(item, env, gensyms)?);
            continue;
        }
        let inner = match item.as_items() {
            Some(inner) if inner.len() == 2 => &inner[1],
            _ => {
                return Err(Error::syntax(
                    "unquote-splicing",
                    "requires exactly 1 argument",
                ));
            }
        };
        match eval(inner, env)? {
            Expr::List(l) | Expr::Vector(l) => result.extend(l.iter().cloned()),
            Expr::Nil => {}
            other => {
                return Err(Error::syntax(
                    "unquote-splicing",
                    format!("expected sequence, got {}", other.type_name()),
                ));
            }
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use crate::Runtime;

    fn show(src: &str) -> String {
        Runtime::new().unwrap().load_str(src, "test.clj").unwrap().to_string()
    }

    #[test]
    fn test_unquote_and_splice() {
        assert_eq!(show("(let [x 1 ys [2 3]] `(a ~x ~@ys))"), "(a 1 2 3)");
        assert_eq!(show("(let [ys nil] `[~@ys b])"), "[b]");
        assert_eq!(show("`{:k ~(+ 1 1)}"), "{:k 2}");
    }

    #[test]
    fn test_auto_gensym_is_consistent() {
        let out = show("`(let [v# 1] v#)");
        let items: Vec<&str> = out.trim_matches(|c| c == '(' || c == ')').split(' ').collect();
        assert!(items[1].starts_with("[v__auto__"));
        assert_eq!(items[1].trim_start_matches('['), items[3]);
    }

    #[test]
    fn test_splice_outside_sequence() {
        let runtime = Runtime::new().unwrap();
        assert!(runtime.eval_str("`~@[1]").is_err());
    }

    #[test]
    fn test_gensym_unique() {
        assert_ne!(super::gensym("g"), super::gensym("g"));
    }
}

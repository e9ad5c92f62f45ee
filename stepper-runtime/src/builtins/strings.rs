// stepper-runtime - String, symbol and keyword functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

use stepper_parser::{Expr, Keyword, Symbol};

use super::{Builtin, require_index};
use crate::error::{Error, Result, check_arity};
use crate::eval::gensym;

pub(super) const BUILTINS: &[(&str, Builtin)] = &[
    ("str", builtin_str),
    ("subs", builtin_subs),
    ("name", builtin_name),
    ("namespace", builtin_namespace),
    ("keyword", builtin_keyword),
    ("symbol", builtin_symbol),
    ("gensym", builtin_gensym),
];

/// Human-readable text of a value: strings and chars unquoted, nil empty.
pub(crate) fn display_str(val: &Expr) -> String {
    match val {
        Expr::Nil => String::new(),
        Expr::String(s) => s.to_string(),
        Expr::Char(c) => c.to_string(),
        other => other.to_string(),
    }
}

fn require_str<'a>(val: &'a Expr, context: &str) -> Result<&'a str> {
    val.as_str().ok_or_else(|| {
        Error::type_error_in(context.to_string(), "string", val.type_name())
    })
}

pub(crate) fn builtin_str(args: &[Expr]) -> Result<Expr> {
    Ok(Expr::string(args.iter().map(display_str).collect::<String>()))
}

/// (subs s start end?) over character positions
pub(crate) fn builtin_subs(args: &[Expr]) -> Result<Expr> {
    let (s, start, end) = match args {
        [s, start] => (s, start, None),
        [s, start, end] => (s, start, Some(end)),
        _ => return Err(Error::arity_range("subs", 2, 3, args.len())),
    };
    let chars: Vec<char> = require_str(s, "subs")?.chars().collect();
    let start = require_index(start, "subs")?;
    let end = match end {
        Some(end) => require_index(end, "subs")?,
        None => chars.len(),
    };
    if start > end || end > chars.len() {
        return Err(Error::Eval(format!(
            "subs: range {}..{} out of bounds for length {}",
            start,
            end,
            chars.len()
        )));
    }
    Ok(Expr::string(chars[start..end].iter().collect::<String>()))
}

pub(crate) fn builtin_name(args: &[Expr]) -> Result<Expr> {
    check_arity("name", args, 1)?;
    match &args[0] {
        Expr::String(s) => Ok(Expr::String(s.clone())),
        Expr::Symbol(sym) => Ok(Expr::string(sym.name())),
        Expr::Keyword(kw) => Ok(Expr::string(kw.name())),
        other => Err(Error::type_error_in(
            "name",
            "string, symbol or keyword",
            other.type_name(),
        )),
    }
}

pub(crate) fn builtin_namespace(args: &[Expr]) -> Result<Expr> {
    check_arity("namespace", args, 1)?;
    let ns = match &args[0] {
        Expr::Symbol(sym) => sym.namespace(),
        Expr::Keyword(kw) => kw.namespace(),
        other => {
            return Err(Error::type_error_in(
                "namespace",
                "symbol or keyword",
                other.type_name(),
            ));
        }
    };
    Ok(ns.map_or(Expr::Nil, Expr::string))
}

pub(crate) fn builtin_keyword(args: &[Expr]) -> Result<Expr> {
    match args {
        [Expr::Keyword(kw)] => Ok(Expr::Keyword(kw.clone())),
        [Expr::Symbol(sym)] => Ok(Expr::Keyword(Keyword::from_symbol(sym))),
        [Expr::String(s)] => Ok(Expr::Keyword(Keyword::parse(s))),
        [ns, name] => Ok(Expr::Keyword(Keyword::with_namespace(
            require_str(ns, "keyword")?,
            require_str(name, "keyword")?,
        ))),
        [other] => Err(Error::type_error_in(
            "keyword",
            "string, symbol or keyword",
            other.type_name(),
        )),
        _ => Err(Error::arity_range("keyword", 1, 2, args.len())),
    }
}

pub(crate) fn builtin_symbol(args: &[Expr]) -> Result<Expr> {
    match args {
        [Expr::Symbol(sym)] => Ok(Expr::Symbol(sym.clone())),
        [Expr::String(s)] => Ok(Expr::Symbol(Symbol::parse(s))),
        [Expr::Keyword(kw)] => Ok(Expr::Symbol(match kw.namespace() {
            Some(ns) => Symbol::with_namespace(ns, kw.name()),
            None => Symbol::new(kw.name()),
        })),
        [ns, name] => Ok(Expr::Symbol(Symbol::with_namespace(
            require_str(ns, "symbol")?,
            require_str(name, "symbol")?,
        ))),
        [other] => Err(Error::type_error_in(
            "symbol",
            "string, symbol or keyword",
            other.type_name(),
        )),
        _ => Err(Error::arity_range("symbol", 1, 2, args.len())),
    }
}

/// (gensym prefix?)
pub(crate) fn builtin_gensym(args: &[Expr]) -> Result<Expr> {
    let prefix = match args {
        [] => "G",
        [prefix] => require_str(prefix, "gensym")?,
        _ => return Err(Error::arity_range("gensym", 0, 1, args.len())),
    };
    Ok(Expr::Symbol(gensym(prefix)))
}

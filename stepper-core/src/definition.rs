// stepper-core - Definition parsing
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Recognising the shape of a callee's defining form.
//!
//! Accepted shapes:
//!
//! ```text
//! (defn name doc? attr-map? [params] cond-map? body*)
//! (defn name doc? attr-map? ([params] cond-map? body*)+ attr-map?)
//! (defn- ...) (defmacro ...)      ; same shapes
//! (fn name? [params] body*)       ; also fn* and the multi-clause form
//! (def name doc? (fn ...))
//! ```

use stepper_parser::{Expr, Symbol, Vector};

use crate::arity::Arity;
use crate::error::{Error, Result};

/// Whether a definition's arguments are evaluated before binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefKind {
    Function,
    /// Receives its argument forms unevaluated
    Macro,
}

/// One arity alternative: a parameter vector and its body.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    /// The parameter vector, e.g. `[a [b c] & {:keys [d]}]`
    pub params: Expr,
    /// `{:pre [...] :post [...]}` map, if the clause declares one
    pub conditions: Option<Expr>,
    pub body: Vec<Expr>,
}

impl Clause {
    pub fn new(params: Expr, body: Vec<Expr>) -> Self {
        Clause {
            params,
            conditions: None,
            body,
        }
    }

    /// Items of the parameter vector.
    pub fn param_items(&self) -> Vec<Expr> {
        self.params
            .as_items()
            .map(|items| items.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn arity(&self) -> Arity {
        Arity::of(&self.param_items())
    }

    /// Assertions for the `:pre` conditions, in order.
    pub fn pre_checks(&self) -> Vec<Expr> {
        self.checks("pre")
    }

    /// The body with its `:pre` checks in front and its `:post` checks
    /// applied to the result, bound to `%`.
    ///
    /// ```text
    /// {:pre [(pos? n)] :post [(even? %)]} body
    ///   =>  (if (pos? n) nil (throw ...))
    ///       (let* [% (do body)] (if (even? %) nil (throw ...)) %)
    /// ```
    pub fn checked_body(&self) -> Vec<Expr> {
        let mut body = self.pre_checks();
        let post = self.checks("post");
        if post.is_empty() {
            body.extend(self.body.iter().cloned());
            return body;
        }

        let mut result = vec![Expr::sym("do")];
        result.extend(self.body.iter().cloned());
        let mut form = vec![
            Expr::sym("let*"),
            Expr::vector(vec![Expr::sym("%"), Expr::list(result)]),
        ];
        form.extend(post);
        form.push(Expr::sym("%"));
        body.push(Expr::list(form));
        body
    }

    fn checks(&self, key: &str) -> Vec<Expr> {
        let Some(Expr::Map(conditions)) = &self.conditions else {
            return Vec::new();
        };
        conditions
            .get(&Expr::kw(key))
            .and_then(Expr::as_items)
            .map(|items| items.iter().map(assertion).collect())
            .unwrap_or_default()
    }
}

/// `(if check nil (throw (str "Assert failed: " 'check)))`
fn assertion(check: &Expr) -> Expr {
    Expr::list(vec![
        Expr::sym("if"),
        check.clone(),
        Expr::Nil,
        Expr::list(vec![
            Expr::sym("throw"),
            Expr::list(vec![
                Expr::sym("str"),
                Expr::string("Assert failed: "),
                check.clone().quoted(),
            ]),
        ]),
    ])
}

/// The resolved shape of a callee.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    /// `None` for an anonymous `fn`
    pub name: Option<Symbol>,
    pub kind: DefKind,
    pub doc: Option<String>,
    pub attr_map: Option<Expr>,
    pub clauses: Vec<Clause>,
}

impl Definition {
    /// Parse a defining form.
    pub fn parse(form: &Expr) -> Result<Definition> {
        let items = match form {
            Expr::List(items) if !items.is_empty() => items,
            other => {
                return Err(Error::malformed(
                    other.to_string(),
                    "expected a defn, defmacro, fn or def form",
                ));
            }
        };
        let head = items
            .front()
            .and_then(Expr::as_symbol)
            .map(|sym| sym.name().to_string())
            .unwrap_or_default();

        match head.as_str() {
            "defn" | "defn-" => parse_named(items, DefKind::Function),
            "defmacro" => parse_named(items, DefKind::Macro),
            "fn" | "fn*" => parse_fn(items),
            "def" => parse_def(items),
            _ => Err(Error::malformed(
                form_name(items),
                format!("expected defn, defn-, defmacro, fn or def, found ({} ...)", head),
            )),
        }
    }

    pub fn is_macro(&self) -> bool {
        self.kind == DefKind::Macro
    }

    /// Name for messages: the defined name, or `fn`.
    pub fn display_name(&self) -> String {
        self.name
            .as_ref()
            .map_or_else(|| "fn".to_string(), Symbol::to_string)
    }
}

fn form_name(items: &Vector<Expr>) -> String {
    items
        .get(1)
        .and_then(definition_name)
        .map_or_else(|| "<unknown>".to_string(), |sym| sym.to_string())
}

/// The name of a definition, looking through `(with-meta name m)`.
fn definition_name(form: &Expr) -> Option<Symbol> {
    match form {
        Expr::Symbol(sym) => Some(sym.clone()),
        Expr::List(items) if form.is_call_to("with-meta") => {
            items.get(1).and_then(definition_name)
        }
        _ => None,
    }
}

fn parse_named(items: &Vector<Expr>, kind: DefKind) -> Result<Definition> {
    let name = items
        .get(1)
        .and_then(definition_name)
        .ok_or_else(|| Error::malformed("<unknown>", "definition name must be a symbol"))?;
    let display = name.to_string();
    let mut rest: Vec<Expr> = items.iter().skip(2).cloned().collect();

    let doc = match rest.first() {
        Some(Expr::String(s)) if rest.len() > 1 => {
            let doc = s.to_string();
            rest.remove(0);
            Some(doc)
        }
        _ => None,
    };
    let attr_map = match rest.first() {
        Some(map @ Expr::Map(_)) if rest.len() > 1 => {
            let map = map.clone();
            rest.remove(0);
            Some(map)
        }
        _ => None,
    };

    let clauses = parse_clauses(&display, rest)?;
    Ok(Definition {
        name: Some(name),
        kind,
        doc,
        attr_map,
        clauses,
    })
}

fn parse_fn(items: &Vector<Expr>) -> Result<Definition> {
    let mut rest: Vec<Expr> = items.iter().skip(1).cloned().collect();
    let name = match rest.first() {
        Some(Expr::Symbol(sym)) => {
            let sym = sym.clone();
            rest.remove(0);
            Some(sym)
        }
        _ => None,
    };
    let display = name.as_ref().map_or_else(|| "fn".to_string(), Symbol::to_string);
    let clauses = parse_clauses(&display, rest)?;
    Ok(Definition {
        name,
        kind: DefKind::Function,
        doc: None,
        attr_map: None,
        clauses,
    })
}

fn parse_def(items: &Vector<Expr>) -> Result<Definition> {
    let name = items
        .get(1)
        .and_then(definition_name)
        .ok_or_else(|| Error::malformed("<unknown>", "def name must be a symbol"))?;
    let (doc, init) = match (items.get(2), items.get(3)) {
        (Some(Expr::String(doc)), Some(init)) => (Some(doc.to_string()), init),
        (Some(init), None) => (None, init),
        _ => {
            return Err(Error::malformed(
                name.to_string(),
                "def must have an initial value",
            ));
        }
    };
    if !(init.is_call_to("fn") || init.is_call_to("fn*")) {
        return Err(Error::malformed(
            name.to_string(),
            format!("value is not a function literal: {}", init),
        ));
    }
    let mut def = Definition::parse(init)?;
    def.name = Some(name);
    def.doc = doc;
    Ok(def)
}

fn parse_clauses(name: &str, mut rest: Vec<Expr>) -> Result<Vec<Clause>> {
    match rest.first() {
        Some(Expr::Vector(_)) => {
            let params = rest.remove(0);
            Ok(vec![clause_from(params, rest)])
        }
        Some(Expr::List(_)) => {
            // A trailing attribute map may follow the clauses
            if matches!(rest.last(), Some(Expr::Map(_))) {
                rest.pop();
            }
            rest.into_iter()
                .map(|form| match form {
                    Expr::List(items) => match items.front() {
                        Some(params @ Expr::Vector(_)) => {
                            let params = params.clone();
                            Ok(clause_from(params, items.iter().skip(1).cloned().collect()))
                        }
                        _ => Err(Error::malformed(
                            name,
                            format!(
                                "clause must start with a parameter vector: {}",
                                Expr::List(items.clone())
                            ),
                        )),
                    },
                    other => Err(Error::malformed(
                        name,
                        format!("expected a clause list, found {}", other),
                    )),
                })
                .collect()
        }
        Some(other) => Err(Error::malformed(
            name,
            format!("expected a parameter vector or clause list, found {}", other),
        )),
        None => Err(Error::malformed(name, "missing parameter vector")),
    }
}

/// Split a leading `{:pre ... :post ...}` map from the body. A lone map is
/// the return value, not a condition map.
fn clause_from(params: Expr, mut body: Vec<Expr>) -> Clause {
    let conditions = match body.first() {
        Some(Expr::Map(map))
            if body.len() > 1
                && map
                    .keys()
                    .all(|k| matches!(k, Expr::Keyword(kw) if kw.is("pre") || kw.is("post"))) =>
        {
            Some(body.remove(0))
        }
        _ => None,
    };
    Clause {
        params,
        conditions,
        body,
    }
}

// ============================================================================
// Tests
// ============================================================================

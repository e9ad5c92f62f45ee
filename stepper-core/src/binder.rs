// stepper-core - Pattern binder
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Symbolic destructuring.
//!
//! Binding a pattern against a value expression produces a flat, ordered list
//! of `name value-expr` pairs suitable for a sequential `let*`. Nothing is
//! evaluated here: nested patterns are expanded into lookups (`nth`,
//! `nthnext`, `get`) over generated temporaries, so the output means the same
//! thing as the original destructuring form once it is evaluated.
//!
//! Supported patterns:
//! - Symbols: `x`
//! - Vectors: `[a b]`, `[a & rest]`, `[a :as all]`, `[_ b]`
//! - Maps: `{a :a}`, `{:keys [a b]}`, `{:strs [a]}`, `{:syms [a]}`,
//!   `{:or {a 1}}`, `{:as m}`, `{:ns/keys [a]}`

use std::collections::HashSet;
use std::fmt;

use stepper_parser::{Expr, Keyword, OrdMap, Symbol, Vector};

use crate::config::StepOptions;
use crate::error::{Error, Result};

/// One emitted binding.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: Symbol,
    pub value: Expr,
}

impl Binding {
    pub fn new(name: Symbol, value: Expr) -> Self {
        Binding { name, value }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.value)
    }
}

/// Accumulates bindings for one binding block.
///
/// Generated temporaries (`vec__N`, `map__N`, `p__N`) are numbered per
/// binder, so every binder used for a single block yields unique names. A
/// number whose name already appears in a reserved form is skipped.
#[derive(Debug, Clone)]
pub struct Binder {
    elide_self_bindings: bool,
    bindings: Vec<Binding>,
    bound_names: Vec<Symbol>,
    reserved: HashSet<Symbol>,
    counter: usize,
}

impl Default for Binder {
    fn default() -> Self {
        Binder::new(&StepOptions::DEFAULT)
    }
}

impl Binder {
    pub fn new(options: &StepOptions) -> Self {
        Binder {
            elide_self_bindings: options.elide_self_bindings,
            bindings: Vec::new(),
            bound_names: Vec::new(),
            reserved: HashSet::new(),
            counter: 0,
        }
    }

    /// Bindings emitted so far, in order.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Pattern targets bound so far, excluding generated temporaries. A name
    /// appears once even if it was bound more than once.
    pub fn bound_names(&self) -> &[Symbol] {
        &self.bound_names
    }

    pub fn into_bindings(self) -> Vec<Binding> {
        self.bindings
    }

    /// The bindings as a `let*` binding vector: `[n1 v1 n2 v2 ...]`.
    pub fn binding_vector(&self) -> Expr {
        Expr::Vector(
            self.bindings
                .iter()
                .flat_map(|b| [Expr::Symbol(b.name.clone()), b.value.clone()])
                .collect(),
        )
    }

    /// Keep generated temporaries clear of every symbol in `form`, e.g. a
    /// body the bindings will wrap.
    pub fn reserve(&mut self, form: &Expr) {
        collect_symbols(form, &mut self.reserved);
    }

    /// Bind `pattern` against `value`.
    pub fn bind(&mut self, pattern: &Expr, value: Expr) -> Result<()> {
        self.reserve(&value);
        self.bind_target(pattern, value)
    }

    fn bind_target(&mut self, pattern: &Expr, value: Expr) -> Result<()> {
        match pattern {
            Expr::Symbol(sym) => self.bind_symbol(pattern, sym, value),
            Expr::Vector(items) => self.bind_sequential(pattern, items, value),
            Expr::Map(map) => self.bind_associative(pattern, map, value, false),
            other => Err(Error::invalid_pattern(
                other,
                format!(
                    "binding target must be a symbol, vector or map, got {}",
                    other.type_name()
                ),
            )),
        }
    }

    /// Bind each pattern to the value at the same position, with parallel
    /// semantics: every value expression sees the bindings in effect before
    /// the block, never those made by earlier patterns. Missing values bind
    /// to `nil`.
    pub fn bind_many(&mut self, patterns: &[Expr], values: &[Expr]) -> Result<()> {
        if values.len() > patterns.len() {
            return Err(Error::invalid_pattern(
                &Expr::vector(patterns.to_vec()),
                format!(
                    "{} values supplied for {} patterns",
                    values.len(),
                    patterns.len()
                ),
            ));
        }
        self.bind_parallel(patterns, values, None)
    }

    /// Function mode: bind a parameter vector to argument expressions. The
    /// argument expressions are evaluated by the resulting binding block.
    pub fn bind_values(&mut self, params: &Expr, args: &[Expr]) -> Result<()> {
        let items = param_items(params)?;
        let (fixed, rest) = split_rest(params, &items)?;

        if rest.is_none() && args.len() > fixed.len() {
            return Err(Error::invalid_pattern(
                params,
                format!(
                    "{} arguments supplied to {} parameters",
                    args.len(),
                    fixed.len()
                ),
            ));
        }

        let split = fixed.len().min(args.len());
        let mut patterns: Vec<Expr> = fixed.to_vec();
        let mut values: Vec<Expr> = args[..split].to_vec();
        values.resize(fixed.len(), Expr::Nil);

        let rest_index = rest.map(|target| {
            patterns.push(target.clone());
            values.push(if args.len() > split {
                let mut call = vec![Expr::sym("list")];
                call.extend(args[split..].iter().cloned());
                Expr::list(call)
            } else {
                Expr::Nil
            });
            patterns.len() - 1
        });

        self.bind_parallel(&patterns, &values, rest_index)
    }

    /// Macro mode: bind `args` to the quoted argument forms, then
    /// destructure the parameter vector against it. Nothing in `args` is
    /// evaluated by the resulting binding block.
    pub fn bind_raw_forms(&mut self, params: &Expr, args: &[Expr]) -> Result<()> {
        param_items(params)?;
        for arg in args {
            self.reserve(arg);
        }
        let args_sym = Symbol::new("args");
        self.bind_symbol(
            &Expr::Symbol(args_sym.clone()),
            &args_sym,
            Expr::list(args.to_vec()).quoted(),
        )?;
        self.bind_target(params, Expr::Symbol(args_sym))
    }

    // ========================================================================
    // Pattern shapes
    // ========================================================================

    fn bind_symbol(&mut self, pattern: &Expr, sym: &Symbol, value: Expr) -> Result<()> {
        if sym.has_namespace() {
            return Err(Error::invalid_pattern(
                pattern,
                format!("cannot bind qualified symbol {}", sym),
            ));
        }
        if sym.is("&") {
            return Err(Error::invalid_pattern(pattern, "& is not a binding name"));
        }
        if !self.bound_names.contains(sym) {
            self.bound_names.push(sym.clone());
        }
        let is_self_binding = matches!(&value, Expr::Symbol(v) if v == sym);
        if !(self.elide_self_bindings && is_self_binding) {
            self.push(sym.clone(), value);
        }
        Ok(())
    }

    fn bind_sequential(&mut self, pattern: &Expr, items: &Vector<Expr>, value: Expr) -> Result<()> {
        let seq = self.gensym("vec");
        self.push(seq.clone(), value);

        let mut index: i64 = 0;
        let mut i = 0;
        while i < items.len() {
            let item = &items[i];

            if item.is_symbol_named("&") {
                let target = items.get(i + 1).ok_or_else(|| {
                    Error::invalid_pattern(pattern, "& must be followed by a binding")
                })?;
                let rest = Expr::list(vec![
                    Expr::sym("nthnext"),
                    Expr::Symbol(seq.clone()),
                    Expr::Int(index),
                ]);
                self.bind_rest(target, rest)?;
                i += 2;
                continue;
            }

            if matches!(item, Expr::Keyword(kw) if kw.is("as")) {
                match items.get(i + 1) {
                    Some(target @ Expr::Symbol(sym)) => {
                        self.bind_symbol(target, sym, Expr::Symbol(seq.clone()))?;
                    }
                    _ => {
                        return Err(Error::invalid_pattern(
                            pattern,
                            ":as must be followed by a symbol",
                        ));
                    }
                }
                i += 2;
                continue;
            }

            if !item.is_symbol_named("_") {
                let nth = Expr::list(vec![
                    Expr::sym("nth"),
                    Expr::Symbol(seq.clone()),
                    Expr::Int(index),
                    Expr::Nil,
                ]);
                self.bind_target(item, nth)?;
            }
            index += 1;
            i += 1;
        }
        Ok(())
    }

    /// A keyed pattern after `&` receives the rest sequence as keyword
    /// arguments, so the sequence is poured into a map first.
    fn bind_rest(&mut self, target: &Expr, value: Expr) -> Result<()> {
        match target {
            Expr::Map(map) => self.bind_associative(target, map, value, true),
            _ => self.bind_target(target, value),
        }
    }

    fn bind_associative(
        &mut self,
        pattern: &Expr,
        map: &OrdMap<Expr, Expr>,
        value: Expr,
        keyword_args: bool,
    ) -> Result<()> {
        let target = self.gensym("map");
        let target_expr = Expr::Symbol(target.clone());
        self.push(target.clone(), value);
        if keyword_args {
            let coerced = Expr::list(vec![
                Expr::sym("if"),
                Expr::list(vec![Expr::sym("seq?"), target_expr.clone()]),
                Expr::list(vec![
                    Expr::sym("apply"),
                    Expr::sym("hash-map"),
                    target_expr.clone(),
                ]),
                target_expr.clone(),
            ]);
            self.push(target.clone(), coerced);
        }

        let defaults = match map.get(&Expr::kw("or")) {
            None => None,
            Some(Expr::Map(defaults)) => Some(defaults),
            Some(other) => {
                return Err(Error::invalid_pattern(
                    pattern,
                    format!(":or must be a map, got {}", other.type_name()),
                ));
            }
        };
        let default_for = |sym: &Symbol| defaults.and_then(|d| d.get(&Expr::Symbol(sym.clone())).cloned());

        if let Some(as_target) = map.get(&Expr::kw("as")) {
            match as_target {
                Expr::Symbol(sym) => self.bind_symbol(as_target, sym, target_expr.clone())?,
                _ => {
                    return Err(Error::invalid_pattern(
                        pattern,
                        ":as must be followed by a symbol",
                    ));
                }
            }
        }

        for (key, lookup) in map.iter() {
            match key {
                Expr::Keyword(kw) if kw.is("or") || kw.is("as") => {}
                Expr::Keyword(kw) => {
                    let entries = match lookup {
                        Expr::Vector(entries) => entries,
                        other => {
                            return Err(Error::invalid_pattern(
                                pattern,
                                format!("{} requires a vector, got {}", kw, other.type_name()),
                            ));
                        }
                    };
                    for entry in entries.iter() {
                        let (local, lookup_key) = directive_entry(pattern, kw, entry)?;
                        let value = get_form(&target_expr, lookup_key, default_for(&local));
                        self.bind_symbol(entry, &local, value)?;
                    }
                }
                Expr::Symbol(sym) => {
                    let value = get_form(&target_expr, lookup.clone(), default_for(sym));
                    self.bind_symbol(key, sym, value)?;
                }
                Expr::Vector(_) | Expr::Map(_) => {
                    let value = get_form(&target_expr, lookup.clone(), None);
                    self.bind_target(key, value)?;
                }
                other => {
                    return Err(Error::invalid_pattern(
                        pattern,
                        format!("map pattern key must be a binding target, got {}", other),
                    ));
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // Parallel binding
    // ========================================================================

    fn bind_parallel(
        &mut self,
        patterns: &[Expr],
        values: &[Expr],
        rest_index: Option<usize>,
    ) -> Result<()> {
        let mut earlier = HashSet::new();
        let mut captured = Vec::with_capacity(patterns.len());
        for (i, pattern) in patterns.iter().enumerate() {
            captured.push(values.get(i).is_some_and(|v| mentions_any(v, &earlier)));
            pattern_names(pattern, &mut earlier);
        }
        for value in values {
            self.reserve(value);
        }

        // A value that mentions a name bound by an earlier pattern is
        // evaluated into a temporary before any pattern is bound. Compound
        // values ahead of it go first too, so arguments still evaluate in
        // source order.
        let last_captured = captured.iter().rposition(|c| *c);
        let mut planned = Vec::with_capacity(patterns.len());
        for (i, is_captured) in captured.into_iter().enumerate() {
            let value = values.get(i).cloned().unwrap_or(Expr::Nil);
            let hoist = last_captured.is_some_and(|last| i <= last)
                && (is_captured || is_compound(&value));
            if hoist {
                let temp = self.gensym("p");
                self.push(temp.clone(), value);
                planned.push(Expr::Symbol(temp));
            } else {
                planned.push(value);
            }
        }

        for (i, (pattern, value)) in patterns.iter().zip(planned).enumerate() {
            if rest_index == Some(i) {
                self.bind_rest(pattern, value)?;
            } else {
                self.bind_target(pattern, value)?;
            }
        }
        Ok(())
    }

    fn push(&mut self, name: Symbol, value: Expr) {
        self.bindings.push(Binding::new(name, value));
    }

    fn gensym(&mut self, prefix: &str) -> Symbol {
        loop {
            let sym = Symbol::new(&format!("{}__{}", prefix, self.counter));
            self.counter += 1;
            if !self.reserved.contains(&sym) {
                return sym;
            }
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn param_items(params: &Expr) -> Result<Vec<Expr>> {
    match params {
        Expr::Vector(items) => Ok(items.iter().cloned().collect()),
        other => Err(Error::invalid_pattern(
            other,
            format!("parameters must be a vector, got {}", other.type_name()),
        )),
    }
}

/// Split parameters at `&` into the fixed targets and the rest target.
fn split_rest<'p>(params: &Expr, items: &'p [Expr]) -> Result<(&'p [Expr], Option<&'p Expr>)> {
    match items.iter().position(|p| p.is_symbol_named("&")) {
        None => Ok((items, None)),
        Some(pos) => match &items[pos + 1..] {
            [target] => Ok((&items[..pos], Some(target))),
            [] => Err(Error::invalid_pattern(params, "& must be followed by a binding")),
            _ => Err(Error::invalid_pattern(
                params,
                "only one binding may follow &",
            )),
        },
    }
}

/// Local name and lookup key for one entry of `:keys`, `:strs` or `:syms`.
fn directive_entry(pattern: &Expr, directive: &Keyword, entry: &Expr) -> Result<(Symbol, Expr)> {
    let bad_entry = || {
        Error::invalid_pattern(
            pattern,
            format!("{} entries must be symbols, got {}", directive, entry),
        )
    };

    match (directive.namespace(), directive.name()) {
        (None, "keys") => match entry {
            Expr::Symbol(sym) => Ok((sym.unqualified(), Expr::Keyword(Keyword::from_symbol(sym)))),
            Expr::Keyword(kw) => Ok((Symbol::new(kw.name()), Expr::Keyword(kw.clone()))),
            _ => Err(bad_entry()),
        },
        (Some(ns), "keys") => match entry {
            Expr::Symbol(sym) if !sym.has_namespace() => Ok((
                sym.clone(),
                Expr::Keyword(Keyword::with_namespace(ns, sym.name())),
            )),
            _ => Err(bad_entry()),
        },
        (None, "strs") => match entry {
            Expr::Symbol(sym) if !sym.has_namespace() => Ok((sym.clone(), Expr::string(sym.name()))),
            _ => Err(bad_entry()),
        },
        (None, "syms") => match entry {
            Expr::Symbol(sym) => Ok((sym.unqualified(), Expr::Symbol(sym.clone()).quoted())),
            _ => Err(bad_entry()),
        },
        _ => Err(Error::invalid_pattern(
            pattern,
            format!("unsupported map pattern directive {}", directive),
        )),
    }
}

/// `(get target key)` or `(get target key default)`.
fn get_form(target: &Expr, key: Expr, default: Option<Expr>) -> Expr {
    let mut form = vec![Expr::sym("get"), target.clone(), key];
    form.extend(default);
    Expr::list(form)
}

/// Collect every name a pattern binds.
pub fn pattern_names(pattern: &Expr, names: &mut HashSet<Symbol>) {
    match pattern {
        Expr::Symbol(sym) => {
            if !sym.is("&") && !sym.is("_") {
                names.insert(sym.clone());
            }
        }
        Expr::Vector(items) => {
            for item in items.iter() {
                pattern_names(item, names);
            }
        }
        Expr::Map(map) => {
            for (key, value) in map.iter() {
                match key {
                    Expr::Keyword(kw) if kw.is("or") => {}
                    Expr::Keyword(kw) if kw.is("as") => pattern_names(value, names),
                    Expr::Keyword(_) => {
                        for entry in value.as_items().into_iter().flatten() {
                            match entry {
                                Expr::Symbol(sym) => {
                                    names.insert(sym.unqualified());
                                }
                                Expr::Keyword(kw) => {
                                    names.insert(Symbol::new(kw.name()));
                                }
                                _ => {}
                            }
                        }
                    }
                    _ => pattern_names(key, names),
                }
            }
        }
        _ => {}
    }
}

/// Collections and calls; evaluating anything else cannot have effects.
fn is_compound(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::List(_) | Expr::Vector(_) | Expr::Map(_) | Expr::Set(_)
    )
}

/// Every unqualified symbol in `expr`, at any depth.
fn collect_symbols(expr: &Expr, names: &mut HashSet<Symbol>) {
    match expr {
        Expr::Symbol(sym) if !sym.has_namespace() => {
            names.insert(sym.clone());
        }
        Expr::List(items) | Expr::Vector(items) => {
            for item in items.iter() {
                collect_symbols(item, names);
            }
        }
        Expr::Map(map) => {
            for (k, v) in map.iter() {
                collect_symbols(k, names);
                collect_symbols(v, names);
            }
        }
        Expr::Set(set) => {
            for item in set.iter() {
                collect_symbols(item, names);
            }
        }
        _ => {}
    }
}

/// True if `expr` contains any of `names` as a symbol, at any depth.
pub fn mentions_any(expr: &Expr, names: &HashSet<Symbol>) -> bool {
    if names.is_empty() {
        return false;
    }
    match expr {
        Expr::Symbol(sym) => names.contains(sym),
        Expr::List(items) | Expr::Vector(items) => items.iter().any(|e| mentions_any(e, names)),
        Expr::Map(map) => map
            .iter()
            .any(|(k, v)| mentions_any(k, names) || mentions_any(v, names)),
        Expr::Set(set) => set.iter().any(|e| mentions_any(e, names)),
        _ => false,
    }
}

/// Bind `pattern` against `value` with default options.
pub fn bind(pattern: &Expr, value: Expr) -> Result<Vec<Binding>> {
    let mut binder = Binder::default();
    binder.bind(pattern, value)?;
    Ok(binder.into_bindings())
}

/// Bind patterns to values in parallel with default options.
pub fn bind_many(patterns: &[Expr], values: &[Expr]) -> Result<Vec<Binding>> {
    let mut binder = Binder::default();
    binder.bind_many(patterns, values)?;
    Ok(binder.into_bindings())
}

// ============================================================================
// Tests
// ============================================================================

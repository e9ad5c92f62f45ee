// stepper-core - Call flattening
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Rewriting a call into a binding block over the callee's body.
//!
//! ```text
//! (defn add [a b] (+ a b))
//!
//! (add 1 (inc 2))  =>  (let* [a 1 b (inc 2)] (+ a b))
//! ```
//!
//! For a macro the argument forms are bound as quoted data instead, so
//! evaluating the result yields the macro's one-level expansion.

use stepper_parser::{Expr, Symbol};
use tracing::debug;

use crate::arity;
use crate::binder::Binder;
use crate::config::StepOptions;
use crate::definition::{Clause, DefKind, Definition};
use crate::environment::{EnvironmentError, SymbolEnvironment, SymbolInfo};
use crate::error::{Error, Result};
use crate::resolver::{Resolved, Resolver};

/// A call split into its parts, with the callee's definition resolved.
struct Call {
    callee: Expr,
    args: Vec<Expr>,
    definition: Definition,
}

/// Steps into calls using an environment for resolution.
pub struct Flattener<'e, E: SymbolEnvironment + ?Sized> {
    env: &'e E,
    options: StepOptions,
}

impl<'e, E: SymbolEnvironment + ?Sized> Flattener<'e, E> {
    pub fn new(env: &'e E, options: StepOptions) -> Self {
        Flattener { env, options }
    }

    pub fn options(&self) -> &StepOptions {
        &self.options
    }

    /// Inline one call: `(let* [bindings...] body...)`.
    pub fn flatten_call(&self, expr: &Expr) -> Result<Expr> {
        let call = self.prepare(expr)?;
        let clause = select_clause(&call)?;
        let binder = self.bind(&call, clause)?;
        Ok(let_form(binder.binding_vector(), clause.checked_body()))
    }

    /// Show what a call binds.
    ///
    /// For a function the block runs the clause's `:pre` checks and ends in
    /// a map from each bound name to its value; for a macro the result is
    /// the same as [`Self::flatten_call`].
    pub fn step_in(&self, expr: &Expr) -> Result<Expr> {
        let call = self.prepare(expr)?;
        let clause = select_clause(&call)?;
        let binder = self.bind(&call, clause)?;

        if call.definition.is_macro() {
            return Ok(let_form(binder.binding_vector(), clause.checked_body()));
        }

        let summary = Expr::map(
            binder
                .bound_names()
                .iter()
                .map(|name| {
                    let sym = Expr::Symbol(name.clone());
                    (sym.clone().quoted(), sym)
                })
                .collect(),
        );
        let mut body = clause.pre_checks();
        body.push(summary);
        Ok(let_form(binder.binding_vector(), body))
    }

    // ========================================================================
    // Preparation
    // ========================================================================

    fn prepare(&self, expr: &Expr) -> Result<Call> {
        let items = match expr {
            Expr::List(items) if !items.is_empty() => items,
            Expr::List(_) => return Err(Error::invalid_call(expr, "empty list is not a call")),
            other => {
                return Err(Error::invalid_call(
                    other,
                    format!("expected a call, got {}", other.type_name()),
                ));
            }
        };
        let callee = items[0].clone();
        let args: Vec<Expr> = items.iter().skip(1).cloned().collect();
        let definition = self.definition_of(&callee)?;
        Ok(Call {
            callee,
            args,
            definition,
        })
    }

    fn definition_of(&self, callee: &Expr) -> Result<Definition> {
        if callee.is_call_to("fn") || callee.is_call_to("fn*") {
            return Definition::parse(callee);
        }

        match Resolver::new(self.env, self.options).resolve(callee) {
            Resolved::Macro(info) => self.read_definition(&info, DefKind::Macro),
            Resolved::Function(info) => self.read_definition(&info, DefKind::Function),
            Resolved::SpecialForm(sym) => Err(Error::invalid_call(
                callee,
                format!("{} is a special form", sym),
            )),
            Resolved::Keyword(kw) => Err(Error::invalid_call(
                callee,
                format!("keyword {} has no definition to step into", kw),
            )),
            Resolved::LiteralVariable { symbol, printed } => Err(Error::malformed(
                symbol.to_string(),
                format!("no source definition, value is {}", printed),
            )),
            Resolved::Unknown(Expr::Symbol(symbol)) => Err(Error::UnresolvedSymbol { symbol }),
            Resolved::Unknown(other) => Err(Error::invalid_call(
                &other,
                "callee must be a symbol or a fn form",
            )),
        }
    }

    fn read_definition(&self, info: &SymbolInfo, kind: DefKind) -> Result<Definition> {
        let name = info.qualified_name();
        let source = info
            .source
            .as_deref()
            .ok_or_else(|| Error::malformed(&name, "no source text available"))?;

        let form = self.env.read_expression(source).map_err(|err| match err {
            EnvironmentError::ReadEvalDisabled => Error::EvaluationDeferred { name: name.clone() },
            EnvironmentError::Read(message) | EnvironmentError::Evaluation(message) => {
                Error::malformed(&name, message)
            }
        })?;

        let mut definition = Definition::parse(&form)?;
        // The resolver's classification decides the binding mode
        definition.kind = kind;
        if definition.name.is_none() {
            definition.name = Some(Symbol::new(&info.name));
        }
        Ok(definition)
    }

    fn bind(&self, call: &Call, clause: &Clause) -> Result<Binder> {
        let mut binder = Binder::new(&self.options);
        for form in clause.checked_body() {
            binder.reserve(&form);
        }
        match call.definition.kind {
            DefKind::Macro => binder.bind_raw_forms(&clause.params, &call.args)?,
            DefKind::Function => binder.bind_values(&clause.params, &call.args)?,
        }
        debug!(
            target: "stepper::flatten",
            callee = %call.callee,
            clause = %clause.params,
            bindings = binder.bindings().len(),
            "bound call"
        );
        Ok(binder)
    }
}

fn select_clause(call: &Call) -> Result<&Clause> {
    let clauses = &call.definition.clauses;
    arity::select(clauses, call.args.len()).ok_or_else(|| Error::NoMatchingArity {
        callee: call.callee.clone(),
        got: call.args.len(),
        accepted: arity::describe(clauses),
    })
}

fn let_form(bindings: Expr, body: impl IntoIterator<Item = Expr>) -> Expr {
    let mut form = vec![Expr::sym("let*"), bindings];
    form.extend(body);
    Expr::list(form)
}

/// [`Flattener::flatten_call`] with default options.
pub fn flatten_call<E: SymbolEnvironment + ?Sized>(env: &E, expr: &Expr) -> Result<Expr> {
    Flattener::new(env, StepOptions::DEFAULT).flatten_call(expr)
}

/// [`Flattener::step_in`] with default options.
pub fn step_in<E: SymbolEnvironment + ?Sized>(env: &E, expr: &Expr) -> Result<Expr> {
    Flattener::new(env, StepOptions::DEFAULT).step_in(expr)
}

// stepper-core - Arity selection
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Choosing the clause of a multi-arity definition that a call lands in.
//!
//! Clauses are ranked by arity, with a variadic clause ranked above every
//! fixed one. The first clause whose rank is at least the argument count
//! wins, so a call is matched to the closest fit from above.

use std::fmt;

use stepper_parser::Expr;

use crate::definition::Clause;

/// The argument count a parameter vector accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many arguments
    Fixed(usize),
    /// At least this many arguments (the vector contains `&`)
    Variadic(usize),
}

impl Arity {
    /// The arity of a parameter vector's items.
    pub fn of(params: &[Expr]) -> Self {
        match params.iter().position(|p| p.is_symbol_named("&")) {
            Some(required) => Arity::Variadic(required),
            None => Arity::Fixed(params.len()),
        }
    }

    /// Ranking key: the fixed count, or `usize::MAX` when variadic.
    pub fn rank(self) -> usize {
        match self {
            Arity::Fixed(n) => n,
            Arity::Variadic(_) => usize::MAX,
        }
    }

    /// Number of fixed (non-rest) parameters.
    pub fn required(self) -> usize {
        match self {
            Arity::Fixed(n) | Arity::Variadic(n) => n,
        }
    }

    pub fn is_variadic(self) -> bool {
        matches!(self, Arity::Variadic(_))
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Fixed(n) => write!(f, "{}", n),
            Arity::Variadic(n) => write!(f, "{} or more", n),
        }
    }
}

/// Select the clause for a call with `arg_count` arguments.
///
/// A variadic clause is only chosen when no fixed clause has at least
/// `arg_count` parameters. Fixed clauses with more parameters than supplied
/// arguments still qualify; their surplus parameters bind to `nil`.
pub fn select(clauses: &[Clause], arg_count: usize) -> Option<&Clause> {
    let mut ranked: Vec<&Clause> = clauses.iter().collect();
    ranked.sort_by_key(|clause| clause.arity().rank());
    ranked
        .into_iter()
        .find(|clause| clause.arity().rank() >= arg_count)
}

/// Human-readable list of the arities `clauses` accept, in ranked order.
pub fn describe(clauses: &[Clause]) -> String {
    let mut arities: Vec<Arity> = clauses.iter().map(Clause::arity).collect();
    arities.sort_by_key(|a| a.rank());
    arities
        .iter()
        .map(Arity::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Tests
// ============================================================================

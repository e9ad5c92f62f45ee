// stepper-core - Step-into call flattening
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # stepper-core
//!
//! Rewrites a function or macro call into a binding block over the body of
//! the matching clause of its definition, inlining one evaluation step.
//! Symbol lookup, reading and evaluation are supplied by the host through
//! [`SymbolEnvironment`].

pub mod arity;
pub mod binder;
pub mod config;
pub mod definition;
pub mod environment;
pub mod error;
pub mod flatten;
pub mod resolver;
pub mod special_forms;

pub use arity::Arity;
pub use binder::{Binder, Binding, bind, bind_many};
pub use config::StepOptions;
pub use definition::{Clause, DefKind, Definition};
pub use environment::{EnvironmentError, SymbolEnvironment, SymbolInfo};
pub use error::{Error, Result};
pub use flatten::{Flattener, flatten_call, step_in};
pub use resolver::{Resolved, Resolver, resolve};
pub use special_forms::is_special_form;

// Re-export parser types for convenience
pub use stepper_parser::{Expr, Keyword, Symbol};

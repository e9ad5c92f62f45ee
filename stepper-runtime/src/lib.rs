// stepper-runtime - Reference evaluator for the stepper
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # stepper-runtime
//!
//! A small tree-walking evaluator for the Clojure-style language the
//! stepper works on. It provides namespaces and vars that remember where
//! they were defined, a core library, and a [`Runtime`] that implements
//! [`stepper_core::SymbolEnvironment`] so expansions can be produced and
//! then evaluated against the same state.
//!
//! ```
//! use stepper_core::flatten_call;
//! use stepper_runtime::Runtime;
//!
//! let runtime = Runtime::new().unwrap();
//! runtime.eval_str("(defn add [a b] (+ a b))").unwrap();
//! let call = stepper_parser::read("(add 1 2)").unwrap().unwrap();
//! let flat = flatten_call(&runtime, &call).unwrap();
//! assert_eq!(flat.to_string(), "(let* [a 1 b 2] (+ a b))");
//! assert_eq!(runtime.eval(&flat).unwrap().to_string(), "3");
//! ```

pub mod builtins;
pub mod env;
pub mod error;
pub mod eval;
pub mod namespace;
pub mod options;
pub mod runtime;

pub use builtins::register_builtins;
pub use env::Env;
pub use error::{AritySpec, Error, Result};
pub use eval::{
    apply, eval, gensym, get_eval_depth, get_max_eval_depth, make_native_fn, set_max_eval_depth,
};
pub use namespace::{Namespace, NamespaceRegistry, Var, VarMeta};
pub use options::RuntimeOptions;
pub use runtime::Runtime;

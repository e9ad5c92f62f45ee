// stepper-runtime - Common test utilities
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Shared test helpers for stepper-runtime integration tests.
//!
//! # Usage
//!
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! - [`runtime_with`] - a runtime with some source already loaded
//! - [`expr`] - read a single form
//! - [`eval_str`] - evaluate source and print the result

#[allow(unused_imports)]
pub use stepper_core::{Error as StepError, Flattener, StepOptions, flatten_call, step_in};
#[allow(unused_imports)]
pub use stepper_parser::Expr;
#[allow(unused_imports)]
pub use stepper_runtime::{Error, Runtime, RuntimeOptions};

/// A runtime with `source` loaded from `test.clj`.
#[must_use]
pub fn runtime_with(source: &str) -> Runtime {
    let runtime = Runtime::new().expect("runtime should start");
    runtime
        .load_str(source, "test.clj")
        .expect("test source should load");
    runtime
}

/// Read a single form, panicking on failure.
#[must_use]
pub fn expr(src: &str) -> Expr {
    stepper_parser::read(src)
        .expect("form should parse")
        .expect("source should contain a form")
}

/// Evaluate `src` and print the result.
#[allow(dead_code)]
#[must_use]
pub fn eval_str(runtime: &Runtime, src: &str) -> String {
    runtime
        .eval_str(src)
        .unwrap_or_else(|e| panic!("evaluating {} failed: {}", src, e))
        .to_string()
}

/// Flatten `call` and check the expansion evaluates to the same value as
/// the call itself. Returns the printed expansion.
#[allow(dead_code)]
pub fn assert_flatten_equivalent(runtime: &Runtime, call: &str) -> String {
    let form = expr(call);
    let flat = flatten_call(runtime, &form)
        .unwrap_or_else(|e| panic!("flattening {} failed: {}", call, e));
    let direct = runtime
        .eval(&form)
        .unwrap_or_else(|e| panic!("evaluating {} failed: {}", call, e));
    let stepped = runtime
        .eval(&flat)
        .unwrap_or_else(|e| panic!("evaluating {} failed: {}", flat, e));
    assert_eq!(
        direct.to_string(),
        stepped.to_string(),
        "{} and its expansion {} disagree",
        call,
        flat
    );
    flat.to_string()
}

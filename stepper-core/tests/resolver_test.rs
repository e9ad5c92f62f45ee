// stepper-core - Symbol resolution tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Integration tests for callee resolution against an environment.

mod common;

use common::*;
use stepper_core::{Keyword, Resolver, resolve};

fn env() -> MockEnvironment {
    MockEnvironment::new()
        .define("user", "(defn add [a b] (+ a b))")
        .define("user", "(defmacro unless [t & body] `(if ~t nil (do ~@body)))")
        .define("app.util", "(defn helper [x] x)")
        .with_value("limit", Expr::Int(10))
}

// =============================================================================
// Static resolution
// =============================================================================

#[test]
fn test_keyword() {
    let resolved = resolve(&env(), &expr(":k"));
    assert_eq!(resolved, Resolved::Keyword(Keyword::new("k")));
}

#[test]
fn test_special_forms() {
    for name in ["if", "let*", "quote", "recur", "fn*"] {
        let resolved = resolve(&env(), &expr(name));
        assert_eq!(resolved, Resolved::SpecialForm(Symbol::new(name)), "{name}");
    }
}

#[test]
fn test_function_and_macro() {
    let env = env();
    match resolve(&env, &expr("add")) {
        Resolved::Function(info) => {
            assert_eq!(info.qualified_name(), "user/add");
            assert!(info.source.is_some());
        }
        other => panic!("expected function, got {other}"),
    }
    assert_eq!(resolve(&env, &expr("unless")).tag(), "macro");
}

#[test]
fn test_falls_back_to_all_namespaces() {
    match resolve(&env(), &expr("helper")) {
        Resolved::Function(info) => assert_eq!(info.ns, "app.util"),
        other => panic!("expected function, got {other}"),
    }
}

#[test]
fn test_qualified_symbol() {
    assert_eq!(resolve(&env(), &expr("app.util/helper")).tag(), "function");
    assert_eq!(resolve(&env(), &expr("user/helper")).tag(), "unknown");
}

// =============================================================================
// Speculative evaluation
// =============================================================================

#[test]
fn test_speculative_evaluation() {
    let resolved = resolve(&env(), &expr("limit"));
    assert_eq!(
        resolved,
        Resolved::LiteralVariable {
            symbol: Symbol::new("limit"),
            printed: "10".to_string(),
        }
    );
}

#[test]
fn test_speculative_evaluation_disabled() {
    let env = env();
    let options = StepOptions::DEFAULT.with_speculative_eval(false);
    let resolved = Resolver::new(&env, options).resolve(&expr("limit"));
    assert_eq!(resolved, Resolved::Unknown(expr("limit")));
}

#[test]
fn test_unknown_never_fails() {
    let env = env();
    assert_eq!(resolve(&env, &expr("no-such-thing")).tag(), "unknown");
    assert_eq!(resolve(&env, &expr("42")), Resolved::Unknown(Expr::Int(42)));
    assert_eq!(resolve(&env, &expr("(f x)")).tag(), "unknown");
}

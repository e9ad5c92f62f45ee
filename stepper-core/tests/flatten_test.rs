// stepper-core - Call flattening tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Integration tests for `flatten_call` and `step_in` output shape and
//! error reporting.

mod common;

use common::*;
use stepper_core::{flatten_call, step_in};

fn env() -> MockEnvironment {
    MockEnvironment::new()
        .define("user", "(defn add [a b] (+ a b))")
        .define(
            "user",
            "(defn greet \"Greets.\" ([] (greet \"world\")) ([who] (str \"hi \" who)) ([who & more] (apply str who more)))",
        )
        .define("user", "(defn point [{:keys [x y] :or {y 0}}] [x y])")
        .define("user", "(defmacro unless [test & body] (list 'if test nil (cons 'do body)))")
        .define("user", "(def twice (fn [n] (* 2 n)))")
        .define("user", "(defn pos-only [n] {:pre [(pos? n)]} n)")
        .define("user", "(defn half [n] {:post [(pos? %)]} (/ n 2))")
        .define("app.util", "(defn helper [x] (inc x))")
        .with_value("limit", Expr::Int(10))
}

fn flat(src: &str) -> String {
    flatten_call(&env(), &expr(src)).unwrap().to_string()
}

fn stepped(src: &str) -> String {
    step_in(&env(), &expr(src)).unwrap().to_string()
}

fn err_kind(result: stepper_core::Result<Expr>) -> &'static str {
    result.unwrap_err().kind()
}

// =============================================================================
// flatten_call
// =============================================================================

#[test]
fn test_flatten_single_arity() {
    assert_eq!(flat("(add 1 (inc 2))"), "(let* [a 1 b (inc 2)] (+ a b))");
}

#[test]
fn test_flatten_closest_arity() {
    assert_eq!(flat("(greet)"), "(let* [] (greet \"world\"))");
    assert_eq!(flat("(greet \"bob\")"), "(let* [who \"bob\"] (str \"hi \" who))");
    assert_eq!(
        flat("(greet \"a\" \"b\" \"c\")"),
        "(let* [who \"a\" more (list \"b\" \"c\")] (apply str who more))"
    );
}

#[test]
fn test_flatten_destructuring_params() {
    assert_eq!(
        flat("(point {:x 1})"),
        "(let* [map__0 {:x 1} x (get map__0 :x) y (get map__0 :y 0)] [x y])"
    );
}

#[test]
fn test_flatten_parallel_capture() {
    assert_eq!(
        flat("(add b a)"),
        "(let* [p__0 a a b b p__0] (+ a b))"
    );
}

#[test]
fn test_flatten_elides_self_bindings() {
    assert_eq!(flat("(add a 2)"), "(let* [b 2] (+ a b))");

    let env = env();
    let options = StepOptions::DEFAULT.with_elide_self_bindings(false);
    let out = Flattener::new(&env, options)
        .flatten_call(&expr("(add a 2)"))
        .unwrap();
    assert_eq!(out.to_string(), "(let* [a a b 2] (+ a b))");
}

#[test]
fn test_flatten_macro_binds_raw_forms() {
    assert_eq!(
        flat("(unless (pos? n) (println \"neg\"))"),
        "(let* [args (quote ((pos? n) (println \"neg\"))) vec__0 args \
         test (nth vec__0 0 nil) body (nthnext vec__0 1)] \
         (list (quote if) test nil (cons (quote do) body)))"
    );
}

#[test]
fn test_flatten_inline_fn_and_def_of_fn() {
    assert_eq!(flat("((fn [x] (* x x)) 3)"), "(let* [x 3] (* x x))");
    assert_eq!(flat("(twice 4)"), "(let* [n 4] (* 2 n))");
}

#[test]
fn test_flatten_other_namespace() {
    assert_eq!(flat("(helper 1)"), "(let* [x 1] (inc x))");
}

#[test]
fn test_flatten_keeps_pre_conditions() {
    assert_eq!(
        flat("(pos-only -1)"),
        "(let* [n -1] (if (pos? n) nil (throw (str \"Assert failed: \" (quote (pos? n))))) n)"
    );
}

#[test]
fn test_flatten_keeps_post_conditions() {
    assert_eq!(
        flat("(half 4)"),
        "(let* [n 4] (let* [% (do (/ n 2))] \
         (if (pos? %) nil (throw (str \"Assert failed: \" (quote (pos? %))))) %))"
    );
}

// =============================================================================
// step_in
// =============================================================================

#[test]
fn test_step_in_function_summarises_bindings() {
    assert_eq!(
        stepped("(add 1 2)"),
        "(let* [a 1 b 2] {(quote a) a, (quote b) b})"
    );
}

#[test]
fn test_step_in_summary_excludes_temporaries() {
    let out = stepped("(point {:x 1})");
    assert!(out.ends_with("{(quote x) x, (quote y) y})"), "{out}");
}

#[test]
fn test_step_in_checks_pre_conditions() {
    assert_eq!(
        stepped("(pos-only 2)"),
        "(let* [n 2] (if (pos? n) nil (throw (str \"Assert failed: \" (quote (pos? n))))) \
         {(quote n) n})"
    );
}

#[test]
fn test_step_in_macro_matches_flatten() {
    let src = "(unless ok (launch))";
    assert_eq!(stepped(src), flat(src));
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_not_a_call() {
    assert_eq!(err_kind(flatten_call(&env(), &expr("add"))), "InvalidCall");
    assert_eq!(err_kind(flatten_call(&env(), &expr("()"))), "InvalidCall");
    assert_eq!(err_kind(step_in(&env(), &expr("[add 1]"))), "InvalidCall");
}

#[test]
fn test_special_form_and_keyword_callees() {
    assert_eq!(err_kind(flatten_call(&env(), &expr("(if a b)"))), "InvalidCall");
    assert_eq!(err_kind(flatten_call(&env(), &expr("(:k m)"))), "InvalidCall");
}

#[test]
fn test_unresolved_symbol() {
    let err = flatten_call(&env(), &expr("(frobnicate 1)")).unwrap_err();
    assert_eq!(err.kind(), "UnresolvedSymbol");
    assert_eq!(err.offending_form(), expr("frobnicate"));
}

#[test]
fn test_literal_variable_callee() {
    let err = flatten_call(&env(), &expr("(limit 1)")).unwrap_err();
    assert_eq!(err.kind(), "MalformedDefinition");
    assert!(err.to_string().contains("10"));
}

#[test]
fn test_no_matching_arity() {
    let err = flatten_call(&env(), &expr("(add 1 2 3)")).unwrap_err();
    match err {
        Error::NoMatchingArity { got, accepted, .. } => {
            assert_eq!(got, 3);
            assert_eq!(accepted, "2");
        }
        other => panic!("expected NoMatchingArity, got {other}"),
    }
}

#[test]
fn test_missing_source() {
    let env = env().define_info(SymbolInfo::new("user", "native"));
    let err = flatten_call(&env, &expr("(native 1)")).unwrap_err();
    assert_eq!(err.kind(), "MalformedDefinition");
}

#[test]
fn test_source_is_not_a_definition() {
    let mut info = SymbolInfo::new("user", "odd");
    info.source = Some("(let [x 1] x)".to_string());
    let env = env().define_info(info);
    let err = flatten_call(&env, &expr("(odd)")).unwrap_err();
    assert_eq!(err.kind(), "MalformedDefinition");
}

#[test]
fn test_read_eval_deferred() {
    let env = env()
        .define("user", "(defn stamped [x] [x #=(+ 1 2)])")
        .with_read_eval(false);
    let err = flatten_call(&env, &expr("(stamped 1)")).unwrap_err();
    assert_eq!(err.kind(), "EvaluationDeferred");

    let env = env.with_read_eval(true);
    assert_eq!(
        flatten_call(&env, &expr("(stamped 1)")).unwrap().to_string(),
        "(let* [x 1] [x (read-eval* (+ 1 2))])"
    );
}

#[test]
fn test_invalid_pattern() {
    let mut info = SymbolInfo::new("user", "bad");
    info.source = Some("(defn bad [a &] a)".to_string());
    let env = env().define_info(info);
    let err = flatten_call(&env, &expr("(bad 1)")).unwrap_err();
    assert_eq!(err.kind(), "InvalidPattern");
}

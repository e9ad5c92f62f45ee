// stepper-runtime - Stepping against the live runtime
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Integration tests running `flatten_call` and `step_in` against a real
//! [`Runtime`], checking both the printed expansions and that evaluating an
//! expansion agrees with evaluating the original call.

mod common;

use common::*;

const DEFINITIONS: &str = r#"
(defn add [a b] (+ a b))

(defn greet
  "Greets."
  ([] (greet "world"))
  ([who] (str "hi " who))
  ([who & more] (apply str who more)))

(defn point [{:keys [x y] :or {y 0}}] [x y])

(defn head-tail [[h & t]] {:head h :tail t})

(defn opts [a & {:keys [k] :or {k 1}}] [a k])

(defn keyed [{x :k1 y :k2}] [x y])

(defn keyed-or [{x :k1 y :k2 :or {x "one" y "two"}}] [x y])

(defn three-of [[a b c]] [a b c])

(defn head-rest-all [[a & tail :as all]] [a tail all])

(defn pos-only [n] {:pre [(pos? n)]} n)

(defn half [n] {:pre [(even? n)] :post [(pos? %)]} (/ n 2))

(defn firsts [[a] [b]] [a b])

(defn fact [n] (if (= n 0) 1 (* n (fact (- n 1)))))

(def twice (fn [n] (* 2 n)))

(defmacro unless [test & body] `(if ~test nil (do ~@body)))

(defmacro double-do [x] `(do ~x ~x))

(def a 10)
(def b 3)
(def counter (atom 0))
"#;

fn runtime() -> Runtime {
    runtime_with(DEFINITIONS)
}

fn flat(runtime: &Runtime, src: &str) -> String {
    flatten_call(runtime, &expr(src))
        .unwrap_or_else(|e| panic!("flattening {} failed: {}", src, e))
        .to_string()
}

fn err_kind(runtime: &Runtime, src: &str) -> &'static str {
    flatten_call(runtime, &expr(src))
        .expect_err("flattening should fail")
        .kind()
}

// =============================================================================
// Equivalence with the original call
// =============================================================================

#[test]
fn test_flatten_equivalent_for_functions() {
    let runtime = runtime();
    assert_eq!(
        assert_flatten_equivalent(&runtime, "(add 1 (inc 2))"),
        "(let* [a 1 b (inc 2)] (+ a b))"
    );
    assert_flatten_equivalent(&runtime, "(greet)");
    assert_flatten_equivalent(&runtime, "(greet \"bob\")");
    assert_flatten_equivalent(&runtime, "(greet \"a\" \"b\" \"c\")");
    assert_flatten_equivalent(&runtime, "(fact 5)");
    assert_flatten_equivalent(&runtime, "(twice 21)");
}

#[test]
fn test_flatten_equivalent_for_destructuring() {
    let runtime = runtime();
    assert_flatten_equivalent(&runtime, "(point {:x 1})");
    assert_flatten_equivalent(&runtime, "(point {:x 1 :y 2})");
    assert_flatten_equivalent(&runtime, "(head-tail [1 2 3])");
    assert_flatten_equivalent(&runtime, "(head-tail [])");
    assert_flatten_equivalent(&runtime, "(opts 1)");
    assert_flatten_equivalent(&runtime, "(opts 1 :k 2)");
}

#[test]
fn test_flattened_keyed_patterns_evaluate() {
    let runtime = runtime();
    let call = "(keyed {:k1 \"one\" :k2 \"two\" :k3 \"three\"})";
    assert_flatten_equivalent(&runtime, call);
    assert_eq!(eval_str(&runtime, &flat(&runtime, call)), "[\"one\" \"two\"]");

    assert_flatten_equivalent(&runtime, "(keyed-or {})");
    assert_eq!(
        eval_str(&runtime, &flat(&runtime, "(keyed-or {})")),
        "[\"one\" \"two\"]"
    );
    assert_eq!(
        eval_str(&runtime, &flat(&runtime, "(keyed-or {:k2 \"other\"})")),
        "[\"one\" \"other\"]"
    );
}

#[test]
fn test_flattened_positional_patterns_evaluate() {
    let runtime = runtime();
    assert_flatten_equivalent(&runtime, "(three-of [1 2])");
    assert_eq!(eval_str(&runtime, &flat(&runtime, "(three-of [1 2])")), "[1 2 nil]");

    assert_flatten_equivalent(&runtime, "(head-rest-all [1 2 3])");
    assert_eq!(
        eval_str(&runtime, &flat(&runtime, "(head-rest-all [1 2 3])")),
        "[1 (2 3) [1 2 3]]"
    );
}

#[test]
fn test_argument_capture_is_avoided() {
    let runtime = runtime();
    let expansion = assert_flatten_equivalent(&runtime, "(add b a)");
    assert!(expansion.contains("p__"), "{}", expansion);
    assert_eq!(eval_str(&runtime, &expansion), "13");
}

#[test]
fn test_hoisted_arguments_keep_evaluation_order() {
    let runtime = runtime_with("(def log (atom [])) (defn pair [x y] [x y]) (def x 5)");
    let call = "(pair (do (swap! log conj 1) 10) (do (swap! log conj 2) x))";

    assert_eq!(eval_str(&runtime, call), "[10 5]");
    assert_eq!(eval_str(&runtime, "@log"), "[1 2]");

    let expansion = flat(&runtime, call);
    eval_str(&runtime, "(reset! log [])");
    assert_eq!(eval_str(&runtime, &expansion), "[10 5]");
    assert_eq!(eval_str(&runtime, "@log"), "[1 2]", "{}", expansion);
}

#[test]
fn test_temporaries_avoid_argument_names() {
    let runtime = runtime_with(&format!("{} (def vec__0 [9]) (def p__0 4)", DEFINITIONS));
    let expansion = assert_flatten_equivalent(&runtime, "(firsts [1] vec__0)");
    assert!(!expansion.contains("vec__0 [1]"), "{}", expansion);
    assert_eq!(eval_str(&runtime, &expansion), "[1 9]");

    let expansion = assert_flatten_equivalent(&runtime, "(add p__0 a)");
    assert!(expansion.contains("p__1 a"), "{}", expansion);
    assert_eq!(eval_str(&runtime, &expansion), "14");
}

#[test]
fn test_self_bindings_are_elided() {
    let runtime = runtime();
    assert_eq!(
        assert_flatten_equivalent(&runtime, "(add a b)"),
        "(let* [] (+ a b))"
    );

    let keep = StepOptions::DEFAULT.with_elide_self_bindings(false);
    let flat = Flattener::new(&runtime, keep)
        .flatten_call(&expr("(add a b)"))
        .unwrap();
    assert_eq!(flat.to_string(), "(let* [a a b b] (+ a b))");
}

#[test]
fn test_core_library_functions_step() {
    let runtime = runtime();
    assert_eq!(
        assert_flatten_equivalent(&runtime, "(second [1 2 3])"),
        "(let* [coll [1 2 3]] (first (next coll)))"
    );
    assert_flatten_equivalent(&runtime, "(not-empty [])");
}

// =============================================================================
// Conditions
// =============================================================================

#[test]
fn test_flattened_pre_condition_fails() {
    let runtime = runtime();
    let direct = runtime.eval_str("(pos-only -1)").unwrap_err();
    assert!(direct.to_string().contains("Assert failed: (pos? n)"));

    let expansion = flat(&runtime, "(pos-only -1)");
    let err = runtime.eval_str(&expansion).unwrap_err();
    assert!(err.to_string().contains("Assert failed: (pos? n)"), "{}", err);

    let expansion = assert_flatten_equivalent(&runtime, "(pos-only 1)");
    assert!(expansion.contains("(pos? n)"), "{}", expansion);
}

#[test]
fn test_flattened_post_condition_fails() {
    let runtime = runtime();
    assert_flatten_equivalent(&runtime, "(half 4)");

    let err = runtime.eval_str(&flat(&runtime, "(half 3)")).unwrap_err();
    assert!(err.to_string().contains("Assert failed: (even? n)"), "{}", err);

    let err = runtime.eval_str(&flat(&runtime, "(half -4)")).unwrap_err();
    assert!(err.to_string().contains("Assert failed: (pos? %)"), "{}", err);
}

#[test]
fn test_step_in_runs_pre_conditions() {
    let runtime = runtime();
    let stepped = step_in(&runtime, &expr("(pos-only -1)")).unwrap();
    assert!(runtime.eval(&stepped).is_err());

    let stepped = step_in(&runtime, &expr("(pos-only 2)")).unwrap();
    assert_eq!(runtime.eval(&stepped).unwrap().to_string(), "{n 2}");
}

// =============================================================================
// Macros
// =============================================================================

#[test]
fn test_macro_expansion_matches_macroexpand() {
    let runtime = runtime();
    let flat = flatten_call(&runtime, &expr("(unless false 1 2)")).unwrap();
    let expanded = runtime.eval(&flat).unwrap();
    assert_eq!(expanded.to_string(), "(if false nil (do 1 2))");
    assert_eq!(
        eval_str(&runtime, "(macroexpand-1 '(unless false 1 2))"),
        expanded.to_string()
    );
    assert_eq!(runtime.eval(&expanded).unwrap().to_string(), "2");
}

#[test]
fn test_macro_arguments_are_not_evaluated() {
    let runtime = runtime();
    let flat = flatten_call(&runtime, &expr("(double-do (swap! counter inc))")).unwrap();
    assert_eq!(eval_str(&runtime, "@counter"), "0");

    let expanded = runtime.eval(&flat).unwrap();
    assert_eq!(eval_str(&runtime, "@counter"), "0");
    assert_eq!(
        expanded.to_string(),
        "(do (swap! counter inc) (swap! counter inc))"
    );

    runtime.eval(&expanded).unwrap();
    assert_eq!(eval_str(&runtime, "@counter"), "2");
}

#[test]
fn test_core_macros_step() {
    let runtime = runtime();
    let flat = flatten_call(&runtime, &expr("(when-not false :yes)")).unwrap();
    let expanded = runtime.eval(&flat).unwrap();
    assert_eq!(expanded.to_string(), "(if false nil (do :yes))");
}

// =============================================================================
// step_in
// =============================================================================

#[test]
fn test_step_in_summarises_bindings() {
    let runtime = runtime();
    let stepped = step_in(&runtime, &expr("(add 1 2)")).unwrap();
    assert_eq!(runtime.eval(&stepped).unwrap().to_string(), "{a 1, b 2}");
}

#[test]
fn test_step_in_macro_is_flatten() {
    let runtime = runtime();
    let call = expr("(unless true 1)");
    assert_eq!(
        step_in(&runtime, &call).unwrap(),
        flatten_call(&runtime, &call).unwrap()
    );
}

// =============================================================================
// Resolution and errors
// =============================================================================

#[test]
fn test_namespace_fallback() {
    let runtime = runtime_with("(ns lib) (defn helper [x] (inc x)) (in-ns 'user)");
    assert!(runtime.eval_str("(helper 1)").is_err());
    assert_eq!(flat(&runtime, "(helper 1)"), "(let* [x 1] (inc x))");
}

#[test]
fn test_qualified_callee() {
    let runtime = runtime_with("(ns lib) (defn helper [x] (inc x)) (in-ns 'user)");
    assert_eq!(
        assert_flatten_equivalent(&runtime, "(lib/helper 1)"),
        "(let* [x 1] (inc x))"
    );
}

#[test]
fn test_read_eval_deferred() {
    let mut runtime = runtime_with("(defn three [] #=(+ 1 2))");
    assert_eq!(flat(&runtime, "(three)"), "(let* [] 3)");

    runtime.set_read_eval(false);
    assert_eq!(err_kind(&runtime, "(three)"), "EvaluationDeferred");
}

#[test]
fn test_error_kinds() {
    let runtime = runtime();
    assert_eq!(err_kind(&runtime, "(nope 1)"), "UnresolvedSymbol");
    assert_eq!(err_kind(&runtime, "(inc 1)"), "MalformedDefinition");
    assert_eq!(err_kind(&runtime, "(if true 1)"), "InvalidCall");
    assert_eq!(err_kind(&runtime, "(let [x 1] x)"), "InvalidCall");
    assert_eq!(err_kind(&runtime, "(:k {:k 1})"), "InvalidCall");
    assert_eq!(err_kind(&runtime, "(add 1 2 3)"), "NoMatchingArity");
    assert_eq!(err_kind(&runtime, "(a)"), "MalformedDefinition");
    assert_eq!(err_kind(&runtime, "42"), "InvalidCall");
}

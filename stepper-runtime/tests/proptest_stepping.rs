// stepper-runtime - Property-based tests for stepping
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Property-based tests running expansions through the evaluator.
//!
//! Tests the following properties:
//! - A flattened call evaluates to the same value as the call
//! - Swapping argument names through globals never captures a parameter
//! - A step-in summary maps each parameter to its argument's value

mod common;

use common::*;
use proptest::prelude::*;

const DEFINITIONS: &str = r#"
(defn pick [[a b & more] {:keys [k] :or {k 0}}] [a b (count more) k])
(defn spread ([] 0) ([x] x) ([x y & zs] (apply + x y zs)))
(defn sub2 [a b] (- a b))
"#;

fn int_list(values: &[i64]) -> String {
    values
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Destructuring expansions agree with the evaluator's own binding
    #[test]
    fn flatten_matches_call_for_destructuring(
        items in prop::collection::vec(-100i64..100, 0..6),
        k in prop::option::of(-100i64..100),
    ) {
        let runtime = runtime_with(DEFINITIONS);
        let opts = match k {
            Some(k) => format!("{{:k {}}}", k),
            None => "{}".to_string(),
        };
        assert_flatten_equivalent(&runtime, &format!("(pick [{}] {})", int_list(&items), opts));
    }

    /// Arity selection agrees with the evaluator's dispatch
    #[test]
    fn flatten_matches_call_for_arities(args in prop::collection::vec(-1000i64..1000, 0..6)) {
        let runtime = runtime_with(DEFINITIONS);
        assert_flatten_equivalent(&runtime, &format!("(spread {})", int_list(&args)));
    }

    /// Arguments naming globals that shadow parameters keep their values
    #[test]
    fn crossed_names_are_not_captured(a in -1000i64..1000, b in -1000i64..1000) {
        let runtime = runtime_with(DEFINITIONS);
        runtime.eval_str(&format!("(def a {}) (def b {})", a, b)).unwrap();
        let expansion = assert_flatten_equivalent(&runtime, "(sub2 b a)");
        prop_assert_eq!(eval_str(&runtime, &expansion), (b - a).to_string());
    }

    /// The step-in summary holds each argument's value
    #[test]
    fn step_in_summarises_values(a in -1000i64..1000, b in -1000i64..1000) {
        let runtime = runtime_with(DEFINITIONS);
        let stepped = step_in(&runtime, &expr(&format!("(sub2 {} (inc {}))", a, b))).unwrap();
        prop_assert_eq!(
            runtime.eval(&stepped).unwrap().to_string(),
            format!("{{a {}, b {}}}", a, b + 1)
        );
    }
}

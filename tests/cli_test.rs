// stepper - Command-line tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

fn stepper() -> Command {
    let mut cmd = Command::cargo_bin("stepper").expect("stepper binary");
    cmd.env_remove("STEPPER_LOG")
        .env_remove("STEPPER_SPECULATIVE_EVAL")
        .env_remove("STEPPER_ELIDE_SELF_BINDINGS")
        .env_remove("STEPPER_READ_EVAL");
    cmd
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn test_help_and_version() {
    stepper()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("--expr").and(contains("--mode")));

    stepper()
        .arg("--version")
        .assert()
        .success()
        .stdout(contains("stepper "));
}

#[test]
fn test_step_in_default_mode() {
    stepper()
        .arg(fixture("math.clj"))
        .args(["-e", "(add 1 2)"])
        .assert()
        .success()
        .stdout("(let* [a 1 b 2] {(quote a) a, (quote b) b})\n");
}

#[test]
fn test_flatten_and_eval() {
    stepper()
        .arg(fixture("math.clj"))
        .args(["--mode", "flatten", "--eval", "-e", "(greet \"bob\")"])
        .assert()
        .success()
        .stdout("(let* [who \"bob\"] (str \"hi \" who))\n\"hi bob\"\n");
}

#[test]
fn test_macro_flatten_evaluates_to_expansion() {
    stepper()
        .arg(fixture("math.clj"))
        .args(["--mode", "flatten", "--eval", "-e", "(unless false 1)"])
        .assert()
        .success()
        .stdout(contains("(quote (false 1))").and(contains("(if false nil (do 1))")));
}

#[test]
fn test_keep_self_bindings() {
    stepper()
        .arg(fixture("math.clj"))
        .args(["--mode", "flatten", "--keep-self-bindings", "-e", "(add a b)"])
        .assert()
        .success()
        .stdout("(let* [a a b b] (+ a b))\n");
}

#[test]
fn test_unresolved_symbol_reported() {
    stepper()
        .args(["-e", "(nope 1)"])
        .assert()
        .failure()
        .stderr(contains("error[UnresolvedSymbol]").and(contains("--> nope")));
}

#[test]
fn test_no_read_eval_rejects_loading() {
    stepper()
        .arg(fixture("math.clj"))
        .arg("--no-read-eval")
        .args(["-e", "(add 1 2)"])
        .assert()
        .failure()
        .stderr(contains("error[Eval]"));
}

#[test]
fn test_missing_file() {
    stepper()
        .arg(fixture("missing.clj"))
        .args(["-e", "(+ 1 2)"])
        .assert()
        .failure()
        .stderr(contains("cannot read"));
}

#[test]
fn test_repl_session() {
    stepper()
        .arg(fixture("math.clj"))
        .write_stdin("(add 2 3)\n:flatten (add 2 3)\n:run (greet)\n:step (nope)\n:quit\n")
        .assert()
        .success()
        .stdout(
            contains("5\n")
                .and(contains("(let* [a 2 b 3] (+ a b))"))
                .and(contains("=> \"hi world\"")),
        )
        .stderr(contains("error[UnresolvedSymbol]"));
}

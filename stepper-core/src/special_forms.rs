// stepper-core - Special form table
// Copyright (c) 2025 Tom Waddington. MIT licensed.

use stepper_parser::Symbol;

/// Names the embedding language treats as special forms. These have no
/// source definition and can never be stepped into.
pub const SPECIAL_FORMS: &[&str] = &[
    "def",
    "if",
    "do",
    "let*",
    "letfn*",
    "quote",
    "var",
    "fn*",
    "loop*",
    "recur",
    "throw",
    "try",
    "catch",
    "finally",
    "new",
    "set!",
    ".",
    "case*",
    "monitor-enter",
    "monitor-exit",
    "import*",
    "deftype*",
    "reify*",
    "&",
];

/// True if `sym` names a special form. Qualified symbols never do, except
/// when qualified with `clojure.core`.
pub fn is_special_form(sym: &Symbol) -> bool {
    match sym.namespace() {
        None | Some("clojure.core") => SPECIAL_FORMS.contains(&sym.name()),
        Some(_) => false,
    }
}

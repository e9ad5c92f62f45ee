// stepper-runtime - Printing and reading
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! `pr-str`, `read-string`, and the printing functions.
//!
//! Printed text goes to stdout and is also appended to the runtime's output
//! buffer, so embedders and tests can inspect what a program printed.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use stepper_parser::Expr;

use super::Builtin;
use super::strings::display_str;
use crate::env::Env;
use crate::error::{Error, Result, check_arity};

pub(super) const BUILTINS: &[(&str, Builtin)] = &[
    ("pr-str", builtin_pr_str),
    ("read-string", builtin_read_string),
];

/// Readable text of the arguments, space separated.
fn readable(args: &[Expr]) -> String {
    args.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Display text of the arguments, space separated.
fn human(args: &[Expr]) -> String {
    args.iter().map(display_str).collect::<Vec<_>>().join(" ")
}

pub(crate) fn builtin_pr_str(args: &[Expr]) -> Result<Expr> {
    Ok(Expr::string(readable(args)))
}

/// Read one form from a string. Read-time evaluation is refused.
pub(crate) fn builtin_read_string(args: &[Expr]) -> Result<Expr> {
    check_arity("read-string", args, 1)?;
    let source = args[0].as_str().ok_or_else(|| {
        Error::type_error_in("read-string", "string", args[0].type_name())
    })?;
    let options = stepper_parser::ReaderOptions { read_eval: false };
    let forms = stepper_parser::read_all_with(source, options)?;
    Ok(forms.into_iter().next().unwrap_or(Expr::Nil))
}

fn emit(output: &RefCell<String>, text: &str) -> Result<()> {
    output.borrow_mut().push_str(text);
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|e| Error::Eval(format!("write to stdout failed: {}", e)))
}

/// Register the printing functions, which share `output`.
pub(super) fn register_printers(env: &Env, output: Rc<RefCell<String>>) -> Result<()> {
    let printers: [(&'static str, fn(&[Expr]) -> String, &'static str); 4] = [
        ("print", human, ""),
        ("println", human, "\n"),
        ("pr", readable, ""),
        ("prn", readable, "\n"),
    ];
    for (name, render, end) in printers {
        let output = Rc::clone(&output);
        env.define_native(name, move |args| {
            let mut text = render(args);
            text.push_str(end);
            emit(&output, &text)?;
            Ok(Expr::Nil)
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pr_str_is_readable() {
        let out = builtin_pr_str(&[Expr::string("a"), Expr::Int(1)]).unwrap();
        assert_eq!(out, Expr::string("\"a\" 1"));
    }

    #[test]
    fn test_read_string() {
        let form = builtin_read_string(&[Expr::string("(+ 1 2) ignored")]).unwrap();
        assert_eq!(form.to_string(), "(+ 1 2)");
        assert!(builtin_read_string(&[Expr::string("#=(+ 1 2)")]).is_err());
    }

    #[test]
    fn test_printers_capture_output() {
        let env = Env::new();
        let output = Rc::new(RefCell::new(String::new()));
        register_printers(&env, Rc::clone(&output)).unwrap();
        let println = env
            .registry()
            .unwrap()
            .core()
            .find_var("println")
            .unwrap()
            .get();
        crate::eval::apply(&println, &[Expr::string("hi"), Expr::Int(2)]).unwrap();
        assert_eq!(output.borrow().as_str(), "hi 2\n");
    }
}

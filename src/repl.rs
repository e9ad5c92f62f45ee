// stepper - Interactive loop
// Copyright (c) 2025 Tom Waddington. MIT licensed.

use std::io::{self, BufRead, Write};

use crate::cli::Mode;
use crate::session::{Result, Session};

const HELP: &str = "\
:step FORM     show what FORM binds
:flatten FORM  inline one step of FORM
:run FORM      inline one step of FORM and evaluate it
:help          show this text
:quit          exit
anything else is evaluated";

/// One line of REPL input.
#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Eval(&'a str),
    Rewrite(Mode, &'a str),
    Run(&'a str),
    Help,
    Quit,
    Empty,
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }
        if !line.starts_with(':') || !line[1..].starts_with(|c: char| c.is_alphabetic()) {
            return Command::Eval(line);
        }

        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        match word {
            ":step" => Command::Rewrite(Mode::StepIn, rest),
            ":flatten" => Command::Rewrite(Mode::Flatten, rest),
            ":run" => Command::Run(rest),
            ":help" => Command::Help,
            ":quit" | ":q" => Command::Quit,
            // A bare keyword evaluates to itself
            _ if rest.is_empty() => Command::Eval(line),
            _ => Command::Unknown(word),
        }
    }
}

/// Result of handling one line.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Print(String),
    Nothing,
    Quit,
}

pub fn handle_line(session: &Session, line: &str) -> Result<Outcome> {
    let outcome = match Command::parse(line) {
        Command::Empty => Outcome::Nothing,
        Command::Quit => Outcome::Quit,
        Command::Help => Outcome::Print(HELP.to_string()),
        Command::Unknown(word) => Outcome::Print(format!("unknown command {}, try :help", word)),
        Command::Eval(source) => Outcome::Print(session.eval(source)?.to_string()),
        Command::Rewrite(mode, source) => {
            Outcome::Print(session.rewrite(mode, source)?.to_string())
        }
        Command::Run(source) => {
            let rewritten = session.rewrite(Mode::Flatten, source)?;
            let value = session.run(&rewritten)?;
            Outcome::Print(format!("{}\n=> {}", rewritten, value))
        }
    };
    Ok(outcome)
}

/// Run the loop until `:quit` or end of input.
pub fn run_repl(session: &Session) {
    println!("stepper v{} (:help for commands)", env!("CARGO_PKG_VERSION"));
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("{}=> ", session.runtime().registry().current_name());
        let _ = io::stdout().flush();

        let line = match lines.next() {
            None => {
                println!();
                break;
            }
            Some(Err(e)) => {
                eprintln!("Read error: {}", e);
                break;
            }
            Some(Ok(line)) => line,
        };

        match handle_line(session, &line) {
            Ok(Outcome::Print(text)) => println!("{}", text),
            Ok(Outcome::Nothing) => {}
            Ok(Outcome::Quit) => break,
            Err(e) => eprintln!("{}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use stepper_core::StepOptions;
    use stepper_runtime::Runtime;

    use super::*;

    fn session() -> Session {
        let runtime = Runtime::new().unwrap();
        runtime.eval_str("(defn add [a b] (+ a b))").unwrap();
        Session::new(runtime, StepOptions::DEFAULT)
    }

    fn printed(session: &Session, line: &str) -> String {
        match handle_line(session, line).unwrap() {
            Outcome::Print(text) => text,
            other => panic!("expected output for {}, got {:?}", line, other),
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("  "), Command::Empty);
        assert_eq!(Command::parse(":quit"), Command::Quit);
        assert_eq!(
            Command::parse(":step (f 1)"),
            Command::Rewrite(Mode::StepIn, "(f 1)")
        );
        assert_eq!(
            Command::parse(":flatten  (f 1) "),
            Command::Rewrite(Mode::Flatten, "(f 1)")
        );
        assert_eq!(Command::parse(":run (f)"), Command::Run("(f)"));
        assert_eq!(Command::parse("(+ 1 2)"), Command::Eval("(+ 1 2)"));
        assert_eq!(Command::parse(":kw"), Command::Eval(":kw"));
        assert_eq!(Command::parse(":stpe (f)"), Command::Unknown(":stpe"));
    }

    #[test]
    fn test_handle_lines() {
        let session = session();
        assert_eq!(printed(&session, "(add 2 3)"), "5");
        assert_eq!(
            printed(&session, ":flatten (add 2 3)"),
            "(let* [a 2 b 3] (+ a b))"
        );
        assert_eq!(
            printed(&session, ":run (add 2 3)"),
            "(let* [a 2 b 3] (+ a b))\n=> 5"
        );
        assert_eq!(
            printed(&session, ":step (add 2 3)"),
            "(let* [a 2 b 3] {(quote a) a, (quote b) b})"
        );
        assert_eq!(handle_line(&session, ":quit").unwrap(), Outcome::Quit);
        assert!(handle_line(&session, ":step (missing 1)").is_err());
    }
}

// stepper - Stepping session shared by one-shot and REPL use
// Copyright (c) 2025 Tom Waddington. MIT licensed.

use std::fmt;
use std::path::Path;

use stepper_core::{Flattener, StepOptions};
use stepper_parser::Expr;
use stepper_runtime::Runtime;
use tracing::debug;

use crate::cli::Mode;

/// Failure of a session operation, already rendered for the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A stepping failure: kind, message and the form to look at
    Step {
        kind: &'static str,
        message: String,
        form: String,
    },
    Read(String),
    Eval(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Step {
                kind,
                message,
                form,
            } => write!(f, "error[{}]: {}\n  --> {}", kind, message, form),
            SessionError::Read(message) => write!(f, "error[Read]: {}", message),
            SessionError::Eval(message) => write!(f, "error[Eval]: {}", message),
        }
    }
}

impl From<stepper_core::Error> for SessionError {
    fn from(err: stepper_core::Error) -> Self {
        SessionError::Step {
            kind: err.kind(),
            message: err.to_string(),
            form: err.offending_form().to_string(),
        }
    }
}

impl From<stepper_runtime::Error> for SessionError {
    fn from(err: stepper_runtime::Error) -> Self {
        SessionError::Eval(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// A runtime plus the options used to step against it.
pub struct Session {
    runtime: Runtime,
    options: StepOptions,
}

impl Session {
    pub fn new(runtime: Runtime, options: StepOptions) -> Self {
        Session { runtime, options }
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn load_file(&self, path: &Path) -> Result<()> {
        debug!(target: "stepper::cli", path = %path.display(), "loading");
        self.runtime.load_file(path)?;
        Ok(())
    }

    /// Evaluate source text, returning the last value.
    pub fn eval(&self, source: &str) -> Result<Expr> {
        Ok(self.runtime.eval_str(source)?)
    }

    /// Rewrite the single call in `source`.
    pub fn rewrite(&self, mode: Mode, source: &str) -> Result<Expr> {
        let form = self.read_form(source)?;
        let flattener = Flattener::new(&self.runtime, self.options);
        let rewritten = match mode {
            Mode::StepIn => flattener.step_in(&form)?,
            Mode::Flatten => flattener.flatten_call(&form)?,
        };
        Ok(rewritten)
    }

    /// Evaluate a rewritten expression.
    pub fn run(&self, rewritten: &Expr) -> Result<Expr> {
        Ok(self.runtime.eval(rewritten)?)
    }

    fn read_form(&self, source: &str) -> Result<Expr> {
        stepper_parser::read(source)
            .map_err(|e| SessionError::Read(e.to_string()))?
            .ok_or_else(|| SessionError::Read("no form to step into".to_string()))
    }
}

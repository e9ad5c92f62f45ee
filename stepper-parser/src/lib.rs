// stepper-parser - Reader and expression tree for the stepper
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # stepper-parser
//!
//! Lexer, parser and printer for Clojure-style source text.
//! Produces [`Expr`] trees from source strings and prints them back as
//! readable source.

mod intern;

pub mod expr;
pub mod keyword;
pub mod lexer;
pub mod parser;
pub mod symbol;

pub use expr::{AtomCell, Expr, Lambda, LambdaArity, NativeFn};
pub use im::{OrdMap, OrdSet, Vector};
pub use keyword::Keyword;
pub use lexer::{Lexer, LexerError, Token};
pub use parser::{
    ParseError, ParseErrorKind, Parser, READ_EVAL, ReaderOptions, Span, read, read_all,
    read_all_with,
};
pub use symbol::Symbol;

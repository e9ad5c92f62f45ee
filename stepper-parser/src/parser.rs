// stepper-parser - Parser
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Recursive descent parser.
//!
//! Converts tokens into [`Expr`] trees. Reader macros expand into ordinary
//! list forms (`'x` becomes `(quote x)`, `^m x` becomes `(with-meta x m)`),
//! so downstream code only ever sees data.

use thiserror::Error;

use crate::expr::Expr;
use crate::keyword::Keyword;
use crate::lexer::{Lexer, LexerError, Token};
use crate::symbol::Symbol;

/// Head symbol of the form produced by `#=x` when read-eval is enabled.
pub const READ_EVAL: &str = "read-eval*";

/// What went wrong while reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    Syntax,
    /// The input ended before the form was complete
    UnexpectedEof,
    /// `#=` was read while [`ReaderOptions::read_eval`] is off
    ReadEvalDisabled,
}

/// Parser error with position information.
#[derive(Debug, Clone, Error)]
#[error("Parse error at {line}:{column}: {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl From<LexerError> for ParseError {
    fn from(e: LexerError) -> Self {
        ParseError {
            kind: if e.at_eof {
                ParseErrorKind::UnexpectedEof
            } else {
                ParseErrorKind::Syntax
            },
            message: e.message,
            line: e.line,
            column: e.column,
        }
    }
}

/// Reader settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Accept `#=form` read-time evaluation. The parser never evaluates; it
    /// wraps the form as `(read-eval* form)` for the evaluator to expand.
    pub read_eval: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions { read_eval: true }
    }
}

/// Location of a top-level form in its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// 1-indexed line of the form's first character
    pub line: usize,
    /// 1-indexed column of the form's first character
    pub column: usize,
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset just past the last character
    pub end: usize,
}

impl Span {
    /// The exact text of the form.
    pub fn slice<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.start..self.end).unwrap_or_default()
    }
}

/// The parser converts tokens into `Expr` trees.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    options: ReaderOptions,
    /// Position of `current`
    line: usize,
    column: usize,
    start: usize,
    /// Byte offset just past the previously consumed token
    prev_end: usize,
    anon_fn_depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Result<Self, ParseError> {
        Self::with_options(source, ReaderOptions::default())
    }

    pub fn with_options(source: &'a str, options: ReaderOptions) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        lexer.skip_trivia();
        let (line, column, start) = (lexer.line(), lexer.column(), lexer.offset());
        let current = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current,
            options,
            line,
            column,
            start,
            prev_end: 0,
            anon_fn_depth: 0,
        })
    }

    /// Parse a single form. Returns `None` at end of input.
    pub fn parse(&mut self) -> Result<Option<Expr>, ParseError> {
        Ok(self.parse_spanned()?.map(|(form, _)| form))
    }

    /// Parse a single form along with its source span.
    pub fn parse_spanned(&mut self) -> Result<Option<(Expr, Span)>, ParseError> {
        if matches!(self.current, Token::Eof) {
            return Ok(None);
        }
        let (line, column, start) = (self.line, self.column, self.start);
        let form = self.parse_form()?;
        let span = Span {
            line,
            column,
            start,
            end: self.prev_end,
        };
        Ok(Some((form, span)))
    }

    /// Parse all remaining forms.
    pub fn parse_all(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut forms = Vec::new();
        while let Some(form) = self.parse()? {
            forms.push(form);
        }
        Ok(forms)
    }

    /// Parse all remaining forms with their spans.
    pub fn parse_all_spanned(&mut self) -> Result<Vec<(Expr, Span)>, ParseError> {
        let mut forms = Vec::new();
        while let Some(item) = self.parse_spanned()? {
            forms.push(item);
        }
        Ok(forms)
    }

    // ========================================================================
    // Internal parsing methods
    // ========================================================================

    fn advance(&mut self) -> Result<Token, ParseError> {
        self.prev_end = self.lexer.offset();
        self.lexer.skip_trivia();
        self.line = self.lexer.line();
        self.column = self.lexer.column();
        self.start = self.lexer.offset();
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn error(&self, kind: ParseErrorKind, message: String) -> ParseError {
        ParseError {
            kind,
            message,
            line: self.line,
            column: self.column,
        }
    }

    fn expect_close(&mut self, close: &Token) -> Result<(), ParseError> {
        if &self.current == close {
            self.advance()?;
            Ok(())
        } else if matches!(self.current, Token::Eof) {
            Err(self.error(
                ParseErrorKind::UnexpectedEof,
                format!("Unexpected end of input, expected '{}'", close),
            ))
        } else {
            Err(self.error(
                ParseErrorKind::Syntax,
                format!("Expected '{}', found '{}'", close, self.current),
            ))
        }
    }

    fn parse_form(&mut self) -> Result<Expr, ParseError> {
        let literal = match &self.current {
            Token::Nil => Some(Expr::Nil),
            Token::True => Some(Expr::Bool(true)),
            Token::False => Some(Expr::Bool(false)),
            Token::Int(n) => Some(Expr::Int(*n)),
            Token::Float(n) => Some(Expr::Float(*n)),
            Token::Char(c) => Some(Expr::Char(*c)),
            Token::String(s) => Some(Expr::string(s.as_str())),
            Token::Symbol(s) => Some(Expr::Symbol(Symbol::parse(s))),
            Token::Keyword(s) => Some(Expr::Keyword(Keyword::parse(s))),
            _ => None,
        };
        if let Some(value) = literal {
            self.advance()?;
            return Ok(value);
        }

        match &self.current {
            Token::LParen => self.parse_seq(Token::RParen).map(Expr::list),
            Token::LBracket => self.parse_seq(Token::RBracket).map(Expr::vector),
            Token::LBrace => self.parse_map(),
            Token::Set => self.parse_seq(Token::RBrace).map(Expr::set),

            Token::Quote => self.parse_wrapped("quote"),
            Token::SyntaxQuote => self.parse_wrapped("syntax-quote"),
            Token::Unquote => self.parse_wrapped("unquote"),
            Token::UnquoteSplice => self.parse_wrapped("unquote-splicing"),
            Token::Deref => self.parse_wrapped("deref"),
            Token::VarQuote => self.parse_wrapped("var"),
            Token::AnonFn => self.parse_anon_fn(),
            Token::Discard => self.parse_discard(),
            Token::Meta => self.parse_meta(),
            Token::ReadEval => self.parse_read_eval(),

            Token::RParen | Token::RBracket | Token::RBrace => Err(self.error(
                ParseErrorKind::Syntax,
                format!("Unexpected '{}'", self.current),
            )),
            Token::Eof => Err(self.error(
                ParseErrorKind::UnexpectedEof,
                "Unexpected end of input".to_string(),
            )),
            _ => Err(self.error(
                ParseErrorKind::Syntax,
                format!("Unexpected token '{}'", self.current),
            )),
        }
    }

    fn parse_seq(&mut self, close: Token) -> Result<Vec<Expr>, ParseError> {
        self.advance()?; // consume the opening delimiter
        let mut elements = Vec::new();
        while self.current != close && !matches!(self.current, Token::Eof) {
            elements.push(self.parse_form()?);
        }
        self.expect_close(&close)?;
        Ok(elements)
    }

    fn parse_map(&mut self) -> Result<Expr, ParseError> {
        let (line, column) = (self.line, self.column);
        let elements = self.parse_seq(Token::RBrace)?;
        if elements.len() % 2 != 0 {
            return Err(ParseError {
                kind: ParseErrorKind::Syntax,
                message: "Map literal must contain an even number of forms".to_string(),
                line,
                column,
            });
        }
        let mut iter = elements.into_iter();
        let mut pairs = Vec::new();
        while let (Some(k), Some(v)) = (iter.next(), iter.next()) {
            pairs.push((k, v));
        }
        Ok(Expr::map(pairs))
    }

    fn parse_wrapped(&mut self, head: &str) -> Result<Expr, ParseError> {
        self.advance()?; // consume the reader macro token
        let form = self.parse_form()?;
        Ok(Expr::list(vec![Expr::Symbol(Symbol::new(head)), form]))
    }

    fn parse_read_eval(&mut self) -> Result<Expr, ParseError> {
        if !self.options.read_eval {
            return Err(self.error(
                ParseErrorKind::ReadEvalDisabled,
                "Read-time evaluation (#=) is disabled".to_string(),
            ));
        }
        self.parse_wrapped(READ_EVAL)
    }

    fn parse_discard(&mut self) -> Result<Expr, ParseError> {
        self.advance()?; // consume #_
        self.parse_form()?;
        self.parse_form()
    }

    fn parse_anon_fn(&mut self) -> Result<Expr, ParseError> {
        if self.anon_fn_depth > 0 {
            return Err(self.error(
                ParseErrorKind::Syntax,
                "Nested #() literals are not allowed".to_string(),
            ));
        }
        self.anon_fn_depth += 1;
        let body = self.parse_seq(Token::RParen);
        self.anon_fn_depth -= 1;
        let body = Expr::list(body?);

        let mut max_arg = 0;
        let mut has_rest = false;
        scan_anon_args(&body, &mut max_arg, &mut has_rest);

        let mut params: Vec<Expr> = (1..=max_arg)
            .map(|i| Expr::Symbol(anon_param(i)))
            .collect();
        if has_rest {
            params.push(Expr::sym("&"));
            params.push(Expr::Symbol(Symbol::new("rest__#")));
        }

        Ok(Expr::list(vec![
            Expr::sym("fn*"),
            Expr::vector(params),
            rename_anon_args(body),
        ]))
    }

    fn parse_meta(&mut self) -> Result<Expr, ParseError> {
        self.advance()?; // consume ^
        let meta = match self.parse_form()? {
            kw @ Expr::Keyword(_) => Expr::map(vec![(kw, Expr::Bool(true))]),
            tag @ (Expr::Symbol(_) | Expr::String(_)) => Expr::map(vec![(Expr::kw("tag"), tag)]),
            map @ Expr::Map(_) => map,
            other => {
                return Err(self.error(
                    ParseErrorKind::Syntax,
                    format!(
                        "Metadata must be Symbol, Keyword, String or Map, got {}",
                        other.type_name()
                    ),
                ));
            }
        };
        let form = self.parse_form()?;
        Ok(Expr::list(vec![Expr::sym("with-meta"), form, meta]))
    }
}

fn anon_param(i: usize) -> Symbol {
    Symbol::new(&format!("p{}__#", i))
}

fn anon_arg_index(sym: &Symbol) -> Option<Option<usize>> {
    if sym.has_namespace() {
        return None;
    }
    match sym.name() {
        "%" => Some(Some(1)),
        "%&" => Some(None),
        name => name
            .strip_prefix('%')
            .and_then(|n| n.parse::<usize>().ok())
            .map(Some),
    }
}

fn scan_anon_args(form: &Expr, max_arg: &mut usize, has_rest: &mut bool) {
    match form {
        Expr::Symbol(sym) => match anon_arg_index(sym) {
            Some(Some(i)) => *max_arg = (*max_arg).max(i),
            Some(None) => *has_rest = true,
            None => {}
        },
        Expr::List(items) | Expr::Vector(items) => {
            items.iter().for_each(|i| scan_anon_args(i, max_arg, has_rest));
        }
        Expr::Map(map) => map.iter().for_each(|(k, v)| {
            scan_anon_args(k, max_arg, has_rest);
            scan_anon_args(v, max_arg, has_rest);
        }),
        Expr::Set(set) => set.iter().for_each(|i| scan_anon_args(i, max_arg, has_rest)),
        _ => {}
    }
}

fn rename_anon_args(form: Expr) -> Expr {
    match form {
        Expr::Symbol(sym) => match anon_arg_index(&sym) {
            Some(Some(i)) => Expr::Symbol(anon_param(i)),
            Some(None) => Expr::Symbol(Symbol::new("rest__#")),
            None => Expr::Symbol(sym),
        },
        Expr::List(items) => Expr::List(items.into_iter().map(rename_anon_args).collect()),
        Expr::Vector(items) => Expr::Vector(items.into_iter().map(rename_anon_args).collect()),
        Expr::Map(map) => Expr::Map(
            map.into_iter()
                .map(|(k, v)| (rename_anon_args(k), rename_anon_args(v)))
                .collect(),
        ),
        Expr::Set(set) => Expr::Set(set.into_iter().map(rename_anon_args).collect()),
        other => other,
    }
}

// ============================================================================
// Convenience functions
// ============================================================================

/// Parse a string and return the first form.
pub fn read(source: &str) -> Result<Option<Expr>, ParseError> {
    Parser::new(source)?.parse()
}

/// Parse a string and return all forms.
pub fn read_all(source: &str) -> Result<Vec<Expr>, ParseError> {
    Parser::new(source)?.parse_all()
}

/// Parse a string with explicit reader options and return all forms.
pub fn read_all_with(source: &str, options: ReaderOptions) -> Result<Vec<Expr>, ParseError> {
    Parser::with_options(source, options)?.parse_all()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Expr {
        read(s).unwrap().unwrap()
    }

    #[test]
    fn test_literals() {
        assert_eq!(parse("nil"), Expr::Nil);
        assert_eq!(parse("true"), Expr::Bool(true));
        assert_eq!(parse("-12"), Expr::Int(-12));
        assert_eq!(parse("2.5"), Expr::Float(2.5));
        assert_eq!(parse(r"\newline"), Expr::Char('\n'));
        assert_eq!(parse(r#""hi""#), Expr::string("hi"));
        assert_eq!(parse(":k"), Expr::kw("k"));
    }

    #[test]
    fn test_round_trips_through_display() {
        let src = r#"(defn f "doc" ([a] (f a 1)) ([a & {:keys [b], :or {b 2}}] [a b #{:x}]))"#;
        assert_eq!(parse(src).to_string(), src);
    }

    #[test]
    fn test_collections() {
        assert_eq!(parse("[1 2]"), Expr::vector(vec![Expr::Int(1), Expr::Int(2)]));
        assert_eq!(parse("()"), Expr::list(vec![]));
        assert_eq!(parse("{:a 1}"), Expr::map(vec![(Expr::kw("a"), Expr::Int(1))]));
        assert_eq!(parse("#{1}"), Expr::set(vec![Expr::Int(1)]));
    }

    #[test]
    fn test_odd_map_is_error() {
        let err = read("{:a}").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Syntax);
    }

    #[test]
    fn test_reader_macros_expand() {
        assert_eq!(parse("'x").to_string(), "(quote x)");
        assert_eq!(parse("@a").to_string(), "(deref a)");
        assert_eq!(parse("#'f").to_string(), "(var f)");
        assert_eq!(parse("`(a ~b ~@c)").to_string(), "(syntax-quote (a (unquote b) (unquote-splicing c)))");
        assert_eq!(parse("^:private f").to_string(), "(with-meta f {:private true})");
    }

    #[test]
    fn test_discard() {
        assert_eq!(parse("[1 #_2 3]").to_string(), "[1 3]");
    }

    #[test]
    fn test_anon_fn() {
        assert_eq!(parse("#(+ % %2)").to_string(), "(fn* [p1__# p2__#] (+ p1__# p2__#))");
        assert_eq!(parse("#(apply f %&)").to_string(), "(fn* [& rest__#] (apply f rest__#))");
        assert!(read("#(#(%))").is_err());
    }

    #[test]
    fn test_read_eval() {
        assert_eq!(parse("#=(+ 1 2)").to_string(), "(read-eval* (+ 1 2))");
        let err = read_all_with("(f #=(+ 1 2))", ReaderOptions { read_eval: false }).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ReadEvalDisabled);
    }

    #[test]
    fn test_unexpected_eof() {
        assert_eq!(read("(defn f [x]").unwrap_err().kind, ParseErrorKind::UnexpectedEof);
        assert_eq!(read("\"abc").unwrap_err().kind, ParseErrorKind::UnexpectedEof);
        assert_eq!(read(")").unwrap_err().kind, ParseErrorKind::Syntax);
    }

    #[test]
    fn test_empty_input() {
        assert!(read("").unwrap().is_none());
        assert!(read(" ; comment only").unwrap().is_none());
    }

    #[test]
    fn test_spans_cover_exact_source() {
        let src = "; leading\n(defn f [x]\n  (inc x))  (def y 2)";
        let forms = Parser::new(src).unwrap().parse_all_spanned().unwrap();
        assert_eq!(forms.len(), 2);
        let first = forms[0].1;
        assert_eq!((first.line, first.column), (2, 1));
        assert_eq!(first.slice(src), "(defn f [x]\n  (inc x))");
        let second = forms[1].1;
        assert_eq!(second.line, 3);
        assert_eq!(second.slice(src), "(def y 2)");
    }
}

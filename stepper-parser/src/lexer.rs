// stepper-parser - Lexer
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Lexer (tokeniser) for source text.
//!
//! Converts a source string into a stream of tokens, tracking line, column
//! and byte offset so the parser can report spans.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use thiserror::Error;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Delimiters
    LParen,   // (
    RParen,   // )
    LBracket, // [
    RBracket, // ]
    LBrace,   // {
    RBrace,   // }

    // Reader macros
    Quote,         // '
    SyntaxQuote,   // `
    Unquote,       // ~
    UnquoteSplice, // ~@
    Deref,         // @
    VarQuote,      // #'
    AnonFn,        // #(
    Set,           // #{
    Discard,       // #_
    Meta,          // ^
    ReadEval,      // #=

    // Literals
    Nil,
    True,
    False,
    Int(i64),
    Float(f64),
    Char(char),
    String(String),
    Symbol(String),
    Keyword(String),

    Eof,
}

impl Token {
    /// Source text of a delimiter or reader macro token.
    pub fn punctuation(&self) -> Option<&'static str> {
        let text = match self {
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::Quote => "'",
            Token::SyntaxQuote => "`",
            Token::Unquote => "~",
            Token::UnquoteSplice => "~@",
            Token::Deref => "@",
            Token::VarQuote => "#'",
            Token::AnonFn => "#(",
            Token::Set => "#{",
            Token::Discard => "#_",
            Token::Meta => "^",
            Token::ReadEval => "#=",
            _ => return None,
        };
        Some(text)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = self.punctuation() {
            return f.write_str(text);
        }
        match self {
            Token::Nil => f.write_str("nil"),
            Token::True => f.write_str("true"),
            Token::False => f.write_str("false"),
            Token::Int(n) => write!(f, "{}", n),
            Token::Float(n) => write!(f, "{}", n),
            Token::Char(c) => write!(f, "\\{}", c),
            Token::String(s) => write!(f, "{:?}", s),
            Token::Symbol(s) => f.write_str(s),
            Token::Keyword(s) => write!(f, ":{}", s),
            Token::Eof => f.write_str("end of input"),
            _ => Ok(()),
        }
    }
}

/// Lexer error with position information.
#[derive(Debug, Clone, Error)]
#[error("Lexer error at {line}:{column}: {message}")]
pub struct LexerError {
    pub message: String,
    pub line: usize,
    pub column: usize,
    /// The input ended inside a token (string, escape, dispatch)
    pub at_eof: bool,
}

/// The lexer converts source text into tokens.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
    offset: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
            offset: 0,
        }
    }

    /// Get the next token from the source.
    pub fn next_token(&mut self) -> Result<Token, LexerError> {
        self.skip_whitespace_and_comments();

        let Some(c) = self.peek() else {
            return Ok(Token::Eof);
        };

        match c {
            '(' => self.single(Token::LParen),
            ')' => self.single(Token::RParen),
            '[' => self.single(Token::LBracket),
            ']' => self.single(Token::RBracket),
            '{' => self.single(Token::LBrace),
            '}' => self.single(Token::RBrace),
            '\'' => self.single(Token::Quote),
            '`' => self.single(Token::SyntaxQuote),
            '@' => self.single(Token::Deref),
            '^' => self.single(Token::Meta),
            '~' => {
                self.advance();
                if self.peek() == Some('@') {
                    self.advance();
                    Ok(Token::UnquoteSplice)
                } else {
                    Ok(Token::Unquote)
                }
            }
            '#' => self.read_dispatch(),
            '"' => self.read_string(),
            '\\' => self.read_char(),
            ':' => self.read_keyword(),
            '-' | '+' => self.read_number_or_symbol(),
            '0'..='9' => self.read_number(),
            _ if is_symbol_start(c) => self.read_symbol(),
            _ => Err(self.error(format!("Unexpected character: '{}'", c))),
        }
    }

    /// Collect all tokens into a vector.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            if matches!(token, Token::Eof) {
                break;
            }
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Current line (1-indexed).
    pub fn line(&self) -> usize {
        self.line
    }

    /// Current column (1-indexed).
    pub fn column(&self) -> usize {
        self.column
    }

    /// Current byte offset into the source.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Skip whitespace and comments so the position points at the next token.
    pub fn skip_trivia(&mut self) {
        self.skip_whitespace_and_comments();
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn single(&mut self, token: Token) -> Result<Token, LexerError> {
        self.advance();
        Ok(token)
    }

    fn error(&self, message: String) -> LexerError {
        LexerError {
            message,
            line: self.line,
            column: self.column,
            at_eof: false,
        }
    }

    fn eof_error(&self, message: &str) -> LexerError {
        LexerError {
            at_eof: true,
            ..self.error(message.to_string())
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() || c == ',' => {
                    self.advance();
                }
                Some(';') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn read_dispatch(&mut self) -> Result<Token, LexerError> {
        self.advance(); // consume #

        match self.peek() {
            Some('\'') => self.single(Token::VarQuote),
            Some('(') => self.single(Token::AnonFn),
            Some('{') => self.single(Token::Set),
            Some('_') => self.single(Token::Discard),
            Some('=') => self.single(Token::ReadEval),
            Some('#') => {
                self.advance();
                self.read_special_float()
            }
            Some(c) => Err(self.error(format!("Unsupported dispatch macro: #{}", c))),
            None => Err(self.eof_error("Unexpected end of input after #")),
        }
    }

    fn read_special_float(&mut self) -> Result<Token, LexerError> {
        let mut name = String::new();
        while let Some(c) = self.peek().filter(|c| is_symbol_char(*c)) {
            name.push(c);
            self.advance();
        }
        match name.as_str() {
            "Inf" => Ok(Token::Float(f64::INFINITY)),
            "-Inf" => Ok(Token::Float(f64::NEG_INFINITY)),
            "NaN" => Ok(Token::Float(f64::NAN)),
            _ => Err(self.error(format!("Unknown special value: ##{}", name))),
        }
    }

    fn read_string(&mut self) -> Result<Token, LexerError> {
        self.advance(); // consume opening "
        let mut s = String::new();

        loop {
            match self.advance() {
                Some('"') => break,
                Some('\\') => match self.advance() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some('r') => s.push('\r'),
                    Some('\\') => s.push('\\'),
                    Some('"') => s.push('"'),
                    Some('u') => s.push(self.read_unicode_escape()?),
                    Some(c) => return Err(self.error(format!("Unknown escape sequence: \\{}", c))),
                    None => return Err(self.eof_error("Unterminated string escape")),
                },
                Some(c) => s.push(c),
                None => return Err(self.eof_error("Unterminated string")),
            }
        }

        Ok(Token::String(s))
    }

    fn read_unicode_escape(&mut self) -> Result<char, LexerError> {
        let mut hex = String::with_capacity(4);
        for _ in 0..4 {
            match self.advance() {
                Some(c) if c.is_ascii_hexdigit() => hex.push(c),
                Some(c) => {
                    return Err(self.error(format!("Invalid hex digit in unicode escape: {}", c)));
                }
                None => return Err(self.eof_error("Unterminated unicode escape")),
            }
        }
        decode_code_point(&hex).ok_or_else(|| self.error(format!("Invalid unicode escape: {}", hex)))
    }

    fn read_char(&mut self) -> Result<Token, LexerError> {
        self.advance(); // consume backslash

        let first = self
            .advance()
            .ok_or_else(|| self.eof_error("Expected character after \\"))?;

        if !first.is_ascii_alphabetic() {
            return Ok(Token::Char(first));
        }

        let mut name = String::from(first);
        while let Some(c) = self.peek().filter(char::is_ascii_alphanumeric) {
            name.push(c);
            self.advance();
        }

        match name.as_str() {
            "newline" => Ok(Token::Char('\n')),
            "space" => Ok(Token::Char(' ')),
            "tab" => Ok(Token::Char('\t')),
            "return" => Ok(Token::Char('\r')),
            "backspace" => Ok(Token::Char('\x08')),
            "formfeed" => Ok(Token::Char('\x0C')),
            _ if name.len() == 1 => Ok(Token::Char(first)),
            _ if name.len() == 5 && name.starts_with('u') => decode_code_point(&name[1..])
                .map(Token::Char)
                .ok_or_else(|| self.error(format!("Invalid unicode escape: \\{}", name))),
            _ => Err(self.error(format!("Unknown character name: \\{}", name))),
        }
    }

    fn read_keyword(&mut self) -> Result<Token, LexerError> {
        self.advance(); // consume :
        let name = self.collect_symbol_chars(String::new());
        if name.is_empty() {
            return Err(self.error("Expected keyword name after :".to_string()));
        }
        if name.starts_with(':') {
            return Err(self.error(format!("Auto-resolved keywords are not supported: :{}", name)));
        }
        Ok(Token::Keyword(name))
    }

    fn read_symbol(&mut self) -> Result<Token, LexerError> {
        let name = self.collect_symbol_chars(String::new());
        Ok(match name.as_str() {
            "nil" => Token::Nil,
            "true" => Token::True,
            "false" => Token::False,
            _ => Token::Symbol(name),
        })
    }

    fn collect_symbol_chars(&mut self, mut name: String) -> String {
        while let Some(c) = self.peek().filter(|c| is_symbol_char(*c) || *c == ':') {
            name.push(c);
            self.advance();
        }
        name
    }

    fn read_number_or_symbol(&mut self) -> Result<Token, LexerError> {
        let sign = self.advance().map(String::from).unwrap_or_default();

        match self.peek() {
            Some(c) if c.is_ascii_digit() => {
                let mut s = sign;
                self.collect_number_chars(&mut s);
                self.parse_number(&s)
            }
            _ => Ok(Token::Symbol(self.collect_symbol_chars(sign))),
        }
    }

    fn read_number(&mut self) -> Result<Token, LexerError> {
        let mut s = String::new();
        self.collect_number_chars(&mut s);
        self.parse_number(&s)
    }

    fn collect_number_chars(&mut self, s: &mut String) {
        while let Some(c) = self
            .peek()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-'))
        {
            s.push(c);
            self.advance();
        }
    }

    fn parse_number(&self, s: &str) -> Result<Token, LexerError> {
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };

        if let Some(hex) = digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
        {
            let n = i64::from_str_radix(hex, 16)
                .map_err(|_| self.error(format!("Invalid hex integer: {}", s)))?;
            return Ok(Token::Int(if negative { -n } else { n }));
        }

        if digits.contains(['.', 'e', 'E']) {
            return s
                .parse::<f64>()
                .map(Token::Float)
                .map_err(|_| self.error(format!("Invalid float: {}", s)));
        }

        s.parse::<i64>()
            .map(Token::Int)
            .map_err(|e| self.error(format!("Invalid integer {}: {}", s, e)))
    }
}

fn decode_code_point(hex: &str) -> Option<char> {
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}

/// Check if a character can start a symbol.
fn is_symbol_start(c: char) -> bool {
    c.is_alphabetic()
        || matches!(
            c,
            '!' | '$' | '%' | '&' | '*' | '+' | '-' | '.' | '/' | '<' | '=' | '>' | '?' | '_'
        )
}

/// Check if a character can appear in a symbol.
fn is_symbol_char(c: char) -> bool {
    is_symbol_start(c) || c.is_ascii_digit() || c == '\'' || c == '#'
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(s: &str) -> Result<Vec<Token>, LexerError> {
        Lexer::new(s).tokenize()
    }

    #[test]
    fn test_delimiters() {
        assert_eq!(
            tokenize("()[]{}").unwrap(),
            vec![
                Token::LParen,
                Token::RParen,
                Token::LBracket,
                Token::RBracket,
                Token::LBrace,
                Token::RBrace,
            ]
        );
    }

    #[test]
    fn test_reader_macros() {
        assert_eq!(
            tokenize("' ` ~ ~@ @ ^ #' #( #{ #_ #=").unwrap(),
            vec![
                Token::Quote,
                Token::SyntaxQuote,
                Token::Unquote,
                Token::UnquoteSplice,
                Token::Deref,
                Token::Meta,
                Token::VarQuote,
                Token::AnonFn,
                Token::Set,
                Token::Discard,
                Token::ReadEval,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            tokenize("42 -7 +3 0xff 1.5 -2e3 ##Inf").unwrap(),
            vec![
                Token::Int(42),
                Token::Int(-7),
                Token::Int(3),
                Token::Int(255),
                Token::Float(1.5),
                Token::Float(-2000.0),
                Token::Float(f64::INFINITY),
            ]
        );
        assert!(tokenize("99999999999999999999").is_err());
    }

    #[test]
    fn test_symbols_and_keywords() {
        assert_eq!(
            tokenize("foo ns/bar & - ->> :keys :user/id nil true").unwrap(),
            vec![
                Token::Symbol("foo".into()),
                Token::Symbol("ns/bar".into()),
                Token::Symbol("&".into()),
                Token::Symbol("-".into()),
                Token::Symbol("->>".into()),
                Token::Keyword("keys".into()),
                Token::Keyword("user/id".into()),
                Token::Nil,
                Token::True,
            ]
        );
    }

    #[test]
    fn test_strings_and_chars() {
        assert_eq!(
            tokenize(r#""a\nbA" \a \space \λ \("#).unwrap(),
            vec![
                Token::String("a\nbA".into()),
                Token::Char('a'),
                Token::Char(' '),
                Token::Char('λ'),
                Token::Char('('),
            ]
        );
    }

    #[test]
    fn test_comments_and_commas_are_whitespace() {
        assert_eq!(
            tokenize("; header\n[a, b] ; trailing").unwrap(),
            vec![
                Token::LBracket,
                Token::Symbol("a".into()),
                Token::Symbol("b".into()),
                Token::RBracket,
            ]
        );
    }

    #[test]
    fn test_positions() {
        let mut lexer = Lexer::new("(a\n  bc)");
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        lexer.skip_trivia();
        assert_eq!((lexer.line(), lexer.column(), lexer.offset()), (2, 3, 5));
    }

    #[test]
    fn test_unterminated_string_is_eof_error() {
        let err = tokenize("\"abc").unwrap_err();
        assert!(err.at_eof);
        let err = tokenize("#!").unwrap_err();
        assert!(!err.at_eof);
    }
}

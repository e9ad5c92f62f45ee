// stepper-parser - Expression tree
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The expression type shared by the reader, the stepper and the reference
//! evaluator.
//!
//! Source forms are plain data: atoms, lists, vectors, maps and sets. The
//! evaluator also stores runtime values (closures, macros, native functions,
//! atoms) in the same type so that evaluation results can flow back into
//! expression trees. Those runtime variants carry type-erased payloads so this
//! crate does not depend on the evaluator.

use std::any::Any;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use im::{OrdMap, OrdSet, Vector};

use crate::keyword::Keyword;
use crate::symbol::Symbol;

/// A node in a symbolic expression tree.
#[derive(Clone)]
pub enum Expr {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    String(Rc<str>),
    Symbol(Symbol),
    Keyword(Keyword),
    /// Call form or quoted list
    List(Vector<Expr>),
    /// Array-like sequence, used for parameter and binding vectors
    Vector(Vector<Expr>),
    Map(OrdMap<Expr, Expr>),
    Set(OrdSet<Expr>),
    /// User-defined function (closure)
    Fn(Lambda),
    /// Like `Fn`, but receives its arguments unevaluated
    Macro(Lambda),
    NativeFn(NativeFn),
    Atom(AtomCell),
}

// ============================================================================
// Runtime payloads
// ============================================================================

/// One parameter list and body of a closure.
///
/// Destructuring patterns are expanded into `let*` bindings before a closure
/// is built, so parameters here are always plain symbols.
#[derive(Clone)]
pub struct LambdaArity {
    pub params: Vec<Symbol>,
    pub rest: Option<Symbol>,
    pub body: Vec<Expr>,
}

impl LambdaArity {
    pub fn new(params: Vec<Symbol>, rest: Option<Symbol>, body: Vec<Expr>) -> Self {
        LambdaArity { params, rest, body }
    }

    pub fn accepts(&self, arg_count: usize) -> bool {
        match self.rest {
            Some(_) => arg_count >= self.params.len(),
            None => arg_count == self.params.len(),
        }
    }
}

/// A closure: one or more arities plus the captured environment.
///
/// The environment type lives in the evaluator crate and is stored here as
/// `Rc<dyn Any>`.
#[derive(Clone)]
pub struct Lambda {
    pub name: Option<Symbol>,
    pub arities: Rc<[LambdaArity]>,
    pub env: Rc<dyn Any>,
}

impl Lambda {
    pub fn new(name: Option<Symbol>, arities: Vec<LambdaArity>, env: Rc<dyn Any>) -> Self {
        Lambda {
            name,
            arities: arities.into(),
            env,
        }
    }

    /// Exact fixed arity first, then the first variadic arity that fits.
    pub fn find_arity(&self, arg_count: usize) -> Option<&LambdaArity> {
        self.arities
            .iter()
            .find(|a| a.rest.is_none() && a.params.len() == arg_count)
            .or_else(|| self.arities.iter().find(|a| a.accepts(arg_count)))
    }

    fn same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.arities, &other.arities) && Rc::ptr_eq(&self.env, &other.env)
    }

    fn addr(&self) -> usize {
        Rc::as_ptr(&self.arities) as *const () as usize
    }
}

/// A native function. The callable is type-erased; the evaluator downcasts it.
#[derive(Clone)]
pub struct NativeFn {
    pub name: &'static str,
    func: Rc<dyn Any>,
}

impl NativeFn {
    pub fn new(name: &'static str, func: Rc<dyn Any>) -> Self {
        NativeFn { name, func }
    }

    pub fn func(&self) -> &Rc<dyn Any> {
        &self.func
    }
}

/// A mutable reference cell.
#[derive(Clone)]
pub struct AtomCell(Rc<RefCell<Expr>>);

impl AtomCell {
    pub fn new(value: Expr) -> Self {
        AtomCell(Rc::new(RefCell::new(value)))
    }

    pub fn deref(&self) -> Expr {
        self.0.borrow().clone()
    }

    /// Replace the value, returning the previous one.
    pub fn reset(&self, value: Expr) -> Expr {
        self.0.replace(value)
    }

    fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }
}

// ============================================================================
// Constructors and accessors
// ============================================================================

impl Expr {
    pub fn nil() -> Self {
        Expr::Nil
    }

    pub fn bool(b: bool) -> Self {
        Expr::Bool(b)
    }

    pub fn int(n: i64) -> Self {
        Expr::Int(n)
    }

    pub fn float(n: f64) -> Self {
        Expr::Float(n)
    }

    pub fn char(c: char) -> Self {
        Expr::Char(c)
    }

    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Expr::String(s.into())
    }

    pub fn symbol(sym: Symbol) -> Self {
        Expr::Symbol(sym)
    }

    /// Symbol from text, splitting on the namespace separator.
    pub fn sym(s: &str) -> Self {
        Expr::Symbol(Symbol::parse(s))
    }

    pub fn keyword(kw: Keyword) -> Self {
        Expr::Keyword(kw)
    }

    /// Keyword from text without the leading colon.
    pub fn kw(s: &str) -> Self {
        Expr::Keyword(Keyword::parse(s))
    }

    pub fn list(elements: Vec<Expr>) -> Self {
        Expr::List(elements.into_iter().collect())
    }

    pub fn vector(elements: Vec<Expr>) -> Self {
        Expr::Vector(elements.into_iter().collect())
    }

    pub fn map(pairs: Vec<(Expr, Expr)>) -> Self {
        Expr::Map(pairs.into_iter().collect())
    }

    pub fn set(elements: Vec<Expr>) -> Self {
        Expr::Set(elements.into_iter().collect())
    }

    pub fn atom(value: Expr) -> Self {
        Expr::Atom(AtomCell::new(value))
    }

    /// `(quote self)`
    pub fn quoted(self) -> Self {
        Expr::list(vec![Expr::sym("quote"), self])
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Expr::Nil)
    }

    /// Everything except `nil` and `false` is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Expr::Nil | Expr::Bool(false))
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Expr::Symbol(sym) => Some(sym),
            _ => None,
        }
    }

    pub fn as_keyword(&self) -> Option<&Keyword> {
        match self {
            Expr::Keyword(kw) => Some(kw),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Expr::String(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of a list or vector.
    pub fn as_items(&self) -> Option<&Vector<Expr>> {
        match self {
            Expr::List(items) | Expr::Vector(items) => Some(items),
            _ => None,
        }
    }

    /// True for an unqualified symbol with the given name.
    pub fn is_symbol_named(&self, name: &str) -> bool {
        matches!(self, Expr::Symbol(sym) if sym.is(name))
    }

    /// The head symbol of a non-empty list.
    pub fn head_symbol(&self) -> Option<&Symbol> {
        match self {
            Expr::List(items) => items.front().and_then(Expr::as_symbol),
            _ => None,
        }
    }

    /// True for a list whose head is the unqualified symbol `name`.
    pub fn is_call_to(&self, name: &str) -> bool {
        self.head_symbol().is_some_and(|sym| sym.is(name))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Expr::Nil => "nil",
            Expr::Bool(_) => "bool",
            Expr::Int(_) => "int",
            Expr::Float(_) => "float",
            Expr::Char(_) => "char",
            Expr::String(_) => "string",
            Expr::Symbol(_) => "symbol",
            Expr::Keyword(_) => "keyword",
            Expr::List(_) => "list",
            Expr::Vector(_) => "vector",
            Expr::Map(_) => "map",
            Expr::Set(_) => "set",
            Expr::Fn(_) | Expr::NativeFn(_) => "fn",
            Expr::Macro(_) => "macro",
            Expr::Atom(_) => "atom",
        }
    }
}

impl From<Symbol> for Expr {
    fn from(sym: Symbol) -> Self {
        Expr::Symbol(sym)
    }
}

impl From<Keyword> for Expr {
    fn from(kw: Keyword) -> Self {
        Expr::Keyword(kw)
    }
}

// ============================================================================
// Printing
// ============================================================================

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Nil => write!(f, "nil"),
            Expr::Bool(b) => write!(f, "{}", b),
            Expr::Int(n) => write!(f, "{}", n),
            Expr::Float(n) => {
                if n.is_nan() {
                    write!(f, "##NaN")
                } else if n.is_infinite() {
                    write!(f, "{}", if *n > 0.0 { "##Inf" } else { "##-Inf" })
                } else if n.fract() == 0.0 {
                    write!(f, "{}.0", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            Expr::Char(c) => write!(f, "\\{}", char_name(*c)),
            Expr::String(s) => write!(f, "\"{}\"", escape_string(s)),
            Expr::Symbol(sym) => write!(f, "{}", sym),
            Expr::Keyword(kw) => write!(f, "{}", kw),
            Expr::List(items) => write_seq(f, "(", items.iter(), ")"),
            Expr::Vector(items) => write_seq(f, "[", items.iter(), "]"),
            Expr::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} {}", k, v)?;
                }
                write!(f, "}}")
            }
            Expr::Set(set) => write_seq(f, "#{", set.iter(), "}"),
            Expr::Fn(lambda) => match &lambda.name {
                Some(name) => write!(f, "#<fn {}>", name),
                None => write!(f, "#<fn>"),
            },
            Expr::Macro(lambda) => match &lambda.name {
                Some(name) => write!(f, "#<macro {}>", name),
                None => write!(f, "#<macro>"),
            },
            Expr::NativeFn(native) => write!(f, "#<native-fn {}>", native.name),
            Expr::Atom(cell) => write!(f, "#<Atom: {}>", cell.0.borrow()),
        }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

fn write_seq<'a>(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    items: impl Iterator<Item = &'a Expr>,
    close: &str,
) -> fmt::Result {
    write!(f, "{}", open)?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, "{}", close)
}

fn char_name(c: char) -> String {
    match c {
        '\n' => "newline".to_string(),
        ' ' => "space".to_string(),
        '\t' => "tab".to_string(),
        '\r' => "return".to_string(),
        '\x08' => "backspace".to_string(),
        '\x0C' => "formfeed".to_string(),
        _ => c.to_string(),
    }
}

fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out
}

// ============================================================================
// Equality and ordering (for use as map keys and set elements)
// ============================================================================

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Expr::Nil, Expr::Nil) => true,
            (Expr::Bool(a), Expr::Bool(b)) => a == b,
            (Expr::Int(a), Expr::Int(b)) => a == b,
            (Expr::Float(a), Expr::Float(b)) => a.to_bits() == b.to_bits(),
            (Expr::Char(a), Expr::Char(b)) => a == b,
            (Expr::String(a), Expr::String(b)) => a == b,
            (Expr::Symbol(a), Expr::Symbol(b)) => a == b,
            (Expr::Keyword(a), Expr::Keyword(b)) => a == b,
            (Expr::List(a), Expr::List(b)) => a == b,
            (Expr::Vector(a), Expr::Vector(b)) => a == b,
            (Expr::Map(a), Expr::Map(b)) => a == b,
            (Expr::Set(a), Expr::Set(b)) => a == b,
            (Expr::Fn(a), Expr::Fn(b)) | (Expr::Macro(a), Expr::Macro(b)) => a.same(b),
            (Expr::NativeFn(a), Expr::NativeFn(b)) => Rc::ptr_eq(&a.func, &b.func),
            (Expr::Atom(a), Expr::Atom(b)) => Rc::ptr_eq(&a.0, &b.0),
            _ => false,
        }
    }
}

impl Eq for Expr {}

impl PartialOrd for Expr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Expr {
    fn cmp(&self, other: &Self) -> Ordering {
        fn type_order(e: &Expr) -> u8 {
            match e {
                Expr::Nil => 0,
                Expr::Bool(_) => 1,
                Expr::Int(_) | Expr::Float(_) => 2,
                Expr::Char(_) => 3,
                Expr::String(_) => 4,
                Expr::Symbol(_) => 5,
                Expr::Keyword(_) => 6,
                Expr::List(_) => 7,
                Expr::Vector(_) => 8,
                Expr::Map(_) => 9,
                Expr::Set(_) => 10,
                Expr::Fn(_) => 11,
                Expr::Macro(_) => 12,
                Expr::NativeFn(_) => 13,
                Expr::Atom(_) => 14,
            }
        }

        let by_type = type_order(self).cmp(&type_order(other));
        if by_type != Ordering::Equal {
            return by_type;
        }

        match (self, other) {
            (Expr::Bool(a), Expr::Bool(b)) => a.cmp(b),
            (Expr::Int(a), Expr::Int(b)) => a.cmp(b),
            (Expr::Float(a), Expr::Float(b)) => a.total_cmp(b),
            // Numerically equal ints and floats are distinct values; ints first
            (Expr::Int(a), Expr::Float(b)) => (*a as f64).total_cmp(b).then(Ordering::Less),
            (Expr::Float(a), Expr::Int(b)) => a.total_cmp(&(*b as f64)).then(Ordering::Greater),
            (Expr::Char(a), Expr::Char(b)) => a.cmp(b),
            (Expr::String(a), Expr::String(b)) => a.cmp(b),
            (Expr::Symbol(a), Expr::Symbol(b)) => a.cmp(b),
            (Expr::Keyword(a), Expr::Keyword(b)) => a.cmp(b),
            (Expr::List(a), Expr::List(b)) | (Expr::Vector(a), Expr::Vector(b)) => a.cmp(b),
            (Expr::Map(a), Expr::Map(b)) => a.iter().cmp(b.iter()),
            (Expr::Set(a), Expr::Set(b)) => a.iter().cmp(b.iter()),
            (Expr::Fn(a), Expr::Fn(b)) | (Expr::Macro(a), Expr::Macro(b)) => {
                a.addr().cmp(&b.addr())
            }
            (Expr::NativeFn(a), Expr::NativeFn(b)) => a.name.cmp(b.name),
            (Expr::Atom(a), Expr::Atom(b)) => a.addr().cmp(&b.addr()),
            _ => Ordering::Equal,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Expr::nil().is_truthy());
        assert!(!Expr::bool(false).is_truthy());
        assert!(Expr::int(0).is_truthy());
        assert!(Expr::string("").is_truthy());
    }

    #[test]
    fn test_display_scalars() {
        assert_eq!(Expr::float(42.0).to_string(), "42.0");
        assert_eq!(Expr::float(3.5).to_string(), "3.5");
        assert_eq!(Expr::char('\n').to_string(), "\\newline");
        assert_eq!(Expr::string("a\"b\n").to_string(), "\"a\\\"b\\n\"");
        assert_eq!(Expr::kw("user/id").to_string(), ":user/id");
    }

    #[test]
    fn test_display_collections() {
        let form = Expr::list(vec![
            Expr::sym("let*"),
            Expr::vector(vec![Expr::sym("a"), Expr::int(1)]),
            Expr::map(vec![(Expr::sym("a").quoted(), Expr::sym("a"))]),
        ]);
        assert_eq!(form.to_string(), "(let* [a 1] {(quote a) a})");
        assert_eq!(Expr::set(vec![Expr::int(2), Expr::int(1)]).to_string(), "#{1 2}");
        assert_eq!(
            Expr::map(vec![(Expr::kw("b"), Expr::int(2)), (Expr::kw("a"), Expr::int(1))])
                .to_string(),
            "{:a 1, :b 2}"
        );
    }

    #[test]
    fn test_list_and_vector_differ() {
        let items = vec![Expr::int(1), Expr::int(2)];
        assert_ne!(Expr::list(items.clone()), Expr::vector(items));
    }

    #[test]
    fn test_int_float_distinct_but_ordered() {
        assert_ne!(Expr::int(1), Expr::float(1.0));
        assert!(Expr::int(1) < Expr::float(1.0));
        assert!(Expr::float(0.5) < Expr::int(1));
        let set: OrdSet<Expr> = vec![Expr::int(1), Expr::float(1.0)].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_call_helpers() {
        let form = Expr::list(vec![Expr::sym("defn"), Expr::sym("f")]);
        assert!(form.is_call_to("defn"));
        assert!(!form.is_call_to("fn"));
        assert_eq!(form.head_symbol(), Some(&Symbol::new("defn")));
        assert!(Expr::vector(vec![]).head_symbol().is_none());
    }

    #[test]
    fn test_atom_identity() {
        let a = Expr::atom(Expr::int(1));
        let b = Expr::atom(Expr::int(1));
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        if let Expr::Atom(cell) = &a {
            assert_eq!(cell.reset(Expr::int(2)), Expr::int(1));
            assert_eq!(cell.deref(), Expr::int(2));
        }
    }

    #[test]
    fn test_find_arity_prefers_exact() {
        let env: Rc<dyn Any> = Rc::new(());
        let lambda = Lambda::new(
            None,
            vec![
                LambdaArity::new(vec![Symbol::new("a")], Some(Symbol::new("r")), vec![]),
                LambdaArity::new(vec![Symbol::new("a"), Symbol::new("b")], None, vec![]),
            ],
            env,
        );
        assert!(lambda.find_arity(2).is_some_and(|a| a.rest.is_none()));
        assert!(lambda.find_arity(3).is_some_and(|a| a.rest.is_some()));
        assert!(lambda.find_arity(0).is_none());
    }
}

// stepper-parser - Symbol type with interning
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Symbols are identifiers that may be optionally namespaced.
//!
//! Symbols are interned: two symbols with the same namespace and name share
//! storage, so equality and hashing are pointer operations. Interned symbols
//! live for the rest of the process, including generated ones such as the
//! `vec__N` temporaries emitted by the pattern binder.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, OnceLock};

use crate::intern::{self, Interner, QualifiedName};

static SYMBOLS: OnceLock<Mutex<Interner>> = OnceLock::new();

/// A symbol with optional namespace.
#[derive(Clone)]
pub struct Symbol {
    inner: Arc<QualifiedName>,
}

impl Symbol {
    /// Create a symbol with no namespace.
    pub fn new(name: &str) -> Self {
        Symbol {
            inner: intern::intern(&SYMBOLS, None, name),
        }
    }

    /// Create a namespaced symbol.
    pub fn with_namespace(namespace: &str, name: &str) -> Self {
        Symbol {
            inner: intern::intern(&SYMBOLS, Some(namespace), name),
        }
    }

    /// Parse a symbol from a string like `"foo"` or `"ns/foo"`.
    pub fn parse(s: &str) -> Self {
        match intern::split_qualified(s) {
            (Some(ns), name) => Symbol::with_namespace(ns, name),
            (None, name) => Symbol::new(name),
        }
    }

    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.inner.namespace.as_deref()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    #[must_use]
    pub fn has_namespace(&self) -> bool {
        self.inner.namespace.is_some()
    }

    /// True for an unqualified symbol with the given name.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        !self.has_namespace() && self.name() == name
    }

    /// The same name without its namespace.
    #[must_use]
    pub fn unqualified(&self) -> Symbol {
        if self.has_namespace() {
            Symbol::new(self.name())
        } else {
            self.clone()
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.namespace {
            Some(ns) => write!(f, "{}/{}", ns, self.inner.name),
            None => write!(f, "{}", self.inner.name),
        }
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self)
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Symbol {}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        if self == other {
            return Ordering::Equal;
        }
        // Unqualified symbols sort before qualified ones
        self.inner
            .namespace
            .cmp(&other.inner.namespace)
            .then_with(|| self.inner.name.cmp(&other.inner.name))
    }
}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.inner).hash(state);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_symbol() {
        let sym = Symbol::new("foo");
        assert_eq!(sym.name(), "foo");
        assert!(sym.namespace().is_none());
        assert_eq!(sym.to_string(), "foo");
    }

    #[test]
    fn test_parse_namespaced() {
        let sym = Symbol::parse("user/foo");
        assert_eq!(sym.namespace(), Some("user"));
        assert_eq!(sym.name(), "foo");
        assert_eq!(sym.to_string(), "user/foo");
        assert_eq!(sym.unqualified(), Symbol::new("foo"));
    }

    #[test]
    fn test_parse_slash_symbol() {
        let sym = Symbol::parse("/");
        assert_eq!(sym.name(), "/");
        assert!(!sym.has_namespace());
    }

    #[test]
    fn test_interning() {
        assert_eq!(Symbol::new("foo"), Symbol::new("foo"));
        assert_ne!(Symbol::new("foo"), Symbol::new("bar"));
        assert_ne!(Symbol::new("foo"), Symbol::with_namespace("user", "foo"));
    }

    #[test]
    fn test_ordering() {
        let a = Symbol::new("a");
        let b = Symbol::new("b");
        let ns_a = Symbol::with_namespace("ns", "a");
        assert!(a < b);
        assert!(b < ns_a);
    }

    #[test]
    fn test_is() {
        assert!(Symbol::new("&").is("&"));
        assert!(!Symbol::with_namespace("x", "&").is("&"));
    }
}

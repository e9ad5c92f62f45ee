// stepper-parser - Keyword type with interning
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Keywords are self-evaluating identifiers that may be optionally namespaced.
//! They share the interning scheme of [`Symbol`](crate::Symbol) but live in a
//! separate table, so `:foo` and `foo` never compare equal.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, OnceLock};

use crate::intern::{self, Interner, QualifiedName};
use crate::symbol::Symbol;

static KEYWORDS: OnceLock<Mutex<Interner>> = OnceLock::new();

/// A keyword with optional namespace. Printed with a leading colon.
#[derive(Clone)]
pub struct Keyword {
    inner: Arc<QualifiedName>,
}

impl Keyword {
    pub fn new(name: &str) -> Self {
        Keyword {
            inner: intern::intern(&KEYWORDS, None, name),
        }
    }

    pub fn with_namespace(namespace: &str, name: &str) -> Self {
        Keyword {
            inner: intern::intern(&KEYWORDS, Some(namespace), name),
        }
    }

    /// Parse a keyword from its text without the leading colon.
    pub fn parse(s: &str) -> Self {
        match intern::split_qualified(s) {
            (Some(ns), name) => Keyword::with_namespace(ns, name),
            (None, name) => Keyword::new(name),
        }
    }

    /// The keyword with the same namespace and name as `sym`.
    pub fn from_symbol(sym: &Symbol) -> Self {
        match sym.namespace() {
            Some(ns) => Keyword::with_namespace(ns, sym.name()),
            None => Keyword::new(sym.name()),
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

    /// True for an unqualified keyword with the given name.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.inner.namespace.is_none() && self.name() == name
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.namespace {
            Some(ns) => write!(f, ":{}/{}", ns, self.inner.name),
            None => write!(f, ":{}", self.inner.name),
        }
    }
}

impl fmt::Debug for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keyword({})", self)
    }
}

impl PartialEq for Keyword {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Keyword {}

impl PartialOrd for Keyword {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Keyword {
    fn cmp(&self, other: &Self) -> Ordering {
        if self == other {
            return Ordering::Equal;
        }
        self.inner
            .namespace
            .cmp(&other.inner.namespace)
            .then_with(|| self.inner.name.cmp(&other.inner.name))
    }
}

impl Hash for Keyword {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.inner).hash(state);
    }
}

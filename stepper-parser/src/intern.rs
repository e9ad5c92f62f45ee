// stepper-parser - Shared name interner
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! A global table of `(namespace, name)` pairs shared by symbols and keywords.
//!
//! Interned names are never deallocated. Each table is guarded by a `Mutex`;
//! a poisoned lock is recovered rather than propagated, since the table is
//! append-only and cannot be observed in a half-updated state.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

/// An interned, optionally namespaced name.
#[derive(Debug)]
pub(crate) struct QualifiedName {
    pub(crate) namespace: Option<Arc<str>>,
    pub(crate) name: Arc<str>,
}

type Key = (Option<Arc<str>>, Arc<str>);

#[derive(Default)]
pub(crate) struct Interner {
    names: HashMap<Key, Arc<QualifiedName>>,
    strings: HashSet<Arc<str>>,
}

impl Interner {
    fn intern_str(&mut self, s: &str) -> Arc<str> {
        if let Some(existing) = self.strings.get(s) {
            return Arc::clone(existing);
        }
        let interned: Arc<str> = Arc::from(s);
        self.strings.insert(Arc::clone(&interned));
        interned
    }

    fn intern(&mut self, namespace: Option<&str>, name: &str) -> Arc<QualifiedName> {
        let ns = namespace.map(|s| self.intern_str(s));
        let name = self.intern_str(name);
        let key = (ns.clone(), Arc::clone(&name));
        Arc::clone(
            self.names
                .entry(key)
                .or_insert_with(|| Arc::new(QualifiedName { namespace: ns, name })),
        )
    }
}

/// Intern a name in the given table, creating the table on first use.
pub(crate) fn intern(
    table: &'static OnceLock<Mutex<Interner>>,
    namespace: Option<&str>,
    name: &str,
) -> Arc<QualifiedName> {
    table
        .get_or_init(|| Mutex::new(Interner::default()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .intern(namespace, name)
}

/// Split `"ns/name"` into its parts. A lone `/` is a name, not a separator.
pub(crate) fn split_qualified(s: &str) -> (Option<&str>, &str) {
    if s == "/" {
        return (None, s);
    }
    match s.find('/') {
        Some(pos) if pos > 0 && pos + 1 < s.len() => (Some(&s[..pos]), &s[pos + 1..]),
        _ => (None, s),
    }
}

// stepper-runtime - Namespace system for global bindings
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Namespaces and the vars they hold.
//!
//! `def` and friends intern a [`Var`] in the current namespace. Each var
//! carries [`VarMeta`] describing where and how it was defined, which is
//! what the stepper reads back when resolving a callee.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use stepper_parser::{Expr, Symbol};

/// Metadata recorded for a var.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VarMeta {
    pub file: Option<String>,
    /// 1-indexed line of the defining form
    pub line: Option<usize>,
    /// Exact source text of the defining form
    pub source: Option<String>,
    pub doc: Option<String>,
    /// List of parameter vectors
    pub arglists: Option<Expr>,
    pub is_macro: bool,
    pub private: bool,
}

/// A named, mutable global binding.
#[derive(Debug, Clone)]
pub struct Var {
    inner: Rc<VarInner>,
}

#[derive(Debug)]
struct VarInner {
    ns: Rc<str>,
    name: Rc<str>,
    value: RefCell<Expr>,
    meta: RefCell<VarMeta>,
}

impl Var {
    fn new(ns: Rc<str>, name: &str) -> Self {
        Var {
            inner: Rc::new(VarInner {
                ns,
                name: Rc::from(name),
                value: RefCell::new(Expr::Nil),
                meta: RefCell::new(VarMeta::default()),
            }),
        }
    }

    pub fn ns(&self) -> &str {
        &self.inner.ns
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The var as a namespace-qualified symbol.
    pub fn symbol(&self) -> Symbol {
        Symbol::with_namespace(&self.inner.ns, &self.inner.name)
    }

    pub fn get(&self) -> Expr {
        self.inner.value.borrow().clone()
    }

    pub fn set(&self, value: Expr) {
        *self.inner.value.borrow_mut() = value;
    }

    pub fn meta(&self) -> VarMeta {
        self.inner.meta.borrow().clone()
    }

    pub fn set_meta(&self, meta: VarMeta) {
        *self.inner.meta.borrow_mut() = meta;
    }

    /// Apply `f` to the var's metadata in place.
    pub fn update_meta(&self, f: impl FnOnce(&mut VarMeta)) {
        f(&mut self.inner.meta.borrow_mut());
    }

    pub fn is_public(&self) -> bool {
        !self.inner.meta.borrow().private
    }

    pub fn same(&self, other: &Var) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// A namespace containing var bindings.
#[derive(Debug, Clone)]
pub struct Namespace {
    inner: Rc<RefCell<NamespaceInner>>,
}

#[derive(Debug)]
struct NamespaceInner {
    name: Rc<str>,
    vars: HashMap<String, Var>,
}

impl Namespace {
    pub fn new(name: &str) -> Self {
        Namespace {
            inner: Rc::new(RefCell::new(NamespaceInner {
                name: Rc::from(name),
                vars: HashMap::new(),
            })),
        }
    }

    #[must_use]
    pub fn name(&self) -> String {
        self.inner.borrow().name.to_string()
    }

    /// Intern a var with the given name, creating it if it doesn't exist.
    pub fn intern(&self, name: &str) -> Var {
        let mut inner = self.inner.borrow_mut();
        if let Some(var) = inner.vars.get(name) {
            return var.clone();
        }
        let var = Var::new(inner.name.clone(), name);
        inner.vars.insert(name.to_string(), var.clone());
        var
    }

    /// Intern a var and set its value.
    pub fn intern_with_value(&self, name: &str, value: Expr) -> Var {
        let var = self.intern(name);
        var.set(value);
        var
    }

    /// Look up a var defined in this namespace. Refers are not consulted.
    #[must_use]
    pub fn find_var(&self, name: &str) -> Option<Var> {
        self.inner.borrow().vars.get(name).cloned()
    }

    /// Resolve an unqualified symbol against this namespace's own vars.
    #[must_use]
    pub fn resolve(&self, sym: &Symbol) -> Option<Var> {
        if sym.has_namespace() {
            return None;
        }
        self.find_var(sym.name())
    }

    /// Public vars defined in this namespace.
    #[must_use]
    pub fn publics(&self) -> Vec<Var> {
        self.inner
            .borrow()
            .vars
            .values()
            .filter(|var| var.is_public())
            .cloned()
            .collect()
    }
}

/// All namespaces, plus the current one.
///
/// Namespaces are kept in creation order, which is the order the stepper
/// searches them in.
#[derive(Debug, Clone)]
pub struct NamespaceRegistry {
    inner: Rc<RefCell<RegistryInner>>,
}

#[derive(Debug)]
struct RegistryInner {
    namespaces: Vec<Namespace>,
    current: Rc<str>,
}

impl NamespaceRegistry {
    /// The namespace builtins and the standard library live in.
    pub const CORE_NS: &'static str = "stepper.core";

    /// A registry holding `stepper.core` and `user`, with `user` current.
    pub fn new() -> Self {
        NamespaceRegistry {
            inner: Rc::new(RefCell::new(RegistryInner {
                namespaces: vec![Namespace::new(Self::CORE_NS), Namespace::new("user")],
                current: Rc::from("user"),
            })),
        }
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<Namespace> {
        self.inner
            .borrow()
            .namespaces
            .iter()
            .find(|ns| *ns.inner.borrow().name == *name)
            .cloned()
    }

    /// Find a namespace, creating it if absent.
    pub fn find_or_create(&self, name: &str) -> Namespace {
        if let Some(ns) = self.find(name) {
            return ns;
        }
        let ns = Namespace::new(name);
        self.inner.borrow_mut().namespaces.push(ns.clone());
        tracing::debug!(target: "stepper::runtime", ns = name, "created namespace");
        ns
    }

    /// The current namespace.
    pub fn current(&self) -> Namespace {
        let name = self.current_name();
        self.find_or_create(&name)
    }

    #[must_use]
    pub fn current_name(&self) -> String {
        self.inner.borrow().current.to_string()
    }

    /// Make `name` current, creating it if needed.
    pub fn set_current(&self, name: &str) -> Namespace {
        let ns = self.find_or_create(name);
        self.inner.borrow_mut().current = Rc::from(name);
        ns
    }

    pub fn core(&self) -> Namespace {
        self.find_or_create(Self::CORE_NS)
    }

    /// Names of every namespace in creation order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.inner
            .borrow()
            .namespaces
            .iter()
            .map(Namespace::name)
            .collect()
    }

    /// Resolve a symbol from the perspective of namespace `ns`. Qualified
    /// symbols are looked up in the namespace they name; unqualified ones
    /// fall back to the public vars of the core namespace.
    #[must_use]
    pub fn resolve_in(&self, ns: &Namespace, sym: &Symbol) -> Option<Var> {
        match sym.namespace() {
            Some(ns_name) => self.find(ns_name)?.find_var(sym.name()),
            None => ns.resolve(sym).or_else(|| {
                self.find(Self::CORE_NS)?
                    .find_var(sym.name())
                    .filter(Var::is_public)
            }),
        }
    }

    /// Resolve a symbol in the current namespace.
    #[must_use]
    pub fn resolve(&self, sym: &Symbol) -> Option<Var> {
        self.resolve_in(&self.current(), sym)
    }
}

impl Default for NamespaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_and_resolve() {
        let registry = NamespaceRegistry::new();
        let user = registry.current();
        user.intern_with_value("x", Expr::Int(1));
        assert_eq!(registry.resolve(&Symbol::new("x")).unwrap().get(), Expr::Int(1));
        assert_eq!(
            registry.resolve(&Symbol::parse("user/x")).unwrap().get(),
            Expr::Int(1)
        );
        assert!(registry.resolve(&Symbol::parse("other/x")).is_none());
    }

    #[test]
    fn test_core_fallback() {
        let registry = NamespaceRegistry::new();
        registry.core().intern_with_value("helper", Expr::Int(7));
        let private = registry.core().intern("hidden");
        private.update_meta(|m| m.private = true);

        let app = registry.set_current("app");
        assert_eq!(registry.current_name(), "app");
        assert!(app.resolve(&Symbol::new("helper")).is_none());
        assert!(registry.resolve(&Symbol::new("helper")).is_some());
        assert!(registry.resolve(&Symbol::new("hidden")).is_none());
        assert!(registry.resolve(&Symbol::parse("stepper.core/hidden")).is_some());
        assert_eq!(registry.names(), vec!["stepper.core", "user", "app"]);
    }

    #[test]
    fn test_intern_is_idempotent() {
        let ns = Namespace::new("t");
        let a = ns.intern("v");
        let b = ns.intern("v");
        assert!(a.same(&b));
        assert_eq!(a.symbol(), Symbol::parse("t/v"));
    }
}

// stepper-runtime - Environment for lexical scoping
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Lexical scope chain.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use stepper_parser::{Expr, Symbol};

use crate::error::{Error, Result};
use crate::eval::apply::make_native_fn;
use crate::namespace::NamespaceRegistry;

/// A lexical environment for local bindings.
///
/// Environments form a chain through parent references. Only the root holds
/// the namespace registry; children reach it by walking up.
///
/// ```
/// use stepper_runtime::Env;
/// use stepper_parser::{Expr, Symbol};
///
/// let env = Env::new();
/// env.define(Symbol::new("x"), Expr::Int(42));
///
/// let child = env.child();
/// child.define(Symbol::new("x"), Expr::Int(100));
/// assert_eq!(child.lookup(&Symbol::new("x")).unwrap(), Expr::Int(100));
/// assert_eq!(env.lookup(&Symbol::new("x")).unwrap(), Expr::Int(42));
/// ```
#[derive(Debug, Clone)]
pub struct Env {
    inner: Rc<RefCell<EnvInner>>,
}

#[derive(Debug)]
struct EnvInner {
    bindings: HashMap<Symbol, Expr>,
    parent: Option<Env>,
    /// Namespace registry (only set on the root environment)
    registry: Option<NamespaceRegistry>,
}

impl Env {
    /// Create a new root environment with a fresh registry.
    pub fn new() -> Self {
        Env {
            inner: Rc::new(RefCell::new(EnvInner {
                bindings: HashMap::new(),
                parent: None,
                registry: Some(NamespaceRegistry::new()),
            })),
        }
    }

    #[must_use]
    pub fn child(&self) -> Self {
        Env {
            inner: Rc::new(RefCell::new(EnvInner {
                bindings: HashMap::new(),
                parent: Some(self.clone()),
                registry: None,
            })),
        }
    }

    /// The namespace registry held by the root environment.
    pub fn registry(&self) -> Result<NamespaceRegistry> {
        let mut current = self.clone();
        loop {
            let inner = current.inner.borrow();
            if let Some(registry) = &inner.registry {
                return Ok(registry.clone());
            }
            let parent = inner.parent.clone();
            drop(inner);
            match parent {
                Some(p) => current = p,
                None => {
                    return Err(Error::Internal(
                        "root environment missing namespace registry".to_string(),
                    ));
                }
            }
        }
    }

    /// Define a binding in this environment (not a parent).
    pub fn define(&self, sym: Symbol, val: Expr) {
        self.inner.borrow_mut().bindings.insert(sym, val);
    }

    /// Intern a native function as a public var of the core namespace.
    pub fn define_native(
        &self,
        name: &'static str,
        func: impl Fn(&[Expr]) -> Result<Expr> + 'static,
    ) -> Result<()> {
        let native = make_native_fn(name, func);
        self.registry()?
            .core()
            .intern_with_value(name, Expr::NativeFn(native));
        Ok(())
    }

    /// Look up a local binding in this environment or its parents.
    pub fn lookup(&self, sym: &Symbol) -> Option<Expr> {
        let mut current = self.clone();
        loop {
            let inner = current.inner.borrow();
            if let Some(val) = inner.bindings.get(sym) {
                return Some(val.clone());
            }
            let parent = inner.parent.clone();
            drop(inner);
            match parent {
                Some(p) => current = p,
                None => return None,
            }
        }
    }

    #[must_use]
    pub fn is_defined(&self, sym: &Symbol) -> bool {
        self.lookup(sym).is_some()
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str) -> Symbol {
        Symbol::new(name)
    }

    #[test]
    fn test_define_and_lookup() {
        let env = Env::new();
        env.define(sym("x"), Expr::Int(42));
        assert_eq!(env.lookup(&sym("x")), Some(Expr::Int(42)));
        assert_eq!(env.lookup(&sym("y")), None);
    }

    #[test]
    fn test_child_shadows_parent() {
        let parent = Env::new();
        parent.define(sym("x"), Expr::Int(42));
        let child = parent.child();
        assert!(child.is_defined(&sym("x")));
        child.define(sym("x"), Expr::Int(100));
        assert_eq!(child.lookup(&sym("x")), Some(Expr::Int(100)));
        assert_eq!(parent.lookup(&sym("x")), Some(Expr::Int(42)));
    }

    #[test]
    fn test_children_share_registry() {
        let env = Env::new();
        let child = env.child().child();
        child.registry().unwrap().set_current("elsewhere");
        assert_eq!(env.registry().unwrap().current_name(), "elsewhere");
    }

    #[test]
    fn test_define_native() {
        let env = Env::new();
        env.define_native("answer", |_| Ok(Expr::Int(42))).unwrap();
        let var = env
            .registry()
            .unwrap()
            .core()
            .find_var("answer")
            .unwrap();
        assert!(matches!(var.get(), Expr::NativeFn(_)));
    }
}

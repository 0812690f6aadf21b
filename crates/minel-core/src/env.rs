use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::HashMap as SpurMap;
use lasso::Spur;

use crate::value::{intern, Value};

/// A scope frame: bindings plus an optional parent. Cloning an `Env` yields a
/// handle to the same frame.
///
/// Function calls parent their frame to the *calling* scope, so the chain is
/// the dynamic call chain and every chain ends at the global frame.
#[derive(Debug, Clone)]
pub struct Env {
    bindings: Rc<RefCell<SpurMap<Spur, Value>>>,
    parent: Option<Rc<Env>>,
}

impl Env {
    pub fn new() -> Self {
        Env {
            bindings: Rc::new(RefCell::new(SpurMap::new())),
            parent: None,
        }
    }

    pub fn with_parent(parent: &Env) -> Self {
        Env {
            bindings: Rc::new(RefCell::new(SpurMap::new())),
            parent: Some(Rc::new(parent.clone())),
        }
    }

    /// Search this frame, then each ancestor.
    pub fn lookup(&self, name: Spur) -> Option<Value> {
        let mut frame = self;
        loop {
            if let Some(val) = frame.bindings.borrow().get(&name) {
                return Some(val.clone());
            }
            frame = frame.parent.as_deref()?;
        }
    }

    pub fn lookup_str(&self, name: &str) -> Option<Value> {
        self.lookup(intern(name))
    }

    /// Bind `name` in this frame only.
    pub fn define_local(&self, name: Spur, val: Value) {
        self.bindings.borrow_mut().insert(name, val);
    }

    pub fn define_str(&self, name: &str, val: Value) {
        self.define_local(intern(name), val);
    }

    pub fn is_bound_here(&self, name: Spur) -> bool {
        self.bindings.borrow().contains_key(&name)
    }

    /// The nearest frame that defines `name`.
    pub fn owning_frame(&self, name: Spur) -> Option<Env> {
        let mut frame = self;
        loop {
            if frame.is_bound_here(name) {
                return Some(frame.clone());
            }
            frame = frame.parent.as_deref()?;
        }
    }

    /// The frame with no parent.
    pub fn root(&self) -> Env {
        let mut frame = self;
        while let Some(parent) = frame.parent.as_deref() {
            frame = parent;
        }
        frame.clone()
    }

    /// Where an assignment to `name` lands: its owning frame, or the root.
    pub fn assignment_target(&self, name: Spur) -> Env {
        self.owning_frame(name).unwrap_or_else(|| self.root())
    }

    /// Update `name` wherever it is visible, creating it globally otherwise.
    pub fn assign(&self, name: Spur, val: Value) {
        self.assignment_target(name).define_local(name, val);
    }

    pub fn same_frame(&self, other: &Env) -> bool {
        Rc::ptr_eq(&self.bindings, &other.bindings)
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

    #[test]
    fn lookup_walks_parents() {
        let global = Env::new();
        global.define_str("x", Value::Number(1.0));
        let child = Env::with_parent(&global);
        assert_eq!(child.lookup_str("x"), Some(Value::Number(1.0)));
        assert_eq!(child.lookup_str("y"), None);
    }

    #[test]
    fn define_local_shadows_without_touching_parent() {
        let global = Env::new();
        global.define_str("x", Value::Number(1.0));
        let child = Env::with_parent(&global);
        child.define_str("x", Value::Number(2.0));
        assert_eq!(child.lookup_str("x"), Some(Value::Number(2.0)));
        assert_eq!(global.lookup_str("x"), Some(Value::Number(1.0)));
    }

    #[test]
    fn assign_updates_owning_frame() {
        let global = Env::new();
        let middle = Env::with_parent(&global);
        middle.define_str("acc", Value::Number(0.0));
        let inner = Env::with_parent(&middle);
        inner.assign(intern("acc"), Value::Number(6.0));
        assert_eq!(middle.lookup_str("acc"), Some(Value::Number(6.0)));
        assert!(!inner.is_bound_here(intern("acc")));
        assert_eq!(global.lookup_str("acc"), None);
    }

    #[test]
    fn assign_unbound_creates_global() {
        let global = Env::new();
        let inner = Env::with_parent(&Env::with_parent(&global));
        inner.assign(intern("fresh"), Value::T);
        assert_eq!(global.lookup_str("fresh"), Some(Value::T));
    }

    #[test]
    fn root_and_owning_frame() {
        let global = Env::new();
        let child = Env::with_parent(&global);
        assert!(child.root().same_frame(&global));
        global.define_str("g", Value::Nil);
        let owner = child.owning_frame(intern("g")).expect("bound globally");
        assert!(owner.same_frame(&global));
        assert!(child.owning_frame(intern("missing")).is_none());
    }
}

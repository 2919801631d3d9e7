//! Symbol tables for function names.
//!
//! Scopes form a tree whose edges appear only when a function definition is
//! parsed. Each child keeps a strong handle to its parent; a parent reaches a
//! child only through the weak [`SymbolEntry`] it registered for the function.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use log::debug;

use crate::ast::FuncDef;

pub type ScopeRef = Rc<RefCell<Scope>>;

/// What a symbol names. Only functions are registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Function,
}

/// Entry in a [`Scope`]: the kind tag plus a non‑owning link to the node that
/// defined the name.
#[derive(Debug, Clone)]
pub struct SymbolEntry {
    pub kind: SymbolKind,
    node: Weak<FuncDef>,
}

impl SymbolEntry {
    pub fn function(node: Weak<FuncDef>) -> Self {
        SymbolEntry {
            kind: SymbolKind::Function,
            node,
        }
    }

    /// The defining node, once its definition has finished parsing and while
    /// the tree that owns it is alive.
    pub fn node(&self) -> Option<Rc<FuncDef>> {
        self.node.upgrade()
    }
}

#[derive(Debug, Default)]
pub struct Scope {
    entries: HashMap<String, SymbolEntry>,
    parent: Option<ScopeRef>,
}

impl Scope {
    pub fn root() -> ScopeRef {
        Rc::new(RefCell::new(Scope::default()))
    }

    pub fn child(parent: &ScopeRef) -> ScopeRef {
        Rc::new(RefCell::new(Scope {
            entries: HashMap::new(),
            parent: Some(Rc::clone(parent)),
        }))
    }

    /// Registers `name`, replacing any earlier entry of the same name.
    pub fn set(&mut self, name: &str, entry: SymbolEntry) {
        self.entries.insert(name.to_string(), entry);
    }

    /// Looks `name` up in this scope only.
    pub fn get(&self, name: &str) -> Option<&SymbolEntry> {
        self.entries.get(name)
    }

    /// Looks `name` up here, then in each enclosing scope.
    pub fn lookup(&self, name: &str) -> Option<SymbolEntry> {
        if let Some(entry) = self.entries.get(name) {
            Some(entry.clone())
        } else if let Some(parent) = &self.parent {
            parent.borrow().lookup(name)
        } else {
            None
        }
    }

    pub fn parent(&self) -> Option<ScopeRef> {
        self.parent.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The parser's current‑scope pointer, kept as an explicit stack: the root at
/// the bottom, one scope per function body being parsed above it.
#[derive(Debug)]
pub struct ScopeStack {
    stack: Vec<ScopeRef>,
}

impl ScopeStack {
    pub fn new(root: ScopeRef) -> Self {
        ScopeStack { stack: vec![root] }
    }

    pub fn root(&self) -> ScopeRef {
        Rc::clone(&self.stack[0])
    }

    pub fn current(&self) -> ScopeRef {
        Rc::clone(self.stack.last().unwrap_or(&self.stack[0]))
    }

    /// Pushes a fresh child of the current scope and returns it.
    pub fn enter(&mut self) -> ScopeRef {
        let scope = Scope::child(&self.current());
        self.stack.push(Rc::clone(&scope));

        debug!("Entered scope at depth {}", self.depth());

        scope
    }

    /// Pops back to the enclosing scope. The root is never popped.
    pub fn leave(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }

        debug!("Left scope, now at depth {}", self.depth());
    }

    /// Number of function scopes above the root.
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_parent_chain() {
        let root = Scope::root();
        root.borrow_mut()
            .set("outer", SymbolEntry::function(Weak::new()));

        let child = Scope::child(&root);
        child
            .borrow_mut()
            .set("inner", SymbolEntry::function(Weak::new()));

        assert!(child.borrow().lookup("outer").is_some());
        assert!(child.borrow().lookup("inner").is_some());
        assert!(root.borrow().lookup("inner").is_none());
        assert!(child.borrow().get("outer").is_none());
    }

    #[test]
    fn last_write_wins() {
        let root = Scope::root();
        let first = Rc::new(FuncDef {
            name: "f".into(),
            params: vec![],
            body: vec![],
            scope: Scope::child(&root),
        });
        let second = Rc::new(FuncDef {
            name: "f".into(),
            params: vec!["x".into()],
            body: vec![],
            scope: Scope::child(&root),
        });

        root.borrow_mut()
            .set("f", SymbolEntry::function(Rc::downgrade(&first)));
        root.borrow_mut()
            .set("f", SymbolEntry::function(Rc::downgrade(&second)));

        assert_eq!(root.borrow().len(), 1);
        let node = root.borrow().get("f").and_then(SymbolEntry::node);
        assert_eq!(node.map(|n| n.params.len()), Some(1));
    }

    #[test]
    fn entry_does_not_keep_node_alive() {
        let root = Scope::root();
        let def = Rc::new(FuncDef {
            name: "f".into(),
            params: vec![],
            body: vec![],
            scope: Scope::child(&root),
        });
        root.borrow_mut()
            .set("f", SymbolEntry::function(Rc::downgrade(&def)));

        drop(def);

        let entry = root.borrow().get("f").cloned();
        assert_eq!(entry.as_ref().map(|e| e.kind), Some(SymbolKind::Function));
        assert!(entry.and_then(|e| e.node()).is_none());
    }

    #[test]
    fn stack_enter_and_leave() {
        let root = Scope::root();
        let mut stack = ScopeStack::new(Rc::clone(&root));

        let child = stack.enter();
        assert_eq!(stack.depth(), 1);
        assert!(Rc::ptr_eq(&stack.current(), &child));

        let parent = child.borrow().parent();
        assert!(parent.is_some_and(|p| Rc::ptr_eq(&p, &root)));

        stack.leave();
        assert_eq!(stack.depth(), 0);
        assert!(Rc::ptr_eq(&stack.current(), &root));

        stack.leave();
        assert!(Rc::ptr_eq(&stack.root(), &root));
    }
}

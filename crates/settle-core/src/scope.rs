//! Lifetime tokens.
//!
//! A `Scope` stands for the lifetime of one consumer (a session) or of a
//! provider that outlives several sessions. Work that must stop when the
//! consumer goes away registers a disposer on the scope. Disposers run once,
//! either on an explicit `dispose` or when the last handle is dropped
//! (including during unwinding). A parent only observes its children, so a
//! child scope ends when its own last handle goes away, and at the latest
//! when the parent does.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

pub struct Scope {
    inner: Rc<ScopeInner>,
}

struct ScopeInner {
    disposed: Cell<bool>,
    disposers: RefCell<Vec<Box<dyn FnOnce()>>>,
    children: RefCell<Vec<Weak<ScopeInner>>>,
}

impl Scope {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ScopeInner {
                disposed: Cell::new(false),
                disposers: RefCell::new(Vec::new()),
                children: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Registers `disposer` to run when this scope ends. On an already
    /// disposed scope it runs immediately.
    pub fn add_disposer(&self, disposer: impl FnOnce() + 'static) {
        if self.inner.disposed.get() {
            disposer();
            return;
        }
        self.inner.disposers.borrow_mut().push(Box::new(disposer));
    }

    /// Creates a scope that is disposed together with (and before) this one.
    pub fn child(&self) -> Scope {
        let child = Scope::new();
        if self.inner.disposed.get() {
            child.inner.teardown();
            return child;
        }
        let mut children = self.inner.children.borrow_mut();
        children.retain(|c| c.upgrade().is_some_and(|c| !c.disposed.get()));
        children.push(Rc::downgrade(&child.inner));
        child
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    #[cfg(test)]
    pub(crate) fn tracked_children(&self) -> usize {
        self.inner.children.borrow().len()
    }

    pub fn dispose(self) {
        self.inner.teardown();
    }
}

impl ScopeInner {
    fn teardown(&self) {
        if self.disposed.replace(true) {
            return;
        }

        // Children first
        let children = std::mem::take(&mut *self.children.borrow_mut());
        for child in children.iter().filter_map(Weak::upgrade) {
            child.teardown();
        }

        let disposers = std::mem::take(&mut *self.disposers.borrow_mut());
        for disposer in disposers {
            disposer();
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Scope {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl Drop for ScopeInner {
    fn drop(&mut self) {
        self.teardown();
    }
}

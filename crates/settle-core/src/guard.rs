//! Dispose-safe dispatch.
//!
//! A `CancellationGuard` is bound to a `Scope`. Dispatchers it wraps forward
//! actions while the scope is alive and silently drop them afterwards, so a
//! result that arrives after its consumer went away never touches state that
//! nobody observes. Disposal also releases the wrapped dispatch functions;
//! only the flag outlives it.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::scope::Scope;

type Slot<A, R> = Rc<RefCell<Option<Rc<dyn Fn(A) -> R>>>>;

trait Release {
    fn release(&self);
}

impl<A, R> Release for RefCell<Option<Rc<dyn Fn(A) -> R>>> {
    fn release(&self) {
        self.borrow_mut().take();
    }
}

#[derive(Clone)]
pub struct CancellationGuard {
    inner: Rc<GuardInner>,
}

struct GuardInner {
    alive: Cell<bool>,
    releases: RefCell<Vec<Weak<dyn Release>>>,
}

impl GuardInner {
    fn release(&self) {
        if !self.alive.replace(false) {
            return;
        }
        let releases = std::mem::take(&mut *self.releases.borrow_mut());
        log::trace!("guard released {} dispatcher(s)", releases.len());
        for slot in releases.iter().filter_map(Weak::upgrade) {
            slot.release();
        }
    }
}

impl CancellationGuard {
    /// Creates a live guard that is released when `scope` is disposed or
    /// dropped. Binding to an already disposed scope yields a dead guard.
    pub fn bind(scope: &Scope) -> Self {
        let inner = Rc::new(GuardInner {
            alive: Cell::new(true),
            releases: RefCell::new(Vec::new()),
        });
        let weak: Weak<GuardInner> = Rc::downgrade(&inner);
        scope.add_disposer(move || {
            if let Some(inner) = weak.upgrade() {
                inner.release();
            }
        });
        Self { inner }
    }

    #[cfg(test)]
    pub(crate) fn tracked_dispatchers(&self) -> usize {
        self.inner.releases.borrow().len()
    }

    pub fn is_alive(&self) -> bool {
        self.inner.alive.get()
    }

    /// Marks the guard dead. Idempotent.
    pub fn dispose(&self) {
        self.inner.release();
    }

    pub fn guard<A: 'static, R: 'static>(
        &self,
        dispatch: impl Fn(A) -> R + 'static,
    ) -> SafeDispatch<A, R> {
        let slot: Slot<A, R> = Rc::new(RefCell::new(None));
        if self.is_alive() {
            *slot.borrow_mut() = Some(Rc::new(dispatch));
            let weak: Weak<dyn Release> = Rc::downgrade(&slot) as Weak<RefCell<_>>;
            let mut releases = self.inner.releases.borrow_mut();
            releases.retain(|w| w.strong_count() > 0);
            releases.push(weak);
        }
        SafeDispatch {
            guard: self.inner.clone(),
            slot,
        }
    }
}

/// Dispatcher returned by `CancellationGuard::guard`.
pub struct SafeDispatch<A, R = ()> {
    guard: Rc<GuardInner>,
    slot: Slot<A, R>,
}

impl<A, R> Clone for SafeDispatch<A, R> {
    fn clone(&self) -> Self {
        Self {
            guard: self.guard.clone(),
            slot: self.slot.clone(),
        }
    }
}

impl<A, R> SafeDispatch<A, R> {
    /// Forwards `action` while the guard is alive. Afterwards this is a no-op
    /// returning `None`.
    pub fn dispatch(&self, action: A) -> Option<R> {
        if !self.guard.alive.get() {
            log::trace!("dropping dispatch on a disposed scope");
            return None;
        }
        // Clone out of the slot so the callee may dispose the scope itself.
        let f = self.slot.borrow().clone()?;
        Some(f(action))
    }

    pub fn is_alive(&self) -> bool {
        self.guard.alive.get()
    }
}

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Handle returned by `subscribe`; pass it to `unsubscribe` to detach.
    pub struct SubId;
}

type Write<T> = Box<dyn FnOnce(&mut T)>;

/// Shared, observable cell. Clones point at the same value.
///
/// Subscribers may read the signal, write to it, and (un)subscribe while
/// being notified. A write made during a notification is applied once the
/// current round has reached every subscriber, and then starts a round of
/// its own.
pub struct Signal<T: 'static>(Rc<Inner<T>>);

struct Inner<T> {
    value: RefCell<T>,
    subs: RefCell<SlotMap<SubId, Rc<dyn Fn(&T)>>>,
    queued: RefCell<VecDeque<Write<T>>>,
    notifying: Cell<bool>,
}

impl<T: 'static> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: 'static> Signal<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(Inner {
            value: RefCell::new(value),
            subs: RefCell::new(SlotMap::with_key()),
            queued: RefCell::new(VecDeque::new()),
            notifying: Cell::new(false),
        }))
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.0.value.borrow().clone()
    }

    /// Borrow the current value without cloning it. `f` must not write to
    /// this signal.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.0.value.borrow())
    }

    pub fn set(&self, v: T) {
        self.update(move |value| *value = v);
    }

    pub fn update<F: FnOnce(&mut T) + 'static>(&self, f: F) {
        if self.0.notifying.get() {
            self.0.queued.borrow_mut().push_back(Box::new(f));
            return;
        }
        f(&mut *self.0.value.borrow_mut());
        self.notify();
    }

    pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> SubId {
        self.0.subs.borrow_mut().insert(Rc::new(f))
    }

    pub fn unsubscribe(&self, id: SubId) -> bool {
        self.0.subs.borrow_mut().remove(id).is_some()
    }

    fn notify(&self) {
        // Clears the flag even if a subscriber panics.
        struct Guard<'a>(&'a Cell<bool>);
        impl Drop for Guard<'_> {
            fn drop(&mut self) {
                self.0.set(false);
            }
        }
        self.0.notifying.set(true);
        let _guard = Guard(&self.0.notifying);

        loop {
            let subs: Vec<Rc<dyn Fn(&T)>> = self.0.subs.borrow().values().cloned().collect();
            {
                let value = self.0.value.borrow();
                for sub in &subs {
                    sub(&value);
                }
            }
            let Some(write) = self.0.queued.borrow_mut().pop_front() else {
                break;
            };
            write(&mut *self.0.value.borrow_mut());
        }
    }
}

pub fn signal<T: 'static>(t: T) -> Signal<T> {
    Signal::new(t)
}

use crate::signal::{Signal, SubId};

/// A pure state transition: same `(state, action)` always yields an
/// equivalent state, and nothing else happens.
pub trait Reducer: 'static {
    type State: 'static;
    type Action: 'static;

    fn reduce(state: &Self::State, action: Self::Action) -> Self::State;
}

/// Holds a reducer's state; the only way to change it is `dispatch`.
pub struct Store<R: Reducer> {
    state: Signal<R::State>,
}

impl<R: Reducer> Clone for Store<R> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<R: Reducer> Store<R> {
    pub fn new(initial: R::State) -> Self {
        Self {
            state: Signal::new(initial),
        }
    }

    /// Dispatching from inside a subscriber is allowed; the action is
    /// reduced after the current notification round.
    pub fn dispatch(&self, action: R::Action) {
        self.state.update(move |state| *state = R::reduce(state, action));
    }

    pub fn get(&self) -> R::State
    where
        R::State: Clone,
    {
        self.state.get()
    }

    pub fn with<T>(&self, f: impl FnOnce(&R::State) -> T) -> T {
        self.state.with(f)
    }

    /// Called after every dispatched action with the new state.
    pub fn subscribe(&self, f: impl Fn(&R::State) + 'static) -> SubId {
        self.state.subscribe(f)
    }

    pub fn unsubscribe(&self, id: SubId) -> bool {
        self.state.unsubscribe(id)
    }
}

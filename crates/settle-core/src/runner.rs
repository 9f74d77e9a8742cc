//! Runs one asynchronous operation at a time per session and routes its
//! outcome into an `AsyncState`.
//!
//! Overlapping calls to `run` are not serialized: both operations stay in
//! flight and whichever settles last decides the visible state. Callers that
//! switch targets should start a new session (scope) for the new target
//! rather than issuing a second `run` on the same runner.

use std::future::Future;
use std::rc::Rc;

use futures::task::{LocalSpawn, LocalSpawnExt};

use crate::error::Result;
use crate::guard::{CancellationGuard, SafeDispatch};
use crate::machine::{Action, AsyncReducer, AsyncState, AsyncStatus};
use crate::reducer::Store;
use crate::scope::Scope;
use crate::signal::SubId;

#[derive(Clone, Debug)]
pub struct RunnerOptions {
    /// `Pending` when the consumer already knows an operation is coming.
    pub initial_status: AsyncStatus,
    /// Prefix for log lines.
    pub label: String,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            initial_status: AsyncStatus::Idle,
            label: "async".into(),
        }
    }
}

impl RunnerOptions {
    pub fn pending() -> Self {
        Self {
            initial_status: AsyncStatus::Pending,
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

pub struct AsyncRunner<T: 'static, E: 'static> {
    store: Store<AsyncReducer<T, E>>,
    guard: CancellationGuard,
    dispatch: SafeDispatch<Action<T, E>>,
    spawner: Rc<dyn LocalSpawn>,
    label: Rc<str>,
}

impl<T: 'static, E: 'static> Clone for AsyncRunner<T, E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            guard: self.guard.clone(),
            dispatch: self.dispatch.clone(),
            spawner: self.spawner.clone(),
            label: self.label.clone(),
        }
    }
}

impl<T: 'static, E: 'static> AsyncRunner<T, E> {
    /// Creates a session bound to `scope`. Once the scope is disposed every
    /// later transition, including ones from operations already in flight,
    /// is dropped.
    pub fn new(scope: &Scope, spawner: impl LocalSpawn + 'static, options: RunnerOptions) -> Self {
        let store = Store::new(AsyncState::seeded(options.initial_status));
        let guard = CancellationGuard::bind(scope);
        let label: Rc<str> = options.label.into();

        let dispatch = guard.guard({
            let store = store.clone();
            let label = label.clone();
            move |action: Action<T, E>| {
                let from = store.with(AsyncState::status);
                let kind = action.kind();
                store.dispatch(action);
                log::debug!("{label}: {from} -> {kind}");
            }
        });

        Self {
            store,
            guard,
            dispatch,
            spawner: Rc::new(spawner),
            label,
        }
    }

    /// Starts tracking `operation`. `None` is a no-op.
    ///
    /// `Pending` is applied before this returns; the settling transition is
    /// applied on a later turn of the executor that owns the spawner.
    pub fn run<F>(&self, operation: Option<F>) -> Result<()>
    where
        F: Future<Output = Result<T, E>> + 'static,
    {
        let Some(operation) = operation else {
            return Ok(());
        };
        if !self.guard.is_alive() {
            log::warn!("{}: run on a disposed session; its result will be dropped", self.label);
        }

        let dispatch = self.dispatch.clone();
        // The spawned task is only polled after this call returns, so
        // `Pending` still lands first.
        self.spawner.spawn_local(async move {
            match operation.await {
                Ok(data) => dispatch.dispatch(Action::Resolved(data)),
                Err(error) => dispatch.dispatch(Action::Rejected(error)),
            };
        })?;
        self.dispatch.dispatch(Action::Pending);
        Ok(())
    }

    /// Adopts `data` directly, with no `Pending` step.
    pub fn set_data(&self, data: T) {
        self.dispatch.dispatch(Action::Resolved(data));
    }

    pub fn set_error(&self, error: E) {
        self.dispatch.dispatch(Action::Rejected(error));
    }

    pub fn status(&self) -> AsyncStatus {
        self.store.with(AsyncState::status)
    }

    pub fn state(&self) -> AsyncState<T, E>
    where
        T: Clone,
        E: Clone,
    {
        self.store.get()
    }

    pub fn data(&self) -> Option<T>
    where
        T: Clone,
    {
        self.store.with(|s| s.data().cloned())
    }

    pub fn error(&self) -> Option<E>
    where
        E: Clone,
    {
        self.store.with(|s| s.error().cloned())
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&AsyncState<T, E>) -> R) -> R {
        self.store.with(f)
    }

    /// Called after every applied transition. The callback may dispatch on
    /// this runner (`set_data`, `run`, a cached `load`); such transitions are
    /// applied after every subscriber has seen the current one.
    pub fn subscribe(&self, f: impl Fn(&AsyncState<T, E>) + 'static) -> SubId {
        self.store.subscribe(f)
    }

    pub fn unsubscribe(&self, id: SubId) -> bool {
        self.store.unsubscribe(id)
    }

    pub fn is_alive(&self) -> bool {
        self.guard.is_alive()
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

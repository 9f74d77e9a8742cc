//! Lifecycle of one asynchronous operation.
//!
//! ```text
//! idle -> pending -> resolved
//!                 \-> rejected
//! resolved | rejected -> pending   (re-run)
//! ```
//!
//! `AsyncState` carries its payload inside the variant, so "resolved with an
//! error" or "rejected with data" cannot be built. The flat
//! `{status, data, error}` readout is available through the accessors and
//! `snapshot()`.

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::error::{AsyncError, Result};
use crate::reducer::Reducer;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AsyncStatus {
    #[default]
    Idle,
    Pending,
    Resolved,
    Rejected,
}

impl AsyncStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AsyncStatus::Idle => "idle",
            AsyncStatus::Pending => "pending",
            AsyncStatus::Resolved => "resolved",
            AsyncStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for AsyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AsyncState<T, E> {
    Idle,
    Pending,
    Resolved(T),
    Rejected(E),
}

impl<T, E> Default for AsyncState<T, E> {
    fn default() -> Self {
        AsyncState::Idle
    }
}

impl<T, E> AsyncState<T, E> {
    /// Fresh state for a session. Only `Idle` and `Pending` carry no payload;
    /// any other seed falls back to `Idle`.
    pub fn seeded(status: AsyncStatus) -> Self {
        match status {
            AsyncStatus::Pending => AsyncState::Pending,
            AsyncStatus::Idle | AsyncStatus::Resolved | AsyncStatus::Rejected => AsyncState::Idle,
        }
    }

    pub fn status(&self) -> AsyncStatus {
        match self {
            AsyncState::Idle => AsyncStatus::Idle,
            AsyncState::Pending => AsyncStatus::Pending,
            AsyncState::Resolved(_) => AsyncStatus::Resolved,
            AsyncState::Rejected(_) => AsyncStatus::Rejected,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            AsyncState::Resolved(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            AsyncState::Rejected(error) => Some(error),
            _ => None,
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, AsyncState::Resolved(_) | AsyncState::Rejected(_))
    }

    pub fn snapshot(&self) -> AsyncSnapshot<'_, T, E> {
        AsyncSnapshot {
            status: self.status(),
            data: self.data(),
            error: self.error(),
        }
    }
}

/// Borrowed `{status, data, error}` view handed to presentation code.
#[derive(Debug, PartialEq, Serialize)]
pub struct AsyncSnapshot<'a, T, E> {
    pub status: AsyncStatus,
    pub data: Option<&'a T>,
    pub error: Option<&'a E>,
}

// Manual impls: the derives would demand `T: Clone/Copy`, but only references are held.
impl<T, E> Clone for AsyncSnapshot<'_, T, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, E> Copy for AsyncSnapshot<'_, T, E> {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action<T, E> {
    Pending,
    Resolved(T),
    Rejected(E),
}

impl<T, E> Action<T, E> {
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Pending => "pending",
            Action::Resolved(_) => "resolved",
            Action::Rejected(_) => "rejected",
        }
    }
}

/// Pure transition; the previous state never influences the result.
pub fn transition<T, E>(_state: &AsyncState<T, E>, action: Action<T, E>) -> AsyncState<T, E> {
    match action {
        Action::Pending => AsyncState::Pending,
        Action::Resolved(data) => AsyncState::Resolved(data),
        Action::Rejected(error) => AsyncState::Rejected(error),
    }
}

/// Untyped `{ "type": ..., "data"?: ..., "error"?: ... }` action, as found in
/// recorded or replayed traffic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawAction<T, E> {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<E>,
}

impl<T, E> RawAction<T, E> {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            data: None,
            error: None,
        }
    }
}

impl<T, E> From<Action<T, E>> for RawAction<T, E> {
    fn from(action: Action<T, E>) -> Self {
        let mut raw = RawAction::new(action.kind());
        match action {
            Action::Pending => {}
            Action::Resolved(data) => raw.data = Some(data),
            Action::Rejected(error) => raw.error = Some(error),
        }
        raw
    }
}

impl<T, E> TryFrom<RawAction<T, E>> for Action<T, E> {
    type Error = AsyncError;

    fn try_from(raw: RawAction<T, E>) -> Result<Self> {
        let RawAction { kind, data, error } = raw;
        let missing = || AsyncError::MissingPayload { kind: kind.clone() };
        match kind.as_str() {
            "pending" => Ok(Action::Pending),
            "resolved" => data.map(Action::Resolved).ok_or_else(missing),
            "rejected" => error.map(Action::Rejected).ok_or_else(missing),
            _ => Err(AsyncError::InvalidActionKind { kind }),
        }
    }
}

/// `transition` for untyped input. An unknown tag is a caller bug and is
/// returned as an error rather than folded into the state.
pub fn transition_raw<T, E>(
    state: &AsyncState<T, E>,
    raw: RawAction<T, E>,
) -> Result<AsyncState<T, E>> {
    match Action::try_from(raw) {
        Ok(action) => Ok(transition(state, action)),
        Err(err) => {
            log::error!("refusing transition out of `{}`: {err}", state.status());
            Err(err)
        }
    }
}

/// `Reducer` adapter so the machine can sit in a `Store`.
pub struct AsyncReducer<T, E>(PhantomData<fn() -> (T, E)>);

impl<T: 'static, E: 'static> Reducer for AsyncReducer<T, E> {
    type State = AsyncState<T, E>;
    type Action = Action<T, E>;

    fn reduce(state: &Self::State, action: Self::Action) -> Self::State {
        transition(state, action)
    }
}

pub use crate::cache::{CacheLookup, ResultCache};
pub use crate::error::AsyncError;
pub use crate::guard::{CancellationGuard, SafeDispatch};
pub use crate::machine::{
    Action, AsyncReducer, AsyncSnapshot, AsyncState, AsyncStatus, RawAction, transition,
    transition_raw,
};
pub use crate::reducer::{Reducer, Store};
pub use crate::runner::{AsyncRunner, RunnerOptions};
pub use crate::scope::Scope;
pub use crate::signal::{Signal, SubId, signal};

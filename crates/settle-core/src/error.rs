use futures::task::SpawnError;
use thiserror::Error;

/// Failures of the machinery itself. An operation that fails is not one of
/// these; it ends up as `AsyncState::Rejected`.
#[derive(Debug, Error)]
pub enum AsyncError {
    #[error("unhandled action type: {kind}")]
    InvalidActionKind { kind: String },

    #[error("action `{kind}` is missing its payload")]
    MissingPayload { kind: String },

    #[error("failed to spawn operation: {0}")]
    Spawn(#[from] SpawnError),
}

pub type Result<T, E = AsyncError> = std::result::Result<T, E>;

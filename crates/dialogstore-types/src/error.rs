use thiserror::Error;

/// Opaque storage-engine failure carried by [`DialogError::Storage`].
pub type StorageSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Domain error taxonomy for dialog operations.
///
/// Shared by the entity, the repository trait and the service so that every
/// layer reports the same outcome for the same failure. Storage adapters map
/// engine-native errors onto these variants; anything they do not recognise
/// becomes [`DialogError::Storage`] with the engine error as its source.
#[derive(Debug, Error)]
pub enum DialogError {
    #[error("invalid id: dialog id {id} and chat id {chat_id} must both be positive")]
    InvalidId { id: i64, chat_id: i64 },

    #[error("dialog {0} already exists")]
    AlreadyExists(i64),

    #[error("dialog {0} not found")]
    NotFound(i64),

    #[error("reply message is empty")]
    EmptyMessage,

    #[error("dialog {0} already has a reply")]
    AlreadyReplied(i64),

    #[error("storage failure")]
    Storage(#[source] StorageSource),
}

/// Coarse classification of a [`DialogError`] for callers deciding what to
/// tell the end user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The request changed nothing (bad input or missing record).
    NothingHappened,
    /// The requested change was already made earlier.
    AlreadyHappened,
    /// The store failed; the state of the record is unknown.
    Opaque,
}

impl DialogError {
    /// Wrap any engine error as an opaque storage failure.
    pub fn storage(err: impl Into<StorageSource>) -> Self {
        DialogError::Storage(err.into())
    }

    /// Stable machine-readable code, used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            DialogError::InvalidId { .. } => "INVALID_ID",
            DialogError::AlreadyExists(_) => "ALREADY_EXISTS",
            DialogError::NotFound(_) => "NOT_FOUND",
            DialogError::EmptyMessage => "EMPTY_MESSAGE",
            DialogError::AlreadyReplied(_) => "ALREADY_REPLIED",
            DialogError::Storage(_) => "STORAGE_FAILURE",
        }
    }

    pub fn outcome(&self) -> Outcome {
        match self {
            DialogError::InvalidId { .. } | DialogError::NotFound(_) | DialogError::EmptyMessage => {
                Outcome::NothingHappened
            }
            DialogError::AlreadyExists(_) | DialogError::AlreadyReplied(_) => {
                Outcome::AlreadyHappened
            }
            DialogError::Storage(_) => Outcome::Opaque,
        }
    }
}

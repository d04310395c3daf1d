//! Persistence Synchronizer: keeps the in-memory document, the local cache and the
//! remote store consistent across identity changes and media uploads.

pub mod local;
pub mod media;
pub mod remote;
pub mod session;
pub mod synchronizer;

use thiserror::Error;

use crate::document::{DocumentError, MediaSlot};

pub use local::{FileCache, LocalCache, MemoryCache};
pub use media::{InlineMediaStore, MediaPayload, MediaStore, S3MediaStore};
pub use remote::{MemoryRemoteStore, PgRemoteStore, RemoteSnapshot, RemoteStore, Subscription};
pub use session::EditorSession;
pub use synchronizer::{Connection, Origin, SaveReport, SnapshotOutcome, SyncStatus, Synchronizer};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("remote store error: {0}")]
    Remote(String),

    #[error("upload of {slot} failed: {message}")]
    Upload { slot: MediaSlot, message: String },

    #[error("subscription failed: {0}")]
    Subscribe(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("local cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl SyncError {
    /// Whether repeating the same save could succeed. Everything but malformed data is
    /// assumed transient.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, SyncError::Serialization(_) | SyncError::Document(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_errors_are_retryable() {
        assert!(SyncError::Remote("down".into()).is_retryable());
        assert!(SyncError::Upload {
            slot: MediaSlot::Photo,
            message: "timeout".into()
        }
        .is_retryable());
        assert!(SyncError::Io(std::io::Error::other("disk")).is_retryable());
    }

    #[test]
    fn test_data_errors_are_not_retryable() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(!SyncError::Serialization(err).is_retryable());
        assert!(!SyncError::Document(DocumentError::ImmutableField("id".into())).is_retryable());
    }
}

pub mod snapshot_cache;
pub mod token_storage;

pub use snapshot_cache::{JsonSnapshotCache, SnapshotCache, SnapshotError};
pub use token_storage::{OAuthState, StorageError, TokenStorage};

use gdrive_core::{DriveClient, DriveError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("provider could not return a complete listing for folder {folder_id}")]
    IncompleteSearch { folder_id: String },
    #[error("api error: {0}")]
    Provider(#[from] DriveError),
    #[error("failed to fetch metadata for source root {folder_id}: {source}")]
    MetadataFetch {
        folder_id: String,
        #[source]
        source: DriveError,
    },
    #[error("folder {folder_id} is its own ancestor")]
    Cycle { folder_id: String },
}

/// Walks and mirrors Drive folder trees. Every provider call is awaited in
/// turn; nothing runs concurrently.
#[derive(Clone)]
pub struct TreeWalker {
    pub(crate) client: DriveClient,
    pub(crate) copy_exact_filename: bool,
}

impl TreeWalker {
    pub fn new(client: DriveClient) -> Self {
        Self {
            client,
            copy_exact_filename: true,
        }
    }

    /// `false` leaves file naming to Drive, which yields "Copy of <name>".
    pub fn with_copy_exact_filename(mut self, exact: bool) -> Self {
        self.copy_exact_filename = exact;
        self
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderNode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub folders: Vec<FolderNode>,
    #[serde(default)]
    pub files: Vec<FileRef>,
    /// Descendant folders plus descendant files, not counting this folder.
    /// Stays zero until a descent has resolved the subtree.
    #[serde(default)]
    pub nested_object_count: u64,
}

impl FolderNode {
    /// A folder as seen by a single listing: no children resolved yet.
    pub fn unresolved(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            folders: Vec::new(),
            files: Vec::new(),
            nested_object_count: 0,
        }
    }
}

/// Direct children of one folder, partitioned by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    pub folder_id: String,
    pub folders: Vec<FolderNode>,
    pub files: Vec<FileRef>,
    /// Direct children only, independent of any deeper descent.
    pub local_object_count: u64,
}

impl TreeSnapshot {
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }
}

/// A fully resolved tree together with its descendant totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descent {
    pub tree: TreeSnapshot,
    pub total_nested_folders: u64,
    pub total_nested_files: u64,
}

impl Descent {
    pub fn total_nested_objects(&self) -> u64 {
        self.total_nested_folders + self.total_nested_files
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloneSummary {
    pub folders_created: u64,
    pub files_copied: u64,
    pub skipped: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloneOutcome {
    /// The tree was recreated under a new folder.
    Folder {
        root_id: String,
        summary: CloneSummary,
    },
    /// The source root was a plain file; it was copied on its own.
    SingleFile,
}

impl CloneOutcome {
    /// Destination root id, or an empty string for a single-file copy.
    pub fn root_id(&self) -> &str {
        match self {
            CloneOutcome::Folder { root_id, .. } => root_id,
            CloneOutcome::SingleFile => "",
        }
    }
}

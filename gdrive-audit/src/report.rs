use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::SnapshotCache;
use crate::tree::{TreeError, TreeSnapshot, TreeWalker};

const ROOT_COUNTS_FILE: &str = "assessment_1_report.json";
const NESTED_COUNTS_FILE: &str = "assessment_2_report.json";
const COPY_FILE: &str = "assessment_3_report.json";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("tree error: {0}")]
    Tree(#[from] TreeError),
    #[error("I/O error writing report: {0}")]
    Io(#[from] std::io::Error),
    #[error("report serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssessmentSelection {
    All,
    RootCounts,
    NestedCounts,
    Copy,
}

/// Direct children of the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootCountReport {
    pub num_folders: u64,
    pub num_files: u64,
    pub total_objects: u64,
}

/// Descendant totals, plus the nested count of every top-level folder keyed
/// by folder name. Folders sharing a name collapse into one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedCountReport {
    pub total_nested_files: u64,
    pub total_nested_folders: u64,
    pub nested_object_counts_by_folder: BTreeMap<String, u64>,
    pub total_nested_object_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyReport {
    /// Empty when the source root turned out to be a single file.
    pub copy_source_id: String,
}

pub struct Assessments<C> {
    walker: TreeWalker,
    cache: C,
    reports_dir: PathBuf,
}

impl<C: SnapshotCache> Assessments<C> {
    pub fn new(walker: TreeWalker, cache: C, reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            walker,
            cache,
            reports_dir: reports_dir.into(),
        }
    }

    pub async fn run(&self, selection: AssessmentSelection, file_id: &str) -> Result<(), ReportError> {
        match selection {
            AssessmentSelection::RootCounts => {
                self.root_counts(file_id).await?;
            }
            AssessmentSelection::NestedCounts => {
                self.nested_counts(file_id).await?;
            }
            AssessmentSelection::Copy => {
                self.copy_tree(file_id).await?;
            }
            AssessmentSelection::All => {
                self.root_counts(file_id).await?;
                self.nested_counts(file_id).await?;
                self.copy_tree(file_id).await?;
            }
        }
        Ok(())
    }

    pub async fn root_counts(&self, file_id: &str) -> Result<RootCountReport, ReportError> {
        let snapshot = self.walker.list_children(file_id).await?;
        let report = RootCountReport {
            num_folders: snapshot.folders.len() as u64,
            num_files: snapshot.files.len() as u64,
            total_objects: snapshot.local_object_count,
        };
        tracing::info!(
            folder_id = file_id,
            num_folders = report.num_folders,
            num_files = report.num_files,
            total_objects = report.total_objects,
            "root counts"
        );
        write_report(&self.reports_dir.join(ROOT_COUNTS_FILE), &report)?;
        Ok(report)
    }

    /// Also leaves the resolved tree in the snapshot cache for a later copy.
    pub async fn nested_counts(&self, file_id: &str) -> Result<NestedCountReport, ReportError> {
        let descent = self.walker.descend(file_id).await?;
        let mut by_folder = BTreeMap::new();
        for folder in &descent.tree.folders {
            tracing::info!(
                folder = %folder.name,
                nested_object_count = folder.nested_object_count,
                "top-level folder"
            );
            by_folder.insert(folder.name.clone(), folder.nested_object_count);
        }
        let report = NestedCountReport {
            total_nested_files: descent.total_nested_files,
            total_nested_folders: descent.total_nested_folders,
            nested_object_counts_by_folder: by_folder,
            total_nested_object_count: descent.total_nested_objects(),
        };
        tracing::info!(
            folder_id = file_id,
            total_nested_folders = report.total_nested_folders,
            total_nested_files = report.total_nested_files,
            "nested counts"
        );

        if let Err(err) = self.cache.store(&descent.tree) {
            tracing::warn!(error = %err, "could not store tree snapshot");
        }
        write_report(&self.reports_dir.join(NESTED_COUNTS_FILE), &report)?;
        Ok(report)
    }

    pub async fn copy_tree(&self, file_id: &str) -> Result<CopyReport, ReportError> {
        let tree = self.source_tree(file_id).await?;
        let outcome = self.walker.clone_tree(&tree, None).await?;
        let report = CopyReport {
            copy_source_id: outcome.root_id().to_string(),
        };
        tracing::info!(copy_source_id = %report.copy_source_id, "copy finished");
        write_report(&self.reports_dir.join(COPY_FILE), &report)?;
        Ok(report)
    }

    async fn source_tree(&self, file_id: &str) -> Result<TreeSnapshot, TreeError> {
        match self.cache.load(file_id) {
            Ok(Some(tree)) => {
                tracing::info!(folder_id = file_id, "reusing cached tree snapshot");
                return Ok(tree);
            }
            Ok(None) => {}
            Err(err) => tracing::warn!(error = %err, "ignoring unreadable tree snapshot"),
        }
        Ok(self.walker.descend(file_id).await?.tree)
    }
}

fn write_report<T: Serialize>(path: &Path, report: &T) -> Result<(), ReportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_vec_pretty(report)?)?;
    Ok(())
}

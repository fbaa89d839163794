use std::slice;

use super::model::{CloneOutcome, CloneSummary, FileRef, FolderNode, TreeSnapshot};
use super::walker::{TreeError, TreeWalker};

/// One level of the source tree and the folder it is being mirrored into.
struct CloneFrame<'a> {
    folders: slice::Iter<'a, FolderNode>,
    files: &'a [FileRef],
    destination: String,
}

impl TreeWalker {
    /// Recreates an already descended tree under a new folder.
    ///
    /// With no `destination` the source root's metadata decides what
    /// happens: a plain file is copied on its own, a folder gets a fresh
    /// namesake in the drive root that everything else is mirrored into.
    /// Children are never re-listed; the tree must come from [`descend`].
    /// A failed folder or file is logged and skipped, and so is a failed
    /// copy of a plain-file root.
    ///
    /// Two failures end the clone with an error: the source root's
    /// metadata cannot be fetched, or the destination root folder cannot
    /// be created. Without that folder the mirror would land loose in the
    /// drive root.
    ///
    /// [`descend`]: TreeWalker::descend
    pub async fn clone_tree(
        &self,
        tree: &TreeSnapshot,
        destination: Option<&str>,
    ) -> Result<CloneOutcome, TreeError> {
        let root_id = match destination {
            Some(id) => id.to_string(),
            None => match self.create_clone_root(tree).await? {
                Some(id) => id,
                None => return Ok(CloneOutcome::SingleFile),
            },
        };

        let mut summary = CloneSummary::default();
        let mut stack = vec![CloneFrame {
            folders: tree.folders.iter(),
            files: &tree.files,
            destination: root_id.clone(),
        }];

        while let Some(frame) = stack.last_mut() {
            if let Some(folder) = frame.folders.next() {
                let parent = frame.destination.clone();
                match self.client.create_folder(&folder.name, Some(&parent)).await {
                    Ok(new_id) => {
                        summary.folders_created += 1;
                        tracing::info!(
                            folder = %folder.name,
                            destination = %parent,
                            new_id = %new_id,
                            "copied folder"
                        );
                        if folder.nested_object_count != 0 {
                            stack.push(CloneFrame {
                                folders: folder.folders.iter(),
                                files: &folder.files,
                                destination: new_id,
                            });
                        }
                    }
                    Err(err) => {
                        summary.skipped += 1 + folder.nested_object_count;
                        tracing::error!(
                            folder = %folder.name,
                            destination = %parent,
                            error = %err,
                            "create folder failed, skipping its contents"
                        );
                    }
                }
                continue;
            }

            let Some(done) = stack.pop() else {
                break;
            };
            for file in done.files {
                if self.copy_file_into(file, &done.destination).await {
                    summary.files_copied += 1;
                } else {
                    summary.skipped += 1;
                }
            }
        }

        Ok(CloneOutcome::Folder { root_id, summary })
    }

    /// Returns the new root folder id, or `None` when the source was a plain
    /// file and has been handled on its own.
    async fn create_clone_root(&self, tree: &TreeSnapshot) -> Result<Option<String>, TreeError> {
        let source = match self.client.get_file(&tree.folder_id).await {
            Ok(source) => source,
            Err(source) => {
                tracing::error!(
                    folder_id = %tree.folder_id,
                    error = %source,
                    "get source file info failed"
                );
                return Err(TreeError::MetadataFetch {
                    folder_id: tree.folder_id.clone(),
                    source,
                });
            }
        };

        if !source.is_folder() {
            match self
                .client
                .copy_file(&source.id, Some(&source.name), None)
                .await
            {
                Ok(_) => tracing::warn!(
                    file_id = %source.id,
                    "source root is not a folder, copied it as a single file"
                ),
                Err(err) => tracing::error!(
                    file_id = %source.id,
                    error = %err,
                    "copy of source file failed, skipping it"
                ),
            }
            return Ok(None);
        }

        let root_id = self
            .client
            .create_folder(&source.name, None)
            .await
            .inspect_err(|err| tracing::error!(error = %err, "create destination root failed"))?;
        tracing::info!(name = %source.name, root_id = %root_id, "created destination root");
        Ok(Some(root_id))
    }

    async fn copy_file_into(&self, file: &FileRef, destination: &str) -> bool {
        let name = self.copy_exact_filename.then_some(file.name.as_str());
        match self.client.copy_file(&file.id, name, Some(destination)).await {
            Ok(_) => {
                tracing::info!(file = %file.name, destination, "copied file");
                true
            }
            Err(err) => {
                tracing::error!(file = %file.name, destination, error = %err, "copy file failed");
                false
            }
        }
    }
}

use gdrive_core::FileList;

use super::model::{FileRef, FolderNode, TreeSnapshot};
use super::pagination::accumulate;
use super::walker::{TreeError, TreeWalker};

impl TreeWalker {
    /// Lists the direct children of `folder_id`, following every page.
    ///
    /// An empty folder is an `Ok` snapshot with no children; a listing the
    /// provider marks as incomplete is an error, never a partial snapshot.
    pub async fn list_children(&self, folder_id: &str) -> Result<TreeSnapshot, TreeError> {
        let result = self.fetch_all_pages(folder_id).await;
        let list = match result {
            Ok(list) => list,
            Err(err) => {
                tracing::error!(folder_id, error = %err, "listing children failed");
                return Err(err);
            }
        };

        let local_object_count = list.files.len() as u64;
        let mut folders = Vec::new();
        let mut files = Vec::new();
        for item in list.files {
            if item.is_folder() {
                folders.push(FolderNode::unresolved(item.id, item.name));
            } else {
                files.push(FileRef {
                    id: item.id,
                    name: item.name,
                });
            }
        }
        tracing::debug!(
            folder_id,
            folders = folders.len(),
            files = files.len(),
            "listed children"
        );

        Ok(TreeSnapshot {
            folder_id: folder_id.to_string(),
            folders,
            files,
            local_object_count,
        })
    }

    async fn fetch_all_pages(&self, folder_id: &str) -> Result<FileList, TreeError> {
        let first = self.fetch_page(folder_id, None).await?;
        accumulate(first, move |token| async move {
            self.fetch_page(folder_id, Some(&token)).await
        })
        .await
    }

    async fn fetch_page(
        &self,
        folder_id: &str,
        page_token: Option<&str>,
    ) -> Result<FileList, TreeError> {
        let page = self.client.list_children(folder_id, page_token).await?;
        if page.incomplete_search {
            return Err(TreeError::IncompleteSearch {
                folder_id: folder_id.to_string(),
            });
        }
        Ok(page)
    }
}

use super::model::{Descent, TreeSnapshot};
use super::walker::{TreeError, TreeWalker};

/// A listed folder whose child folders are still being resolved.
struct Frame {
    snapshot: TreeSnapshot,
    next_child: usize,
    nested_folders: u64,
    nested_files: u64,
}

impl Frame {
    fn new(snapshot: TreeSnapshot) -> Self {
        let nested_folders = snapshot.folders.len() as u64;
        let nested_files = snapshot.files.len() as u64;
        Self {
            snapshot,
            next_child: 0,
            nested_folders,
            nested_files,
        }
    }

    /// Moves a finished child subtree into the folder it was listed from.
    fn absorb(&mut self, child: Frame) {
        if let Some(node) = self.snapshot.folders.get_mut(self.next_child) {
            node.folders = child.snapshot.folders;
            node.files = child.snapshot.files;
            node.nested_object_count = child.nested_folders + child.nested_files;
        }
        self.nested_folders += child.nested_folders;
        self.nested_files += child.nested_files;
        self.next_child += 1;
    }

    fn contains_ancestor(&self, folder_id: &str) -> bool {
        self.snapshot.folder_id == folder_id
    }

    fn into_descent(self) -> Descent {
        Descent {
            tree: self.snapshot,
            total_nested_folders: self.nested_folders,
            total_nested_files: self.nested_files,
        }
    }
}

impl TreeWalker {
    /// Resolves the whole tree under `folder_id`.
    ///
    /// Folders are listed depth-first in listing order. A folder's count is
    /// only written once every folder below it has been listed. Any listing
    /// failure aborts the descent, as does a folder that shows up among its
    /// own ancestors.
    pub async fn descend(&self, folder_id: &str) -> Result<Descent, TreeError> {
        let mut ancestors: Vec<Frame> = Vec::new();
        let mut current = Frame::new(self.list_children(folder_id).await?);

        loop {
            if let Some(child) = current.snapshot.folders.get(current.next_child) {
                let child_id = child.id.clone();
                if current.contains_ancestor(&child_id)
                    || ancestors.iter().any(|frame| frame.contains_ancestor(&child_id))
                {
                    tracing::error!(folder_id = %child_id, "folder hierarchy loops back on itself");
                    return Err(TreeError::Cycle {
                        folder_id: child_id,
                    });
                }
                let listing = self.list_children(&child_id).await?;
                ancestors.push(std::mem::replace(&mut current, Frame::new(listing)));
                continue;
            }

            tracing::debug!(
                folder_id = %current.snapshot.folder_id,
                nested_folders = current.nested_folders,
                nested_files = current.nested_files,
                "resolved folder"
            );
            let Some(mut parent) = ancestors.pop() else {
                return Ok(current.into_descent());
            };
            parent.absorb(current);
            current = parent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::model::{FileRef, FolderNode};
    use crate::tree::test_support::{
        folder_item, mount_listing_once, plain_file, walker_for,
    };
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn assert_counts_consistent(folder: &FolderNode) -> u64 {
        let mut expected = folder.files.len() as u64 + folder.folders.len() as u64;
        for child in &folder.folders {
            expected += assert_counts_consistent(child);
        }
        assert_eq!(folder.nested_object_count, expected, "folder {}", folder.id);
        folder.nested_object_count
    }

    #[tokio::test]
    async fn flat_folder_lists_once_and_reports_immediate_counts() {
        let server = MockServer::start().await;
        mount_listing_once(
            &server,
            "root",
            vec![plain_file("f1", "a.txt"), plain_file("f2", "b.txt")],
        )
        .await;

        let descent = walker_for(&server).descend("root").await.unwrap();

        assert_eq!(descent.total_nested_folders, 0);
        assert_eq!(descent.total_nested_files, 2);
        assert_eq!(descent.total_nested_objects(), 2);
        assert_eq!(descent.tree.local_object_count, 2);
    }

    #[tokio::test]
    async fn known_folder_layout_matches_expected_totals() {
        let server = MockServer::start().await;
        mount_listing_once(
            &server,
            "root",
            vec![
                folder_item("tf2", "Test Folder 2"),
                plain_file("r1", "one"),
                plain_file("r2", "two"),
                plain_file("r3", "three"),
                plain_file("r4", "four"),
            ],
        )
        .await;
        mount_listing_once(
            &server,
            "tf2",
            vec![folder_item("tf3", "Test Folder 3"), plain_file("n1", "nested")],
        )
        .await;
        mount_listing_once(&server, "tf3", vec![plain_file("d1", "deepest")]).await;

        let descent = walker_for(&server).descend("root").await.unwrap();

        assert_eq!(descent.total_nested_folders, 2);
        assert_eq!(descent.total_nested_files, 6);
        assert_eq!(descent.total_nested_objects(), 8);

        let top = &descent.tree.folders[0];
        assert_eq!(top.name, "Test Folder 2");
        assert_eq!(top.nested_object_count, 3);
        assert_eq!(top.folders[0].nested_object_count, 1);
        assert_eq!(
            top.folders[0].files,
            vec![FileRef {
                id: "d1".into(),
                name: "deepest".into()
            }]
        );
        for folder in &descent.tree.folders {
            assert_counts_consistent(folder);
        }
    }

    #[tokio::test]
    async fn sibling_totals_accumulate_in_listing_order() {
        let server = MockServer::start().await;
        mount_listing_once(
            &server,
            "root",
            vec![folder_item("a", "A"), folder_item("b", "B")],
        )
        .await;
        mount_listing_once(&server, "a", vec![plain_file("a1", "a1"), plain_file("a2", "a2")]).await;
        mount_listing_once(&server, "b", vec![folder_item("b1", "B1")]).await;
        mount_listing_once(&server, "b1", vec![]).await;

        let descent = walker_for(&server).descend("root").await.unwrap();

        assert_eq!(descent.total_nested_folders, 3);
        assert_eq!(descent.total_nested_files, 2);
        let names: Vec<_> = descent.tree.folders.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(descent.tree.folders[0].nested_object_count, 2);
        assert_eq!(descent.tree.folders[1].nested_object_count, 1);
        assert_eq!(descent.tree.folders[1].folders[0].nested_object_count, 0);
    }

    #[tokio::test]
    async fn failure_below_the_root_aborts_descent() {
        let server = MockServer::start().await;
        mount_listing_once(&server, "root", vec![folder_item("bad", "Broken")]).await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files"))
            .and(query_param("q", "'bad' in parents"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "incompleteSearch": true,
                "files": []
            })))
            .mount(&server)
            .await;

        let err = walker_for(&server).descend("root").await.unwrap_err();

        assert!(matches!(err, TreeError::IncompleteSearch { folder_id } if folder_id == "bad"));
    }

    #[tokio::test]
    async fn back_reference_to_an_ancestor_is_rejected() {
        let server = MockServer::start().await;
        mount_listing_once(&server, "root", vec![folder_item("a", "A")]).await;
        mount_listing_once(&server, "a", vec![folder_item("root", "Loop")]).await;

        let err = walker_for(&server).descend("root").await.unwrap_err();

        assert!(matches!(err, TreeError::Cycle { folder_id } if folder_id == "root"));
    }

    #[tokio::test]
    async fn same_folder_under_two_parents_is_not_a_cycle() {
        let server = MockServer::start().await;
        mount_listing_once(
            &server,
            "root",
            vec![folder_item("a", "A"), folder_item("b", "B")],
        )
        .await;
        mount_listing_once(&server, "a", vec![folder_item("shared", "Shared")]).await;
        mount_listing_once(&server, "b", vec![folder_item("shared", "Shared")]).await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files"))
            .and(query_param("q", "'shared' in parents"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "incompleteSearch": false,
                "files": [plain_file("s1", "inside")]
            })))
            .expect(2)
            .mount(&server)
            .await;

        let descent = walker_for(&server).descend("root").await.unwrap();

        assert_eq!(descent.total_nested_folders, 4);
        assert_eq!(descent.total_nested_files, 2);
    }
}

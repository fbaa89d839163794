use std::future::Future;

use gdrive_core::FileList;

/// Appends `next` to `merged`. Non-item fields stay those of `merged`;
/// only the continuation token moves forward.
pub fn merge_page(mut merged: FileList, next: FileList) -> FileList {
    merged.files.extend(next.files);
    merged.next_page_token = next.next_page_token;
    merged
}

/// Follows continuation tokens until the provider reports no further page,
/// concatenating items in retrieval order. The returned list never carries a
/// continuation token.
pub async fn accumulate<F, Fut, E>(first: FileList, mut next_page: F) -> Result<FileList, E>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<FileList, E>>,
{
    let mut merged = first;
    while let Some(token) = merged.next_page_token.take() {
        let page = next_page(token).await?;
        merged = merge_page(merged, page);
    }
    Ok(merged)
}

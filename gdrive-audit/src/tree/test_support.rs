use gdrive_core::{DriveClient, FOLDER_MIME_TYPE};
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::walker::TreeWalker;

pub fn walker_for(server: &MockServer) -> TreeWalker {
    let client = DriveClient::with_base_url(&server.uri(), "test-token").unwrap();
    TreeWalker::new(client)
}

pub fn drive_file(id: &str, name: &str, mime_type: &str) -> Value {
    json!({
        "kind": "drive#file",
        "id": id,
        "name": name,
        "mimeType": mime_type
    })
}

pub fn folder_item(id: &str, name: &str) -> Value {
    drive_file(id, name, FOLDER_MIME_TYPE)
}

pub fn plain_file(id: &str, name: &str) -> Value {
    drive_file(id, name, "text/plain")
}

fn listing_mock(folder_id: &str, items: Vec<Value>) -> Mock {
    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("q", format!("'{folder_id}' in parents").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "drive#fileList",
            "incompleteSearch": false,
            "files": items
        })))
}

pub async fn mount_listing(server: &MockServer, folder_id: &str, items: Vec<Value>) {
    listing_mock(folder_id, items).mount(server).await;
}

/// Same as [`mount_listing`], but the server verifies on drop that the
/// folder was listed exactly once.
pub async fn mount_listing_once(server: &MockServer, folder_id: &str, items: Vec<Value>) {
    listing_mock(folder_id, items).expect(1).mount(server).await;
}

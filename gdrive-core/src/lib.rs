mod client;
mod oauth;

pub use client::{DriveClient, DriveError, DriveFile, FOLDER_MIME_TYPE, FileList};
pub use oauth::{OAuthClient, OAuthError, OAuthToken};

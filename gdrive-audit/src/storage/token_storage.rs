use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("token file not found at {0}")]
    TokenNotFound(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("token file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid token expiry: {0}")]
    Expiry(#[from] time::error::Parse),
    #[error("cannot format token expiry: {0}")]
    Format(#[from] time::error::Format),
    #[error("token expiry out of range")]
    ExpiryRange(#[from] time::error::ComponentRange),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthState {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Unix seconds.
    pub expires_at: Option<i64>,
}

/// On-disk layout of an authorized-user token file. Fields this crate does
/// not use (`token_uri`, `scopes`, ...) are carried through untouched.
#[derive(Debug, Deserialize, Serialize)]
struct AuthorizedUserFile {
    token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expiry: Option<String>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

pub struct TokenStorage {
    path: PathBuf,
}

impl TokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_token(&self) -> bool {
        self.path.exists()
    }

    pub fn get_oauth_state(&self) -> Result<OAuthState, StorageError> {
        let file = self.read_file()?;
        let expires_at = file
            .expiry
            .as_deref()
            .map(|value| OffsetDateTime::parse(value, &Rfc3339).map(|t| t.unix_timestamp()))
            .transpose()?;
        Ok(OAuthState {
            access_token: file.token,
            refresh_token: file.refresh_token,
            client_id: file.client_id,
            client_secret: file.client_secret,
            expires_at,
        })
    }

    pub fn save_oauth_state(&self, state: &OAuthState) -> Result<(), StorageError> {
        // Keep whatever else the consent tooling wrote alongside the token.
        let extra = match self.read_file() {
            Ok(previous) => previous.extra,
            Err(_) => serde_json::Map::new(),
        };
        let expiry = state.expires_at.map(format_expiry).transpose()?;
        let file = AuthorizedUserFile {
            token: state.access_token.clone(),
            refresh_token: state.refresh_token.clone(),
            client_id: state.client_id.clone(),
            client_secret: state.client_secret.clone(),
            expiry,
            extra,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_vec_pretty(&file)?;
        let mut out = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&self.path)?;
        out.write_all(&payload)?;
        out.sync_all()?;
        drop(out);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    fn read_file(&self) -> Result<AuthorizedUserFile, StorageError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::TokenNotFound(self.path.clone()));
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_slice(&data)?)
    }
}

fn format_expiry(secs: i64) -> Result<String, StorageError> {
    Ok(OffsetDateTime::from_unix_timestamp(secs)?.format(&Rfc3339)?)
}

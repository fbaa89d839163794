use gdrive_core::{OAuthClient, OAuthError};
use thiserror::Error;

use crate::config::AuditConfig;
use crate::storage::{OAuthState, StorageError, TokenStorage};
use crate::token_provider::{TokenProvider, TokenProviderError};

/// No usable credentials. Nothing may touch Drive after this.
#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("token storage: {0}")]
    Storage(#[from] StorageError),
    #[error("token refresh: {0}")]
    Refresh(#[from] TokenProviderError),
    #[error("invalid oauth configuration: {0}")]
    OAuth(#[from] OAuthError),
}

/// Resolves the bearer token for Drive calls: an explicit token from the
/// environment wins, otherwise the token file is read and refreshed when
/// close to expiry. A refreshed token is written back.
pub async fn resolve_access_token(config: &AuditConfig) -> Result<String, CredentialsError> {
    if let Some(token) = &config.access_token {
        return Ok(token.clone());
    }

    let storage = TokenStorage::new(&config.token_path);
    if !storage.has_token() {
        tracing::error!(
            path = %storage.path().display(),
            "no token file; authorize with Google and save the authorized-user JSON there"
        );
        return Err(StorageError::TokenNotFound(storage.path().to_path_buf()).into());
    }
    let state = storage.get_oauth_state()?;
    let oauth_client = oauth_client_for(&state, config.oauth_base_url.as_deref())?;
    let mut provider = TokenProvider::new(state, oauth_client);
    let (token, refreshed) = provider.valid_access_token().await?;
    if refreshed {
        storage.save_oauth_state(provider.state())?;
    }
    Ok(token)
}

fn oauth_client_for(
    state: &OAuthState,
    base_url: Option<&str>,
) -> Result<Option<OAuthClient>, OAuthError> {
    let (Some(client_id), Some(client_secret)) = (&state.client_id, &state.client_secret) else {
        return Ok(None);
    };
    let client = match base_url {
        Some(url) => OAuthClient::with_base_url(url, client_id.as_str(), client_secret.as_str())?,
        None => OAuthClient::new(client_id.as_str(), client_secret.as_str())?,
    };
    Ok(Some(client))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_with_token_path(token_path: &Path) -> AuditConfig {
        AuditConfig {
            token_path: token_path.to_path_buf(),
            ..AuditConfig::from_lookup(|_| None)
        }
    }

    #[tokio::test]
    async fn explicit_token_skips_the_token_file() {
        let mut config = config_with_token_path(Path::new("/nonexistent/token.json"));
        config.access_token = Some("from-env".into());

        assert_eq!(resolve_access_token(&config).await.unwrap(), "from-env");
    }

    #[tokio::test]
    async fn missing_token_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_token_path(&dir.path().join("token.json"));

        let err = resolve_access_token(&config).await.unwrap_err();

        assert!(matches!(
            err,
            CredentialsError::Storage(StorageError::TokenNotFound(_))
        ));
    }

    #[tokio::test]
    async fn expired_token_is_refreshed_and_saved() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "fresh",
                "token_type": "Bearer",
                "expires_in": 3599
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let token_path = dir.path().join("token.json");
        std::fs::write(
            &token_path,
            json!({
                "token": "stale",
                "refresh_token": "refresh-1",
                "client_id": "client-id",
                "client_secret": "secret",
                "expiry": "2020-01-01T00:00:00Z"
            })
            .to_string(),
        )
        .unwrap();
        let mut config = config_with_token_path(&token_path);
        config.oauth_base_url = Some(server.uri());

        let token = resolve_access_token(&config).await.unwrap();

        assert_eq!(token, "fresh");
        let saved = TokenStorage::new(&token_path).get_oauth_state().unwrap();
        assert_eq!(saved.access_token, "fresh");
        assert_eq!(saved.refresh_token.as_deref(), Some("refresh-1"));
    }
}

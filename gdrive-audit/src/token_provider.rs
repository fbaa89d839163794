use gdrive_core::{OAuthClient, OAuthToken};
use thiserror::Error;

use crate::storage::OAuthState;

#[derive(Debug, Error)]
pub enum TokenProviderError {
    #[error("oauth client is required to refresh expired token")]
    MissingOAuthClient,
    #[error("refresh token is missing")]
    MissingRefreshToken,
    #[error("oauth refresh failed: {0}")]
    OAuth(#[from] gdrive_core::OAuthError),
}

pub struct TokenProvider {
    state: OAuthState,
    oauth_client: Option<OAuthClient>,
    refresh_skew_secs: i64,
}

impl TokenProvider {
    pub fn new(state: OAuthState, oauth_client: Option<OAuthClient>) -> Self {
        Self {
            state,
            oauth_client,
            refresh_skew_secs: 60,
        }
    }

    /// Returns the stored access token, refreshing it first when it expires
    /// within the skew window. Reports whether a refresh happened.
    pub async fn valid_access_token(&mut self) -> Result<(String, bool), TokenProviderError> {
        let refreshed = self.should_refresh();
        if refreshed {
            self.refresh().await?;
        }
        Ok((self.state.access_token.clone(), refreshed))
    }

    pub fn state(&self) -> &OAuthState {
        &self.state
    }

    fn should_refresh(&self) -> bool {
        let Some(expires_at) = self.state.expires_at else {
            return false;
        };
        expires_at <= now_unix().saturating_add(self.refresh_skew_secs)
    }

    async fn refresh(&mut self) -> Result<(), TokenProviderError> {
        let refresh_token = self
            .state
            .refresh_token
            .clone()
            .ok_or(TokenProviderError::MissingRefreshToken)?;
        let client = self
            .oauth_client
            .as_ref()
            .ok_or(TokenProviderError::MissingOAuthClient)?;
        let token = client.refresh_token(&refresh_token).await?;
        tracing::info!("access token refreshed");
        self.state = refreshed_state(&self.state, token, refresh_token);
        Ok(())
    }
}

fn refreshed_state(previous: &OAuthState, token: OAuthToken, refresh_token: String) -> OAuthState {
    OAuthState {
        access_token: token.access_token,
        // Google only rotates the refresh token occasionally.
        refresh_token: Some(token.refresh_token.unwrap_or(refresh_token)),
        client_id: previous.client_id.clone(),
        client_secret: previous.client_secret.clone(),
        expires_at: token
            .expires_in
            .map(|secs| now_unix().saturating_add(secs as i64)),
    }
}

fn now_unix() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn state(expires_at: Option<i64>, refresh_token: Option<&str>) -> OAuthState {
        OAuthState {
            access_token: "old-token".into(),
            refresh_token: refresh_token.map(str::to_string),
            client_id: Some("client-id".into()),
            client_secret: Some("secret".into()),
            expires_at,
        }
    }

    #[tokio::test]
    async fn returns_current_token_when_not_expired() {
        let mut provider = TokenProvider::new(state(Some(i64::MAX), Some("refresh-1")), None);

        let (token, refreshed) = provider
            .valid_access_token()
            .await
            .expect("token should be valid");
        assert_eq!(token, "old-token");
        assert!(!refreshed);
    }

    #[tokio::test]
    async fn token_without_expiry_is_used_as_is() {
        let mut provider = TokenProvider::new(state(None, None), None);

        let (token, _) = provider.valid_access_token().await.unwrap();
        assert_eq!(token, "old-token");
    }

    #[tokio::test]
    async fn refreshes_token_when_expired() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=refresh-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "new-token",
                "token_type": "Bearer",
                "expires_in": 3599
            })))
            .mount(&server)
            .await;
        let oauth_client = OAuthClient::with_base_url(&server.uri(), "client-id", "secret")
            .expect("oauth client should be built");
        let mut provider = TokenProvider::new(state(Some(0), Some("refresh-1")), Some(oauth_client));

        let (token, refreshed) = provider
            .valid_access_token()
            .await
            .expect("token should refresh");
        assert_eq!(token, "new-token");
        assert!(refreshed);
        assert_eq!(provider.state().refresh_token.as_deref(), Some("refresh-1"));
        assert!(provider.state().expires_at.unwrap() > now_unix());
    }

    #[tokio::test]
    async fn returns_error_when_expired_and_no_refresh_token() {
        let mut provider = TokenProvider::new(state(Some(0), None), None);

        let err = provider
            .valid_access_token()
            .await
            .expect_err("expected missing refresh token error");
        assert!(matches!(err, TokenProviderError::MissingRefreshToken));
    }

    #[tokio::test]
    async fn returns_error_when_expired_without_oauth_client() {
        let mut provider = TokenProvider::new(state(Some(0), Some("refresh-1")), None);

        let err = provider
            .valid_access_token()
            .await
            .expect_err("expected missing client error");
        assert!(matches!(err, TokenProviderError::MissingOAuthClient));
    }
}

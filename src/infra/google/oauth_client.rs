// =============================================================================
// GOOGLE OAUTH 2.0 CLIENT (AUTHORIZATION CODE FLOW)
// =============================================================================
//
// The spreadsheet mirror acts on behalf of a Google user, so unlike a service
// account we need the three-legged flow:
//
// 1. `/api/auth/google` redirects the site owner to the consent screen built
//    by `authorization_url` (offline access, so we get a refresh token).
// 2. Google redirects back to `/api/auth/callback/google?code=...`, and the
//    code is exchanged for tokens at the token endpoint.
// 3. When the access token gets close to expiry, the refresh token is traded
//    for a new one.
//
// **Setup:**
// - Create an OAuth client ("Web application") in Google Cloud Console
// - Add `GOOGLE_REDIRECT_URI` to its authorized redirect URIs
// - Enable the Google Sheets API for the project

use crate::core::oauth::{AuthorizationProvider, OAuthCredentials, OAuthError, TokenGrant};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// OAuth client registration.
#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
}

/// Response from Google's token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
    scope: Option<String>,
    token_type: Option<String>,
}

pub struct GoogleOAuthClient {
    client: Client,
    config: GoogleOAuthConfig,
    auth_url: Url,
    token_url: String,
}

impl GoogleOAuthClient {
    pub fn new(
        config: GoogleOAuthConfig,
        timeout: std::time::Duration,
    ) -> Result<Self, OAuthError> {
        Self::with_endpoints(config, GOOGLE_AUTH_URL, GOOGLE_TOKEN_URL, timeout)
    }

    /// Points the client at different endpoints (tests, emulators).
    pub fn with_endpoints(
        config: GoogleOAuthConfig,
        auth_url: &str,
        token_url: &str,
        timeout: std::time::Duration,
    ) -> Result<Self, OAuthError> {
        let auth_url = Url::parse(auth_url).map_err(|e| OAuthError::Provider(e.to_string()))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OAuthError::Provider(e.to_string()))?;

        Ok(Self {
            client,
            config,
            auth_url,
            token_url: token_url.to_string(),
        })
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse, OAuthError> {
        let response = self
            .client
            .post(&self.token_url)
            .form(form)
            .send()
            .await
            .map_err(|e| OAuthError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(OAuthError::Provider(format!(
                "Token request failed ({}): {}",
                status, text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| OAuthError::Provider(e.to_string()))
    }
}

fn expiry_from(expires_in: Option<i64>) -> Option<chrono::DateTime<Utc>> {
    expires_in.map(|secs| Utc::now() + Duration::seconds(secs))
}

#[async_trait]
impl AuthorizationProvider for GoogleOAuthClient {
    fn authorization_url(&self, state: &str) -> String {
        let mut url = self.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.config.scopes.join(" "))
            .append_pair("access_type", "offline")
            .append_pair("include_granted_scopes", "true")
            // Without this Google only returns a refresh token on the very first consent.
            .append_pair("prompt", "consent")
            .append_pair("state", state);
        url.to_string()
    }

    async fn exchange_code(&self, code: &str) -> Result<OAuthCredentials, OAuthError> {
        let token = self
            .request_token(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", &self.config.client_id),
                ("client_secret", &self.config.client_secret),
                ("redirect_uri", &self.config.redirect_uri),
            ])
            .await?;

        tracing::debug!(
            has_refresh_token = token.refresh_token.is_some(),
            "Exchanged authorization code"
        );

        Ok(OAuthCredentials {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: expiry_from(token.expires_in),
            scope: token.scope,
            token_type: token.token_type,
        })
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenGrant, OAuthError> {
        let token = self
            .request_token(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", &self.config.client_id),
                ("client_secret", &self.config.client_secret),
            ])
            .await?;

        Ok(TokenGrant {
            access_token: token.access_token,
            expires_at: expiry_from(token.expires_in),
            refresh_token: token.refresh_token,
        })
    }
}

use chrono::{DateTime, Utc};
use std::fmt;

/// The OAuth credential set used for the spreadsheet mirror.
///
/// There is exactly one of these per process. It starts out empty, gets
/// populated by the authorization callback and is mutated in place whenever
/// the access token is refreshed.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthCredentials {
    pub access_token: String,

    /// Only present when the provider granted offline access.
    pub refresh_token: Option<String>,

    /// `None` means the provider did not tell us, which we treat as expired.
    pub expires_at: Option<DateTime<Utc>>,

    pub scope: Option<String>,
    pub token_type: Option<String>,
}

// Tokens are bearer secrets, keep them out of logs.
impl fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("access_token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Result of a refresh-token grant.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    pub expires_at: Option<DateTime<Utc>>,

    /// Providers may rotate the refresh token. Most don't.
    pub refresh_token: Option<String>,
}

impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("rotated_refresh_token", &self.refresh_token.is_some())
            .finish()
    }
}

impl OAuthCredentials {
    /// Applies a refresh result, keeping the old refresh token unless a new one was issued.
    pub fn apply_grant(&mut self, grant: TokenGrant) {
        self.access_token = grant.access_token;
        self.expires_at = grant.expires_at;
        if let Some(refresh_token) = grant.refresh_token {
            self.refresh_token = Some(refresh_token);
        }
    }
}

// Token lifecycle for the spreadsheet integration.
//
// The credential set is owned by a `TokenManager` that gets injected wherever
// it is needed, instead of living in a process-wide global. That also gives us
// one place to serialize refreshes: at most one refresh is in flight at a
// time, it runs on its own task, and every caller that finds an expired token
// while it runs waits for that same outcome.

use super::oauth_models::{OAuthCredentials, TokenGrant};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{watch, Mutex, RwLock};

/// Tokens that expire within this window are treated as already expired.
pub const EXPIRY_MARGIN_MINUTES: i64 = 5;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OAuthError {
    #[error("Not authenticated: {0}")]
    NotAuthenticated(String),

    #[error("Authorization provider error: {0}")]
    Provider(String),
}

/// The OAuth provider operations the token lifecycle depends on.
#[async_trait]
pub trait AuthorizationProvider: Send + Sync {
    /// URL of the consent screen the user gets redirected to.
    fn authorization_url(&self, state: &str) -> String;

    /// Exchanges an authorization code from the consent callback.
    async fn exchange_code(&self, code: &str) -> Result<OAuthCredentials, OAuthError>;

    /// Trades a refresh token for a new access token.
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenGrant, OAuthError>;
}

// Lets the web layer hold a type-erased provider.
#[async_trait]
impl AuthorizationProvider for Box<dyn AuthorizationProvider> {
    fn authorization_url(&self, state: &str) -> String {
        (**self).authorization_url(state)
    }

    async fn exchange_code(&self, code: &str) -> Result<OAuthCredentials, OAuthError> {
        (**self).exchange_code(code).await
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenGrant, OAuthError> {
        (**self).refresh_token(refresh_token).await
    }
}

/// Returns true when `credentials` can be used as-is at `now`.
///
/// Missing credentials and missing expiry both count as unusable, so the
/// caller goes down the refresh path rather than sending a dead token.
pub fn is_usable(credentials: Option<&OAuthCredentials>, now: DateTime<Utc>) -> bool {
    match credentials.and_then(|c| c.expires_at) {
        Some(expires_at) => now + Duration::minutes(EXPIRY_MARGIN_MINUTES) < expires_at,
        None => false,
    }
}

type RefreshOutcome = Result<OAuthCredentials, OAuthError>;

/// `None` while the refresh is running, then its outcome.
type RefreshWatch = watch::Receiver<Option<RefreshOutcome>>;

pub struct TokenManager<P: AuthorizationProvider> {
    inner: Arc<TokenState<P>>,
}

struct TokenState<P> {
    provider: P,
    credentials: RwLock<Option<OAuthCredentials>>,
    /// Bumped by every `install`; a refresh started before it must not
    /// overwrite what was installed.
    installs: AtomicU64,
    /// The most recent refresh, finished or not.
    refresh_slot: Mutex<Option<RefreshWatch>>,
}

impl<P: AuthorizationProvider + 'static> TokenManager<P> {
    /// Creates a manager with an empty credential set.
    pub fn new(provider: P) -> Self {
        Self {
            inner: Arc::new(TokenState {
                provider,
                credentials: RwLock::new(None),
                installs: AtomicU64::new(0),
                refresh_slot: Mutex::new(None),
            }),
        }
    }

    pub fn authorization_url(&self, state: &str) -> String {
        self.inner.provider.authorization_url(state)
    }

    pub async fn has_credentials(&self) -> bool {
        self.inner.credentials.read().await.is_some()
    }

    pub async fn is_usable(&self) -> bool {
        is_usable(self.inner.credentials.read().await.as_ref(), Utc::now())
    }

    /// Exchanges the consent callback code and installs the resulting credentials.
    pub async fn complete_authorization(&self, code: &str) -> Result<(), OAuthError> {
        let credentials = self.inner.provider.exchange_code(code).await?;
        self.install(credentials).await;
        Ok(())
    }

    /// Replaces the credential set after a fresh authorization.
    ///
    /// Providers usually omit the refresh token when the user re-consents, so
    /// an existing refresh token is carried over in that case.
    pub async fn install(&self, mut credentials: OAuthCredentials) {
        let mut current = self.inner.credentials.write().await;

        if credentials.refresh_token.is_none() {
            credentials.refresh_token = current.as_ref().and_then(|c| c.refresh_token.clone());
        }
        if credentials.refresh_token.is_none() {
            tracing::warn!(
                "Authorization granted without a refresh token; automatic renewal will not work"
            );
        }

        self.inner.installs.fetch_add(1, Ordering::AcqRel);
        *current = Some(credentials);
        tracing::info!("OAuth credentials installed");
    }

    /// Returns credentials that are safe to use right now, refreshing first if needed.
    ///
    /// Dropping the returned future (a caller timing out, say) does not cancel
    /// the refresh; it keeps running for everyone else waiting on it.
    pub async fn ensure_usable(&self) -> Result<OAuthCredentials, OAuthError> {
        if let Some(credentials) = self.inner.usable_snapshot().await {
            return Ok(credentials);
        }

        let mut refresh = {
            let mut slot = self.inner.refresh_slot.lock().await;

            // Installed or refreshed while we were waiting for the slot.
            if let Some(credentials) = self.inner.usable_snapshot().await {
                return Ok(credentials);
            }

            let running = slot
                .as_ref()
                .filter(|running| running.borrow().is_none())
                .cloned();
            match running {
                Some(running) => running,
                None => {
                    let started = self.start_refresh().await?;
                    *slot = Some(started.clone());
                    started
                }
            }
        };

        let outcome = match refresh.wait_for(Option::is_some).await {
            Ok(done) => (*done).clone(),
            Err(_) => None,
        };
        outcome.unwrap_or_else(|| {
            Err(OAuthError::NotAuthenticated(
                "token refresh was interrupted".to_string(),
            ))
        })
    }

    /// Spawns a refresh with the stored refresh token. Must hold `refresh_slot`.
    async fn start_refresh(&self) -> Result<RefreshWatch, OAuthError> {
        let (refresh_token, installs) = {
            let credentials = self.inner.credentials.read().await;
            let current = credentials.as_ref().ok_or_else(|| {
                OAuthError::NotAuthenticated(
                    "no credentials; authorize the integration first".to_string(),
                )
            })?;
            let refresh_token = current.refresh_token.clone().ok_or_else(|| {
                OAuthError::NotAuthenticated("no refresh token available".to_string())
            })?;
            (refresh_token, self.inner.installs.load(Ordering::Acquire))
        };

        let (sender, receiver) = watch::channel(None);
        let state = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let outcome = state.refresh(&refresh_token, installs).await;
            sender.send_replace(Some(outcome));
        });
        Ok(receiver)
    }
}

impl<P: AuthorizationProvider> TokenState<P> {
    async fn usable_snapshot(&self) -> Option<OAuthCredentials> {
        let credentials = self.credentials.read().await;
        if is_usable(credentials.as_ref(), Utc::now()) {
            credentials.clone()
        } else {
            None
        }
    }

    async fn refresh(&self, refresh_token: &str, installs: u64) -> RefreshOutcome {
        let grant = self
            .provider
            .refresh_token(refresh_token)
            .await
            .map_err(|e| {
                tracing::error!("Failed to refresh OAuth access token: {}", e);
                OAuthError::NotAuthenticated(format!("token refresh failed: {}", e))
            })?;

        let mut credentials = self.credentials.write().await;
        if self.installs.load(Ordering::Acquire) != installs {
            // Re-authorized mid-refresh; the installed set wins.
            tracing::info!("Discarding refreshed token, credentials were re-installed");
            return credentials.clone().ok_or_else(|| {
                OAuthError::NotAuthenticated("credentials were cleared".to_string())
            });
        }
        let current = credentials.as_mut().ok_or_else(|| {
            OAuthError::NotAuthenticated("credentials were cleared".to_string())
        })?;
        current.apply_grant(grant);

        tracing::info!(expires_at = ?current.expires_at, "OAuth access token refreshed");
        Ok(current.clone())
    }
}

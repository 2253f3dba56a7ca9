// Mirrors persisted contacts into a spreadsheet.
//
// Each contact gets its own background task: make sure the OAuth token is
// usable (refreshing it if needed), then append one row. Whatever happens is
// logged and dropped. There is no retry and no queue, a failed mirror is
// simply a missing row in the sheet; the durable store still has it.

use super::contact_mirror::ContactMirror;
use super::contact_models::StoredContact;
use crate::core::oauth::{AuthorizationProvider, OAuthError, TokenManager};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("Spreadsheet API error: {0}")]
    Api(String),
}

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error(transparent)]
    Auth(#[from] OAuthError),

    #[error(transparent)]
    Api(#[from] SheetsError),

    #[error("Spreadsheet mirror timed out after {0:?}")]
    TimedOut(Duration),
}

/// The spreadsheet operation the mirror needs.
#[async_trait]
pub trait SpreadsheetClient: Send + Sync {
    /// Appends `values` as one row after the last row of `range`.
    async fn append_row(
        &self,
        access_token: &str,
        spreadsheet_id: &str,
        range: &str,
        values: &[String],
    ) -> Result<(), SheetsError>;
}

/// Where rows go and how long a single mirror may take.
#[derive(Debug, Clone)]
pub struct SheetTarget {
    pub spreadsheet_id: String,
    pub range: String,
    pub timeout: Duration,
}

pub struct SheetMirror<C: SpreadsheetClient, P: AuthorizationProvider> {
    inner: Arc<MirrorInner<C, P>>,
}

struct MirrorInner<C: SpreadsheetClient, P: AuthorizationProvider> {
    client: C,
    tokens: Arc<TokenManager<P>>,
    target: SheetTarget,
}

impl<C: SpreadsheetClient, P: AuthorizationProvider> SheetMirror<C, P> {
    pub fn new(client: C, tokens: Arc<TokenManager<P>>, target: SheetTarget) -> Self {
        Self {
            inner: Arc::new(MirrorInner {
                client,
                tokens,
                target,
            }),
        }
    }
}

impl<C: SpreadsheetClient, P: AuthorizationProvider + 'static> MirrorInner<C, P> {
    /// One complete mirror attempt. Runs inside the spawned task.
    async fn append(&self, contact: &StoredContact) -> Result<(), MirrorError> {
        let timeout = self.target.timeout;
        tokio::time::timeout(timeout, async {
            // Never call the API with a token we know is stale.
            let credentials = self.tokens.ensure_usable().await?;
            self.client
                .append_row(
                    &credentials.access_token,
                    &self.target.spreadsheet_id,
                    &self.target.range,
                    &contact.sheet_row(),
                )
                .await?;
            Ok::<(), MirrorError>(())
        })
        .await
        .map_err(|_| MirrorError::TimedOut(timeout))?
    }
}

impl<C, P> ContactMirror for SheetMirror<C, P>
where
    C: SpreadsheetClient + 'static,
    P: AuthorizationProvider + 'static,
{
    fn mirror(&self, contact: StoredContact) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            match inner.append(&contact).await {
                Ok(()) => {
                    tracing::info!(contact_id = contact.id, "Contact mirrored to spreadsheet")
                }
                Err(e) => tracing::warn!(
                    contact_id = contact.id,
                    "Failed to mirror contact to spreadsheet: {}",
                    e
                ),
            }
        });
    }
}

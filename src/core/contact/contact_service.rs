// Contact submission workflow.
//
// A submission is validated, written to the durable store, and then handed
// to the mirror. Only the first two steps can fail the request; the mirror
// runs on its own and reports through the logs.
//
//   Received -> Validated -> Persisted -> (mirror attempted) -> Completed
//                    \             \
//                  Rejected      Rejected

use super::contact_mirror::ContactMirror;
use super::contact_models::{ContactSubmission, NewContact, StoredContact};
use super::contact_store::{ContactStore, StoreError};
use chrono::Utc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Missing required fields: {}", .missing.join(", "))]
    Validation { missing: Vec<&'static str> },

    #[error("Failed to persist contact: {0}")]
    Persistence(#[from] StoreError),
}

pub struct ContactService<S: ContactStore, M: ContactMirror> {
    store: S,
    mirror: M,
}

impl<S: ContactStore, M: ContactMirror> ContactService<S, M> {
    pub fn new(store: S, mirror: M) -> Self {
        Self { store, mirror }
    }

    /// Validates and persists a submission, then kicks off the mirror.
    ///
    /// The returned contact only depends on the durable write.
    pub async fn submit(
        &self,
        submission: ContactSubmission,
    ) -> Result<StoredContact, ContactError> {
        let contact = validate(submission)?;

        let stored = self.store.insert(contact).await.map_err(|e| {
            tracing::error!("Failed to persist contact: {}", e);
            ContactError::Persistence(e)
        })?;
        tracing::info!(contact_id = stored.id, "Contact persisted");

        self.mirror.mirror(stored.clone());
        Ok(stored)
    }

    /// Whether the durable store is reachable.
    pub async fn store_healthy(&self) -> bool {
        match self.store.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Contact store health check failed: {}", e);
                false
            }
        }
    }
}

/// Checks every required field and stamps the submission time.
fn validate(submission: ContactSubmission) -> Result<NewContact, ContactError> {
    let mut missing = Vec::new();
    let mut take = |value: Option<String>, field: &'static str| -> String {
        let value = value.map(|v| v.trim().to_string()).unwrap_or_default();
        if value.is_empty() {
            missing.push(field);
        }
        value
    };

    let name = take(submission.name, "nome");
    let email = take(submission.email, "email");
    let phone = take(submission.phone, "telefone");
    let company = take(submission.company, "empresa");
    let revenue_bracket = take(submission.revenue_bracket, "faturamento");
    let message = take(submission.message, "mensagem");

    if !missing.is_empty() {
        tracing::info!(?missing, "Rejected contact submission");
        return Err(ContactError::Validation { missing });
    }

    Ok(NewContact {
        name,
        email,
        phone,
        company,
        revenue_bracket,
        message,
        submitted_at: Utc::now(),
    })
}

use super::contact_models::{NewContact, StoredContact};
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Durable home for contact submissions.
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Persists a contact and returns it with its store-assigned id.
    async fn insert(&self, contact: NewContact) -> Result<StoredContact, StoreError>;

    /// Cheap connectivity check for the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[async_trait]
impl ContactStore for Box<dyn ContactStore> {
    async fn insert(&self, contact: NewContact) -> Result<StoredContact, StoreError> {
        (**self).insert(contact).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        (**self).ping().await
    }
}

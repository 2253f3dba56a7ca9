use crate::core::contact::{ContactMirror, ContactService, ContactStore};
use crate::core::oauth::{AuthorizationProvider, PendingAuthorizations, TokenManager};
use std::path::PathBuf;
use std::sync::Arc;

pub type SiteTokenManager = TokenManager<Box<dyn AuthorizationProvider>>;
pub type SiteContactService = ContactService<Box<dyn ContactStore>, Box<dyn ContactMirror>>;

/// Everything the HTTP handlers share. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub contacts: Arc<SiteContactService>,
    /// `None` when the Google integration is not configured.
    pub tokens: Option<Arc<SiteTokenManager>>,
    pub pending: Arc<PendingAuthorizations>,
    pub site_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(
        contacts: Arc<SiteContactService>,
        tokens: Option<Arc<SiteTokenManager>>,
        site_dir: PathBuf,
    ) -> Self {
        Self {
            contacts,
            tokens,
            pending: Arc::new(PendingAuthorizations::new()),
            site_dir: Arc::new(site_dir),
        }
    }
}

use super::contact_models::StoredContact;

/// Best-effort secondary destination for contacts that are already persisted.
///
/// `mirror` returns nothing and is not async: implementations start their own
/// background work and may only log its outcome. The submission response can
/// never wait on, or be changed by, a mirror.
pub trait ContactMirror: Send + Sync {
    fn mirror(&self, contact: StoredContact);
}

impl ContactMirror for Box<dyn ContactMirror> {
    fn mirror(&self, contact: StoredContact) {
        (**self).mirror(contact)
    }
}

/// Used when no spreadsheet integration is configured.
pub struct DisabledMirror;

impl ContactMirror for DisabledMirror {
    fn mirror(&self, contact: StoredContact) {
        tracing::debug!(
            contact_id = contact.id,
            "Spreadsheet mirror disabled, contact not mirrored"
        );
    }
}

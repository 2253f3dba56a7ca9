pub mod contact_mirror;
pub mod contact_models;
pub mod contact_service;
pub mod contact_store;
pub mod sheet_mirror;

pub use contact_mirror::{ContactMirror, DisabledMirror};
pub use contact_models::{ContactSubmission, NewContact, StoredContact};
pub use contact_service::{ContactError, ContactService};
pub use contact_store::{ContactStore, StoreError};
pub use sheet_mirror::{SheetMirror, SheetTarget, SheetsError, SpreadsheetClient};

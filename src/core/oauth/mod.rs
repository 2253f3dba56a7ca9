// OAuth credential lifecycle for the spreadsheet integration.
// The provider itself (Google) lives in infra; this module only knows the
// `AuthorizationProvider` port.

pub mod oauth_models;
pub mod pending_authorizations;
pub mod token_manager;

pub use oauth_models::{OAuthCredentials, TokenGrant};
pub use pending_authorizations::PendingAuthorizations;
pub use token_manager::{AuthorizationProvider, OAuthError, TokenManager};

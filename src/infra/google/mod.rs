// Google infra layer.
// - `oauth_client.rs` runs the authorization code flow against Google's OAuth endpoints.
// - `sheets_client.rs` appends rows through the Sheets v4 API.

#[path = "oauth_client.rs"]
pub mod oauth_client;

#[path = "sheets_client.rs"]
pub mod sheets_client;

pub use oauth_client::{GoogleOAuthClient, GoogleOAuthConfig};
pub use sheets_client::GoogleSheetsClient;

// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "contact/mod.rs"]
pub mod contact;

#[path = "oauth/mod.rs"]
pub mod oauth;

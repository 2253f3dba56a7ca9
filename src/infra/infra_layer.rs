// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "contacts/sqlite_store.rs"]
pub mod contacts;

#[path = "google/mod.rs"]
pub mod google;

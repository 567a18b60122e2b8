//! SQLite-backed song store.

pub(crate) mod query;
pub mod sqlite;

pub use sqlite::SqliteSongStore;

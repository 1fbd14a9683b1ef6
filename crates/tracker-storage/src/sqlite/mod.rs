//! SQLite-backed storage implementation.

mod issues;
mod projects;
mod queries;
pub mod schema;
mod store;
mod users;

pub use store::SqliteStore;

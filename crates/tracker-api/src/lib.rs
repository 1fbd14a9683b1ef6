//! HTTP surfaces of the issue tracker.
//!
//! [`service::IssueService`] holds the resolver logic. The GraphQL schema in
//! [`graphql`] and the REST routes in [`rest`] are thin adapters over it and
//! share its error taxonomy ([`error::ApiError`]).

pub mod auth;
pub mod error;
pub mod extract;
pub mod graphql;
pub mod rest;
pub mod service;
pub mod state;

#[cfg(test)]
mod testing;

pub use error::ApiError;
pub use rest::router;
pub use service::IssueService;
pub use state::AppState;

//! Shared application state handed to every route.

use std::sync::Arc;

use tracker_core::filter::PageLimits;
use tracker_storage::Storage;

use crate::graphql::{TrackerSchema, build_schema};
use crate::service::IssueService;

/// State cloned into each request: the resolver layer and the GraphQL schema
/// built over it.
#[derive(Clone)]
pub struct AppState {
    pub service: IssueService,
    pub schema: TrackerSchema,
}

impl AppState {
    pub fn new(store: Arc<dyn Storage>, limits: PageLimits) -> Self {
        let service = IssueService::new(store, limits);
        let schema = build_schema(service.clone());
        Self { service, schema }
    }
}

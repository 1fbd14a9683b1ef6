//! GraphQL schema over [`IssueService`].
//!
//! Queries are public; mutations need a [`CurrentUser`] in the request data,
//! which the `/graphql` route adds when a valid bearer token is sent.

mod mutation;
mod query;
mod types;

use async_graphql::{Context, EmptySubscription, ErrorExtensions, Schema};
use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use tracing::debug;

pub use mutation::MutationRoot;
pub use query::QueryRoot;
pub use types::{
    CreateIssueInput, IssueObject, IssueOrderBy, PagingInput, UpdateIssueAssigneeInput,
    UpdateIssueInput,
};

use crate::auth::{CurrentUser, bearer_token, resolve_user};
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::service::IssueService;
use crate::state::AppState;

pub type TrackerSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Deepest selection a query may nest.
pub const MAX_QUERY_DEPTH: usize = 10;

/// Builds the schema with the service as context data.
pub fn build_schema(service: IssueService) -> TrackerSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(service)
        .limit_depth(MAX_QUERY_DEPTH)
        .finish()
}

/// `POST /graphql`. A valid bearer token attaches the session user; an
/// invalid one is ignored here and only fails the mutations that need it.
pub async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonBody(mut request): JsonBody<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    if bearer_token(&headers).is_some() {
        match resolve_user(&state, &headers).await {
            Ok(user) => request = request.data(CurrentUser(user)),
            Err(e) => debug!(code = e.code(), "graphql request without session"),
        }
    }
    Json(state.schema.execute(request).await)
}

fn service<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a IssueService> {
    ctx.data::<IssueService>()
}

fn require_user<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a CurrentUser> {
    ctx.data_opt::<CurrentUser>()
        .ok_or_else(|| ApiError::Authentication.extend())
}

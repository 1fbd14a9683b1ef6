//! REST routes. Reads are public; every mutating route extracts a
//! [`CurrentUser`](crate::auth::CurrentUser) and answers 401 without one.

mod issues;
mod projects;

use axum::routing::{get, patch, post};
use axum::{Json, Router};
use axum::extract::State;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use tracker_core::user::User;

use crate::error::Result;
use crate::graphql::graphql_handler;
use crate::state::AppState;

/// Builds the application router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/graphql", post(graphql_handler))
        .route("/api/issues", get(issues::list).post(issues::create))
        .route("/api/issues/status-count", get(issues::status_count))
        .route("/api/issues/latest", get(issues::latest))
        .route(
            "/api/issues/{id}",
            get(issues::show)
                .patch(issues::update)
                .delete(issues::destroy),
        )
        .route("/api/issues/{id}/assignee", patch(issues::assign))
        .route("/api/projects", get(projects::list).post(projects::create))
        .route(
            "/api/projects/{id}",
            get(projects::show)
                .put(projects::update)
                .delete(projects::destroy),
        )
        .route("/api/users", get(users))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn users(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    state.service.call(|svc| svc.users()).await.map(Json)
}

#[cfg(test)]
mod tests;

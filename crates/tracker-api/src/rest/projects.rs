//! `/api/projects` handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use tracker_core::project::{NewProject, Project, ProjectChanges};

use crate::auth::CurrentUser;
use crate::error::{ApiError, Result};
use crate::extract::JsonBody;
use crate::service::Deleted;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Project>>> {
    state.service.call(|svc| svc.projects()).await.map(Json)
}

pub async fn create(
    State(state): State<AppState>,
    _user: CurrentUser,
    JsonBody(input): JsonBody<NewProject>,
) -> Result<(StatusCode, Json<Project>)> {
    let project = state
        .service
        .call(move |svc| svc.create_project(&input))
        .await?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Project>> {
    state
        .service
        .call(move |svc| svc.project(id))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("project", id))
}

pub async fn update(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i64>,
    JsonBody(changes): JsonBody<ProjectChanges>,
) -> Result<Json<Project>> {
    state
        .service
        .call(move |svc| svc.update_project(id, &changes))
        .await
        .map(Json)
}

/// Fails with 409 while any issue still references the project.
pub async fn destroy(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<Deleted>)> {
    let deleted = state.service.call(move |svc| svc.delete_project(id)).await?;
    Ok((StatusCode::CREATED, Json(deleted)))
}

//! `/api/issues` handlers.

use axum::Json;
use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use tracker_core::filter::ListParams;
use tracker_core::issue::{Issue, IssueChanges, IssueWithAssignee, NewIssue};
use tracker_core::pagination::QueryParams;
use tracker_core::status_count::StatusCount;

use crate::auth::CurrentUser;
use crate::error::{ApiError, Result};
use crate::extract::{JsonBody, QueryArgs};
use crate::service::{AssigneeUpdate, Deleted, IssuePage};
use crate::state::AppState;

const ISSUES_PATH: &str = "/api/issues";

/// A list page plus hrefs for every enabled navigation control.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueList {
    #[serde(flatten)]
    page: IssuePage,
    links: Vec<PageLink>,
}

#[derive(Debug, Serialize)]
pub struct PageLink {
    rel: &'static str,
    href: String,
}

/// Builds navigation hrefs from the request's own query string, so filters
/// and sorting survive page changes.
fn page_links(page: &IssuePage, query: &QueryParams) -> Vec<PageLink> {
    let mut links = Vec::new();
    for control in page.pagination.controls() {
        control.activate(query, |target| {
            links.push(PageLink {
                rel: control.kind.as_str(),
                href: format!("{ISSUES_PATH}?{}", target.to_query_string()),
            });
        });
    }
    links
}

pub async fn list(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
    QueryArgs(params): QueryArgs<ListParams>,
) -> Result<Json<IssueList>> {
    let page = state
        .service
        .call(move |svc| svc.issues_page(&params))
        .await?;
    let query = QueryParams::parse(raw.as_deref().unwrap_or_default());
    let links = page_links(&page, &query);
    Ok(Json(IssueList { page, links }))
}

pub async fn create(
    State(state): State<AppState>,
    _user: CurrentUser,
    JsonBody(input): JsonBody<NewIssue>,
) -> Result<(StatusCode, Json<Issue>)> {
    let issue = state
        .service
        .call(move |svc| svc.create_issue(&input))
        .await?;
    Ok((StatusCode::CREATED, Json(issue)))
}

pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<IssueWithAssignee>> {
    state
        .service
        .call(move |svc| svc.issue(id))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("issue", id))
}

pub async fn update(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i64>,
    JsonBody(changes): JsonBody<IssueChanges>,
) -> Result<Json<Issue>> {
    state
        .service
        .call(move |svc| svc.update_issue(id, &changes))
        .await
        .map(Json)
}

/// Body of `PATCH /api/issues/{id}/assignee`. A missing or `null` id unassigns.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssigneeBody {
    #[serde(default)]
    assigned_to_user_id: Option<String>,
}

pub async fn assign(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i64>,
    JsonBody(body): JsonBody<AssigneeBody>,
) -> Result<Json<AssigneeUpdate>> {
    state
        .service
        .call(move |svc| svc.update_issue_assignee(id, body.assigned_to_user_id))
        .await
        .map(Json)
}

pub async fn destroy(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<Deleted>)> {
    let deleted = state.service.call(move |svc| svc.delete_issue(id)).await?;
    Ok((StatusCode::CREATED, Json(deleted)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCountParams {
    #[serde(default)]
    include_all: bool,
}

pub async fn status_count(
    State(state): State<AppState>,
    QueryArgs(params): QueryArgs<StatusCountParams>,
) -> Result<Json<Vec<StatusCount>>> {
    state
        .service
        .call(move |svc| svc.issue_status_count(params.include_all))
        .await
        .map(Json)
}

pub async fn latest(State(state): State<AppState>) -> Result<Json<Vec<IssueWithAssignee>>> {
    state
        .service
        .call(|svc| svc.latest_issues())
        .await
        .map(Json)
}

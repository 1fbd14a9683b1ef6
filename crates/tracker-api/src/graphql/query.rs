use async_graphql::{Context, ErrorExtensions, Object};

use tracker_core::enums::{IssueType, Status};
use tracker_core::filter::{IssueFilter, ListQuery, PageRequest};
use tracker_core::project::Project;
use tracker_core::status_count::StatusCount;
use tracker_core::user::User;

use super::service;
use super::types::{IssueObject, IssueOrderBy, PagingInput};

#[derive(Debug, Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// One page of issues, optionally filtered and ordered.
    async fn issues(
        &self,
        ctx: &Context<'_>,
        status: Option<Status>,
        issue_type: Option<IssueType>,
        user_id: Option<String>,
        project_id: Option<i64>,
        order_by: Option<IssueOrderBy>,
        paging: PagingInput,
    ) -> async_graphql::Result<Vec<IssueObject>> {
        let service = service(ctx)?;
        let query = ListQuery {
            filter: IssueFilter {
                status,
                issue_type,
                assigned_to_user_id: user_id.filter(|id| !id.is_empty()),
                project_id,
            },
            order: order_by.map(Into::into),
            page: PageRequest::new(paging.page, paging.page_size, service.limits()),
        };
        let issues = service
            .call(move |svc| svc.list_issues(&query))
            .await
            .map_err(|e| e.extend())?;
        Ok(issues.into_iter().map(IssueObject::from).collect())
    }

    /// Number of issues, optionally restricted to one status.
    async fn issues_count(
        &self,
        ctx: &Context<'_>,
        status: Option<Status>,
    ) -> async_graphql::Result<u64> {
        let filter = IssueFilter {
            status,
            ..Default::default()
        };
        service(ctx)?
            .call(move |svc| svc.count_issues(&filter))
            .await
            .map_err(|e| e.extend())
    }

    /// The five most recently created issues with their assignees.
    async fn latest_issues(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<IssueObject>> {
        let issues = service(ctx)?
            .call(|svc| svc.latest_issues())
            .await
            .map_err(|e| e.extend())?;
        Ok(issues.into_iter().map(IssueObject::from).collect())
    }

    async fn issue_status_count(
        &self,
        ctx: &Context<'_>,
        #[graphql(default = false)] include_all: bool,
    ) -> async_graphql::Result<Vec<StatusCount>> {
        service(ctx)?
            .call(move |svc| svc.issue_status_count(include_all))
            .await
            .map_err(|e| e.extend())
    }

    async fn issue(&self, ctx: &Context<'_>, id: i64) -> async_graphql::Result<Option<IssueObject>> {
        let issue = service(ctx)?
            .call(move |svc| svc.issue(id))
            .await
            .map_err(|e| e.extend())?;
        Ok(issue.map(IssueObject::from))
    }

    async fn users(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<User>> {
        service(ctx)?
            .call(|svc| svc.users())
            .await
            .map_err(|e| e.extend())
    }

    async fn projects(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Project>> {
        service(ctx)?
            .call(|svc| svc.projects())
            .await
            .map_err(|e| e.extend())
    }

    async fn project(&self, ctx: &Context<'_>, id: i64) -> async_graphql::Result<Option<Project>> {
        service(ctx)?
            .call(move |svc| svc.project(id))
            .await
            .map_err(|e| e.extend())
    }
}

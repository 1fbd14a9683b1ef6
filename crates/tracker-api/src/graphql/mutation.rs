use async_graphql::{Context, ErrorExtensions, Object};
use tracing::debug;

use tracker_core::issue::{IssueChanges, NewIssue};

use super::types::{CreateIssueInput, IssueObject, UpdateIssueAssigneeInput, UpdateIssueInput};
use super::{require_user, service};
use crate::service::{AssigneeUpdate, Deleted};

/// Issue mutations. Every field needs an authenticated session.
#[derive(Debug, Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_issue(
        &self,
        ctx: &Context<'_>,
        input: CreateIssueInput,
    ) -> async_graphql::Result<IssueObject> {
        let user = require_user(ctx)?;
        debug!(user_id = %user.0.id, "createIssue");
        let input = NewIssue::from(input);
        let issue = service(ctx)?
            .call(move |svc| svc.create_issue(&input))
            .await
            .map_err(|e| e.extend())?;
        Ok(issue.into())
    }

    async fn update_issue(
        &self,
        ctx: &Context<'_>,
        id: i64,
        input: UpdateIssueInput,
    ) -> async_graphql::Result<IssueObject> {
        let user = require_user(ctx)?;
        debug!(user_id = %user.0.id, id, "updateIssue");
        let changes = IssueChanges::from(input);
        let issue = service(ctx)?
            .call(move |svc| svc.update_issue(id, &changes))
            .await
            .map_err(|e| e.extend())?;
        Ok(issue.into())
    }

    /// Sets the assignee, or clears it when `assignedToUserId` is `null`.
    /// Omitting the field leaves the issue unchanged.
    async fn update_issue_assignee(
        &self,
        ctx: &Context<'_>,
        id: i64,
        input: UpdateIssueAssigneeInput,
    ) -> async_graphql::Result<AssigneeUpdate> {
        require_user(ctx)?;
        let service = service(ctx)?;
        let result = match input.change() {
            Some(assignee) => {
                service
                    .call(move |svc| svc.update_issue_assignee(id, assignee))
                    .await
            }
            None => {
                service
                    .call(move |svc| {
                        svc.update_issue(id, &IssueChanges::default())
                            .map(|issue| AssigneeUpdate {
                                id: issue.id,
                                assigned_to_user_id: issue.assigned_to_user_id,
                            })
                    })
                    .await
            }
        };
        result.map_err(|e| e.extend())
    }

    async fn delete_issue(&self, ctx: &Context<'_>, id: i64) -> async_graphql::Result<Deleted> {
        require_user(ctx)?;
        service(ctx)?
            .call(move |svc| svc.delete_issue(id))
            .await
            .map_err(|e| e.extend())
    }
}

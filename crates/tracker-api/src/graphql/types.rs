//! GraphQL object and input types.

use async_graphql::{Context, ErrorExtensions, InputObject, MaybeUndefined, Object};
use chrono::{DateTime, Utc};

use tracker_core::enums::{IssueType, Status};
use tracker_core::filter::{IssueOrder, SortField, SortOrder};
use tracker_core::issue::{Issue, IssueChanges, IssueWithAssignee, NewIssue};
use tracker_core::project::Project;
use tracker_core::user::User;

use super::service;

/// An issue. The assignee is either preloaded or fetched on demand.
pub struct IssueObject {
    issue: Issue,
    assignee: Option<Option<User>>,
}

impl From<Issue> for IssueObject {
    fn from(issue: Issue) -> Self {
        Self {
            issue,
            assignee: None,
        }
    }
}

impl From<IssueWithAssignee> for IssueObject {
    fn from(loaded: IssueWithAssignee) -> Self {
        Self {
            issue: loaded.issue,
            assignee: Some(loaded.assigned_to_user),
        }
    }
}

#[Object(name = "Issue")]
impl IssueObject {
    async fn id(&self) -> i64 {
        self.issue.id
    }

    async fn title(&self) -> &str {
        &self.issue.title
    }

    async fn description(&self) -> &str {
        &self.issue.description
    }

    async fn status(&self) -> Status {
        self.issue.status
    }

    async fn issue_type(&self) -> IssueType {
        self.issue.issue_type
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.issue.created_at
    }

    async fn updated_at(&self) -> DateTime<Utc> {
        self.issue.updated_at
    }

    async fn assigned_to_user_id(&self) -> Option<&str> {
        self.issue.assigned_to_user_id.as_deref()
    }

    async fn project_id(&self) -> Option<i64> {
        self.issue.project_id
    }

    async fn assigned_to_user(&self, ctx: &Context<'_>) -> async_graphql::Result<Option<User>> {
        if let Some(ref preloaded) = self.assignee {
            return Ok(preloaded.clone());
        }
        let Some(user_id) = self.issue.assigned_to_user_id.clone() else {
            return Ok(None);
        };
        service(ctx)?
            .call(move |svc| svc.user(&user_id))
            .await
            .map_err(|e| e.extend())
    }

    async fn project(&self, ctx: &Context<'_>) -> async_graphql::Result<Option<Project>> {
        let Some(project_id) = self.issue.project_id else {
            return Ok(None);
        };
        service(ctx)?
            .call(move |svc| svc.project(project_id))
            .await
            .map_err(|e| e.extend())
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// `orderBy` argument of `issues`.
#[derive(Debug, Clone, Copy, InputObject)]
pub struct IssueOrderBy {
    pub field: SortField,
    pub direction: SortOrder,
}

impl From<IssueOrderBy> for IssueOrder {
    fn from(input: IssueOrderBy) -> Self {
        IssueOrder {
            field: input.field,
            order: input.direction,
        }
    }
}

/// `paging` argument of `issues`. Missing or zero values take the defaults.
#[derive(Debug, Clone, Copy, Default, InputObject)]
pub struct PagingInput {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Clone, InputObject)]
pub struct CreateIssueInput {
    pub title: String,
    pub description: String,
    pub issue_type: Option<IssueType>,
    pub project_id: Option<i64>,
}

impl From<CreateIssueInput> for NewIssue {
    fn from(input: CreateIssueInput) -> Self {
        NewIssue {
            title: input.title,
            description: input.description,
            issue_type: input.issue_type,
            project_id: input.project_id,
        }
    }
}

/// Partial update. An explicit `null` clears a nullable field; an omitted
/// field is left as is.
#[derive(Debug, Clone, Default, InputObject)]
pub struct UpdateIssueInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<Status>,
    pub issue_type: Option<IssueType>,
    pub assigned_to_user_id: MaybeUndefined<String>,
    pub project_id: MaybeUndefined<i64>,
}

impl From<UpdateIssueInput> for IssueChanges {
    fn from(input: UpdateIssueInput) -> Self {
        IssueChanges {
            title: input.title,
            description: input.description,
            status: input.status,
            issue_type: input.issue_type,
            assigned_to_user_id: nullable(input.assigned_to_user_id),
            project_id: nullable(input.project_id),
        }
    }
}

#[derive(Debug, Clone, Default, InputObject)]
pub struct UpdateIssueAssigneeInput {
    pub assigned_to_user_id: MaybeUndefined<String>,
}

impl UpdateIssueAssigneeInput {
    /// `None` when the field was omitted, `Some(None)` for an explicit null.
    pub fn change(self) -> Option<Option<String>> {
        nullable(self.assigned_to_user_id)
    }
}

fn nullable<T>(value: MaybeUndefined<T>) -> Option<Option<T>> {
    match value {
        MaybeUndefined::Undefined => None,
        MaybeUndefined::Null => Some(None),
        MaybeUndefined::Value(v) => Some(Some(v)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_input_keeps_null_distinct() {
        let changes: IssueChanges = UpdateIssueInput {
            assigned_to_user_id: MaybeUndefined::Null,
            ..Default::default()
        }
        .into();
        assert_eq!(changes.assigned_to_user_id, Some(None));
        assert_eq!(changes.project_id, None);
        assert!(!changes.is_empty());

        let changes: IssueChanges = UpdateIssueInput::default().into();
        assert!(changes.is_empty());
    }
}

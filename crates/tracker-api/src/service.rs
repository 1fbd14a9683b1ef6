//! Resolver layer: the operations both API surfaces expose, with validation
//! and existence checks applied before any mutating store call.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use tracker_core::filter::{IssueFilter, ListParams, ListQuery, PageLimits};
use tracker_core::issue::{Issue, IssueChanges, IssueWithAssignee, NewIssue};
use tracker_core::pagination::Pagination;
use tracker_core::project::{NewProject, Project, ProjectChanges};
use tracker_core::status_count::StatusCount;
use tracker_core::user::User;
use tracker_core::validation;
use tracker_storage::{Storage, StorageError};

use crate::error::{ApiError, Result};

/// Size of the fixed "latest issues" snapshot.
pub const LATEST_ISSUES_LIMIT: u32 = 5;

/// One page of the issue list plus the metadata to render its navigation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuePage {
    pub items: Vec<Issue>,
    pub total_count: u64,
    pub page: u64,
    pub page_size: u64,
    pub pagination: Pagination,
}

/// Result of an assignee change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, async_graphql::SimpleObject)]
#[serde(rename_all = "camelCase")]
#[graphql(name = "IssueAssignee")]
pub struct AssigneeUpdate {
    pub id: i64,
    pub assigned_to_user_id: Option<String>,
}

/// Result of every delete operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, async_graphql::SimpleObject)]
pub struct Deleted {
    pub id: i64,
}

/// The resolver layer over a [`Storage`] backend.
///
/// Methods are synchronous; async callers go through [`IssueService::call`],
/// which moves the work onto the blocking pool.
#[derive(Clone)]
pub struct IssueService {
    store: Arc<dyn Storage>,
    limits: PageLimits,
}

impl IssueService {
    pub fn new(store: Arc<dyn Storage>, limits: PageLimits) -> Self {
        Self { store, limits }
    }

    pub fn limits(&self) -> PageLimits {
        self.limits
    }

    /// Runs `f` against this service on tokio's blocking pool.
    pub async fn call<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&IssueService) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let service = self.clone();
        tokio::task::spawn_blocking(move || f(&service))
            .await
            .map_err(|e| ApiError::Storage(StorageError::Internal(format!("worker failed: {e}"))))?
    }

    // -- Issue queries -------------------------------------------------------

    /// Returns one page of issues for a composed query.
    pub fn list_issues(&self, query: &ListQuery) -> Result<Vec<Issue>> {
        Ok(self
            .store
            .list_issues(&query.filter, query.order, query.paging())?)
    }

    /// Composes a query from raw listing parameters and returns the page,
    /// the total count and the pagination state.
    pub fn issues_page(&self, params: &ListParams) -> Result<IssuePage> {
        let query = ListQuery::from_params(params, self.limits)?;
        let items = self.list_issues(&query)?;
        let total_count = self.count_issues(&query.filter)?;
        debug!(
            page = query.page.page,
            page_size = query.page.page_size,
            total_count,
            "issue page loaded"
        );
        Ok(IssuePage {
            items,
            total_count,
            page: query.page.page,
            page_size: query.page.page_size,
            pagination: Pagination::new(total_count, query.page.page_size, query.page.page),
        })
    }

    pub fn count_issues(&self, filter: &IssueFilter) -> Result<u64> {
        Ok(self.store.count_issues(filter)?)
    }

    /// The five most recently created issues, newest first, with assignees.
    pub fn latest_issues(&self) -> Result<Vec<IssueWithAssignee>> {
        Ok(self.store.latest_issues(LATEST_ISSUES_LIMIT)?)
    }

    /// Per-status counts in the order OPEN, IN_PROGRESS, CLOSED, optionally
    /// preceded by the `All` row.
    pub fn issue_status_count(&self, include_all: bool) -> Result<Vec<StatusCount>> {
        Ok(self.store.status_tally()?.rows(include_all))
    }

    pub fn issue(&self, id: i64) -> Result<Option<IssueWithAssignee>> {
        optional(self.store.get_issue_with_assignee(id))
    }

    pub fn users(&self) -> Result<Vec<User>> {
        Ok(self.store.list_users()?)
    }

    pub fn user(&self, id: &str) -> Result<Option<User>> {
        optional(self.store.get_user(id))
    }

    // -- Issue mutations -----------------------------------------------------

    pub fn create_issue(&self, input: &NewIssue) -> Result<Issue> {
        validation::validate_new_issue(input).inspect_err(|e| warn!(%e, "rejected issue create"))?;
        if let Some(project_id) = input.project_id {
            self.require_project_ref(project_id)?;
        }
        let issue = self.store.create_issue(input)?;
        info!(id = issue.id, "issue created");
        Ok(issue)
    }

    /// Partial update. Only fields present in `changes` are written; an empty
    /// change set returns the issue untouched.
    pub fn update_issue(&self, id: i64, changes: &IssueChanges) -> Result<Issue> {
        validation::validate_issue_changes(changes)
            .inspect_err(|e| warn!(id, %e, "rejected issue update"))?;
        let current = self.require_issue(id)?;
        if let Some(user_id) = changes.new_assignee() {
            self.require_assignee(user_id)?;
        }
        if let Some(project_id) = changes.new_project() {
            self.require_project_ref(project_id)?;
        }
        if changes.is_empty() {
            return Ok(current);
        }
        let issue = self.store.update_issue(id, changes)?;
        info!(id, "issue updated");
        Ok(issue)
    }

    /// Sets or clears the assignee. `None` unassigns.
    pub fn update_issue_assignee(
        &self,
        id: i64,
        assigned_to_user_id: Option<String>,
    ) -> Result<AssigneeUpdate> {
        let changes = IssueChanges {
            assigned_to_user_id: Some(assigned_to_user_id),
            ..Default::default()
        };
        let issue = self.update_issue(id, &changes)?;
        Ok(AssigneeUpdate {
            id: issue.id,
            assigned_to_user_id: issue.assigned_to_user_id,
        })
    }

    pub fn delete_issue(&self, id: i64) -> Result<Deleted> {
        self.require_issue(id)?;
        self.store.delete_issue(id)?;
        info!(id, "issue deleted");
        Ok(Deleted { id })
    }

    // -- Projects ------------------------------------------------------------

    pub fn projects(&self) -> Result<Vec<Project>> {
        Ok(self.store.list_projects()?)
    }

    pub fn project(&self, id: i64) -> Result<Option<Project>> {
        optional(self.store.get_project(id))
    }

    pub fn create_project(&self, input: &NewProject) -> Result<Project> {
        validation::validate_new_project(input)
            .inspect_err(|e| warn!(%e, "rejected project create"))?;
        self.require_unique_name(&input.name, None)?;
        let project = self.store.create_project(input)?;
        info!(id = project.id, name = %project.name, "project created");
        Ok(project)
    }

    pub fn update_project(&self, id: i64, changes: &ProjectChanges) -> Result<Project> {
        validation::validate_project_changes(changes)
            .inspect_err(|e| warn!(id, %e, "rejected project update"))?;
        let current = self.require_project(id)?;
        if let Some(ref name) = changes.name {
            self.require_unique_name(name, Some(id))?;
        }
        if changes.is_empty() {
            return Ok(current);
        }
        let project = self.store.update_project(id, changes)?;
        info!(id, "project updated");
        Ok(project)
    }

    /// Deletes a project that no issue references.
    pub fn delete_project(&self, id: i64) -> Result<Deleted> {
        let project = self.require_project(id)?;
        let referencing = self.store.count_issues_in_project(id)?;
        if referencing > 0 {
            warn!(id, referencing, "project delete blocked");
            return Err(ApiError::Conflict(format!(
                "project {:?} has {referencing} assigned issue(s)",
                project.name
            )));
        }
        self.store.delete_project(id)?;
        info!(id, "project deleted");
        Ok(Deleted { id })
    }

    // -- Sessions ------------------------------------------------------------

    /// Resolves a bearer token to its user. Unknown, expired and orphaned
    /// sessions all fail the same way.
    pub fn authenticate(&self, token: &str) -> Result<User> {
        let session = self
            .store
            .get_session(token)?
            .ok_or(ApiError::Authentication)?;
        if session.is_expired(Utc::now()) {
            debug!(user_id = %session.user_id, "expired session presented");
            return Err(ApiError::Authentication);
        }
        self.user(&session.user_id)?.ok_or(ApiError::Authentication)
    }

    // -- Existence checks ----------------------------------------------------

    fn require_issue(&self, id: i64) -> Result<Issue> {
        Ok(self.store.get_issue(id)?)
    }

    fn require_project(&self, id: i64) -> Result<Project> {
        Ok(self.store.get_project(id)?)
    }

    fn require_assignee(&self, user_id: &str) -> Result<()> {
        match self.store.get_user(user_id) {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => {
                warn!(user_id, "unknown assignee");
                Err(ApiError::InvalidAssignee(user_id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn require_project_ref(&self, project_id: i64) -> Result<()> {
        match self.store.get_project(project_id) {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => {
                warn!(project_id, "unknown project");
                Err(ApiError::InvalidProject(project_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn require_unique_name(&self, name: &str, except: Option<i64>) -> Result<()> {
        match self.store.find_project_by_name(name)? {
            Some(existing) if Some(existing.id) != except => Err(ApiError::Conflict(format!(
                "a project named {name:?} already exists"
            ))),
            _ => Ok(()),
        }
    }
}

/// Turns a not-found store error into `None`.
fn optional<T>(result: std::result::Result<T, StorageError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

//! The [`Storage`] trait -- the public API for tracker persistence.
//!
//! Consumers depend on this trait rather than on concrete implementations so
//! that alternative backends (mocks, recording doubles, etc.) can be
//! substituted.

use chrono::Duration;

use tracker_core::filter::{IssueFilter, IssueOrder, Paging};
use tracker_core::issue::{Issue, IssueChanges, IssueWithAssignee, NewIssue};
use tracker_core::project::{NewProject, Project, ProjectChanges};
use tracker_core::status_count::StatusTally;
use tracker_core::user::{IssuedSession, NewUser, Session, User};

use crate::error::Result;

/// Primary storage interface for issues, users, projects and sessions.
///
/// Lookups of a single entity fail with
/// [`StorageError::NotFound`](crate::StorageError::NotFound) when it does not
/// exist.
pub trait Storage: Send + Sync {
    // -- Issues --------------------------------------------------------------

    /// Returns one page of issues matching `filter`, in `order` (id order
    /// when `None`).
    fn list_issues(
        &self,
        filter: &IssueFilter,
        order: Option<IssueOrder>,
        paging: Paging,
    ) -> Result<Vec<Issue>>;

    /// Counts issues matching `filter`, ignoring paging.
    fn count_issues(&self, filter: &IssueFilter) -> Result<u64>;

    /// Returns the `limit` most recently created issues with their assignees.
    fn latest_issues(&self, limit: u32) -> Result<Vec<IssueWithAssignee>>;

    /// Retrieves an issue by id.
    fn get_issue(&self, id: i64) -> Result<Issue>;

    /// Retrieves an issue together with its assignee.
    fn get_issue_with_assignee(&self, id: i64) -> Result<IssueWithAssignee>;

    /// Inserts a new `OPEN` issue and returns it.
    fn create_issue(&self, issue: &NewIssue) -> Result<Issue>;

    /// Applies a partial update and returns the updated issue.
    fn update_issue(&self, id: i64, changes: &IssueChanges) -> Result<Issue>;

    /// Permanently deletes an issue.
    fn delete_issue(&self, id: i64) -> Result<()>;

    /// Counts the issues that reference a project.
    fn count_issues_in_project(&self, project_id: i64) -> Result<u64>;

    // -- Aggregates ----------------------------------------------------------

    /// Per-status and total issue counts read from one snapshot.
    fn status_tally(&self) -> Result<StatusTally>;

    // -- Users ---------------------------------------------------------------

    /// Returns all users ordered by name.
    fn list_users(&self) -> Result<Vec<User>>;

    /// Retrieves a user by id.
    fn get_user(&self, id: &str) -> Result<User>;

    /// Creates a user. Only the admin CLI calls this.
    fn create_user(&self, user: &NewUser) -> Result<User>;

    // -- Projects ------------------------------------------------------------

    /// Returns all projects ordered by name.
    fn list_projects(&self) -> Result<Vec<Project>>;

    /// Retrieves a project by id.
    fn get_project(&self, id: i64) -> Result<Project>;

    /// Looks up a project by its unique name.
    fn find_project_by_name(&self, name: &str) -> Result<Option<Project>>;

    fn create_project(&self, project: &NewProject) -> Result<Project>;

    fn update_project(&self, id: i64, changes: &ProjectChanges) -> Result<Project>;

    fn delete_project(&self, id: i64) -> Result<()>;

    // -- Sessions ------------------------------------------------------------

    /// Issues a bearer-token session for a user, valid for `ttl`.
    fn create_session(&self, user_id: &str, ttl: Duration) -> Result<IssuedSession>;

    /// Looks up a session by its plain token. Expired sessions are returned
    /// as-is; the caller decides what expiry means.
    fn get_session(&self, token: &str) -> Result<Option<Session>>;

    /// Deletes expired sessions, returning how many were removed.
    fn purge_expired_sessions(&self) -> Result<usize>;
}

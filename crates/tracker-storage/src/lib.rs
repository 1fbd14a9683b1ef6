//! Storage backend for the issue tracker.
//!
//! Provides the [`Storage`] trait and a SQLite implementation ([`SqliteStore`]).

pub mod error;
pub mod sqlite;
pub mod traits;

// Re-exports for convenience.
pub use error::StorageError;
pub use sqlite::SqliteStore;
pub use traits::Storage;

// ---------------------------------------------------------------------------
// Storage trait implementation for SqliteStore
// ---------------------------------------------------------------------------

use chrono::Duration;

use tracker_core::filter::{IssueFilter, IssueOrder, Paging};
use tracker_core::issue::{Issue, IssueChanges, IssueWithAssignee, NewIssue};
use tracker_core::project::{NewProject, Project, ProjectChanges};
use tracker_core::status_count::StatusTally;
use tracker_core::user::{IssuedSession, NewUser, Session, User};

use crate::error::Result;

impl Storage for SqliteStore {
    fn list_issues(
        &self,
        filter: &IssueFilter,
        order: Option<IssueOrder>,
        paging: Paging,
    ) -> Result<Vec<Issue>> {
        self.list_issues_impl(filter, order, paging)
    }

    fn count_issues(&self, filter: &IssueFilter) -> Result<u64> {
        self.count_issues_impl(filter)
    }

    fn latest_issues(&self, limit: u32) -> Result<Vec<IssueWithAssignee>> {
        self.latest_issues_impl(limit)
    }

    fn get_issue(&self, id: i64) -> Result<Issue> {
        self.get_issue_impl(id)
    }

    fn get_issue_with_assignee(&self, id: i64) -> Result<IssueWithAssignee> {
        self.get_issue_with_assignee_impl(id)
    }

    fn create_issue(&self, issue: &NewIssue) -> Result<Issue> {
        self.create_issue_impl(issue)
    }

    fn update_issue(&self, id: i64, changes: &IssueChanges) -> Result<Issue> {
        self.update_issue_impl(id, changes)
    }

    fn delete_issue(&self, id: i64) -> Result<()> {
        self.delete_issue_impl(id)
    }

    fn count_issues_in_project(&self, project_id: i64) -> Result<u64> {
        self.count_issues_in_project_impl(project_id)
    }

    fn status_tally(&self) -> Result<StatusTally> {
        self.status_tally_impl()
    }

    fn list_users(&self) -> Result<Vec<User>> {
        self.list_users_impl()
    }

    fn get_user(&self, id: &str) -> Result<User> {
        self.get_user_impl(id)
    }

    fn create_user(&self, user: &NewUser) -> Result<User> {
        self.create_user_impl(user)
    }

    fn list_projects(&self) -> Result<Vec<Project>> {
        self.list_projects_impl()
    }

    fn get_project(&self, id: i64) -> Result<Project> {
        self.get_project_impl(id)
    }

    fn find_project_by_name(&self, name: &str) -> Result<Option<Project>> {
        self.find_project_by_name_impl(name)
    }

    fn create_project(&self, project: &NewProject) -> Result<Project> {
        self.create_project_impl(project)
    }

    fn update_project(&self, id: i64, changes: &ProjectChanges) -> Result<Project> {
        self.update_project_impl(id, changes)
    }

    fn delete_project(&self, id: i64) -> Result<()> {
        self.delete_project_impl(id)
    }

    fn create_session(&self, user_id: &str, ttl: Duration) -> Result<IssuedSession> {
        self.create_session_impl(user_id, ttl)
    }

    fn get_session(&self, token: &str) -> Result<Option<Session>> {
        self.get_session_impl(token)
    }

    fn purge_expired_sessions(&self) -> Result<usize> {
        self.purge_expired_sessions_impl()
    }
}

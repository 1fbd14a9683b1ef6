//! Test doubles shared by the unit tests of this crate.

use std::sync::{Arc, Mutex};

use chrono::Duration;

use tracker_core::filter::{IssueFilter, IssueOrder, PageLimits, Paging};
use tracker_core::issue::{Issue, IssueBuilder, IssueChanges, IssueWithAssignee, NewIssue};
use tracker_core::project::{NewProject, Project, ProjectChanges};
use tracker_core::status_count::StatusTally;
use tracker_core::user::{IssuedSession, NewUser, Session, User};
use tracker_storage::error::Result;
use tracker_storage::{SqliteStore, Storage};

use crate::service::IssueService;

/// An in-memory [`SqliteStore`] that records every mutating call.
pub struct RecordingStore {
    inner: SqliteStore,
    writes: Mutex<Vec<&'static str>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            inner: SqliteStore::open_in_memory().unwrap(),
            writes: Mutex::new(Vec::new()),
        }
    }

    /// Names of the mutating calls made so far, in order.
    pub fn writes(&self) -> Vec<&'static str> {
        self.writes.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.writes.lock().unwrap().clear();
    }

    fn record(&self, op: &'static str) {
        self.writes.lock().unwrap().push(op);
    }
}

impl Storage for RecordingStore {
    fn list_issues(
        &self,
        filter: &IssueFilter,
        order: Option<IssueOrder>,
        paging: Paging,
    ) -> Result<Vec<Issue>> {
        self.inner.list_issues(filter, order, paging)
    }

    fn count_issues(&self, filter: &IssueFilter) -> Result<u64> {
        self.inner.count_issues(filter)
    }

    fn latest_issues(&self, limit: u32) -> Result<Vec<IssueWithAssignee>> {
        self.inner.latest_issues(limit)
    }

    fn get_issue(&self, id: i64) -> Result<Issue> {
        self.inner.get_issue(id)
    }

    fn get_issue_with_assignee(&self, id: i64) -> Result<IssueWithAssignee> {
        self.inner.get_issue_with_assignee(id)
    }

    fn create_issue(&self, issue: &NewIssue) -> Result<Issue> {
        self.record("create_issue");
        self.inner.create_issue(issue)
    }

    fn update_issue(&self, id: i64, changes: &IssueChanges) -> Result<Issue> {
        self.record("update_issue");
        self.inner.update_issue(id, changes)
    }

    fn delete_issue(&self, id: i64) -> Result<()> {
        self.record("delete_issue");
        self.inner.delete_issue(id)
    }

    fn count_issues_in_project(&self, project_id: i64) -> Result<u64> {
        self.inner.count_issues_in_project(project_id)
    }

    fn status_tally(&self) -> Result<StatusTally> {
        self.inner.status_tally()
    }

    fn list_users(&self) -> Result<Vec<User>> {
        self.inner.list_users()
    }

    fn get_user(&self, id: &str) -> Result<User> {
        self.inner.get_user(id)
    }

    fn create_user(&self, user: &NewUser) -> Result<User> {
        self.record("create_user");
        self.inner.create_user(user)
    }

    fn list_projects(&self) -> Result<Vec<Project>> {
        self.inner.list_projects()
    }

    fn get_project(&self, id: i64) -> Result<Project> {
        self.inner.get_project(id)
    }

    fn find_project_by_name(&self, name: &str) -> Result<Option<Project>> {
        self.inner.find_project_by_name(name)
    }

    fn create_project(&self, project: &NewProject) -> Result<Project> {
        self.record("create_project");
        self.inner.create_project(project)
    }

    fn update_project(&self, id: i64, changes: &ProjectChanges) -> Result<Project> {
        self.record("update_project");
        self.inner.update_project(id, changes)
    }

    fn delete_project(&self, id: i64) -> Result<()> {
        self.record("delete_project");
        self.inner.delete_project(id)
    }

    fn create_session(&self, user_id: &str, ttl: Duration) -> Result<IssuedSession> {
        self.record("create_session");
        self.inner.create_session(user_id, ttl)
    }

    fn get_session(&self, token: &str) -> Result<Option<Session>> {
        self.inner.get_session(token)
    }

    fn purge_expired_sessions(&self) -> Result<usize> {
        self.record("purge_expired_sessions");
        self.inner.purge_expired_sessions()
    }
}

/// A service over a fresh recording store.
pub fn service() -> (IssueService, Arc<RecordingStore>) {
    let store = Arc::new(RecordingStore::new());
    let service = IssueService::new(store.clone(), PageLimits::default());
    (service, store)
}

pub fn new_issue(title: &str) -> NewIssue {
    IssueBuilder::new(title).description("details").build()
}

pub fn seed_user(store: &RecordingStore, name: &str) -> User {
    store
        .create_user(&NewUser {
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            image: None,
        })
        .unwrap()
}

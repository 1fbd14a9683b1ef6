//! Issue types -- the central domain model of the tracker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::enums::{IssueType, Status};
use crate::user::User;

/// Maximum title length, in characters.
pub const MAX_TITLE_LEN: usize = 255;

/// Maximum description length, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 65_536;

/// A persisted issue.
///
/// `id`, `created_at` and `updated_at` are owned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: i64,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub issue_type: IssueType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub assigned_to_user_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<i64>,
}

/// An issue together with its eagerly loaded assignee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueWithAssignee {
    #[serde(flatten)]
    pub issue: Issue,
    pub assigned_to_user: Option<User>,
}

/// Payload for creating an issue. Status always starts as [`Status::Open`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIssue {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub issue_type: Option<IssueType>,
    #[serde(default)]
    pub project_id: Option<i64>,
}

/// Typed partial update for issues.
///
/// Only `Some` fields are applied. The nullable foreign keys use
/// `Option<Option<_>>`: outer `Some` means "change", inner `None` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<IssueType>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub assigned_to_user_id: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub project_id: Option<Option<i64>>,
}

impl IssueChanges {
    /// Returns `true` if no field would be changed.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.issue_type.is_none()
            && self.assigned_to_user_id.is_none()
            && self.project_id.is_none()
    }

    /// Returns the assignee being set, if the change sets a non-null one.
    pub fn new_assignee(&self) -> Option<&str> {
        self.assigned_to_user_id
            .as_ref()
            .and_then(|inner| inner.as_deref())
    }

    /// Returns the project being set, if the change sets a non-null one.
    pub fn new_project(&self) -> Option<i64> {
        self.project_id.flatten()
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Builder for [`NewIssue`], used by seeding code and tests.
#[derive(Debug, Clone)]
pub struct IssueBuilder {
    issue: NewIssue,
}

impl IssueBuilder {
    /// Creates a new builder with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            issue: NewIssue {
                title: title.into(),
                description: String::new(),
                issue_type: None,
                project_id: None,
            },
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.issue.description = description.into();
        self
    }

    pub fn issue_type(mut self, issue_type: IssueType) -> Self {
        self.issue.issue_type = Some(issue_type);
        self
    }

    pub fn project(mut self, project_id: i64) -> Self {
        self.issue.project_id = Some(project_id);
        self
    }

    pub fn build(self) -> NewIssue {
        self.issue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn changes_distinguish_null_from_absent() {
        let absent: IssueChanges = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert_eq!(absent.assigned_to_user_id, None);

        let cleared: IssueChanges =
            serde_json::from_str(r#"{"assignedToUserId":null}"#).unwrap();
        assert_eq!(cleared.assigned_to_user_id, Some(None));
        assert_eq!(cleared.new_assignee(), None);

        let set: IssueChanges =
            serde_json::from_str(r#"{"assignedToUserId":"u1","projectId":4}"#).unwrap();
        assert_eq!(set.new_assignee(), Some("u1"));
        assert_eq!(set.new_project(), Some(4));
    }

    #[test]
    fn empty_changes() {
        assert!(IssueChanges::default().is_empty());
        let changes = IssueChanges {
            status: Some(Status::Closed),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }

    #[test]
    fn builder_defaults() {
        let issue = IssueBuilder::new("Broken link")
            .description("404 on /about")
            .issue_type(IssueType::Bug)
            .build();
        assert_eq!(issue.title, "Broken link");
        assert_eq!(issue.issue_type, Some(IssueType::Bug));
        assert_eq!(issue.project_id, None);
    }

    #[test]
    fn new_issue_accepts_camel_case() {
        let issue: NewIssue = serde_json::from_str(
            r#"{"title":"t","description":"d","issueType":"SPIKE","projectId":2}"#,
        )
        .unwrap();
        assert_eq!(issue.issue_type, Some(IssueType::Spike));
        assert_eq!(issue.project_id, Some(2));
    }
}

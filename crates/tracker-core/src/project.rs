//! Projects group issues. A project cannot be deleted while issues reference it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::issue::double_option;

/// Maximum project name length, in characters.
pub const MAX_PROJECT_NAME_LEN: usize = 255;

/// A persisted project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "graphql", derive(async_graphql::SimpleObject))]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial update for projects; `description: Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
}

impl ProjectChanges {
    /// Returns `true` if no field would be changed.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changes_clear_description() {
        let changes: ProjectChanges = serde_json::from_str(r#"{"description":null}"#).unwrap();
        assert_eq!(changes.description, Some(None));
        assert!(!changes.is_empty());
        assert!(ProjectChanges::default().is_empty());
    }
}

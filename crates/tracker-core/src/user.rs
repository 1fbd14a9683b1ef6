//! Users and login sessions.
//!
//! Users are read-only from the issue pipeline's point of view; they are
//! created through the admin path only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user that issues can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "graphql", derive(async_graphql::SimpleObject))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Payload for creating a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// A login session, looked up by the hash of its bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Returns `true` once `now` has reached the expiry time.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// A freshly issued session. The plain token is only ever held here.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

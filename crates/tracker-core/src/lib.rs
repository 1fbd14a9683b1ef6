//! Core types for the issue tracker.
//!
//! Domain model, write validation, list-query composition and pagination
//! math. Nothing in this crate performs I/O.

pub mod enums;
pub mod filter;
pub mod idgen;
pub mod issue;
pub mod pagination;
pub mod project;
pub mod status_count;
pub mod user;
pub mod validation;

pub use enums::{IssueType, ParseEnumError, Status};
pub use filter::{
    IssueFilter, IssueOrder, ListParams, ListQuery, PageLimits, PageRequest, Paging, QueryError,
    SortField, SortOrder,
};
pub use issue::{Issue, IssueBuilder, IssueChanges, IssueWithAssignee, NewIssue};
pub use pagination::{Control, ControlKind, Pagination, QueryParams};
pub use project::{NewProject, Project, ProjectChanges};
pub use status_count::{StatusCount, StatusTally};
pub use user::{IssuedSession, NewUser, Session, User};
pub use validation::ValidationError;

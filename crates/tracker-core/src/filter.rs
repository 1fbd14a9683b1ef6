//! Filter, order and paging types for issue list queries.
//!
//! [`ListQuery::from_params`] turns the raw, all-optional request parameters
//! of the listing surface into the typed descriptor the store executes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::enums::{IssueType, Status};

/// Page size used when the request does not name one.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Upper bound applied to requested page sizes.
pub const DEFAULT_MAX_PAGE_SIZE: u64 = 100;

/// Errors raised while composing a list query from request parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("invalid status filter: {0:?}")]
    InvalidStatus(String),

    #[error("invalid issue type filter: {0:?}")]
    InvalidIssueType(String),

    #[error("invalid project id: {0:?}")]
    InvalidProjectId(String),

    #[error("cannot sort by {0:?} (expected one of: title, status, issueType, createdAt, updatedAt)")]
    InvalidSortField(String),

    #[error("invalid sort order {0:?} (expected asc or desc)")]
    InvalidSortOrder(String),
}

/// Raw listing parameters as they arrive in a query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub status: Option<String>,
    pub issue_type: Option<String>,
    pub user_id: Option<String>,
    pub project_id: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// Filter for issue queries. `None` fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFilter {
    pub status: Option<Status>,
    pub issue_type: Option<IssueType>,
    pub assigned_to_user_id: Option<String>,
    pub project_id: Option<i64>,
}

impl IssueFilter {
    /// A filter matching only the given status.
    pub fn with_status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Returns `true` if the filter matches every issue.
    pub fn is_unfiltered(&self) -> bool {
        *self == Self::default()
    }
}

/// The closed set of sortable issue fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "graphql",
    derive(async_graphql::Enum),
    graphql(name = "IssueSortField")
)]
pub enum SortField {
    Title,
    Status,
    IssueType,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    /// Returns the request spelling of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Status => "status",
            Self::IssueType => "issueType",
            Self::CreatedAt => "createdAt",
            Self::UpdatedAt => "updatedAt",
        }
    }

    /// Returns the storage column the field sorts on.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Status => "status",
            Self::IssueType => "issue_type",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(Self::Title),
            "status" => Ok(Self::Status),
            "issueType" => Ok(Self::IssueType),
            "createdAt" => Ok(Self::CreatedAt),
            "updatedAt" => Ok(Self::UpdatedAt),
            other => Err(QueryError::InvalidSortField(other.to_owned())),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "graphql",
    derive(async_graphql::Enum),
    graphql(name = "SortDirection")
)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Returns the SQL keyword.
    pub fn sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(Self::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(Self::Desc)
        } else {
            Err(QueryError::InvalidSortOrder(s.to_owned()))
        }
    }
}

/// A single-field ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueOrder {
    pub field: SortField,
    pub order: SortOrder,
}

/// Offset/limit window handed to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub skip: u64,
    pub take: u64,
}

/// Page-size defaults and bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_page_size: u64,
    pub max_page_size: u64,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

/// A 1-based page number and a page size, both at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    /// Normalises a requested page: missing or zero values take the defaults
    /// and the page size is clamped to `limits.max_page_size`.
    pub fn new(page: Option<u64>, page_size: Option<u64>, limits: PageLimits) -> Self {
        let page = page.filter(|p| *p > 0).unwrap_or(1);
        let page_size = page_size
            .filter(|s| *s > 0)
            .unwrap_or(limits.default_page_size)
            .min(limits.max_page_size)
            .max(1);
        Self { page, page_size }
    }

    /// `skip = (page - 1) * page_size`, `take = page_size`.
    pub fn paging(&self) -> Paging {
        Paging {
            skip: (self.page - 1).saturating_mul(self.page_size),
            take: self.page_size,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None, PageLimits::default())
    }
}

/// A fully composed list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub filter: IssueFilter,
    pub order: Option<IssueOrder>,
    pub page: PageRequest,
}

impl ListQuery {
    /// Builds a query from raw request parameters.
    ///
    /// Empty strings count as absent. Unparseable page numbers fall back to
    /// the defaults; unknown enum values and sort fields are rejected.
    pub fn from_params(params: &ListParams, limits: PageLimits) -> Result<Self, QueryError> {
        let status = match present(&params.status) {
            Some(s) => Some(
                s.parse::<Status>()
                    .map_err(|_| QueryError::InvalidStatus(s.to_owned()))?,
            ),
            None => None,
        };

        let issue_type = match present(&params.issue_type) {
            Some(s) => Some(
                s.parse::<IssueType>()
                    .map_err(|_| QueryError::InvalidIssueType(s.to_owned()))?,
            ),
            None => None,
        };

        let project_id = match present(&params.project_id) {
            Some(s) => Some(
                s.parse::<i64>()
                    .map_err(|_| QueryError::InvalidProjectId(s.to_owned()))?,
            ),
            None => None,
        };

        let order = match (present(&params.sort_by), present(&params.sort_order)) {
            (Some(field), Some(order)) => Some(IssueOrder {
                field: field.parse()?,
                order: order.parse()?,
            }),
            _ => None,
        };

        let page = PageRequest::new(
            parse_number(&params.page),
            parse_number(&params.page_size),
            limits,
        );

        Ok(Self {
            filter: IssueFilter {
                status,
                issue_type,
                assigned_to_user_id: present(&params.user_id).map(str::to_owned),
                project_id,
            },
            order,
            page,
        })
    }

    /// The skip/take window for this query.
    pub fn paging(&self) -> Paging {
        self.page.paging()
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn parse_number(value: &Option<String>) -> Option<u64> {
    present(value).and_then(|s| s.trim().parse().ok())
}

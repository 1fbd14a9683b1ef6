//! The error taxonomy shared by the service, the REST routes and the GraphQL
//! resolvers.

use async_graphql::ErrorExtensions;
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

use tracker_core::filter::QueryError;
use tracker_core::validation::ValidationError;
use tracker_storage::StorageError;

/// Message shown to clients for store failures. Details only go to the log.
const INTERNAL_MESSAGE: &str = "internal server error";

/// Errors returned by [`IssueService`](crate::service::IssueService).
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A write payload failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The addressed issue, project or user does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: String },

    /// A request body or query string that could not be decoded.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// An assignee id that does not resolve to a user.
    #[error("user {0} does not exist")]
    InvalidAssignee(String),

    /// A project id that does not resolve to a project.
    #[error("project {0} does not exist")]
    InvalidProject(i64),

    /// The write is blocked by existing data.
    #[error("{0}")]
    Conflict(String),

    /// No active session on a mutating request.
    #[error("authentication required")]
    Authentication,

    /// Listing parameters that could not be turned into a query.
    #[error(transparent)]
    InvalidQuery(#[from] QueryError),

    /// The store failed. Surfaces as an opaque internal error.
    #[error("storage failure: {0}")]
    Storage(StorageError),
}

/// Convenience alias for service results.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// HTTP status for the REST surface.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::MalformedRequest(_)
            | Self::InvalidAssignee(_)
            | Self::InvalidProject(_)
            | Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code, shared by REST bodies and GraphQL extensions.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::MalformedRequest(_) => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidAssignee(_) => "INVALID_ASSIGNEE",
            Self::InvalidProject(_) => "INVALID_PROJECT",
            Self::Conflict(_) => "CONFLICT",
            Self::Authentication => "UNAUTHENTICATED",
            Self::InvalidQuery(_) => "INVALID_QUERY",
            Self::Storage(_) => "INTERNAL",
        }
    }

    /// The message clients see.
    pub fn public_message(&self) -> String {
        match self {
            Self::Storage(_) => INTERNAL_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    fn log_if_internal(&self) {
        if let Self::Storage(err) = self {
            error!(error = %err, "store call failed");
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { entity, id } => Self::NotFound { entity, id },
            StorageError::Conflict(message) => Self::Conflict(message),
            other => Self::Storage(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::MalformedRequest(rejection.body_text())
    }
}

/// JSON error body of the REST surface.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_if_internal();
        let body = ErrorBody {
            error: self.public_message(),
            code: self.code(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> async_graphql::Error {
        self.log_if_internal();
        let code = self.code();
        async_graphql::Error::new(self.public_message()).extend_with(|_, e| e.set("code", code))
    }
}

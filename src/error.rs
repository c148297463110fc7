use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use std::fmt;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum CredsError {
    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("role not found: {0}")]
    RoleNotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("randomness source unavailable: {0}")]
    Generation(getrandom::Error),

    #[error("value for placeholder `{placeholder}` contains characters unsafe for SQL text")]
    UnsafeValue { placeholder: String },

    #[error("target database unavailable: {0}")]
    Connection(SqlxError),

    #[error("statement {position} failed to {stage}: {source}")]
    Execution {
        /// 1-based index into the role's statements; 0 is the catalog selection.
        position: usize,
        stage: ExecutionStage,
        source: SqlxError,
    },

    #[error("commit failed, provisioning outcome unknown: {0}")]
    Commit(SqlxError),

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Step of statement processing that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStage {
    Prepare,
    Execute,
}

impl fmt::Display for ExecutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionStage::Prepare => f.write_str("prepare"),
            ExecutionStage::Execute => f.write_str("execute"),
        }
    }
}

impl From<getrandom::Error> for CredsError {
    fn from(e: getrandom::Error) -> Self {
        CredsError::Generation(e)
    }
}

impl CredsError {
    /// Database error code of the underlying driver failure, if any.
    /// Safe to log: carries no statement text or credential values.
    pub fn db_code(&self) -> Option<String> {
        let source = match self {
            CredsError::Connection(e)
            | CredsError::Commit(e)
            | CredsError::Database(e)
            | CredsError::Execution { source: e, .. } => e,
            _ => return None,
        };
        source
            .as_database_error()
            .and_then(|db| db.code())
            .map(|c| c.into_owned())
    }
}

impl IntoResponse for CredsError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message) = match &self {
            CredsError::UnknownRole(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_ROLE", self.to_string()),
            CredsError::RoleNotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string()),
            CredsError::InvalidRequest(_) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", self.to_string())
            }
            CredsError::Connection(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "DATABASE_UNAVAILABLE",
                "Target database is unavailable.".to_string(),
            ),
            CredsError::Execution { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "EXECUTION_FAILED",
                self.to_string(),
            ),
            CredsError::Commit(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "COMMIT_FAILED",
                "Commit failed; credentials were not issued.".to_string(),
            ),
            CredsError::Generation(_)
            | CredsError::UnsafeValue { .. }
            | CredsError::Database(_)
            | CredsError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal server error occurred.".to_string(),
            ),
        };
        let body = ApiErrorBody {
            code: code.to_string(),
            message,
        };
        (status, Json(ApiErrorResponse { error: body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

//! # Error Handling for the catalog API
//!
//! Every handler returns `Result<_, ApiError>`. The error carries enough to
//! pick an HTTP status and a sanitized body:
//!
//! - `NotFound` → 404 `{"error": "movie with ID '7' not found"}`
//! - `BadRequest` → 400 `{"error": "..."}`
//! - `ValidationFailed` → 400 with a field-keyed body,
//!   `{"duration": ["Ensure this value is greater than or equal to 0."]}`
//! - `Database` → 500, details logged through `tracing` and never sent out
//!
//! ```rust,ignore
//! let movie = movie::Entity::find_by_id(id)
//!     .one(db)
//!     .await
//!     .map_err(ApiError::database)?
//!     .ok_or_else(|| ApiError::not_found("movie", Some(id.to_string())))?;
//! ```

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use std::fmt;

use crate::validation::{ValidationError, ValidationErrors};

/// API error type with automatic logging and sanitized responses
#[derive(Debug)]
pub enum ApiError {
    /// 404 Not Found - the identifier does not exist
    NotFound {
        /// Resource type (e.g. "movie")
        resource: String,
        /// Optional identifier that was looked up
        id: Option<String>,
    },

    /// 400 Bad Request - the request could not be read at all
    BadRequest {
        /// User-facing error message
        message: String,
    },

    /// 400 Bad Request - one or more fields failed validation
    ValidationFailed {
        /// Field-keyed validation errors
        errors: ValidationErrors,
    },

    /// 500 Internal Server Error - database error (details logged, not exposed)
    Database {
        /// User-facing generic message
        message: String,
        /// Internal error (logged, not sent to user)
        internal: DbErr,
    },
}

impl ApiError {
    /// Create a 404 Not Found error
    pub fn not_found(resource: impl Into<String>, id: Option<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id,
        }
    }

    /// Create a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create a 400 validation error from collected field errors
    #[must_use]
    pub fn validation_failed(errors: ValidationErrors) -> Self {
        Self::ValidationFailed { errors }
    }

    /// Create a 400 validation error for a single field
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(ValidationError::new(field, message));
        Self::ValidationFailed { errors }
    }

    /// Create a 500 Internal Server Error from a database error
    ///
    /// The database error details are logged but NOT sent to the user.
    #[must_use]
    pub fn database(err: DbErr) -> Self {
        Self::Database {
            message: "A database error occurred".to_string(),
            internal: err,
        }
    }

    /// Map a lookup failure to 404 when the row is missing, 500 otherwise
    pub fn from_lookup(err: DbErr, resource: &str, id: i32) -> Self {
        match err {
            DbErr::RecordNotFound(_) => Self::not_found(resource, Some(id.to_string())),
            other => Self::database(other),
        }
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest { .. } | Self::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            Self::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the user-facing error message (sanitized)
    fn user_message(&self) -> String {
        match self {
            Self::NotFound { resource, id } => {
                if let Some(id) = id {
                    format!("{resource} with ID '{id}' not found")
                } else {
                    format!("{resource} not found")
                }
            }
            Self::BadRequest { message } | Self::Database { message, .. } => message.clone(),
            Self::ValidationFailed { errors } => errors.to_string(),
        }
    }

    fn log_internal(&self) {
        match self {
            Self::Database { internal, .. } => {
                tracing::error!(error = ?internal, "Database error occurred");
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "API error"
                );
            }
        }
    }
}

/// Error response sent to users (sanitized)
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();

        let status = self.status_code();
        match self {
            Self::ValidationFailed { errors } => (status, Json(errors.field_map())).into_response(),
            other => (
                status,
                Json(ErrorResponse {
                    error: other.user_message(),
                }),
            )
                .into_response(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {}

/// `DbErr::RecordNotFound` → 404, everything else → 500
impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        match &err {
            DbErr::RecordNotFound(msg) => {
                let resource = msg.split_whitespace().next().unwrap_or("Resource");
                Self::NotFound {
                    resource: resource.to_string(),
                    id: None,
                }
            }
            _ => Self::database(err),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::ValidationFailed { errors }
    }
}

/// Syntax errors and a missing JSON content type; type errors are reported
/// per field once the body has been parsed
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

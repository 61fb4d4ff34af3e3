use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error body returned to HTTP callers.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Unprocessable Entity")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// Additional error details (e.g., the offending field)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// ISO 8601 timestamp when the error occurred
    pub timestamp: String,
}

/// Error taxonomy of the indent pipeline.
///
/// Validation and resolution errors are raised before any transaction opens;
/// errors raised inside the reconciliation transaction roll it back wholesale
/// and surface here with their original message.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A mandatory input was absent. Fails fast, before any write.
    #[error("Missing mandatory field: {0}")]
    MissingField(String),

    /// A human-entered organizational code did not resolve.
    #[error("Invalid {field} reference: {code}")]
    InvalidReference { field: String, code: String },

    /// The dealer's configured org mapping does not include a resolved unit.
    #[error("Dealer is not mapped to the submitted {0}")]
    UnmappedBusinessRelation(String),

    /// No active, display-eligible product matched the material code.
    #[error("Product not found for material code {0}")]
    ProductNotFound(String),

    /// Stored order state conflicts with the requested operation.
    #[error("Reconciliation conflict: {0}")]
    ReconciliationConflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::MissingField(_) | ServiceError::ValidationError(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ServiceError::InvalidReference { .. }
            | ServiceError::UnmappedBusinessRelation(_)
            | ServiceError::ProductNotFound(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::ReconciliationConflict(_) => StatusCode::CONFLICT,
            ServiceError::ExternalServiceError(_) => StatusCode::BAD_GATEWAY,
            ServiceError::DatabaseError(_) | ServiceError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            ServiceError::MissingField(field) => Some(format!("field: {field}")),
            ServiceError::InvalidReference { field, .. } => Some(format!("field: {field}")),
            ServiceError::UnmappedBusinessRelation(field) => Some(format!("field: {field}")),
            _ => None,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }

        let body = ErrorResponse {
            error: status
                .canonical_reason()
                .unwrap_or("Unknown Error")
                .to_string(),
            message: self.to_string(),
            details: self.details(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(errors.to_string())
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Standard error payload returned by every endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Bad Request")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// ISO 8601 timestamp when the error occurred
    pub timestamp: String,
}

/// Errors surfaced by the order core services.
///
/// Tenant-mismatch is deliberately indistinguishable from not-found at the
/// HTTP boundary so a caller can never probe for another tenant's data.
#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Order {order_id} does not belong to tenant {tenant_id}")]
    TenantMismatch { order_id: Uuid, tenant_id: Uuid },

    #[error("Tenant {0} is inactive")]
    InactiveTenant(Uuid),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::DatabaseError(_) | ServiceError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            // Cross-tenant probes must look identical to a missing record.
            ServiceError::NotFound(_) | ServiceError::TenantMismatch { .. } => {
                StatusCode::NOT_FOUND
            }
            ServiceError::InactiveTenant(_) => StatusCode::FORBIDDEN,
            ServiceError::InvalidState(_) => StatusCode::CONFLICT,
            ServiceError::InvalidInput(_) | ServiceError::ValidationError(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }

    pub fn response_message(&self) -> String {
        match self {
            // Never leak db internals or the other tenant's id to the client.
            ServiceError::DatabaseError(_) | ServiceError::InternalError(_) => {
                "Internal server error".to_string()
            }
            ServiceError::TenantMismatch { order_id, .. } => {
                format!("Order {} not found", order_id)
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        (status, Json(err)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_mismatch_maps_to_not_found() {
        let err = ServiceError::TenantMismatch {
            order_id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
        };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn tenant_mismatch_message_hides_tenant() {
        let tenant_id = Uuid::new_v4();
        let err = ServiceError::TenantMismatch {
            order_id: Uuid::new_v4(),
            tenant_id,
        };
        assert!(!err.response_message().contains(&tenant_id.to_string()));
    }

    #[test]
    fn invalid_state_is_conflict() {
        let err = ServiceError::InvalidState("cannot confirm a completed order".into());
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }
}

/// Error types for blog-service
///
/// Every failure is terminal for the request and maps to a status code or a
/// redirect; nothing is retried.
use actix_web::{
    error::ResponseError,
    http::{header, StatusCode},
    HttpResponse,
};
use thiserror::Error;
use validator::ValidationErrors;

/// Result type for blog-service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    /// Unknown post id, group slug or username
    #[error("Not found: {0}")]
    NotFound(String),

    /// Anonymous viewer on a route that needs a user; carries the login redirect
    #[error("Authentication required")]
    Unauthenticated { location: String },

    /// Rejected form submission; nothing was written
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    /// Repository failure; carries the store's context chain
    #[error("Database error: {0:#}")]
    Database(#[from] anyhow::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] page_cache::CacheError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::NotFound(what.into())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthenticated { .. } => StatusCode::FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_)
            | AppError::Cache(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        match self {
            AppError::Unauthenticated { location } => HttpResponse::Found()
                .insert_header((header::LOCATION, location.as_str()))
                .finish(),
            AppError::Validation(errors) => HttpResponse::build(status).json(serde_json::json!({
                "error": "Validation failed",
                "status": status.as_u16(),
                "form": { "errors": errors },
            })),
            AppError::Database(_) | AppError::Cache(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "request failed");
                HttpResponse::build(status).json(serde_json::json!({
                    "error": "Internal server error",
                    "status": status.as_u16(),
                }))
            }
            AppError::NotFound(_) => HttpResponse::build(status).json(serde_json::json!({
                "error": self.to_string(),
                "status": status.as_u16(),
            })),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::ValidationError;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::not_found("post 7").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Unauthenticated {
                location: "/login/?next=/create/".into()
            }
            .status_code(),
            StatusCode::FOUND
        );
        assert_eq!(
            AppError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unauthenticated_sets_location() {
        let resp = AppError::Unauthenticated {
            location: "/login/?next=/follow/".into(),
        }
        .error_response();

        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/login/?next=/follow/"
        );
    }

    #[test]
    fn test_validation_is_bad_request() {
        let mut errors = ValidationErrors::new();
        errors.add("text", ValidationError::new("required"));
        let resp = AppError::from(errors).error_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

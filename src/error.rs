//! Handler-level errors and their HTTP mapping.
//!
//! | Error | Status |
//! |---|---|
//! | `Validation` | 422 |
//! | `Store(NotFound)` | 422 |
//! | `Store(_)` | 500 |
//! | `Import(_)` | see [`ImportError::status`] |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::import::ImportError;
use crate::store::StoreError;

/// Errors returned by route handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing body, missing or invalid keys, missing id.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Import(#[from] ImportError),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Store(e) if e.is_not_found() => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Import(e) => e.status(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Store(e) if !e.is_not_found() => {
                tracing::error!(error = %e, "Store operation failed");
                "Failed to persist changes".to_string()
            }
            other => other.to_string(),
        };
        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::validation("Missing id").status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );

        let not_found = ApiError::from(StoreError::NotFound { id: "x".into() });
        assert_eq!(not_found.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(not_found.to_string(), "No data was found for passed id");

        let persist = ApiError::from(StoreError::Persist {
            path: PathBuf::from("db.json"),
            source: std::io::Error::other("disk full"),
        });
        assert_eq!(persist.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let media = ApiError::from(ImportError::UnsupportedMediaType { found: None });
        assert_eq!(media.status(), StatusCode::BAD_REQUEST);
    }
}

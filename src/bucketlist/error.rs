//! Error taxonomy for the HTTP surface. Each variant maps to exactly one
//! status code so callers can tell a rejected request from a transient
//! storage failure.

use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// A signup predicate failed. No detail beyond the status is disclosed.
    #[error("Invalid signup")]
    ValidationRejected,

    /// Missing field, unknown credentials, or a failed one-time code. One
    /// uniform answer for all of them, so a caller cannot probe which step
    /// failed.
    #[error("Unauthorized")]
    Unauthorized,

    /// The store rejected a duplicate unique key after validation passed
    /// (concurrent signup race).
    #[error("Already exists")]
    Conflict,

    /// The store connection was lost mid-operation. The reconnect loop
    /// recovers the transport; this request should be retried by the client.
    #[error("Temporary storage failure, try again")]
    StoreTransient,

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable => Self::StoreTransient,
            StoreError::Duplicate => Self::Conflict,
            StoreError::Query(e) => {
                error!("Database error: {e}");

                Self::Internal(e.into())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::ValidationRejected => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Conflict => StatusCode::CONFLICT,
            Self::StoreTransient | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if let Self::Internal(e) = &self {
            error!("Internal error: {e:?}");
        }

        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_distinct_variants() {
        assert!(matches!(
            ApiError::from(StoreError::Unavailable),
            ApiError::StoreTransient
        ));
        assert!(matches!(
            ApiError::from(StoreError::Duplicate),
            ApiError::Conflict
        ));
        assert!(matches!(
            ApiError::from(StoreError::Query(sqlx::Error::RowNotFound)),
            ApiError::Internal(_)
        ));
    }

    #[test]
    fn transient_failure_is_not_a_rejection() {
        let transient = ApiError::StoreTransient.to_string();
        assert_ne!(transient, ApiError::ValidationRejected.to_string());
        assert_ne!(transient, ApiError::Unauthorized.to_string());
    }
}

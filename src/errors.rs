use axum::{http::StatusCode, response::IntoResponse, Json};

use crate::{ErrorWrapper, JsonResponse};

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// Bad path id, body or query string.
    #[error("{0}")]
    Validation(String),
    /// A single-row write touched some other number of rows.
    #[error("{0}")]
    Persistence(String),
    #[error("URL {0} provided was not found")]
    RouteNotFound(String),
    /// A handler panicked; the payload is only logged.
    #[error("Internal Server Error")]
    Panicked(String),
    #[error(transparent)]
    DatabaseError(#[from] sqlx::Error),
}

impl IntoResponse for RequestError {
    fn into_response(self) -> axum::response::Response {
        self.to_json_response().into_response()
    }
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::Validation(_) => StatusCode::BAD_REQUEST,
            RequestError::Persistence(_) => StatusCode::NOT_FOUND,
            RequestError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            RequestError::Panicked(_) => StatusCode::INTERNAL_SERVER_ERROR,
            // Constraint violations are the caller's fault, anything else is ours.
            RequestError::DatabaseError(sqlx::Error::Database(_)) => StatusCode::BAD_REQUEST,
            RequestError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_json_response(&self) -> JsonResponse<ErrorWrapper> {
        let status = self.status_code();
        if let RequestError::Panicked(detail) = self {
            tracing::error!("Service panicked: {}", detail);
        } else if status.is_server_error() {
            tracing::error!("Database error: {}", self);
        } else {
            tracing::debug!("Request failed with {}: {}", status, self);
        }
        (status, Json(ErrorWrapper::new(status, self.to_string())))
    }
}

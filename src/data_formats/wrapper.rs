use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::JsonResponse;

/// Envelope around every successful payload.
#[derive(Debug, Deserialize, Serialize)]
pub struct SuccessWrapper<T> {
    pub status_code: u16,
    pub data: T,
}

/// Envelope around every error, whichever layer raised it.
#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorWrapper {
    pub status_code: u16,
    pub error: String,
}

impl<T> SuccessWrapper<T> {
    pub fn wrap_with_status(status: StatusCode, data: T) -> JsonResponse<SuccessWrapper<T>> {
        (
            status,
            Json(SuccessWrapper {
                status_code: status.as_u16(),
                data,
            }),
        )
    }

    pub fn ok(data: T) -> JsonResponse<SuccessWrapper<T>> {
        Self::wrap_with_status(StatusCode::OK, data)
    }
}

impl ErrorWrapper {
    pub fn new(status: StatusCode, error: impl Into<String>) -> ErrorWrapper {
        ErrorWrapper {
            status_code: status.as_u16(),
            error: error.into(),
        }
    }
}

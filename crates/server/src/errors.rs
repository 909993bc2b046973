use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ErrorMessage;
use service::ServiceError;
use thiserror::Error;
use tracing::error;

/// Error response carrying a status code and an `{"errorMessage": ...}` body.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub body: ErrorMessage,
}

impl JsonApiError {
    pub fn new(status: StatusCode, body: ErrorMessage) -> Self {
        Self { status, body }
    }

    pub fn bad_request(body: ErrorMessage) -> Self {
        Self::new(StatusCode::BAD_REQUEST, body)
    }

    pub fn not_found(body: ErrorMessage) -> Self {
        Self::new(StatusCode::NOT_FOUND, body)
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::InvalidArgument(msg) => Self::bad_request(ErrorMessage::new(msg)),
            ServiceError::Validation(_) => Self::bad_request(ErrorMessage::new(e.to_string())),
            ServiceError::Storage(_) => {
                error!(error = %e, "storage failure");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, ErrorMessage::new(e.to_string()))
            }
        }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_maps_to_400_with_message() {
        let e = JsonApiError::from(ServiceError::invalid_argument("Invalid gender"));
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
        assert_eq!(e.body, ErrorMessage::new("Invalid gender"));
    }

    #[test]
    fn storage_failure_maps_to_500() {
        let e = JsonApiError::from(ServiceError::Storage("down".into()));
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(e.body.error_message.contains("down"));
    }
}

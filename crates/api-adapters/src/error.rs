//! Maps [`DomainError`] onto HTTP status codes and the error envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::DomainError;
use tracing::error;

use crate::response::Envelope;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(DomainError::Validation(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
            DomainError::NotFound(..) => StatusCode::NOT_FOUND,
            DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// What the client sees. Internal details never leave the process.
    pub fn public_message(&self) -> String {
        match &self.0 {
            DomainError::Validation(msg) | DomainError::Conflict(msg) => msg.clone(),
            DomainError::Unauthenticated(_) => "Unauthorized".into(),
            DomainError::Forbidden(msg) => format!("Forbidden: {msg}"),
            DomainError::NotFound(what, _) => format!("{what} not found"),
            DomainError::Internal(_) => "Internal server error".into(),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let DomainError::Internal(detail) = &self.0 {
            error!(error = %detail, "request failed");
        }
        let status = self.status();
        (status, Json(Envelope::error(self.public_message()))).into_response()
    }
}

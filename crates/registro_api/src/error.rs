//! HTTP error mapping.
//!
//! # Invariants
//! - Every failure is rendered as a `success: false` envelope with a message.
//! - Internal failure details go to the log, never to the response body.

use crate::envelope::Envelope;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use registro_core::{RegistroServiceError, RegistroValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const MSG_NOT_FOUND: &str = "Registro no encontrado";
pub const MSG_MISSING_FIELDS: &str = "Todos los campos son requeridos (nombre, email, telefono)";
pub const MSG_INVALID_EMAIL: &str = "Email inválido";
pub const MSG_ROUTE_NOT_FOUND: &str = "Ruta no encontrada";
pub const MSG_INTERNAL: &str = "Error interno del servidor";

/// Error surfaced by request handlers.
#[derive(Debug)]
pub enum ApiError {
    /// No route matches method + path.
    RouteNotFound,
    /// Use-case level failure from the registro service.
    Service(RegistroServiceError),
    /// Request could not be processed; details stay in the log.
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::Service(RegistroServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Service(RegistroServiceError::Validation(_)) => StatusCode::BAD_REQUEST,
            Self::Service(RegistroServiceError::Internal(_)) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Caller-facing message.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::RouteNotFound => MSG_ROUTE_NOT_FOUND,
            Self::Service(RegistroServiceError::NotFound(_)) => MSG_NOT_FOUND,
            Self::Service(RegistroServiceError::Validation(
                RegistroValidationError::MissingFields,
            )) => MSG_MISSING_FIELDS,
            Self::Service(RegistroServiceError::Validation(
                RegistroValidationError::InvalidEmail,
            )) => MSG_INVALID_EMAIL,
            Self::Service(RegistroServiceError::Internal(_)) | Self::Internal(_) => MSG_INTERNAL,
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RouteNotFound => write!(f, "route not found"),
            Self::Service(err) => write!(f, "{err}"),
            Self::Internal(details) => write!(f, "{details}"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::RouteNotFound | Self::Internal(_) => None,
            Self::Service(err) => Some(err),
        }
    }
}

impl From<RegistroServiceError> for ApiError {
    fn from(value: RegistroServiceError) -> Self {
        Self::Service(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("event=http_error module=api status=error error={self}");
        }
        (status, Json(Envelope::failure(self.public_message()))).into_response()
    }
}

/// Response for panics caught at the router boundary.
pub fn internal_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(Envelope::failure(MSG_INTERNAL)),
    )
        .into_response()
}

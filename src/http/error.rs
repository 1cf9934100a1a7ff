use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::session::SessionError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("{0}")]
    Session(#[from] SessionError),

    #[error("No recording is held")]
    NoRecording,

    #[error("Internal error: {0:#}")]
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(session_err) = err.downcast_ref::<SessionError>() {
            return AppError::Session(session_err.clone());
        }
        if err.downcast_ref::<hound::Error>().is_some() {
            return AppError::MalformedPayload(format!("{:#}", err));
        }
        AppError::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            AppError::Session(_) => StatusCode::CONFLICT,
            AppError::NoRecording => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("{}", self);
        }

        (status, self.to_string()).into_response()
    }
}

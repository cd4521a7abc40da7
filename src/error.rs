//! Error types for the license manager

use axum::{
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
  #[error("Invalid credentials")]
  InvalidCredentials,
  #[error("Your license is not active, please contact the administrator")]
  LicenseInactive,
  #[error("Your license has expired, please contact the administrator")]
  LicenseExpired,
}

#[derive(Debug, Error)]
pub enum Conflict {
  #[error("Email is already registered")]
  EmailTaken,
  #[error("A device is already registered for this account")]
  DeviceRegistered,
  #[error("This license is already in use on another device")]
  LicenseClaimed,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("Database error: {0}")]
  Database(#[from] sea_orm::DbErr),

  #[error("Authentication required")]
  Unauthenticated,

  #[error("Device is not authorized for this account")]
  DeviceMismatch,

  #[error("{0} not found")]
  NotFound(&'static str),

  #[error(transparent)]
  Auth(#[from] AuthError),

  #[error(transparent)]
  Conflict(#[from] Conflict),

  #[error("{0}")]
  Validation(String),

  #[error("License has expired")]
  Expired,

  #[error("Token error: {0}")]
  Token(#[from] jsonwebtoken::errors::Error),

  #[error("Internal error: {0}")]
  Internal(String),
}

impl Error {
  pub fn validation(message: impl Into<String>) -> Self {
    Self::Validation(message.into())
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Error::Unauthenticated => StatusCode::UNAUTHORIZED,
      Error::Auth(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
      Error::Auth(_) => StatusCode::FORBIDDEN,
      Error::DeviceMismatch | Error::Expired => StatusCode::FORBIDDEN,
      Error::Conflict(Conflict::EmailTaken) => StatusCode::CONFLICT,
      Error::Conflict(_) => StatusCode::FORBIDDEN,
      Error::NotFound(_) => StatusCode::NOT_FOUND,
      Error::Validation(_) => StatusCode::BAD_REQUEST,
      Error::Database(_) | Error::Token(_) | Error::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }
}

impl From<JsonRejection> for Error {
  fn from(rejection: JsonRejection) -> Self {
    Self::Validation(rejection.body_text())
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = self.status();

    let message = if status.is_server_error() {
      tracing::error!("Request failed: {self}");
      String::from("Internal server error")
    } else {
      self.to_string()
    };

    let body = json::json!({
      "success": false,
      "error": message
    });

    (status, axum::Json(body)).into_response()
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

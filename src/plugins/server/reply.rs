use axum::Json;
use serde::Serialize;

/// Success envelope; failures go through `Error::into_response`.
#[derive(Debug, Serialize)]
pub struct Reply<T> {
  pub success: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data: Option<T>,
}

impl<T: Serialize> Reply<T> {
  pub fn data(data: T) -> Json<Self> {
    Json(Self { success: true, message: None, data: Some(data) })
  }

  pub fn with(message: impl Into<String>, data: T) -> Json<Self> {
    Json(Self { success: true, message: Some(message.into()), data: Some(data) })
  }
}

impl Reply<()> {
  pub fn message(message: impl Into<String>) -> Json<Self> {
    Json(Self { success: true, message: Some(message.into()), data: None })
  }
}

//! Request extractors for session tokens and JSON bodies.

use axum::{
  extract::{FromRequest, FromRequestParts},
  http::{HeaderMap, header, request::Parts},
};

use crate::{
  entity::{admin, user},
  prelude::*,
  state::AppState,
  sv::Principal,
};

pub const COOKIE: &str = "auth_token";

/// JSON body whose rejections use the crate error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct Payload<T>(pub T);

/// `Authorization: Bearer` first, then the web session cookie.
pub fn token(headers: &HeaderMap) -> Option<String> {
  let bearer = headers
    .get(header::AUTHORIZATION)
    .and_then(|value| value.to_str().ok())
    .and_then(|value| value.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|token| !token.is_empty());

  if let Some(token) = bearer {
    return Some(token.to_string());
  }

  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|value| value.to_str().ok())
    .flat_map(|cookies| cookies.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(name, value)| *name == COOKIE && !value.is_empty())
    .map(|(_, value)| value.to_string())
}

/// Any live account.
pub struct Session(pub Principal);

impl FromRequestParts<Arc<AppState>> for Session {
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    app: &Arc<AppState>,
  ) -> Result<Self> {
    let token = token(&parts.headers).ok_or(Error::Unauthenticated)?;
    let principal =
      app.sv().auth.authorize(&token).await.ok_or(Error::Unauthenticated)?;
    Ok(Session(principal))
  }
}

/// Admin-only routes. A user token counts as no token.
pub struct AdminSession(pub admin::Model);

impl FromRequestParts<Arc<AppState>> for AdminSession {
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    app: &Arc<AppState>,
  ) -> Result<Self> {
    match Session::from_request_parts(parts, app).await? {
      Session(Principal::Admin(admin)) => Ok(AdminSession(admin)),
      Session(Principal::User(_)) => Err(Error::Unauthenticated),
    }
  }
}

/// Mobile routes, scoped to the calling user.
pub struct UserSession(pub user::Model);

impl FromRequestParts<Arc<AppState>> for UserSession {
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    app: &Arc<AppState>,
  ) -> Result<Self> {
    match Session::from_request_parts(parts, app).await? {
      Session(Principal::User(user)) => Ok(UserSession(user)),
      Session(Principal::Admin(_)) => Err(Error::Unauthenticated),
    }
  }
}

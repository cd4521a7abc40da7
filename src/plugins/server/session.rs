//! Web session endpoints for the admin console.

use axum::{
  extract::State,
  http::{HeaderMap, header},
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use super::{
  extract::{COOKIE, Payload, Session, token},
  reply::Reply,
};
use crate::{prelude::*, state::AppState, sv::Profile, token::Lifetime};

#[derive(Debug, Deserialize)]
pub struct Credentials {
  pub email: String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
  pub token: String,
  pub user: Profile,
}

fn cookie(value: &str, max_age: i64) -> String {
  format!("{COOKIE}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}")
}

pub async fn login(
  State(app): State<Arc<AppState>>,
  Payload(req): Payload<Credentials>,
) -> Result<impl IntoResponse> {
  let login = app.sv().auth.login(&req.email, &req.password).await?;
  info!("{:?} #{} signed in", login.principal.role(), login.principal.id());

  let max_age = Lifetime::Web.duration().num_seconds();
  let set_cookie = cookie(&login.token, max_age);
  let view = SessionView { user: login.principal.profile(), token: login.token };

  Ok(([(header::SET_COOKIE, set_cookie)], Reply::with("Login successful", view)))
}

pub async fn logout(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
) -> impl IntoResponse {
  if let Some(token) = token(&headers)
    && let Some(principal) = app.sv().auth.authorize(&token).await
  {
    app.sv().auth.logout(&principal).await;
  }

  ([(header::SET_COOKIE, cookie("", 0))], Reply::message("Logged out"))
}

pub async fn me(Session(principal): Session) -> impl IntoResponse {
  Reply::data(principal.profile())
}

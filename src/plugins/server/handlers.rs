//! Mobile client API, mounted under `/api`.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use super::{
  extract::{Payload, UserSession},
  reply::Reply,
  session::Credentials,
};
use crate::{
  entity::{LicenseKind, screenshot, trip, trip_group},
  prelude::*,
  state::AppState,
  sv::{
    CompanyProfile, Filter, Login, NewUser, Principal, Profile, Recipient,
    TripMetrics, license::ACTIVATION_DAYS, license::Validated,
    notification::Inbox, trip::HISTORY_LIMIT,
  },
};

pub async fn health() -> impl IntoResponse {
  Json(json::json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

#[derive(Debug, Serialize)]
pub struct MobileUser {
  #[serde(flatten)]
  pub profile: Profile,
  pub device_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MobileSession {
  pub token: String,
  pub device_registered: bool,
  #[serde(rename = "usuario")]
  pub user: MobileUser,
}

impl From<Login> for MobileSession {
  fn from(login: Login) -> Self {
    let device_id = match &login.principal {
      Principal::User(user) if user.has_device() => user.device_id.clone(),
      _ => None,
    };

    Self {
      token: login.token,
      device_registered: device_id.is_some(),
      user: MobileUser { profile: login.principal.profile(), device_id },
    }
  }
}

pub async fn login(
  State(app): State<Arc<AppState>>,
  Payload(req): Payload<Credentials>,
) -> Result<impl IntoResponse> {
  let login = app.sv().auth.mobile_login(&req.email, &req.password).await?;
  Ok(Reply::with("Login successful", MobileSession::from(login)))
}

#[derive(Debug, Deserialize)]
pub struct Registration {
  #[serde(alias = "nombre_completo")]
  pub name: String,
  pub email: String,
  #[serde(default, alias = "telefono")]
  pub phone: Option<String>,
  pub password: String,
  #[serde(default)]
  pub device_id: Option<String>,
}

pub async fn register(
  State(app): State<Arc<AppState>>,
  Payload(req): Payload<Registration>,
) -> Result<impl IntoResponse> {
  let new = NewUser {
    name: req.name,
    email: req.email,
    phone: req.phone,
    password: req.password,
  };
  let login = app.sv().auth.register(new, req.device_id.as_deref()).await?;

  Ok((
    StatusCode::CREATED,
    Reply::with("Registration successful", MobileSession::from(login)),
  ))
}

#[derive(Debug, Deserialize)]
pub struct DeviceReq {
  #[serde(default)]
  pub device_id: String,
}

#[derive(Debug, Serialize)]
pub struct DeviceView {
  pub device_id: String,
}

pub async fn register_device(
  State(app): State<Arc<AppState>>,
  UserSession(user): UserSession,
  Payload(req): Payload<DeviceReq>,
) -> Result<impl IntoResponse> {
  let device_id = app.sv().device.register(user.id, &req.device_id).await?;
  Ok(Reply::with("Device registered", DeviceView { device_id }))
}

#[derive(Debug, Deserialize)]
pub struct ActivateReq {
  #[serde(default, alias = "codigo_licencia")]
  pub code: String,
  #[serde(default)]
  pub device_id: String,
}

#[derive(Debug, Serialize)]
pub struct Activation {
  pub id: i32,
  pub code: String,
  pub kind: LicenseKind,
  pub starts_on: Date,
  pub expires_on: Date,
  pub active: bool,
  pub days_remaining: i64,
}

pub async fn activate_license(
  State(app): State<Arc<AppState>>,
  UserSession(user): UserSession,
  Payload(req): Payload<ActivateReq>,
) -> Result<impl IntoResponse> {
  let license =
    app.sv().license.activate(user.id, &req.code, &req.device_id).await?;

  let view = Activation {
    id: license.id,
    code: license.code,
    kind: license.kind,
    starts_on: license.starts_on,
    expires_on: license.expires_on,
    active: license.active,
    days_remaining: ACTIVATION_DAYS,
  };
  Ok(Reply::with("License activated", view))
}

pub async fn validate_license(
  State(app): State<Arc<AppState>>,
  UserSession(user): UserSession,
  Payload(req): Payload<DeviceReq>,
) -> Result<Json<Reply<Validated>>> {
  let validated = app.sv().license.validate(user.id, &req.device_id).await?;
  Ok(Reply::data(validated))
}

pub async fn save_trip(
  State(app): State<Arc<AppState>>,
  UserSession(user): UserSession,
  Payload(metrics): Payload<TripMetrics>,
) -> Result<Json<Reply<trip::Model>>> {
  let trip = app.sv().trip.save(user.id, metrics).await?;
  Ok(Reply::with("Trip saved", trip))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
  pub limit: Option<u64>,
}

pub async fn trip_history(
  State(app): State<Arc<AppState>>,
  UserSession(user): UserSession,
  Query(query): Query<HistoryQuery>,
) -> Result<Json<Reply<Vec<trip::Model>>>> {
  let limit = query.limit.unwrap_or(HISTORY_LIMIT);
  Ok(Reply::data(app.sv().trip.history(user.id, limit).await?))
}

#[derive(Debug, Deserialize)]
pub struct TripRef {
  #[serde(alias = "id_viaje")]
  pub trip_id: i32,
}

pub async fn delete_trip(
  State(app): State<Arc<AppState>>,
  UserSession(user): UserSession,
  Payload(req): Payload<TripRef>,
) -> Result<impl IntoResponse> {
  app.sv().trip.delete(user.id, req.trip_id).await?;
  Ok(Reply::message("Trip deleted"))
}

pub async fn save_group_analysis(
  State(app): State<Arc<AppState>>,
  UserSession(user): UserSession,
  Payload(metrics): Payload<TripMetrics>,
) -> Result<impl IntoResponse> {
  let analysis = app.sv().trip.save_group_analysis(user.id, metrics).await?;
  Ok(Reply::with("Analysis saved", analysis))
}

#[derive(Debug, Serialize)]
pub struct SavedAnalysis {
  pub trip_id: i32,
}

pub async fn save_full_analysis(
  State(app): State<Arc<AppState>>,
  UserSession(user): UserSession,
  Payload(body): Payload<json::Value>,
) -> Result<impl IntoResponse> {
  let (metrics, highlights) = TripMetrics::split(body)?;
  let trip =
    app.sv().trip.save_full_analysis(user.id, metrics, highlights).await?;
  Ok(Reply::with("Analysis saved", SavedAnalysis { trip_id: trip.id }))
}

pub async fn list_groups(
  State(app): State<Arc<AppState>>,
  UserSession(user): UserSession,
) -> Result<Json<Reply<Vec<trip_group::Model>>>> {
  Ok(Reply::data(app.sv().trip.groups(user.id).await?))
}

#[derive(Debug, Deserialize)]
pub struct GroupReq {
  #[serde(default, alias = "nombre_grupo")]
  pub name: String,
}

pub async fn create_group(
  State(app): State<Arc<AppState>>,
  UserSession(user): UserSession,
  Payload(req): Payload<GroupReq>,
) -> Result<impl IntoResponse> {
  let group = app.sv().trip.create_group(user.id, &req.name).await?;
  Ok((StatusCode::CREATED, Reply::with("Group created", group)))
}

#[derive(Debug, Deserialize)]
pub struct GroupRef {
  #[serde(alias = "id_grupo")]
  pub group_id: i32,
}

pub async fn delete_group(
  State(app): State<Arc<AppState>>,
  UserSession(user): UserSession,
  Payload(req): Payload<GroupRef>,
) -> Result<impl IntoResponse> {
  app.sv().trip.delete_group(user.id, req.group_id).await?;
  Ok(Reply::message("Group deleted"))
}

#[derive(Debug, Deserialize)]
pub struct ScreenshotQuery {
  #[serde(default, alias = "id_grupo")]
  pub group_id: Option<i32>,
}

pub async fn list_screenshots(
  State(app): State<Arc<AppState>>,
  UserSession(user): UserSession,
  Query(query): Query<ScreenshotQuery>,
) -> Result<Json<Reply<Vec<screenshot::Model>>>> {
  let group_id =
    query.group_id.ok_or_else(|| Error::validation("Group ID is required"))?;
  Ok(Reply::data(app.sv().trip.screenshots(user.id, group_id).await?))
}

pub async fn company(
  State(app): State<Arc<AppState>>,
) -> Result<Json<Reply<CompanyProfile>>> {
  let company =
    app.sv().settings.company().await?.ok_or(Error::NotFound("Company"))?;
  Ok(Reply::data(company.into()))
}

#[derive(Debug, Default, Deserialize)]
pub struct InboxQuery {
  #[serde(default)]
  pub filter: Filter,
}

pub async fn notifications(
  State(app): State<Arc<AppState>>,
  UserSession(user): UserSession,
  Query(query): Query<InboxQuery>,
) -> Result<Json<Reply<Inbox>>> {
  let inbox =
    app.sv().notification.list(Recipient::user(user.id), query.filter).await?;
  Ok(Reply::data(inbox))
}

pub async fn read_notification(
  State(app): State<Arc<AppState>>,
  UserSession(user): UserSession,
  Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
  app.sv().notification.mark_read(Recipient::user(user.id), id).await?;
  Ok(Reply::message("Notification marked as read"))
}

pub async fn delete_notification(
  State(app): State<Arc<AppState>>,
  UserSession(user): UserSession,
  Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
  app.sv().notification.delete(Recipient::user(user.id), id).await?;
  Ok(Reply::message("Notification deleted"))
}

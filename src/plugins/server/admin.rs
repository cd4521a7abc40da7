//! Administrative API, mounted under `/admin`. Every handler requires an
//! admin session.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use super::{
  extract::{AdminSession, Payload},
  handlers::InboxQuery,
  reply::Reply,
};
use crate::{
  entity::{LicenseKind, Severity, history, license},
  prelude::*,
  state::AppState,
  sv::{
    CompanyProfile, LicenseFilter, NewUser, Recipient, UserEdit, UserFilter,
    license::{LicenseDetails, LicenseRow},
    notification::{Generated, Inbox, Summary},
    settings::Durations,
    user::UserRow,
  },
};

const NOTIFICATION_RETENTION_DAYS: i64 = 30;
const HISTORY_RETENTION_DAYS: i64 = 90;

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
  #[serde(default)]
  pub filter: UserFilter,
  pub search: Option<String>,
}

pub async fn list_users(
  State(app): State<Arc<AppState>>,
  _: AdminSession,
  Query(query): Query<UserQuery>,
) -> Result<Json<Reply<Vec<UserRow>>>> {
  let rows = app.sv().user.list(query.filter, query.search.as_deref()).await?;
  Ok(Reply::data(rows))
}

pub async fn create_user(
  State(app): State<Arc<AppState>>,
  AdminSession(admin): AdminSession,
  Payload(new): Payload<NewUser>,
) -> Result<impl IntoResponse> {
  let user = app.sv().user.create(admin.id, new).await?;
  Ok((StatusCode::CREATED, Reply::with("User created", user)))
}

pub async fn edit_user(
  State(app): State<Arc<AppState>>,
  AdminSession(admin): AdminSession,
  Path(id): Path<i32>,
  Payload(edit): Payload<UserEdit>,
) -> Result<impl IntoResponse> {
  let user = app.sv().user.edit(admin.id, id, edit).await?;
  Ok(Reply::with("User updated", user))
}

#[derive(Debug, Deserialize)]
pub struct Toggle {
  pub active: bool,
}

pub async fn set_user_active(
  State(app): State<Arc<AppState>>,
  AdminSession(admin): AdminSession,
  Path(id): Path<i32>,
  Payload(req): Payload<Toggle>,
) -> Result<impl IntoResponse> {
  let user = app.sv().user.set_active(admin.id, id, req.active).await?;
  Ok(Reply::with("User status updated", user))
}

pub async fn delete_user(
  State(app): State<Arc<AppState>>,
  AdminSession(admin): AdminSession,
  Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
  app.sv().user.delete(admin.id, id).await?;
  Ok(Reply::message("User deleted"))
}

#[derive(Debug, Deserialize)]
pub struct Binding {
  #[serde(default)]
  pub device_id: Option<String>,
}

/// Overwrites the user's device; a missing or blank id clears it.
pub async fn bind_device(
  State(app): State<Arc<AppState>>,
  AdminSession(admin): AdminSession,
  Path(id): Path<i32>,
  Payload(req): Payload<Binding>,
) -> Result<impl IntoResponse> {
  app.sv().device.bind(id, req.device_id.as_deref()).await?;
  info!("Admin #{} rebound device of user #{id}", admin.id);
  Ok(Reply::message("Device updated"))
}

#[derive(Debug, Deserialize)]
pub struct Message {
  #[serde(default)]
  pub title: String,
  #[serde(default, alias = "message")]
  pub body: String,
  #[serde(default)]
  pub severity: Severity,
}

pub async fn notify_user(
  State(app): State<Arc<AppState>>,
  _: AdminSession,
  Path(id): Path<i32>,
  Payload(msg): Payload<Message>,
) -> Result<impl IntoResponse> {
  let sent = app
    .sv()
    .notification
    .send_to_user(id, &msg.title, &msg.body, msg.severity)
    .await?;
  Ok((StatusCode::CREATED, Reply::with("Notification sent", sent)))
}

#[derive(Debug, Deserialize)]
pub struct IssueReq {
  #[serde(default)]
  pub kind: LicenseKind,
  #[serde(default)]
  pub device_id: Option<String>,
}

pub async fn issue_license(
  State(app): State<Arc<AppState>>,
  AdminSession(admin): AdminSession,
  Path(user_id): Path<i32>,
  Payload(req): Payload<IssueReq>,
) -> Result<impl IntoResponse> {
  let license = app
    .sv()
    .license
    .create(admin.id, user_id, req.kind, req.device_id.as_deref())
    .await?;
  Ok((StatusCode::CREATED, Reply::with("License created", license)))
}

#[derive(Debug, Default, Deserialize)]
pub struct LicenseQuery {
  #[serde(default)]
  pub filter: LicenseFilter,
  pub search: Option<String>,
}

pub async fn list_licenses(
  State(app): State<Arc<AppState>>,
  _: AdminSession,
  Query(query): Query<LicenseQuery>,
) -> Result<Json<Reply<Vec<LicenseRow>>>> {
  let rows =
    app.sv().license.list(query.filter, query.search.as_deref()).await?;
  Ok(Reply::data(rows))
}

#[derive(Debug, Deserialize)]
pub struct CreateLicense {
  pub user_id: i32,
  #[serde(default)]
  pub kind: LicenseKind,
  #[serde(default)]
  pub device_id: Option<String>,
}

pub async fn create_license(
  State(app): State<Arc<AppState>>,
  AdminSession(admin): AdminSession,
  Payload(req): Payload<CreateLicense>,
) -> Result<impl IntoResponse> {
  let license = app
    .sv()
    .license
    .create(admin.id, req.user_id, req.kind, req.device_id.as_deref())
    .await?;
  Ok((StatusCode::CREATED, Reply::with("License created", license)))
}

#[derive(Debug, Deserialize)]
pub struct ProvisionReq {
  #[serde(default)]
  pub kind: LicenseKind,
}

pub async fn provision_license(
  State(app): State<Arc<AppState>>,
  AdminSession(admin): AdminSession,
  Payload(req): Payload<ProvisionReq>,
) -> Result<impl IntoResponse> {
  let license = app.sv().license.provision(admin.id, req.kind).await?;
  Ok((StatusCode::CREATED, Reply::with("License provisioned", license)))
}

pub async fn license_details(
  State(app): State<Arc<AppState>>,
  _: AdminSession,
  Path(id): Path<i32>,
) -> Result<Json<Reply<LicenseDetails>>> {
  Ok(Reply::data(app.sv().license.details(id).await?))
}

pub async fn renew_license(
  State(app): State<Arc<AppState>>,
  AdminSession(admin): AdminSession,
  Path(id): Path<i32>,
  Payload(req): Payload<IssueReq>,
) -> Result<Json<Reply<license::Model>>> {
  let license = app
    .sv()
    .license
    .renew(admin.id, id, req.kind, req.device_id.as_deref())
    .await?;
  Ok(Reply::with("License renewed", license))
}

pub async fn set_license_active(
  State(app): State<Arc<AppState>>,
  AdminSession(admin): AdminSession,
  Path(id): Path<i32>,
  Payload(req): Payload<Toggle>,
) -> Result<impl IntoResponse> {
  let license = app.sv().license.set_active(admin.id, id, req.active).await?;
  Ok(Reply::with("License status updated", license))
}

pub async fn delete_license(
  State(app): State<Arc<AppState>>,
  AdminSession(admin): AdminSession,
  Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
  app.sv().license.delete(admin.id, id).await?;
  Ok(Reply::message("License deleted"))
}

pub async fn notifications(
  State(app): State<Arc<AppState>>,
  AdminSession(admin): AdminSession,
  Query(query): Query<InboxQuery>,
) -> Result<Json<Reply<Inbox>>> {
  let inbox =
    app.sv().notification.list(Recipient::admin(admin.id), query.filter).await?;
  Ok(Reply::data(inbox))
}

pub async fn create_notification(
  State(app): State<Arc<AppState>>,
  AdminSession(admin): AdminSession,
  Payload(msg): Payload<Message>,
) -> Result<impl IntoResponse> {
  let note = app
    .sv()
    .notification
    .create(Recipient::admin(admin.id), &msg.title, &msg.body, msg.severity)
    .await?;
  Ok((StatusCode::CREATED, Reply::with("Notification created", note)))
}

pub async fn notification_summary(
  State(app): State<Arc<AppState>>,
  AdminSession(admin): AdminSession,
) -> Result<Json<Reply<Summary>>> {
  let summary =
    app.sv().notification.summary(Recipient::admin(admin.id)).await?;
  Ok(Reply::data(summary))
}

pub async fn generate_notifications(
  State(app): State<Arc<AppState>>,
  AdminSession(admin): AdminSession,
) -> Result<Json<Reply<Generated>>> {
  let sv = app.sv();
  let warning_days = sv.settings.warning_days().await?;
  let generated =
    sv.notification.generate_expiry_alerts(admin.id, warning_days).await?;
  Ok(Reply::data(generated))
}

#[derive(Debug, Serialize)]
pub struct Affected {
  pub count: u64,
}

pub async fn read_all_notifications(
  State(app): State<Arc<AppState>>,
  AdminSession(admin): AdminSession,
) -> Result<Json<Reply<Affected>>> {
  let count =
    app.sv().notification.mark_all_read(Recipient::admin(admin.id)).await?;
  Ok(Reply::with("Notifications marked as read", Affected { count }))
}

#[derive(Debug, Default, Deserialize)]
pub struct Retention {
  pub days: Option<i64>,
}

pub async fn cleanup_notifications(
  State(app): State<Arc<AppState>>,
  AdminSession(admin): AdminSession,
  Payload(req): Payload<Retention>,
) -> Result<Json<Reply<Affected>>> {
  let days = req.days.unwrap_or(NOTIFICATION_RETENTION_DAYS);
  let count = app
    .sv()
    .notification
    .cleanup(Recipient::admin(admin.id), days)
    .await?;
  Ok(Reply::with("Old notifications removed", Affected { count }))
}

pub async fn read_notification(
  State(app): State<Arc<AppState>>,
  AdminSession(admin): AdminSession,
  Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
  app.sv().notification.mark_read(Recipient::admin(admin.id), id).await?;
  Ok(Reply::message("Notification marked as read"))
}

pub async fn delete_notification(
  State(app): State<Arc<AppState>>,
  AdminSession(admin): AdminSession,
  Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
  app.sv().notification.delete(Recipient::admin(admin.id), id).await?;
  Ok(Reply::message("Notification deleted"))
}

#[derive(Debug, Serialize)]
pub struct SettingsView {
  pub values: BTreeMap<String, String>,
  pub durations: Durations,
}

pub async fn settings(
  State(app): State<Arc<AppState>>,
  _: AdminSession,
) -> Result<Json<Reply<SettingsView>>> {
  let sv = app.sv();
  let view = SettingsView {
    values: sv.settings.editable().await?,
    durations: sv.settings.durations().await?,
  };
  Ok(Reply::data(view))
}

pub async fn update_settings(
  State(app): State<Arc<AppState>>,
  AdminSession(admin): AdminSession,
  Payload(values): Payload<BTreeMap<String, String>>,
) -> Result<Json<Reply<Affected>>> {
  let count = app.sv().settings.update(admin.id, values).await?;
  Ok(Reply::with("Settings updated", Affected { count }))
}

pub async fn company(
  State(app): State<Arc<AppState>>,
  _: AdminSession,
) -> Result<Json<Reply<CompanyProfile>>> {
  Ok(Reply::data(app.sv().settings.company_profile().await?))
}

pub async fn update_company(
  State(app): State<Arc<AppState>>,
  AdminSession(admin): AdminSession,
  Payload(profile): Payload<CompanyProfile>,
) -> Result<impl IntoResponse> {
  let company = app.sv().settings.update_company(admin.id, profile).await?;
  Ok(Reply::with("Company profile saved", CompanyProfile::from(company)))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
  pub table: String,
  pub row_id: i32,
  pub limit: Option<u64>,
}

pub async fn history(
  State(app): State<Arc<AppState>>,
  _: AdminSession,
  Query(query): Query<HistoryQuery>,
) -> Result<Json<Reply<Vec<history::Model>>>> {
  let limit = query.limit.unwrap_or(50).clamp(1, 500);
  let entries =
    app.sv().history.for_row(&query.table, query.row_id, limit).await?;
  Ok(Reply::data(entries))
}

pub async fn cleanup_history(
  State(app): State<Arc<AppState>>,
  AdminSession(admin): AdminSession,
  Payload(req): Payload<Retention>,
) -> Result<Json<Reply<Affected>>> {
  let days = req.days.unwrap_or(HISTORY_RETENTION_DAYS);
  let count = app.sv().history.cleanup(days).await?;
  info!("Admin #{} purged {count} history entries", admin.id);
  Ok(Reply::with("Old history removed", Affected { count }))
}

mod admin;
mod extract;
mod handlers;
mod reply;
mod session;

#[cfg(test)]
mod tests;

use std::net::SocketAddr;

use async_trait::async_trait;
use axum::{
  Router,
  routing::{delete, get, post, put},
};
use tower::ServiceBuilder;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};

use crate::{prelude::*, state::AppState};

pub struct Plugin;

fn mobile() -> Router<Arc<AppState>> {
  Router::new()
    .route("/auth/login", post(handlers::login))
    .route("/auth/register", post(handlers::register))
    .route("/auth/registerdevice", post(handlers::register_device))
    .route("/license/activate", post(handlers::activate_license))
    .route("/license/validate", post(handlers::validate_license))
    .route("/trips/save", post(handlers::save_trip))
    .route("/trips/history", get(handlers::trip_history))
    .route(
      "/trips/delete",
      post(handlers::delete_trip).delete(handlers::delete_trip),
    )
    .route("/analisis/guardar", post(handlers::save_group_analysis))
    .route("/analisis/completo", post(handlers::save_full_analysis))
    .route(
      "/groups",
      get(handlers::list_groups)
        .post(handlers::create_group)
        .delete(handlers::delete_group),
    )
    .route("/grupos/list", get(handlers::list_groups))
    .route("/grupos/create", post(handlers::create_group))
    .route("/grupos/delete", delete(handlers::delete_group))
    .route("/screenshots/list", get(handlers::list_screenshots))
    .route("/company", get(handlers::company))
    .route("/empresa/info", get(handlers::company))
    .route("/notifications", get(handlers::notifications))
    .route("/notifications/{id}", delete(handlers::delete_notification))
    .route("/notifications/{id}/read", post(handlers::read_notification))
}

fn admin() -> Router<Arc<AppState>> {
  Router::new()
    .route("/users", get(admin::list_users).post(admin::create_user))
    .route("/users/{id}", put(admin::edit_user).delete(admin::delete_user))
    .route("/users/{id}/active", post(admin::set_user_active))
    .route("/users/{id}/device", put(admin::bind_device))
    .route("/users/{id}/notify", post(admin::notify_user))
    .route("/users/{id}/licenses", post(admin::issue_license))
    .route("/licenses", get(admin::list_licenses).post(admin::create_license))
    .route("/licenses/provision", post(admin::provision_license))
    .route(
      "/licenses/{id}",
      get(admin::license_details)
        .put(admin::renew_license)
        .delete(admin::delete_license),
    )
    .route("/licenses/{id}/active", post(admin::set_license_active))
    .route(
      "/notifications",
      get(admin::notifications).post(admin::create_notification),
    )
    .route("/notifications/summary", get(admin::notification_summary))
    .route("/notifications/generate", post(admin::generate_notifications))
    .route("/notifications/read-all", post(admin::read_all_notifications))
    .route("/notifications/cleanup", post(admin::cleanup_notifications))
    .route("/notifications/{id}", delete(admin::delete_notification))
    .route("/notifications/{id}/read", post(admin::read_notification))
    .route("/settings", get(admin::settings).put(admin::update_settings))
    .route("/company", get(admin::company).put(admin::update_company))
    .route("/history", get(admin::history))
    .route("/history/cleanup", post(admin::cleanup_history))
}

/// All routes with tracing and CORS, without the per-IP rate limit.
pub fn router(app: Arc<AppState>) -> Router {
  Router::new()
    .route("/health", get(handlers::health))
    .route("/session", get(session::me))
    .route("/session/login", post(session::login))
    .route("/session/logout", post(session::logout))
    .nest("/api", mobile())
    .nest("/admin", admin())
    .layer(
      ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
        CorsLayer::new()
          .allow_origin(Any)
          .allow_methods(Any)
          .allow_headers(Any),
      ),
    )
    .with_state(app)
}

#[async_trait]
impl super::Plugin for Plugin {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let governor_conf = Arc::new(
      GovernorConfigBuilder::default()
        .per_second(2)
        .burst_size(100)
        .finish()
        .context("Failed to build rate limiter config")?,
    );

    let limiter = governor_conf.limiter().clone();
    let port = app.config.port;

    let router = router(app)
      .layer(GovernorLayer::new(governor_conf))
      .into_make_service_with_connect_info::<SocketAddr>();

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = tokio::net::TcpListener::bind(addr)
      .await
      .with_context(|| format!("Failed to bind {addr}"))?;
    info!("HTTP Server listening on {addr}");

    let limiter = async {
      loop {
        tokio::time::sleep(std::time::Duration::from_secs(60)).await;
        limiter.retain_recent();
      }
    };

    let server = async {
      axum::serve(listener, router).await.context("Axum server error")
    };

    tokio::select! {
      result = server => {
        match &result {
          Ok(_) => info!("Server stopped gracefully"),
          Err(err) => error!("Server stopped with error: {err}"),
        }
        result
      }
      _ = limiter => {
        error!("Rate limiter cleaner stopped unexpectedly!");
        Ok(())
      }
    }
  }
}

//! License Manager - license, device and account administration server
//!
//! Architecture:
//! - SeaORM for database access (SQLite)
//! - Axum for the mobile and admin HTTP API with rate limiting
//! - JWT sessions, argon2 password hashes
//! - Tokio for async runtime

mod entity;
mod error;
mod password;
mod plugins;
mod prelude;
mod state;
mod sv;
mod token;
mod utils;

use tracing_subscriber::{
  EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::{prelude::*, state::Config, sv::Bootstrap};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
      "license_manager=debug,tower_http=debug,sea_orm=warn".into()
    }))
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = Config::from_env()?;

  info!("Starting License Manager v{}", env!("CARGO_PKG_VERSION"));

  let app = Arc::new(state::AppState::new(config).await?);

  match &app.config.admin {
    Some(seed) => match app.sv().admin.bootstrap(seed).await? {
      Bootstrap::Skipped => debug!("Active administrator present"),
      Bootstrap::Reactivated(id) => info!("Reactivated administrator #{id}"),
      Bootstrap::Created(id) => info!("Created administrator #{id}"),
    },
    None => warn!("ADMIN_EMAIL/ADMIN_PASSWORD not set, skipping admin bootstrap"),
  }

  let plugins = plugins::App::new().register(plugins::server::Plugin).run(app);

  tokio::signal::ctrl_c().await?;
  info!("Shutting down");
  plugins.iter().for_each(|plugin| plugin.abort());

  Ok(())
}

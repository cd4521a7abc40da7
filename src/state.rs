use std::env;

use crate::{prelude::*, sv, token::Tokens};

/// Initial administrator created on first boot.
#[derive(Debug, Clone)]
pub struct AdminSeed {
  pub name: String,
  pub email: String,
  pub password: String,
  pub phone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
  pub database_url: String,
  pub port: u16,
  pub jwt_secret: String,
  pub admin: Option<AdminSeed>,
}

impl Config {
  pub fn from_env() -> anyhow::Result<Self> {
    let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET not set")?;
    if jwt_secret.trim().is_empty() {
      anyhow::bail!("JWT_SECRET must not be empty");
    }

    let database_url = env::var("DATABASE_URL")
      .unwrap_or_else(|_| "sqlite:licenses.db?mode=rwc".into());
    let port =
      env::var("PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(3000);

    let admin = match (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
      (Ok(email), Ok(password))
        if !utils::is_blank(&email) && !utils::is_blank(&password) =>
      {
        Some(AdminSeed {
          name: env::var("ADMIN_NAME")
            .unwrap_or_else(|_| "Super Administrator".into()),
          email: email.trim().to_string(),
          password,
          phone: utils::non_blank(env::var("ADMIN_PHONE").ok().as_deref()),
        })
      }
      _ => None,
    };

    Ok(Self { database_url, port, jwt_secret, admin })
  }
}

pub struct Services<'a> {
  pub admin: sv::Admin<'a>,
  pub user: sv::User<'a>,
  pub auth: sv::Auth<'a>,
  pub license: sv::License<'a>,
  pub device: sv::Device<'a>,
  pub history: sv::History<'a>,
  pub notification: sv::Notification<'a>,
  pub settings: sv::Settings<'a>,
  pub trip: sv::Trip<'a>,
}

pub struct AppState {
  pub db: DatabaseConnection,
  pub tokens: Tokens,
  pub config: Config,
}

impl AppState {
  pub async fn new(config: Config) -> anyhow::Result<Self> {
    info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
      .await
      .context("Failed to connect to database")?;

    info!("Running migrations...");
    migration::Migrator::up(&db, None)
      .await
      .context("Failed to run migrations")?;

    Ok(Self::with_db(db, config))
  }

  pub fn with_db(db: DatabaseConnection, config: Config) -> Self {
    Self { tokens: Tokens::new(&config.jwt_secret), db, config }
  }

  pub fn sv(&self) -> Services<'_> {
    Services {
      admin: sv::Admin::new(&self.db),
      user: sv::User::new(&self.db),
      auth: sv::Auth::new(&self.db, &self.tokens),
      license: sv::License::new(&self.db),
      device: sv::Device::new(&self.db),
      history: sv::History::new(&self.db),
      notification: sv::Notification::new(&self.db),
      settings: sv::Settings::new(&self.db),
      trip: sv::Trip::new(&self.db),
    }
  }
}

#[cfg(test)]
impl AppState {
  /// Fresh migrated in-memory database.
  pub async fn in_memory() -> Self {
    let config = Config {
      database_url: "sqlite::memory:".into(),
      port: 0,
      jwt_secret: "test-secret".into(),
      admin: None,
    };
    Self::new(config).await.unwrap()
  }
}

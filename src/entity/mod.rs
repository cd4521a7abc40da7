//! SeaORM entities backing the credential store.

pub mod admin;
pub mod company;
pub mod group_analysis;
pub mod history;
pub mod license;
pub mod notification;
pub mod screenshot;
pub mod setting;
pub mod trip;
pub mod trip_analysis;
pub mod trip_group;
pub mod user;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub use history::{Action, ActorKind};
pub use license::LicenseKind;
pub use notification::Severity;

/// Account kind carried by session tokens and notification recipients.
#[derive(
  Copy,
  Clone,
  Debug,
  PartialEq,
  Eq,
  Hash,
  EnumIter,
  DeriveActiveEnum,
  Serialize,
  Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Role {
  #[sea_orm(string_value = "administrador")]
  #[serde(rename = "administrador", alias = "admin")]
  Admin,
  #[sea_orm(string_value = "usuario")]
  #[serde(rename = "usuario", alias = "user")]
  User,
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Role::Admin => "administrador",
      Role::User => "usuario",
    }
  }
}

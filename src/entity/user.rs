use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{license, trip};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub name: String,
  #[sea_orm(unique)]
  pub email: String,
  pub phone: Option<String>,
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub active: bool,
  /// Device binding used to pin mobile sessions
  pub device_id: Option<String>,
  pub last_seen_at: Option<DateTime>,
  pub created_at: DateTime,
}

impl Model {
  pub fn has_device(&self) -> bool {
    self.device_id.as_deref().is_some_and(|id| !id.trim().is_empty())
  }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "license::Entity")]
  Licenses,
  #[sea_orm(has_many = "trip::Entity")]
  Trips,
}

impl Related<license::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Licenses.def()
  }
}

impl Related<trip::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Trips.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}

//! Append-only audit trail.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
  Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum ActorKind {
  #[sea_orm(string_value = "administrador")]
  Admin,
  #[sea_orm(string_value = "usuario")]
  User,
  #[sea_orm(string_value = "sistema")]
  System,
}

#[derive(
  Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
  #[sea_orm(string_value = "LOGIN")]
  Login,
  #[sea_orm(string_value = "LOGOUT")]
  Logout,
  #[sea_orm(string_value = "CREATE")]
  Create,
  #[sea_orm(string_value = "UPDATE")]
  Update,
  #[sea_orm(string_value = "DELETE")]
  Delete,
  #[sea_orm(string_value = "REACTIVATE")]
  Reactivate,
  #[sea_orm(string_value = "ACTIVATE")]
  Activate,
  #[sea_orm(string_value = "DEACTIVATE")]
  Deactivate,
  #[sea_orm(string_value = "RENEW")]
  Renew,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "history")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub actor_kind: ActorKind,
  pub actor_id: Option<i32>,
  pub action: Action,
  pub table_name: String,
  pub row_id: Option<i32>,
  pub detail: String,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

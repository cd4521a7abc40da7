use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::Role;

#[derive(
  Copy,
  Clone,
  Debug,
  Default,
  PartialEq,
  Eq,
  Hash,
  EnumIter,
  DeriveActiveEnum,
  Serialize,
  Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  #[default]
  #[sea_orm(string_value = "info")]
  Info,
  #[sea_orm(string_value = "success")]
  Success,
  #[sea_orm(string_value = "warning")]
  Warning,
  #[sea_orm(string_value = "error")]
  Error,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub recipient_kind: Role,
  pub recipient_id: i32,
  pub title: String,
  pub body: String,
  pub severity: Severity,
  pub read: bool,
  pub created_at: DateTime,
  pub read_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

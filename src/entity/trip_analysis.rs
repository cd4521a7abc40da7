use json::Value;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "trip_analyses")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub trip_id: i32,
  pub user_id: i32,
  /// best fare, best km, shortest/longest route and similar picks
  pub highlights: Value,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::trip_group;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "group_analyses")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub group_id: i32,
  pub user_id: i32,
  pub amount: f64,
  pub km: f64,
  pub minutes: f64,
  pub per_km: f64,
  pub per_minute: f64,
  pub per_hour: f64,
  pub captures: i32,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "trip_group::Entity",
    from = "Column::GroupId",
    to = "trip_group::Column::Id"
  )]
  Group,
}

impl Related<trip_group::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Group.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}

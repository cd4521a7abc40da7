use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::group_analysis;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "trip_groups")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub user_id: i32,
  pub name: String,
  pub active: bool,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "group_analysis::Entity")]
  Analyses,
}

impl Related<group_analysis::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Analyses.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::trip_group;

/// Capture uploaded into a trip group. Only the stored path is served.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "screenshots")]
pub struct Model {
  #[sea_orm(primary_key)]
  #[serde(rename = "id_screenshot")]
  pub id: i32,
  #[serde(skip)]
  pub group_id: i32,
  #[serde(rename = "ruta_imagen")]
  pub path: String,
  #[serde(rename = "fecha_captura")]
  pub captured_at: DateTime,
  #[serde(rename = "procesado")]
  pub processed: bool,
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

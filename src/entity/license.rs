use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::user;

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
pub enum LicenseKind {
  #[default]
  #[sea_orm(string_value = "mensual")]
  #[serde(rename = "mensual", alias = "monthly")]
  Monthly,
  #[sea_orm(string_value = "trimestral")]
  #[serde(rename = "trimestral", alias = "quarterly")]
  Quarterly,
  #[sea_orm(string_value = "anual")]
  #[serde(rename = "anual", alias = "yearly")]
  Yearly,
}

impl LicenseKind {
  pub const ALL: [LicenseKind; 3] = [Self::Monthly, Self::Quarterly, Self::Yearly];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Monthly => "mensual",
      Self::Quarterly => "trimestral",
      Self::Yearly => "anual",
    }
  }

  /// Key of the duration row in the settings table.
  pub fn setting_key(&self) -> &'static str {
    match self {
      Self::Monthly => "license_days.monthly",
      Self::Quarterly => "license_days.quarterly",
      Self::Yearly => "license_days.yearly",
    }
  }

  pub fn default_days(&self) -> i64 {
    match self {
      Self::Monthly => 30,
      Self::Quarterly => 90,
      Self::Yearly => 365,
    }
  }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "licenses")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  /// Owner, unset until a provisioned license is claimed
  pub user_id: Option<i32>,
  #[sea_orm(unique)]
  pub code: String,
  pub kind: LicenseKind,
  pub starts_on: Date,
  pub expires_on: Date,
  pub active: bool,
  pub device_id: Option<String>,
  pub claimed: bool,
  pub modified_by: Option<i32>,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "user::Entity",
    from = "Column::UserId",
    to = "user::Column::Id"
  )]
  User,
}

impl Related<user::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::User.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm_migration::prelude::*;

use super::m20260301_000001_create_accounts::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(TripGroups::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(TripGroups::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(TripGroups::UserId).integer().not_null())
          .col(ColumnDef::new(TripGroups::Name).string().not_null())
          .col(ColumnDef::new(TripGroups::Active).boolean().not_null().default(true))
          .col(ColumnDef::new(TripGroups::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_trip_groups_user")
              .from(TripGroups::Table, TripGroups::UserId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table(Trips::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Trips::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Trips::UserId).integer().not_null())
          .col(ColumnDef::new(Trips::GroupId).integer().null())
          .col(ColumnDef::new(Trips::Amount).double().not_null())
          .col(ColumnDef::new(Trips::Km).double().not_null())
          .col(ColumnDef::new(Trips::Minutes).double().not_null())
          .col(ColumnDef::new(Trips::PerKm).double().not_null().default(0.0))
          .col(ColumnDef::new(Trips::PerMinute).double().not_null().default(0.0))
          .col(ColumnDef::new(Trips::PerHour).double().not_null().default(0.0))
          .col(ColumnDef::new(Trips::Captures).integer().null())
          .col(ColumnDef::new(Trips::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_trips_user")
              .from(Trips::Table, Trips::UserId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_trips_user")
          .table(Trips::Table)
          .col(Trips::UserId)
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table(GroupAnalyses::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(GroupAnalyses::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(GroupAnalyses::GroupId).integer().not_null())
          .col(ColumnDef::new(GroupAnalyses::UserId).integer().not_null())
          .col(ColumnDef::new(GroupAnalyses::Amount).double().not_null())
          .col(ColumnDef::new(GroupAnalyses::Km).double().not_null())
          .col(ColumnDef::new(GroupAnalyses::Minutes).double().not_null())
          .col(ColumnDef::new(GroupAnalyses::PerKm).double().not_null().default(0.0))
          .col(
            ColumnDef::new(GroupAnalyses::PerMinute)
              .double()
              .not_null()
              .default(0.0),
          )
          .col(
            ColumnDef::new(GroupAnalyses::PerHour)
              .double()
              .not_null()
              .default(0.0),
          )
          .col(ColumnDef::new(GroupAnalyses::Captures).integer().not_null().default(0))
          .col(ColumnDef::new(GroupAnalyses::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_group_analyses_group")
              .from(GroupAnalyses::Table, GroupAnalyses::GroupId)
              .to(TripGroups::Table, TripGroups::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table(TripAnalyses::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(TripAnalyses::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(TripAnalyses::TripId).integer().not_null())
          .col(ColumnDef::new(TripAnalyses::UserId).integer().not_null())
          .col(ColumnDef::new(TripAnalyses::Highlights).json().not_null())
          .col(ColumnDef::new(TripAnalyses::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_trip_analyses_trip")
              .from(TripAnalyses::Table, TripAnalyses::TripId)
              .to(Trips::Table, Trips::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(TripAnalyses::Table).to_owned())
      .await?;
    manager
      .drop_table(Table::drop().table(GroupAnalyses::Table).to_owned())
      .await?;
    manager.drop_table(Table::drop().table(Trips::Table).to_owned()).await?;
    manager.drop_table(Table::drop().table(TripGroups::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum TripGroups {
  Table,
  Id,
  UserId,
  Name,
  Active,
  CreatedAt,
}

#[derive(DeriveIden)]
pub enum Trips {
  Table,
  Id,
  UserId,
  GroupId,
  Amount,
  Km,
  Minutes,
  PerKm,
  PerMinute,
  PerHour,
  Captures,
  CreatedAt,
}

#[derive(DeriveIden)]
pub enum GroupAnalyses {
  Table,
  Id,
  GroupId,
  UserId,
  Amount,
  Km,
  Minutes,
  PerKm,
  PerMinute,
  PerHour,
  Captures,
  CreatedAt,
}

#[derive(DeriveIden)]
pub enum TripAnalyses {
  Table,
  Id,
  TripId,
  UserId,
  Highlights,
  CreatedAt,
}

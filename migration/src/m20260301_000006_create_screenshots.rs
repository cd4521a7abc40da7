use sea_orm_migration::prelude::*;

use super::m20260301_000005_create_trips::TripGroups;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Screenshots::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Screenshots::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Screenshots::GroupId).integer().not_null())
          .col(ColumnDef::new(Screenshots::Path).string().not_null())
          .col(ColumnDef::new(Screenshots::CapturedAt).date_time().not_null())
          .col(
            ColumnDef::new(Screenshots::Processed)
              .boolean()
              .not_null()
              .default(false),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_screenshots_group")
              .from(Screenshots::Table, Screenshots::GroupId)
              .to(TripGroups::Table, TripGroups::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_screenshots_group")
          .table(Screenshots::Table)
          .col(Screenshots::GroupId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Screenshots::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Screenshots {
  Table,
  Id,
  GroupId,
  Path,
  CapturedAt,
  Processed,
}

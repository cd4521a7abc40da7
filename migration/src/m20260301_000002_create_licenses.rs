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
          .table(Licenses::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Licenses::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Licenses::UserId).integer().null())
          .col(ColumnDef::new(Licenses::Code).string().not_null().unique_key())
          .col(
            ColumnDef::new(Licenses::Kind)
              .string()
              .not_null()
              .default("mensual"),
          )
          .col(ColumnDef::new(Licenses::StartsOn).date().not_null())
          .col(ColumnDef::new(Licenses::ExpiresOn).date().not_null())
          .col(ColumnDef::new(Licenses::Active).boolean().not_null().default(false))
          .col(ColumnDef::new(Licenses::DeviceId).string().null())
          .col(ColumnDef::new(Licenses::Claimed).boolean().not_null().default(false))
          .col(ColumnDef::new(Licenses::ModifiedBy).integer().null())
          .col(ColumnDef::new(Licenses::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_licenses_user")
              .from(Licenses::Table, Licenses::UserId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_licenses_user")
          .table(Licenses::Table)
          .col(Licenses::UserId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Licenses::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Licenses {
  Table,
  Id,
  UserId,
  Code,
  Kind,
  StartsOn,
  ExpiresOn,
  Active,
  DeviceId,
  Claimed,
  ModifiedBy,
  CreatedAt,
}

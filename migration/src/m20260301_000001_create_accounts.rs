use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Admins::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Admins::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Admins::Name).string().not_null())
          .col(ColumnDef::new(Admins::Email).string().not_null().unique_key())
          .col(ColumnDef::new(Admins::Phone).string().null())
          .col(ColumnDef::new(Admins::PasswordHash).string().not_null())
          .col(ColumnDef::new(Admins::Active).boolean().not_null().default(true))
          .col(ColumnDef::new(Admins::LastSeenAt).date_time().null())
          .col(ColumnDef::new(Admins::CreatedAt).date_time().not_null())
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table(Users::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Users::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Users::Name).string().not_null())
          .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
          .col(ColumnDef::new(Users::Phone).string().null())
          .col(ColumnDef::new(Users::PasswordHash).string().not_null())
          .col(ColumnDef::new(Users::Active).boolean().not_null().default(true))
          .col(ColumnDef::new(Users::DeviceId).string().null())
          .col(ColumnDef::new(Users::LastSeenAt).date_time().null())
          .col(ColumnDef::new(Users::CreatedAt).date_time().not_null())
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Users::Table).to_owned()).await?;
    manager.drop_table(Table::drop().table(Admins::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Admins {
  Table,
  Id,
  Name,
  Email,
  Phone,
  PasswordHash,
  Active,
  LastSeenAt,
  CreatedAt,
}

#[derive(DeriveIden)]
pub enum Users {
  Table,
  Id,
  Name,
  Email,
  Phone,
  PasswordHash,
  Active,
  DeviceId,
  LastSeenAt,
  CreatedAt,
}

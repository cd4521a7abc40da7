use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(History::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(History::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(History::ActorKind).string().not_null())
          .col(ColumnDef::new(History::ActorId).integer().null())
          .col(ColumnDef::new(History::Action).string().not_null())
          .col(ColumnDef::new(History::TableName).string().not_null())
          .col(ColumnDef::new(History::RowId).integer().null())
          .col(ColumnDef::new(History::Detail).text().not_null())
          .col(ColumnDef::new(History::CreatedAt).date_time().not_null())
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_history_row")
          .table(History::Table)
          .col(History::TableName)
          .col(History::RowId)
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table(Notifications::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Notifications::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Notifications::RecipientKind).string().not_null())
          .col(ColumnDef::new(Notifications::RecipientId).integer().not_null())
          .col(ColumnDef::new(Notifications::Title).string().not_null())
          .col(ColumnDef::new(Notifications::Body).text().not_null())
          .col(
            ColumnDef::new(Notifications::Severity)
              .string()
              .not_null()
              .default("info"),
          )
          .col(
            ColumnDef::new(Notifications::Read)
              .boolean()
              .not_null()
              .default(false),
          )
          .col(ColumnDef::new(Notifications::CreatedAt).date_time().not_null())
          .col(ColumnDef::new(Notifications::ReadAt).date_time().null())
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_notifications_recipient")
          .table(Notifications::Table)
          .col(Notifications::RecipientKind)
          .col(Notifications::RecipientId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(Notifications::Table).to_owned())
      .await?;
    manager.drop_table(Table::drop().table(History::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum History {
  Table,
  Id,
  ActorKind,
  ActorId,
  Action,
  TableName,
  RowId,
  Detail,
  CreatedAt,
}

#[derive(DeriveIden)]
pub enum Notifications {
  Table,
  Id,
  RecipientKind,
  RecipientId,
  Title,
  Body,
  Severity,
  Read,
  CreatedAt,
  ReadAt,
}

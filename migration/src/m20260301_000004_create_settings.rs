use sea_orm_migration::prelude::*;

const DEFAULTS: &[(&str, &str, bool)] = &[
  ("license_days.monthly", "30", true),
  ("license_days.quarterly", "90", true),
  ("license_days.yearly", "365", true),
  ("expiry_warning_days", "7", true),
  ("allow_registration", "true", true),
  ("app_version", "1.0.0", false),
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Settings::Table)
          .if_not_exists()
          .col(ColumnDef::new(Settings::Key).string().not_null().primary_key())
          .col(ColumnDef::new(Settings::Value).string().not_null())
          .col(
            ColumnDef::new(Settings::Editable)
              .boolean()
              .not_null()
              .default(true),
          )
          .col(ColumnDef::new(Settings::ModifiedBy).integer().null())
          .col(ColumnDef::new(Settings::UpdatedAt).date_time().not_null())
          .to_owned(),
      )
      .await?;

    let mut seed = Query::insert();
    seed.into_table(Settings::Table).columns([
      Settings::Key,
      Settings::Value,
      Settings::Editable,
      Settings::UpdatedAt,
    ]);
    for &(key, value, editable) in DEFAULTS {
      seed.values_panic([
        key.into(),
        value.into(),
        editable.into(),
        Expr::current_timestamp().into(),
      ]);
    }
    manager.exec_stmt(seed).await?;

    manager
      .create_table(
        Table::create()
          .table(Company::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Company::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Company::Name).string().not_null().default(""))
          .col(ColumnDef::new(Company::LegalName).string().not_null().default(""))
          .col(ColumnDef::new(Company::Address).string().not_null().default(""))
          .col(ColumnDef::new(Company::Phone).string().not_null().default(""))
          .col(ColumnDef::new(Company::PhoneAlt).string().not_null().default(""))
          .col(ColumnDef::new(Company::Email).string().not_null().default(""))
          .col(ColumnDef::new(Company::Website).string().not_null().default(""))
          .col(ColumnDef::new(Company::LogoUrl).string().not_null().default(""))
          .col(ColumnDef::new(Company::Active).boolean().not_null().default(true))
          .col(ColumnDef::new(Company::ModifiedBy).integer().null())
          .col(ColumnDef::new(Company::UpdatedAt).date_time().not_null())
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Company::Table).to_owned()).await?;
    manager.drop_table(Table::drop().table(Settings::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Settings {
  Table,
  Key,
  Value,
  Editable,
  ModifiedBy,
  UpdatedAt,
}

#[derive(DeriveIden)]
pub enum Company {
  Table,
  Id,
  Name,
  LegalName,
  Address,
  Phone,
  PhoneAlt,
  Email,
  Website,
  LogoUrl,
  Active,
  ModifiedBy,
  UpdatedAt,
}

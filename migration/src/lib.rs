pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_accounts;
mod m20260301_000002_create_licenses;
mod m20260301_000003_create_audit;
mod m20260301_000004_create_settings;
mod m20260301_000005_create_trips;
mod m20260301_000006_create_screenshots;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![
      Box::new(m20260301_000001_create_accounts::Migration),
      Box::new(m20260301_000002_create_licenses::Migration),
      Box::new(m20260301_000003_create_audit::Migration),
      Box::new(m20260301_000004_create_settings::Migration),
      Box::new(m20260301_000005_create_trips::Migration),
      Box::new(m20260301_000006_create_screenshots::Migration),
    ]
  }
}

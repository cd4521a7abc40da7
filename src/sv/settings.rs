use sea_orm::sea_query::Expr;
use serde::{Deserialize, Serialize};

use crate::{
  entity::{Action, LicenseKind, company, setting},
  prelude::*,
  sv::{Actor, History},
};

pub const EXPIRY_WARNING_DAYS: &str = "expiry_warning_days";
const DEFAULT_WARNING_DAYS: i64 = 7;
const MAX_DAYS: i64 = 36_500;

/// License durations in days, resolved from settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Durations {
  pub monthly: i64,
  pub quarterly: i64,
  pub yearly: i64,
}

impl Default for Durations {
  fn default() -> Self {
    Self {
      monthly: LicenseKind::Monthly.default_days(),
      quarterly: LicenseKind::Quarterly.default_days(),
      yearly: LicenseKind::Yearly.default_days(),
    }
  }
}

impl Durations {
  pub fn days(&self, kind: LicenseKind) -> i64 {
    match kind {
      LicenseKind::Monthly => self.monthly,
      LicenseKind::Quarterly => self.quarterly,
      LicenseKind::Yearly => self.yearly,
    }
  }
}

fn parse_days(value: Option<&str>) -> Option<i64> {
  value
    .and_then(|v| v.trim().parse::<i64>().ok())
    .filter(|days| (1..=MAX_DAYS).contains(days))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyProfile {
  #[serde(alias = "nombre")]
  pub name: String,
  #[serde(alias = "razon_social")]
  pub legal_name: String,
  #[serde(alias = "direccion")]
  pub address: String,
  #[serde(alias = "telefono")]
  pub phone: String,
  #[serde(alias = "telefono_secundario")]
  pub phone_alt: String,
  pub email: String,
  #[serde(alias = "sitio_web")]
  pub website: String,
  pub logo_url: String,
}

impl From<company::Model> for CompanyProfile {
  fn from(model: company::Model) -> Self {
    Self {
      name: model.name,
      legal_name: model.legal_name,
      address: model.address,
      phone: model.phone,
      phone_alt: model.phone_alt,
      email: model.email,
      website: model.website,
      logo_url: model.logo_url,
    }
  }
}

pub struct Settings<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Settings<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn value(&self, key: &str) -> Result<Option<String>> {
    let row = setting::Entity::find_by_id(key).one(self.db).await?;
    Ok(row.map(|row| row.value))
  }

  /// Read on every call so admin edits apply to the next license.
  pub async fn durations(&self) -> Result<Durations> {
    let keys = LicenseKind::ALL.map(|kind| kind.setting_key());
    let rows = setting::Entity::find()
      .filter(setting::Column::Key.is_in(keys))
      .all(self.db)
      .await?;

    let lookup = |kind: LicenseKind| {
      let value = rows
        .iter()
        .find(|row| row.key == kind.setting_key())
        .map(|row| row.value.as_str());
      parse_days(value).unwrap_or_else(|| kind.default_days())
    };

    Ok(Durations {
      monthly: lookup(LicenseKind::Monthly),
      quarterly: lookup(LicenseKind::Quarterly),
      yearly: lookup(LicenseKind::Yearly),
    })
  }

  pub async fn warning_days(&self) -> Result<i64> {
    let value = self.value(EXPIRY_WARNING_DAYS).await?;
    Ok(parse_days(value.as_deref()).unwrap_or(DEFAULT_WARNING_DAYS))
  }

  pub async fn editable(&self) -> Result<BTreeMap<String, String>> {
    let rows = setting::Entity::find()
      .filter(setting::Column::Editable.eq(true))
      .order_by_asc(setting::Column::Key)
      .all(self.db)
      .await?;
    Ok(rows.into_iter().map(|row| (row.key, row.value)).collect())
  }

  /// Writes editable keys only; unknown or locked keys are skipped.
  pub async fn update(
    &self,
    admin_id: i32,
    values: BTreeMap<String, String>,
  ) -> Result<u64> {
    let now = utils::now();
    let txn = self.db.begin().await?;

    let mut updated = Vec::new();
    for (key, value) in values {
      let res = setting::Entity::update_many()
        .col_expr(setting::Column::Value, Expr::value(value.trim()))
        .col_expr(setting::Column::ModifiedBy, Expr::value(admin_id))
        .col_expr(setting::Column::UpdatedAt, Expr::value(now))
        .filter(setting::Column::Key.eq(key.as_str()))
        .filter(setting::Column::Editable.eq(true))
        .exec(&txn)
        .await?;

      if res.rows_affected > 0 {
        updated.push(key);
      } else {
        debug!("Skipping setting `{key}`: missing or locked");
      }
    }

    txn.commit().await?;

    if !updated.is_empty() {
      History::new(self.db)
        .record(
          Actor::Admin(admin_id),
          Action::Update,
          "settings",
          None,
          format!("Updated settings: {}", updated.join(", ")),
        )
        .await;
    }

    Ok(updated.len() as u64)
  }

  pub async fn company(&self) -> Result<Option<company::Model>> {
    let company = company::Entity::find()
      .filter(company::Column::Active.eq(true))
      .order_by_desc(company::Column::Id)
      .one(self.db)
      .await?;
    Ok(company)
  }

  pub async fn company_profile(&self) -> Result<CompanyProfile> {
    Ok(self.company().await?.map(CompanyProfile::from).unwrap_or_default())
  }

  pub async fn update_company(
    &self,
    admin_id: i32,
    profile: CompanyProfile,
  ) -> Result<company::Model> {
    if utils::is_blank(&profile.name) {
      return Err(Error::validation("Company name is required"));
    }

    let existing = self.company().await?;
    let mut model = match existing {
      Some(ref company) => company::ActiveModel::from(company.clone()),
      None => company::ActiveModel { id: NotSet, ..Default::default() },
    };

    model.name = Set(profile.name.trim().to_string());
    model.legal_name = Set(profile.legal_name);
    model.address = Set(profile.address);
    model.phone = Set(profile.phone);
    model.phone_alt = Set(profile.phone_alt);
    model.email = Set(profile.email);
    model.website = Set(profile.website);
    model.logo_url = Set(profile.logo_url);
    model.active = Set(true);
    model.modified_by = Set(Some(admin_id));
    model.updated_at = Set(utils::now());

    let company = match existing {
      Some(_) => model.update(self.db).await?,
      None => model.insert(self.db).await?,
    };

    let action = if existing.is_some() { "updated" } else { "created" };
    History::new(self.db)
      .record(
        Actor::Admin(admin_id),
        Action::Update,
        "company",
        Some(company.id),
        format!("Company profile {action}"),
      )
      .await;

    Ok(company)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::state::AppState;

  #[tokio::test]
  async fn test_seeded_durations() {
    let app = AppState::in_memory().await;
    let sv = Settings::new(&app.db);

    assert_eq!(sv.durations().await.unwrap(), Durations::default());
    assert_eq!(sv.warning_days().await.unwrap(), 7);
  }

  #[tokio::test]
  async fn test_duration_edits_apply_and_fall_back() {
    let app = AppState::in_memory().await;
    let sv = Settings::new(&app.db);

    let values = BTreeMap::from([
      ("license_days.monthly".to_string(), "45".to_string()),
      ("license_days.yearly".to_string(), "forever".to_string()),
      ("app_version".to_string(), "9.9.9".to_string()),
    ]);
    assert_eq!(sv.update(1, values).await.unwrap(), 2);

    let durations = sv.durations().await.unwrap();
    assert_eq!(durations.monthly, 45);
    assert_eq!(durations.quarterly, 90);
    assert_eq!(durations.yearly, 365);

    // locked rows are never written
    assert_eq!(sv.value("app_version").await.unwrap().as_deref(), Some("1.0.0"));
    assert!(!sv.editable().await.unwrap().contains_key("app_version"));
  }

  #[tokio::test]
  async fn test_company_upsert() {
    let app = AppState::in_memory().await;
    let sv = Settings::new(&app.db);

    assert!(sv.company().await.unwrap().is_none());
    assert_eq!(sv.company_profile().await.unwrap(), CompanyProfile::default());

    let profile =
      CompanyProfile { name: "Rides Co".into(), ..Default::default() };
    let first = sv.update_company(1, profile.clone()).await.unwrap();

    let profile = CompanyProfile { email: "hi@rides.co".into(), ..profile };
    let second = sv.update_company(1, profile).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(sv.company_profile().await.unwrap().email, "hi@rides.co");

    let blank = CompanyProfile::default();
    assert!(matches!(
      sv.update_company(1, blank).await,
      Err(Error::Validation(_))
    ));
  }
}

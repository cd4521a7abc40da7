//! License lifecycle: issue, claim, renew, toggle, remove and validate.
//!
//! Expiry is enforced lazily. Nothing sweeps the table; `validate` flips a
//! lapsed license to inactive the first time a client presents it.

use serde::{Deserialize, Serialize};

use crate::{
  entity::{Action, LicenseKind, Severity, history, license, user},
  prelude::*,
  sv::{self, Actor, Device, History, Notification, Recipient, device},
};

/// Mobile activations always run this long, whatever the kind.
pub const ACTIVATION_DAYS: i64 = 30;

const TABLE: &str = "licenses";
const DETAIL_HISTORY: u64 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validated {
  pub id: i32,
  #[serde(rename = "codigo")]
  pub code: String,
  #[serde(rename = "expiry")]
  pub expires_on: Date,
  #[serde(rename = "daysRemaining")]
  pub days_remaining: i64,
}

/// Whether a user's licenses allow a web login.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Standing {
  Valid,
  Inactive,
  Expired,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseFilter {
  #[default]
  All,
  Active,
  Expiring,
  Expired,
  Inactive,
}

#[derive(Debug, Serialize)]
pub struct LicenseRow {
  #[serde(flatten)]
  pub license: license::Model,
  pub owner: Option<user::Model>,
  pub days_remaining: i64,
}

#[derive(Debug, Serialize)]
pub struct LicenseDetails {
  pub license: license::Model,
  pub owner: Option<user::Model>,
  pub days_remaining: i64,
  pub history: Vec<history::Model>,
}

pub struct License<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> License<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  fn history(&self) -> History<'a> {
    History::new(self.db)
  }

  fn notification(&self) -> Notification<'a> {
    Notification::new(self.db)
  }

  pub async fn by_id(&self, id: i32) -> Result<license::Model> {
    license::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::NotFound("License"))
  }

  pub async fn by_code(&self, code: &str) -> Result<Option<license::Model>> {
    let license = license::Entity::find()
      .filter(license::Column::Code.eq(code.trim()))
      .one(self.db)
      .await?;
    Ok(license)
  }

  /// Issues an owned, active license. A device id also replaces the
  /// owner's binding.
  pub async fn create(
    &self,
    admin_id: i32,
    user_id: i32,
    kind: LicenseKind,
    device_id: Option<&str>,
  ) -> Result<license::Model> {
    let user = sv::User::new(self.db).find_active(user_id).await?;
    let days = sv::Settings::new(self.db).durations().await?.days(kind);
    let device = utils::non_blank(device_id);

    let today = utils::today();
    let code = utils::license_code(Some(user_id));

    let txn = self.db.begin().await?;

    if device.is_some() {
      device::bind_on(&txn, user_id, device.as_deref()).await?;
    }

    let license = license::ActiveModel {
      id: NotSet,
      user_id: Set(Some(user_id)),
      code: Set(code),
      kind: Set(kind),
      starts_on: Set(today),
      expires_on: Set(today + TimeDelta::days(days)),
      active: Set(true),
      device_id: Set(device),
      claimed: Set(true),
      modified_by: Set(Some(admin_id)),
      created_at: Set(utils::now()),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!("License {} issued to user #{user_id} for {days} days", license.code);

    self
      .history()
      .record(
        Actor::Admin(admin_id),
        Action::Create,
        TABLE,
        Some(license.id),
        format!(
          "License {} ({}) created for {}",
          license.code,
          kind.as_str(),
          user.name
        ),
      )
      .await;

    self
      .notification()
      .notify(
        Recipient::user(user_id),
        "New license",
        format!(
          "Your {} license {} is active until {}",
          kind.as_str(),
          license.code,
          utils::format_date(license.expires_on)
        ),
        Severity::Success,
      )
      .await;

    Ok(license)
  }

  /// Unowned, inactive stock to be claimed from the mobile app.
  pub async fn provision(
    &self,
    admin_id: i32,
    kind: LicenseKind,
  ) -> Result<license::Model> {
    let days = sv::Settings::new(self.db).durations().await?.days(kind);
    let today = utils::today();

    let license = license::ActiveModel {
      id: NotSet,
      user_id: Set(None),
      code: Set(utils::license_code(None)),
      kind: Set(kind),
      starts_on: Set(today),
      expires_on: Set(today + TimeDelta::days(days)),
      active: Set(false),
      device_id: Set(None),
      claimed: Set(false),
      modified_by: Set(Some(admin_id)),
      created_at: Set(utils::now()),
    }
    .insert(self.db)
    .await?;

    self
      .history()
      .record(
        Actor::Admin(admin_id),
        Action::Create,
        TABLE,
        Some(license.id),
        format!("License {} ({}) provisioned", license.code, kind.as_str()),
      )
      .await;

    Ok(license)
  }

  /// Claims `code` for the calling user on `device_id`.
  ///
  /// Re-activating from the bound device succeeds and restarts the period.
  pub async fn activate(
    &self,
    user_id: i32,
    code: &str,
    device_id: &str,
  ) -> Result<license::Model> {
    let (Some(code), Some(device)) =
      (utils::non_blank(Some(code)), utils::non_blank(Some(device_id)))
    else {
      return Err(Error::validation("License code and device ID are required"));
    };

    let license = self.by_code(&code).await?.ok_or(Error::NotFound("License"))?;

    let bound_elsewhere = license
      .device_id
      .as_deref()
      .is_some_and(|bound| !utils::is_blank(bound) && bound != device);
    if license.claimed && bound_elsewhere {
      return Err(Conflict::LicenseClaimed.into());
    }

    let today = utils::today();
    let license = license::ActiveModel {
      user_id: Set(Some(user_id)),
      device_id: Set(Some(device)),
      starts_on: Set(today),
      expires_on: Set(today + TimeDelta::days(ACTIVATION_DAYS)),
      active: Set(true),
      claimed: Set(true),
      ..license.into()
    }
    .update(self.db)
    .await?;

    self
      .history()
      .record(
        Actor::User(user_id),
        Action::Activate,
        TABLE,
        Some(license.id),
        format!("License {} activated from the mobile app", license.code),
      )
      .await;

    Ok(license)
  }

  /// Restarts the period from today with the current duration for `kind`.
  ///
  /// The owner's device binding is overwritten unconditionally; a blank id
  /// clears it.
  pub async fn renew(
    &self,
    admin_id: i32,
    id: i32,
    kind: LicenseKind,
    device_id: Option<&str>,
  ) -> Result<license::Model> {
    let license = self.by_id(id).await?;
    let days = sv::Settings::new(self.db).durations().await?.days(kind);
    let device = utils::non_blank(device_id);

    let owner = license.user_id;
    let active = license.active || owner.is_some();
    let today = utils::today();

    let txn = self.db.begin().await?;

    if let Some(owner) = owner {
      device::bind_on(&txn, owner, device.as_deref()).await?;
    }

    let license = license::ActiveModel {
      kind: Set(kind),
      starts_on: Set(today),
      expires_on: Set(today + TimeDelta::days(days)),
      device_id: Set(device),
      active: Set(active),
      modified_by: Set(Some(admin_id)),
      ..license.into()
    }
    .update(&txn)
    .await?;

    txn.commit().await?;

    let until = utils::format_date(license.expires_on);
    self
      .history()
      .record(
        Actor::Admin(admin_id),
        Action::Renew,
        TABLE,
        Some(license.id),
        format!(
          "License {} renewed: {} until {until}",
          license.code,
          kind.as_str()
        ),
      )
      .await;

    if let Some(owner) = owner {
      self
        .notification()
        .notify(
          Recipient::user(owner),
          "License renewed",
          format!("Your license {} is valid until {until}", license.code),
          Severity::Success,
        )
        .await;
    }

    Ok(license)
  }

  /// Toggles the flag without touching the dates.
  pub async fn set_active(
    &self,
    admin_id: i32,
    id: i32,
    active: bool,
  ) -> Result<license::Model> {
    let license = self.by_id(id).await?;
    let license = license::ActiveModel {
      active: Set(active),
      modified_by: Set(Some(admin_id)),
      ..license.into()
    }
    .update(self.db)
    .await?;

    let (action, state) = if active {
      (Action::Activate, "activated")
    } else {
      (Action::Deactivate, "deactivated")
    };

    self
      .history()
      .record(
        Actor::Admin(admin_id),
        action,
        TABLE,
        Some(license.id),
        format!("License {} {state}", license.code),
      )
      .await;

    if let Some(owner) = license.user_id {
      self
        .notification()
        .notify(
          Recipient::user(owner),
          "License status",
          format!("Your license {} has been {state}", license.code),
          if active { Severity::Success } else { Severity::Warning },
        )
        .await;
    }

    Ok(license)
  }

  pub async fn delete(&self, admin_id: i32, id: i32) -> Result<()> {
    let license = self.by_id(id).await?;
    let (code, owner) = (license.code.clone(), license.user_id);

    self
      .history()
      .record(
        Actor::Admin(admin_id),
        Action::Delete,
        TABLE,
        Some(id),
        format!("License {code} deleted"),
      )
      .await;

    license.delete(self.db).await?;

    if let Some(owner) = owner {
      self
        .notification()
        .notify(
          Recipient::user(owner),
          "License removed",
          format!("Your license {code} was removed by an administrator"),
          Severity::Warning,
        )
        .await;
    }

    Ok(())
  }

  /// Mobile license check for `user_id` on `device_id`.
  ///
  /// The device is checked before any license is looked up. A lapsed
  /// license is persisted as inactive before `Expired` is returned.
  pub async fn validate(
    &self,
    user_id: i32,
    device_id: &str,
  ) -> Result<Validated> {
    let user = sv::User::new(self.db).find_active(user_id).await?;

    if !Device::matches(&user, device_id) {
      return Err(Error::DeviceMismatch);
    }

    let license = license::Entity::find()
      .filter(license::Column::UserId.eq(user_id))
      .filter(license::Column::Active.eq(true))
      .order_by_desc(license::Column::ExpiresOn)
      .one(self.db)
      .await?
      .ok_or(Error::NotFound("License"))?;

    let days_remaining = utils::days_remaining(license.expires_on, utils::now());

    if days_remaining < 0 {
      let code = license.code.clone();
      license::ActiveModel { active: Set(false), ..license.into() }
        .update(self.db)
        .await?;
      info!("License {code} expired, marked inactive");
      return Err(Error::Expired);
    }

    let license = if license.device_id.as_deref() != Some(device_id) {
      debug!("Syncing device of license {} with its owner", license.code);
      license::ActiveModel {
        device_id: Set(Some(device_id.to_string())),
        ..license.into()
      }
      .update(self.db)
      .await?
    } else {
      license
    };

    Ok(Validated {
      id: license.id,
      code: license.code,
      expires_on: license.expires_on,
      days_remaining,
    })
  }

  pub async fn standing(&self, user_id: i32) -> Result<Standing> {
    let licenses = license::Entity::find()
      .filter(license::Column::UserId.eq(user_id))
      .filter(license::Column::Active.eq(true))
      .all(self.db)
      .await?;

    let today = utils::today();
    let standing = if licenses.is_empty() {
      Standing::Inactive
    } else if licenses.iter().any(|l| l.expires_on >= today) {
      Standing::Valid
    } else {
      Standing::Expired
    };
    Ok(standing)
  }

  pub async fn list(
    &self,
    filter: LicenseFilter,
    search: Option<&str>,
  ) -> Result<Vec<LicenseRow>> {
    let today = utils::today();
    let mut query = license::Entity::find().find_also_related(user::Entity);

    if let Some(term) = utils::non_blank(search) {
      query = query.filter(
        Condition::any()
          .add(user::Column::Name.contains(&term))
          .add(user::Column::Email.contains(&term))
          .add(license::Column::Code.contains(&term)),
      );
    }

    query = match filter {
      LicenseFilter::All => query,
      LicenseFilter::Active => query
        .filter(license::Column::Active.eq(true))
        .filter(license::Column::ExpiresOn.gte(today)),
      LicenseFilter::Expiring => {
        let warning = sv::Settings::new(self.db).warning_days().await?;
        query
          .filter(license::Column::Active.eq(true))
          .filter(
            license::Column::ExpiresOn
              .between(today, today + TimeDelta::days(warning)),
          )
      }
      LicenseFilter::Expired => {
        query.filter(license::Column::ExpiresOn.lt(today))
      }
      LicenseFilter::Inactive => {
        query.filter(license::Column::Active.eq(false))
      }
    };

    let rows = query
      .order_by_desc(license::Column::CreatedAt)
      .order_by_desc(license::Column::Id)
      .all(self.db)
      .await?
      .into_iter()
      .map(|(license, owner)| LicenseRow {
        days_remaining: utils::days_until(license.expires_on, today),
        license,
        owner,
      })
      .collect();

    Ok(rows)
  }

  pub async fn details(&self, id: i32) -> Result<LicenseDetails> {
    let license = self.by_id(id).await?;
    let owner = license.find_related(user::Entity).one(self.db).await?;
    let history = self.history().for_row(TABLE, id, DETAIL_HISTORY).await?;

    Ok(LicenseDetails {
      days_remaining: utils::days_until(license.expires_on, utils::today()),
      license,
      owner,
      history,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{entity::notification, state::AppState, sv::fixtures};

  async fn reload_user(db: &DatabaseConnection, id: i32) -> user::Model {
    user::Entity::find_by_id(id).one(db).await.unwrap().unwrap()
  }

  #[tokio::test]
  async fn test_create_uses_current_durations() {
    let app = AppState::in_memory().await;
    let sv = License::new(&app.db);
    let user = fixtures::user(&app.db, "ana@example.com").await;

    for kind in LicenseKind::ALL {
      let license = sv.create(1, user.id, kind, None).await.unwrap();
      assert_eq!(
        license.expires_on,
        license.starts_on + TimeDelta::days(kind.default_days())
      );
      assert!(license.active);
      assert_eq!(license.user_id, Some(user.id));
    }

    let values =
      BTreeMap::from([("license_days.monthly".to_string(), "45".to_string())]);
    sv::Settings::new(&app.db).update(1, values).await.unwrap();

    let license =
      sv.create(1, user.id, LicenseKind::Monthly, None).await.unwrap();
    assert_eq!(license.expires_on, license.starts_on + TimeDelta::days(45));
  }

  #[tokio::test]
  async fn test_audit_failures_keep_license_changes() {
    let app = AppState::in_memory().await;
    let sv = License::new(&app.db);
    let user = fixtures::user(&app.db, "ana@example.com").await;

    app.db.execute_unprepared("DROP TABLE notifications").await.unwrap();
    app.db.execute_unprepared("DROP TABLE history").await.unwrap();

    let license =
      sv.create(1, user.id, LicenseKind::Monthly, None).await.unwrap();
    assert!(sv.by_id(license.id).await.unwrap().active);

    let renewed = sv
      .renew(1, license.id, LicenseKind::Yearly, Some("phone-a"))
      .await
      .unwrap();
    assert_eq!(sv.by_id(license.id).await.unwrap(), renewed);
    assert_eq!(renewed.kind, LicenseKind::Yearly);
    assert_eq!(
      reload_user(&app.db, user.id).await.device_id.as_deref(),
      Some("phone-a")
    );

    sv.delete(1, license.id).await.unwrap();
    assert!(matches!(
      sv.by_id(license.id).await,
      Err(Error::NotFound("License"))
    ));
  }

  #[tokio::test]
  async fn test_create_binds_device_and_records() {
    let app = AppState::in_memory().await;
    let sv = License::new(&app.db);
    let user = fixtures::user(&app.db, "ana@example.com").await;

    let license = sv
      .create(1, user.id, LicenseKind::Monthly, Some("phone-a"))
      .await
      .unwrap();

    assert!(license.code.starts_with(&format!("LIC-{:05}-", user.id)));
    assert_eq!(license.device_id.as_deref(), Some("phone-a"));
    assert_eq!(
      reload_user(&app.db, user.id).await.device_id.as_deref(),
      Some("phone-a")
    );

    let details = sv.details(license.id).await.unwrap();
    assert_eq!(details.history.len(), 1);
    assert_eq!(details.owner.map(|o| o.id), Some(user.id));

    let inbox = notification::Entity::find()
      .filter(notification::Column::RecipientId.eq(user.id))
      .count(&app.db)
      .await
      .unwrap();
    assert_eq!(inbox, 1);
  }

  #[tokio::test]
  async fn test_create_requires_active_user() {
    let app = AppState::in_memory().await;
    let sv = License::new(&app.db);

    let res = sv.create(1, 404, LicenseKind::Monthly, None).await;
    assert!(matches!(res, Err(Error::NotFound("User"))));

    let user = fixtures::user(&app.db, "off@example.com").await;
    sv::User::new(&app.db).set_active(1, user.id, false).await.unwrap();
    let res = sv.create(1, user.id, LicenseKind::Monthly, None).await;
    assert!(matches!(res, Err(Error::NotFound("User"))));
  }

  #[tokio::test]
  async fn test_activate_is_idempotent_per_device() {
    let app = AppState::in_memory().await;
    let sv = License::new(&app.db);
    let ana = fixtures::user(&app.db, "ana@example.com").await;
    let bea = fixtures::user(&app.db, "bea@example.com").await;

    let stock = sv.provision(1, LicenseKind::Yearly).await.unwrap();
    assert!(!stock.active && !stock.claimed && stock.user_id.is_none());
    assert!(stock.code.starts_with("LIC-00000-"));

    let first = sv.activate(ana.id, &stock.code, "phone-a").await.unwrap();
    let second = sv.activate(ana.id, &stock.code, "phone-a").await.unwrap();

    assert_eq!(first.user_id, second.user_id);
    assert_eq!(first.device_id, second.device_id);
    assert!(second.active && second.claimed);
    // activation ignores the kind
    assert_eq!(
      second.expires_on,
      second.starts_on + TimeDelta::days(ACTIVATION_DAYS)
    );

    let res = sv.activate(bea.id, &stock.code, "phone-b").await;
    assert!(matches!(res, Err(Error::Conflict(Conflict::LicenseClaimed))));

    let res = sv.activate(ana.id, "LIC-UNKNOWN", "phone-a").await;
    assert!(matches!(res, Err(Error::NotFound("License"))));

    let res = sv.activate(ana.id, &stock.code, " ").await;
    assert!(matches!(res, Err(Error::Validation(_))));
  }

  #[tokio::test]
  async fn test_validate_checks_device_first() {
    let app = AppState::in_memory().await;
    let sv = License::new(&app.db);
    let user = fixtures::user(&app.db, "ana@example.com").await;

    sv.create(1, user.id, LicenseKind::Monthly, Some("phone-a"))
      .await
      .unwrap();

    assert!(matches!(
      sv.validate(user.id, "phone-x").await,
      Err(Error::DeviceMismatch)
    ));

    let ok = sv.validate(user.id, "phone-a").await.unwrap();
    assert!((29..=30).contains(&ok.days_remaining));
  }

  #[tokio::test]
  async fn test_validate_without_license() {
    let app = AppState::in_memory().await;
    let sv = License::new(&app.db);
    let user = fixtures::user(&app.db, "ana@example.com").await;
    Device::new(&app.db).register(user.id, "phone-a").await.unwrap();

    assert!(matches!(
      sv.validate(user.id, "phone-a").await,
      Err(Error::NotFound("License"))
    ));
  }

  #[tokio::test]
  async fn test_validate_expires_lazily() {
    let app = AppState::in_memory().await;
    let sv = License::new(&app.db);
    let user = fixtures::user(&app.db, "ana@example.com").await;
    Device::new(&app.db).register(user.id, "phone-a").await.unwrap();
    let lapsed = fixtures::license(&app.db, user.id, -1).await;

    assert!(matches!(sv.validate(user.id, "phone-a").await, Err(Error::Expired)));
    assert!(!sv.by_id(lapsed.id).await.unwrap().active);

    // the inactive row is no longer a candidate
    assert!(matches!(
      sv.validate(user.id, "phone-a").await,
      Err(Error::NotFound("License"))
    ));
  }

  #[tokio::test]
  async fn test_validate_expiring_today_is_still_valid() {
    let app = AppState::in_memory().await;
    let sv = License::new(&app.db);
    let user = fixtures::user(&app.db, "ana@example.com").await;
    Device::new(&app.db).register(user.id, "phone-a").await.unwrap();
    fixtures::license(&app.db, user.id, 0).await;

    let ok = sv.validate(user.id, "phone-a").await.unwrap();
    assert_eq!(ok.days_remaining, 0);
  }

  #[tokio::test]
  async fn test_validate_heals_license_device() {
    let app = AppState::in_memory().await;
    let sv = License::new(&app.db);
    let user = fixtures::user(&app.db, "ana@example.com").await;
    Device::new(&app.db).register(user.id, "phone-a").await.unwrap();
    let license = fixtures::license(&app.db, user.id, 10).await;
    assert_eq!(license.device_id, None);

    let ok = sv.validate(user.id, "phone-a").await.unwrap();
    assert_eq!(ok.id, license.id);
    assert_eq!(
      sv.by_id(license.id).await.unwrap().device_id.as_deref(),
      Some("phone-a")
    );
  }

  #[tokio::test]
  async fn test_validate_picks_latest_expiry() {
    let app = AppState::in_memory().await;
    let sv = License::new(&app.db);
    let user = fixtures::user(&app.db, "ana@example.com").await;
    Device::new(&app.db).register(user.id, "phone-a").await.unwrap();
    fixtures::license(&app.db, user.id, 5).await;
    let longest = fixtures::license(&app.db, user.id, 50).await;

    let ok = sv.validate(user.id, "phone-a").await.unwrap();
    assert_eq!(ok.id, longest.id);
  }

  #[tokio::test]
  async fn test_renew_recomputes_and_rebinds() {
    let app = AppState::in_memory().await;
    let sv = License::new(&app.db);
    let user = fixtures::user(&app.db, "ana@example.com").await;

    let license = sv
      .create(1, user.id, LicenseKind::Monthly, Some("phone-a"))
      .await
      .unwrap();
    let renewed = sv
      .renew(2, license.id, LicenseKind::Yearly, Some("phone-d"))
      .await
      .unwrap();

    let today = utils::today();
    assert_eq!(renewed.kind, LicenseKind::Yearly);
    assert_eq!(renewed.starts_on, today);
    assert_eq!(renewed.expires_on, today + TimeDelta::days(365));
    assert_eq!(renewed.modified_by, Some(2));
    assert_eq!(renewed.device_id.as_deref(), Some("phone-d"));
    assert_eq!(
      reload_user(&app.db, user.id).await.device_id.as_deref(),
      Some("phone-d")
    );

    // blank device clears both copies
    sv.renew(2, license.id, LicenseKind::Yearly, Some("")).await.unwrap();
    assert_eq!(reload_user(&app.db, user.id).await.device_id, None);
    assert_eq!(sv.by_id(license.id).await.unwrap().device_id, None);
  }

  #[tokio::test]
  async fn test_renew_reactivates_expired() {
    let app = AppState::in_memory().await;
    let sv = License::new(&app.db);
    let user = fixtures::user(&app.db, "ana@example.com").await;
    Device::new(&app.db).register(user.id, "phone-a").await.unwrap();
    let lapsed = fixtures::license(&app.db, user.id, -3).await;

    assert!(sv.validate(user.id, "phone-a").await.is_err());
    sv.renew(1, lapsed.id, LicenseKind::Monthly, Some("phone-a"))
      .await
      .unwrap();

    let ok = sv.validate(user.id, "phone-a").await.unwrap();
    assert_eq!(ok.id, lapsed.id);
  }

  #[tokio::test]
  async fn test_concurrent_renewals_last_write_wins() {
    let app = AppState::in_memory().await;
    let user = fixtures::user(&app.db, "ana@example.com").await;
    let license = fixtures::license(&app.db, user.id, 10).await;

    let (sv_a, sv_b) = (License::new(&app.db), License::new(&app.db));
    let (a, b) = tokio::join!(
      sv_a.renew(1, license.id, LicenseKind::Quarterly, None),
      sv_b.renew(2, license.id, LicenseKind::Yearly, None),
    );
    a.unwrap();
    b.unwrap();

    let stored = License::new(&app.db).by_id(license.id).await.unwrap();
    let today = utils::today();
    // no merge: the row reflects exactly one of the writes
    match stored.modified_by {
      Some(1) => {
        assert_eq!(stored.kind, LicenseKind::Quarterly);
        assert_eq!(stored.expires_on, today + TimeDelta::days(90));
      }
      Some(2) => {
        assert_eq!(stored.kind, LicenseKind::Yearly);
        assert_eq!(stored.expires_on, today + TimeDelta::days(365));
      }
      other => panic!("unexpected writer {other:?}"),
    }
  }

  #[tokio::test]
  async fn test_set_active_ignores_dates() {
    let app = AppState::in_memory().await;
    let sv = License::new(&app.db);
    let user = fixtures::user(&app.db, "ana@example.com").await;
    let license = fixtures::license(&app.db, user.id, -5).await;

    let toggled = sv.set_active(1, license.id, false).await.unwrap();
    assert!(!toggled.active);
    let toggled = sv.set_active(1, license.id, true).await.unwrap();
    assert!(toggled.active);
    assert_eq!(toggled.expires_on, license.expires_on);
  }

  #[tokio::test]
  async fn test_delete_records_before_removal() {
    let app = AppState::in_memory().await;
    let sv = License::new(&app.db);
    let user = fixtures::user(&app.db, "ana@example.com").await;
    let license = fixtures::license(&app.db, user.id, 5).await;

    sv.delete(1, license.id).await.unwrap();

    assert!(matches!(sv.by_id(license.id).await, Err(Error::NotFound(_))));
    let trail = History::new(&app.db).for_row(TABLE, license.id, 5).await;
    assert_eq!(trail.unwrap()[0].action, Action::Delete);
    assert!(matches!(sv.delete(1, license.id).await, Err(Error::NotFound(_))));
  }

  #[tokio::test]
  async fn test_standing() {
    let app = AppState::in_memory().await;
    let sv = License::new(&app.db);
    let user = fixtures::user(&app.db, "ana@example.com").await;

    assert_eq!(sv.standing(user.id).await.unwrap(), Standing::Inactive);

    let lapsed = fixtures::license(&app.db, user.id, -1).await;
    assert_eq!(sv.standing(user.id).await.unwrap(), Standing::Expired);

    sv.set_active(1, lapsed.id, false).await.unwrap();
    assert_eq!(sv.standing(user.id).await.unwrap(), Standing::Inactive);

    fixtures::license(&app.db, user.id, 0).await;
    assert_eq!(sv.standing(user.id).await.unwrap(), Standing::Valid);
  }

  #[tokio::test]
  async fn test_list_filters_and_search() {
    let app = AppState::in_memory().await;
    let sv = License::new(&app.db);
    let ana = fixtures::user(&app.db, "ana@example.com").await;
    let bea = fixtures::user(&app.db, "bea@example.com").await;

    fixtures::license(&app.db, ana.id, 3).await;
    fixtures::license(&app.db, ana.id, 100).await;
    fixtures::license(&app.db, bea.id, -4).await;
    let off = fixtures::license(&app.db, bea.id, 40).await;
    sv.set_active(1, off.id, false).await.unwrap();
    sv.provision(1, LicenseKind::Monthly).await.unwrap();

    let db = &app.db;
    let count = |filter| async move {
      License::new(db).list(filter, None).await.unwrap().len()
    };

    assert_eq!(count(LicenseFilter::All).await, 5);
    assert_eq!(count(LicenseFilter::Active).await, 2);
    assert_eq!(count(LicenseFilter::Expiring).await, 1);
    assert_eq!(count(LicenseFilter::Expired).await, 1);
    assert_eq!(count(LicenseFilter::Inactive).await, 2);

    let found = sv.list(LicenseFilter::All, Some("bea@")).await.unwrap();
    assert_eq!(found.len(), 2);

    let unowned = sv.list(LicenseFilter::All, Some("LIC-00000")).await.unwrap();
    assert_eq!(unowned.len(), 1);
    assert!(unowned[0].owner.is_none());
  }
}

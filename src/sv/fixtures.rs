//! Rows shared by the service tests.

use crate::{
  entity::{LicenseKind, admin, license, user},
  password,
  prelude::*,
};

pub const PASSWORD: &str = "secret-pass";

pub async fn admin(db: &DatabaseConnection, email: &str) -> admin::Model {
  admin::ActiveModel {
    id: NotSet,
    name: Set("Admin".into()),
    email: Set(email.into()),
    phone: Set(None),
    password_hash: Set(password::hash(PASSWORD).unwrap()),
    active: Set(true),
    last_seen_at: Set(None),
    created_at: Set(utils::now()),
  }
  .insert(db)
  .await
  .unwrap()
}

pub async fn user(db: &DatabaseConnection, email: &str) -> user::Model {
  user::ActiveModel {
    id: NotSet,
    name: Set("Rider".into()),
    email: Set(email.into()),
    phone: Set(Some("555-0100".into())),
    password_hash: Set(password::hash(PASSWORD).unwrap()),
    active: Set(true),
    device_id: Set(None),
    last_seen_at: Set(None),
    created_at: Set(utils::now()),
  }
  .insert(db)
  .await
  .unwrap()
}

/// Active license owned by `user_id`, expiring `expires_in` days from today.
pub async fn license(
  db: &DatabaseConnection,
  user_id: i32,
  expires_in: i64,
) -> license::Model {
  let today = utils::today();
  license::ActiveModel {
    id: NotSet,
    user_id: Set(Some(user_id)),
    code: Set(utils::license_code(Some(user_id))),
    kind: Set(LicenseKind::Monthly),
    starts_on: Set(today - TimeDelta::days(30)),
    expires_on: Set(today + TimeDelta::days(expires_in)),
    active: Set(true),
    device_id: Set(None),
    claimed: Set(true),
    modified_by: Set(None),
    created_at: Set(utils::now()),
  }
  .insert(db)
  .await
  .unwrap()
}

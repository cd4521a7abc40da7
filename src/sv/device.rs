//! Device binding for user accounts.
//!
//! A user binds one device through the mobile app. Only administrators can
//! replace an existing binding.

use crate::{entity::user, prelude::*};

pub struct Device<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Device<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// First self-service binding. Fails once any device is registered.
  pub async fn register(&self, user_id: i32, device_id: &str) -> Result<String> {
    let device_id = utils::non_blank(Some(device_id))
      .ok_or_else(|| Error::validation("Device ID is required"))?;

    let user = user::Entity::find_by_id(user_id)
      .one(self.db)
      .await?
      .ok_or(Error::NotFound("User"))?;

    if user.has_device() {
      return Err(Conflict::DeviceRegistered.into());
    }

    user::ActiveModel { device_id: Set(Some(device_id.clone())), ..user.into() }
      .update(self.db)
      .await?;

    info!("Device registered for user #{user_id}");
    Ok(device_id)
  }

  /// Administrative overwrite; blank clears the binding.
  pub async fn bind(&self, user_id: i32, device_id: Option<&str>) -> Result<()> {
    bind_on(self.db, user_id, device_id).await
  }

  pub fn matches(user: &user::Model, device_id: &str) -> bool {
    user.device_id.as_deref() == Some(device_id)
  }
}

pub(crate) async fn bind_on<C: ConnectionTrait>(
  conn: &C,
  user_id: i32,
  device_id: Option<&str>,
) -> Result<()> {
  let user = user::Entity::find_by_id(user_id)
    .one(conn)
    .await?
    .ok_or(Error::NotFound("User"))?;

  user::ActiveModel { device_id: Set(utils::non_blank(device_id)), ..user.into() }
    .update(conn)
    .await?;

  Ok(())
}

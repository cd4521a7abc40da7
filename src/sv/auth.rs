//! Credential checks, token issuance and the per-request gate.

use serde::Serialize;

use crate::{
  entity::{Action, Role, admin, user},
  password,
  prelude::*,
  sv::{self, Actor, History, NewUser, Standing, device},
  token::{Lifetime, Tokens},
};

const ALLOW_REGISTRATION: &str = "allow_registration";

/// An authenticated account.
#[derive(Debug, Clone, PartialEq)]
pub enum Principal {
  Admin(admin::Model),
  User(user::Model),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
  pub id: i32,
  pub name: String,
  pub email: String,
  pub phone: Option<String>,
  pub role: Role,
}

impl Principal {
  pub fn id(&self) -> i32 {
    match self {
      Principal::Admin(admin) => admin.id,
      Principal::User(user) => user.id,
    }
  }

  pub fn email(&self) -> &str {
    match self {
      Principal::Admin(admin) => &admin.email,
      Principal::User(user) => &user.email,
    }
  }

  pub fn role(&self) -> Role {
    match self {
      Principal::Admin(_) => Role::Admin,
      Principal::User(_) => Role::User,
    }
  }

  pub fn profile(&self) -> Profile {
    let (name, phone) = match self {
      Principal::Admin(admin) => (&admin.name, &admin.phone),
      Principal::User(user) => (&user.name, &user.phone),
    };

    Profile {
      id: self.id(),
      name: name.clone(),
      email: self.email().to_string(),
      phone: phone.clone(),
      role: self.role(),
    }
  }
}

#[derive(Debug, Clone)]
pub struct Login {
  pub token: String,
  pub principal: Principal,
}

pub struct Auth<'a> {
  db: &'a DatabaseConnection,
  tokens: &'a Tokens,
}

impl<'a> Auth<'a> {
  pub fn new(db: &'a DatabaseConnection, tokens: &'a Tokens) -> Self {
    Self { db, tokens }
  }

  pub fn issue(&self, principal: &Principal, lifetime: Lifetime) -> Result<String> {
    self.tokens.issue(
      principal.id(),
      principal.email(),
      principal.role(),
      lifetime,
    )
  }

  async fn active_user(&self, email: &str, password: &str) -> Result<user::Model> {
    let user = user::Entity::find()
      .filter(user::Column::Email.eq(email))
      .filter(user::Column::Active.eq(true))
      .one(self.db)
      .await?
      .ok_or(AuthError::InvalidCredentials)?;

    if !password::verify(password, &user.password_hash) {
      return Err(AuthError::InvalidCredentials.into());
    }
    Ok(user)
  }

  /// Web credential check.
  ///
  /// Admins are tried first. Users also need a live license; the license
  /// errors are only reported once the password is known to be right.
  pub async fn authenticate(
    &self,
    email: &str,
    password: &str,
  ) -> Result<Principal> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
      return Err(Error::validation("Email and password are required"));
    }

    let admin = admin::Entity::find()
      .filter(admin::Column::Email.eq(email))
      .filter(admin::Column::Active.eq(true))
      .one(self.db)
      .await?;

    if let Some(admin) = admin
      && password::verify(password, &admin.password_hash)
    {
      sv::Admin::new(self.db).touch(admin.id).await?;
      History::new(self.db)
        .record(
          Actor::Admin(admin.id),
          Action::Login,
          "admins",
          Some(admin.id),
          "Administrator logged in",
        )
        .await;
      return Ok(Principal::Admin(admin));
    }

    let user = self.active_user(email, password).await?;

    match sv::License::new(self.db).standing(user.id).await? {
      Standing::Valid => {}
      Standing::Inactive => return Err(AuthError::LicenseInactive.into()),
      Standing::Expired => return Err(AuthError::LicenseExpired.into()),
    }

    sv::User::new(self.db).touch(user.id).await?;
    Ok(Principal::User(user))
  }

  pub async fn login(&self, email: &str, password: &str) -> Result<Login> {
    let principal = self.authenticate(email, password).await?;
    let token = self.issue(&principal, Lifetime::Web)?;
    Ok(Login { token, principal })
  }

  /// Mobile sign-in. No license is required so a fresh account can
  /// activate its first code.
  pub async fn mobile_login(&self, email: &str, password: &str) -> Result<Login> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
      return Err(Error::validation("Email and password are required"));
    }

    let user = self.active_user(email, password).await?;
    sv::User::new(self.db).touch(user.id).await?;

    let principal = Principal::User(user);
    let token = self.issue(&principal, Lifetime::Mobile)?;
    Ok(Login { token, principal })
  }

  pub async fn register(
    &self,
    new: NewUser,
    device_id: Option<&str>,
  ) -> Result<Login> {
    let settings = sv::Settings::new(self.db);
    if settings.value(ALLOW_REGISTRATION).await?.as_deref() == Some("false") {
      return Err(Error::validation("Registration is currently disabled"));
    }

    if new.phone.as_deref().is_none_or(utils::is_blank) {
      return Err(Error::validation(
        "Name, email, phone and password are required",
      ));
    }

    let mut user = sv::User::new(self.db).register(new).await?;

    if let Some(device) = utils::non_blank(device_id) {
      device::bind_on(self.db, user.id, Some(&device)).await?;
      user.device_id = Some(device);
    }

    History::new(self.db)
      .record(
        Actor::User(user.id),
        Action::Create,
        "users",
        Some(user.id),
        format!("User registered from the mobile app: {}", user.email),
      )
      .await;

    let principal = Principal::User(user);
    let token = self.issue(&principal, Lifetime::Mobile)?;
    Ok(Login { token, principal })
  }

  /// Resolves a token to a live account. Never fails: a bad signature, an
  /// expired token, a deactivated account or a store error all give `None`.
  pub async fn authorize(&self, token: &str) -> Option<Principal> {
    let claims = self.tokens.verify(token)?;

    let found = match claims.role {
      Role::Admin => admin::Entity::find_by_id(claims.id)
        .filter(admin::Column::Active.eq(true))
        .one(self.db)
        .await
        .map(|admin| admin.map(Principal::Admin)),
      Role::User => user::Entity::find_by_id(claims.id)
        .filter(user::Column::Active.eq(true))
        .one(self.db)
        .await
        .map(|user| user.map(Principal::User)),
    };

    found
      .inspect_err(|err| warn!("Failed to resolve session #{}: {err}", claims.id))
      .ok()
      .flatten()
  }

  pub async fn logout(&self, principal: &Principal) {
    if let Principal::Admin(admin) = principal {
      History::new(self.db)
        .record(
          Actor::Admin(admin.id),
          Action::Logout,
          "admins",
          Some(admin.id),
          "Administrator logged out",
        )
        .await;
    }
  }
}

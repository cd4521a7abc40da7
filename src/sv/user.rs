use serde::{Deserialize, Serialize};

use crate::{
  entity::{Action, Severity, license, user},
  password,
  prelude::*,
  sv::{Actor, History, Notification, Recipient},
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
  #[serde(alias = "nombre")]
  pub name: String,
  pub email: String,
  #[serde(default, alias = "telefono")]
  pub phone: Option<String>,
  pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserEdit {
  #[serde(alias = "nombre")]
  pub name: String,
  pub email: String,
  #[serde(default, alias = "telefono")]
  pub phone: Option<String>,
  /// Left unchanged when blank
  #[serde(default)]
  pub password: Option<String>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UserFilter {
  #[default]
  All,
  Active,
  Inactive,
  WithLicense,
  WithoutLicense,
}

#[derive(Debug, Serialize)]
pub struct UserRow {
  #[serde(flatten)]
  pub user: user::Model,
  pub licenses: usize,
  pub has_active_license: bool,
}

pub struct User<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> User<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn by_id(&self, id: i32) -> Result<Option<user::Model>> {
    Ok(user::Entity::find_by_id(id).one(self.db).await?)
  }

  pub async fn by_email(&self, email: &str) -> Result<Option<user::Model>> {
    let user = user::Entity::find()
      .filter(user::Column::Email.eq(email.trim()))
      .one(self.db)
      .await?;
    Ok(user)
  }

  pub async fn find_active(&self, id: i32) -> Result<user::Model> {
    user::Entity::find_by_id(id)
      .filter(user::Column::Active.eq(true))
      .one(self.db)
      .await?
      .ok_or(Error::NotFound("User"))
  }

  pub async fn touch(&self, id: i32) -> Result<()> {
    user::Entity::update_many()
      .col_expr(
        user::Column::LastSeenAt,
        sea_orm::sea_query::Expr::value(utils::now()),
      )
      .filter(user::Column::Id.eq(id))
      .exec(self.db)
      .await?;
    Ok(())
  }

  /// Inserts an active account with a hashed password.
  pub async fn register(&self, new: NewUser) -> Result<user::Model> {
    if utils::is_blank(&new.name)
      || utils::is_blank(&new.email)
      || utils::is_blank(&new.password)
    {
      return Err(Error::validation("Name, email and password are required"));
    }

    let email = new.email.trim().to_string();
    if self.by_email(&email).await?.is_some() {
      return Err(Conflict::EmailTaken.into());
    }

    let user = user::ActiveModel {
      id: NotSet,
      name: Set(new.name.trim().to_string()),
      email: Set(email),
      phone: Set(utils::non_blank(new.phone.as_deref())),
      password_hash: Set(password::hash(&new.password)?),
      active: Set(true),
      device_id: Set(None),
      last_seen_at: Set(None),
      created_at: Set(utils::now()),
    };

    Ok(user.insert(self.db).await?)
  }

  pub async fn create(&self, admin_id: i32, new: NewUser) -> Result<user::Model> {
    let user = self.register(new).await?;

    History::new(self.db)
      .record(
        Actor::Admin(admin_id),
        Action::Create,
        "users",
        Some(user.id),
        format!("User created: {} ({})", user.name, user.email),
      )
      .await;

    Notification::new(self.db)
      .notify(
        Recipient::user(user.id),
        "Welcome",
        format!("Welcome {}! Your account is ready.", user.name),
        Severity::Success,
      )
      .await;

    Ok(user)
  }

  pub async fn edit(
    &self,
    admin_id: i32,
    id: i32,
    edit: UserEdit,
  ) -> Result<user::Model> {
    if utils::is_blank(&edit.name) || utils::is_blank(&edit.email) {
      return Err(Error::validation("Name and email are required"));
    }

    let user = self.by_id(id).await?.ok_or(Error::NotFound("User"))?;

    let email = edit.email.trim().to_string();
    let taken = user::Entity::find()
      .filter(user::Column::Email.eq(email.as_str()))
      .filter(user::Column::Id.ne(id))
      .count(self.db)
      .await?;
    if taken > 0 {
      return Err(Conflict::EmailTaken.into());
    }

    let new_password = utils::non_blank(edit.password.as_deref());
    let mut model: user::ActiveModel = user.into();
    model.name = Set(edit.name.trim().to_string());
    model.email = Set(email);
    model.phone = Set(utils::non_blank(edit.phone.as_deref()));
    if let Some(new_password) = &new_password {
      model.password_hash = Set(password::hash(new_password)?);
    }

    let user = model.update(self.db).await?;

    let detail = if new_password.is_some() {
      format!("User updated: {} (password changed)", user.name)
    } else {
      format!("User updated: {}", user.name)
    };
    History::new(self.db)
      .record(Actor::Admin(admin_id), Action::Update, "users", Some(id), detail)
      .await;

    Notification::new(self.db)
      .notify(
        Recipient::user(id),
        "Account updated",
        "Your account details were updated by an administrator",
        Severity::Info,
      )
      .await;

    Ok(user)
  }

  pub async fn set_active(
    &self,
    admin_id: i32,
    id: i32,
    active: bool,
  ) -> Result<user::Model> {
    let user = self.by_id(id).await?.ok_or(Error::NotFound("User"))?;
    let user = user::ActiveModel { active: Set(active), ..user.into() }
      .update(self.db)
      .await?;

    let (action, state) = if active {
      (Action::Activate, "activated")
    } else {
      (Action::Deactivate, "deactivated")
    };

    History::new(self.db)
      .record(
        Actor::Admin(admin_id),
        action,
        "users",
        Some(id),
        format!("User {state}: {}", user.name),
      )
      .await;

    Notification::new(self.db)
      .notify(
        Recipient::user(id),
        "Account status",
        format!("Your account has been {state}"),
        if active { Severity::Success } else { Severity::Warning },
      )
      .await;

    Ok(user)
  }

  /// Licenses and trips go with the account.
  pub async fn delete(&self, admin_id: i32, id: i32) -> Result<()> {
    let user = self.by_id(id).await?.ok_or(Error::NotFound("User"))?;

    History::new(self.db)
      .record(
        Actor::Admin(admin_id),
        Action::Delete,
        "users",
        Some(id),
        format!("User deleted: {} ({})", user.name, user.email),
      )
      .await;

    user.delete(self.db).await?;
    Ok(())
  }

  pub async fn list(
    &self,
    filter: UserFilter,
    search: Option<&str>,
  ) -> Result<Vec<UserRow>> {
    let mut query = user::Entity::find();

    if let Some(term) = utils::non_blank(search) {
      query = query.filter(
        Condition::any()
          .add(user::Column::Name.contains(&term))
          .add(user::Column::Email.contains(&term))
          .add(user::Column::Phone.contains(&term)),
      );
    }

    query = match filter {
      UserFilter::Active => query.filter(user::Column::Active.eq(true)),
      UserFilter::Inactive => query.filter(user::Column::Active.eq(false)),
      _ => query,
    };

    let today = utils::today();
    let rows = query
      .order_by_desc(user::Column::CreatedAt)
      .order_by_desc(user::Column::Id)
      .find_with_related(license::Entity)
      .all(self.db)
      .await?
      .into_iter()
      .map(|(user, licenses)| UserRow {
        has_active_license: licenses
          .iter()
          .any(|l| l.active && l.expires_on >= today),
        licenses: licenses.len(),
        user,
      })
      .filter(|row| match filter {
        UserFilter::WithLicense => row.licenses > 0,
        UserFilter::WithoutLicense => row.licenses == 0,
        _ => true,
      })
      .collect();

    Ok(rows)
  }
}

use sea_orm::sea_query::Expr;

use crate::{
  entity::{Action, Severity, admin},
  password,
  prelude::*,
  state::AdminSeed,
  sv::{Actor, History, Notification, Recipient},
};

/// Outcome of the startup administrator check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bootstrap {
  /// Some active admin already exists
  Skipped,
  Reactivated(i32),
  Created(i32),
}

pub struct Admin<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Admin<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn by_id(&self, id: i32) -> Result<Option<admin::Model>> {
    Ok(admin::Entity::find_by_id(id).one(self.db).await?)
  }

  pub async fn touch(&self, id: i32) -> Result<()> {
    admin::Entity::update_many()
      .col_expr(admin::Column::LastSeenAt, Expr::value(utils::now()))
      .filter(admin::Column::Id.eq(id))
      .exec(self.db)
      .await?;
    Ok(())
  }

  pub async fn bootstrap(&self, seed: &AdminSeed) -> Result<Bootstrap> {
    let active = admin::Entity::find()
      .filter(admin::Column::Active.eq(true))
      .count(self.db)
      .await?;
    if active > 0 {
      return Ok(Bootstrap::Skipped);
    }

    let history = History::new(self.db);
    let password_hash = password::hash(&seed.password)?;

    let existing = admin::Entity::find()
      .filter(admin::Column::Email.eq(seed.email.as_str()))
      .one(self.db)
      .await?;

    if let Some(admin) = existing {
      let admin = admin::ActiveModel {
        active: Set(true),
        password_hash: Set(password_hash),
        ..admin.into()
      }
      .update(self.db)
      .await?;

      history
        .record(
          Actor::System,
          Action::Reactivate,
          "admins",
          Some(admin.id),
          format!("Administrator reactivated: {}", admin.email),
        )
        .await;

      return Ok(Bootstrap::Reactivated(admin.id));
    }

    let admin = admin::ActiveModel {
      id: NotSet,
      name: Set(seed.name.clone()),
      email: Set(seed.email.clone()),
      phone: Set(seed.phone.clone()),
      password_hash: Set(password_hash),
      active: Set(true),
      last_seen_at: Set(None),
      created_at: Set(utils::now()),
    }
    .insert(self.db)
    .await?;

    history
      .record(
        Actor::System,
        Action::Create,
        "admins",
        Some(admin.id),
        format!("Initial administrator created: {}", admin.email),
      )
      .await;

    Notification::new(self.db)
      .notify(
        Recipient::admin(admin.id),
        "Welcome",
        format!(
          "Welcome {}! The system is ready. Review the configuration before \
           issuing licenses.",
          admin.name
        ),
        Severity::Success,
      )
      .await;

    Ok(Bootstrap::Created(admin.id))
  }
}

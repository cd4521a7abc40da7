//! Per-recipient inbox.
//!
//! `notify` is the fire-and-forget path used by other services; the remaining
//! operations back the inbox endpoints and report errors normally.

use sea_orm::sea_query::Expr;
use serde::{Deserialize, Serialize};

use crate::{
  entity::{Role, Severity, license, notification, user},
  prelude::*,
};

pub const EXPIRING_TITLE: &str = "License about to expire";
pub const EXPIRED_TITLE: &str = "License expired";

const LIST_LIMIT: u64 = 100;
const RECENT_LIMIT: u64 = 5;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Recipient {
  pub role: Role,
  pub id: i32,
}

impl Recipient {
  pub fn admin(id: i32) -> Self {
    Self { role: Role::Admin, id }
  }

  pub fn user(id: i32) -> Self {
    Self { role: Role::User, id }
  }

  fn condition(self) -> Condition {
    Condition::all()
      .add(notification::Column::RecipientKind.eq(self.role))
      .add(notification::Column::RecipientId.eq(self.id))
  }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
  #[default]
  All,
  Unread,
  Expiring,
  Expired,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
  pub total: u64,
  pub unread: u64,
  pub expiring: u64,
  pub expired: u64,
}

#[derive(Debug, Serialize)]
pub struct Inbox {
  pub notifications: Vec<notification::Model>,
  pub stats: Counters,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct BySeverity {
  pub info: u64,
  pub success: u64,
  pub warning: u64,
  pub error: u64,
}

#[derive(Debug, Serialize)]
pub struct Summary {
  pub total: u64,
  pub unread: u64,
  pub by_severity: BySeverity,
  pub recent: Vec<notification::Model>,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct Generated {
  pub expiring: u64,
  pub expired: u64,
}

pub struct Notification<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Notification<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Best effort: failures are logged and swallowed.
  pub async fn notify(
    &self,
    to: Recipient,
    title: &str,
    body: impl Into<String>,
    severity: Severity,
  ) {
    if let Err(err) = self.insert(to, title, body.into(), severity).await {
      warn!("Failed to notify {:?} #{}: {err}", to.role, to.id);
    }
  }

  async fn insert(
    &self,
    to: Recipient,
    title: &str,
    body: String,
    severity: Severity,
  ) -> Result<notification::Model> {
    let model = notification::ActiveModel {
      id: NotSet,
      recipient_kind: Set(to.role),
      recipient_id: Set(to.id),
      title: Set(title.to_string()),
      body: Set(body),
      severity: Set(severity),
      read: Set(false),
      created_at: Set(utils::now()),
      read_at: Set(None),
    };
    Ok(model.insert(self.db).await?)
  }

  /// Explicit note, title and body required.
  pub async fn create(
    &self,
    to: Recipient,
    title: &str,
    body: &str,
    severity: Severity,
  ) -> Result<notification::Model> {
    if utils::is_blank(title) || utils::is_blank(body) {
      return Err(Error::validation("Title and message are required"));
    }
    self.insert(to, title.trim(), body.trim().to_string(), severity).await
  }

  /// Admin message to an active user.
  pub async fn send_to_user(
    &self,
    user_id: i32,
    title: &str,
    body: &str,
    severity: Severity,
  ) -> Result<notification::Model> {
    user::Entity::find_by_id(user_id)
      .filter(user::Column::Active.eq(true))
      .one(self.db)
      .await?
      .ok_or(Error::NotFound("User"))?;

    self.create(Recipient::user(user_id), title, body, severity).await
  }

  pub async fn list(&self, to: Recipient, filter: Filter) -> Result<Inbox> {
    let mut query = notification::Entity::find().filter(to.condition());

    query = match filter {
      Filter::All => query,
      Filter::Unread => query.filter(notification::Column::Read.eq(false)),
      Filter::Expiring => {
        query.filter(notification::Column::Title.eq(EXPIRING_TITLE))
      }
      Filter::Expired => {
        query.filter(notification::Column::Title.eq(EXPIRED_TITLE))
      }
    };

    let notifications = query
      .order_by_desc(notification::Column::CreatedAt)
      .order_by_desc(notification::Column::Id)
      .limit(LIST_LIMIT)
      .all(self.db)
      .await?;

    Ok(Inbox { notifications, stats: self.counters(to).await? })
  }

  async fn count(&self, to: Recipient, extra: Condition) -> Result<u64> {
    let count = notification::Entity::find()
      .filter(to.condition())
      .filter(extra)
      .count(self.db)
      .await?;
    Ok(count)
  }

  pub async fn counters(&self, to: Recipient) -> Result<Counters> {
    Ok(Counters {
      total: self.count(to, Condition::all()).await?,
      unread: self
        .count(to, Condition::all().add(notification::Column::Read.eq(false)))
        .await?,
      expiring: self
        .count(
          to,
          Condition::all().add(notification::Column::Title.eq(EXPIRING_TITLE)),
        )
        .await?,
      expired: self
        .count(
          to,
          Condition::all().add(notification::Column::Title.eq(EXPIRED_TITLE)),
        )
        .await?,
    })
  }

  async fn owned(
    &self,
    to: Recipient,
    id: i32,
  ) -> Result<notification::Model> {
    notification::Entity::find_by_id(id)
      .filter(to.condition())
      .one(self.db)
      .await?
      .ok_or(Error::NotFound("Notification"))
  }

  pub async fn mark_read(&self, to: Recipient, id: i32) -> Result<()> {
    let model = self.owned(to, id).await?;
    if model.read {
      return Ok(());
    }

    notification::ActiveModel {
      read: Set(true),
      read_at: Set(Some(utils::now())),
      ..model.into()
    }
    .update(self.db)
    .await?;

    Ok(())
  }

  pub async fn mark_all_read(&self, to: Recipient) -> Result<u64> {
    let res = notification::Entity::update_many()
      .col_expr(notification::Column::Read, Expr::value(true))
      .col_expr(notification::Column::ReadAt, Expr::value(utils::now()))
      .filter(to.condition())
      .filter(notification::Column::Read.eq(false))
      .exec(self.db)
      .await?;
    Ok(res.rows_affected)
  }

  pub async fn delete(&self, to: Recipient, id: i32) -> Result<()> {
    let model = self.owned(to, id).await?;
    model.delete(self.db).await?;
    Ok(())
  }

  pub async fn summary(&self, to: Recipient) -> Result<Summary> {
    let severity = |severity: Severity| {
      Condition::all().add(notification::Column::Severity.eq(severity))
    };

    let by_severity = BySeverity {
      info: self.count(to, severity(Severity::Info)).await?,
      success: self.count(to, severity(Severity::Success)).await?,
      warning: self.count(to, severity(Severity::Warning)).await?,
      error: self.count(to, severity(Severity::Error)).await?,
    };

    let recent = notification::Entity::find()
      .filter(to.condition())
      .order_by_desc(notification::Column::CreatedAt)
      .order_by_desc(notification::Column::Id)
      .limit(RECENT_LIMIT)
      .all(self.db)
      .await?;

    Ok(Summary {
      total: self.count(to, Condition::all()).await?,
      unread: self
        .count(to, Condition::all().add(notification::Column::Read.eq(false)))
        .await?,
      by_severity,
      recent,
    })
  }

  /// Drops read notifications older than `older_than_days`.
  pub async fn cleanup(
    &self,
    to: Recipient,
    older_than_days: i64,
  ) -> Result<u64> {
    if older_than_days < 1 {
      return Err(Error::validation("Retention must be at least one day"));
    }

    let cutoff = utils::now() - TimeDelta::days(older_than_days);
    let res = notification::Entity::delete_many()
      .filter(to.condition())
      .filter(notification::Column::Read.eq(true))
      .filter(notification::Column::CreatedAt.lt(cutoff))
      .exec(self.db)
      .await?;
    Ok(res.rows_affected)
  }

  /// Scans active licenses and alerts `admin_id` about the ones expiring
  /// within `warning_days` or already past expiry.
  ///
  /// An alert for the same code and title raised by any admin in the last
  /// 24 hours suppresses a new one, so repeated runs are idempotent.
  pub async fn generate_expiry_alerts(
    &self,
    admin_id: i32,
    warning_days: i64,
  ) -> Result<Generated> {
    let today = utils::today();
    let licenses = license::Entity::find()
      .filter(license::Column::Active.eq(true))
      .filter(license::Column::UserId.is_not_null())
      .find_also_related(user::Entity)
      .all(self.db)
      .await?;

    let mut generated = Generated::default();
    for (license, owner) in licenses {
      let Some(owner) = owner else { continue };
      let days = utils::days_until(license.expires_on, today);

      let (title, body, severity) = if days < 0 {
        let body = format!(
          "The license {} of {} expired on {}",
          license.code,
          owner.name,
          utils::format_date(license.expires_on)
        );
        (EXPIRED_TITLE, body, Severity::Error)
      } else if days > 0 && days <= warning_days {
        let body = format!(
          "The license {} of {} expires in {days} day(s)",
          license.code, owner.name
        );
        (EXPIRING_TITLE, body, Severity::Warning)
      } else {
        continue;
      };

      if self.recently_alerted(title, &license.code).await? {
        continue;
      }

      self.insert(Recipient::admin(admin_id), title, body, severity).await?;
      match title {
        EXPIRED_TITLE => generated.expired += 1,
        _ => generated.expiring += 1,
      }
    }

    if generated != Generated::default() {
      info!(
        "Generated {} expiring and {} expired license alerts",
        generated.expiring, generated.expired
      );
    }

    Ok(generated)
  }

  async fn recently_alerted(&self, title: &str, code: &str) -> Result<bool> {
    let since = utils::now() - TimeDelta::days(1);
    let count = notification::Entity::find()
      .filter(notification::Column::RecipientKind.eq(Role::Admin))
      .filter(notification::Column::Title.eq(title))
      .filter(notification::Column::Body.contains(code))
      .filter(notification::Column::CreatedAt.gte(since))
      .count(self.db)
      .await?;
    Ok(count > 0)
  }
}

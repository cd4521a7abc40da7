//! Audit trail writer.
//!
//! Recording is best effort: a failed insert is logged and never fails the
//! operation being audited.

use crate::{
  entity::{Action, ActorKind, history},
  prelude::*,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Actor {
  Admin(i32),
  User(i32),
  System,
}

impl Actor {
  fn parts(self) -> (ActorKind, Option<i32>) {
    match self {
      Actor::Admin(id) => (ActorKind::Admin, Some(id)),
      Actor::User(id) => (ActorKind::User, Some(id)),
      Actor::System => (ActorKind::System, None),
    }
  }
}

pub struct History<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> History<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn record(
    &self,
    actor: Actor,
    action: Action,
    table: &str,
    row_id: Option<i32>,
    detail: impl Into<String>,
  ) {
    let (actor_kind, actor_id) = actor.parts();

    let entry = history::ActiveModel {
      id: NotSet,
      actor_kind: Set(actor_kind),
      actor_id: Set(actor_id),
      action: Set(action),
      table_name: Set(table.to_string()),
      row_id: Set(row_id),
      detail: Set(detail.into()),
      created_at: Set(utils::now()),
    };

    if let Err(err) = entry.insert(self.db).await {
      warn!("Failed to record {action:?} on `{table}`: {err}");
    }
  }

  /// Most recent entries for one row, newest first.
  pub async fn for_row(
    &self,
    table: &str,
    row_id: i32,
    limit: u64,
  ) -> Result<Vec<history::Model>> {
    let entries = history::Entity::find()
      .filter(history::Column::TableName.eq(table))
      .filter(history::Column::RowId.eq(row_id))
      .order_by_desc(history::Column::CreatedAt)
      .order_by_desc(history::Column::Id)
      .limit(limit)
      .all(self.db)
      .await?;
    Ok(entries)
  }

  pub async fn cleanup(&self, older_than_days: i64) -> Result<u64> {
    if older_than_days < 1 {
      return Err(Error::validation("Retention must be at least one day"));
    }

    let cutoff = utils::now() - TimeDelta::days(older_than_days);
    let res = history::Entity::delete_many()
      .filter(history::Column::CreatedAt.lt(cutoff))
      .exec(self.db)
      .await?;

    info!("Removed {} history entries older than {cutoff}", res.rows_affected);
    Ok(res.rows_affected)
  }
}

//! Trip analytics logged by the mobile app. Every row is owned by the
//! calling user.

use serde::{Deserialize, Serialize};

use crate::{
  entity::{group_analysis, screenshot, trip, trip_analysis, trip_group},
  prelude::*,
};

pub const HISTORY_LIMIT: u64 = 50;

/// Figures shared by single trips and group analyses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripMetrics {
  #[serde(default, alias = "id_grupo")]
  pub group_id: Option<i32>,
  #[serde(default, alias = "nombre_grupo")]
  pub group_name: Option<String>,
  #[serde(alias = "monto", alias = "ganancia_total")]
  pub amount: f64,
  #[serde(alias = "km_total")]
  pub km: f64,
  #[serde(alias = "min_total")]
  pub minutes: f64,
  #[serde(default, alias = "mxn_por_km")]
  pub per_km: f64,
  #[serde(default, alias = "mxn_por_min")]
  pub per_minute: f64,
  #[serde(default, alias = "mxn_por_hora")]
  pub per_hour: f64,
  #[serde(default, alias = "num_capturas")]
  pub captures: Option<i32>,
}

impl TripMetrics {
  const FIELDS: [&'static str; 19] = [
    "group_id",
    "id_grupo",
    "group_name",
    "nombre_grupo",
    "amount",
    "monto",
    "ganancia_total",
    "km",
    "km_total",
    "minutes",
    "min_total",
    "per_km",
    "mxn_por_km",
    "per_minute",
    "mxn_por_min",
    "per_hour",
    "mxn_por_hora",
    "captures",
    "num_capturas",
  ];

  /// Splits a flat analysis body into the metrics and the remaining
  /// highlight fields.
  pub fn split(body: json::Value) -> Result<(Self, json::Value)> {
    let metrics: Self = json::from_value(body.clone())
      .map_err(|err| Error::validation(format!("Invalid analysis: {err}")))?;

    let highlights = match body {
      json::Value::Object(mut fields) => {
        fields.retain(|key, _| !Self::FIELDS.contains(&key.as_str()));
        fields.remove("highlights").unwrap_or(json::Value::Object(fields))
      }
      _ => json::Value::Object(Default::default()),
    };

    Ok((metrics, highlights))
  }
}

pub struct Trip<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Trip<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn save(&self, user_id: i32, metrics: TripMetrics) -> Result<trip::Model> {
    Ok(insert_trip(self.db, user_id, &metrics).await?)
  }

  pub async fn history(&self, user_id: i32, limit: u64) -> Result<Vec<trip::Model>> {
    let trips = trip::Entity::find()
      .filter(trip::Column::UserId.eq(user_id))
      .order_by_desc(trip::Column::CreatedAt)
      .order_by_desc(trip::Column::Id)
      .limit(limit.clamp(1, 500))
      .all(self.db)
      .await?;
    Ok(trips)
  }

  pub async fn delete(&self, user_id: i32, trip_id: i32) -> Result<()> {
    let trip = trip::Entity::find_by_id(trip_id)
      .filter(trip::Column::UserId.eq(user_id))
      .one(self.db)
      .await?
      .ok_or(Error::NotFound("Trip"))?;

    trip.delete(self.db).await?;
    Ok(())
  }

  pub async fn groups(&self, user_id: i32) -> Result<Vec<trip_group::Model>> {
    let groups = trip_group::Entity::find()
      .filter(trip_group::Column::UserId.eq(user_id))
      .filter(trip_group::Column::Active.eq(true))
      .order_by_desc(trip_group::Column::CreatedAt)
      .order_by_desc(trip_group::Column::Id)
      .all(self.db)
      .await?;
    Ok(groups)
  }

  pub async fn create_group(
    &self,
    user_id: i32,
    name: &str,
  ) -> Result<trip_group::Model> {
    let name = utils::non_blank(Some(name))
      .ok_or_else(|| Error::validation("Group name is required"))?;

    let group = trip_group::ActiveModel {
      id: NotSet,
      user_id: Set(user_id),
      name: Set(name),
      active: Set(true),
      created_at: Set(utils::now()),
    }
    .insert(self.db)
    .await?;
    Ok(group)
  }

  /// Captures of an owned group, newest first. Soft-deleted groups still
  /// list their captures.
  pub async fn screenshots(
    &self,
    user_id: i32,
    group_id: i32,
  ) -> Result<Vec<screenshot::Model>> {
    trip_group::Entity::find_by_id(group_id)
      .filter(trip_group::Column::UserId.eq(user_id))
      .one(self.db)
      .await?
      .ok_or(Error::NotFound("Group"))?;

    let shots = screenshot::Entity::find()
      .filter(screenshot::Column::GroupId.eq(group_id))
      .order_by_desc(screenshot::Column::CapturedAt)
      .order_by_desc(screenshot::Column::Id)
      .all(self.db)
      .await?;
    Ok(shots)
  }

  /// Soft delete; past analyses keep pointing at the group.
  pub async fn delete_group(&self, user_id: i32, group_id: i32) -> Result<()> {
    let group = trip_group::Entity::find_by_id(group_id)
      .filter(trip_group::Column::UserId.eq(user_id))
      .one(self.db)
      .await?
      .ok_or(Error::NotFound("Group"))?;

    trip_group::ActiveModel { active: Set(false), ..group.into() }
      .update(self.db)
      .await?;
    Ok(())
  }

  /// Stores a group summary and its trip row, creating the group under the
  /// client-chosen id when it does not exist yet.
  pub async fn save_group_analysis(
    &self,
    user_id: i32,
    metrics: TripMetrics,
  ) -> Result<group_analysis::Model> {
    let group_id =
      metrics.group_id.ok_or_else(|| Error::validation("Group ID is required"))?;

    let txn = self.db.begin().await?;

    let group = trip_group::Entity::find_by_id(group_id).one(&txn).await?;
    match group {
      Some(group) if group.user_id != user_id => {
        return Err(Error::NotFound("Group"));
      }
      Some(_) => {}
      None => {
        let name = utils::non_blank(metrics.group_name.as_deref())
          .unwrap_or_else(|| format!("Group {group_id}"));

        trip_group::ActiveModel {
          id: Set(group_id),
          user_id: Set(user_id),
          name: Set(name),
          active: Set(true),
          created_at: Set(utils::now()),
        }
        .insert(&txn)
        .await?;
      }
    }

    let analysis = group_analysis::ActiveModel {
      id: NotSet,
      group_id: Set(group_id),
      user_id: Set(user_id),
      amount: Set(metrics.amount),
      km: Set(metrics.km),
      minutes: Set(metrics.minutes),
      per_km: Set(metrics.per_km),
      per_minute: Set(metrics.per_minute),
      per_hour: Set(metrics.per_hour),
      captures: Set(metrics.captures.unwrap_or(0)),
      created_at: Set(utils::now()),
    }
    .insert(&txn)
    .await?;

    let trip = TripMetrics { group_id: None, captures: None, ..metrics };
    insert_trip(&txn, user_id, &trip).await?;

    txn.commit().await?;
    Ok(analysis)
  }

  /// Stores the trip and its detailed breakdown together.
  pub async fn save_full_analysis(
    &self,
    user_id: i32,
    metrics: TripMetrics,
    highlights: json::Value,
  ) -> Result<trip::Model> {
    let complete = metrics.group_id.is_some()
      && metrics.amount > 0.0
      && metrics.km > 0.0
      && metrics.minutes > 0.0;
    if !complete {
      return Err(Error::validation(
        "Group, amount, distance and duration are required",
      ));
    }

    let txn = self.db.begin().await?;

    let trip = insert_trip(&txn, user_id, &metrics).await?;
    trip_analysis::ActiveModel {
      id: NotSet,
      trip_id: Set(trip.id),
      user_id: Set(user_id),
      highlights: Set(highlights),
      created_at: Set(utils::now()),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    Ok(trip)
  }
}

async fn insert_trip<C: ConnectionTrait>(
  conn: &C,
  user_id: i32,
  metrics: &TripMetrics,
) -> Result<trip::Model, sea_orm::DbErr> {
  trip::ActiveModel {
    id: NotSet,
    user_id: Set(user_id),
    group_id: Set(metrics.group_id),
    amount: Set(metrics.amount),
    km: Set(metrics.km),
    minutes: Set(metrics.minutes),
    per_km: Set(metrics.per_km),
    per_minute: Set(metrics.per_minute),
    per_hour: Set(metrics.per_hour),
    captures: Set(metrics.captures),
    created_at: Set(utils::now()),
  }
  .insert(conn)
  .await
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{state::AppState, sv::fixtures};

  fn metrics(amount: f64) -> TripMetrics {
    TripMetrics {
      amount,
      km: 12.5,
      minutes: 30.0,
      per_km: amount / 12.5,
      ..Default::default()
    }
  }

  #[tokio::test]
  async fn test_history_is_owned() {
    let app = AppState::in_memory().await;
    let sv = Trip::new(&app.db);
    let ana = fixtures::user(&app.db, "ana@example.com").await;
    let bea = fixtures::user(&app.db, "bea@example.com").await;

    sv.save(ana.id, metrics(100.0)).await.unwrap();
    let last = sv.save(ana.id, metrics(150.0)).await.unwrap();
    sv.save(bea.id, metrics(80.0)).await.unwrap();

    let history = sv.history(ana.id, HISTORY_LIMIT).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, last.id);

    assert!(matches!(
      sv.delete(bea.id, last.id).await,
      Err(Error::NotFound("Trip"))
    ));
    sv.delete(ana.id, last.id).await.unwrap();
    assert_eq!(sv.history(ana.id, 1).await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn test_groups_soft_delete() {
    let app = AppState::in_memory().await;
    let sv = Trip::new(&app.db);
    let ana = fixtures::user(&app.db, "ana@example.com").await;
    let bea = fixtures::user(&app.db, "bea@example.com").await;

    assert!(matches!(
      sv.create_group(ana.id, "  ").await,
      Err(Error::Validation(_))
    ));

    let group = sv.create_group(ana.id, " Morning ").await.unwrap();
    assert_eq!(group.name, "Morning");

    assert!(sv.delete_group(bea.id, group.id).await.is_err());
    sv.delete_group(ana.id, group.id).await.unwrap();
    assert!(sv.groups(ana.id).await.unwrap().is_empty());

    let kept = trip_group::Entity::find_by_id(group.id).one(&app.db).await;
    assert!(!kept.unwrap().unwrap().active);
  }

  #[tokio::test]
  async fn test_group_analysis_creates_group() {
    let app = AppState::in_memory().await;
    let sv = Trip::new(&app.db);
    let ana = fixtures::user(&app.db, "ana@example.com").await;
    let bea = fixtures::user(&app.db, "bea@example.com").await;

    let input = TripMetrics {
      group_id: Some(77),
      captures: Some(4),
      ..metrics(200.0)
    };
    let analysis = sv.save_group_analysis(ana.id, input.clone()).await.unwrap();
    assert_eq!(analysis.group_id, 77);
    assert_eq!(analysis.captures, 4);

    let groups = sv.groups(ana.id).await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].name, "Group 77");
    assert_eq!(sv.history(ana.id, 10).await.unwrap().len(), 1);

    // existing group is reused
    sv.save_group_analysis(ana.id, input.clone()).await.unwrap();
    assert_eq!(sv.groups(ana.id).await.unwrap().len(), 1);

    // someone else's group id is rejected and nothing is written
    assert!(sv.save_group_analysis(bea.id, input).await.is_err());
    assert!(sv.history(bea.id, 10).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_full_analysis() {
    let app = AppState::in_memory().await;
    let sv = Trip::new(&app.db);
    let ana = fixtures::user(&app.db, "ana@example.com").await;
    let group = sv.create_group(ana.id, "Night").await.unwrap();

    let body = json::json!({
      "id_grupo": group.id,
      "ganancia_total": 320.0,
      "km_total": 40.0,
      "min_total": 95.0,
      "num_capturas": 6,
      "mejor_tarifa_monto": 120.0,
      "ruta_corta_km": 3.2,
    });
    let (input, highlights) = TripMetrics::split(body).unwrap();
    assert_eq!(input.group_id, Some(group.id));
    assert_eq!(input.captures, Some(6));
    assert_eq!(highlights.as_object().unwrap().len(), 2);

    let trip = sv.save_full_analysis(ana.id, input, highlights).await.unwrap();

    let stored = trip_analysis::Entity::find()
      .filter(trip_analysis::Column::TripId.eq(trip.id))
      .one(&app.db)
      .await
      .unwrap()
      .unwrap();
    assert_eq!(stored.highlights["mejor_tarifa_monto"], 120.0);

    let missing = TripMetrics { group_id: None, ..metrics(10.0) };
    assert!(matches!(
      sv.save_full_analysis(ana.id, missing, json::Value::Null).await,
      Err(Error::Validation(_))
    ));
  }

  #[tokio::test]
  async fn test_screenshots_of_owned_group() {
    let app = AppState::in_memory().await;
    let sv = Trip::new(&app.db);
    let ana = fixtures::user(&app.db, "ana@example.com").await;
    let bea = fixtures::user(&app.db, "bea@example.com").await;
    let group = sv.create_group(ana.id, "Night").await.unwrap();

    let now = utils::now();
    for (path, age) in [("a.png", 2), ("b.png", 1)] {
      screenshot::ActiveModel {
        id: NotSet,
        group_id: Set(group.id),
        path: Set(path.into()),
        captured_at: Set(now - TimeDelta::minutes(age)),
        processed: Set(false),
      }
      .insert(&app.db)
      .await
      .unwrap();
    }

    let shots = sv.screenshots(ana.id, group.id).await.unwrap();
    let paths: Vec<_> = shots.iter().map(|shot| shot.path.as_str()).collect();
    assert_eq!(paths, ["b.png", "a.png"]);

    let wire = json::to_value(&shots[0]).unwrap();
    assert_eq!(wire["ruta_imagen"], "b.png");
    assert!(wire.get("group_id").is_none());

    assert!(matches!(
      sv.screenshots(bea.id, group.id).await,
      Err(Error::NotFound("Group"))
    ));
  }
}

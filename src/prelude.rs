pub use std::{collections::BTreeMap, sync::Arc};

pub use anyhow::Context;
pub use chrono::{NaiveDate as Date, NaiveDateTime as DateTime, TimeDelta, Utc};
pub use sea_orm::{
  ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, Database,
  DatabaseConnection, EntityTrait, ModelTrait, NotSet, PaginatorTrait,
  QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
pub use migration::MigratorTrait;
pub use tracing::{debug, error, info, warn};

pub use crate::error::{AuthError, Conflict, Error, Result};
pub(crate) use crate::utils;

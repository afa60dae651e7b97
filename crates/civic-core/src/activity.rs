//! Daily activity log feeding the streak counter.
//!
//! At most one row exists per (user, calendar day); later writes on the same
//! day are dropped silently by the store.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActivityAction {
  ReportSubmitted,
  ReportConfirmed,
  CommentAdded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
  pub user_id:     Uuid,
  /// UTC calendar day of the action.
  pub happened_on: NaiveDate,
  pub action:      ActivityAction,
  pub created_at:  DateTime<Utc>,
}

impl ActivityLogEntry {
  pub fn new(user_id: Uuid, action: ActivityAction, at: DateTime<Utc>) -> Self {
    Self {
      user_id,
      happened_on: at.date_naive(),
      action,
      created_at: at,
    }
  }
}

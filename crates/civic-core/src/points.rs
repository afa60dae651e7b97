//! Point ledger types.
//!
//! The ledger is append-only: a [`PointEntry`] is never updated or deleted.
//! A user's total is always the sum over their entries, so concurrent awards
//! cannot lose updates. Mistakes are undone by recording an offsetting
//! [`PointSource::Correction`] entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

// ─── Source tags ─────────────────────────────────────────────────────────────

/// The action that earned a ledger entry. The camelCase string form is what
/// the `source` column stores.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum PointSource {
  SubmitReport,
  ConfirmReport,
  AddComment,
  AddPhoto,
  FirstReportBonus,
  /// Credited to a report's author when another user confirms it.
  ReportEngaged,
  /// Manual offsetting entry; the amount is supplied by the caller.
  Correction,
}

impl PointSource {
  /// Fixed award for this action. [`Self::Correction`] has no fixed value.
  pub const fn award(self) -> i64 {
    match self {
      Self::SubmitReport => 10,
      Self::ConfirmReport => 2,
      Self::AddComment => 1,
      Self::AddPhoto => 3,
      Self::FirstReportBonus => 5,
      Self::ReportEngaged => 1,
      Self::Correction => 0,
    }
  }
}

// ─── PointEntry ──────────────────────────────────────────────────────────────

/// One immutable ledger row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointEntry {
  pub entry_id:   Uuid,
  pub user_id:    Uuid,
  pub source:     PointSource,
  pub points:     i64,
  /// Opaque annotation, e.g. the report that triggered the award.
  pub meta:       Map<String, Value>,
  pub created_at: DateTime<Utc>,
}

// ─── NewPointEntry ───────────────────────────────────────────────────────────

/// Input to [`crate::store::GamificationStore::record_points`].
#[derive(Debug, Clone)]
pub struct NewPointEntry {
  pub user_id:    Uuid,
  pub source:     PointSource,
  pub points:     i64,
  pub meta:       Map<String, Value>,
  pub created_at: DateTime<Utc>,
}

impl NewPointEntry {
  /// An entry with an explicit amount, stamped now.
  pub fn new(user_id: Uuid, source: PointSource, points: i64) -> Self {
    Self {
      user_id,
      source,
      points,
      meta: Map::new(),
      created_at: Utc::now(),
    }
  }

  /// An entry worth the fixed [`PointSource::award`] for `source`.
  pub fn award(user_id: Uuid, source: PointSource) -> Self {
    Self::new(user_id, source, source.award())
  }

  /// Attach one meta annotation.
  pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
    self.meta.insert(key.to_owned(), value.into());
    self
  }

  /// Backdate the entry. Used for imports and by tests exercising the
  /// sliding windows.
  pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
    self.created_at = created_at;
    self
  }
}

//! Reports, confirmations and comments.
//!
//! Only the fields the point awards and badge predicates depend on are
//! modelled here; photo storage and map rendering belong to other layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
  pub report_id:   Uuid,
  pub user_id:     Uuid,
  pub title:       String,
  pub description: String,
  pub category:    String,
  /// Where the upload layer stored the photo, if one was attached.
  pub photo_url:   Option<String>,
  pub latitude:    Option<f64>,
  pub longitude:   Option<f64>,
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::GamificationStore::insert_report`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewReport {
  pub user_id:     Uuid,
  pub title:       String,
  #[serde(default)]
  pub description: String,
  pub category:    String,
  pub photo_url:   Option<String>,
  pub latitude:    Option<f64>,
  pub longitude:   Option<f64>,
}

impl NewReport {
  pub fn new(user_id: Uuid, title: &str, category: &str) -> Self {
    Self {
      user_id,
      title: title.to_owned(),
      description: String::new(),
      category: category.to_owned(),
      photo_url: None,
      latitude: None,
      longitude: None,
    }
  }

  pub fn has_photo(&self) -> bool { self.photo_url.is_some() }
}

/// A freshly inserted report plus the author's report count right after the
/// insert, read in the same atomic step. `author_reports == 1` means this was
/// the author's first report.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredReport {
  pub report:         Report,
  pub author_reports: u64,
}

/// A vote confirming somebody else's report. Unique per (report, voter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
  pub report_id:  Uuid,
  pub voter_id:   Uuid,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
  pub comment_id: Uuid,
  pub report_id:  Uuid,
  pub user_id:    Uuid,
  pub content:    String,
  pub created_at: DateTime<Utc>,
}

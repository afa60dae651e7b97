//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`
//! suffix) so that string comparison in SQL orders them chronologically.
//! Calendar days are `YYYY-MM-DD`. UUIDs are hyphenated lowercase strings.
//! Enums use their strum string forms.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use civic_core::{
  badge::{Badge, Rarity, UserBadgeAward},
  leaderboard::{UserPoints, UserTotal},
  points::{PointEntry, PointSource},
  report::Report,
  stats::StatsSnapshot,
  user::User,
};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

// ─── Enums ───────────────────────────────────────────────────────────────────

fn decode_enum<T: FromStr>(kind: &'static str, s: &str) -> Result<T> {
  T::from_str(s).map_err(|_| {
    Error::Core(civic_core::Error::UnknownDiscriminant {
      kind,
      value: s.to_owned(),
    })
  })
}

pub fn decode_source(s: &str) -> Result<PointSource> {
  decode_enum("point source", s)
}

pub fn decode_rarity(s: &str) -> Result<Rarity> { decode_enum("rarity", s) }

// ─── Meta ────────────────────────────────────────────────────────────────────

pub fn encode_meta(meta: &Map<String, Value>) -> Result<String> {
  Ok(serde_json::to_string(meta)?)
}

pub fn decode_meta(s: &str) -> Result<Map<String, Value>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:    String,
  pub name:       String,
  pub email:      String,
  pub created_at: String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:    decode_uuid(&self.user_id)?,
      name:       self.name,
      email:      self.email,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `reports` row.
pub struct RawReport {
  pub report_id:   String,
  pub user_id:     String,
  pub title:       String,
  pub description: String,
  pub category:    String,
  pub photo_url:   Option<String>,
  pub latitude:    Option<f64>,
  pub longitude:   Option<f64>,
  pub created_at:  String,
}

impl RawReport {
  pub fn into_report(self) -> Result<Report> {
    Ok(Report {
      report_id:   decode_uuid(&self.report_id)?,
      user_id:     decode_uuid(&self.user_id)?,
      title:       self.title,
      description: self.description,
      category:    self.category,
      photo_url:   self.photo_url,
      latitude:    self.latitude,
      longitude:   self.longitude,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `points_ledger` row.
pub struct RawPointEntry {
  pub entry_id:   String,
  pub user_id:    String,
  pub source:     String,
  pub points:     i64,
  pub meta:       String,
  pub created_at: String,
}

impl RawPointEntry {
  pub fn into_entry(self) -> Result<PointEntry> {
    Ok(PointEntry {
      entry_id:   decode_uuid(&self.entry_id)?,
      user_id:    decode_uuid(&self.user_id)?,
      source:     decode_source(&self.source)?,
      points:     self.points,
      meta:       decode_meta(&self.meta)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `badges` row.
pub struct RawBadge {
  pub id:          String,
  pub name:        String,
  pub description: String,
  pub rarity:      String,
  pub icon_name:   String,
  pub color:       String,
}

impl RawBadge {
  pub fn into_badge(self) -> Result<Badge> {
    Ok(Badge {
      rarity:      decode_rarity(&self.rarity)?,
      id:          self.id,
      name:        self.name,
      description: self.description,
      icon_name:   self.icon_name,
      color:       self.color,
    })
  }
}

/// Raw strings read directly from a `user_badges` row.
pub struct RawAward {
  pub user_id:   String,
  pub badge_id:  String,
  pub earned_at: String,
}

impl RawAward {
  pub fn into_award(self) -> Result<UserBadgeAward> {
    Ok(UserBadgeAward {
      user_id:   decode_uuid(&self.user_id)?,
      badge_id:  self.badge_id,
      earned_at: decode_dt(&self.earned_at)?,
    })
  }
}

/// One row of a ledger `GROUP BY user_id` aggregate.
pub struct RawUserPoints {
  pub user_id:      String,
  pub total_points: i64,
}

impl RawUserPoints {
  pub fn into_user_points(self) -> Result<UserPoints> {
    Ok(UserPoints {
      user_id:      decode_uuid(&self.user_id)?,
      total_points: self.total_points,
    })
  }
}

/// Raw figures read inside one stats snapshot transaction.
pub struct RawStatsSnapshot {
  pub total_points:   i64,
  pub weekly_points:  i64,
  pub monthly_points: i64,
  pub active_days:    i64,
  pub badges:         i64,
  pub total_users:    i64,
  pub totals:         Vec<RawUserPoints>,
}

impl RawStatsSnapshot {
  pub fn into_snapshot(self) -> Result<StatsSnapshot> {
    Ok(StatsSnapshot {
      total_points:   self.total_points,
      weekly_points:  self.weekly_points,
      monthly_points: self.monthly_points,
      active_days:    self.active_days as u32,
      badges:         self.badges as u64,
      total_users:    self.total_users as u64,
      totals:         self
        .totals
        .into_iter()
        .map(RawUserPoints::into_user_points)
        .collect::<Result<_>>()?,
    })
  }
}

/// One row of the users ⟕ ledger aggregate.
pub struct RawUserTotal {
  pub user_id:      String,
  pub name:         String,
  pub email:        String,
  pub total_points: i64,
}

impl RawUserTotal {
  pub fn into_user_total(self) -> Result<UserTotal> {
    Ok(UserTotal {
      user_id:      decode_uuid(&self.user_id)?,
      name:         self.name,
      email:        self.email,
      total_points: self.total_points,
    })
  }
}

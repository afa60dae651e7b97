//! Badge catalogue and rule engine.
//!
//! Each catalogue row pairs a badge with the activity threshold that unlocks
//! it. [`evaluate`] recomputes activity counts from source tables and attempts
//! to award every satisfied badge; the store's insert-if-absent makes repeated
//! calls harmless, so callers run it after every qualifying action.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::store::GamificationStore;

// ─── Reference data ──────────────────────────────────────────────────────────

/// Badge tier. Declaration order is the ranking: bronze < silver < gold <
/// platinum.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Rarity {
  Bronze,
  Silver,
  Gold,
  Platinum,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
  /// Stable slug, e.g. `first-report`.
  pub id:          String,
  pub name:        String,
  pub description: String,
  pub rarity:      Rarity,
  pub icon_name:   String,
  pub color:       String,
}

/// A user's ownership of a badge. Unique per (user, badge).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBadgeAward {
  pub user_id:   Uuid,
  pub badge_id:  String,
  pub earned_at: DateTime<Utc>,
}

/// How far a user is towards an unearned badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeProgress {
  /// The user's count for the badge metric, capped at `required`.
  pub current:  u64,
  pub required: u64,
}

/// A catalogue badge annotated with whether a given user holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeStatus {
  #[serde(flatten)]
  pub badge:     Badge,
  pub earned_at: Option<DateTime<Utc>>,
  /// `None` once earned.
  pub progress:  Option<BadgeProgress>,
}

impl BadgeStatus {
  pub fn is_earned(&self) -> bool { self.earned_at.is_some() }
}

// ─── Predicates ──────────────────────────────────────────────────────────────

/// Activity counts badge predicates are evaluated over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityCounts {
  pub reports_submitted:  u64,
  /// Confirmations the user cast on other people's reports.
  pub confirmations_made: u64,
}

/// The counter a badge threshold applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
  ReportsSubmitted,
  ConfirmationsMade,
}

impl Metric {
  fn read(self, counts: &ActivityCounts) -> u64 {
    match self {
      Self::ReportsSubmitted => counts.reports_submitted,
      Self::ConfirmationsMade => counts.confirmations_made,
    }
  }
}

/// One catalogue row: display data plus the unlocking threshold.
#[derive(Debug, Clone, Copy)]
pub struct BadgeDefinition {
  pub id:          &'static str,
  pub name:        &'static str,
  pub description: &'static str,
  pub rarity:      Rarity,
  pub icon_name:   &'static str,
  pub color:       &'static str,
  pub metric:      Metric,
  pub threshold:   u64,
}

impl BadgeDefinition {
  pub fn is_met(&self, counts: &ActivityCounts) -> bool {
    self.metric.read(counts) >= self.threshold
  }

  pub fn progress(&self, counts: &ActivityCounts) -> BadgeProgress {
    BadgeProgress {
      current:  self.metric.read(counts).min(self.threshold),
      required: self.threshold,
    }
  }

  pub fn to_badge(&self) -> Badge {
    Badge {
      id:          self.id.to_owned(),
      name:        self.name.to_owned(),
      description: self.description.to_owned(),
      rarity:      self.rarity,
      icon_name:   self.icon_name.to_owned(),
      color:       self.color.to_owned(),
    }
  }
}

/// The badge catalogue. New badges are added by appending a row.
pub const CATALOG: &[BadgeDefinition] = &[
  BadgeDefinition {
    id:          "first-report",
    name:        "First Report",
    description: "Submit your first civic issue report",
    rarity:      Rarity::Bronze,
    icon_name:   "award",
    color:       "blue",
    metric:      Metric::ReportsSubmitted,
    threshold:   1,
  },
  BadgeDefinition {
    id:          "community-helper",
    name:        "Community Helper",
    description: "Confirm 10 other reports to help the community",
    rarity:      Rarity::Silver,
    icon_name:   "users",
    color:       "green",
    metric:      Metric::ConfirmationsMade,
    threshold:   10,
  },
  BadgeDefinition {
    id:          "super-reporter",
    name:        "Super Reporter",
    description: "Submit 20 reports total",
    rarity:      Rarity::Platinum,
    icon_name:   "trophy",
    color:       "red",
    metric:      Metric::ReportsSubmitted,
    threshold:   20,
  },
];

/// The catalogue row for `id`, if there is one.
pub fn definition(id: &str) -> Option<&'static BadgeDefinition> {
  CATALOG.iter().find(|d| d.id == id)
}

/// Ids of every catalogue badge satisfied by `counts`.
pub fn satisfied(counts: &ActivityCounts) -> impl Iterator<Item = &'static str> + '_ {
  CATALOG.iter().filter(|d| d.is_met(counts)).map(|d| d.id)
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Award every badge the user currently qualifies for.
///
/// Returns the ids awarded by this call; badges already held are skipped by
/// the store and keep their original `earned_at`.
pub async fn evaluate<S>(
  store: &S,
  user_id: Uuid,
  now: DateTime<Utc>,
) -> Result<Vec<&'static str>, S::Error>
where
  S: GamificationStore,
{
  let counts = store.activity_counts(user_id).await?;

  let mut awarded = Vec::new();
  for badge_id in satisfied(&counts) {
    if store.award_badge(user_id, badge_id, now).await? {
      tracing::debug!(%user_id, badge_id, "badge awarded");
      awarded.push(badge_id);
    }
  }
  Ok(awarded)
}

/// The full catalogue with the user's earned timestamps, highest rarity
/// first. Within a rarity, earned badges precede unearned ones. Unearned
/// badges carry the user's progress towards their threshold.
pub async fn statuses<S>(
  store: &S,
  user_id: Uuid,
) -> Result<Vec<BadgeStatus>, S::Error>
where
  S: GamificationStore,
{
  let earned: HashMap<String, DateTime<Utc>> = store
    .user_badges(user_id)
    .await?
    .into_iter()
    .map(|a| (a.badge_id, a.earned_at))
    .collect();

  let counts = store.activity_counts(user_id).await?;

  let mut statuses: Vec<BadgeStatus> = store
    .list_badges()
    .await?
    .into_iter()
    .map(|badge| {
      let earned_at = earned.get(&badge.id).copied();
      let progress = match earned_at {
        Some(_) => None,
        None => definition(&badge.id).map(|d| d.progress(&counts)),
      };
      BadgeStatus { badge, earned_at, progress }
    })
    .collect();

  statuses.sort_by(|a, b| {
    b.badge
      .rarity
      .cmp(&a.badge.rarity)
      .then_with(|| b.is_earned().cmp(&a.is_earned()))
  });
  Ok(statuses)
}

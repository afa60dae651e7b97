//! The `GamificationStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `civic-store-sqlite`).
//! The rule engine, aggregator and HTTP layer depend on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
  activity::ActivityLogEntry,
  badge::{ActivityCounts, Badge, UserBadgeAward},
  leaderboard::UserTotal,
  points::{NewPointEntry, PointEntry},
  report::{Comment, Confirmation, NewReport, Report, StoredReport},
  stats::{StatsSnapshot, StatsWindows},
  user::{NewUser, User},
};

// ─── Error contract ──────────────────────────────────────────────────────────

/// Error bound for store backends.
///
/// Backends wrap domain rule violations ([`crate::Error`]) alongside their own
/// infrastructure failures; `domain` lets callers tell the two apart.
pub trait StoreError:
  std::error::Error + From<crate::Error> + Send + Sync + 'static
{
  /// The domain error, if this is one rather than an infrastructure fault.
  fn domain(&self) -> Option<&crate::Error>;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a gamification store backend.
///
/// The point ledger is append-only: there is no method that updates or deletes
/// a [`PointEntry`]. Every total is derived by aggregation at read time.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait GamificationStore: Send + Sync {
  type Error: StoreError;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Register a user. Fails with [`crate::Error::DuplicateEmail`] when the
  /// email is taken.
  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user by id. Returns `None` if not found.
  fn get_user(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Number of registered users, with or without ledger history.
  fn count_users(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Reports ───────────────────────────────────────────────────────────

  /// Insert a report and count the author's reports in one atomic step.
  fn insert_report(
    &self,
    input: NewReport,
  ) -> impl Future<Output = Result<StoredReport, Self::Error>> + Send + '_;

  fn get_report(
    &self,
    report_id: Uuid,
  ) -> impl Future<Output = Result<Option<Report>, Self::Error>> + Send + '_;

  /// Record a confirmation vote. Fails with
  /// [`crate::Error::AlreadyConfirmed`] if the voter already confirmed it.
  fn insert_confirmation(
    &self,
    report_id: Uuid,
    voter_id: Uuid,
  ) -> impl Future<Output = Result<Confirmation, Self::Error>> + Send + '_;

  fn insert_comment(
    &self,
    report_id: Uuid,
    user_id: Uuid,
    content: String,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  /// Counts the badge predicates are evaluated over, always recomputed from
  /// the report and confirmation tables.
  fn activity_counts(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<ActivityCounts, Self::Error>> + Send + '_;

  // ── Ledger writes ─────────────────────────────────────────────────────

  /// Append one entry.
  fn record_points(
    &self,
    input: NewPointEntry,
  ) -> impl Future<Output = Result<PointEntry, Self::Error>> + Send + '_;

  // ── Ledger reads ──────────────────────────────────────────────────────

  /// Sum of every entry for the user; 0 when there are none.
  fn total_points(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  /// All entries for the user, newest first.
  fn point_entries(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<PointEntry>, Self::Error>> + Send + '_;


  /// Every user with their total (0 when they have no entries), highest
  /// total first, truncated to `limit`.
  fn user_totals(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<UserTotal>, Self::Error>> + Send + '_;

  // ── Aggregates ────────────────────────────────────────────────────────

  /// Everything [`crate::stats::compute`] needs for one user, read from a
  /// single consistent state: the user's total and window sums, active days,
  /// badge count, the user count, and the ledger totals of every user with at
  /// least one entry.
  fn stats_snapshot(
    &self,
    user_id: Uuid,
    windows: StatsWindows,
  ) -> impl Future<Output = Result<StatsSnapshot, Self::Error>> + Send + '_;

  // ── Activity log ──────────────────────────────────────────────────────

  /// Log an action. Returns `false` when the user already has a row for that
  /// day; that is not an error.
  fn log_activity(
    &self,
    entry: ActivityLogEntry,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Distinct days on or after `since` with at least one logged action.
  fn active_days_since(
    &self,
    user_id: Uuid,
    since: NaiveDate,
  ) -> impl Future<Output = Result<u32, Self::Error>> + Send + '_;

  // ── Badges ────────────────────────────────────────────────────────────

  /// The static badge catalogue.
  fn list_badges(
    &self,
  ) -> impl Future<Output = Result<Vec<Badge>, Self::Error>> + Send + '_;

  /// Insert-if-absent. Returns `true` only if this call created the award;
  /// an existing award keeps its original `earned_at`.
  fn award_badge(
    &self,
    user_id: Uuid,
    badge_id: &'static str,
    earned_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn user_badges(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<UserBadgeAward>, Self::Error>> + Send + '_;
}

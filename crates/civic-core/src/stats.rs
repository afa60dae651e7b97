//! Per-user statistics, derived from the ledger on every call.

use chrono::{DateTime, Days, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  leaderboard::{UserPoints, rank_of},
  level::LevelProgress,
  store::GamificationStore,
};

/// Length in days of the `weeklyPoints` sliding window.
pub const WEEK_DAYS: i64 = 7;
/// Length in days of the `monthlyPoints` sliding window.
pub const MONTH_DAYS: i64 = 30;
/// Days looked back when counting active days for `streak`.
pub const STREAK_WINDOW_DAYS: u64 = 7;

/// Per-user read model, derived on every request and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
  pub points:               i64,
  pub level:                u32,
  pub rank:                 u64,
  pub total_users:          u64,
  pub next_level_points:    i64,
  pub current_level_points: i64,
  pub weekly_points:        i64,
  pub monthly_points:       i64,
  pub badges:               u64,
  /// Distinct active days within the trailing window. This is not a
  /// consecutive-day count.
  pub streak:               u32,
}

/// Lower bounds of the windows a [`StatsSnapshot`] covers. Each bound is
/// inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsWindows {
  pub week_since:   DateTime<Utc>,
  pub month_since:  DateTime<Utc>,
  pub streak_since: NaiveDate,
}

impl StatsWindows {
  /// The trailing week, month and streak windows as of `now`.
  pub fn ending_at(now: DateTime<Utc>) -> Self {
    Self {
      week_since:   now - Duration::days(WEEK_DAYS),
      month_since:  now - Duration::days(MONTH_DAYS),
      streak_since: now
        .date_naive()
        .checked_sub_days(Days::new(STREAK_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MIN),
    }
  }
}

/// The raw figures behind [`UserStats`], all read from one store state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
  pub total_points:   i64,
  pub weekly_points:  i64,
  pub monthly_points: i64,
  pub active_days:    u32,
  pub badges:         u64,
  pub total_users:    u64,
  /// Ledger totals of every user with at least one entry.
  pub totals:         Vec<UserPoints>,
}

/// Compute [`UserStats`] as of `now`.
///
/// Every figure comes from a single [`GamificationStore::stats_snapshot`]
/// call, so `rank` always agrees with `points` even while other requests are
/// writing. A user with no history gets zeroes and is ranked last; absence of
/// activity is not an error.
pub async fn compute<S>(
  store: &S,
  user_id: Uuid,
  now: DateTime<Utc>,
) -> Result<UserStats, S::Error>
where
  S: GamificationStore,
{
  let snap = store
    .stats_snapshot(user_id, StatsWindows::ending_at(now))
    .await?;
  let progress = LevelProgress::for_points(snap.total_points);
  let rank = rank_of(user_id, &snap.totals, snap.total_users);

  Ok(UserStats {
    points: snap.total_points,
    level: progress.level,
    rank,
    total_users: snap.total_users,
    next_level_points: progress.next_level_points,
    current_level_points: progress.current_level_points,
    weekly_points: snap.weekly_points,
    monthly_points: snap.monthly_points,
    badges: snap.badges,
    streak: snap.active_days,
  })
}

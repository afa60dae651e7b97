//! Leaderboard and rank computation.
//!
//! Both are recomputed from the ledger on every read; nothing is cached.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::GamificationStore;

/// Default number of rows served by the leaderboard endpoint.
pub const DEFAULT_LIMIT: usize = 100;

/// A ledger total for a user that has at least one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserPoints {
  pub user_id:      Uuid,
  pub total_points: i64,
}

/// A registered user with their ledger total (0 without entries).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserTotal {
  pub user_id:      Uuid,
  pub name:         String,
  pub email:        String,
  pub total_points: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
  /// 1-based position in the ordering.
  pub rank:         u64,
  pub user_id:      Uuid,
  pub name:         String,
  pub email:        String,
  pub total_points: i64,
}

/// Top `limit` users by total points. Ranks follow position, so tied totals
/// get distinct consecutive ranks in whatever order the store returned them.
pub async fn top<S>(
  store: &S,
  limit: usize,
) -> Result<Vec<LeaderboardEntry>, S::Error>
where
  S: GamificationStore,
{
  let rows = store.user_totals(limit).await?;
  Ok(
    rows
      .into_iter()
      .zip(1..)
      .map(|(row, rank)| LeaderboardEntry {
        rank,
        user_id: row.user_id,
        name: row.name,
        email: row.email,
        total_points: row.total_points,
      })
      .collect(),
  )
}

/// Rank of `user_id` among ledger totals: 1 plus the number of users with a
/// strictly higher total. A user with no ledger entries cannot be placed and
/// is ranked last, at `total_users`.
pub fn rank_of(user_id: Uuid, totals: &[UserPoints], total_users: u64) -> u64 {
  let Some(own) = totals.iter().find(|t| t.user_id == user_id) else {
    return total_users;
  };
  let ahead = totals
    .iter()
    .filter(|t| t.total_points > own.total_points)
    .count() as u64;
  ahead + 1
}

#[cfg(test)]
mod tests {
  use super::*;

  fn pts(user_id: Uuid, total_points: i64) -> UserPoints {
    UserPoints { user_id, total_points }
  }

  #[test]
  fn rank_counts_strictly_higher_totals() {
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let totals = [pts(a, 30), pts(b, 20), pts(c, 10)];
    assert_eq!(rank_of(a, &totals, 3), 1);
    assert_eq!(rank_of(b, &totals, 3), 2);
    assert_eq!(rank_of(c, &totals, 3), 3);
  }

  #[test]
  fn tied_totals_share_a_rank() {
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let totals = [pts(a, 30), pts(b, 30), pts(c, 10)];
    assert_eq!(rank_of(a, &totals, 3), 1);
    assert_eq!(rank_of(b, &totals, 3), 1);
    assert_eq!(rank_of(c, &totals, 3), 3);
  }

  #[test]
  fn user_without_entries_is_ranked_last() {
    let totals: Vec<_> = (0..4).map(|i| pts(Uuid::new_v4(), i * 10)).collect();
    assert_eq!(rank_of(Uuid::new_v4(), &totals, 5), 5);
  }
}

//! Handler for `GET /leaderboard`.

use axum::{Json, extract::State};
use civic_core::{
  leaderboard::{self, LeaderboardEntry},
  store::GamificationStore,
};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError, extract::Query};

#[derive(Debug, Deserialize, Default)]
pub struct LeaderboardParams {
  /// Defaults to the configured leaderboard size.
  pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LeaderboardResponse {
  pub leaderboard: Vec<LeaderboardEntry>,
}

/// `GET /leaderboard[?limit=<n>]`
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<LeaderboardParams>,
) -> Result<Json<LeaderboardResponse>, ApiError>
where
  S: GamificationStore,
{
  let limit = params.limit.unwrap_or(state.config.leaderboard_limit);
  let leaderboard = leaderboard::top(&*state.store, limit)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(LeaderboardResponse { leaderboard }))
}

//! The identity row every ledger, badge and activity record keys on.
//!
//! Credentials and sessions live with the auth layer; this crate only needs a
//! stable id plus the display fields the leaderboard shows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub user_id:    Uuid,
  pub name:       String,
  pub email:      String,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::GamificationStore::add_user`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
  pub name:  String,
  pub email: String,
}

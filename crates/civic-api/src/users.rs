//! Handlers for `/users` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users` | Body: `{"name":"...","email":"..."}`; 409 on duplicate email |
//! | `GET`  | `/users/:id` | 404 if not found |
//! | `GET`  | `/users/:id/stats` | `{"userStats": {...}}` |
//! | `GET`  | `/users/:id/badges` | `{"badges": [...]}`, highest rarity first |
//! | `GET`  | `/users/:id/points` | Ledger entries, newest first |
//! | `POST` | `/users/:id/points` | Body: `{"points":-10,"reason":"..."}`; offsetting entry |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use civic_core::{
  actions::ActionRecorder,
  badge::{self, BadgeStatus},
  points::PointEntry,
  stats::{self, UserStats},
  store::GamificationStore,
  user::{NewUser, User},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  AppState,
  error::ApiError,
  extract::{JsonBody, Path},
};

async fn require_user<S>(store: &S, id: Uuid) -> Result<User, ApiError>
where
  S: GamificationStore,
{
  store
    .get_user(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /users`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<NewUser>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GamificationStore,
{
  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("name is required".into()));
  }
  if !body.email.contains('@') {
    return Err(ApiError::BadRequest("email is invalid".into()));
  }

  let user = state.store.add_user(body).await.map_err(ApiError::store)?;
  tracing::info!(user_id = %user.user_id, "user registered");
  Ok((StatusCode::CREATED, Json(user)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /users/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError>
where
  S: GamificationStore,
{
  Ok(Json(require_user(&*state.store, id).await?))
}

// ─── Stats ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
  #[serde(rename = "userStats")]
  pub user_stats: UserStats,
}

/// `GET /users/:id/stats`
pub async fn stats<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<StatsResponse>, ApiError>
where
  S: GamificationStore,
{
  require_user(&*state.store, id).await?;
  let user_stats = stats::compute(&*state.store, id, Utc::now())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(StatsResponse { user_stats }))
}

// ─── Badges ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct BadgesResponse {
  pub badges: Vec<BadgeStatus>,
}

/// `GET /users/:id/badges`
pub async fn badges<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<BadgesResponse>, ApiError>
where
  S: GamificationStore,
{
  require_user(&*state.store, id).await?;
  let badges = badge::statuses(&*state.store, id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(BadgesResponse { badges }))
}

// ─── Ledger ───────────────────────────────────────────────────────────────────

/// `GET /users/:id/points`
pub async fn points<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<PointEntry>>, ApiError>
where
  S: GamificationStore,
{
  require_user(&*state.store, id).await?;
  let entries = state
    .store
    .point_entries(id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(entries))
}

#[derive(Debug, Deserialize)]
pub struct CorrectionBody {
  pub points: i64,
  pub reason: Option<String>,
}

/// `POST /users/:id/points`; returns 201 with the offsetting entry.
pub async fn correct<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  JsonBody(body): JsonBody<CorrectionBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GamificationStore,
{
  if body.points == 0 {
    return Err(ApiError::BadRequest("a correction must be non-zero".into()));
  }
  let entry = ActionRecorder::new(&*state.store)
    .record_correction(id, body.points, body.reason)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(entry)))
}

//! Handlers for `/reports` endpoints. Each runs one action sequence from
//! [`civic_core::actions`].
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/reports` | Body: [`NewReport`]; returns 201 + awards |
//! | `POST` | `/reports/:id/confirm` | Body: `{"voter_id":"..."}`; 409 if repeated |
//! | `POST` | `/reports/:id/comments` | Body: `{"user_id":"...","content":"..."}` |

use std::ops::RangeInclusive;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use civic_core::{
  actions::ActionRecorder,
  report::NewReport,
  store::GamificationStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AppState,
  error::ApiError,
  extract::{JsonBody, Path},
};

const TITLE_LEN: RangeInclusive<usize> = 3..=200;
const CATEGORY_LEN: RangeInclusive<usize> = 2..=100;
const DESCRIPTION_MAX: usize = 5000;

fn validate(report: &NewReport) -> Result<(), ApiError> {
  if !TITLE_LEN.contains(&report.title.trim().chars().count()) {
    return Err(ApiError::BadRequest(
      "title must be 3 to 200 characters".into(),
    ));
  }
  if !CATEGORY_LEN.contains(&report.category.trim().chars().count()) {
    return Err(ApiError::BadRequest(
      "category must be 2 to 100 characters".into(),
    ));
  }
  if report.description.chars().count() > DESCRIPTION_MAX {
    return Err(ApiError::BadRequest("description is too long".into()));
  }
  Ok(())
}

// ─── Submit ───────────────────────────────────────────────────────────────────

/// `POST /reports`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<NewReport>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GamificationStore,
{
  validate(&body)?;
  let outcome = ActionRecorder::new(&*state.store)
    .submit_report(body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(outcome)))
}

// ─── Confirm ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ConfirmBody {
  pub voter_id: Uuid,
}

/// `POST /reports/:id/confirm`
pub async fn confirm<S>(
  State(state): State<AppState<S>>,
  Path(report_id): Path<Uuid>,
  JsonBody(body): JsonBody<ConfirmBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GamificationStore,
{
  let outcome = ActionRecorder::new(&*state.store)
    .confirm_report(report_id, body.voter_id)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(outcome)))
}

// ─── Comment ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CommentBody {
  pub user_id: Uuid,
  pub content: String,
}

/// `POST /reports/:id/comments`
pub async fn comment<S>(
  State(state): State<AppState<S>>,
  Path(report_id): Path<Uuid>,
  JsonBody(body): JsonBody<CommentBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GamificationStore,
{
  let outcome = ActionRecorder::new(&*state.store)
    .add_comment(report_id, body.user_id, body.content)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(outcome)))
}

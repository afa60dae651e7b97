//! JSON REST API for the civic gamification engine.
//!
//! Exposes an axum [`Router`] backed by any
//! [`civic_core::store::GamificationStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility; the acting user is named in request
//! bodies.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", civic_api::api_router(state))
//! ```

pub mod error;
pub mod extract;
pub mod leaderboard;
pub mod reports;
pub mod users;

use std::sync::Arc;

use axum::{Json, Router, routing::{get, post}};
use civic_core::store::GamificationStore;
use serde::Deserialize;
use serde_json::{Value, json};

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Tunables for the HTTP surface.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Rows served by `/leaderboard` when no `limit` is given.
  #[serde(default = "default_leaderboard_limit")]
  pub leaderboard_limit: usize,
}

fn default_leaderboard_limit() -> usize { civic_core::leaderboard::DEFAULT_LIMIT }

impl Default for ApiConfig {
  fn default() -> Self {
    Self { leaderboard_limit: default_leaderboard_limit() }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub config: Arc<ApiConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      config: Arc::clone(&self.config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: GamificationStore + 'static,
{
  Router::new()
    .route("/health", get(health))
    // Users
    .route("/users", post(users::create::<S>))
    .route("/users/{id}", get(users::get_one::<S>))
    .route("/users/{id}/stats", get(users::stats::<S>))
    .route("/users/{id}/badges", get(users::badges::<S>))
    .route("/users/{id}/points", get(users::points::<S>).post(users::correct::<S>))
    // Reports
    .route("/reports", post(reports::create::<S>))
    .route("/reports/{id}/confirm", post(reports::confirm::<S>))
    .route("/reports/{id}/comments", post(reports::comment::<S>))
    // Leaderboard
    .route("/leaderboard", get(leaderboard::handler::<S>))
    .with_state(state)
}

/// `GET /health`
async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

// ─── Integration tests ────────────────────────────────────────────────────────

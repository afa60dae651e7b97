//! HTTP host for the civic gamification API.
//!
//! Loads [`ServerConfig`] from an optional TOML file layered under `CIVIC_*`
//! environment variables, and mounts [`civic_api::api_router`] under `/api`
//! with request tracing.

use std::path::{Path, PathBuf};

use axum::Router;
use civic_api::{ApiConfig, AppState, api_router};
use civic_core::store::GamificationStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and the
/// environment.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:              String,
  #[serde(default = "default_port")]
  pub port:              u16,
  #[serde(default = "default_store_path")]
  pub store_path:        PathBuf,
  #[serde(default = "default_leaderboard_limit")]
  pub leaderboard_limit: usize,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 5000 }
fn default_store_path() -> PathBuf { PathBuf::from("civic.sqlite") }
fn default_leaderboard_limit() -> usize {
  civic_core::leaderboard::DEFAULT_LIMIT
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:              default_host(),
      port:              default_port(),
      store_path:        default_store_path(),
      leaderboard_limit: default_leaderboard_limit(),
    }
  }
}

impl ServerConfig {
  /// Read `path` if it exists, then apply `CIVIC_*` overrides.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("CIVIC").try_parsing(true))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn api_config(&self) -> ApiConfig {
    ApiConfig { leaderboard_limit: self.leaderboard_limit }
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Application ──────────────────────────────────────────────────────────────

/// The full application: the API under `/api`, traced per request.
pub fn app<S>(state: AppState<S>) -> Router
where
  S: GamificationStore + 'static,
{
  Router::new()
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http())
}

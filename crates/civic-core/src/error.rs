//! Error types for `civic-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("report not found: {0}")]
  ReportNotFound(Uuid),

  #[error("email already registered: {0}")]
  DuplicateEmail(String),

  #[error("users cannot confirm their own report")]
  SelfConfirmation,

  #[error("report {report_id} already confirmed by {voter_id}")]
  AlreadyConfirmed { report_id: Uuid, voter_id: Uuid },

  #[error("comment content must not be blank")]
  EmptyComment,

  #[error("unknown {kind} discriminant: {value:?}")]
  UnknownDiscriminant { kind: &'static str, value: String },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Error types for `greffe-engine`.
//!
//! The taxonomy callers see: not-found, duplicate, invalid, and the opaque
//! store failure. Batch item failures are never surfaced as errors — the
//! batch processor folds them into per-item outcomes.

use greffe_core::act::ActKind;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("person not found: {0}")]
  PersonNotFound(Uuid),

  #[error("commune not found: {0}")]
  CommuneNotFound(Uuid),

  #[error("act not found: {0}")]
  ActNotFound(Uuid),

  #[error("act number {0} is already registered")]
  DuplicateNumber(String),

  #[error("person {subject} already has a {kind} act")]
  SubjectAlreadyRegistered { subject: Uuid, kind: ActKind },

  #[error("invalid act: {0}")]
  Invalid(String),

  #[error("invalid batch: {0}")]
  InvalidBatch(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Error type for `greffe-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] greffe_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// Whole-record replacement against a row that does not exist.
  #[error("person not found: {0}")]
  PersonNotFound(uuid::Uuid),

  #[error("act not found: {0}")]
  ActNotFound(uuid::Uuid),
}

impl Error {
  /// True when the underlying SQLite failure is a constraint violation —
  /// in this schema, one of the UNIQUE act indexes or a foreign key.
  pub fn is_constraint_violation(&self) -> bool {
    matches!(
      self,
      Error::Database(tokio_rusqlite::Error::Rusqlite(
        rusqlite::Error::SqliteFailure(f, _),
      )) if f.code == rusqlite::ErrorCode::ConstraintViolation
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

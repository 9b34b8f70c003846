//! Error types for `greffe-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("act number is empty")]
  EmptyActNumber,

  #[error("act number {0:?} contains characters outside A-Z, 0-9, '/' and '-'")]
  MalformedActNumber(String),

  #[error("death act number {0:?} is shorter than {1} characters")]
  ActNumberTooShort(String, usize),

  #[error("page size {0} is outside 1..={1}")]
  InvalidPageSize(u32, u32),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Handlers for batch registration and dry-run validation.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/acts/batch` | 200 + [`BatchReport`] even when items failed |
//! | `POST` | `/acts/batch/validate` | 200 + [`ValidationReport`], no writes |
//!
//! A batch "succeeds" at the transport level whenever it runs: item
//! failures live inside the report. Only the structural gate (empty,
//! oversized, duplicate numbers within the batch) is a 422.

use std::sync::Arc;

use axum::{Json, extract::State};
use greffe_core::store::RegistryStore;
use greffe_engine::{
  batch::{BatchItem, BatchProcessor, BatchReport},
  validate::{BatchValidator, ValidationReport},
};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct BatchBody {
  pub submitted_by: String,
  pub items:        Vec<BatchItem>,
}

/// `POST /acts/batch`
pub async fn run<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<BatchBody>,
) -> Result<Json<BatchReport>, ApiError>
where
  S: RegistryStore + 'static,
{
  let report = BatchProcessor::new(store)
    .run(body.items, &body.submitted_by)
    .await?;
  Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct ValidateBody {
  pub items: Vec<BatchItem>,
}

/// `POST /acts/batch/validate`
pub async fn validate<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<ValidateBody>,
) -> Result<Json<ValidationReport>, ApiError>
where
  S: RegistryStore + 'static,
{
  let report = BatchValidator::new(store).validate(&body.items).await?;
  Ok(Json(report))
}

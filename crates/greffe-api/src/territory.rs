//! Read-only territorial lookups.

use std::sync::Arc;

use axum::{Json, extract::State};
use greffe_core::{store::RegistryStore, territory::Commune};

use crate::error::ApiError;

/// `GET /communes` — the communes acts can be registered in. Maintenance of
/// territorial data happens outside this API.
pub async fn list_communes<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Commune>>, ApiError>
where
  S: RegistryStore + 'static,
{
  let communes = store
    .list_communes()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(communes))
}

//! JSON REST API for the greffe registry.
//!
//! Exposes an axum [`Router`] backed by any
//! [`greffe_core::store::RegistryStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", greffe_api::api_router(store.clone()))
//! ```

pub mod acts;
pub mod batch;
pub mod error;
pub mod persons;
pub mod territory;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use greffe_core::{query::PageRequest, store::RegistryStore};

pub use error::ApiError;

/// Page size applied when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

pub(crate) fn page_request(
  page: Option<u32>,
  size: Option<u32>,
) -> Result<PageRequest, ApiError> {
  PageRequest::new(page.unwrap_or(0), size.unwrap_or(DEFAULT_PAGE_SIZE))
    .map_err(|e| ApiError::Unprocessable(e.to_string()))
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: RegistryStore + 'static,
{
  Router::new()
    // Persons
    .route("/persons", get(persons::list::<S>).post(persons::create::<S>))
    .route("/persons/{id}", get(persons::get_one::<S>))
    .route("/persons/{id}/status", put(persons::set_status::<S>))
    // Acts
    .route("/acts", get(acts::list::<S>).post(acts::create::<S>))
    .route(
      "/acts/{id}",
      get(acts::get_one::<S>)
        .put(acts::update::<S>)
        .delete(acts::delete_one::<S>),
    )
    // Batch
    .route("/acts/batch", post(batch::run::<S>))
    .route("/acts/batch/validate", post(batch::validate::<S>))
    // Territory
    .route("/communes", get(territory::list_communes::<S>))
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────

//! Handlers for `/acts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/acts` | Filtered, sorted, paged search |
//! | `POST`   | `/acts` | Body: [`ActDraft`]; returns 201 + resolved view |
//! | `GET`    | `/acts/:id` | Resolved view with territorial names |
//! | `PUT`    | `/acts/:id` | Body: [`ActPatch`]; partial update, resolved view |
//! | `DELETE` | `/acts/:id` | 204; rolls a death subject back to alive |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use greffe_core::{
  act::{Act, ActDraft, ActKind, ActPatch},
  query::{ActQuery, ActSortField, Page, SortDir},
  store::RegistryStore,
  view::ActView,
};
use greffe_engine::coordinator::ActCoordinator;
use serde::Deserialize;
use uuid::Uuid;

use crate::{error::ApiError, page_request};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub page:            Option<u32>,
  pub size:            Option<u32>,
  pub kind:            Option<ActKind>,
  pub subject_name:    Option<String>,
  pub officer:         Option<String>,
  pub commune_id:      Option<Uuid>,
  pub registered_from: Option<NaiveDate>,
  pub registered_to:   Option<NaiveDate>,
  pub decisive_from:   Option<NaiveDate>,
  pub decisive_to:     Option<NaiveDate>,
  #[serde(default)]
  pub sort:            ActSortField,
  #[serde(default)]
  pub dir:             SortDir,
}

/// `GET /acts` — every criterion optional; absent criteria filter nothing.
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Page<Act>>, ApiError>
where
  S: RegistryStore + 'static,
{
  let page = page_request(params.page, params.size)?;
  let query = ActQuery {
    kind:            params.kind,
    subject_name:    params.subject_name,
    officer:         params.officer,
    commune_id:      params.commune_id,
    registered_from: params.registered_from,
    registered_to:   params.registered_to,
    decisive_from:   params.decisive_from,
    decisive_to:     params.decisive_to,
    sort:            params.sort,
    dir:             params.dir,
  };

  let result = store
    .search_acts(&query, &page)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(result))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /acts` — returns 201 + the stored act as a resolved [`ActView`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(draft): Json<ActDraft>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RegistryStore + 'static,
{
  let act = ActCoordinator::new(store.clone()).create_act(draft).await?;
  let view = resolve(&store, act.act_id).await?;
  Ok((StatusCode::CREATED, Json(view)))
}

async fn resolve<S>(store: &Arc<S>, id: Uuid) -> Result<ActView, ApiError>
where
  S: RegistryStore + 'static,
{
  store
    .resolve_act(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("act {id} not found")))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /acts/:id` — the fully-resolved view, ready for rendering.
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ActView>, ApiError>
where
  S: RegistryStore + 'static,
{
  Ok(Json(resolve(&store, id).await?))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /acts/:id` — partial update; omitted fields keep their value.
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(patch): Json<ActPatch>,
) -> Result<Json<ActView>, ApiError>
where
  S: RegistryStore + 'static,
{
  let act = ActCoordinator::new(store.clone()).update_act(id, patch).await?;
  Ok(Json(resolve(&store, act.act_id).await?))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /acts/:id`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RegistryStore + 'static,
{
  ActCoordinator::new(store).delete_act(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

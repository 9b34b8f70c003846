//! Handlers for `/persons` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/persons` | Filtered, sorted, paged search |
//! | `POST` | `/persons` | Body: [`greffe_core::person::NewPerson`] |
//! | `GET`  | `/persons/:id` | 404 if not found |
//! | `PUT`  | `/persons/:id/status` | Administrative vital-status override |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use greffe_core::{
  person::{NewPerson, Person, Sex, VitalStatus},
  query::{Page, PersonQuery, PersonSortField, SortDir},
  store::RegistryStore,
};
use greffe_engine::lifecycle::LifecycleManager;
use serde::Deserialize;
use uuid::Uuid;

use crate::{error::ApiError, page_request};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub page:       Option<u32>,
  pub size:       Option<u32>,
  pub name:       Option<String>,
  pub sex:        Option<Sex>,
  pub status:     Option<VitalStatus>,
  pub birthplace: Option<String>,
  pub born_from:  Option<NaiveDate>,
  pub born_to:    Option<NaiveDate>,
  pub age_min:    Option<u32>,
  pub age_max:    Option<u32>,
  #[serde(default)]
  pub sort:       PersonSortField,
  #[serde(default)]
  pub dir:        SortDir,
}

/// `GET /persons` — every criterion optional; absent criteria filter nothing.
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Page<Person>>, ApiError>
where
  S: RegistryStore + 'static,
{
  let page = page_request(params.page, params.size)?;
  let query = PersonQuery {
    name:         params.name,
    sex:          params.sex,
    vital_status: params.status,
    birthplace:   params.birthplace,
    born_from:    params.born_from,
    born_to:      params.born_to,
    age_min:      params.age_min,
    age_max:      params.age_max,
    sort:         params.sort,
    dir:          params.dir,
  };

  let result = store
    .search_persons(&query, &page)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(result))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /persons` — returns 201 + the stored [`Person`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewPerson>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RegistryStore + 'static,
{
  let person = store
    .add_person(body)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(person)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /persons/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Person>, ApiError>
where
  S: RegistryStore + 'static,
{
  let person = store
    .get_person(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;
  Ok(Json(person))
}

// ─── Status override ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: VitalStatus,
}

/// `PUT /persons/:id/status` — the administrative override. In the normal
/// flow vital status moves only as a side effect of act create/delete.
pub async fn set_status<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<StatusBody>,
) -> Result<Json<Person>, ApiError>
where
  S: RegistryStore + 'static,
{
  let person = LifecycleManager::new(store)
    .set_vital_status(id, body.status)
    .await?;
  Ok(Json(person))
}

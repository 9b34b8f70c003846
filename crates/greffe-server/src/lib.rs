//! HTTP server assembly for the greffe registry.
//!
//! Mounts the JSON API behind the Basic-auth gate and a request-trace
//! layer. Configuration comes from `config.toml` plus `GREFFE_*`
//! environment overrides.

pub mod auth;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, middleware};
use greffe_core::store::RegistryStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::AuthConfig;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  pub auth_username:      String,
  pub auth_password_hash: String,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router: `/api/*` behind the auth gate.
pub fn router<S>(store: Arc<S>, auth: Arc<AuthConfig>) -> Router
where
  S: RegistryStore + 'static,
{
  Router::new()
    .nest("/api", greffe_api::api_router(store))
    .layer(middleware::from_fn_with_state(auth, auth::require_auth))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use greffe_store_sqlite::SqliteStore;
  use rand_core::OsRng;
  use tower::ServiceExt as _;

  async fn make_router(password: &str) -> Router {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();
    router(
      store,
      Arc::new(AuthConfig {
        username:      "greffier".to_string(),
        password_hash: hash,
      }),
    )
  }

  fn basic(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  #[tokio::test]
  async fn unauthenticated_requests_are_rejected() {
    let app = make_router("secret").await;
    let resp = app
      .oneshot(
        Request::builder()
          .uri("/api/communes")
          .body(Body::empty())
          .unwrap(),
      )
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
  }

  #[tokio::test]
  async fn authenticated_requests_reach_the_api() {
    let app = make_router("secret").await;
    let resp = app
      .oneshot(
        Request::builder()
          .uri("/api/communes")
          .header(header::AUTHORIZATION, basic("greffier", "secret"))
          .body(Body::empty())
          .unwrap(),
      )
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
  }
}

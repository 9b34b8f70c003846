//! Territorial reference data: province → entity → commune.
//!
//! Read-only from the engine's point of view. Maintenance of these records
//! happens outside this system; stores expose lookup by id and resolution
//! of the parent chain for certificate views.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Province {
  pub province_id: Uuid,
  pub name:        String,
}

/// A decentralised territorial entity (city or territory) within a province.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
  pub entity_id:   Uuid,
  pub name:        String,
  pub province_id: Uuid,
}

/// The commune a certificate is registered in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commune {
  pub commune_id: Uuid,
  pub name:       String,
  pub entity_id:  Uuid,
}

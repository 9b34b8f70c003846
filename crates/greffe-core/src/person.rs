//! Person — the civil-status record every act refers to.
//!
//! A person exists independently of any act. The `vital_status` field is
//! never written directly by callers in the normal flow; it changes only as
//! a side effect of act lifecycle transitions, or through the explicit
//! administrative override exposed by the lifecycle manager.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sex as recorded on the register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
  Male,
  Female,
}

/// The person's vital status. Mutated only by the engine's lifecycle
/// manager; `Unknown` is reachable only through the administrative override.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum VitalStatus {
  #[default]
  Alive,
  Deceased,
  Unknown,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MaritalStatus {
  #[default]
  Single,
  Married,
  Widowed,
  Divorced,
}

/// A registered person.
///
/// `father_id` and `mother_id` are weak references: lookup only, no
/// ownership, no cascading deletes. Nothing here prevents a person from
/// being recorded as their own ancestor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
  pub person_id:      Uuid,
  pub surname:        String,
  pub patronymic:     Option<String>,
  pub given_names:    String,
  pub sex:            Sex,
  pub birth_date:     Option<NaiveDate>,
  pub birth_time:     Option<NaiveTime>,
  pub birthplace:     Option<String>,
  pub vital_status:   VitalStatus,
  pub marital_status: MaritalStatus,
  pub father_id:      Option<Uuid>,
  pub mother_id:      Option<Uuid>,
  /// Server-assigned timestamp; never changes after creation.
  pub created_at:     DateTime<Utc>,
}

impl Person {
  /// Display name used in views and log lines.
  pub fn full_name(&self) -> String {
    match &self.patronymic {
      Some(p) => format!("{} {} {}", self.surname, p, self.given_names),
      None => format!("{} {}", self.surname, self.given_names),
    }
  }
}

/// Input to [`crate::store::RegistryStore::add_person`].
/// `person_id` and `created_at` are always set by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPerson {
  pub surname:        String,
  pub patronymic:     Option<String>,
  pub given_names:    String,
  pub sex:            Sex,
  pub birth_date:     Option<NaiveDate>,
  pub birth_time:     Option<NaiveTime>,
  pub birthplace:     Option<String>,
  #[serde(default)]
  pub vital_status:   VitalStatus,
  #[serde(default)]
  pub marital_status: MaritalStatus,
  pub father_id:      Option<Uuid>,
  pub mother_id:      Option<Uuid>,
}

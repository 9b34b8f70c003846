//! Act — birth and death certificates.
//!
//! Both variants share one envelope; the variant payload lives in
//! [`ActDetails`]. An act refers to exactly one subject [`Person`] and one
//! territorial commune. Acts are updated by whole-record replacement, never
//! by field-level mutation.
//!
//! [`Person`]: crate::person::Person

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Witness slots on a paper certificate.
pub const MAX_WITNESSES: usize = 2;

/// Minimum act-number length enforced for the death variant only.
/// The birth variant carries no floor; the asymmetry is deliberate.
pub const DEATH_NUMBER_MIN_LEN: usize = 5;

// ─── Act number ──────────────────────────────────────────────────────────────

/// A register number, trimmed and upper-cased at construction so every
/// comparison and every stored copy sees the same form.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(from = "String", into = "String")]
pub struct ActNumber(String);

impl ActNumber {
  /// Normalise a raw number. Infallible; format rules are checked
  /// separately by [`ActNumber::validate`] because they depend on the kind.
  pub fn new(raw: &str) -> Self { Self(raw.trim().to_uppercase()) }

  pub fn as_str(&self) -> &str { &self.0 }

  /// Check the format rules: non-empty, `[A-Z0-9/-]+`, and the length floor
  /// for death acts.
  pub fn validate(&self, kind: ActKind) -> Result<()> {
    if self.0.is_empty() {
      return Err(Error::EmptyActNumber);
    }
    let ok = self
      .0
      .chars()
      .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '/' || c == '-');
    if !ok {
      return Err(Error::MalformedActNumber(self.0.clone()));
    }
    if kind == ActKind::Death && self.0.len() < DEATH_NUMBER_MIN_LEN {
      return Err(Error::ActNumberTooShort(self.0.clone(), DEATH_NUMBER_MIN_LEN));
    }
    Ok(())
  }
}

impl From<String> for ActNumber {
  fn from(raw: String) -> Self { Self::new(&raw) }
}

impl From<ActNumber> for String {
  fn from(n: ActNumber) -> Self { n.0 }
}

impl fmt::Display for ActNumber {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Kind and details ────────────────────────────────────────────────────────

/// The act variant; partition key for both uniqueness invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActKind {
  Birth,
  Death,
}

impl ActKind {
  /// The discriminant string stored in the `kind` column.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Birth => "birth",
      Self::Death => "death",
    }
  }
}

impl fmt::Display for ActKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Death-specific certificate fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeathDetails {
  pub died_on:   NaiveDate,
  pub died_at:   Option<NaiveTime>,
  /// Place of death, e.g. a hospital name.
  pub place:     Option<String>,
  pub cause:     Option<String>,
  /// Attending physician.
  pub physician: Option<String>,
}

/// The variant payload of an act. The variant name serves as the `kind`
/// discriminant stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum ActDetails {
  /// A birth act carries nothing beyond the common envelope; the birth
  /// date lives on the subject.
  Birth,
  Death(DeathDetails),
}

impl ActDetails {
  pub fn kind(&self) -> ActKind {
    match self {
      Self::Birth => ActKind::Birth,
      Self::Death(_) => ActKind::Death,
    }
  }

  /// The decisive date carried by the act itself. `None` for birth acts,
  /// whose decisive date is the subject's birth date.
  pub fn decisive_date(&self) -> Option<NaiveDate> {
    match self {
      Self::Birth => None,
      Self::Death(d) => Some(d.died_on),
    }
  }

  /// Serialise the inner payload (without the kind tag) for the
  /// `details_json` database column.
  pub fn to_json(&self) -> Result<serde_json::Value> {
    // The full serialised form is `{"kind": "...", "data": <payload>}`.
    // We want only the payload.
    let full = serde_json::to_value(self)?;
    Ok(full.get("data").cloned().unwrap_or(serde_json::Value::Null))
  }

  /// Deserialise from the kind discriminant and JSON payload stored in the
  /// database.
  pub fn from_parts(kind: ActKind, data: serde_json::Value) -> Result<Self> {
    let wrapped = serde_json::json!({ "kind": kind.as_str(), "data": data });
    Ok(serde_json::from_value(wrapped)?)
  }
}

// ─── Act ─────────────────────────────────────────────────────────────────────

/// A registered certificate. Updated only by whole-record replacement
/// through [`crate::store::RegistryStore::put_act`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Act {
  pub act_id:        Uuid,
  pub number:        ActNumber,
  pub subject_id:    Uuid,
  pub commune_id:    Uuid,
  /// Name of the registering officer.
  pub officer:       String,
  pub registered_on: NaiveDate,
  pub declarant:     Option<String>,
  pub witnesses:     Vec<String>,
  pub details:       ActDetails,
  /// Server-assigned timestamp; never changes after creation.
  pub recorded_at:   DateTime<Utc>,
}

impl Act {
  pub fn kind(&self) -> ActKind { self.details.kind() }
}

// ─── Draft and patch ─────────────────────────────────────────────────────────

/// Input to act creation, before the engine has run its preconditions.
/// The number is normalised on construction but not yet format-checked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActDraft {
  pub number:        ActNumber,
  pub subject_id:    Uuid,
  pub commune_id:    Uuid,
  pub officer:       String,
  pub registered_on: NaiveDate,
  pub declarant:     Option<String>,
  #[serde(default)]
  pub witnesses:     Vec<String>,
  pub details:       ActDetails,
}

/// Validated input to [`crate::store::RegistryStore::add_act`].
/// `act_id` and `recorded_at` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewAct {
  pub number:        ActNumber,
  pub subject_id:    Uuid,
  pub commune_id:    Uuid,
  pub officer:       String,
  pub registered_on: NaiveDate,
  pub declarant:     Option<String>,
  pub witnesses:     Vec<String>,
  pub details:       ActDetails,
}

/// Partial update: every `None` field keeps its previous value. The subject
/// is append-only and cannot be patched; number and commune can.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActPatch {
  pub number:        Option<ActNumber>,
  pub commune_id:    Option<Uuid>,
  pub officer:       Option<String>,
  pub registered_on: Option<NaiveDate>,
  pub declarant:     Option<String>,
  pub witnesses:     Option<Vec<String>>,
  pub details:       Option<ActDetails>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn number_is_trimmed_and_uppercased() {
    let n = ActNumber::new("  dec-2024-001 ");
    assert_eq!(n.as_str(), "DEC-2024-001");
  }

  #[test]
  fn number_charset_is_enforced() {
    let n = ActNumber::new("DEC 2024");
    assert!(matches!(
      n.validate(ActKind::Birth),
      Err(Error::MalformedActNumber(_))
    ));
  }

  #[test]
  fn empty_number_is_rejected() {
    let n = ActNumber::new("   ");
    assert!(matches!(n.validate(ActKind::Birth), Err(Error::EmptyActNumber)));
  }

  #[test]
  fn death_floor_does_not_apply_to_birth() {
    let n = ActNumber::new("B-1");
    assert!(n.validate(ActKind::Birth).is_ok());
    assert!(matches!(
      n.validate(ActKind::Death),
      Err(Error::ActNumberTooShort(_, _))
    ));
  }

  #[test]
  fn details_json_roundtrip() {
    let details = ActDetails::Death(DeathDetails {
      died_on:   NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
      died_at:   None,
      place:     Some("Hôpital Général".into()),
      cause:     None,
      physician: None,
    });
    let json = details.to_json().unwrap();
    let back = ActDetails::from_parts(ActKind::Death, json).unwrap();
    assert!(
      matches!(back, ActDetails::Death(ref d) if d.place.as_deref() == Some("Hôpital Général"))
    );
  }

  #[test]
  fn birth_details_serialise_to_null() {
    let json = ActDetails::Birth.to_json().unwrap();
    assert!(json.is_null());
    let back = ActDetails::from_parts(ActKind::Birth, json).unwrap();
    assert!(matches!(back, ActDetails::Birth));
  }
}

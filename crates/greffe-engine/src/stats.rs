//! Aggregate statistics over a batch submission.
//!
//! Computed from the *input* items — not just the successes — so a report
//! describes what was submitted, whatever happened to each item. The
//! validator reuses the same computation for its preliminary statistics.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use greffe_core::act::ActDetails;
use serde::Serialize;
use uuid::Uuid;

use crate::batch::BatchItem;

/// A registration is "late" when it happens more than this many days after
/// the decisive date.
pub const LATE_REGISTRATION_DAYS: i64 = 30;

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchStats {
  pub by_commune:             BTreeMap<Uuid, usize>,
  pub by_officer:             BTreeMap<String, usize>,
  pub by_registration_date:   BTreeMap<NaiveDate, usize>,
  pub with_witnesses:         usize,
  pub without_witnesses:      usize,
  /// Death items only; birth acts carry no cause field.
  pub with_cause_of_death:    usize,
  pub without_cause_of_death: usize,
  /// Items whose own decisive date is more than
  /// [`LATE_REGISTRATION_DAYS`] before the registration date. Birth items
  /// carry no decisive date of their own and are not counted.
  pub late_registrations:     usize,
}

impl BatchStats {
  pub fn collect(items: &[BatchItem]) -> Self {
    let mut stats = Self::default();
    let window = Duration::days(LATE_REGISTRATION_DAYS);

    for item in items {
      let draft = &item.draft;
      *stats.by_commune.entry(draft.commune_id).or_default() += 1;
      *stats.by_officer.entry(draft.officer.clone()).or_default() += 1;
      *stats
        .by_registration_date
        .entry(draft.registered_on)
        .or_default() += 1;

      if draft.witnesses.is_empty() {
        stats.without_witnesses += 1;
      } else {
        stats.with_witnesses += 1;
      }

      if let ActDetails::Death(death) = &draft.details {
        if death.cause.is_some() {
          stats.with_cause_of_death += 1;
        } else {
          stats.without_cause_of_death += 1;
        }
      }

      if let Some(decisive) = draft.details.decisive_date()
        && draft.registered_on - decisive > window
      {
        stats.late_registrations += 1;
      }
    }

    stats
  }
}

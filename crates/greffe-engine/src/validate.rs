//! Dry-run validation of a batch submission.
//!
//! Runs the same consistency checks as act creation but never writes and
//! never touches the lifecycle manager, so it can be called any number of
//! times before committing. Findings are classified: errors block the
//! batch, alerts are advisory only.

use std::sync::Arc;

use chrono::Utc;
use greffe_core::{act::ActDetails, store::RegistryStore};
use serde::Serialize;
use uuid::Uuid;

use crate::{Error, Result, batch::BatchItem, stats::BatchStats};

/// One finding, tagged with the item's correlation fields.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
  pub number:     String,
  pub subject_id: Uuid,
  pub sequence:   u32,
  pub message:    String,
}

/// The report of a dry run. `valid` is true iff `errors` is empty; alerts
/// never block. `preliminary` statistics are computed over the input items
/// only when there are zero errors.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
  pub valid:       bool,
  pub errors:      Vec<Finding>,
  pub alerts:      Vec<Finding>,
  pub preliminary: Option<BatchStats>,
}

pub struct BatchValidator<S> {
  store: Arc<S>,
}

impl<S: RegistryStore> BatchValidator<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Validate every item and classify the findings. Only a store
  /// infrastructure failure is an error of the call itself; consistency
  /// problems all land in the report.
  pub async fn validate(&self, items: &[BatchItem]) -> Result<ValidationReport> {
    let today = Utc::now().date_naive();
    let mut errors = Vec::new();
    let mut alerts = Vec::new();

    for (index, item) in items.iter().enumerate() {
      let draft = &item.draft;
      let kind = draft.details.kind();
      let sequence = item.sequence.unwrap_or(index as u32);
      let tag = |message: String| Finding {
        number: draft.number.to_string(),
        subject_id: draft.subject_id,
        sequence,
        message,
      };

      // ── Blocking errors ─────────────────────────────────────────────

      let subject = self
        .store
        .get_person(draft.subject_id)
        .await
        .map_err(Error::store)?;
      if subject.is_none() {
        errors.push(tag(format!("subject {} not found", draft.subject_id)));
      }

      if self
        .store
        .get_commune(draft.commune_id)
        .await
        .map_err(Error::store)?
        .is_none()
      {
        errors.push(tag(format!("commune {} not found", draft.commune_id)));
      }

      if self
        .store
        .find_act_by_number(kind, &draft.number)
        .await
        .map_err(Error::store)?
        .is_some()
      {
        errors.push(tag(format!(
          "act number {} is already registered",
          draft.number
        )));
      }

      if self
        .store
        .act_exists_for_subject(kind, draft.subject_id)
        .await
        .map_err(Error::store)?
      {
        errors.push(tag(format!("subject already has a {kind} act")));
      }

      let decisive = draft
        .details
        .decisive_date()
        .or(subject.as_ref().and_then(|s| s.birth_date));
      if let Some(decisive) = decisive
        && draft.registered_on < decisive
      {
        errors.push(tag(format!(
          "registration date {} precedes the decisive date {decisive}",
          draft.registered_on
        )));
      }

      // ── Advisory alerts ─────────────────────────────────────────────

      if draft.witnesses.is_empty() {
        alerts.push(tag("no witnesses recorded".into()));
      }
      if draft.declarant.is_none() {
        alerts.push(tag("no declarant recorded".into()));
      }
      if let ActDetails::Death(death) = &draft.details
        && death.cause.is_none()
      {
        alerts.push(tag("no cause of death recorded".into()));
      }
      if draft.registered_on > today {
        alerts.push(tag(format!(
          "registration date {} is in the future",
          draft.registered_on
        )));
      }
    }

    let valid = errors.is_empty();
    let preliminary = valid.then(|| BatchStats::collect(items));

    Ok(ValidationReport { valid, errors, alerts, preliminary })
  }
}

//! Bulk act registration with per-item failure isolation.
//!
//! Items run strictly sequentially in input order. Each item goes through
//! the full coordinator create path inside its own failure boundary: one
//! bad item becomes a failed outcome and the loop moves on, leaving earlier
//! successes committed. There is no batch-wide transaction.
//!
//! Only a structurally invalid submission — empty, oversized, or carrying
//! the same number twice — is rejected outright, before any item runs.

use std::{collections::HashSet, sync::Arc, time::Instant};

use greffe_core::{act::ActDraft, store::RegistryStore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result, coordinator::ActCoordinator, stats::BatchStats,
};

/// Hard cap on items per submission.
pub const MAX_BATCH_SIZE: usize = 100;

// ─── Input ───────────────────────────────────────────────────────────────────

/// One row of a batch submission. `sequence` and `reference` exist purely
/// to correlate input rows to outcomes; the input index is the fallback
/// sequence number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
  #[serde(flatten)]
  pub draft:     ActDraft,
  pub sequence:  Option<u32>,
  pub reference: Option<String>,
}

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// What happened to one item.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
  Created { act_id: Uuid },
  Failed { reason: String },
}

impl ItemOutcome {
  pub fn is_created(&self) -> bool { matches!(self, Self::Created { .. }) }
}

/// One item's outcome, tagged with the correlation fields from the input.
#[derive(Debug, Clone, Serialize)]
pub struct ItemReport {
  pub number:    String,
  pub sequence:  u32,
  pub reference: Option<String>,
  #[serde(flatten)]
  pub outcome:   ItemOutcome,
}

/// The full report for one submission.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
  pub total:        usize,
  pub succeeded:    usize,
  pub failed:       usize,
  /// True iff every item succeeded.
  pub success:      bool,
  pub elapsed_ms:   u64,
  pub message:      String,
  pub submitted_by: String,
  pub items:        Vec<ItemReport>,
  pub stats:        BatchStats,
}

// ─── Processor ───────────────────────────────────────────────────────────────

pub struct BatchProcessor<S> {
  coordinator: ActCoordinator<S>,
}

impl<S: RegistryStore> BatchProcessor<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { coordinator: ActCoordinator::new(store) }
  }

  /// Run a batch to completion and report every item's outcome.
  ///
  /// Returns `Err` only for the structural gate; from then on all failures
  /// are per-item.
  pub async fn run(
    &self,
    items: Vec<BatchItem>,
    submitted_by: &str,
  ) -> Result<BatchReport> {
    check_structure(&items)?;

    let started = Instant::now();
    let mut reports = Vec::with_capacity(items.len());
    let mut succeeded = 0usize;
    let mut failed = 0usize;

    for (index, item) in items.iter().enumerate() {
      let outcome = match self.coordinator.create_act(item.draft.clone()).await
      {
        Ok(act) => {
          succeeded += 1;
          ItemOutcome::Created { act_id: act.act_id }
        }
        Err(e) => {
          failed += 1;
          ItemOutcome::Failed { reason: e.to_string() }
        }
      };

      reports.push(ItemReport {
        number:    item.draft.number.to_string(),
        sequence:  item.sequence.unwrap_or(index as u32),
        reference: item.reference.clone(),
        outcome,
      });
    }

    let elapsed_ms = started.elapsed().as_millis() as u64;
    let total = items.len();
    let stats = BatchStats::collect(&items);
    let success = failed == 0;
    let message = if success {
      format!("all {total} acts registered")
    } else {
      format!("{failed} of {total} items failed; {succeeded} acts registered")
    };

    tracing::info!(
      total,
      succeeded,
      failed,
      elapsed_ms,
      submitted_by,
      "batch processed",
    );

    Ok(BatchReport {
      total,
      succeeded,
      failed,
      success,
      elapsed_ms,
      message,
      submitted_by: submitted_by.to_owned(),
      items: reports,
      stats,
    })
  }
}

/// The structural gate: non-empty, within the size cap, and all numbers
/// pairwise distinct after normalisation. Checked purely against the
/// submission itself, never against the store.
pub(crate) fn check_structure(items: &[BatchItem]) -> Result<()> {
  if items.is_empty() {
    return Err(Error::InvalidBatch("batch is empty".into()));
  }
  if items.len() > MAX_BATCH_SIZE {
    return Err(Error::InvalidBatch(format!(
      "batch has {} items; the maximum is {MAX_BATCH_SIZE}",
      items.len()
    )));
  }

  let mut seen = HashSet::new();
  for item in items {
    if !seen.insert(item.draft.number.as_str()) {
      return Err(Error::InvalidBatch(format!(
        "act number {} appears more than once in the batch",
        item.draft.number
      )));
    }
  }

  Ok(())
}

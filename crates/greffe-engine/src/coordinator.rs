//! The act consistency coordinator.
//!
//! Owns the invariants tying an act to exactly one subject and one commune:
//! number uniqueness per variant, one-act-per-subject per variant, date
//! coherence, and age plausibility. Creation runs its preconditions in a
//! fixed order and writes nothing until all of them pass.
//!
//! The act write and the subject's status write are deliberately *not* one
//! atomic transaction: the certificate is the authoritative record, and the
//! status update is best-effort. A reader can observe a death act whose
//! subject still reads `Alive`; that window is an accepted property of the
//! system, not a bug.

use std::sync::Arc;

use chrono::{Months, NaiveDate, Utc};
use greffe_core::{
  act::{Act, ActDetails, ActDraft, ActKind, ActNumber, ActPatch, NewAct},
  person::{Person, VitalStatus},
  store::RegistryStore,
};
use uuid::Uuid;

use crate::{Error, Result, lifecycle::LifecycleManager};

/// Implied age at death must fall in `0..=MAX_AGE_YEARS` whole years.
pub const MAX_AGE_YEARS: u32 = 120;

pub struct ActCoordinator<S> {
  store:     Arc<S>,
  lifecycle: LifecycleManager<S>,
}

impl<S> Clone for ActCoordinator<S> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      lifecycle: self.lifecycle.clone(),
    }
  }
}

impl<S: RegistryStore> ActCoordinator<S> {
  pub fn new(store: Arc<S>) -> Self {
    let lifecycle = LifecycleManager::new(Arc::clone(&store));
    Self { store, lifecycle }
  }

  // ── Create ────────────────────────────────────────────────────────────

  /// Register a single act. Preconditions run in order; the first failure
  /// aborts and nothing is written.
  pub async fn create_act(&self, draft: ActDraft) -> Result<Act> {
    let kind = draft.details.kind();

    // 1. Number must be free within the variant.
    if self
      .store
      .find_act_by_number(kind, &draft.number)
      .await
      .map_err(Error::store)?
      .is_some()
    {
      return Err(Error::DuplicateNumber(draft.number.to_string()));
    }

    // 2. Subject must exist.
    let subject = self
      .store
      .get_person(draft.subject_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::PersonNotFound(draft.subject_id))?;

    // 3. One act of each variant per subject.
    if self
      .store
      .act_exists_for_subject(kind, draft.subject_id)
      .await
      .map_err(Error::store)?
    {
      return Err(Error::SubjectAlreadyRegistered {
        subject: draft.subject_id,
        kind,
      });
    }

    // 4. Commune must exist.
    if self
      .store
      .get_commune(draft.commune_id)
      .await
      .map_err(Error::store)?
      .is_none()
    {
      return Err(Error::CommuneNotFound(draft.commune_id));
    }

    // 5. Domain validation on the full draft.
    validate_rules(
      &draft.number,
      &draft.details,
      draft.registered_on,
      &draft.witnesses,
      &subject,
      Utc::now().date_naive(),
    )?;

    // 6. Persist. The UNIQUE indexes are the last line of defence against
    // a concurrent writer racing the pre-checks above.
    let act = match self
      .store
      .add_act(NewAct {
        number:        draft.number.clone(),
        subject_id:    draft.subject_id,
        commune_id:    draft.commune_id,
        officer:       draft.officer,
        registered_on: draft.registered_on,
        declarant:     draft.declarant,
        witnesses:     draft.witnesses,
        details:       draft.details,
      })
      .await
    {
      Ok(act) => act,
      Err(e) if S::is_conflict(&e) => {
        return Err(self.classify_conflict(kind, &draft.number, draft.subject_id).await);
      }
      Err(e) => return Err(Error::store(e)),
    };

    // 7. Compensating status transition, best-effort. A failure here is
    // logged and swallowed; it never unwinds the persisted act.
    if kind == ActKind::Death {
      if let Err(e) = self
        .lifecycle
        .set_vital_status(act.subject_id, VitalStatus::Deceased)
        .await
      {
        tracing::warn!(
          subject = %act.subject_id,
          act = %act.number,
          error = %e,
          "death act registered but status transition failed",
        );
      }
    }

    Ok(act)
  }

  // ── Update ────────────────────────────────────────────────────────────

  /// Partial update: omitted fields keep their previous value. A changed
  /// number re-checks uniqueness excluding this act's own row; a changed
  /// commune re-checks existence. The subject and the variant are
  /// append-only, and vital status is driven only by create/delete, never
  /// by update.
  pub async fn update_act(&self, act_id: Uuid, patch: ActPatch) -> Result<Act> {
    let mut act = self
      .store
      .get_act(act_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::ActNotFound(act_id))?;
    let kind = act.kind();

    if let Some(number) = patch.number
      && number != act.number
    {
      if let Some(existing) = self
        .store
        .find_act_by_number(kind, &number)
        .await
        .map_err(Error::store)?
        && existing.act_id != act_id
      {
        return Err(Error::DuplicateNumber(number.to_string()));
      }
      act.number = number;
    }

    if let Some(commune_id) = patch.commune_id {
      if self
        .store
        .get_commune(commune_id)
        .await
        .map_err(Error::store)?
        .is_none()
      {
        return Err(Error::CommuneNotFound(commune_id));
      }
      act.commune_id = commune_id;
    }

    if let Some(details) = patch.details {
      if details.kind() != kind {
        return Err(Error::Invalid(format!(
          "cannot change a {kind} act into a {} act",
          details.kind()
        )));
      }
      act.details = details;
    }

    if let Some(officer) = patch.officer {
      act.officer = officer;
    }
    if let Some(registered_on) = patch.registered_on {
      act.registered_on = registered_on;
    }
    if let Some(declarant) = patch.declarant {
      act.declarant = Some(declarant);
    }
    if let Some(witnesses) = patch.witnesses {
      act.witnesses = witnesses;
    }

    let subject = self
      .store
      .get_person(act.subject_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::PersonNotFound(act.subject_id))?;

    validate_rules(
      &act.number,
      &act.details,
      act.registered_on,
      &act.witnesses,
      &subject,
      Utc::now().date_naive(),
    )?;

    match self.store.put_act(act.clone()).await {
      Ok(()) => Ok(act),
      Err(e) if S::is_conflict(&e) => {
        Err(self.classify_conflict(kind, &act.number, act.subject_id).await)
      }
      Err(e) => Err(Error::store(e)),
    }
  }

  // ── Delete ────────────────────────────────────────────────────────────

  /// Remove an act. For death acts the subject is then transitioned back
  /// to `Alive`, with the same best-effort policy as creation.
  pub async fn delete_act(&self, act_id: Uuid) -> Result<()> {
    let act = self
      .store
      .get_act(act_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::ActNotFound(act_id))?;

    if !self.store.delete_act(act_id).await.map_err(Error::store)? {
      return Err(Error::ActNotFound(act_id));
    }

    if act.kind() == ActKind::Death {
      if let Err(e) = self
        .lifecycle
        .set_vital_status(act.subject_id, VitalStatus::Alive)
        .await
      {
        tracing::warn!(
          subject = %act.subject_id,
          act = %act.number,
          error = %e,
          "death act removed but status rollback failed",
        );
      }
    }

    Ok(())
  }

  /// Decide which duplicate kind a store-level constraint violation maps
  /// to, by re-running the two existence checks.
  async fn classify_conflict(
    &self,
    kind: ActKind,
    number: &ActNumber,
    subject_id: Uuid,
  ) -> Error {
    match self.store.find_act_by_number(kind, number).await {
      Ok(Some(_)) => Error::DuplicateNumber(number.to_string()),
      _ => Error::SubjectAlreadyRegistered { subject: subject_id, kind },
    }
  }
}

// ─── Domain rules ────────────────────────────────────────────────────────────

/// The decisive date for a prospective act: the death date for a death act,
/// the subject's birth date (when known) for a birth act.
pub(crate) fn decisive_date(
  details: &ActDetails,
  subject: &Person,
) -> Option<NaiveDate> {
  details.decisive_date().or(subject.birth_date)
}

/// Step-5 validation, shared by create and update. Operates on the merged
/// field set so partial updates re-validate exactly what the stored record
/// will contain.
pub(crate) fn validate_rules(
  number: &ActNumber,
  details: &ActDetails,
  registered_on: NaiveDate,
  witnesses: &[String],
  subject: &Person,
  today: NaiveDate,
) -> Result<()> {
  number
    .validate(details.kind())
    .map_err(|e| Error::Invalid(e.to_string()))?;

  if witnesses.len() > greffe_core::act::MAX_WITNESSES {
    return Err(Error::Invalid(format!(
      "at most {} witnesses are allowed",
      greffe_core::act::MAX_WITNESSES
    )));
  }

  if registered_on > today {
    return Err(Error::Invalid(format!(
      "registration date {registered_on} is in the future"
    )));
  }

  if let ActDetails::Death(death) = details {
    if death.died_on > today {
      return Err(Error::Invalid(format!(
        "death date {} is in the future",
        death.died_on
      )));
    }

    if let Some(born) = subject.birth_date {
      if death.died_on < born {
        return Err(Error::Invalid(format!(
          "death date {} precedes the subject's birth date {born}",
          death.died_on
        )));
      }
      let limit = born
        .checked_add_months(Months::new(MAX_AGE_YEARS * 12))
        .unwrap_or(NaiveDate::MAX);
      if death.died_on > limit {
        return Err(Error::Invalid(format!(
          "implied age at death exceeds {MAX_AGE_YEARS} years"
        )));
      }
    }
  }

  if let Some(decisive) = decisive_date(details, subject)
    && registered_on < decisive
  {
    return Err(Error::Invalid(format!(
      "registration date {registered_on} precedes the decisive date {decisive}"
    )));
  }

  Ok(())
}

//! The person vital-status state machine.
//!
//! Three states: `Alive`, `Deceased`, `Unknown`. A successful death-act
//! creation moves the subject to `Deceased`; deleting that act moves them
//! back to `Alive` (a compensating rollback, not a medical statement).
//! `Unknown` is reachable only through the administrative override.
//!
//! The manager blocks no transition itself — all gating happens in the
//! coordinator before it calls in. This is the *only* write path to
//! `vital_status`.

use std::sync::Arc;

use greffe_core::{
  person::{Person, VitalStatus},
  store::RegistryStore,
};
use uuid::Uuid;

use crate::{Error, Result};

pub struct LifecycleManager<S> {
  store: Arc<S>,
}

impl<S> Clone for LifecycleManager<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store) }
  }
}

impl<S: RegistryStore> LifecycleManager<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Persist a new vital status for the person. No other field is touched;
  /// the record is read, the status swapped, and the whole record written
  /// back.
  pub async fn set_vital_status(
    &self,
    person_id: Uuid,
    status: VitalStatus,
  ) -> Result<Person> {
    let mut person = self
      .store
      .get_person(person_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::PersonNotFound(person_id))?;

    person.vital_status = status;
    self
      .store
      .put_person(person.clone())
      .await
      .map_err(Error::store)?;

    Ok(person)
  }
}

//! The `RegistryStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `greffe-store-sqlite`).
//! Higher layers (`greffe-engine`, `greffe-api`) depend on this abstraction,
//! not on any concrete backend. Each single mutation is expected to run with
//! read-committed-or-stronger isolation; cross-operation consistency is the
//! engine's business.

use std::future::Future;

use uuid::Uuid;

use crate::{
  act::{Act, ActKind, ActNumber, NewAct},
  person::{NewPerson, Person},
  query::{ActQuery, Page, PageRequest, PersonQuery},
  territory::Commune,
  view::ActView,
};

/// Abstraction over a registry storage backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RegistryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Whether `err` is a uniqueness-constraint violation on the acts table.
  /// The engine maps such errors back to its own duplicate error kinds, so
  /// the database constraint and the application pre-check surface
  /// identically to callers.
  fn is_conflict(err: &Self::Error) -> bool;

  // ── Persons ───────────────────────────────────────────────────────────

  /// Create and persist a new person. The store assigns id and timestamp.
  fn add_person(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Retrieve a person by id. Returns `None` if not found.
  fn get_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Whole-record replacement of an existing person.
  fn put_person(
    &self,
    person: Person,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// One filtered, sorted page of persons.
  fn search_persons<'a>(
    &'a self,
    query: &'a PersonQuery,
    page: &'a PageRequest,
  ) -> impl Future<Output = Result<Page<Person>, Self::Error>> + Send + 'a;

  // ── Acts ──────────────────────────────────────────────────────────────

  /// Persist a validated act. The store assigns id and timestamp. The
  /// UNIQUE indexes on (kind, number) and (kind, subject) are the final
  /// enforcement point for the uniqueness invariants; violations must
  /// surface as errors for which [`RegistryStore::is_conflict`] is true.
  fn add_act(
    &self,
    input: NewAct,
  ) -> impl Future<Output = Result<Act, Self::Error>> + Send + '_;

  fn get_act(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Act>, Self::Error>> + Send + '_;

  /// Find an act by its normalised number within one variant.
  fn find_act_by_number<'a>(
    &'a self,
    kind: ActKind,
    number: &'a ActNumber,
  ) -> impl Future<Output = Result<Option<Act>, Self::Error>> + Send + 'a;

  /// Whether the subject already has an act of this variant.
  fn act_exists_for_subject(
    &self,
    kind: ActKind,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Whole-record replacement of an existing act.
  fn put_act(
    &self,
    act: Act,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete an act. Returns `false` if no such act existed.
  fn delete_act(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// One filtered, sorted page of acts.
  fn search_acts<'a>(
    &'a self,
    query: &'a ActQuery,
    page: &'a PageRequest,
  ) -> impl Future<Output = Result<Page<Act>, Self::Error>> + Send + 'a;

  /// Materialise the fully-resolved view of an act: subject plus commune,
  /// entity and province names. Returns `None` if the act does not exist.
  fn resolve_act(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ActView>, Self::Error>> + Send + '_;

  // ── Territory (read-only) ─────────────────────────────────────────────

  fn get_commune(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Commune>, Self::Error>> + Send + '_;

  fn list_communes(
    &self,
  ) -> impl Future<Output = Result<Vec<Commune>, Self::Error>> + Send + '_;
}

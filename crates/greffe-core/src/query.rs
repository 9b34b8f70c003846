//! Query and pagination types for the read endpoints.
//!
//! Every criterion is optional; an absent criterion is the identity
//! predicate and filters nothing out. Stores combine the present criteria
//! with logical AND.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  act::ActKind,
  person::{Sex, VitalStatus},
};

// ─── Pagination ──────────────────────────────────────────────────────────────

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A validated page request. `page` is 0-based; `size` is in
/// `1..=`[`MAX_PAGE_SIZE`].
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
  page: u32,
  size: u32,
}

impl PageRequest {
  pub fn new(page: u32, size: u32) -> Result<Self> {
    if size == 0 || size > MAX_PAGE_SIZE {
      return Err(Error::InvalidPageSize(size, MAX_PAGE_SIZE));
    }
    Ok(Self { page, size })
  }

  pub fn page(&self) -> u32 { self.page }

  pub fn size(&self) -> u32 { self.size }

  pub fn offset(&self) -> u64 { u64::from(self.page) * u64::from(self.size) }
}

/// One page of results plus the flags callers need to paginate.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
  pub content:      Vec<T>,
  pub total:        u64,
  pub page:         u32,
  pub size:         u32,
  pub has_next:     bool,
  pub has_previous: bool,
  pub is_first:     bool,
  pub is_last:      bool,
}

impl<T> Page<T> {
  pub fn new(content: Vec<T>, total: u64, request: &PageRequest) -> Self {
    let size = request.size();
    let page = request.page();
    let total_pages = total.div_ceil(u64::from(size)).max(1);
    Self {
      content,
      total,
      page,
      size,
      has_next: u64::from(page) + 1 < total_pages,
      has_previous: page > 0,
      is_first: page == 0,
      is_last: u64::from(page) + 1 >= total_pages,
    }
  }
}

// ─── Sorting ─────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
  #[default]
  Asc,
  Desc,
}

/// Sort field for act queries. The store always adds the act id as a final
/// tiebreak so pagination is deterministic across repeated calls.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ActSortField {
  #[default]
  Number,
  RegisteredOn,
  DecisiveDate,
}

/// Sort field for person queries; person id is the final tiebreak.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PersonSortField {
  #[default]
  Surname,
  BirthDate,
  CreatedAt,
}

// ─── Act query ───────────────────────────────────────────────────────────────

/// Parameters for [`crate::store::RegistryStore::search_acts`].
#[derive(Debug, Clone, Default)]
pub struct ActQuery {
  pub kind:            Option<ActKind>,
  /// Case-insensitive substring over the subject's names.
  pub subject_name:    Option<String>,
  /// Case-insensitive substring over the registering officer.
  pub officer:         Option<String>,
  pub commune_id:      Option<Uuid>,
  pub registered_from: Option<NaiveDate>,
  pub registered_to:   Option<NaiveDate>,
  /// Bounds on the decisive date: death date for death acts, the subject's
  /// birth date for birth acts.
  pub decisive_from:   Option<NaiveDate>,
  pub decisive_to:     Option<NaiveDate>,
  pub sort:            ActSortField,
  pub dir:             SortDir,
}

// ─── Person query ────────────────────────────────────────────────────────────

/// Parameters for [`crate::store::RegistryStore::search_persons`].
#[derive(Debug, Clone, Default)]
pub struct PersonQuery {
  /// Case-insensitive substring over surname, patronymic and given names.
  pub name:         Option<String>,
  pub sex:          Option<Sex>,
  pub vital_status: Option<VitalStatus>,
  /// Case-insensitive substring over the birthplace.
  pub birthplace:   Option<String>,
  pub born_from:    Option<NaiveDate>,
  pub born_to:      Option<NaiveDate>,
  /// Age bounds in whole years, folded into the birth-date window.
  pub age_min:      Option<u32>,
  pub age_max:      Option<u32>,
  pub sort:         PersonSortField,
  pub dir:          SortDir,
}

impl PersonQuery {
  /// The effective birth-date window after converting the age bounds:
  /// `age_max` gives the earliest admissible birth date
  /// (`today − age_max` years), `age_min` the latest
  /// (`today − age_min` years). Where an explicit bound and an age-derived
  /// bound are both present, the tighter one wins.
  pub fn birth_date_window(
    &self,
    today: NaiveDate,
  ) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let earliest_from_age = self.age_max.map(|a| years_before(today, a));
    let latest_from_age = self.age_min.map(|a| years_before(today, a));

    let earliest = tighter(self.born_from, earliest_from_age, NaiveDate::max);
    let latest = tighter(self.born_to, latest_from_age, NaiveDate::min);
    (earliest, latest)
  }
}

fn years_before(date: NaiveDate, years: u32) -> NaiveDate {
  date
    .checked_sub_months(Months::new(years.saturating_mul(12)))
    .unwrap_or(NaiveDate::MIN)
}

fn tighter(
  a: Option<NaiveDate>,
  b: Option<NaiveDate>,
  pick: fn(NaiveDate, NaiveDate) -> NaiveDate,
) -> Option<NaiveDate> {
  match (a, b) {
    (Some(a), Some(b)) => Some(pick(a, b)),
    (a, b) => a.or(b),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
  }

  #[test]
  fn page_size_bounds() {
    assert!(PageRequest::new(0, 0).is_err());
    assert!(PageRequest::new(0, 101).is_err());
    assert!(PageRequest::new(0, 1).is_ok());
    assert!(PageRequest::new(7, 100).is_ok());
  }

  #[test]
  fn page_flags() {
    let req = PageRequest::new(1, 10).unwrap();
    let page = Page::new(vec![1, 2, 3], 23, &req);
    assert!(page.has_next);
    assert!(page.has_previous);
    assert!(!page.is_first);
    assert!(!page.is_last);

    let last = Page::new(vec![4], 23, &PageRequest::new(2, 10).unwrap());
    assert!(!last.has_next);
    assert!(last.is_last);
  }

  #[test]
  fn empty_result_is_both_first_and_last() {
    let page: Page<u8> =
      Page::new(vec![], 0, &PageRequest::new(0, 10).unwrap());
    assert!(page.is_first);
    assert!(page.is_last);
    assert!(!page.has_next);
  }

  #[test]
  fn age_bounds_become_birth_dates() {
    let q = PersonQuery {
      age_min: Some(18),
      age_max: Some(65),
      ..Default::default()
    };
    let (earliest, latest) = q.birth_date_window(d(2024, 6, 15));
    assert_eq!(earliest, Some(d(1959, 6, 15)));
    assert_eq!(latest, Some(d(2006, 6, 15)));
  }

  #[test]
  fn explicit_bound_wins_when_tighter() {
    let q = PersonQuery {
      born_from: Some(d(1980, 1, 1)),
      age_max: Some(65), // would allow back to 1959
      ..Default::default()
    };
    let (earliest, _) = q.birth_date_window(d(2024, 6, 15));
    assert_eq!(earliest, Some(d(1980, 1, 1)));
  }

  #[test]
  fn age_bound_wins_when_tighter() {
    let q = PersonQuery {
      born_to: Some(d(2020, 1, 1)),
      age_min: Some(18), // latest admissible is 2006
      ..Default::default()
    };
    let (_, latest) = q.birth_date_window(d(2024, 6, 15));
    assert_eq!(latest, Some(d(2006, 6, 15)));
  }

  #[test]
  fn no_criteria_gives_open_window() {
    let q = PersonQuery::default();
    assert_eq!(q.birth_date_window(d(2024, 6, 15)), (None, None));
  }
}

//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use greffe_core::{
  act::{ActDetails, ActKind, ActNumber, DeathDetails, NewAct},
  person::{MaritalStatus, NewPerson, Person, Sex, VitalStatus},
  query::{ActQuery, ActSortField, PageRequest, PersonQuery, SortDir},
  store::RegistryStore,
  territory::{Commune, Entity, Province},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Insert a province → entity → commune chain and return the commune id.
async fn seed_commune(s: &SqliteStore) -> Uuid {
  let province_id = Uuid::new_v4();
  let entity_id = Uuid::new_v4();
  let commune_id = Uuid::new_v4();

  s.insert_province(Province {
    province_id,
    name: "Haut-Katanga".into(),
  })
  .await
  .unwrap();
  s.insert_entity(Entity {
    entity_id,
    name: "Lubumbashi".into(),
    province_id,
  })
  .await
  .unwrap();
  s.insert_commune(Commune {
    commune_id,
    name: "Kampemba".into(),
    entity_id,
  })
  .await
  .unwrap();

  commune_id
}

fn new_person(surname: &str, born: Option<NaiveDate>) -> NewPerson {
  NewPerson {
    surname:        surname.into(),
    patronymic:     None,
    given_names:    "Jean".into(),
    sex:            Sex::Male,
    birth_date:     born,
    birth_time:     None,
    birthplace:     Some("Lubumbashi".into()),
    vital_status:   VitalStatus::Alive,
    marital_status: MaritalStatus::Single,
    father_id:      None,
    mother_id:      None,
  }
}

fn death_act(
  number: &str,
  subject_id: Uuid,
  commune_id: Uuid,
  died_on: NaiveDate,
  registered_on: NaiveDate,
) -> NewAct {
  NewAct {
    number: ActNumber::new(number),
    subject_id,
    commune_id,
    officer: "Mwamba".into(),
    registered_on,
    declarant: None,
    witnesses: vec![],
    details: ActDetails::Death(DeathDetails {
      died_on,
      died_at: None,
      place: Some("Hôpital Sendwe".into()),
      cause: None,
      physician: None,
    }),
  }
}

fn birth_act(number: &str, subject_id: Uuid, commune_id: Uuid) -> NewAct {
  NewAct {
    number: ActNumber::new(number),
    subject_id,
    commune_id,
    officer: "Mwamba".into(),
    registered_on: d(2024, 3, 1),
    declarant: Some("Ilunga".into()),
    witnesses: vec!["Kalenga".into()],
    details: ActDetails::Birth,
  }
}

// ─── Persons ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_person() {
  let s = store().await;

  let person = s
    .add_person(new_person("Kabila", Some(d(1990, 5, 20))))
    .await
    .unwrap();
  assert_eq!(person.vital_status, VitalStatus::Alive);

  let fetched = s.get_person(person.person_id).await.unwrap().unwrap();
  assert_eq!(fetched.person_id, person.person_id);
  assert_eq!(fetched.surname, "Kabila");
  assert_eq!(fetched.birth_date, Some(d(1990, 5, 20)));
}

#[tokio::test]
async fn get_person_missing_returns_none() {
  let s = store().await;
  let result = s.get_person(Uuid::new_v4()).await.unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn put_person_replaces_whole_record() {
  let s = store().await;
  let person = s.add_person(new_person("Ngoy", None)).await.unwrap();

  let updated = Person {
    vital_status: VitalStatus::Deceased,
    marital_status: MaritalStatus::Married,
    ..person.clone()
  };
  s.put_person(updated).await.unwrap();

  let fetched = s.get_person(person.person_id).await.unwrap().unwrap();
  assert_eq!(fetched.vital_status, VitalStatus::Deceased);
  assert_eq!(fetched.marital_status, MaritalStatus::Married);
}

#[tokio::test]
async fn put_person_missing_errors() {
  let s = store().await;
  let person = s.add_person(new_person("Ngoy", None)).await.unwrap();
  let ghost = Person {
    person_id: Uuid::new_v4(),
    ..person
  };

  let err = s.put_person(ghost).await.unwrap_err();
  assert!(matches!(err, Error::PersonNotFound(_)));
}

// ─── Acts ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_act_and_find_by_number() {
  let s = store().await;
  let commune_id = seed_commune(&s).await;
  let subject = s.add_person(new_person("Mutombo", None)).await.unwrap();

  let act = s
    .add_act(death_act(
      "DEC-2024-001",
      subject.person_id,
      commune_id,
      d(2024, 2, 1),
      d(2024, 2, 10),
    ))
    .await
    .unwrap();

  // Lookup is against the normalised form.
  let found = s
    .find_act_by_number(ActKind::Death, &ActNumber::new("  dec-2024-001 "))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(found.act_id, act.act_id);

  // Same number under the other variant is free.
  let missing = s
    .find_act_by_number(ActKind::Birth, &ActNumber::new("DEC-2024-001"))
    .await
    .unwrap();
  assert!(missing.is_none());
}

#[tokio::test]
async fn duplicate_number_violates_constraint() {
  let s = store().await;
  let commune_id = seed_commune(&s).await;
  let a = s.add_person(new_person("Ilunga", None)).await.unwrap();
  let b = s.add_person(new_person("Banza", None)).await.unwrap();

  s.add_act(death_act(
    "DEC-2024-001",
    a.person_id,
    commune_id,
    d(2024, 2, 1),
    d(2024, 2, 10),
  ))
  .await
  .unwrap();

  let err = s
    .add_act(death_act(
      "DEC-2024-001",
      b.person_id,
      commune_id,
      d(2024, 2, 2),
      d(2024, 2, 11),
    ))
    .await
    .unwrap_err();
  assert!(err.is_constraint_violation());
}

#[tokio::test]
async fn second_act_for_subject_violates_constraint() {
  let s = store().await;
  let commune_id = seed_commune(&s).await;
  let subject = s.add_person(new_person("Kasongo", None)).await.unwrap();

  s.add_act(death_act(
    "DEC-2024-001",
    subject.person_id,
    commune_id,
    d(2024, 2, 1),
    d(2024, 2, 10),
  ))
  .await
  .unwrap();

  let err = s
    .add_act(death_act(
      "DEC-2024-002",
      subject.person_id,
      commune_id,
      d(2024, 2, 1),
      d(2024, 2, 10),
    ))
    .await
    .unwrap_err();
  assert!(err.is_constraint_violation());

  // A birth act for the same subject is a different variant and goes in.
  s.add_act(birth_act("N-2024-100", subject.person_id, commune_id))
    .await
    .unwrap();
}

#[tokio::test]
async fn act_exists_for_subject_is_per_variant() {
  let s = store().await;
  let commune_id = seed_commune(&s).await;
  let subject = s.add_person(new_person("Kyungu", None)).await.unwrap();

  s.add_act(birth_act("N-2024-100", subject.person_id, commune_id))
    .await
    .unwrap();

  assert!(
    s.act_exists_for_subject(ActKind::Birth, subject.person_id)
      .await
      .unwrap()
  );
  assert!(
    !s.act_exists_for_subject(ActKind::Death, subject.person_id)
      .await
      .unwrap()
  );
}

#[tokio::test]
async fn delete_act_reports_absence() {
  let s = store().await;
  let commune_id = seed_commune(&s).await;
  let subject = s.add_person(new_person("Mbuyu", None)).await.unwrap();

  let act = s
    .add_act(birth_act("N-2024-100", subject.person_id, commune_id))
    .await
    .unwrap();

  assert!(s.delete_act(act.act_id).await.unwrap());
  assert!(!s.delete_act(act.act_id).await.unwrap());
  assert!(s.get_act(act.act_id).await.unwrap().is_none());
}

#[tokio::test]
async fn details_survive_roundtrip() {
  let s = store().await;
  let commune_id = seed_commune(&s).await;
  let subject = s.add_person(new_person("Tshisekedi", None)).await.unwrap();

  let mut input = death_act(
    "DEC-2024-009",
    subject.person_id,
    commune_id,
    d(2024, 1, 5),
    d(2024, 1, 20),
  );
  if let ActDetails::Death(ref mut death) = input.details {
    death.cause = Some("paludisme".into());
    death.physician = Some("Dr Kalala".into());
  }

  let act = s.add_act(input).await.unwrap();
  let fetched = s.get_act(act.act_id).await.unwrap().unwrap();

  assert!(matches!(
    fetched.details,
    ActDetails::Death(ref death)
      if death.cause.as_deref() == Some("paludisme")
        && death.physician.as_deref() == Some("Dr Kalala")
        && death.died_on == d(2024, 1, 5)
  ));
}

// ─── Act search ──────────────────────────────────────────────────────────────

async fn seed_three_acts(s: &SqliteStore) -> Uuid {
  let commune_id = seed_commune(s).await;

  let a = s
    .add_person(new_person("Kalonji", Some(d(1950, 1, 1))))
    .await
    .unwrap();
  let b = s
    .add_person(new_person("Mwepu", Some(d(1960, 1, 1))))
    .await
    .unwrap();
  let c = s.add_person(new_person("Ngalula", None)).await.unwrap();

  s.add_act(death_act(
    "DEC-2024-001",
    a.person_id,
    commune_id,
    d(2024, 1, 10),
    d(2024, 1, 15),
  ))
  .await
  .unwrap();
  s.add_act(death_act(
    "DEC-2024-002",
    b.person_id,
    commune_id,
    d(2024, 2, 10),
    d(2024, 2, 15),
  ))
  .await
  .unwrap();
  s.add_act(birth_act("N-2024-100", c.person_id, commune_id))
    .await
    .unwrap();

  commune_id
}

#[tokio::test]
async fn search_acts_without_criteria_returns_everything() {
  let s = store().await;
  seed_three_acts(&s).await;

  let page = s
    .search_acts(&ActQuery::default(), &PageRequest::new(0, 10).unwrap())
    .await
    .unwrap();
  assert_eq!(page.total, 3);
  assert_eq!(page.content.len(), 3);
}

#[tokio::test]
async fn search_acts_by_kind() {
  let s = store().await;
  seed_three_acts(&s).await;

  let query = ActQuery {
    kind: Some(ActKind::Death),
    ..Default::default()
  };
  let page = s
    .search_acts(&query, &PageRequest::new(0, 10).unwrap())
    .await
    .unwrap();
  assert_eq!(page.total, 2);
  assert!(page.content.iter().all(|a| a.kind() == ActKind::Death));
}

#[tokio::test]
async fn search_acts_by_subject_name_fragment() {
  let s = store().await;
  seed_three_acts(&s).await;

  let query = ActQuery {
    subject_name: Some("kalon".into()),
    ..Default::default()
  };
  let page = s
    .search_acts(&query, &PageRequest::new(0, 10).unwrap())
    .await
    .unwrap();
  assert_eq!(page.total, 1);
  assert_eq!(page.content[0].number.as_str(), "DEC-2024-001");
}

#[tokio::test]
async fn search_acts_by_decisive_date_range() {
  let s = store().await;
  seed_three_acts(&s).await;

  let query = ActQuery {
    kind: Some(ActKind::Death),
    decisive_from: Some(d(2024, 2, 1)),
    ..Default::default()
  };
  let page = s
    .search_acts(&query, &PageRequest::new(0, 10).unwrap())
    .await
    .unwrap();
  assert_eq!(page.total, 1);
  assert_eq!(page.content[0].number.as_str(), "DEC-2024-002");
}

#[tokio::test]
async fn search_acts_sorted_descending_with_paging() {
  let s = store().await;
  seed_three_acts(&s).await;

  let query = ActQuery {
    sort: ActSortField::Number,
    dir: SortDir::Desc,
    ..Default::default()
  };
  let first = s
    .search_acts(&query, &PageRequest::new(0, 2).unwrap())
    .await
    .unwrap();
  assert_eq!(first.total, 3);
  assert_eq!(first.content.len(), 2);
  assert_eq!(first.content[0].number.as_str(), "N-2024-100");
  assert!(first.has_next);
  assert!(first.is_first);

  let second = s
    .search_acts(&query, &PageRequest::new(1, 2).unwrap())
    .await
    .unwrap();
  assert_eq!(second.content.len(), 1);
  assert_eq!(second.content[0].number.as_str(), "DEC-2024-001");
  assert!(second.is_last);
  assert!(second.has_previous);
}

// ─── Person search ───────────────────────────────────────────────────────────

#[tokio::test]
async fn search_persons_by_age_window() {
  let s = store().await;
  let today = chrono::Utc::now().date_naive();

  // ~30 and ~70 years old, plus one with no birth date.
  s.add_person(new_person(
    "Trentenaire",
    today.checked_sub_months(chrono::Months::new(30 * 12 + 6)),
  ))
  .await
  .unwrap();
  s.add_person(new_person(
    "Septuagenaire",
    today.checked_sub_months(chrono::Months::new(70 * 12 + 6)),
  ))
  .await
  .unwrap();
  s.add_person(new_person("Inconnu", None)).await.unwrap();

  let query = PersonQuery {
    age_min: Some(20),
    age_max: Some(40),
    ..Default::default()
  };
  let page = s
    .search_persons(&query, &PageRequest::new(0, 10).unwrap())
    .await
    .unwrap();
  assert_eq!(page.total, 1);
  assert_eq!(page.content[0].surname, "Trentenaire");
}

#[tokio::test]
async fn search_persons_without_criteria_returns_everything() {
  let s = store().await;
  s.add_person(new_person("Un", None)).await.unwrap();
  s.add_person(new_person("Deux", Some(d(2000, 1, 1))))
    .await
    .unwrap();

  let page = s
    .search_persons(&PersonQuery::default(), &PageRequest::new(0, 10).unwrap())
    .await
    .unwrap();
  assert_eq!(page.total, 2);
}

// ─── Views ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn resolve_act_carries_territorial_names() {
  let s = store().await;
  let commune_id = seed_commune(&s).await;
  let subject = s
    .add_person(new_person("Mukendi", Some(d(1940, 7, 1))))
    .await
    .unwrap();

  let act = s
    .add_act(death_act(
      "DEC-2024-033",
      subject.person_id,
      commune_id,
      d(2024, 3, 1),
      d(2024, 3, 5),
    ))
    .await
    .unwrap();

  let view = s.resolve_act(act.act_id).await.unwrap().unwrap();
  assert_eq!(view.act.act_id, act.act_id);
  assert_eq!(view.subject.person_id, subject.person_id);
  assert_eq!(view.commune, "Kampemba");
  assert_eq!(view.entity, "Lubumbashi");
  assert_eq!(view.province, "Haut-Katanga");
}

#[tokio::test]
async fn resolve_act_missing_returns_none() {
  let s = store().await;
  assert!(s.resolve_act(Uuid::new_v4()).await.unwrap().is_none());
}

// ─── Territory ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn communes_are_listed_by_name() {
  let s = store().await;
  let commune_id = seed_commune(&s).await;

  let fetched = s.get_commune(commune_id).await.unwrap().unwrap();
  assert_eq!(fetched.name, "Kampemba");

  let all = s.list_communes().await.unwrap();
  assert_eq!(all.len(), 1);
  assert!(s.get_commune(Uuid::new_v4()).await.unwrap().is_none());
}

//! [`SqliteStore`] — the SQLite implementation of [`RegistryStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, params_from_iter, types::Value};
use uuid::Uuid;

use greffe_core::{
  act::{Act, ActKind, ActNumber, NewAct},
  person::{NewPerson, Person},
  query::{
    ActQuery, ActSortField, Page, PageRequest, PersonQuery, PersonSortField,
    SortDir,
  },
  store::RegistryStore,
  territory::{Commune, Entity, Province},
  view::ActView,
};

use crate::{
  Error, Result,
  encode::{
    RawAct, RawCommune, RawPerson, encode_date, encode_dt, encode_sex,
    encode_time, encode_uuid, encode_vital_status, encode_witnesses,
    encode_marital_status,
  },
  schema::SCHEMA,
};

const PERSON_COLS: &str = "person_id, surname, patronymic, given_names, sex, \
   birth_date, birth_time, birthplace, vital_status, marital_status, \
   father_id, mother_id, created_at";

const ACT_COLS: &str = "act_id, kind, number, subject_id, commune_id, \
   officer, registered_on, declarant, witnesses, details_json, recorded_at";

/// The decisive date of an act row: the death date from the variant payload
/// for death acts, the subject's birth date for birth acts.
const DECISIVE_EXPR: &str =
  "COALESCE(json_extract(a.details_json, '$.died_on'), p.birth_date)";

fn prefixed(prefix: &str, cols: &str) -> String {
  cols
    .split(", ")
    .map(|c| format!("{prefix}.{}", c.trim()))
    .collect::<Vec<_>>()
    .join(", ")
}

fn dir_sql(dir: SortDir) -> &'static str {
  match dir {
    SortDir::Asc => "ASC",
    SortDir::Desc => "DESC",
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A registry store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Territory seeding ─────────────────────────────────────────────────
  //
  // Not part of [`RegistryStore`]: the engine only reads territorial data.
  // These exist for administrative seeding and tests.

  pub async fn insert_province(&self, province: Province) -> Result<()> {
    let id = encode_uuid(province.province_id);
    let name = province.name;
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO provinces (province_id, name) VALUES (?1, ?2)",
          rusqlite::params![id, name],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn insert_entity(&self, entity: Entity) -> Result<()> {
    let id = encode_uuid(entity.entity_id);
    let name = entity.name;
    let province_id = encode_uuid(entity.province_id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO entities (entity_id, name, province_id) VALUES (?1, ?2, ?3)",
          rusqlite::params![id, name, province_id],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn insert_commune(&self, commune: Commune) -> Result<()> {
    let id = encode_uuid(commune.commune_id);
    let name = commune.name;
    let entity_id = encode_uuid(commune.entity_id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO communes (commune_id, name, entity_id) VALUES (?1, ?2, ?3)",
          rusqlite::params![id, name, entity_id],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Row writers ───────────────────────────────────────────────────────

  /// Insert a fully-built [`Person`] into the `persons` table.
  async fn insert_person(&self, person: &Person) -> Result<()> {
    let args = person_args(person)?;
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO persons (
             person_id, surname, patronymic, given_names, sex,
             birth_date, birth_time, birthplace, vital_status,
             marital_status, father_id, mother_id, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
          params_from_iter(args.iter()),
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert a fully-built [`Act`] into the `acts` table.
  async fn insert_act(&self, act: &Act) -> Result<()> {
    let args = act_args(act)?;
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO acts (
             act_id, kind, number, subject_id, commune_id, officer,
             registered_on, declarant, witnesses, details_json, recorded_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          params_from_iter(args.iter()),
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Column values for a `persons` row, in [`PERSON_COLS`] order.
fn person_args(person: &Person) -> Result<Vec<Value>> {
  fn text_opt(v: Option<String>) -> Value {
    v.map(Value::Text).unwrap_or(Value::Null)
  }

  Ok(vec![
    Value::Text(encode_uuid(person.person_id)),
    Value::Text(person.surname.clone()),
    text_opt(person.patronymic.clone()),
    Value::Text(person.given_names.clone()),
    Value::Text(encode_sex(person.sex).to_owned()),
    text_opt(person.birth_date.map(encode_date)),
    text_opt(person.birth_time.map(encode_time)),
    text_opt(person.birthplace.clone()),
    Value::Text(encode_vital_status(person.vital_status).to_owned()),
    Value::Text(encode_marital_status(person.marital_status).to_owned()),
    text_opt(person.father_id.map(encode_uuid)),
    text_opt(person.mother_id.map(encode_uuid)),
    Value::Text(encode_dt(person.created_at)),
  ])
}

/// Column values for an `acts` row, in [`ACT_COLS`] order.
fn act_args(act: &Act) -> Result<Vec<Value>> {
  Ok(vec![
    Value::Text(encode_uuid(act.act_id)),
    Value::Text(act.kind().as_str().to_owned()),
    Value::Text(act.number.as_str().to_owned()),
    Value::Text(encode_uuid(act.subject_id)),
    Value::Text(encode_uuid(act.commune_id)),
    Value::Text(act.officer.clone()),
    Value::Text(encode_date(act.registered_on)),
    act
      .declarant
      .clone()
      .map(Value::Text)
      .unwrap_or(Value::Null),
    Value::Text(encode_witnesses(&act.witnesses)?),
    Value::Text(act.details.to_json().map_err(Error::Core)?.to_string()),
    Value::Text(encode_dt(act.recorded_at)),
  ])
}

// ─── RegistryStore impl ──────────────────────────────────────────────────────

impl RegistryStore for SqliteStore {
  type Error = Error;

  fn is_conflict(err: &Error) -> bool { err.is_constraint_violation() }

  // ── Persons ───────────────────────────────────────────────────────────

  async fn add_person(&self, input: NewPerson) -> Result<Person> {
    let person = Person {
      person_id:      Uuid::new_v4(),
      surname:        input.surname,
      patronymic:     input.patronymic,
      given_names:    input.given_names,
      sex:            input.sex,
      birth_date:     input.birth_date,
      birth_time:     input.birth_time,
      birthplace:     input.birthplace,
      vital_status:   input.vital_status,
      marital_status: input.marital_status,
      father_id:      input.father_id,
      mother_id:      input.mother_id,
      created_at:     Utc::now(),
    };

    self.insert_person(&person).await?;
    Ok(person)
  }

  async fn get_person(&self, id: Uuid) -> Result<Option<Person>> {
    let id_str = encode_uuid(id);
    let sql =
      format!("SELECT {PERSON_COLS} FROM persons WHERE person_id = ?1");

    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], |row| {
              RawPerson::read(row, 0)
            })
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn put_person(&self, person: Person) -> Result<()> {
    let person_id = person.person_id;
    let mut args = person_args(&person)?;
    // Rotate the id to the end for the WHERE clause.
    let id = args.remove(0);
    args.push(id);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE persons SET
             surname = ?1, patronymic = ?2, given_names = ?3, sex = ?4,
             birth_date = ?5, birth_time = ?6, birthplace = ?7,
             vital_status = ?8, marital_status = ?9, father_id = ?10,
             mother_id = ?11, created_at = ?12
           WHERE person_id = ?13",
          params_from_iter(args.iter()),
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::PersonNotFound(person_id));
    }
    Ok(())
  }

  async fn search_persons(
    &self,
    query: &PersonQuery,
    page: &PageRequest,
  ) -> Result<Page<Person>> {
    let mut conds: Vec<String> = vec![];
    let mut args: Vec<Value> = vec![];

    if let Some(name) = &query.name {
      args.push(Value::Text(format!("%{}%", name.to_lowercase())));
      conds.push(format!(
        "LOWER(surname || ' ' || COALESCE(patronymic, '') || ' ' || given_names) LIKE ?{}",
        args.len()
      ));
    }
    if let Some(sex) = query.sex {
      args.push(Value::Text(encode_sex(sex).to_owned()));
      conds.push(format!("sex = ?{}", args.len()));
    }
    if let Some(status) = query.vital_status {
      args.push(Value::Text(encode_vital_status(status).to_owned()));
      conds.push(format!("vital_status = ?{}", args.len()));
    }
    if let Some(place) = &query.birthplace {
      args.push(Value::Text(format!("%{}%", place.to_lowercase())));
      conds.push(format!("LOWER(birthplace) LIKE ?{}", args.len()));
    }

    let (earliest, latest) =
      query.birth_date_window(Utc::now().date_naive());
    if let Some(earliest) = earliest {
      args.push(Value::Text(encode_date(earliest)));
      conds.push(format!("birth_date >= ?{}", args.len()));
    }
    if let Some(latest) = latest {
      args.push(Value::Text(encode_date(latest)));
      conds.push(format!("birth_date <= ?{}", args.len()));
    }

    let where_clause = if conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", conds.join(" AND "))
    };

    let order = match query.sort {
      PersonSortField::Surname => "surname",
      PersonSortField::BirthDate => "birth_date",
      PersonSortField::CreatedAt => "created_at",
    };
    let dir = dir_sql(query.dir);

    let count_sql = format!("SELECT COUNT(*) FROM persons {where_clause}");
    let page_sql = format!(
      "SELECT {PERSON_COLS} FROM persons {where_clause}
       ORDER BY {order} {dir}, person_id ASC LIMIT ?{} OFFSET ?{}",
      args.len() + 1,
      args.len() + 2
    );

    let count_args = args.clone();
    let mut page_args = args;
    page_args.push(Value::Integer(i64::from(page.size())));
    page_args.push(Value::Integer(page.offset() as i64));

    let (total, raws): (i64, Vec<RawPerson>) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          &count_sql,
          params_from_iter(count_args.iter()),
          |r| r.get(0),
        )?;

        let mut stmt = conn.prepare(&page_sql)?;
        let rows = stmt
          .query_map(params_from_iter(page_args.iter()), |row| {
            RawPerson::read(row, 0)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((total, rows))
      })
      .await?;

    let content = raws
      .into_iter()
      .map(RawPerson::into_person)
      .collect::<Result<Vec<_>>>()?;

    Ok(Page::new(content, total as u64, page))
  }

  // ── Acts ──────────────────────────────────────────────────────────────

  async fn add_act(&self, input: NewAct) -> Result<Act> {
    let act = Act {
      act_id:        Uuid::new_v4(),
      number:        input.number,
      subject_id:    input.subject_id,
      commune_id:    input.commune_id,
      officer:       input.officer,
      registered_on: input.registered_on,
      declarant:     input.declarant,
      witnesses:     input.witnesses,
      details:       input.details,
      recorded_at:   Utc::now(),
    };

    self.insert_act(&act).await?;
    Ok(act)
  }

  async fn get_act(&self, id: Uuid) -> Result<Option<Act>> {
    let id_str = encode_uuid(id);
    let sql = format!("SELECT {ACT_COLS} FROM acts WHERE act_id = ?1");

    let raw: Option<RawAct> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], |row| {
              RawAct::read(row, 0)
            })
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAct::into_act).transpose()
  }

  async fn find_act_by_number(
    &self,
    kind: ActKind,
    number: &ActNumber,
  ) -> Result<Option<Act>> {
    let kind_str = kind.as_str().to_owned();
    let number_str = number.as_str().to_owned();
    let sql =
      format!("SELECT {ACT_COLS} FROM acts WHERE kind = ?1 AND number = ?2");

    let raw: Option<RawAct> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![kind_str, number_str], |row| {
              RawAct::read(row, 0)
            })
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAct::into_act).transpose()
  }

  async fn act_exists_for_subject(
    &self,
    kind: ActKind,
    subject_id: Uuid,
  ) -> Result<bool> {
    let kind_str = kind.as_str().to_owned();
    let subject_str = encode_uuid(subject_id);

    let exists = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM acts WHERE kind = ?1 AND subject_id = ?2",
              rusqlite::params![kind_str, subject_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;

    Ok(exists)
  }

  async fn put_act(&self, act: Act) -> Result<()> {
    let act_id = act.act_id;
    let mut args = act_args(&act)?;
    let id = args.remove(0);
    args.push(id);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE acts SET
             kind = ?1, number = ?2, subject_id = ?3, commune_id = ?4,
             officer = ?5, registered_on = ?6, declarant = ?7,
             witnesses = ?8, details_json = ?9, recorded_at = ?10
           WHERE act_id = ?11",
          params_from_iter(args.iter()),
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::ActNotFound(act_id));
    }
    Ok(())
  }

  async fn delete_act(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM acts WHERE act_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }

  async fn search_acts(
    &self,
    query: &ActQuery,
    page: &PageRequest,
  ) -> Result<Page<Act>> {
    let mut conds: Vec<String> = vec![];
    let mut args: Vec<Value> = vec![];

    if let Some(kind) = query.kind {
      args.push(Value::Text(kind.as_str().to_owned()));
      conds.push(format!("a.kind = ?{}", args.len()));
    }
    if let Some(name) = &query.subject_name {
      args.push(Value::Text(format!("%{}%", name.to_lowercase())));
      conds.push(format!(
        "LOWER(p.surname || ' ' || COALESCE(p.patronymic, '') || ' ' || p.given_names) LIKE ?{}",
        args.len()
      ));
    }
    if let Some(officer) = &query.officer {
      args.push(Value::Text(format!("%{}%", officer.to_lowercase())));
      conds.push(format!("LOWER(a.officer) LIKE ?{}", args.len()));
    }
    if let Some(commune_id) = query.commune_id {
      args.push(Value::Text(encode_uuid(commune_id)));
      conds.push(format!("a.commune_id = ?{}", args.len()));
    }
    if let Some(from) = query.registered_from {
      args.push(Value::Text(encode_date(from)));
      conds.push(format!("a.registered_on >= ?{}", args.len()));
    }
    if let Some(to) = query.registered_to {
      args.push(Value::Text(encode_date(to)));
      conds.push(format!("a.registered_on <= ?{}", args.len()));
    }
    if let Some(from) = query.decisive_from {
      args.push(Value::Text(encode_date(from)));
      conds.push(format!("{DECISIVE_EXPR} >= ?{}", args.len()));
    }
    if let Some(to) = query.decisive_to {
      args.push(Value::Text(encode_date(to)));
      conds.push(format!("{DECISIVE_EXPR} <= ?{}", args.len()));
    }

    let where_clause = if conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", conds.join(" AND "))
    };

    let order = match query.sort {
      ActSortField::Number => "a.number".to_owned(),
      ActSortField::RegisteredOn => "a.registered_on".to_owned(),
      ActSortField::DecisiveDate => DECISIVE_EXPR.to_owned(),
    };
    let dir = dir_sql(query.dir);
    let act_cols = prefixed("a", ACT_COLS);

    let count_sql = format!(
      "SELECT COUNT(*) FROM acts a
       JOIN persons p ON p.person_id = a.subject_id {where_clause}"
    );
    let page_sql = format!(
      "SELECT {act_cols} FROM acts a
       JOIN persons p ON p.person_id = a.subject_id {where_clause}
       ORDER BY {order} {dir}, a.act_id ASC LIMIT ?{} OFFSET ?{}",
      args.len() + 1,
      args.len() + 2
    );

    let count_args = args.clone();
    let mut page_args = args;
    page_args.push(Value::Integer(i64::from(page.size())));
    page_args.push(Value::Integer(page.offset() as i64));

    let (total, raws): (i64, Vec<RawAct>) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          &count_sql,
          params_from_iter(count_args.iter()),
          |r| r.get(0),
        )?;

        let mut stmt = conn.prepare(&page_sql)?;
        let rows = stmt
          .query_map(params_from_iter(page_args.iter()), |row| {
            RawAct::read(row, 0)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((total, rows))
      })
      .await?;

    let content = raws
      .into_iter()
      .map(RawAct::into_act)
      .collect::<Result<Vec<_>>>()?;

    Ok(Page::new(content, total as u64, page))
  }

  async fn resolve_act(&self, id: Uuid) -> Result<Option<ActView>> {
    let id_str = encode_uuid(id);
    let act_cols = prefixed("a", ACT_COLS);
    let person_cols = prefixed("p", PERSON_COLS);
    let sql = format!(
      "SELECT {act_cols}, {person_cols}, c.name, e.name, pr.name
       FROM acts a
       JOIN persons   p  ON p.person_id   = a.subject_id
       JOIN communes  c  ON c.commune_id  = a.commune_id
       JOIN entities  e  ON e.entity_id   = c.entity_id
       JOIN provinces pr ON pr.province_id = e.province_id
       WHERE a.act_id = ?1"
    );

    let raw: Option<(RawAct, RawPerson, String, String, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], |row| {
              let act = RawAct::read(row, 0)?;
              let person = RawPerson::read(row, 11)?;
              let commune: String = row.get(24)?;
              let entity: String = row.get(25)?;
              let province: String = row.get(26)?;
              Ok((act, person, commune, entity, province))
            })
            .optional()?,
        )
      })
      .await?;

    let Some((raw_act, raw_person, commune, entity, province)) = raw else {
      return Ok(None);
    };

    Ok(Some(ActView {
      act: raw_act.into_act()?,
      subject: raw_person.into_person()?,
      commune,
      entity,
      province,
    }))
  }

  // ── Territory (read-only) ─────────────────────────────────────────────

  async fn get_commune(&self, id: Uuid) -> Result<Option<Commune>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawCommune> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT commune_id, name, entity_id FROM communes WHERE commune_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawCommune {
                  commune_id: row.get(0)?,
                  name:       row.get(1)?,
                  entity_id:  row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCommune::into_commune).transpose()
  }

  async fn list_communes(&self) -> Result<Vec<Commune>> {
    let raws: Vec<RawCommune> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare("SELECT commune_id, name, entity_id FROM communes ORDER BY name")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawCommune {
              commune_id: row.get(0)?,
              name:       row.get(1)?,
              entity_id:  row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCommune::into_commune).collect()
  }
}

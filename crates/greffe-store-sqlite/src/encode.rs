//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as
//! `YYYY-MM-DD`, times as `HH:MM:SS`. Witness lists are compact JSON.
//! UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use greffe_core::{
  act::{Act, ActDetails, ActKind, ActNumber},
  person::{MaritalStatus, Person, Sex, VitalStatus},
  territory::Commune,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Timestamps and dates ────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_time(t: NaiveTime) -> String { t.format("%H:%M:%S").to_string() }

pub fn decode_time(s: &str) -> Result<NaiveTime> {
  NaiveTime::parse_from_str(s, "%H:%M:%S")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn encode_sex(s: Sex) -> &'static str {
  match s {
    Sex::Male => "male",
    Sex::Female => "female",
  }
}

pub fn decode_sex(s: &str) -> Result<Sex> {
  match s {
    "male" => Ok(Sex::Male),
    "female" => Ok(Sex::Female),
    other => Err(Error::DateParse(format!("unknown sex: {other:?}"))),
  }
}

pub fn encode_vital_status(v: VitalStatus) -> &'static str {
  match v {
    VitalStatus::Alive => "alive",
    VitalStatus::Deceased => "deceased",
    VitalStatus::Unknown => "unknown",
  }
}

pub fn decode_vital_status(s: &str) -> Result<VitalStatus> {
  match s {
    "alive" => Ok(VitalStatus::Alive),
    "deceased" => Ok(VitalStatus::Deceased),
    "unknown" => Ok(VitalStatus::Unknown),
    other => Err(Error::DateParse(format!("unknown vital status: {other:?}"))),
  }
}

pub fn encode_marital_status(m: MaritalStatus) -> &'static str {
  match m {
    MaritalStatus::Single => "single",
    MaritalStatus::Married => "married",
    MaritalStatus::Widowed => "widowed",
    MaritalStatus::Divorced => "divorced",
  }
}

pub fn decode_marital_status(s: &str) -> Result<MaritalStatus> {
  match s {
    "single" => Ok(MaritalStatus::Single),
    "married" => Ok(MaritalStatus::Married),
    "widowed" => Ok(MaritalStatus::Widowed),
    "divorced" => Ok(MaritalStatus::Divorced),
    other => {
      Err(Error::DateParse(format!("unknown marital status: {other:?}")))
    }
  }
}

pub fn decode_act_kind(s: &str) -> Result<ActKind> {
  match s {
    "birth" => Ok(ActKind::Birth),
    "death" => Ok(ActKind::Death),
    other => Err(Error::DateParse(format!("unknown act kind: {other:?}"))),
  }
}

// ─── Witnesses ───────────────────────────────────────────────────────────────

pub fn encode_witnesses(w: &[String]) -> Result<String> {
  Ok(serde_json::to_string(w)?)
}

pub fn decode_witnesses(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `persons` row.
pub struct RawPerson {
  pub person_id:      String,
  pub surname:        String,
  pub patronymic:     Option<String>,
  pub given_names:    String,
  pub sex:            String,
  pub birth_date:     Option<String>,
  pub birth_time:     Option<String>,
  pub birthplace:     Option<String>,
  pub vital_status:   String,
  pub marital_status: String,
  pub father_id:      Option<String>,
  pub mother_id:      Option<String>,
  pub created_at:     String,
}

impl RawPerson {
  pub fn read(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      person_id:      row.get(offset)?,
      surname:        row.get(offset + 1)?,
      patronymic:     row.get(offset + 2)?,
      given_names:    row.get(offset + 3)?,
      sex:            row.get(offset + 4)?,
      birth_date:     row.get(offset + 5)?,
      birth_time:     row.get(offset + 6)?,
      birthplace:     row.get(offset + 7)?,
      vital_status:   row.get(offset + 8)?,
      marital_status: row.get(offset + 9)?,
      father_id:      row.get(offset + 10)?,
      mother_id:      row.get(offset + 11)?,
      created_at:     row.get(offset + 12)?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      person_id:      decode_uuid(&self.person_id)?,
      surname:        self.surname,
      patronymic:     self.patronymic,
      given_names:    self.given_names,
      sex:            decode_sex(&self.sex)?,
      birth_date:     self.birth_date.as_deref().map(decode_date).transpose()?,
      birth_time:     self.birth_time.as_deref().map(decode_time).transpose()?,
      birthplace:     self.birthplace,
      vital_status:   decode_vital_status(&self.vital_status)?,
      marital_status: decode_marital_status(&self.marital_status)?,
      father_id:      self.father_id.as_deref().map(decode_uuid).transpose()?,
      mother_id:      self.mother_id.as_deref().map(decode_uuid).transpose()?,
      created_at:     decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `acts` row.
pub struct RawAct {
  pub act_id:        String,
  pub kind:          String,
  pub number:        String,
  pub subject_id:    String,
  pub commune_id:    String,
  pub officer:       String,
  pub registered_on: String,
  pub declarant:     Option<String>,
  pub witnesses:     String,
  pub details_json:  String,
  pub recorded_at:   String,
}

impl RawAct {
  pub fn read(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      act_id:        row.get(offset)?,
      kind:          row.get(offset + 1)?,
      number:        row.get(offset + 2)?,
      subject_id:    row.get(offset + 3)?,
      commune_id:    row.get(offset + 4)?,
      officer:       row.get(offset + 5)?,
      registered_on: row.get(offset + 6)?,
      declarant:     row.get(offset + 7)?,
      witnesses:     row.get(offset + 8)?,
      details_json:  row.get(offset + 9)?,
      recorded_at:   row.get(offset + 10)?,
    })
  }

  pub fn into_act(self) -> Result<Act> {
    let kind = decode_act_kind(&self.kind)?;
    let payload: serde_json::Value = serde_json::from_str(&self.details_json)?;
    let details = ActDetails::from_parts(kind, payload)?;

    Ok(Act {
      act_id:        decode_uuid(&self.act_id)?,
      number:        ActNumber::new(&self.number),
      subject_id:    decode_uuid(&self.subject_id)?,
      commune_id:    decode_uuid(&self.commune_id)?,
      officer:       self.officer,
      registered_on: decode_date(&self.registered_on)?,
      declarant:     self.declarant,
      witnesses:     decode_witnesses(&self.witnesses)?,
      details,
      recorded_at:   decode_dt(&self.recorded_at)?,
    })
  }
}

/// Raw strings read directly from a `communes` row.
pub struct RawCommune {
  pub commune_id: String,
  pub name:       String,
  pub entity_id:  String,
}

impl RawCommune {
  pub fn into_commune(self) -> Result<Commune> {
    Ok(Commune {
      commune_id: decode_uuid(&self.commune_id)?,
      name:       self.name,
      entity_id:  decode_uuid(&self.entity_id)?,
    })
  }
}

//! SQL schema for the greffe SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS provinces (
    province_id TEXT PRIMARY KEY,
    name        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS entities (
    entity_id   TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    province_id TEXT NOT NULL REFERENCES provinces(province_id)
);

CREATE TABLE IF NOT EXISTS communes (
    commune_id TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    entity_id  TEXT NOT NULL REFERENCES entities(entity_id)
);

-- father_id / mother_id are weak references on purpose: lookup only, no
-- ownership, no cascade.
CREATE TABLE IF NOT EXISTS persons (
    person_id      TEXT PRIMARY KEY,
    surname        TEXT NOT NULL,
    patronymic     TEXT,
    given_names    TEXT NOT NULL,
    sex            TEXT NOT NULL,   -- 'male' | 'female'
    birth_date     TEXT,            -- ISO 8601 date
    birth_time     TEXT,            -- HH:MM:SS
    birthplace     TEXT,
    vital_status   TEXT NOT NULL DEFAULT 'alive',
    marital_status TEXT NOT NULL DEFAULT 'single',
    father_id      TEXT,
    mother_id      TEXT,
    created_at     TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

-- The two UNIQUE indexes are the enforcement point for number uniqueness
-- and one-act-per-subject; application pre-checks only pretty up the error.
CREATE TABLE IF NOT EXISTS acts (
    act_id        TEXT PRIMARY KEY,
    kind          TEXT NOT NULL,    -- 'birth' | 'death'
    number        TEXT NOT NULL,    -- normalised upper-case
    subject_id    TEXT NOT NULL REFERENCES persons(person_id),
    commune_id    TEXT NOT NULL REFERENCES communes(commune_id),
    officer       TEXT NOT NULL,
    registered_on TEXT NOT NULL,
    declarant     TEXT,
    witnesses     TEXT NOT NULL DEFAULT '[]',
    details_json  TEXT NOT NULL,    -- variant payload (inner data only)
    recorded_at   TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS acts_number_idx  ON acts(kind, number);
CREATE UNIQUE INDEX IF NOT EXISTS acts_subject_idx ON acts(kind, subject_id);
CREATE INDEX IF NOT EXISTS acts_registered_idx ON acts(registered_on);
CREATE INDEX IF NOT EXISTS persons_surname_idx ON persons(surname);

PRAGMA user_version = 1;
";

#![forbid(unsafe_code)]

use super::super::StoreError;
use rusqlite::{Connection, params};

pub(in crate::store) fn install_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode=WAL;
        PRAGMA synchronous=NORMAL;

        CREATE TABLE IF NOT EXISTS meta (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS counters (
          name TEXT PRIMARY KEY,
          value INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS cards (
          id TEXT PRIMARY KEY,
          pipeline TEXT NOT NULL,
          entity_kind TEXT NOT NULL,
          entity_id TEXT NOT NULL,
          stage TEXT NOT NULL,
          stage_color TEXT NOT NULL,
          position INTEGER NOT NULL,
          tags_json TEXT NOT NULL DEFAULT '[]',
          amount REAL,
          capture_date_ms INTEGER,
          notes TEXT,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL,
          deleted_at_ms INTEGER
        );

        CREATE INDEX IF NOT EXISTS idx_cards_partition
          ON cards(pipeline, stage, position)
          WHERE deleted_at_ms IS NULL;

        CREATE TABLE IF NOT EXISTS stage_registry (
          pipeline TEXT NOT NULL,
          label TEXT NOT NULL,
          color TEXT NOT NULL,
          ordinal INTEGER NOT NULL,
          PRIMARY KEY (pipeline, label)
        );
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO meta(key, value) VALUES (?1, ?2)",
        params!["schema_version", "v1"],
    )?;

    Ok(())
}

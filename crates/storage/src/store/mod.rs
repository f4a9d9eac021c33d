#![forbid(unsafe_code)]

mod cards;
mod error;
mod requests;
mod stages;
mod support;

pub use error::StoreError;
pub use requests::*;

use pb_core::ids::{CardId, PipelineId, canonical_stage_label};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DB_FILE: &str = "pipeboard.db";

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    storage_dir: PathBuf,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let db_path = storage_dir.join(DB_FILE);
        let conn = Connection::open(db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        support::install_schema(&conn)?;

        Ok(Self { conn, storage_dir })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }
}

fn canonicalize_pipeline(value: &str) -> Result<PipelineId, StoreError> {
    PipelineId::try_new(value).map_err(|_| StoreError::InvalidInput("pipeline id is invalid"))
}

fn canonicalize_card_id(value: &str) -> Result<CardId, StoreError> {
    CardId::try_new(value).map_err(|_| StoreError::InvalidInput("card id is invalid"))
}

fn canonicalize_stage(value: &str) -> Result<String, StoreError> {
    canonical_stage_label(value).map_err(|err| StoreError::InvalidInput(err.message()))
}

fn canonicalize_color(value: &str) -> Result<String, StoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StoreError::InvalidInput("stage color must not be empty"));
    }
    if trimmed.len() > 64 {
        return Err(StoreError::InvalidInput("stage color exceeds 64 bytes"));
    }
    Ok(trimmed.to_string())
}

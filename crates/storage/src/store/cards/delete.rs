#![forbid(unsafe_code)]

use super::super::support::{close_gap_tx, load_live_card_tx, now_ms};
use super::super::{SqliteStore, StoreError, canonicalize_card_id, canonicalize_pipeline};
use rusqlite::params;

impl SqliteStore {
    /// Soft delete. The vacated slot is reclaimed in the same transaction, so
    /// the partition never shows a gap to another connection.
    pub fn delete_card(&mut self, pipeline_id: &str, card_id: &str) -> Result<(), StoreError> {
        let pipeline = canonicalize_pipeline(pipeline_id)?;
        let card_id = canonicalize_card_id(card_id)?;
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let card = load_live_card_tx(&tx, card_id.as_str())?.ok_or(StoreError::NotFound)?;
        if card.pipeline_id != pipeline.as_str() {
            return Err(StoreError::InvalidReference {
                expected: pipeline.as_str().to_string(),
                actual: card.pipeline_id,
            });
        }

        tx.execute(
            "UPDATE cards SET deleted_at_ms=?1, updated_at_ms=?1 WHERE id=?2",
            params![now_ms, card.id],
        )?;
        close_gap_tx(&tx, &card.pipeline_id, &card.stage, card.position)?;

        tx.commit()?;
        Ok(())
    }
}

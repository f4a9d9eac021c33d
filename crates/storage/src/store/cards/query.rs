#![forbid(unsafe_code)]

use super::super::support::{CARD_COLUMNS, card_from_row};
use super::super::{
    SqliteStore, StoreError, canonicalize_card_id, canonicalize_pipeline, canonicalize_stage,
};
use pb_core::model::Card;
use rusqlite::{OptionalExtension, params};

impl SqliteStore {
    pub fn get_card(&self, pipeline_id: &str, card_id: &str) -> Result<Card, StoreError> {
        let pipeline = canonicalize_pipeline(pipeline_id)?;
        let card_id = canonicalize_card_id(card_id)?;
        let card = self
            .conn
            .query_row(
                &format!("SELECT {CARD_COLUMNS} FROM cards WHERE id=?1 AND deleted_at_ms IS NULL"),
                params![card_id.as_str()],
                card_from_row,
            )
            .optional()?
            .ok_or(StoreError::NotFound)?;
        if card.pipeline_id != pipeline.as_str() {
            return Err(StoreError::InvalidReference {
                expected: pipeline.as_str().to_string(),
                actual: card.pipeline_id,
            });
        }
        Ok(card)
    }

    /// Live cards of one partition, ordered by position.
    pub fn cards_by_partition(
        &self,
        pipeline_id: &str,
        stage: &str,
    ) -> Result<Vec<Card>, StoreError> {
        let pipeline = canonicalize_pipeline(pipeline_id)?;
        let stage = canonicalize_stage(stage)?;
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {CARD_COLUMNS} FROM cards
            WHERE pipeline=?1 AND stage=?2 AND deleted_at_ms IS NULL
            ORDER BY position, rowid
            "#
        ))?;
        let cards = stmt
            .query_map(params![pipeline.as_str(), stage], card_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(cards)
    }

    /// Full-board refetch: every live card of the pipeline, ordered by stage
    /// label, positions ascending within each stage. Column order on the
    /// board comes from the display-order merge, not from this listing.
    pub fn cards_by_pipeline(&self, pipeline_id: &str) -> Result<Vec<Card>, StoreError> {
        let pipeline = canonicalize_pipeline(pipeline_id)?;
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {CARD_COLUMNS} FROM cards
            WHERE pipeline=?1 AND deleted_at_ms IS NULL
            ORDER BY stage, position, rowid
            "#
        ))?;
        let cards = stmt
            .query_map(params![pipeline.as_str()], card_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(cards)
    }
}

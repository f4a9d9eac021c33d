#![forbid(unsafe_code)]

use super::super::support::{
    load_live_card_tx, next_counter_tx, now_ms, partition_len_tx, tags_to_json,
};
use super::super::{CreateCardRequest, SqliteStore, StoreError, canonicalize_color, canonicalize_pipeline, canonicalize_stage};
use pb_core::model::{EntityKind, EntityRef, normalize_tags};
use rusqlite::params;

impl SqliteStore {
    /// Creates a card at the end of its partition. Creating the first card of
    /// an unknown stage label implicitly creates the stage.
    pub fn create_card(
        &mut self,
        request: CreateCardRequest,
    ) -> Result<pb_core::model::Card, StoreError> {
        let CreateCardRequest {
            pipeline_id,
            entity_kind,
            entity_id,
            stage,
            stage_color,
            tags,
            amount,
            capture_date_ms,
            notes,
        } = request;

        let pipeline = canonicalize_pipeline(&pipeline_id)?;
        let stage = canonicalize_stage(&stage)?;
        let stage_color = canonicalize_color(&stage_color)?;
        let kind = EntityKind::parse(&entity_kind)
            .ok_or(StoreError::InvalidInput("entity kind must be client or contact"))?;
        let entity = EntityRef::try_new(kind, entity_id)
            .map_err(|_| StoreError::InvalidInput("entity id must not be empty"))?;
        let tags = normalize_tags(&tags).map_err(|err| StoreError::InvalidInput(err.message()))?;
        let tags_json = tags_to_json(&tags)?;
        if amount.is_some_and(|a| !a.is_finite()) {
            return Err(StoreError::InvalidInput("amount must be finite"));
        }

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let position = partition_len_tx(&tx, pipeline.as_str(), &stage)?;
        let seq = next_counter_tx(&tx, "card_seq")?;
        let id = format!("card_{seq:06}");

        tx.execute(
            r#"
            INSERT INTO cards(
              id, pipeline, entity_kind, entity_id, stage, stage_color, position,
              tags_json, amount, capture_date_ms, notes, created_at_ms, updated_at_ms
            )
            VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13)
            "#,
            params![
                id,
                pipeline.as_str(),
                entity.kind.as_str(),
                entity.id,
                stage,
                stage_color,
                position,
                tags_json,
                amount,
                capture_date_ms,
                notes,
                now_ms,
                now_ms
            ],
        )?;

        let card = load_live_card_tx(&tx, &id)?.ok_or(StoreError::NotFound)?;
        tx.commit()?;
        Ok(card)
    }
}

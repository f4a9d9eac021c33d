#![forbid(unsafe_code)]

use super::super::support::{load_live_card_tx, now_ms, tags_to_json};
use super::super::{
    SqliteStore, StoreError, UpdateCardRequest, canonicalize_card_id, canonicalize_pipeline,
};
use pb_core::model::{Card, EntityKind, EntityRef, normalize_tags};
use rusqlite::params;

impl SqliteStore {
    /// Partial update of a card's descriptive fields. Stage and position are
    /// not updatable here; placement goes through `move_card` so the position
    /// invariant stays under the move coordinator's control.
    pub fn update_card(&mut self, request: UpdateCardRequest) -> Result<Card, StoreError> {
        let UpdateCardRequest {
            pipeline_id,
            card_id,
            entity_kind,
            entity_id,
            tags,
            amount,
            capture_date_ms,
            notes,
        } = request;

        let pipeline = canonicalize_pipeline(&pipeline_id)?;
        let card_id = canonicalize_card_id(&card_id)?;
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let mut card = load_live_card_tx(&tx, card_id.as_str())?.ok_or(StoreError::NotFound)?;
        if card.pipeline_id != pipeline.as_str() {
            return Err(StoreError::InvalidReference {
                expected: pipeline.as_str().to_string(),
                actual: card.pipeline_id,
            });
        }

        if let Some(raw) = entity_kind {
            let kind = EntityKind::parse(&raw)
                .ok_or(StoreError::InvalidInput("entity kind must be client or contact"))?;
            card.entity.kind = kind;
        }
        if let Some(id) = entity_id {
            card.entity = EntityRef::try_new(card.entity.kind, id)
                .map_err(|_| StoreError::InvalidInput("entity id must not be empty"))?;
        }
        if let Some(raw_tags) = tags {
            card.tags =
                normalize_tags(&raw_tags).map_err(|err| StoreError::InvalidInput(err.message()))?;
        }
        if let Some(amount) = amount {
            if amount.is_some_and(|a| !a.is_finite()) {
                return Err(StoreError::InvalidInput("amount must be finite"));
            }
            card.amount = amount;
        }
        if let Some(capture_date_ms) = capture_date_ms {
            card.capture_date_ms = capture_date_ms;
        }
        if let Some(notes) = notes {
            card.notes = notes;
        }
        card.updated_at_ms = now_ms;

        let tags_json = tags_to_json(&card.tags)?;
        tx.execute(
            r#"
            UPDATE cards SET
              entity_kind=?1, entity_id=?2, tags_json=?3, amount=?4,
              capture_date_ms=?5, notes=?6, updated_at_ms=?7
            WHERE id=?8
            "#,
            params![
                card.entity.kind.as_str(),
                card.entity.id,
                tags_json,
                card.amount,
                card.capture_date_ms,
                card.notes,
                now_ms,
                card.id
            ],
        )?;

        tx.commit()?;
        Ok(card)
    }
}

#![forbid(unsafe_code)]

use super::super::support::{
    close_gap_tx, latest_color_tx, load_live_card_tx, now_ms, open_gap_tx, partition_len_tx,
    registered_color_tx,
};
use super::super::{
    MoveCardRequest, SqliteStore, StoreError, canonicalize_card_id, canonicalize_color,
    canonicalize_pipeline, canonicalize_stage,
};
use pb_core::model::Card;
use rusqlite::params;

impl SqliteStore {
    /// Relocates one card: same-stage reorder or cross-partition transfer.
    /// Every position write of one call happens in one transaction; the
    /// density invariant holds in both partitions at commit.
    ///
    /// A target past the end clamps to the append slot instead of erroring,
    /// because client-computed indices race with concurrent inserts.
    pub fn move_card(&mut self, request: MoveCardRequest) -> Result<Card, StoreError> {
        let MoveCardRequest {
            pipeline_id,
            card_id,
            target_stage,
            target_position,
            color_override,
        } = request;

        let pipeline = canonicalize_pipeline(&pipeline_id)?;
        let card_id = canonicalize_card_id(&card_id)?;
        let target_stage = canonicalize_stage(&target_stage)?;
        let color_override = color_override
            .as_deref()
            .map(canonicalize_color)
            .transpose()?;
        if target_position < 0 {
            return Err(StoreError::InvalidPosition {
                given: target_position,
            });
        }

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let card = load_live_card_tx(&tx, card_id.as_str())?.ok_or(StoreError::NotFound)?;
        if card.pipeline_id != pipeline.as_str() {
            return Err(StoreError::InvalidReference {
                expected: pipeline.as_str().to_string(),
                actual: card.pipeline_id,
            });
        }

        if card.stage == target_stage {
            // The card already occupies a slot, so the highest reachable
            // position is N-1, not the append slot.
            let len = partition_len_tx(&tx, &card.pipeline_id, &card.stage)?;
            let target = target_position.min(len - 1).max(0);
            if target == card.position {
                return Ok(card);
            }

            if target > card.position {
                tx.execute(
                    r#"
                    UPDATE cards SET position = position - 1
                    WHERE pipeline=?1 AND stage=?2 AND deleted_at_ms IS NULL
                      AND position > ?3 AND position <= ?4
                    "#,
                    params![card.pipeline_id, card.stage, card.position, target],
                )?;
            } else {
                tx.execute(
                    r#"
                    UPDATE cards SET position = position + 1
                    WHERE pipeline=?1 AND stage=?2 AND deleted_at_ms IS NULL
                      AND position >= ?3 AND position < ?4
                    "#,
                    params![card.pipeline_id, card.stage, target, card.position],
                )?;
            }
            tx.execute(
                "UPDATE cards SET position=?1, updated_at_ms=?2 WHERE id=?3",
                params![target, now_ms, card.id],
            )?;
        } else {
            let dest_len = partition_len_tx(&tx, &card.pipeline_id, &target_stage)?;
            let target = target_position.min(dest_len);

            let color = match color_override {
                Some(color) => color,
                None => match latest_color_tx(&tx, &card.pipeline_id, &target_stage)? {
                    Some(color) => color,
                    None => registered_color_tx(&tx, &card.pipeline_id, &target_stage)?
                        .unwrap_or_else(|| card.stage_color.clone()),
                },
            };

            close_gap_tx(&tx, &card.pipeline_id, &card.stage, card.position)?;
            open_gap_tx(&tx, &card.pipeline_id, &target_stage, target)?;
            tx.execute(
                r#"
                UPDATE cards SET stage=?1, stage_color=?2, position=?3, updated_at_ms=?4
                WHERE id=?5
                "#,
                params![target_stage, color, target, now_ms, card.id],
            )?;
        }

        let moved = load_live_card_tx(&tx, &card.id)?.ok_or(StoreError::NotFound)?;
        tx.commit()?;
        Ok(moved)
    }
}

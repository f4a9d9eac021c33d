#![forbid(unsafe_code)]

use super::support::{now_ms, partition_len_tx, reindex_partition_tx};
use super::{
    CreateStageRequest, RenameStageRequest, SqliteStore, StoreError, canonicalize_color,
    canonicalize_pipeline, canonicalize_stage,
};
use pb_core::board::RegisteredStage;
use pb_core::model::StageSummary;
use rusqlite::{OptionalExtension, params};

impl SqliteStore {
    /// Stages derived from live card data, in first-seen order. Color is the
    /// most recently written card's `stage_color`: cards, not the registry,
    /// are the color's source of truth once a stage has cards.
    pub fn list_stages(&self, pipeline_id: &str) -> Result<Vec<StageSummary>, StoreError> {
        let pipeline = canonicalize_pipeline(pipeline_id)?;
        let mut stmt = self.conn.prepare(
            r#"
            SELECT stage, COUNT(*) FROM cards
            WHERE pipeline=?1 AND deleted_at_ms IS NULL
            GROUP BY stage
            ORDER BY MIN(rowid)
            "#,
        )?;
        let grouped = stmt
            .query_map(params![pipeline.as_str()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut out = Vec::with_capacity(grouped.len());
        for (label, count) in grouped {
            let color: String = self.conn.query_row(
                r#"
                SELECT stage_color FROM cards
                WHERE pipeline=?1 AND stage=?2 AND deleted_at_ms IS NULL
                ORDER BY updated_at_ms DESC, rowid DESC
                LIMIT 1
                "#,
                params![pipeline.as_str(), label],
                |row| row.get(0),
            )?;
            out.push(StageSummary {
                label,
                color,
                card_count: count as usize,
            });
        }
        Ok(out)
    }

    /// The persisted display-order hint, by ordinal. Not authoritative over
    /// which stages exist; merge it with `list_stages` via
    /// `pb_core::board::merge_display_order`.
    pub fn registered_stages(&self, pipeline_id: &str) -> Result<Vec<RegisteredStage>, StoreError> {
        let pipeline = canonicalize_pipeline(pipeline_id)?;
        let mut stmt = self.conn.prepare(
            "SELECT label, color FROM stage_registry WHERE pipeline=?1 ORDER BY ordinal, label",
        )?;
        let stages = stmt
            .query_map(params![pipeline.as_str()], |row| {
                Ok(RegisteredStage {
                    label: row.get(0)?,
                    color: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(stages)
    }

    /// Registers a label with zero cards (an empty column). No card mutation.
    pub fn create_stage(&mut self, request: CreateStageRequest) -> Result<(), StoreError> {
        let CreateStageRequest {
            pipeline_id,
            label,
            color,
        } = request;
        let pipeline = canonicalize_pipeline(&pipeline_id)?;
        let label = canonicalize_stage(&label)?;
        let color = canonicalize_color(&color)?;

        let tx = self.conn.transaction()?;
        let existing: Option<i64> = tx
            .query_row(
                "SELECT ordinal FROM stage_registry WHERE pipeline=?1 AND label=?2",
                params![pipeline.as_str(), label],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_some() {
            return Err(StoreError::InvalidInput("stage label already registered"));
        }
        let next_ordinal: i64 = tx.query_row(
            "SELECT COALESCE(MAX(ordinal), -1) + 1 FROM stage_registry WHERE pipeline=?1",
            params![pipeline.as_str()],
            |row| row.get(0),
        )?;
        tx.execute(
            "INSERT INTO stage_registry(pipeline, label, color, ordinal) VALUES (?1,?2,?3,?4)",
            params![pipeline.as_str(), label, color, next_ordinal],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Removes a label from the display order. Guarded: a stage still holding
    /// live cards cannot be deleted.
    pub fn delete_stage(&mut self, pipeline_id: &str, label: &str) -> Result<(), StoreError> {
        let pipeline = canonicalize_pipeline(pipeline_id)?;
        let label = canonicalize_stage(label)?;

        let tx = self.conn.transaction()?;
        let card_count = partition_len_tx(&tx, pipeline.as_str(), &label)?;
        if card_count > 0 {
            return Err(StoreError::StageNotEmpty { label, card_count });
        }
        let removed = tx.execute(
            "DELETE FROM stage_registry WHERE pipeline=?1 AND label=?2",
            params![pipeline.as_str(), label],
        )?;
        if removed == 0 {
            return Err(StoreError::NotFound);
        }
        tx.commit()?;
        Ok(())
    }

    /// Bulk-relabels every live card of `old_label` in one transaction.
    /// Renaming onto an existing non-empty label merges the partitions: moved
    /// cards land after the destination's cards and the merged partition is
    /// reindexed densely before commit.
    ///
    /// The display-order row is deliberately not touched here; callers follow
    /// up with `rename_display_label` in a second transaction. A crash
    /// between the two leaves a stale hint entry, which the read-time merge
    /// degrades to an empty column.
    pub fn rename_stage_cards(&mut self, request: RenameStageRequest) -> Result<usize, StoreError> {
        let RenameStageRequest {
            pipeline_id,
            old_label,
            new_label,
            color,
        } = request;
        let pipeline = canonicalize_pipeline(&pipeline_id)?;
        let old_label = canonicalize_stage(&old_label)?;
        let new_label = canonicalize_stage(&new_label)?;
        let color = canonicalize_color(&color)?;

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        if old_label == new_label {
            // Pure recolor; positions are untouched.
            let touched = tx.execute(
                r#"
                UPDATE cards SET stage_color=?1, updated_at_ms=?2
                WHERE pipeline=?3 AND stage=?4 AND deleted_at_ms IS NULL
                "#,
                params![color, now_ms, pipeline.as_str(), old_label],
            )?;
            tx.commit()?;
            return Ok(touched);
        }

        let dest_len = partition_len_tx(&tx, pipeline.as_str(), &new_label)?;
        let touched = tx.execute(
            r#"
            UPDATE cards SET stage=?1, stage_color=?2, position=position+?3, updated_at_ms=?4
            WHERE pipeline=?5 AND stage=?6 AND deleted_at_ms IS NULL
            "#,
            params![new_label, color, dest_len, now_ms, pipeline.as_str(), old_label],
        )?;
        if touched > 0 {
            reindex_partition_tx(&tx, pipeline.as_str(), &new_label)?;
        }
        tx.commit()?;
        Ok(touched)
    }

    /// The second half of a rename: rewrites the display-order hint. Separate
    /// transaction from `rename_stage_cards` by design (two-system update).
    pub fn rename_display_label(
        &mut self,
        request: RenameStageRequest,
    ) -> Result<(), StoreError> {
        let RenameStageRequest {
            pipeline_id,
            old_label,
            new_label,
            color,
        } = request;
        let pipeline = canonicalize_pipeline(&pipeline_id)?;
        let old_label = canonicalize_stage(&old_label)?;
        let new_label = canonicalize_stage(&new_label)?;
        let color = canonicalize_color(&color)?;

        let tx = self.conn.transaction()?;
        let new_exists: Option<i64> = tx
            .query_row(
                "SELECT ordinal FROM stage_registry WHERE pipeline=?1 AND label=?2",
                params![pipeline.as_str(), new_label],
                |row| row.get(0),
            )
            .optional()?;
        if new_exists.is_some() {
            // Rename merged into an already-registered label: drop the old
            // row and refresh the survivor's color.
            tx.execute(
                "DELETE FROM stage_registry WHERE pipeline=?1 AND label=?2",
                params![pipeline.as_str(), old_label],
            )?;
            tx.execute(
                "UPDATE stage_registry SET color=?1 WHERE pipeline=?2 AND label=?3",
                params![color, pipeline.as_str(), new_label],
            )?;
        } else {
            tx.execute(
                "UPDATE stage_registry SET label=?1, color=?2 WHERE pipeline=?3 AND label=?4",
                params![new_label, color, pipeline.as_str(), old_label],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Persists a client-supplied display order. Labels already registered
    /// but absent from the supplied list keep their prior relative order
    /// after it; unknown labels are registered with the color their cards
    /// currently project (or a neutral default with no cards).
    pub fn set_display_order(
        &mut self,
        pipeline_id: &str,
        ordered_labels: &[String],
    ) -> Result<(), StoreError> {
        let pipeline = canonicalize_pipeline(pipeline_id)?;
        let mut ordered = Vec::with_capacity(ordered_labels.len());
        for label in ordered_labels {
            let label = canonicalize_stage(label)?;
            if !ordered.contains(&label) {
                ordered.push(label);
            }
        }

        let tx = self.conn.transaction()?;

        let existing = {
            let mut stmt = tx.prepare(
                "SELECT label, color FROM stage_registry WHERE pipeline=?1 ORDER BY ordinal, label",
            )?;
            let rows = stmt
                .query_map(params![pipeline.as_str()], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        let mut final_order = ordered.clone();
        for (label, _) in &existing {
            if !final_order.contains(label) {
                final_order.push(label.clone());
            }
        }

        for (ordinal, label) in final_order.iter().enumerate() {
            let known = existing.iter().find(|(l, _)| l == label);
            match known {
                Some(_) => {
                    tx.execute(
                        "UPDATE stage_registry SET ordinal=?1 WHERE pipeline=?2 AND label=?3",
                        params![ordinal as i64, pipeline.as_str(), label],
                    )?;
                }
                None => {
                    let color: Option<String> = tx
                        .query_row(
                            r#"
                            SELECT stage_color FROM cards
                            WHERE pipeline=?1 AND stage=?2 AND deleted_at_ms IS NULL
                            ORDER BY updated_at_ms DESC, rowid DESC
                            LIMIT 1
                            "#,
                            params![pipeline.as_str(), label],
                            |row| row.get(0),
                        )
                        .optional()?;
                    tx.execute(
                        "INSERT INTO stage_registry(pipeline, label, color, ordinal) VALUES (?1,?2,?3,?4)",
                        params![
                            pipeline.as_str(),
                            label,
                            color.unwrap_or_else(|| "#cccccc".to_string()),
                            ordinal as i64
                        ],
                    )?;
                }
            }
        }

        tx.commit()?;
        Ok(())
    }
}

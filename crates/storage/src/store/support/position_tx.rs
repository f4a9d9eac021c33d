#![forbid(unsafe_code)]

use super::super::StoreError;
use rusqlite::{OptionalExtension, Transaction, params};

/// Number of live cards in one `(pipeline, stage)` partition.
pub(in crate::store) fn partition_len_tx(
    tx: &Transaction<'_>,
    pipeline: &str,
    stage: &str,
) -> Result<i64, StoreError> {
    let count: i64 = tx.query_row(
        "SELECT COUNT(*) FROM cards WHERE pipeline=?1 AND stage=?2 AND deleted_at_ms IS NULL",
        params![pipeline, stage],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Reclaims the slot at `removed_position`: every live card strictly after it
/// shifts down by one. Must run in the same transaction as the write that
/// vacated the slot.
pub(in crate::store) fn close_gap_tx(
    tx: &Transaction<'_>,
    pipeline: &str,
    stage: &str,
    removed_position: i64,
) -> Result<(), StoreError> {
    tx.execute(
        r#"
        UPDATE cards SET position = position - 1
        WHERE pipeline=?1 AND stage=?2 AND deleted_at_ms IS NULL AND position > ?3
        "#,
        params![pipeline, stage, removed_position],
    )?;
    Ok(())
}

/// Opens a slot at `insert_position`: every live card at or after it shifts
/// up by one. Must run in the same transaction as the insert that fills it.
pub(in crate::store) fn open_gap_tx(
    tx: &Transaction<'_>,
    pipeline: &str,
    stage: &str,
    insert_position: i64,
) -> Result<(), StoreError> {
    tx.execute(
        r#"
        UPDATE cards SET position = position + 1
        WHERE pipeline=?1 AND stage=?2 AND deleted_at_ms IS NULL AND position >= ?3
        "#,
        params![pipeline, stage, insert_position],
    )?;
    Ok(())
}

/// Reassigns `0..N-1` across a partition's live cards, preserving the current
/// `(position, rowid)` order. Repair path and final step of a rename merge.
pub(in crate::store) fn reindex_partition_tx(
    tx: &Transaction<'_>,
    pipeline: &str,
    stage: &str,
) -> Result<usize, StoreError> {
    let mut stmt = tx.prepare(
        r#"
        SELECT rowid FROM cards
        WHERE pipeline=?1 AND stage=?2 AND deleted_at_ms IS NULL
        ORDER BY position, rowid
        "#,
    )?;
    let rowids = stmt
        .query_map(params![pipeline, stage], |row| row.get::<_, i64>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    for (index, rowid) in rowids.iter().enumerate() {
        tx.execute(
            "UPDATE cards SET position=?1 WHERE rowid=?2",
            params![index as i64, rowid],
        )?;
    }
    Ok(rowids.len())
}

/// The color the stage currently projects: the most recently written live
/// card's `stage_color`, if the partition has any cards.
pub(in crate::store) fn latest_color_tx(
    tx: &Transaction<'_>,
    pipeline: &str,
    stage: &str,
) -> Result<Option<String>, StoreError> {
    let color = tx
        .query_row(
            r#"
            SELECT stage_color FROM cards
            WHERE pipeline=?1 AND stage=?2 AND deleted_at_ms IS NULL
            ORDER BY updated_at_ms DESC, rowid DESC
            LIMIT 1
            "#,
            params![pipeline, stage],
            |row| row.get(0),
        )
        .optional()?;
    Ok(color)
}

/// Registered color for a label with no cards yet, if any.
pub(in crate::store) fn registered_color_tx(
    tx: &Transaction<'_>,
    pipeline: &str,
    label: &str,
) -> Result<Option<String>, StoreError> {
    let color = tx
        .query_row(
            "SELECT color FROM stage_registry WHERE pipeline=?1 AND label=?2",
            params![pipeline, label],
            |row| row.get(0),
        )
        .optional()?;
    Ok(color)
}

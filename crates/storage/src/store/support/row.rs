#![forbid(unsafe_code)]

use super::super::StoreError;
use pb_core::model::{Card, EntityKind, EntityRef};
use rusqlite::types::Type;
use rusqlite::{OptionalExtension, Row, Transaction, params};

pub(in crate::store) const CARD_COLUMNS: &str = "id, pipeline, entity_kind, entity_id, stage, \
     stage_color, position, tags_json, amount, capture_date_ms, notes, \
     created_at_ms, updated_at_ms, deleted_at_ms";

pub(in crate::store) fn card_from_row(row: &Row<'_>) -> rusqlite::Result<Card> {
    let entity_kind_raw: String = row.get(2)?;
    let entity_kind = EntityKind::parse(&entity_kind_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            Type::Text,
            format!("unknown entity kind: {entity_kind_raw}").into(),
        )
    })?;
    let tags_json: String = row.get(7)?;
    let tags: Vec<String> = serde_json::from_str(&tags_json).map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(err))
    })?;

    Ok(Card {
        id: row.get(0)?,
        pipeline_id: row.get(1)?,
        entity: EntityRef {
            kind: entity_kind,
            id: row.get(3)?,
        },
        stage: row.get(4)?,
        stage_color: row.get(5)?,
        position: row.get(6)?,
        tags,
        amount: row.get(8)?,
        capture_date_ms: row.get(9)?,
        notes: row.get(10)?,
        created_at_ms: row.get(11)?,
        updated_at_ms: row.get(12)?,
        deleted_at_ms: row.get(13)?,
    })
}

/// Loads a live card by id regardless of pipeline; the caller decides whether
/// a pipeline mismatch is `InvalidReference`.
pub(in crate::store) fn load_live_card_tx(
    tx: &Transaction<'_>,
    card_id: &str,
) -> Result<Option<Card>, StoreError> {
    let card = tx
        .query_row(
            &format!("SELECT {CARD_COLUMNS} FROM cards WHERE id=?1 AND deleted_at_ms IS NULL"),
            params![card_id],
            card_from_row,
        )
        .optional()?;
    Ok(card)
}

pub(in crate::store) fn tags_to_json(tags: &[String]) -> Result<String, StoreError> {
    serde_json::to_string(tags).map_err(|_| StoreError::InvalidInput("tags are not serializable"))
}

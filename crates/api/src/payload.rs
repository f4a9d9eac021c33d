#![forbid(unsafe_code)]

use pb_core::model::Card;
use serde_json::{Value, json};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub(crate) fn format_ms(ms: i64) -> Option<String> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000)
        .ok()?
        .format(&Rfc3339)
        .ok()
}

pub(crate) fn card_payload(card: &Card) -> Value {
    json!({
        "id": card.id,
        "pipeline_id": card.pipeline_id,
        "entity": {
            "kind": card.entity.kind.as_str(),
            "id": card.entity.id,
        },
        "stage": card.stage,
        "stage_color": card.stage_color,
        "position": card.position,
        "tags": card.tags,
        "amount": card.amount,
        "capture_date_ms": card.capture_date_ms,
        "notes": card.notes,
        "created_at_ms": card.created_at_ms,
        "created_at": format_ms(card.created_at_ms),
        "updated_at_ms": card.updated_at_ms,
        "updated_at": format_ms(card.updated_at_ms),
    })
}

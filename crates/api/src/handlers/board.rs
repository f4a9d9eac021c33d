#![forbid(unsafe_code)]

use super::require_str;
use crate::envelope::{ok_response, store_error_response};
use crate::payload::card_payload;
use pb_core::board::merge_display_order;
use pb_storage::SqliteStore;
use serde_json::{Value, json};

/// Authoritative full-board snapshot: reconciled column order (derived stage
/// data merged with the display-order hint) with each column's cards ordered
/// by position. This is what the client mirror replaces itself with after a
/// move confirms or fails.
pub(super) fn board_fetch(store: &mut SqliteStore, args: &Value) -> Value {
    let pipeline_id = match require_str(args, "pipeline_id") {
        Ok(value) => value,
        Err(response) => return response,
    };

    let derived = match store.list_stages(&pipeline_id) {
        Ok(stages) => stages,
        Err(err) => return store_error_response(&err),
    };
    let hint = match store.registered_stages(&pipeline_id) {
        Ok(stages) => stages,
        Err(err) => return store_error_response(&err),
    };
    let cards = match store.cards_by_pipeline(&pipeline_id) {
        Ok(cards) => cards,
        Err(err) => return store_error_response(&err),
    };

    let columns: Vec<Value> = merge_display_order(&derived, &hint)
        .iter()
        .map(|column| {
            let column_cards: Vec<Value> = cards
                .iter()
                .filter(|card| card.stage == column.label)
                .map(card_payload)
                .collect();
            json!({
                "label": column.label,
                "color": column.color,
                "card_count": column.card_count,
                "cards": column_cards,
            })
        })
        .collect();

    ok_response(json!({ "pipeline_id": pipeline_id, "columns": columns }))
}

#![forbid(unsafe_code)]

use super::{require_str, str_list};
use crate::envelope::{error_response, ok_response, store_error_response};
use pb_storage::{CreateStageRequest, RenameStageRequest, SqliteStore};
use serde_json::{Value, json};

pub(super) fn stage_list(store: &mut SqliteStore, args: &Value) -> Value {
    let pipeline_id = match require_str(args, "pipeline_id") {
        Ok(value) => value,
        Err(response) => return response,
    };
    match store.list_stages(&pipeline_id) {
        Ok(stages) => {
            let rows: Vec<Value> = stages
                .iter()
                .map(|stage| {
                    json!({
                        "label": stage.label,
                        "color": stage.color,
                        "card_count": stage.card_count,
                    })
                })
                .collect();
            ok_response(json!({ "stages": rows }))
        }
        Err(err) => store_error_response(&err),
    }
}

pub(super) fn stage_create(store: &mut SqliteStore, args: &Value) -> Value {
    let request = match parse_stage(args) {
        Ok(request) => request,
        Err(response) => return response,
    };
    match store.create_stage(request) {
        Ok(()) => ok_response(json!({ "created": true })),
        Err(err) => store_error_response(&err),
    }
}

fn parse_stage(args: &Value) -> Result<CreateStageRequest, Value> {
    Ok(CreateStageRequest {
        pipeline_id: require_str(args, "pipeline_id")?,
        label: require_str(args, "label")?,
        color: require_str(args, "color")?,
    })
}

/// Two-system update: the card bulk-rewrite commits first, the display-order
/// rewrite follows in its own transaction. No atomicity across the pair; a
/// failure in between leaves a stale hint that the read-time merge renders as
/// an empty column.
pub(super) fn stage_rename(store: &mut SqliteStore, args: &Value) -> Value {
    let request = match parse_rename(args) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let renamed_cards = match store.rename_stage_cards(request.clone()) {
        Ok(count) => count,
        Err(err) => return store_error_response(&err),
    };
    if let Err(err) = store.rename_display_label(request) {
        return store_error_response(&err);
    }
    ok_response(json!({ "renamed_cards": renamed_cards }))
}

fn parse_rename(args: &Value) -> Result<RenameStageRequest, Value> {
    Ok(RenameStageRequest {
        pipeline_id: require_str(args, "pipeline_id")?,
        old_label: require_str(args, "old_label")?,
        new_label: require_str(args, "new_label")?,
        color: require_str(args, "color")?,
    })
}

pub(super) fn stage_delete(store: &mut SqliteStore, args: &Value) -> Value {
    let pipeline_id = match require_str(args, "pipeline_id") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let label = match require_str(args, "label") {
        Ok(value) => value,
        Err(response) => return response,
    };
    match store.delete_stage(&pipeline_id, &label) {
        Ok(()) => ok_response(json!({ "deleted": label })),
        Err(err) => store_error_response(&err),
    }
}

pub(super) fn stage_order_set(store: &mut SqliteStore, args: &Value) -> Value {
    let pipeline_id = match require_str(args, "pipeline_id") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let labels = match str_list(args, "ordered_labels") {
        Ok(Some(labels)) => labels,
        Ok(None) => return error_response("validation_error", "missing field: ordered_labels"),
        Err(response) => return response,
    };
    match store.set_display_order(&pipeline_id, &labels) {
        Ok(()) => ok_response(json!({ "applied": labels.len() })),
        Err(err) => store_error_response(&err),
    }
}

#![forbid(unsafe_code)]

use super::{optional_f64, optional_i64, optional_str, require_position, require_str, str_list};
use crate::envelope::{ok_response, store_error_response};
use crate::payload::card_payload;
use pb_storage::{
    CreateCardRequest, MoveCardRequest, SqliteStore, StoreError, UpdateCardRequest,
};
use serde_json::{Value, json};

pub(super) fn card_create(store: &mut SqliteStore, args: &Value) -> Value {
    let request = match parse_create(args) {
        Ok(request) => request,
        Err(response) => return response,
    };
    match store.create_card(request) {
        Ok(card) => ok_response(card_payload(&card)),
        Err(err) => store_error_response(&err),
    }
}

fn parse_create(args: &Value) -> Result<CreateCardRequest, Value> {
    Ok(CreateCardRequest {
        pipeline_id: require_str(args, "pipeline_id")?,
        entity_kind: require_str(args, "entity_kind")?,
        entity_id: require_str(args, "entity_id")?,
        stage: require_str(args, "stage")?,
        stage_color: require_str(args, "stage_color")?,
        tags: str_list(args, "tags")?.unwrap_or_default(),
        amount: optional_f64(args, "amount")?,
        capture_date_ms: optional_i64(args, "capture_date_ms")?,
        notes: optional_str(args, "notes")?,
    })
}

pub(super) fn card_get(store: &mut SqliteStore, args: &Value) -> Value {
    let (pipeline_id, card_id) = match parse_card_ref(args) {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };
    match store.get_card(&pipeline_id, &card_id) {
        Ok(card) => ok_response(card_payload(&card)),
        Err(err) => store_error_response(&err),
    }
}

pub(super) fn card_update(store: &mut SqliteStore, args: &Value) -> Value {
    let request = match parse_update(args) {
        Ok(request) => request,
        Err(response) => return response,
    };
    match store.update_card(request) {
        Ok(card) => ok_response(card_payload(&card)),
        Err(err) => store_error_response(&err),
    }
}

fn parse_update(args: &Value) -> Result<UpdateCardRequest, Value> {
    // A JSON `null` clears a clearable field; an absent key leaves it alone.
    let amount = if args.get("amount").is_some() {
        Some(optional_f64(args, "amount")?)
    } else {
        None
    };
    let capture_date_ms = if args.get("capture_date_ms").is_some() {
        Some(optional_i64(args, "capture_date_ms")?)
    } else {
        None
    };
    let notes = if args.get("notes").is_some() {
        Some(optional_str(args, "notes")?)
    } else {
        None
    };

    Ok(UpdateCardRequest {
        pipeline_id: require_str(args, "pipeline_id")?,
        card_id: require_str(args, "card_id")?,
        entity_kind: optional_str(args, "entity_kind")?,
        entity_id: optional_str(args, "entity_id")?,
        tags: str_list(args, "tags")?,
        amount,
        capture_date_ms,
        notes,
    })
}

/// The drag-and-drop endpoint. `ConcurrentModification` is transient by
/// contract, so it is retried exactly once before being surfaced; the client
/// mirror then falls back to a full refetch.
pub(super) fn card_move(store: &mut SqliteStore, args: &Value) -> Value {
    let request = match parse_move(args) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match with_single_retry(|| store.move_card(request.clone())) {
        Ok(card) => ok_response(card_payload(&card)),
        Err(err) => store_error_response(&err),
    }
}

/// `ConcurrentModification` is the one transient engine error; every other
/// error is terminal for the call and passes straight through.
fn with_single_retry<T>(mut op: impl FnMut() -> Result<T, StoreError>) -> Result<T, StoreError> {
    match op() {
        Err(StoreError::ConcurrentModification) => op(),
        other => other,
    }
}

fn parse_move(args: &Value) -> Result<MoveCardRequest, Value> {
    Ok(MoveCardRequest {
        pipeline_id: require_str(args, "pipeline_id")?,
        card_id: require_str(args, "card_id")?,
        target_stage: require_str(args, "target_stage")?,
        target_position: require_position(args, "target_position")?,
        color_override: optional_str(args, "color_override")?,
    })
}

pub(super) fn card_delete(store: &mut SqliteStore, args: &Value) -> Value {
    let (pipeline_id, card_id) = match parse_card_ref(args) {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };
    match store.delete_card(&pipeline_id, &card_id) {
        Ok(()) => ok_response(json!({ "deleted": card_id })),
        Err(err) => store_error_response(&err),
    }
}

fn parse_card_ref(args: &Value) -> Result<(String, String), Value> {
    Ok((require_str(args, "pipeline_id")?, require_str(args, "card_id")?))
}

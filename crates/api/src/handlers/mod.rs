#![forbid(unsafe_code)]

mod board;
mod cards;
mod stages;

use crate::envelope::{OpDefinition, error_response};
use pb_storage::SqliteStore;
use serde_json::Value;

/// Routes one UI-collaborator operation to its handler. Returns `None` for
/// names outside the catalog so callers can layer their own ops on top.
pub fn dispatch(store: &mut SqliteStore, name: &str, args: Value) -> Option<Value> {
    let response = match name {
        "card_create" => cards::card_create(store, &args),
        "card_get" => cards::card_get(store, &args),
        "card_update" => cards::card_update(store, &args),
        "card_move" => cards::card_move(store, &args),
        "card_delete" => cards::card_delete(store, &args),
        "stage_list" => stages::stage_list(store, &args),
        "stage_create" => stages::stage_create(store, &args),
        "stage_rename" => stages::stage_rename(store, &args),
        "stage_delete" => stages::stage_delete(store, &args),
        "stage_order_set" => stages::stage_order_set(store, &args),
        "board_fetch" => board::board_fetch(store, &args),
        _ => return None,
    };
    Some(response)
}

pub fn op_names() -> &'static [&'static str] {
    &[
        "card_create",
        "card_get",
        "card_update",
        "card_move",
        "card_delete",
        "stage_list",
        "stage_create",
        "stage_rename",
        "stage_delete",
        "stage_order_set",
        "board_fetch",
    ]
}

pub fn definitions() -> Vec<OpDefinition> {
    vec![
        OpDefinition {
            name: "card_create",
            about: "Create a card at the end of its stage partition",
        },
        OpDefinition {
            name: "card_get",
            about: "Fetch one live card",
        },
        OpDefinition {
            name: "card_update",
            about: "Partially update a card's descriptive fields",
        },
        OpDefinition {
            name: "card_move",
            about: "Relocate a card within or across stages",
        },
        OpDefinition {
            name: "card_delete",
            about: "Soft-delete a card and reclaim its position slot",
        },
        OpDefinition {
            name: "stage_list",
            about: "List stages derived from live card data",
        },
        OpDefinition {
            name: "stage_create",
            about: "Register an empty stage column",
        },
        OpDefinition {
            name: "stage_rename",
            about: "Bulk-relabel a stage's cards, then rewrite the display order",
        },
        OpDefinition {
            name: "stage_delete",
            about: "Remove an empty stage from the display order",
        },
        OpDefinition {
            name: "stage_order_set",
            about: "Persist a client-supplied stage display order",
        },
        OpDefinition {
            name: "board_fetch",
            about: "Authoritative board snapshot: merged columns with cards",
        },
    ]
}

fn require_str(args: &Value, key: &str) -> Result<String, Value> {
    match args.get(key).and_then(Value::as_str) {
        Some(value) => Ok(value.to_string()),
        None => Err(error_response(
            "validation_error",
            format!("missing or invalid string field: {key}"),
        )),
    }
}

fn optional_str(args: &Value, key: &str) -> Result<Option<String>, Value> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(error_response(
            "validation_error",
            format!("field must be a string: {key}"),
        )),
    }
}

fn optional_i64(args: &Value, key: &str) -> Result<Option<i64>, Value> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => match value.as_i64() {
            Some(number) => Ok(Some(number)),
            None => Err(error_response(
                "validation_error",
                format!("field must be an integer: {key}"),
            )),
        },
    }
}

fn optional_f64(args: &Value, key: &str) -> Result<Option<f64>, Value> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => match value.as_f64() {
            Some(number) => Ok(Some(number)),
            None => Err(error_response(
                "validation_error",
                format!("field must be a number: {key}"),
            )),
        },
    }
}

fn str_list(args: &Value, key: &str) -> Result<Option<Vec<String>>, Value> {
    let Some(value) = args.get(key) else {
        return Ok(None);
    };
    if value.is_null() {
        return Ok(None);
    }
    let Some(items) = value.as_array() else {
        return Err(error_response(
            "validation_error",
            format!("field must be a list of strings: {key}"),
        ));
    };
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match item.as_str() {
            Some(text) => out.push(text.to_string()),
            None => {
                return Err(error_response(
                    "validation_error",
                    format!("field must be a list of strings: {key}"),
                ));
            }
        }
    }
    Ok(Some(out))
}

fn require_position(args: &Value, key: &str) -> Result<i64, Value> {
    match args.get(key) {
        Some(value) if value.is_i64() || value.is_u64() => Ok(value.as_i64().unwrap_or(i64::MAX)),
        Some(_) => Err(error_response(
            "invalid_position",
            format!("field must be an integer: {key}"),
        )),
        None => Err(error_response(
            "validation_error",
            format!("missing field: {key}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn definitions_and_dispatch_are_in_sync() {
        let defined: BTreeSet<&str> = definitions().iter().map(|d| d.name).collect();
        let listed: BTreeSet<&str> = op_names().iter().copied().collect();

        let missing_in_definitions: Vec<&&str> = listed.difference(&defined).collect();
        let missing_in_list: Vec<&&str> = defined.difference(&listed).collect();
        assert!(
            missing_in_definitions.is_empty() && missing_in_list.is_empty(),
            "op definitions/list mismatch\n  list-only: {missing_in_definitions:?}\n  definitions-only: {missing_in_list:?}"
        );
    }

    #[test]
    fn require_position_distinguishes_missing_from_malformed() {
        let err = require_position(&serde_json::json!({}), "target_position").unwrap_err();
        assert_eq!(err["error"]["code"], "validation_error");

        let err = require_position(
            &serde_json::json!({"target_position": "first"}),
            "target_position",
        )
        .unwrap_err();
        assert_eq!(err["error"]["code"], "invalid_position");

        let ok = require_position(&serde_json::json!({"target_position": 3}), "target_position")
            .expect("position");
        assert_eq!(ok, 3);
    }
}

#![forbid(unsafe_code)]

use pb_api::dispatch;
use pb_storage::SqliteStore;
use serde_json::{Value, json};
use std::path::PathBuf;

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = base.join(format!("pb_api_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn open_store(test_name: &str) -> SqliteStore {
    SqliteStore::open(temp_dir(test_name)).expect("open store")
}

fn call(store: &mut SqliteStore, name: &str, args: Value) -> Value {
    dispatch(store, name, args).expect("known op")
}

fn create_card(store: &mut SqliteStore, stage: &str) -> String {
    let response = call(
        store,
        "card_create",
        json!({
            "pipeline_id": "default",
            "entity_kind": "contact",
            "entity_id": "contact-1",
            "stage": stage,
            "stage_color": "#2d9cdb",
        }),
    );
    assert_eq!(response["ok"], true, "create failed: {response}");
    response["payload"]["id"]
        .as_str()
        .expect("card id")
        .to_string()
}

#[test]
fn every_catalogued_op_dispatches() {
    let mut store = open_store("catalogued");
    for name in pb_api::op_names() {
        let response = dispatch(&mut store, name, json!({}));
        assert!(response.is_some(), "op {name} is not dispatched");
    }
}

#[test]
fn unknown_op_is_not_dispatched() {
    let mut store = open_store("unknown_op");
    assert!(dispatch(&mut store, "card_teleport", json!({})).is_none());
}

#[test]
fn create_and_move_through_the_dispatch_table() {
    let mut store = open_store("create_and_move");
    let a = create_card(&mut store, "new");
    let b = create_card(&mut store, "new");

    let response = call(
        &mut store,
        "card_move",
        json!({
            "pipeline_id": "default",
            "card_id": b,
            "target_stage": "new",
            "target_position": 0,
        }),
    );
    assert_eq!(response["ok"], true, "move failed: {response}");
    assert_eq!(response["payload"]["position"], 0);

    let board = call(&mut store, "board_fetch", json!({ "pipeline_id": "default" }));
    assert_eq!(board["ok"], true);
    let columns = board["payload"]["columns"].as_array().expect("columns");
    assert_eq!(columns.len(), 1);
    let ids: Vec<&str> = columns[0]["cards"]
        .as_array()
        .expect("cards")
        .iter()
        .map(|card| card["id"].as_str().expect("id"))
        .collect();
    assert_eq!(ids, vec![b.as_str(), a.as_str()]);
}

#[test]
fn card_payload_carries_formatted_timestamps() {
    let mut store = open_store("timestamps");
    let id = create_card(&mut store, "new");
    let response = call(
        &mut store,
        "card_get",
        json!({ "pipeline_id": "default", "card_id": id }),
    );
    let created_at = response["payload"]["created_at"].as_str().expect("created_at");
    assert!(created_at.contains('T'), "not RFC 3339: {created_at}");
    assert!(response["payload"]["created_at_ms"].is_i64());
}

#[test]
fn validation_errors_surface_with_typed_codes() {
    let mut store = open_store("validation_codes");

    let response = call(&mut store, "card_create", json!({ "pipeline_id": "default" }));
    assert_eq!(response["ok"], false);
    assert_eq!(response["error"]["code"], "validation_error");

    let id = create_card(&mut store, "new");
    let response = call(
        &mut store,
        "card_move",
        json!({
            "pipeline_id": "default",
            "card_id": id,
            "target_stage": "new",
            "target_position": "top",
        }),
    );
    assert_eq!(response["error"]["code"], "invalid_position");

    let response = call(
        &mut store,
        "card_move",
        json!({
            "pipeline_id": "default",
            "card_id": "card_999999",
            "target_stage": "new",
            "target_position": 0,
        }),
    );
    assert_eq!(response["error"]["code"], "not_found");
}

#[test]
fn cross_pipeline_reference_maps_to_invalid_reference() {
    let mut store = open_store("invalid_reference");
    let id = create_card(&mut store, "new");
    let response = call(
        &mut store,
        "card_move",
        json!({
            "pipeline_id": "someone-elses",
            "card_id": id,
            "target_stage": "new",
            "target_position": 0,
        }),
    );
    assert_eq!(response["ok"], false);
    assert_eq!(response["error"]["code"], "invalid_reference");
}

#[test]
fn stage_rename_updates_cards_and_display_order() {
    let mut store = open_store("stage_rename");
    call(
        &mut store,
        "stage_create",
        json!({ "pipeline_id": "default", "label": "leads", "color": "#2d9cdb" }),
    );
    create_card(&mut store, "leads");
    create_card(&mut store, "leads");

    let response = call(
        &mut store,
        "stage_rename",
        json!({
            "pipeline_id": "default",
            "old_label": "leads",
            "new_label": "qualified",
            "color": "#9b51e0",
        }),
    );
    assert_eq!(response["ok"], true, "rename failed: {response}");
    assert_eq!(response["payload"]["renamed_cards"], 2);

    let listing = call(&mut store, "stage_list", json!({ "pipeline_id": "default" }));
    let stages = listing["payload"]["stages"].as_array().expect("stages");
    assert_eq!(stages.len(), 1);
    assert_eq!(stages[0]["label"], "qualified");

    let board = call(&mut store, "board_fetch", json!({ "pipeline_id": "default" }));
    let labels: Vec<&str> = board["payload"]["columns"]
        .as_array()
        .expect("columns")
        .iter()
        .map(|column| column["label"].as_str().expect("label"))
        .collect();
    assert_eq!(labels, vec!["qualified"]);
}

#[test]
fn stage_delete_guard_maps_to_stage_not_empty() {
    let mut store = open_store("stage_delete_guard");
    call(
        &mut store,
        "stage_create",
        json!({ "pipeline_id": "default", "label": "review", "color": "#f2c94c" }),
    );
    let id = create_card(&mut store, "review");

    let response = call(
        &mut store,
        "stage_delete",
        json!({ "pipeline_id": "default", "label": "review" }),
    );
    assert_eq!(response["error"]["code"], "stage_not_empty");

    call(
        &mut store,
        "card_delete",
        json!({ "pipeline_id": "default", "card_id": id }),
    );
    let response = call(
        &mut store,
        "stage_delete",
        json!({ "pipeline_id": "default", "label": "review" }),
    );
    assert_eq!(response["ok"], true, "delete failed: {response}");
}

#[test]
fn display_order_drives_board_columns() {
    let mut store = open_store("display_order");
    create_card(&mut store, "new");
    create_card(&mut store, "won");

    call(
        &mut store,
        "stage_order_set",
        json!({ "pipeline_id": "default", "ordered_labels": ["won", "new", "archive"] }),
    );

    let board = call(&mut store, "board_fetch", json!({ "pipeline_id": "default" }));
    let columns = board["payload"]["columns"].as_array().expect("columns");
    let labels: Vec<&str> = columns
        .iter()
        .map(|column| column["label"].as_str().expect("label"))
        .collect();
    assert_eq!(labels, vec!["won", "new", "archive"]);
    assert_eq!(columns[2]["card_count"], 0);
}

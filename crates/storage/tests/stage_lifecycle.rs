#![forbid(unsafe_code)]

use pb_core::board::merge_display_order;
use pb_storage::{
    CreateCardRequest, CreateStageRequest, RenameStageRequest, SqliteStore, StoreError,
};
use std::path::PathBuf;

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = base.join(format!("pb_storage_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn create_card(store: &mut SqliteStore, stage: &str, color: &str) -> pb_core::model::Card {
    store
        .create_card(CreateCardRequest {
            pipeline_id: "default".to_string(),
            entity_kind: "client".to_string(),
            entity_id: format!("client-{stage}"),
            stage: stage.to_string(),
            stage_color: color.to_string(),
            tags: Vec::new(),
            amount: None,
            capture_date_ms: None,
            notes: None,
        })
        .expect("create card")
}

fn labels(store: &SqliteStore) -> Vec<String> {
    store
        .list_stages("default")
        .expect("list stages")
        .into_iter()
        .map(|s| s.label)
        .collect()
}

#[test]
fn stages_are_derived_from_live_cards() {
    let mut store = SqliteStore::open(temp_dir("derived_stages")).expect("open store");
    create_card(&mut store, "leads", "#2d9cdb");
    create_card(&mut store, "leads", "#2d9cdb");
    create_card(&mut store, "won", "#27ae60");

    let stages = store.list_stages("default").expect("list stages");
    assert_eq!(stages.len(), 2);
    assert_eq!(stages[0].label, "leads");
    assert_eq!(stages[0].card_count, 2);
    assert_eq!(stages[1].label, "won");
    assert_eq!(stages[1].card_count, 1);
}

#[test]
fn stage_color_is_the_most_recent_card_write() {
    let mut store = SqliteStore::open(temp_dir("latest_color")).expect("open store");
    create_card(&mut store, "leads", "#111111");
    create_card(&mut store, "leads", "#222222");

    let stages = store.list_stages("default").expect("list stages");
    assert_eq!(stages[0].color, "#222222");
}

#[test]
fn delete_stage_is_guarded_by_card_count() {
    let mut store = SqliteStore::open(temp_dir("delete_guard")).expect("open store");
    store
        .create_stage(CreateStageRequest {
            pipeline_id: "default".to_string(),
            label: "review".to_string(),
            color: "#f2c94c".to_string(),
        })
        .expect("create stage");
    let card = create_card(&mut store, "review", "#f2c94c");

    let err = store
        .delete_stage("default", "review")
        .expect_err("expected StageNotEmpty");
    match err {
        StoreError::StageNotEmpty { label, card_count } => {
            assert_eq!(label, "review");
            assert_eq!(card_count, 1);
        }
        other => panic!("expected StageNotEmpty, got {other:?}"),
    }

    store.delete_card("default", &card.id).expect("delete card");
    store
        .delete_stage("default", "review")
        .expect("delete empty stage");
    assert!(store.registered_stages("default").expect("registered").is_empty());

    let err = store
        .delete_stage("default", "review")
        .expect_err("already gone");
    assert!(matches!(err, StoreError::NotFound), "got {err:?}");
}

#[test]
fn rename_relabels_every_live_card() {
    let mut store = SqliteStore::open(temp_dir("rename_bulk")).expect("open store");
    for _ in 0..3 {
        create_card(&mut store, "leads", "#2d9cdb");
    }

    let touched = store
        .rename_stage_cards(RenameStageRequest {
            pipeline_id: "default".to_string(),
            old_label: "leads".to_string(),
            new_label: "qualified".to_string(),
            color: "#9b51e0".to_string(),
        })
        .expect("rename");
    assert_eq!(touched, 3);

    assert_eq!(labels(&store), vec!["qualified"]);
    let cards = store
        .cards_by_partition("default", "qualified")
        .expect("partition");
    assert_eq!(cards.len(), 3);
    for card in &cards {
        assert_eq!(card.stage, "qualified");
        assert_eq!(card.stage_color, "#9b51e0");
    }
    let positions: Vec<i64> = cards.iter().map(|c| c.position).collect();
    assert_eq!(positions, vec![0, 1, 2]);
}

#[test]
fn rename_onto_existing_label_merges_after_destination() {
    let mut store = SqliteStore::open(temp_dir("rename_merge")).expect("open store");
    let a = create_card(&mut store, "leads", "#2d9cdb");
    let b = create_card(&mut store, "leads", "#2d9cdb");
    let c = create_card(&mut store, "qualified", "#9b51e0");

    store
        .rename_stage_cards(RenameStageRequest {
            pipeline_id: "default".to_string(),
            old_label: "leads".to_string(),
            new_label: "qualified".to_string(),
            color: "#9b51e0".to_string(),
        })
        .expect("rename merge");

    let cards = store
        .cards_by_partition("default", "qualified")
        .expect("partition");
    let ids: Vec<&str> = cards.iter().map(|card| card.id.as_str()).collect();
    assert_eq!(ids, vec![c.id.as_str(), a.id.as_str(), b.id.as_str()]);
    let positions: Vec<i64> = cards.iter().map(|card| card.position).collect();
    assert_eq!(positions, vec![0, 1, 2]);
}

#[test]
fn rename_to_same_label_recolors_in_place() {
    let mut store = SqliteStore::open(temp_dir("recolor")).expect("open store");
    let a = create_card(&mut store, "leads", "#2d9cdb");
    let b = create_card(&mut store, "leads", "#2d9cdb");

    let touched = store
        .rename_stage_cards(RenameStageRequest {
            pipeline_id: "default".to_string(),
            old_label: "leads".to_string(),
            new_label: "leads".to_string(),
            color: "#eb5757".to_string(),
        })
        .expect("recolor");
    assert_eq!(touched, 2);

    let cards = store.cards_by_partition("default", "leads").expect("partition");
    assert_eq!(cards[0].stage_color, "#eb5757");
    assert_eq!(cards[1].stage_color, "#eb5757");
    assert_eq!(cards[0].id, a.id);
    assert_eq!(cards[1].id, b.id);
}

#[test]
fn registered_empty_stage_survives_the_merge_as_empty_column() {
    let mut store = SqliteStore::open(temp_dir("empty_column")).expect("open store");
    create_card(&mut store, "new", "#2d9cdb");
    store
        .create_stage(CreateStageRequest {
            pipeline_id: "default".to_string(),
            label: "archive".to_string(),
            color: "#777777".to_string(),
        })
        .expect("create stage");

    let derived = store.list_stages("default").expect("derived");
    let hint = store.registered_stages("default").expect("hint");
    let columns = merge_display_order(&derived, &hint);

    let rendered: Vec<(&str, usize)> = columns
        .iter()
        .map(|c| (c.label.as_str(), c.card_count))
        .collect();
    assert_eq!(rendered, vec![("archive", 0), ("new", 1)]);
}

#[test]
fn duplicate_stage_registration_is_rejected() {
    let mut store = SqliteStore::open(temp_dir("duplicate_stage")).expect("open store");
    let request = CreateStageRequest {
        pipeline_id: "default".to_string(),
        label: "review".to_string(),
        color: "#f2c94c".to_string(),
    };
    store.create_stage(request.clone()).expect("first registration");
    let err = store.create_stage(request).expect_err("duplicate");
    assert!(matches!(err, StoreError::InvalidInput(_)), "got {err:?}");
}

#[test]
fn display_order_merges_client_list_with_known_labels() {
    let mut store = SqliteStore::open(temp_dir("display_order")).expect("open store");
    store
        .create_stage(CreateStageRequest {
            pipeline_id: "default".to_string(),
            label: "new".to_string(),
            color: "#2d9cdb".to_string(),
        })
        .expect("register new");
    store
        .create_stage(CreateStageRequest {
            pipeline_id: "default".to_string(),
            label: "won".to_string(),
            color: "#27ae60".to_string(),
        })
        .expect("register won");
    create_card(&mut store, "lost", "#eb5757");

    // Client reorders and introduces a label; "new" is omitted but must
    // keep a slot after the supplied list.
    store
        .set_display_order(
            "default",
            &["won".to_string(), "lost".to_string(), "review".to_string()],
        )
        .expect("set display order");

    let hint = store.registered_stages("default").expect("hint");
    let ordered: Vec<&str> = hint.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(ordered, vec!["won", "lost", "review", "new"]);

    // "lost" was unknown to the registry; its color comes from its cards.
    let lost = hint.iter().find(|r| r.label == "lost").expect("lost row");
    assert_eq!(lost.color, "#eb5757");
}

#[test]
fn rename_display_label_follows_the_card_rewrite() {
    let mut store = SqliteStore::open(temp_dir("rename_hint")).expect("open store");
    store
        .create_stage(CreateStageRequest {
            pipeline_id: "default".to_string(),
            label: "leads".to_string(),
            color: "#2d9cdb".to_string(),
        })
        .expect("register");
    create_card(&mut store, "leads", "#2d9cdb");

    let request = RenameStageRequest {
        pipeline_id: "default".to_string(),
        old_label: "leads".to_string(),
        new_label: "qualified".to_string(),
        color: "#9b51e0".to_string(),
    };
    store.rename_stage_cards(request.clone()).expect("cards");
    store.rename_display_label(request).expect("hint");

    let hint = store.registered_stages("default").expect("hint");
    assert_eq!(hint.len(), 1);
    assert_eq!(hint[0].label, "qualified");
    assert_eq!(hint[0].color, "#9b51e0");
}

#[test]
fn stale_hint_after_partial_rename_degrades_to_empty_column() {
    let mut store = SqliteStore::open(temp_dir("stale_hint")).expect("open store");
    store
        .create_stage(CreateStageRequest {
            pipeline_id: "default".to_string(),
            label: "leads".to_string(),
            color: "#2d9cdb".to_string(),
        })
        .expect("register");
    create_card(&mut store, "leads", "#2d9cdb");

    // First half of the two-system update lands; the hint rewrite does not.
    store
        .rename_stage_cards(RenameStageRequest {
            pipeline_id: "default".to_string(),
            old_label: "leads".to_string(),
            new_label: "qualified".to_string(),
            color: "#9b51e0".to_string(),
        })
        .expect("cards");

    let derived = store.list_stages("default").expect("derived");
    let hint = store.registered_stages("default").expect("hint");
    let columns = merge_display_order(&derived, &hint);

    let rendered: Vec<(&str, usize)> = columns
        .iter()
        .map(|c| (c.label.as_str(), c.card_count))
        .collect();
    // No cards hidden, no cards duplicated; the stale label is just empty.
    assert_eq!(rendered, vec![("leads", 0), ("qualified", 1)]);
}

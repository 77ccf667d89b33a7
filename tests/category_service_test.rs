//! Tests for CategoryService

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;

use cattree::application::services::{CategoryService, SaveOptions};
use cattree::application::ApplicationError;
use cattree::domain::{DomainError, MoveRequest};
use cattree::infrastructure::traits::RealFileSystem;
use cattree::util::testing;

/// Helper to create a JSON document in the temp dir
fn write_json(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).expect("write json");
    path
}

fn read_json(path: &PathBuf) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn example_tree() -> Value {
    json!([
        {"key": "1", "name": "Books", "children": [
            {"key": "1-1", "name": "Novels"},
            {"key": "1-2", "name": "Poems", "bookCount": 4}
        ]},
        {"key": "2", "name": "Exams"}
    ])
}

fn service() -> CategoryService {
    testing::init_test_setup();
    CategoryService::new(Arc::new(RealFileSystem))
}

#[test]
fn given_valid_document_when_loading_then_returns_tree() {
    let temp = TempDir::new().unwrap();
    let path = write_json(&temp, "tree.json", &example_tree());

    let tree = service().load(&path).unwrap();

    assert_eq!(tree.len(), 4);
    assert_eq!(tree.keys(), vec!["1", "1-1", "1-2", "2"]);
}

#[test]
fn given_duplicate_keys_when_loading_then_domain_error() {
    let temp = TempDir::new().unwrap();
    let path = write_json(
        &temp,
        "tree.json",
        &json!([{"key": "a", "children": [{"key": "a"}]}]),
    );

    let err = service().load(&path).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::DuplicateKey(ref k)) if k == "a"
    ));
}

#[test]
fn given_malformed_document_when_loading_then_serialization_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("tree.json");
    std::fs::write(&path, "{not json").unwrap();

    let err = service().load(&path).unwrap_err();

    assert!(matches!(err, ApplicationError::Serialization { .. }));
}

#[test]
fn given_missing_document_when_loading_then_operation_failed() {
    let err = service()
        .load(&PathBuf::from("/nonexistent/tree.json"))
        .unwrap_err();

    assert!(err.to_string().contains("file not found"));
}

#[test]
fn given_move_with_persist_when_moving_then_document_is_rewritten() {
    let temp = TempDir::new().unwrap();
    let path = write_json(&temp, "tree.json", &example_tree());

    let outcome = service()
        .move_node(&path, &MoveRequest::new("1-2", "2", -1, true), true)
        .unwrap();

    assert!(outcome.saved);
    assert_eq!(
        read_json(&path),
        json!([
            {"key": "1", "name": "Books", "children": [{"key": "1-1", "name": "Novels"}]},
            {"key": "1-2", "name": "Poems", "bookCount": 4},
            {"key": "2", "name": "Exams"}
        ])
    );
    let changed: Vec<&str> = outcome.changed.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(changed, vec!["1-2", "2"]);
}

#[test]
fn given_null_and_non_string_payload_when_moving_then_saved_document_keeps_it() {
    let temp = TempDir::new().unwrap();
    let path = write_json(
        &temp,
        "tree.json",
        &json!([
            {"key": "1", "name": null, "children": [{"key": "1-1", "name": 5}]},
            {"key": "2", "name": "Exams", "children": null}
        ]),
    );

    let outcome = service()
        .move_node(&path, &MoveRequest::new("2", "1", -1, true), true)
        .unwrap();

    assert!(outcome.saved);
    assert_eq!(
        read_json(&path),
        json!([
            {"key": "2", "name": "Exams"},
            {"key": "1", "name": null, "children": [{"key": "1-1", "name": 5}]}
        ])
    );
}

#[test]
fn given_dry_run_when_moving_then_document_is_untouched() {
    let temp = TempDir::new().unwrap();
    let path = write_json(&temp, "tree.json", &example_tree());
    let original = std::fs::read_to_string(&path).unwrap();

    let outcome = service()
        .move_node(&path, &MoveRequest::new("2", "1", 0, false), false)
        .unwrap();

    assert!(!outcome.saved);
    assert_eq!(outcome.tree.roots().len(), 1);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn given_cyclic_move_when_moving_then_error_and_document_is_untouched() {
    let temp = TempDir::new().unwrap();
    let path = write_json(&temp, "tree.json", &example_tree());
    let original = std::fs::read_to_string(&path).unwrap();

    let err = service()
        .move_node(&path, &MoveRequest::new("1", "1-1", 0, false), true)
        .unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::CyclicMove { .. })
    ));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn given_no_op_move_when_persisting_then_nothing_is_written() {
    let temp = TempDir::new().unwrap();
    let path = write_json(&temp, "tree.json", &example_tree());
    let original = std::fs::read_to_string(&path).unwrap();

    let outcome = service()
        .move_node(&path, &MoveRequest::new("1-2", "1-1", 1, true), true)
        .unwrap();

    assert!(outcome.changed.is_empty());
    assert!(!outcome.saved);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn given_backup_enabled_when_saving_then_keeps_previous_document() {
    let temp = TempDir::new().unwrap();
    let path = write_json(&temp, "tree.json", &example_tree());
    let service = CategoryService::with_options(
        Arc::new(RealFileSystem),
        SaveOptions {
            pretty: false,
            backup: true,
        },
    );

    service
        .move_node(&path, &MoveRequest::new("2", "1", 0, false), true)
        .unwrap();

    let backup = temp.path().join("tree.json.bak");
    assert_eq!(read_json(&backup), example_tree());
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written.lines().count(), 1, "compact output expected");
}

#[test]
fn given_script_when_applying_then_all_moves_land() {
    let temp = TempDir::new().unwrap();
    let path = write_json(&temp, "tree.json", &example_tree());
    let script = write_json(
        &temp,
        "moves.json",
        &json!([
            {"dragKey": "2", "dropKey": "1-1", "dropPosition": 1, "dropToGap": true},
            {"dragKey": "1-2", "dropKey": "1", "dropPosition": -1, "dropToGap": true}
        ]),
    );

    let outcome = service().apply_script(&path, &script, true).unwrap();

    assert!(outcome.saved);
    assert_eq!(outcome.tree.keys(), vec!["1-2", "1", "1-1", "2"]);
}

#[test]
fn given_script_with_bad_step_when_applying_then_nothing_is_written() {
    let temp = TempDir::new().unwrap();
    let path = write_json(&temp, "tree.json", &example_tree());
    let original = std::fs::read_to_string(&path).unwrap();
    let script = write_json(
        &temp,
        "moves.json",
        &json!([
            {"dragKey": "2", "dropKey": "1", "dropToGap": false},
            {"dragKey": "ghost", "dropKey": "1", "dropToGap": false}
        ]),
    );

    let err = service().apply_script(&path, &script, true).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::BatchMoveFailed { index: 1, .. })
    ));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn given_document_when_exporting_order_then_lists_every_node() {
    let temp = TempDir::new().unwrap();
    let path = write_json(&temp, "tree.json", &example_tree());

    let entries = service().sort_order(&path).unwrap();

    assert_eq!(entries.len(), 4);
    assert_eq!(entries[2].key, "1-2");
    assert_eq!(entries[2].parent_key.as_deref(), Some("1"));
    assert_eq!(entries[2].sort, 1);
}

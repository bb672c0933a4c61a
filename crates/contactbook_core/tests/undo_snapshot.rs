mod common;

use common::{contact, names, Fixture};
use contactbook_core::{ContactStore, SaveOptions, UndoOutcome};

#[test]
fn undo_restores_state_before_last_save() {
    let fixture = Fixture::new();
    let store = fixture.store();
    let s0 = vec![contact("Ada", "5551112222", "math")];
    let s1 = vec![
        contact("Ada", "5551112222", "math,poetry"),
        contact("Bob", "", ""),
    ];
    store.save(&s0, SaveOptions::default()).unwrap();
    store.save(&s1, SaveOptions::default()).unwrap();

    let outcome = store.undo().unwrap();

    assert_eq!(outcome, UndoOutcome::Restored { count: 1 });
    assert_eq!(store.load(), s0);
}

#[test]
fn undo_is_single_level_and_repeatable() {
    let fixture = Fixture::new();
    let store = fixture.store();
    store
        .save(&[contact("A", "", "")], SaveOptions::default())
        .unwrap();
    store
        .save(&[contact("B", "", "")], SaveOptions::default())
        .unwrap();
    store
        .save(&[contact("C", "", "")], SaveOptions::default())
        .unwrap();

    store.undo().unwrap();
    assert_eq!(names(&store.load()), vec!["B"]);

    // Undo never overwrites its own snapshot, so a second undo lands on the
    // same state instead of stepping further back.
    store.undo().unwrap();
    assert_eq!(names(&store.load()), vec!["B"]);
}

#[test]
fn first_save_snapshots_empty_state() {
    let fixture = Fixture::new();
    let store = fixture.store();
    store
        .save(&[contact("Ada", "", "")], SaveOptions::default())
        .unwrap();

    assert_eq!(store.undo().unwrap(), UndoOutcome::Restored { count: 0 });
    assert!(store.load().is_empty());
}

#[test]
fn empty_slot_means_nothing_to_undo() {
    let fixture = Fixture::new();
    let store = fixture.store();

    assert_eq!(store.undo().unwrap(), UndoOutcome::NothingToUndo);
    assert!(fixture.log.operations().is_empty());
    assert!(!fixture.config.store_path.exists());
}

#[test]
fn corrupt_snapshot_means_nothing_to_undo_and_is_logged() {
    let fixture = Fixture::new();
    let store = fixture.store();
    store
        .save(&[contact("Ada", "", "")], SaveOptions::default())
        .unwrap();
    std::fs::write(&fixture.config.snapshot_path, "{not json").unwrap();

    assert_eq!(store.undo().unwrap(), UndoOutcome::NothingToUndo);
    assert_eq!(names(&store.load()), vec!["Ada"]);
    assert!(fixture
        .log
        .operations()
        .contains(&"get_last_snapshot".to_string()));
}

#[test]
fn undo_never_creates_backups() {
    let fixture = Fixture::new();
    let store = fixture.store();
    store
        .save(&[contact("A", "", "")], SaveOptions::default())
        .unwrap();
    store
        .save(&[contact("B", "", "")], SaveOptions::default())
        .unwrap();
    let backups_before = store.list_backups().unwrap();

    // A new calendar day would normally allow another automatic backup.
    fixture.clock.set(common::datetime(2026, 3, 2, 9, 0, 0));
    store.undo().unwrap();

    assert_eq!(store.list_backups().unwrap(), backups_before);
}

#[test]
fn save_without_snapshot_keeps_previous_slot() {
    let fixture = Fixture::new();
    let store = fixture.store();
    store
        .save(&[contact("A", "", "")], SaveOptions::default())
        .unwrap();
    store
        .save(&[contact("B", "", "")], SaveOptions::default())
        .unwrap();
    let options = SaveOptions {
        backup: true,
        undo_snapshot: false,
    };
    store.save(&[contact("C", "", "")], options).unwrap();

    store.undo().unwrap();

    assert_eq!(names(&store.load()), vec!["A"]);
}

#[test]
fn snapshot_file_is_json_with_store_fields() {
    let fixture = Fixture::new();
    let store = fixture.store();
    let s0 = vec![contact("Ada", "+15550001111", "math").with_favorite(true)];
    store.save(&s0, SaveOptions::default()).unwrap();
    store.save(&[], SaveOptions::default()).unwrap();

    let text = std::fs::read_to_string(&fixture.config.snapshot_path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        value,
        serde_json::json!([{
            "name": "Ada",
            "phone": "+15550001111",
            "email": "",
            "tags": "math",
            "favorite": true
        }])
    );
    assert_eq!(store.backups().read_snapshot(), Some(s0));
}

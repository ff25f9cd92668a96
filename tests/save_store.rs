use maze_stalker::{DifficultyLevel, SaveError, SaveRecord, SaveStore};

fn record() -> SaveRecord {
    SaveRecord {
        observer_position: [12.5, 2.0, -40.0],
        agent_position: [30.0, 2.0, -10.0],
        difficulty: DifficultyLevel::Nightmare,
        eeriness: 33.0,
        fear: 0.0,
    }
}

#[test]
fn saved_slot_loads_back() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SaveStore::new(dir.path().join("saves"));
    store.save(2, &record()).expect("save");

    assert_eq!(store.occupied(), vec![2]);
    let loaded = store.load(2).expect("load");
    assert_eq!(loaded, Some(record()));
}

#[test]
fn empty_slot_is_none() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SaveStore::new(dir.path());
    assert!(matches!(store.load(1), Ok(None)));
    assert!(store.occupied().is_empty());
}

#[test]
fn overwrite_replaces_record() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SaveStore::new(dir.path());
    store.save(1, &record()).expect("first save");
    let mut newer = record();
    newer.fear = 80.0;
    newer.difficulty = DifficultyLevel::Easy;
    store.save(1, &newer).expect("second save");
    assert_eq!(store.load(1).expect("load"), Some(newer));
}

#[test]
fn corrupt_file_is_a_format_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SaveStore::new(dir.path());
    let path = store.slot_path(3).expect("slot 3");
    std::fs::write(&path, "{ not json").expect("write");
    assert!(matches!(store.load(3), Err(SaveError::Format { .. })));
}

#[test]
fn file_is_keyed_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SaveStore::new(dir.path());
    store.save(1, &record()).expect("save");
    let text = std::fs::read_to_string(dir.path().join("save_slot_1.json")).expect("read");
    let value: serde_json::Value = serde_json::from_str(&text).expect("json");
    assert_eq!(value["difficulty"], "nightmare");
    assert_eq!(value["observerPosition"][0], 12.5);
}

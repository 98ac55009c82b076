mod common;

use std::sync::Arc;

use common::{memory_manager, FaultyStore};
use kindstore::{Key, KeyId, KindManager, StorageError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Note {
    name: String,
    description: String,
}

fn note() -> Note {
    Note {
        name: "Anthony Gonzalves".to_string(),
        description: "Duniya mei Akala hu".to_string(),
    }
}

fn create_get_delete(name: &str, id: i64) -> Key {
    let (man, _) = memory_manager("testPackage");
    let set_value = note();

    let key = man.create(name, id, &set_value).unwrap();
    assert!(key.is_complete());

    let get_value: Note = man.get(&key).unwrap();
    man.delete(&key).unwrap();

    assert_eq!(get_value, set_value);
    key
}

#[test]
fn create_with_name() {
    let key = create_get_delete("test_1", 0);
    assert_eq!(key.id(), &KeyId::Name("test_1".to_string()));
}

#[test]
fn create_with_id() {
    let key = create_get_delete("", 100);
    assert_eq!(key.id(), &KeyId::Id(100));
}

#[test]
fn create_with_allocated_id() {
    let key = create_get_delete("", 0);
    assert!(matches!(key.id(), KeyId::Id(id) if *id > 0));
}

#[test]
fn create_with_negative_id_allocates() {
    let key = create_get_delete("", -100);
    assert!(matches!(key.id(), KeyId::Id(id) if *id > 0));
}

#[test]
fn create_with_zero_name_uses_id() {
    let key = create_get_delete("0", 7);
    assert_eq!(key, Key::identified("testPackage", 7));
}

#[test]
fn put_replaces_existing_entity() {
    let (man, _) = memory_manager("testPackage");
    let key = man.create("n1", 0, &note()).unwrap();

    let updated = Note {
        name: "Updated".to_string(),
        ..note()
    };
    assert_eq!(man.put(&key, &updated).unwrap(), key);
    assert_eq!(man.get::<Note>(&key).unwrap(), updated);
    assert_eq!(man.count().unwrap(), 1);
}

#[test]
fn get_after_delete_is_not_found() {
    let (man, _) = memory_manager("testPackage");
    let key = man.create("gone", 0, &note()).unwrap();
    man.delete(&key).unwrap();

    let err = man.get::<Note>(&key).unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err.as_store_error(), Some(StorageError::NotFound(k)) if *k == key));
}

#[test]
fn get_into_wrong_shape_is_type_mismatch() {
    #[derive(Debug, Deserialize)]
    struct Counter {
        #[allow(dead_code)]
        value: i64,
    }

    let (man, _) = memory_manager("testPackage");
    let key = man.create("n1", 0, &note()).unwrap();
    let err = man.get::<Counter>(&key).unwrap_err();
    assert!(err.is_type_mismatch());
}

#[test]
fn create_with_scalar_payload_is_type_mismatch() {
    let (man, store) = memory_manager("testPackage");
    let err = man.create("n1", 0, &"just a string").unwrap_err();
    assert!(err.is_type_mismatch());
    assert!(store.is_empty().unwrap());
}

#[test]
fn count_tracks_inserts_and_deletes() {
    let (man, _) = memory_manager("Counted");
    assert_eq!(man.count().unwrap(), 0);

    let keys: Vec<Key> = (0..25).map(|_| man.create("", 0, &note()).unwrap()).collect();
    assert_eq!(man.count().unwrap(), 25);

    man.delete_all(&keys[..10]).unwrap();
    assert_eq!(man.count().unwrap(), 15);
}

#[test]
fn delete_is_idempotent() {
    let (man, _) = memory_manager("Counted");
    let keep = man.create("keep", 0, &note()).unwrap();
    let drop_key = man.create("drop", 0, &note()).unwrap();

    man.delete(&drop_key).unwrap();
    man.delete(&drop_key).unwrap();
    man.delete_all(&[drop_key.clone(), drop_key]).unwrap();

    assert_eq!(man.count().unwrap(), 1);
    let names: Vec<Note> = man.find_by("Name", "Anthony Gonzalves").unwrap();
    assert_eq!(names.len(), 1);
    assert_eq!(man.get::<Note>(&keep).unwrap(), note());
}

#[test]
fn managers_of_different_kinds_share_a_store() {
    let (notes, store) = memory_manager("Note");
    let drafts = KindManager::new(store, "Draft").unwrap();

    notes.create("a", 0, &note()).unwrap();
    drafts.create("a", 0, &note()).unwrap();
    drafts.create("b", 0, &note()).unwrap();

    assert_eq!(notes.count().unwrap(), 1);
    assert_eq!(drafts.count().unwrap(), 2);

    let err = notes.delete(&drafts.key("a", 0)).unwrap_err();
    assert!(err.is_type_mismatch());
}

#[test]
fn unreachable_store_fails_construction() {
    let store = Arc::new(FaultyStore {
        fail_ping: true,
        ..FaultyStore::default()
    });
    let err = KindManager::new(store, "Note").unwrap_err();
    assert!(err.is_store());
    assert!(err.is_retryable());
    assert_eq!(err.to_string(), "Connection error: emulator not reachable");
}

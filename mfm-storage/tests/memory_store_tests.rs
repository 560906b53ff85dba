use chrono::NaiveDate;
use mfm_model::{FactionData, RevisionData, UnitData, Version, VersionStatus};
use mfm_storage::{MemoryStore, ReferenceStore, StorageError};
use mfm_types::{VersionId, VersionLabel};

fn make_version(label: &str) -> Version {
    Version::new(
        VersionLabel::parse(label).unwrap(),
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        VersionStatus::Published,
    )
}

fn revision() -> RevisionData {
    RevisionData::new(vec![
        FactionData::new("Orks").with_unit(UnitData::new("Boyz").with_variant(10, 80)),
    ])
}

#[test]
fn new_store_is_empty() {
    let store = MemoryStore::new();
    assert_eq!(store.version_count(), 0);
    assert!(store.load_versions().unwrap().is_empty());
}

#[test]
fn write_and_load_roundtrip() {
    let store = MemoryStore::new();
    let version = make_version("2025.1");
    store.write_revision(&version, &revision()).unwrap();

    assert_eq!(store.load_revision(&version.id).unwrap(), revision());
    assert_eq!(store.load_versions().unwrap(), vec![version]);
}

#[test]
fn unknown_version_is_not_found() {
    let store = MemoryStore::new();
    assert!(matches!(
        store.load_revision(&VersionId::new()),
        Err(StorageError::NotFound(_))
    ));
    assert!(matches!(
        store.swap_latest(&VersionId::new()),
        Err(StorageError::NotFound(_))
    ));
}

#[test]
fn swap_latest_is_exclusive() {
    let store = MemoryStore::new();
    let v1 = make_version("2025.1");
    let v2 = make_version("2025.2");
    store.write_revision(&v1, &revision()).unwrap();
    store.write_revision(&v2, &revision()).unwrap();

    store.swap_latest(&v1.id).unwrap();
    store.swap_latest(&v2.id).unwrap();

    let latest: Vec<VersionId> = store
        .load_versions()
        .unwrap()
        .into_iter()
        .filter(|v| v.is_latest)
        .map(|v| v.id)
        .collect();
    assert_eq!(latest, vec![v2.id]);
}

#[test]
fn save_version_preserves_latest_marker() {
    let store = MemoryStore::new();
    let mut v1 = make_version("2025.1");
    store.write_revision(&v1, &revision()).unwrap();
    store.swap_latest(&v1.id).unwrap();

    v1.is_active = false;
    store.save_version(&v1).unwrap();

    let stored = &store.load_versions().unwrap()[0];
    assert!(!stored.is_active);
    assert!(stored.is_latest);
}

#[test]
fn rewriting_latest_tree_keeps_marker() {
    let store = MemoryStore::new();
    let v1 = make_version("2025.1");
    store.write_revision(&v1, &revision()).unwrap();
    store.swap_latest(&v1.id).unwrap();

    store.write_revision(&v1, &RevisionData::default()).unwrap();

    let loaded = store.load_versions().unwrap();
    assert!(loaded[0].is_latest);
    assert_eq!(store.load_revision(&v1.id).unwrap(), RevisionData::default());
}

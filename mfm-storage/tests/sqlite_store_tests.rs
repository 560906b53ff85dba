use chrono::NaiveDate;
use mfm_model::{DetachmentData, FactionData, RevisionData, UnitData, Version, VersionStatus};
use mfm_storage::{ReferenceStore, SqliteStore, StorageError};
use mfm_types::{VersionId, VersionLabel};
use pretty_assertions::assert_eq;

fn make_store() -> SqliteStore {
    SqliteStore::open_in_memory().unwrap()
}

fn make_version(label: &str) -> Version {
    Version::new(
        VersionLabel::parse(label).unwrap(),
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        VersionStatus::Published,
    )
}

fn sample_revision(boyz_points: i64) -> RevisionData {
    RevisionData::new(vec![
        FactionData::new("Orks")
            .with_supergroup("Xenos")
            .with_detachment(
                DetachmentData::new("War Horde")
                    .with_enhancement("Follow Me Ladz", 25)
                    .with_enhancement("Kunnin' But Brutal", 15),
            )
            .with_unit(
                UnitData::new("Boyz")
                    .with_unit_type("Battleline")
                    .with_variant(10, boyz_points)
                    .with_variant(20, boyz_points * 2),
            )
            .with_unit(UnitData::new("Warboss").with_variant(1, 65)),
        FactionData::new("Aeldari").with_unit(UnitData::new("Guardians").with_variant(11, 100)),
    ])
}

// ── Revisions ────────────────────────────────────────────────────

#[test]
fn write_and_load_revision_roundtrip() {
    let store = make_store();
    let version = make_version("2025.1");
    let revision = sample_revision(80);

    store.write_revision(&version, &revision).unwrap();

    assert_eq!(store.load_revision(&version.id).unwrap(), revision);
}

#[test]
fn write_revision_replaces_previous_subtree() {
    let store = make_store();
    let version = make_version("2025.1");
    store.write_revision(&version, &sample_revision(80)).unwrap();

    let replacement = RevisionData::new(vec![
        FactionData::new("Orks").with_unit(UnitData::new("Boyz").with_variant(10, 90)),
    ]);
    store.write_revision(&version, &replacement).unwrap();

    assert_eq!(store.load_revision(&version.id).unwrap(), replacement);
}

#[test]
fn revisions_are_isolated_per_version() {
    let store = make_store();
    let v1 = make_version("2025.1");
    let v2 = make_version("2025.2");
    store.write_revision(&v1, &sample_revision(80)).unwrap();
    store.write_revision(&v2, &sample_revision(95)).unwrap();

    let first = store.load_revision(&v1.id).unwrap();
    let second = store.load_revision(&v2.id).unwrap();
    assert_eq!(first.factions[0].units[0].variants[0].points, 80);
    assert_eq!(second.factions[0].units[0].variants[0].points, 95);
}

#[test]
fn load_unknown_revision_is_not_found() {
    let store = make_store();
    let err = store.load_revision(&VersionId::new()).unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}

#[test]
fn empty_revision_loads_as_empty() {
    let store = make_store();
    let version = make_version("2025.1");
    store.write_revision(&version, &RevisionData::default()).unwrap();
    assert_eq!(store.load_revision(&version.id).unwrap(), RevisionData::default());
}

#[test]
fn negative_points_are_refused_by_schema() {
    let store = make_store();
    let version = make_version("2025.1");
    let bad = RevisionData::new(vec![
        FactionData::new("Orks").with_unit(UnitData::new("Boyz").with_variant(10, -5)),
    ]);

    assert!(store.write_revision(&version, &bad).is_err());
    // The failed transaction left nothing behind.
    assert!(store.load_versions().unwrap().is_empty());
}

// ── Versions and latest marker ───────────────────────────────────

#[test]
fn load_versions_returns_rows() {
    let store = make_store();
    let v1 = make_version("2025.1");
    store.write_revision(&v1, &RevisionData::default()).unwrap();

    let versions = store.load_versions().unwrap();
    assert_eq!(versions, vec![v1]);
}

#[test]
fn write_with_latest_moves_marker() {
    let store = make_store();
    let mut v1 = make_version("2025.1");
    v1.is_latest = true;
    store.write_revision(&v1, &RevisionData::default()).unwrap();

    let mut v2 = make_version("2025.2");
    v2.is_latest = true;
    store.write_revision(&v2, &RevisionData::default()).unwrap();

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
fn swap_latest_leaves_exactly_one_marker() {
    let store = make_store();
    let v1 = make_version("2025.1");
    let v2 = make_version("2025.2");
    store.write_revision(&v1, &RevisionData::default()).unwrap();
    store.write_revision(&v2, &RevisionData::default()).unwrap();

    store.swap_latest(&v1.id).unwrap();
    store.swap_latest(&v2.id).unwrap();

    let versions = store.load_versions().unwrap();
    assert_eq!(versions.iter().filter(|v| v.is_latest).count(), 1);
    assert!(versions.iter().find(|v| v.id == v2.id).unwrap().is_latest);
}

#[test]
fn swap_latest_to_unknown_version_keeps_old_marker() {
    let store = make_store();
    let v1 = make_version("2025.1");
    store.write_revision(&v1, &RevisionData::default()).unwrap();
    store.swap_latest(&v1.id).unwrap();

    let err = store.swap_latest(&VersionId::new()).unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
    assert!(store.load_versions().unwrap()[0].is_latest);
}

#[test]
fn save_version_updates_flags_but_not_latest() {
    let store = make_store();
    let mut v1 = make_version("2025.1");
    v1.status = VersionStatus::Draft;
    store.write_revision(&v1, &RevisionData::default()).unwrap();
    store.swap_latest(&v1.id).unwrap();

    v1.status = VersionStatus::Published;
    v1.is_active = false;
    v1.is_latest = false;
    store.save_version(&v1).unwrap();

    let stored = &store.load_versions().unwrap()[0];
    assert_eq!(stored.status, VersionStatus::Published);
    assert!(!stored.is_active);
    assert!(stored.is_latest);
}

// ── On disk ──────────────────────────────────────────────────────

#[test]
fn reopening_file_store_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.sqlite");
    let version = make_version("2025.1");

    {
        let store = SqliteStore::open(&path).unwrap();
        store.write_revision(&version, &sample_revision(80)).unwrap();
        store.swap_latest(&version.id).unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    let versions = store.load_versions().unwrap();
    assert_eq!(versions.len(), 1);
    assert!(versions[0].is_latest);
    assert_eq!(store.load_revision(&version.id).unwrap(), sample_revision(80));
}

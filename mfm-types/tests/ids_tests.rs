use mfm_types::{FactionId, UnitId, VersionId};
use std::collections::HashSet;
use std::str::FromStr;

// ── VersionId ─────────────────────────────────────────────────────

#[test]
fn version_id_new_is_unique() {
    let a = VersionId::new();
    let b = VersionId::new();
    assert_ne!(a, b);
}

#[test]
fn version_id_from_uuid_roundtrip() {
    let uuid = uuid::Uuid::now_v7();
    let id = VersionId::from_uuid(uuid);
    assert_eq!(id.as_uuid(), uuid);
}

#[test]
fn version_id_display_and_parse() {
    let id = VersionId::new();
    let parsed = VersionId::parse(&id.to_string()).unwrap();
    assert_eq!(id, parsed);
}

#[test]
fn version_id_from_str_invalid() {
    assert!(VersionId::from_str("garbage").is_err());
}

#[test]
fn version_id_is_time_ordered() {
    let first = VersionId::new();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let second = VersionId::new();
    assert!(first < second);
}

#[test]
fn version_id_hash_and_eq() {
    let id = VersionId::new();
    let mut set = HashSet::new();
    set.insert(id);
    set.insert(id);
    assert_eq!(set.len(), 1);
}

#[test]
fn version_id_serializes_as_plain_string() {
    let id = VersionId::new();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("\"{id}\""));
    let parsed: VersionId = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, id);
}

// ── Arena ids ─────────────────────────────────────────────────────

#[test]
fn arena_id_index_matches_slot() {
    assert_eq!(FactionId::new(7).index(), 7);
    assert_eq!(UnitId::new(0).index(), 0);
}

#[test]
fn arena_id_display_names_the_kind() {
    assert_eq!(FactionId::new(3).to_string(), "FactionId#3");
}

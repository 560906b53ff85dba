//! Shared fixtures for engine tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use mfm_engine::{CatalogConfig, ImportRequest, RevisionIngestor, VersionCatalog};
use mfm_model::{DetachmentData, FactionData, RevisionData, UnitData, Version};
use mfm_storage::{MemoryStore, ReferenceStore, StorageError, StorageResult};
use mfm_types::VersionId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};

pub fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).unwrap()
}

/// Orks with one detachment and two units, Aeldari with one unit.
pub fn manual(boyz_ten: i64) -> RevisionData {
    RevisionData::new(vec![
        FactionData::new("Orks")
            .with_supergroup("Xenos")
            .with_detachment(
                DetachmentData::new("Waaagh! Tribe")
                    .with_enhancement("Follow Me Ladz", 25)
                    .with_enhancement("Headwoppa's Killchoppa", 20),
            )
            .with_unit(
                UnitData::new("Boyz")
                    .with_unit_type("Battleline")
                    .with_variant(10, boyz_ten)
                    .with_variant(20, boyz_ten * 2),
            )
            .with_unit(
                UnitData::new("Warboss")
                    .with_unit_type("Character")
                    .with_variant(1, 75),
            ),
        FactionData::new("Aeldari")
            .with_supergroup("Xenos")
            .with_unit(UnitData::new("Guardian Defenders").with_variant(11, 100)),
    ])
}

pub fn catalog() -> Arc<VersionCatalog> {
    Arc::new(VersionCatalog::in_memory())
}

/// Imports `data` under `label` and returns its id.
pub fn import(catalog: &Arc<VersionCatalog>, label: &str, data: RevisionData, latest: bool) -> VersionId {
    RevisionIngestor::new(catalog.clone())
        .import_revision(ImportRequest::new(label, date(6, 1), data).with_mark_latest(latest))
        .unwrap()
}

pub fn draft(catalog: &Arc<VersionCatalog>, label: &str, data: RevisionData) -> VersionId {
    RevisionIngestor::new(catalog.clone())
        .import_revision(ImportRequest::new(label, date(6, 1), data).as_draft())
        .unwrap()
}

/// A memory store whose writes can be switched to fail.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing: AtomicBool,
}

impl FlakyStore {
    pub fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> StorageResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Rejected("disk full".into()));
        }
        Ok(())
    }
}

impl ReferenceStore for FlakyStore {
    fn load_versions(&self) -> StorageResult<Vec<Version>> {
        self.inner.load_versions()
    }

    fn load_revision(&self, id: &VersionId) -> StorageResult<RevisionData> {
        self.inner.load_revision(id)
    }

    fn write_revision(&self, version: &Version, data: &RevisionData) -> StorageResult<()> {
        self.check()?;
        self.inner.write_revision(version, data)
    }

    fn save_version(&self, version: &Version) -> StorageResult<()> {
        self.check()?;
        self.inner.save_version(version)
    }

    fn swap_latest(&self, id: &VersionId) -> StorageResult<()> {
        self.check()?;
        self.inner.swap_latest(id)
    }
}

/// A memory store that parks every `write_revision` until released.
pub struct ParkingStore {
    inner: MemoryStore,
    entered: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
}

impl ParkingStore {
    /// Returns the store, a receiver signalled on entry, and a sender that
    /// lets one parked write continue.
    pub fn new() -> (Self, Receiver<()>, Sender<()>) {
        let (entered_tx, entered_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel();
        let store = Self {
            inner: MemoryStore::new(),
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        };
        (store, entered_rx, release_tx)
    }
}

impl ReferenceStore for ParkingStore {
    fn load_versions(&self) -> StorageResult<Vec<Version>> {
        self.inner.load_versions()
    }

    fn load_revision(&self, id: &VersionId) -> StorageResult<RevisionData> {
        self.inner.load_revision(id)
    }

    fn write_revision(&self, version: &Version, data: &RevisionData) -> StorageResult<()> {
        self.entered.lock().unwrap().send(()).unwrap();
        self.release.lock().unwrap().recv().unwrap();
        self.inner.write_revision(version, data)
    }

    fn save_version(&self, version: &Version) -> StorageResult<()> {
        self.inner.save_version(version)
    }

    fn swap_latest(&self, id: &VersionId) -> StorageResult<()> {
        self.inner.swap_latest(id)
    }
}

pub fn catalog_on(store: Arc<dyn ReferenceStore>) -> Arc<VersionCatalog> {
    Arc::new(VersionCatalog::new(store, CatalogConfig::default()))
}

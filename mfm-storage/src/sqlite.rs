//! SQLite-backed reference store.
//!
//! One row per record, every child table cascading from `versions`, so
//! replacing a revision is a single `DELETE` of its factions followed by
//! bulk inserts, all inside one transaction.

use chrono::NaiveDate;
use mfm_model::{
    DetachmentData, EnhancementData, FactionData, RevisionData, UnitData, VariantData, Version,
    VersionStatus,
};
use mfm_types::{VersionId, VersionLabel};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::{ReferenceStore, StorageError, StorageResult};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Persistent reference store backed by SQLite.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StorageResult<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn init_schema(&self) -> StorageResult<()> {
        let conn = self.lock();
        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS versions (
                id TEXT PRIMARY KEY,
                label TEXT NOT NULL UNIQUE,
                release_date TEXT NOT NULL,
                status TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                is_latest INTEGER NOT NULL DEFAULT 0
            );

            CREATE UNIQUE INDEX IF NOT EXISTS versions_single_latest
                ON versions(is_latest) WHERE is_latest = 1;

            CREATE TABLE IF NOT EXISTS factions (
                id INTEGER PRIMARY KEY,
                version_id TEXT NOT NULL REFERENCES versions(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                supergroup TEXT,
                ally_to TEXT,
                UNIQUE(version_id, name)
            );

            CREATE TABLE IF NOT EXISTS detachments (
                id INTEGER PRIMARY KEY,
                faction_id INTEGER NOT NULL REFERENCES factions(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                UNIQUE(faction_id, name)
            );

            CREATE TABLE IF NOT EXISTS enhancements (
                id INTEGER PRIMARY KEY,
                detachment_id INTEGER NOT NULL REFERENCES detachments(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                points INTEGER NOT NULL CHECK (points >= 0),
                UNIQUE(detachment_id, name)
            );

            CREATE TABLE IF NOT EXISTS units (
                id INTEGER PRIMARY KEY,
                faction_id INTEGER NOT NULL REFERENCES factions(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                unit_type TEXT,
                UNIQUE(faction_id, name)
            );

            CREATE TABLE IF NOT EXISTS variants (
                id INTEGER PRIMARY KEY,
                unit_id INTEGER NOT NULL REFERENCES units(id) ON DELETE CASCADE,
                model_count INTEGER NOT NULL CHECK (model_count > 0),
                points INTEGER NOT NULL CHECK (points >= 0),
                UNIQUE(unit_id, model_count)
            );
            ",
        )?;
        Ok(())
    }

    // ── Writes ───────────────────────────────────────────────────

    fn upsert_version(tx: &Transaction<'_>, version: &Version) -> StorageResult<()> {
        tx.execute(
            "INSERT INTO versions (id, label, release_date, status, is_active, is_latest)
             VALUES (?1, ?2, ?3, ?4, ?5, 0)
             ON CONFLICT(id) DO UPDATE SET
                label = excluded.label,
                release_date = excluded.release_date,
                status = excluded.status,
                is_active = excluded.is_active",
            params![
                version.id.to_string(),
                version.label.as_str(),
                version.release_date.format(DATE_FORMAT).to_string(),
                version.status.as_str(),
                version.is_active,
            ],
        )?;
        Ok(())
    }

    fn move_latest(tx: &Transaction<'_>, id: &VersionId) -> StorageResult<()> {
        tx.execute("UPDATE versions SET is_latest = 0 WHERE is_latest = 1", [])?;
        let updated = tx.execute(
            "UPDATE versions SET is_latest = 1 WHERE id = ?1",
            params![id.to_string()],
        )?;
        if updated == 0 {
            return Err(StorageError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn insert_tree(tx: &Transaction<'_>, id: &VersionId, data: &RevisionData) -> StorageResult<()> {
        let version_id = id.to_string();
        let mut faction_stmt = tx.prepare_cached(
            "INSERT INTO factions (version_id, name, supergroup, ally_to) VALUES (?1, ?2, ?3, ?4)",
        )?;
        let mut detachment_stmt =
            tx.prepare_cached("INSERT INTO detachments (faction_id, name) VALUES (?1, ?2)")?;
        let mut enhancement_stmt = tx.prepare_cached(
            "INSERT INTO enhancements (detachment_id, name, points) VALUES (?1, ?2, ?3)",
        )?;
        let mut unit_stmt =
            tx.prepare_cached("INSERT INTO units (faction_id, name, unit_type) VALUES (?1, ?2, ?3)")?;
        let mut variant_stmt = tx.prepare_cached(
            "INSERT INTO variants (unit_id, model_count, points) VALUES (?1, ?2, ?3)",
        )?;

        for faction in &data.factions {
            let faction_id = faction_stmt.insert(params![
                version_id,
                faction.name,
                faction.supergroup,
                faction.ally_to,
            ])?;
            for detachment in &faction.detachments {
                let detachment_id = detachment_stmt.insert(params![faction_id, detachment.name])?;
                for enhancement in &detachment.enhancements {
                    enhancement_stmt.insert(params![
                        detachment_id,
                        enhancement.name,
                        enhancement.points,
                    ])?;
                }
            }
            for unit in &faction.units {
                let unit_id = unit_stmt.insert(params![faction_id, unit.name, unit.unit_type])?;
                for variant in &unit.variants {
                    variant_stmt.insert(params![unit_id, variant.model_count, variant.points])?;
                }
            }
        }
        Ok(())
    }

    // ── Reads ────────────────────────────────────────────────────

    fn read_tree(conn: &Connection, id: &VersionId) -> StorageResult<RevisionData> {
        let mut factions_stmt = conn.prepare_cached(
            "SELECT id, name, supergroup, ally_to FROM factions WHERE version_id = ?1 ORDER BY id",
        )?;
        let mut detachments_stmt =
            conn.prepare_cached("SELECT id, name FROM detachments WHERE faction_id = ?1 ORDER BY id")?;
        let mut enhancements_stmt = conn.prepare_cached(
            "SELECT name, points FROM enhancements WHERE detachment_id = ?1 ORDER BY id",
        )?;
        let mut units_stmt = conn
            .prepare_cached("SELECT id, name, unit_type FROM units WHERE faction_id = ?1 ORDER BY id")?;
        let mut variants_stmt = conn.prepare_cached(
            "SELECT model_count, points FROM variants WHERE unit_id = ?1 ORDER BY id",
        )?;

        let faction_rows = factions_stmt
            .query_map(params![id.to_string()], |row| {
                let faction_id: i64 = row.get(0)?;
                let faction = FactionData {
                    name: row.get(1)?,
                    supergroup: row.get(2)?,
                    ally_to: row.get(3)?,
                    detachments: Vec::new(),
                    units: Vec::new(),
                };
                Ok((faction_id, faction))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut factions = Vec::with_capacity(faction_rows.len());
        for (faction_id, mut faction) in faction_rows {
            let detachment_rows = detachments_stmt
                .query_map(params![faction_id], |row| {
                    Ok((row.get::<_, i64>(0)?, DetachmentData::new(row.get::<_, String>(1)?)))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            for (detachment_id, mut detachment) in detachment_rows {
                detachment.enhancements = enhancements_stmt
                    .query_map(params![detachment_id], |row| {
                        Ok(EnhancementData {
                            name: row.get(0)?,
                            points: row.get(1)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                faction.detachments.push(detachment);
            }

            let unit_rows = units_stmt
                .query_map(params![faction_id], |row| {
                    let unit = UnitData {
                        name: row.get(1)?,
                        unit_type: row.get(2)?,
                        variants: Vec::new(),
                    };
                    Ok((row.get::<_, i64>(0)?, unit))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            for (unit_id, mut unit) in unit_rows {
                unit.variants = variants_stmt
                    .query_map(params![unit_id], |row| {
                        Ok(VariantData {
                            model_count: row.get(0)?,
                            points: row.get(1)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                faction.units.push(unit);
            }
            factions.push(faction);
        }

        Ok(RevisionData { factions })
    }
}

type VersionRow = (String, String, String, String, bool, bool);

fn version_from_row(row: VersionRow) -> StorageResult<Version> {
    let (id, label, release_date, status, is_active, is_latest) = row;
    let id = VersionId::parse(&id)
        .map_err(|e| StorageError::InvalidData(format!("invalid version id {id:?}: {e}")))?;
    let label = VersionLabel::parse(&label)
        .map_err(|e| StorageError::InvalidData(format!("invalid label for {id}: {e}")))?;
    let release_date = NaiveDate::parse_from_str(&release_date, DATE_FORMAT).map_err(|e| {
        StorageError::InvalidData(format!("invalid release date {release_date:?} for {id}: {e}"))
    })?;
    let status = VersionStatus::parse(&status)
        .ok_or_else(|| StorageError::InvalidData(format!("invalid status {status:?} for {id}")))?;
    Ok(Version {
        id,
        label,
        release_date,
        status,
        is_active,
        is_latest,
    })
}

impl ReferenceStore for SqliteStore {
    fn load_versions(&self) -> StorageResult<Vec<Version>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, label, release_date, status, is_active, is_latest FROM versions ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ))
            })?
            .collect::<Result<Vec<VersionRow>, _>>()?;
        rows.into_iter().map(version_from_row).collect()
    }

    fn load_revision(&self, id: &VersionId) -> StorageResult<RevisionData> {
        let conn = self.lock();
        let exists = conn
            .query_row(
                "SELECT 1 FROM versions WHERE id = ?1",
                params![id.to_string()],
                |_| Ok(()),
            )
            .optional()?;
        if exists.is_none() {
            return Err(StorageError::NotFound(id.to_string()));
        }
        Self::read_tree(&conn, id)
    }

    fn write_revision(&self, version: &Version, data: &RevisionData) -> StorageResult<()> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        Self::upsert_version(&tx, version)?;
        tx.execute(
            "DELETE FROM factions WHERE version_id = ?1",
            params![version.id.to_string()],
        )?;
        Self::insert_tree(&tx, &version.id, data)?;
        if version.is_latest {
            Self::move_latest(&tx, &version.id)?;
        }
        tx.commit()?;
        debug!(
            version = %version.label,
            records = data.record_count(),
            "Wrote revision to SQLite"
        );
        Ok(())
    }

    fn save_version(&self, version: &Version) -> StorageResult<()> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        Self::upsert_version(&tx, version)?;
        tx.commit()?;
        Ok(())
    }

    fn swap_latest(&self, id: &VersionId) -> StorageResult<()> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        Self::move_latest(&tx, id)?;
        tx.commit()?;
        debug!(version_id = %id, "Moved latest marker");
        Ok(())
    }
}

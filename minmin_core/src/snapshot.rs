//! Snapshot persistence with file locking.
//!
//! The whole record store is saved as one JSON document after every
//! mutation. Writes are atomic (temp file, fsync, rename) and serialized
//! with an exclusive lock; reads take a shared lock. A file that cannot be
//! decoded is never overwritten: the save that would replace it first moves
//! it to `records.json.corrupt`.

use crate::{
    validate, DailyCondition, DayMap, DiaryEntry, Error, RecordStore, Result, SleepRecord,
};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Serializable form of the three record collections
///
/// Field aliases accept the camelCase layout of the browser app's
/// `minminDiaryData` export.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, alias = "sleepRecords")]
    pub sleep_records: Vec<SleepRecord>,

    #[serde(default, alias = "dailyConditions")]
    pub daily_conditions: Vec<DailyCondition>,

    #[serde(default, alias = "diaryEntries")]
    pub diary_entries: Vec<DiaryEntry>,
}

impl Snapshot {
    /// Read a snapshot file for import
    ///
    /// Unlike [`JsonFileStore`] loading, a malformed file is an error here.
    pub fn read_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let snapshot = serde_json::from_str(&contents)?;
        tracing::debug!("Read snapshot for import from {:?}", path);
        Ok(snapshot)
    }

    pub fn is_empty(&self) -> bool {
        self.sleep_records.is_empty()
            && self.daily_conditions.is_empty()
            && self.diary_entries.is_empty()
    }

    /// Build a store from this snapshot
    ///
    /// Records that would fail validation are dropped with a warning, and a
    /// later record wins over an earlier one for the same day.
    pub fn into_store(self) -> RecordStore {
        let sleep: DayMap<SleepRecord> = self
            .sleep_records
            .into_iter()
            .filter(|r| match validate::sleep_duration(r.duration_hours) {
                Ok(_) => true,
                Err(e) => {
                    tracing::warn!("Skipping sleep record for {}: {}", r.date, e);
                    false
                }
            })
            .collect();

        let conditions: DayMap<DailyCondition> = self.daily_conditions.into_iter().collect();

        let diary: DayMap<DiaryEntry> = self
            .diary_entries
            .into_iter()
            .filter_map(|entry| match validate::diary_text(&entry.text) {
                Ok(text) => Some(DiaryEntry {
                    date: entry.date,
                    text,
                }),
                Err(e) => {
                    tracing::warn!("Skipping diary entry for {}: {}", entry.date, e);
                    None
                }
            })
            .collect();

        RecordStore::from_parts(sleep, conditions, diary)
    }
}

impl RecordStore {
    /// Serializable copy of the store, each list in ascending date order
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            sleep_records: self.sleep().iter().cloned().collect(),
            daily_conditions: self.conditions().iter().cloned().collect(),
            diary_entries: self.diary().iter().cloned().collect(),
        }
    }
}

/// Persistence collaborator for a [`Tracker`](crate::Tracker)
pub trait SnapshotStore {
    fn load(&mut self) -> Result<Snapshot>;

    fn save(&mut self, snapshot: &Snapshot) -> Result<()>;
}

/// JSON snapshot file with locking and atomic replacement
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    /// The last load found a file it could not decode; the next save moves it aside
    unreadable: bool,
}

/// Exclusive advisory lock held across a load-modify-save cycle
///
/// Released when dropped.
#[derive(Debug)]
pub struct StoreLock {
    file: File,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

impl JsonFileStore {
    /// Create a store backed by the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            unreadable: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("json.lock")
    }

    /// First `records.json.corrupt[.N]` name not already taken
    fn corrupt_path(&self) -> PathBuf {
        let first = self.path.with_extension("json.corrupt");
        if !first.exists() {
            return first;
        }
        (1u32..)
            .map(|n| self.path.with_extension(format!("json.corrupt.{}", n)))
            .find(|candidate| !candidate.exists())
            .unwrap_or(first)
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Block until no other process holds the store's lock, then hold it
    ///
    /// Mutating callers take this before [`SnapshotStore::load`] so that a
    /// concurrent writer cannot slip in between their load and save.
    pub fn lock(&self) -> Result<StoreLock> {
        self.ensure_parent_dir()?;
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(self.lock_path())?;
        file.lock_exclusive()?;
        tracing::debug!("Acquired store lock {:?}", self.lock_path());
        Ok(StoreLock { file })
    }

    /// Move an undecodable snapshot out of the way before it is replaced
    fn quarantine(&self) -> Result<()> {
        let target = self.corrupt_path();
        match std::fs::rename(&self.path, &target) {
            Ok(()) => {
                tracing::warn!("Moved unreadable snapshot to {:?}", target);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl SnapshotStore for JsonFileStore {
    /// Returns an empty snapshot if the file doesn't exist or can't be decoded.
    ///
    /// An undecodable file is left in place until the next [`save`](Self::save),
    /// which renames it to `records.json.corrupt` instead of overwriting it.
    /// Any other I/O failure is returned.
    fn load(&mut self) -> Result<Snapshot> {
        self.unreadable = false;

        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!("No snapshot at {:?}, starting empty", self.path);
                return Ok(Snapshot::default());
            }
            Err(e) => return Err(e.into()),
        };

        file.lock_shared()?;
        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;

        let parsed = match read {
            Ok(_) => serde_json::from_str::<Snapshot>(&contents).map_err(Error::from),
            // Not UTF-8
            Err(e) if e.kind() == ErrorKind::InvalidData => Err(Error::Io(e)),
            Err(e) => return Err(e.into()),
        };

        match parsed {
            Ok(snapshot) => {
                tracing::info!(
                    "Loaded {} sleep, {} condition, {} diary records from {:?}",
                    snapshot.sleep_records.len(),
                    snapshot.daily_conditions.len(),
                    snapshot.diary_entries.len(),
                    self.path
                );
                Ok(snapshot)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to decode snapshot {:?}: {}. Starting empty.",
                    self.path,
                    e
                );
                self.unreadable = true;
                Ok(Snapshot::default())
            }
        }
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.ensure_parent_dir()?;

        if self.unreadable {
            self.quarantine()?;
            self.unreadable = false;
        }

        let parent = self.path.parent().ok_or_else(|| {
            Error::Other(format!("snapshot path {:?} has no parent", self.path))
        })?;
        let temp = NamedTempFile::new_in(parent)?;

        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, snapshot)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::info!("Saved snapshot to {:?}", self.path);
        Ok(())
    }
}

/// In-memory snapshot store that counts saves
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    snapshot: Snapshot,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing snapshot, as if it had been persisted earlier
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self { snapshot, saves: 0 }
    }

    /// Number of times `save` has been called
    pub fn saves(&self) -> usize {
        self.saves
    }

    /// The last saved snapshot
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&mut self) -> Result<Snapshot> {
        Ok(self.snapshot.clone())
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.snapshot = snapshot.clone();
        self.saves += 1;
        Ok(())
    }
}

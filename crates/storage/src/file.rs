use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use remedy_core::{ActiveMission, ActiveRemedy};

use crate::error::StorageError;
use crate::record::ArchiveEntry;
use crate::table::{self, Tables};
use crate::traits::{Archive, Store};

fn io_error(path: &Path, e: std::io::Error) -> StorageError {
    StorageError::Backend(format!("{}: {}", path.display(), e))
}

/// Store backed by a single JSON document on disk.
///
/// Every call re-reads the file, so writes made by another process between
/// two calls are observed. Writes go to a temporary file in the same
/// directory which is then renamed over the document, so a crash never
/// leaves a half-written file behind. Concurrent writers in the same
/// process are serialised by a mutex; across processes the version check
/// still rejects lost updates unless two read-modify-write cycles
/// interleave exactly.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Open (or lazily create) the document at `path`. Parent directories
    /// are created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Tables, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(Tables::default()),
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                StorageError::Backend(format!("{}: invalid state document: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Tables::default()),
            Err(e) => Err(io_error(&self.path, e)),
        }
    }

    fn write(&self, tables: &Tables) -> Result<(), StorageError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;

        let json = serde_json::to_string_pretty(tables)
            .map_err(|e| StorageError::Backend(format!("serialization error: {}", e)))?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| io_error(&dir, e))?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| io_error(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| io_error(&self.path, e.error))?;
        Ok(())
    }

    /// Read-modify-write under the process-local lock.
    fn update<R>(
        &self,
        f: impl FnOnce(&mut Tables) -> Result<R, StorageError>,
    ) -> Result<R, StorageError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| StorageError::Backend("file store lock poisoned".to_string()))?;
        let mut tables = self.read()?;
        let result = f(&mut tables)?;
        self.write(&tables)?;
        Ok(result)
    }
}

impl Store for FileStore {
    fn get_remedy(&self, instance_id: &str) -> Result<ActiveRemedy, StorageError> {
        table::get(&self.read()?.remedies, instance_id)
    }

    fn put_remedy(
        &self,
        remedy: &ActiveRemedy,
        expected_version: Option<u64>,
    ) -> Result<u64, StorageError> {
        self.update(|t| table::put(&mut t.remedies, remedy, expected_version))
    }

    fn list_remedies(&self) -> Result<Vec<ActiveRemedy>, StorageError> {
        Ok(self.read()?.remedies.into_values().collect())
    }

    fn get_mission(&self, instance_id: &str) -> Result<ActiveMission, StorageError> {
        table::get(&self.read()?.missions, instance_id)
    }

    fn put_mission(
        &self,
        mission: &ActiveMission,
        expected_version: Option<u64>,
    ) -> Result<u64, StorageError> {
        self.update(|t| table::put(&mut t.missions, mission, expected_version))
    }

    fn list_missions(&self) -> Result<Vec<ActiveMission>, StorageError> {
        Ok(self.read()?.missions.into_values().collect())
    }
}

/// Archive written as JSON Lines: one entry per line, append-only.
#[derive(Debug)]
pub struct JsonlArchive {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonlArchive {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonlArchive {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Archive for JsonlArchive {
    fn append(&self, entry: &ArchiveEntry) -> Result<(), StorageError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| StorageError::Backend("archive lock poisoned".to_string()))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        let line = serde_json::to_string(entry)
            .map_err(|e| StorageError::Backend(format!("serialization error: {}", e)))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| io_error(&self.path, e))?;
        writeln!(file, "{}", line).map_err(|e| io_error(&self.path, e))
    }
}

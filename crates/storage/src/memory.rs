use std::sync::{Mutex, MutexGuard};

use remedy_core::{ActiveMission, ActiveRemedy};

use crate::error::StorageError;
use crate::record::ArchiveEntry;
use crate::table::{self, Tables};
use crate::traits::{Archive, Store};

/// Process-local store. State lives as long as the value.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StorageError> {
        self.tables
            .lock()
            .map_err(|_| StorageError::Backend("memory store lock poisoned".to_string()))
    }
}

impl Store for MemoryStore {
    fn get_remedy(&self, instance_id: &str) -> Result<ActiveRemedy, StorageError> {
        table::get(&self.lock()?.remedies, instance_id)
    }

    fn put_remedy(
        &self,
        remedy: &ActiveRemedy,
        expected_version: Option<u64>,
    ) -> Result<u64, StorageError> {
        table::put(&mut self.lock()?.remedies, remedy, expected_version)
    }

    fn list_remedies(&self) -> Result<Vec<ActiveRemedy>, StorageError> {
        Ok(self.lock()?.remedies.values().cloned().collect())
    }

    fn get_mission(&self, instance_id: &str) -> Result<ActiveMission, StorageError> {
        table::get(&self.lock()?.missions, instance_id)
    }

    fn put_mission(
        &self,
        mission: &ActiveMission,
        expected_version: Option<u64>,
    ) -> Result<u64, StorageError> {
        table::put(&mut self.lock()?.missions, mission, expected_version)
    }

    fn list_missions(&self) -> Result<Vec<ActiveMission>, StorageError> {
        Ok(self.lock()?.missions.values().cloned().collect())
    }
}

/// Archive that keeps entries in memory, in append order.
#[derive(Debug, Default)]
pub struct MemoryArchive {
    entries: Mutex<Vec<ArchiveEntry>>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far.
    pub fn entries(&self) -> Vec<ArchiveEntry> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Archive for MemoryArchive {
    fn append(&self, entry: &ArchiveEntry) -> Result<(), StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Backend("memory archive lock poisoned".to_string()))?
            .push(entry.clone());
        Ok(())
    }
}

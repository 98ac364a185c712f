//! Versioned in-memory tables shared by the shipped backends.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use remedy_core::{ActiveMission, ActiveRemedy};

use crate::error::{RecordKind, StorageError};

/// A record the store versions on write.
pub(crate) trait Versioned: Clone {
    const KIND: RecordKind;
    fn instance_id(&self) -> &str;
    fn set_version(&mut self, version: u64);
    fn version(&self) -> u64;
}

impl Versioned for ActiveRemedy {
    const KIND: RecordKind = RecordKind::Remedy;

    fn instance_id(&self) -> &str {
        &self.instance_id
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl Versioned for ActiveMission {
    const KIND: RecordKind = RecordKind::Mission;

    fn instance_id(&self) -> &str {
        &self.instance_id
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Both collections, keyed by instance id. Also the on-disk document
/// format of [`FileStore`](crate::FileStore).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Tables {
    #[serde(default)]
    pub remedies: BTreeMap<String, ActiveRemedy>,
    #[serde(default)]
    pub missions: BTreeMap<String, ActiveMission>,
}

pub(crate) fn get<T: Versioned>(
    table: &BTreeMap<String, T>,
    instance_id: &str,
) -> Result<T, StorageError> {
    table
        .get(instance_id)
        .cloned()
        .ok_or_else(|| StorageError::NotFound {
            kind: T::KIND,
            instance_id: instance_id.to_string(),
        })
}

/// Insert (`expected_version = None`) or compare-and-set. Nothing is
/// written when an error is returned.
pub(crate) fn put<T: Versioned>(
    table: &mut BTreeMap<String, T>,
    record: &T,
    expected_version: Option<u64>,
) -> Result<u64, StorageError> {
    let instance_id = record.instance_id().to_string();
    let new_version = match (expected_version, table.get(&instance_id)) {
        (None, Some(_)) => {
            return Err(StorageError::AlreadyExists {
                kind: T::KIND,
                instance_id,
            })
        }
        (None, None) => 0,
        (Some(_), None) => {
            return Err(StorageError::NotFound {
                kind: T::KIND,
                instance_id,
            })
        }
        (Some(expected), Some(stored)) if stored.version() != expected => {
            return Err(StorageError::ConcurrentConflict {
                kind: T::KIND,
                instance_id,
                expected_version: expected,
                actual_version: stored.version(),
            })
        }
        (Some(expected), Some(_)) => expected + 1,
    };

    let mut stored = record.clone();
    stored.set_version(new_version);
    table.insert(instance_id, stored);
    Ok(new_version)
}

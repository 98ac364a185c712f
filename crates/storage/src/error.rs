/// All errors that can be returned by a [`Store`](crate::Store) or
/// [`Archive`](crate::Archive) implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// No record with the given instance id.
    #[error("{kind} not found: {instance_id}")]
    NotFound {
        kind: RecordKind,
        instance_id: String,
    },

    /// An insert found a record with this instance id already present.
    #[error("{kind} already exists: {instance_id}")]
    AlreadyExists {
        kind: RecordKind,
        instance_id: String,
    },

    /// Compare-and-set conflict: another writer updated the record since it
    /// was read. The expected version was not found.
    #[error(
        "concurrent conflict on {kind} {instance_id}: expected version {expected_version}, found {actual_version}"
    )]
    ConcurrentConflict {
        kind: RecordKind,
        instance_id: String,
        expected_version: u64,
        actual_version: u64,
    },

    /// A backend-specific error (I/O, serialization, poisoned lock, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Which collection a record lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Remedy,
    Mission,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Remedy => f.write_str("remedy"),
            RecordKind::Mission => f.write_str("mission"),
        }
    }
}

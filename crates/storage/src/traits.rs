use remedy_core::{ActiveMission, ActiveRemedy};

use crate::error::StorageError;
use crate::record::ArchiveEntry;

/// Durable key-value persistence for remedy and mission instances, keyed by
/// instance id.
///
/// The store is the single source of truth: every read is authoritative and
/// every successful write is visible to the next read. The engine keeps no
/// cache of its own.
///
/// ## Versioned writes
///
/// `put_remedy` and `put_mission` take an `expected_version`:
///
/// - `None` inserts a new record at version 0. Returns
///   `Err(StorageError::AlreadyExists)` if the id is taken.
/// - `Some(v)` replaces the record only if its stored version is `v`, and
///   stores it at version `v + 1`. Returns `Err(StorageError::NotFound)` if
///   the record does not exist and `Err(StorageError::ConcurrentConflict)`
///   if the stored version differs; neither mutates anything.
///
/// The returned value is the version now stored. The `version` field of the
/// record passed in is ignored; the store owns it.
///
/// This compare-and-set is what serialises two writers (for example a user
/// reporting a step result while the deadline monitor escalates the same
/// remedy): the second writer sees a conflict and must re-read.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync + 'static` so the scheduler task and
/// the host's entry points can share one instance.
pub trait Store: Send + Sync + 'static {
    // ── Remedies ─────────────────────────────────────────────────────────────

    /// Returns `Err(StorageError::NotFound)` if no such remedy exists.
    fn get_remedy(&self, instance_id: &str) -> Result<ActiveRemedy, StorageError>;

    fn put_remedy(
        &self,
        remedy: &ActiveRemedy,
        expected_version: Option<u64>,
    ) -> Result<u64, StorageError>;

    /// All remedies, ordered by instance id.
    fn list_remedies(&self) -> Result<Vec<ActiveRemedy>, StorageError>;

    // ── Missions ─────────────────────────────────────────────────────────────

    /// Returns `Err(StorageError::NotFound)` if no such mission exists.
    fn get_mission(&self, instance_id: &str) -> Result<ActiveMission, StorageError>;

    fn put_mission(
        &self,
        mission: &ActiveMission,
        expected_version: Option<u64>,
    ) -> Result<u64, StorageError>;

    /// All missions, ordered by instance id.
    fn list_missions(&self) -> Result<Vec<ActiveMission>, StorageError>;
}

/// Append-only audit log of closed remedies and missions.
///
/// Written once per terminal transition. The engine never reads it back.
pub trait Archive: Send + Sync + 'static {
    fn append(&self, entry: &ArchiveEntry) -> Result<(), StorageError>;
}

/// An archive that discards every entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullArchive;

impl Archive for NullArchive {
    fn append(&self, _entry: &ArchiveEntry) -> Result<(), StorageError> {
        Ok(())
    }
}

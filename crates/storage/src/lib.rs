//! Persistence seam of the remedy engine.
//!
//! The engine talks to storage only through [`Store`] (current state of
//! every instance, versioned writes) and [`Archive`] (append-only log of
//! closed instances). Two backends ship here: in-memory for tests and
//! embedding, and a JSON document on disk for the command-line host.

pub mod conformance;
mod error;
mod file;
mod memory;
mod record;
mod table;
mod traits;

pub use error::{RecordKind, StorageError};
pub use file::{FileStore, JsonlArchive};
pub use memory::{MemoryArchive, MemoryStore};
pub use record::ArchiveEntry;
pub use traits::{Archive, NullArchive, Store};

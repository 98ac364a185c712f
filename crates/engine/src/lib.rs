//! remedy-engine: the remedy state machine, the deadline monitor and the
//! mission orchestrator.
//!
//! The decision logic is pure ([`machine`], [`monitor`], [`orchestrator`]):
//! it takes catalog data, an instance and an instant, and returns the next
//! instance or a decision. [`Engine`] applies those results through a
//! [`remedy_storage::Store`], writing each instance back with the version it
//! read.
//!
//! # Public API
//!
//! - [`Engine::initiate_remedy`], [`Engine::report_step_result`],
//!   [`Engine::launch_mission`] -- user-facing entry points
//! - [`Engine::sweep_deadlines`], [`Engine::orchestrate`], [`Engine::tick`]
//!   -- evaluation passes, safe to repeat against unchanged state
//! - [`scheduler::spawn`] -- periodic driver (feature `scheduler`)

pub mod clock;
pub mod config;
pub mod documents;
mod engine;
pub mod error;
pub mod machine;
pub mod monitor;
pub mod orchestrator;
pub mod report;
#[cfg(feature = "scheduler")]
pub mod scheduler;
pub mod view;

#[cfg(test)]
mod fixtures;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use documents::{DocumentRequest, DocumentSink, NullDocuments, RecordingDocuments};
pub use engine::Engine;
pub use error::EngineError;
pub use report::{Change, Fault, PassReport};
pub use view::{HistoryView, MissionView, RemedyView, StepView};

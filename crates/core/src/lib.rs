//! remedy-core: data model and catalogs for the remedy orchestration engine.
//!
//! A *remedy* is one administrative process following a fixed step graph
//! ([`RemedyDefinition`]); a *mission* chains remedies toward one objective
//! ([`MissionPlaybook`]). This crate holds the immutable catalog data, the
//! mutable instance records ([`ActiveRemedy`], [`ActiveMission`]) and the
//! pure deadline calculator. It performs no I/O and never reads the clock.
//!
//! # Public API
//!
//! - [`compute_deadline()`] -- due instant for a count of calendar or business days
//! - [`Catalog`] -- remedy definition and mission playbook registries
//! - [`CatalogError`] -- structural (data-integrity) problems in catalog data

pub mod catalog;
pub mod deadline;
pub mod error;
pub mod mission;
pub mod remedy;

// ── Convenience re-exports ───────────────────────────────────────────

pub use catalog::{Catalog, BUILTIN_CATALOG};
pub use deadline::{compute_deadline, is_business_day, DeadlineUnit, MAX_DEADLINE_DAYS};
pub use error::CatalogError;
pub use mission::{
    ActiveMission, FailureTarget, MissionPlaybook, MissionStatus, MissionStep, MissionTarget,
    MissionTransitions, SuccessTarget,
};
pub use remedy::{
    ActiveRemedy, DeadlineSpec, HistoryEntry, NextStep, RemedyDefinition, RemedyStatus,
    RemedyStep, StepAction, StepResult, StepTarget,
};

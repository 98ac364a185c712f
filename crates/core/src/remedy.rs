//! Remedy definitions (immutable catalog data) and remedy instances.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::deadline::DeadlineUnit;

// ──────────────────────────────────────────────
// Definitions
// ──────────────────────────────────────────────

/// A remedy process: a directed graph of steps entered at the first step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemedyDefinition {
    pub id: String,
    pub name: String,
    /// Statutory or regulatory citation.
    pub authority: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_event: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub steps: Vec<RemedyStep>,
}

impl RemedyDefinition {
    /// The entry step. `None` only for a malformed, empty definition.
    pub fn first_step(&self) -> Option<&RemedyStep> {
        self.steps.first()
    }

    pub fn step(&self, step_id: &str) -> Option<&RemedyStep> {
        self.steps.iter().find(|s| s.id == step_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemedyStep {
    pub id: String,
    pub title: String,
    pub description: String,
    pub action: StepAction,
    pub next_step: NextStep,
}

impl RemedyStep {
    /// Target for the given result. `None` means the step declares no
    /// target for that result.
    pub fn target(&self, result: StepResult) -> Option<&StepTarget> {
        match result {
            StepResult::Success => Some(&self.next_step.on_success),
            StepResult::Failure => self.next_step.on_failure.as_ref(),
        }
    }

    pub fn awaits_response(&self) -> bool {
        matches!(self.action, StepAction::AwaitResponse { .. })
    }
}

/// What a step asks of the outside world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepAction {
    /// An external actor drafts and dispatches correspondence.
    GenerateDocument { template_id: String },
    /// Waiting on the other party until a computable due instant.
    AwaitResponse { deadline: DeadlineSpec },
    /// A manual, checkbox-style step.
    UserAction { description: String },
}

impl StepAction {
    pub fn kind(&self) -> &'static str {
        match self {
            StepAction::GenerateDocument { .. } => "generate_document",
            StepAction::AwaitResponse { .. } => "await_response",
            StepAction::UserAction { .. } => "user_action",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlineSpec {
    pub count: u32,
    pub unit: DeadlineUnit,
}

/// Outgoing transitions of a step.
///
/// `on_failure` may be omitted. An awaiting step without a failure target
/// is never escalated by the deadline monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextStep {
    pub on_success: StepTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_failure: Option<StepTarget>,
}

/// Where a transition leads: another step in the same definition, or the
/// end of the remedy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepTarget {
    Step(String),
    Terminal,
}

impl StepTarget {
    pub fn step_id(&self) -> Option<&str> {
        match self {
            StepTarget::Step(id) => Some(id),
            StepTarget::Terminal => None,
        }
    }
}

// ──────────────────────────────────────────────
// Instances
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemedyStatus {
    InProgress,
    AwaitingResponse,
    Escalated,
    ClosedSuccess,
    ClosedFailure,
}

impl RemedyStatus {
    pub fn is_closed(self) -> bool {
        matches!(self, RemedyStatus::ClosedSuccess | RemedyStatus::ClosedFailure)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RemedyStatus::InProgress => "IN_PROGRESS",
            RemedyStatus::AwaitingResponse => "AWAITING_RESPONSE",
            RemedyStatus::Escalated => "ESCALATED",
            RemedyStatus::ClosedSuccess => "CLOSED_SUCCESS",
            RemedyStatus::ClosedFailure => "CLOSED_FAILURE",
        }
    }
}

impl fmt::Display for RemedyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Outcome reported for a step, by a user or by deadline expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepResult {
    Success,
    Failure,
}

impl StepResult {
    pub fn as_str(self) -> &'static str {
        match self {
            StepResult::Success => "success",
            StepResult::Failure => "failure",
        }
    }
}

impl fmt::Display for StepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for StepResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "success" => Ok(StepResult::Success),
            "failure" => Ok(StepResult::Failure),
            other => Err(format!(
                "unknown step result '{}': expected 'success' or 'failure'",
                other
            )),
        }
    }
}

/// One completed step, in completion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub step_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub completed_at: OffsetDateTime,
    pub result: StepResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A running (or concluded) remedy process.
///
/// `deadline` is `Some` exactly when `status` is `AwaitingResponse`, and
/// `closed_at` is `Some` exactly when the status is closed. `history` is
/// append-only. `version` is owned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveRemedy {
    pub instance_id: String,
    pub remedy_definition_id: String,
    pub current_step_id: String,
    pub status: RemedyStatus,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub deadline: Option<OffsetDateTime>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub closed_at: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission_instance_id: Option<String>,
    #[serde(default)]
    pub version: u64,
}

impl ActiveRemedy {
    pub fn is_closed(&self) -> bool {
        self.status.is_closed()
    }

    /// True when awaiting a response whose deadline is at or before `now`.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.status == RemedyStatus::AwaitingResponse
            && self.deadline.is_some_and(|deadline| deadline <= now)
    }
}

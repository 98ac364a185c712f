//! Mission playbooks (immutable catalog data) and mission instances.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::remedy::RemedyStatus;

/// An ordered chain of remedies pursued toward one objective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionPlaybook {
    pub id: String,
    pub name: String,
    pub objective: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub steps: Vec<MissionStep>,
}

impl MissionPlaybook {
    pub fn step(&self, order: u32) -> Option<&MissionStep> {
        self.steps.iter().find(|s| s.order == order)
    }

    /// The step with the lowest order, where every mission starts.
    pub fn first_step(&self) -> Option<&MissionStep> {
        self.steps.iter().min_by_key(|s| s.order)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionStep {
    pub order: u32,
    pub title: String,
    pub remedy_definition_id: String,
    pub transitions: MissionTransitions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionTransitions {
    pub on_success: SuccessTarget,
    pub on_failure: FailureTarget,
}

impl MissionTransitions {
    /// Resolve the transition for a concluded remedy.
    pub fn resolve(&self, remedy_status: RemedyStatus) -> Option<MissionTarget> {
        match remedy_status {
            RemedyStatus::ClosedSuccess => Some(match self.on_success {
                SuccessTarget::Order(order) => MissionTarget::Order(order),
                SuccessTarget::Complete => MissionTarget::Complete,
            }),
            RemedyStatus::ClosedFailure => Some(match self.on_failure {
                FailureTarget::Order(order) => MissionTarget::Order(order),
                FailureTarget::Fail => MissionTarget::Fail,
            }),
            _ => None,
        }
    }

    /// Orders this step can lead to.
    pub fn orders(&self) -> impl Iterator<Item = u32> {
        let success = match self.on_success {
            SuccessTarget::Order(order) => Some(order),
            SuccessTarget::Complete => None,
        };
        let failure = match self.on_failure {
            FailureTarget::Order(order) => Some(order),
            FailureTarget::Fail => None,
        };
        success.into_iter().chain(failure)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuccessTarget {
    Order(u32),
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureTarget {
    Order(u32),
    Fail,
}

/// A resolved mission transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionTarget {
    Order(u32),
    Complete,
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissionStatus {
    InProgress,
    Completed,
    Failed,
}

impl MissionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, MissionStatus::InProgress)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MissionStatus::InProgress => "IN_PROGRESS",
            MissionStatus::Completed => "COMPLETED",
            MissionStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A running (or concluded) mission.
///
/// While in progress, `current_step_order` never decreases and
/// `active_remedy_instance_id` is `None` only between a remedy concluding
/// and the next one being instantiated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveMission {
    pub instance_id: String,
    pub playbook_id: String,
    pub status: MissionStatus,
    pub current_step_order: u32,
    #[serde(default)]
    pub active_remedy_instance_id: Option<String>,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    /// Every remedy instantiated for this mission, oldest first.
    #[serde(default)]
    pub remedy_instance_ids: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub concluded_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub version: u64,
}

impl ActiveMission {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transitions(on_success: SuccessTarget, on_failure: FailureTarget) -> MissionTransitions {
        MissionTransitions {
            on_success,
            on_failure,
        }
    }

    #[test]
    fn resolve_follows_remedy_outcome() {
        let t = transitions(SuccessTarget::Complete, FailureTarget::Order(2));
        assert_eq!(
            t.resolve(RemedyStatus::ClosedSuccess),
            Some(MissionTarget::Complete)
        );
        assert_eq!(
            t.resolve(RemedyStatus::ClosedFailure),
            Some(MissionTarget::Order(2))
        );
        assert_eq!(t.resolve(RemedyStatus::AwaitingResponse), None);
        assert_eq!(t.resolve(RemedyStatus::Escalated), None);
    }

    #[test]
    fn transition_json_shape() {
        let t: MissionTransitions = serde_json::from_value(serde_json::json!({
            "on_success": "complete",
            "on_failure": { "order": 2 }
        }))
        .unwrap();
        assert_eq!(t, transitions(SuccessTarget::Complete, FailureTarget::Order(2)));
        assert_eq!(t.orders().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn first_step_is_lowest_order() {
        let step = |order| MissionStep {
            order,
            title: format!("step {}", order),
            remedy_definition_id: "D".to_string(),
            transitions: transitions(SuccessTarget::Complete, FailureTarget::Fail),
        };
        let playbook = MissionPlaybook {
            id: "P".to_string(),
            name: "Playbook".to_string(),
            objective: "test".to_string(),
            tags: vec![],
            steps: vec![step(5), step(2), step(9)],
        };
        assert_eq!(playbook.first_step().map(|s| s.order), Some(2));
        assert!(playbook.step(9).is_some());
        assert!(playbook.step(3).is_none());
    }
}

//! Read-only projections for a management surface.

use std::collections::BTreeMap;

use serde::Serialize;
use time::OffsetDateTime;

use remedy_core::{
    ActiveMission, ActiveRemedy, MissionPlaybook, MissionStatus, RemedyDefinition, RemedyStatus,
    StepAction, StepResult,
};

use crate::error::EngineError;
use crate::machine;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemedyView {
    pub instance_id: String,
    pub definition_id: String,
    pub name: String,
    pub authority: String,
    pub status: RemedyStatus,
    pub current_step: StepView,
    #[serde(with = "time::serde::rfc3339::option")]
    pub deadline: Option<OffsetDateTime>,
    /// Whole days until the deadline; negative once it has passed.
    pub days_remaining: Option<i64>,
    pub history: Vec<HistoryView>,
    pub variables: BTreeMap<String, String>,
    /// Results the current step can take. Empty once closed.
    pub accepts: Vec<StepResult>,
    pub mission_instance_id: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub closed_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub action: StepAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryView {
    pub step_id: String,
    /// `None` if the definition no longer has the step.
    pub step_title: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub completed_at: OffsetDateTime,
    pub result: StepResult,
    pub notes: Option<String>,
}

impl RemedyView {
    pub fn build(
        definition: &RemedyDefinition,
        remedy: &ActiveRemedy,
        now: OffsetDateTime,
    ) -> Result<Self, EngineError> {
        let step = machine::current_step(definition, remedy)?;
        let accepts = if remedy.is_closed() {
            Vec::new()
        } else {
            [StepResult::Success, StepResult::Failure]
                .into_iter()
                .filter(|result| step.target(*result).is_some())
                .collect()
        };
        let history = remedy
            .history
            .iter()
            .map(|entry| HistoryView {
                step_id: entry.step_id.clone(),
                step_title: definition.step(&entry.step_id).map(|s| s.title.clone()),
                completed_at: entry.completed_at,
                result: entry.result,
                notes: entry.notes.clone(),
            })
            .collect();

        Ok(RemedyView {
            instance_id: remedy.instance_id.clone(),
            definition_id: definition.id.clone(),
            name: definition.name.clone(),
            authority: definition.authority.clone(),
            status: remedy.status,
            current_step: StepView {
                id: step.id.clone(),
                title: step.title.clone(),
                description: step.description.clone(),
                action: step.action.clone(),
            },
            deadline: remedy.deadline,
            days_remaining: remedy.deadline.map(|d| (d - now).whole_days()),
            history,
            variables: remedy.variables.clone(),
            accepts,
            mission_instance_id: remedy.mission_instance_id.clone(),
            started_at: remedy.started_at,
            closed_at: remedy.closed_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissionView {
    pub instance_id: String,
    pub playbook_id: String,
    pub name: String,
    pub objective: String,
    pub status: MissionStatus,
    pub current_step_order: u32,
    pub current_step_title: Option<String>,
    pub active_remedy_instance_id: Option<String>,
    pub remedy_instance_ids: Vec<String>,
    pub variables: BTreeMap<String, String>,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub concluded_at: Option<OffsetDateTime>,
}

impl MissionView {
    pub fn build(playbook: &MissionPlaybook, mission: &ActiveMission) -> Self {
        MissionView {
            instance_id: mission.instance_id.clone(),
            playbook_id: playbook.id.clone(),
            name: playbook.name.clone(),
            objective: playbook.objective.clone(),
            status: mission.status,
            current_step_order: mission.current_step_order,
            current_step_title: playbook
                .step(mission.current_step_order)
                .map(|s| s.title.clone()),
            active_remedy_instance_id: mission.active_remedy_instance_id.clone(),
            remedy_instance_ids: mission.remedy_instance_ids.clone(),
            variables: mission.variables.clone(),
            started_at: mission.started_at,
            concluded_at: mission.concluded_at,
        }
    }
}

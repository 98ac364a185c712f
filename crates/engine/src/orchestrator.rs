//! Mission orchestrator: decides the next move for one mission.
//!
//! Deciding and applying are split. [`decide`] looks at a mission, its
//! playbook and its active remedy and names a single step; the engine
//! performs it against the store. Starting the next remedy takes two
//! decisions: first the mission advances (dropping the concluded remedy),
//! then a later evaluation sees no active remedy and starts one.

use remedy_core::{ActiveMission, ActiveRemedy, MissionPlaybook, MissionStatus, MissionTarget};

use crate::error::EngineError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Concluded mission, or its remedy is still running.
    Idle,
    /// No active remedy: instantiate one for the current step.
    StartRemedy { order: u32, definition_id: String },
    /// The active remedy closed and the playbook names another step.
    Advance { from: u32, to: u32 },
    /// The active remedy closed and the playbook ends the mission.
    Conclude(MissionStatus),
}

/// Decide what to do with `mission`.
///
/// `remedy` is the record behind `mission.active_remedy_instance_id`, or
/// `None` when the mission has no active remedy or the record is missing.
/// A missing record is an integrity error; the mission is never handed a
/// replacement remedy for it.
pub fn decide(
    playbook: &MissionPlaybook,
    mission: &ActiveMission,
    remedy: Option<&ActiveRemedy>,
) -> Result<Decision, EngineError> {
    if mission.is_terminal() {
        return Ok(Decision::Idle);
    }
    let step = playbook
        .step(mission.current_step_order)
        .ok_or_else(|| EngineError::UnknownMissionStep {
            playbook_id: playbook.id.clone(),
            order: mission.current_step_order,
        })?;

    let remedy = match (&mission.active_remedy_instance_id, remedy) {
        (None, _) => {
            return Ok(Decision::StartRemedy {
                order: step.order,
                definition_id: step.remedy_definition_id.clone(),
            })
        }
        (Some(remedy_instance_id), None) => {
            return Err(EngineError::MissingRemedy {
                mission_instance_id: mission.instance_id.clone(),
                remedy_instance_id: remedy_instance_id.clone(),
            })
        }
        (Some(_), Some(remedy)) => remedy,
    };

    let Some(target) = step.transitions.resolve(remedy.status) else {
        return Ok(Decision::Idle);
    };
    match target {
        MissionTarget::Complete => Ok(Decision::Conclude(MissionStatus::Completed)),
        MissionTarget::Fail => Ok(Decision::Conclude(MissionStatus::Failed)),
        MissionTarget::Order(to) => {
            if to <= step.order {
                return Err(EngineError::BackwardTransition {
                    playbook_id: playbook.id.clone(),
                    from: step.order,
                    to,
                });
            }
            if playbook.step(to).is_none() {
                return Err(EngineError::UnknownMissionStep {
                    playbook_id: playbook.id.clone(),
                    order: to,
                });
            }
            Ok(Decision::Advance {
                from: step.order,
                to,
            })
        }
    }
}

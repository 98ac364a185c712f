//! Remedy state machine.
//!
//! Pure transitions over one [`ActiveRemedy`]. Every lookup happens before
//! anything is modified, and the input is never mutated: callers get a new
//! value to write back, or an error and the original untouched.

use std::collections::BTreeMap;

use time::OffsetDateTime;

use remedy_core::{
    compute_deadline, ActiveRemedy, HistoryEntry, RemedyDefinition, RemedyStatus, RemedyStep,
    StepAction, StepResult, StepTarget,
};

use crate::error::EngineError;

/// A new remedy positioned on the definition's first step.
pub fn instantiate(
    definition: &RemedyDefinition,
    instance_id: String,
    variables: BTreeMap<String, String>,
    mission_instance_id: Option<String>,
    now: OffsetDateTime,
) -> Result<ActiveRemedy, EngineError> {
    let first = definition
        .first_step()
        .ok_or_else(|| EngineError::EmptyDefinition {
            definition_id: definition.id.clone(),
        })?;

    let mut remedy = ActiveRemedy {
        instance_id,
        remedy_definition_id: definition.id.clone(),
        current_step_id: String::new(),
        status: RemedyStatus::InProgress,
        deadline: None,
        history: Vec::new(),
        variables,
        started_at: now,
        closed_at: None,
        mission_instance_id,
        version: 0,
    };
    enter_step(&mut remedy, first, now);
    Ok(remedy)
}

/// Complete the current step with `result` and move along its transition.
///
/// Appends one history entry. A terminal target closes the remedy; otherwise
/// the remedy enters the target step, picking up a fresh deadline when that
/// step awaits a response.
pub fn advance(
    definition: &RemedyDefinition,
    remedy: &ActiveRemedy,
    result: StepResult,
    notes: Option<String>,
    now: OffsetDateTime,
) -> Result<ActiveRemedy, EngineError> {
    if remedy.is_closed() {
        return Err(EngineError::RemedyClosed {
            instance_id: remedy.instance_id.clone(),
            status: remedy.status,
        });
    }
    let step = current_step(definition, remedy)?;
    let target = step
        .target(result)
        .ok_or_else(|| EngineError::NoTransition {
            instance_id: remedy.instance_id.clone(),
            step_id: step.id.clone(),
            result,
        })?;
    let next = match target {
        StepTarget::Step(step_id) => {
            Some(
                definition
                    .step(step_id)
                    .ok_or_else(|| EngineError::UnknownStep {
                        definition_id: definition.id.clone(),
                        step_id: step_id.clone(),
                    })?,
            )
        }
        StepTarget::Terminal => None,
    };

    let mut advanced = remedy.clone();
    advanced.history.push(HistoryEntry {
        step_id: step.id.clone(),
        completed_at: now,
        result,
        notes,
    });
    match next {
        Some(next) => enter_step(&mut advanced, next, now),
        None => {
            advanced.status = match result {
                StepResult::Success => RemedyStatus::ClosedSuccess,
                StepResult::Failure => RemedyStatus::ClosedFailure,
            };
            advanced.deadline = None;
            advanced.closed_at = Some(now);
        }
    }
    Ok(advanced)
}

/// Abandon an open remedy. Closes it as a failure without touching history.
pub fn cancel(remedy: &ActiveRemedy, now: OffsetDateTime) -> Result<ActiveRemedy, EngineError> {
    if remedy.is_closed() {
        return Err(EngineError::RemedyClosed {
            instance_id: remedy.instance_id.clone(),
            status: remedy.status,
        });
    }
    let mut cancelled = remedy.clone();
    cancelled.status = RemedyStatus::ClosedFailure;
    cancelled.deadline = None;
    cancelled.closed_at = Some(now);
    Ok(cancelled)
}

pub(crate) fn current_step<'d>(
    definition: &'d RemedyDefinition,
    remedy: &ActiveRemedy,
) -> Result<&'d RemedyStep, EngineError> {
    definition
        .step(&remedy.current_step_id)
        .ok_or_else(|| EngineError::UnknownStep {
            definition_id: definition.id.clone(),
            step_id: remedy.current_step_id.clone(),
        })
}

fn enter_step(remedy: &mut ActiveRemedy, step: &RemedyStep, now: OffsetDateTime) {
    remedy.current_step_id = step.id.clone();
    match &step.action {
        StepAction::AwaitResponse { deadline } => {
            remedy.status = RemedyStatus::AwaitingResponse;
            remedy.deadline = Some(compute_deadline(now, deadline.count, deadline.unit));
        }
        StepAction::GenerateDocument { .. } | StepAction::UserAction { .. } => {
            remedy.status = RemedyStatus::InProgress;
            remedy.deadline = None;
        }
    }
}

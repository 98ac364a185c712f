//! Deadline monitor: turns an expired response deadline into a failure.

use time::OffsetDateTime;

use remedy_core::{ActiveRemedy, RemedyDefinition, RemedyStatus, StepResult};

use crate::error::EngineError;
use crate::machine;

/// History note recorded on a deadline-driven failure.
pub const DEADLINE_NOTE: &str = "Deadline passed (constructive denial).";

/// What the monitor decided for one remedy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Escalation {
    /// Not awaiting a response, or the deadline is still ahead.
    NotDue,
    /// Expired, but the step has no failure target. The remedy keeps
    /// waiting until someone reports a result.
    NoFailureTarget,
    /// The failure transition, ready to be written back.
    Escalated(ActiveRemedy),
}

/// Evaluate one remedy against `now`.
///
/// An expired remedy is advanced with `failure`. If that lands on a step
/// that does not itself await a response, the new status is `ESCALATED`
/// instead of `IN_PROGRESS`; a new awaiting step keeps `AWAITING_RESPONSE`
/// with its own deadline, and a terminal failure target closes the remedy.
/// The advanced remedy has either no deadline or a later one, so a second
/// evaluation at the same `now` is `NotDue`.
pub fn escalate(
    definition: &RemedyDefinition,
    remedy: &ActiveRemedy,
    now: OffsetDateTime,
) -> Result<Escalation, EngineError> {
    if !remedy.is_expired(now) {
        return Ok(Escalation::NotDue);
    }
    let step = machine::current_step(definition, remedy)?;
    if step.target(StepResult::Failure).is_none() {
        return Ok(Escalation::NoFailureTarget);
    }

    let mut escalated = machine::advance(
        definition,
        remedy,
        StepResult::Failure,
        Some(DEADLINE_NOTE.to_string()),
        now,
    )?;
    if escalated.status == RemedyStatus::InProgress {
        escalated.status = RemedyStatus::Escalated;
    }
    Ok(Escalation::Escalated(escalated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::definition;
    use std::collections::BTreeMap;
    use time::macros::datetime;
    use time::Duration;

    const FRIDAY: OffsetDateTime = datetime!(2025-03-07 10:00 UTC);

    fn start(definition_id: &str) -> ActiveRemedy {
        machine::instantiate(
            &definition(definition_id),
            "r-1".to_string(),
            BTreeMap::new(),
            None,
            FRIDAY,
        )
        .unwrap()
    }

    fn escalated(outcome: Escalation) -> ActiveRemedy {
        match outcome {
            Escalation::Escalated(remedy) => remedy,
            other => panic!("expected escalation, got {:?}", other),
        }
    }

    #[test]
    fn expired_await_moves_to_escalated_user_step() {
        let d = definition("D");
        let remedy = start("D");
        let after = datetime!(2025-04-05 08:00 UTC);

        let next = escalated(escalate(&d, &remedy, after).unwrap());
        assert_eq!(next.current_step_id, "b");
        assert_eq!(next.status, RemedyStatus::Escalated);
        assert_eq!(next.deadline, None);
        assert_eq!(next.history.len(), 1);
        assert_eq!(next.history[0].step_id, "a");
        assert_eq!(next.history[0].result, StepResult::Failure);
        assert_eq!(next.history[0].notes.as_deref(), Some(DEADLINE_NOTE));
    }

    #[test]
    fn deadline_is_inclusive() {
        let d = definition("D");
        let remedy = start("D");
        let due = remedy.deadline.unwrap();
        assert_eq!(
            escalate(&d, &remedy, due - Duration::seconds(1)).unwrap(),
            Escalation::NotDue
        );
        assert!(matches!(
            escalate(&d, &remedy, due).unwrap(),
            Escalation::Escalated(_)
        ));
    }

    #[test]
    fn escalation_is_idempotent() {
        let d = definition("D");
        let remedy = start("D");
        let after = datetime!(2025-05-01 00:00 UTC);
        let once = escalated(escalate(&d, &remedy, after).unwrap());
        assert_eq!(escalate(&d, &once, after).unwrap(), Escalation::NotDue);
    }

    #[test]
    fn escalation_into_await_step_keeps_waiting_with_new_deadline() {
        let g = definition("G");
        let draft = start("G");
        let waiting = machine::advance(&g, &draft, StepResult::Success, None, FRIDAY).unwrap();
        let due = waiting.deadline.unwrap();

        let appeal = escalated(escalate(&g, &waiting, due).unwrap());
        assert_eq!(appeal.current_step_id, "appeal");
        assert_eq!(appeal.status, RemedyStatus::AwaitingResponse);
        assert!(appeal.deadline.unwrap() > due);
        assert_eq!(escalate(&g, &appeal, due).unwrap(), Escalation::NotDue);
    }

    #[test]
    fn terminal_failure_target_closes_remedy() {
        let g = definition("G");
        let draft = start("G");
        let waiting = machine::advance(&g, &draft, StepResult::Success, None, FRIDAY).unwrap();
        let appeal = escalated(escalate(&g, &waiting, waiting.deadline.unwrap()).unwrap());

        let closed = escalated(escalate(&g, &appeal, appeal.deadline.unwrap()).unwrap());
        assert_eq!(closed.status, RemedyStatus::ClosedFailure);
        assert_eq!(closed.deadline, None);
        assert!(closed.closed_at.is_some());
    }

    #[test]
    fn missing_failure_target_keeps_waiting() {
        let w = definition("W");
        let remedy = start("W");
        let after = datetime!(2026-01-01 00:00 UTC);
        assert_eq!(
            escalate(&w, &remedy, after).unwrap(),
            Escalation::NoFailureTarget
        );
    }

    #[test]
    fn only_awaiting_remedies_are_considered() {
        let g = definition("G");
        let remedy = start("G");
        let far = datetime!(2030-01-01 00:00 UTC);
        assert_eq!(escalate(&g, &remedy, far).unwrap(), Escalation::NotDue);
    }

    #[test]
    fn unknown_step_is_integrity_error() {
        let d = definition("D");
        let mut remedy = start("D");
        remedy.current_step_id = "gone".to_string();
        let err = escalate(&d, &remedy, datetime!(2030-01-01 00:00 UTC)).unwrap_err();
        assert!(err.is_integrity());
    }
}

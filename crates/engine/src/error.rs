use remedy_core::{MissionStatus, RemedyStatus, StepResult};
use remedy_storage::StorageError;

/// Errors surfaced by engine entry points and recorded as per-instance
/// faults during evaluation passes.
///
/// Every error is raised before the instance it concerns is written, so the
/// stored state is left exactly as it was read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("unknown remedy definition '{definition_id}'")]
    UnknownDefinition { definition_id: String },

    #[error("unknown mission playbook '{playbook_id}'")]
    UnknownPlaybook { playbook_id: String },

    #[error("remedy definition '{definition_id}' has no step '{step_id}'")]
    UnknownStep {
        definition_id: String,
        step_id: String,
    },

    #[error("remedy definition '{definition_id}' has no steps")]
    EmptyDefinition { definition_id: String },

    #[error("mission playbook '{playbook_id}' has no steps")]
    EmptyPlaybook { playbook_id: String },

    #[error("mission playbook '{playbook_id}' has no step with order {order}")]
    UnknownMissionStep { playbook_id: String, order: u32 },

    #[error("mission playbook '{playbook_id}': step {from} transitions backwards to order {to}")]
    BackwardTransition {
        playbook_id: String,
        from: u32,
        to: u32,
    },

    #[error("mission '{mission_instance_id}' references missing remedy '{remedy_instance_id}'")]
    MissingRemedy {
        mission_instance_id: String,
        remedy_instance_id: String,
    },

    /// The current step declares no target for the reported result.
    #[error("remedy '{instance_id}': step '{step_id}' has no transition on {result}")]
    NoTransition {
        instance_id: String,
        step_id: String,
        result: StepResult,
    },

    #[error("remedy '{instance_id}' is already closed ({status})")]
    RemedyClosed {
        instance_id: String,
        status: RemedyStatus,
    },

    #[error("mission '{instance_id}' has already concluded ({status})")]
    MissionClosed {
        instance_id: String,
        status: MissionStatus,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl EngineError {
    /// True for malformed catalog data or dangling references between
    /// instances. These are never fixed by retrying.
    pub fn is_integrity(&self) -> bool {
        matches!(
            self,
            EngineError::UnknownDefinition { .. }
                | EngineError::UnknownPlaybook { .. }
                | EngineError::UnknownStep { .. }
                | EngineError::EmptyDefinition { .. }
                | EngineError::EmptyPlaybook { .. }
                | EngineError::UnknownMissionStep { .. }
                | EngineError::BackwardTransition { .. }
                | EngineError::MissingRemedy { .. }
        )
    }

    /// True when another writer updated the instance between read and write.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            EngineError::Storage(StorageError::ConcurrentConflict { .. })
        )
    }
}

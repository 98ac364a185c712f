/// Structural problems in catalog data.
///
/// These are data-integrity errors: they are detected before any remedy or
/// mission is touched, and a catalog carrying them should not be handed to
/// the engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// The catalog document is not valid JSON or does not match the format.
    #[error("catalog parse error: {message}")]
    Parse { message: String },

    #[error("remedy definition '{definition_id}' is declared more than once")]
    DuplicateDefinition { definition_id: String },

    #[error("remedy definition '{definition_id}' has no steps")]
    EmptyDefinition { definition_id: String },

    #[error("remedy definition '{definition_id}' declares step '{step_id}' more than once")]
    DuplicateStep {
        definition_id: String,
        step_id: String,
    },

    #[error(
        "remedy definition '{definition_id}': step '{step_id}' references undeclared step '{target}'"
    )]
    DanglingStepRef {
        definition_id: String,
        step_id: String,
        target: String,
    },

    #[error("remedy definition '{definition_id}': step '{step_id}' is unreachable from the first step")]
    UnreachableStep {
        definition_id: String,
        step_id: String,
    },

    #[error("remedy definition '{definition_id}': step graph is not acyclic: cycle detected involving steps [{}]", .steps.join(", "))]
    StepCycle {
        definition_id: String,
        steps: Vec<String>,
    },

    #[error(
        "remedy definition '{definition_id}': step '{step_id}' awaits {count} days, more than the limit of {max}"
    )]
    DeadlineOutOfRange {
        definition_id: String,
        step_id: String,
        count: u32,
        max: u32,
    },

    #[error("mission playbook '{playbook_id}' is declared more than once")]
    DuplicatePlaybook { playbook_id: String },

    #[error("mission playbook '{playbook_id}' has no steps")]
    EmptyPlaybook { playbook_id: String },

    #[error("mission playbook '{playbook_id}' declares order {order} more than once")]
    DuplicateOrder { playbook_id: String, order: u32 },

    #[error("mission playbook '{playbook_id}': step {order} transitions to undeclared order {target}")]
    UnknownOrder {
        playbook_id: String,
        order: u32,
        target: u32,
    },

    #[error(
        "mission playbook '{playbook_id}': step {order} transitions backwards to order {target}"
    )]
    BackwardTransition {
        playbook_id: String,
        order: u32,
        target: u32,
    },

    #[error("mission playbook '{playbook_id}': step {order} is unreachable from the first step")]
    UnreachableMissionStep { playbook_id: String, order: u32 },

    #[error(
        "mission playbook '{playbook_id}': step {order} references unknown remedy definition '{definition_id}'"
    )]
    UnknownRemedyDefinition {
        playbook_id: String,
        order: u32,
        definition_id: String,
    },

    /// Aggregate returned by [`Catalog::load`](crate::Catalog::load).
    #[error("catalog is invalid: {} problem(s), first: {}", .problems.len(), .problems.first().map(ToString::to_string).unwrap_or_default())]
    Invalid { problems: Vec<CatalogError> },
}

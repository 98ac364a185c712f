//! What an evaluation pass did.

use serde::Serialize;

use remedy_core::{MissionStatus, RemedyStatus};
use remedy_storage::RecordKind;

use crate::error::EngineError;

/// One state change applied by a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum Change {
    /// A response deadline lapsed and the remedy took its failure path.
    Escalated {
        remedy_instance_id: String,
        from_step: String,
        to_step: String,
        status: RemedyStatus,
    },
    RemedyStarted {
        mission_instance_id: String,
        remedy_instance_id: String,
        definition_id: String,
        order: u32,
    },
    MissionAdvanced {
        mission_instance_id: String,
        from_order: u32,
        to_order: u32,
    },
    MissionConcluded {
        mission_instance_id: String,
        status: MissionStatus,
    },
}

/// An instance the pass skipped because evaluating it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fault {
    pub kind: RecordKind,
    pub instance_id: String,
    pub message: String,
    /// Malformed data rather than a transient store problem.
    pub integrity: bool,
}

impl Fault {
    pub(crate) fn new(kind: RecordKind, instance_id: &str, error: &EngineError) -> Self {
        Fault {
            kind,
            instance_id: instance_id.to_string(),
            message: error.to_string(),
            integrity: error.is_integrity(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub changes: Vec<Change>,
    pub faults: Vec<Fault>,
}

impl PassReport {
    /// Nothing changed and nothing failed.
    pub fn is_quiet(&self) -> bool {
        self.changes.is_empty() && self.faults.is_empty()
    }

    /// Append `other`. An instance already faulted in this report is not
    /// reported again.
    pub fn merge(&mut self, other: PassReport) {
        self.changes.extend(other.changes);
        for fault in other.faults {
            let seen = self
                .faults
                .iter()
                .any(|f| f.kind == fault.kind && f.instance_id == fault.instance_id);
            if !seen {
                self.faults.push(fault);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fault(kind: RecordKind, instance_id: &str) -> Fault {
        Fault::new(
            kind,
            instance_id,
            &EngineError::UnknownPlaybook {
                playbook_id: "RETIRED".to_string(),
            },
        )
    }

    #[test]
    fn merge_reports_each_faulted_instance_once() {
        let mut report = PassReport {
            changes: vec![],
            faults: vec![fault(RecordKind::Mission, "m-1")],
        };
        report.merge(PassReport {
            changes: vec![Change::MissionAdvanced {
                mission_instance_id: "m-2".to_string(),
                from_order: 1,
                to_order: 2,
            }],
            faults: vec![
                fault(RecordKind::Mission, "m-1"),
                fault(RecordKind::Remedy, "m-1"),
            ],
        });
        assert_eq!(report.changes.len(), 1);
        assert_eq!(report.faults.len(), 2);
        assert_eq!(report.faults[1].kind, RecordKind::Remedy);
    }
}

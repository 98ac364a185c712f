use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use remedy_core::{ActiveMission, ActiveRemedy};

use crate::error::RecordKind;

/// An audit record written once when a remedy or mission reaches a
/// terminal status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    pub kind: RecordKind,
    pub instance_id: String,
    /// Remedy definition id or mission playbook id.
    pub definition_id: String,
    /// Final status, e.g. `CLOSED_SUCCESS` or `FAILED`.
    pub status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub closed_at: OffsetDateTime,
    /// Full JSON snapshot of the closed instance.
    pub snapshot: serde_json::Value,
}

impl ArchiveEntry {
    pub fn for_remedy(remedy: &ActiveRemedy, closed_at: OffsetDateTime) -> Self {
        ArchiveEntry {
            kind: RecordKind::Remedy,
            instance_id: remedy.instance_id.clone(),
            definition_id: remedy.remedy_definition_id.clone(),
            status: remedy.status.to_string(),
            closed_at,
            snapshot: serde_json::to_value(remedy).unwrap_or(serde_json::Value::Null),
        }
    }

    pub fn for_mission(mission: &ActiveMission, closed_at: OffsetDateTime) -> Self {
        ArchiveEntry {
            kind: RecordKind::Mission,
            instance_id: mission.instance_id.clone(),
            definition_id: mission.playbook_id.clone(),
            status: mission.status.to_string(),
            closed_at,
            snapshot: serde_json::to_value(mission).unwrap_or(serde_json::Value::Null),
        }
    }
}

//! Remedy definition and mission playbook registries.
//!
//! A [`Catalog`] is read-only once built. The engine shares one behind an
//! `Arc` and looks definitions up by id on every evaluation; it never
//! caches instances derived from it.

mod validate;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::mission::MissionPlaybook;
use crate::remedy::RemedyDefinition;

/// The catalog compiled into the crate.
pub static BUILTIN_CATALOG: &str = include_str!("builtin.json");

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    remedies: Vec<RemedyDefinition>,
    #[serde(default)]
    playbooks: Vec<MissionPlaybook>,
}

impl Catalog {
    pub fn new(remedies: Vec<RemedyDefinition>, playbooks: Vec<MissionPlaybook>) -> Self {
        Catalog {
            remedies,
            playbooks,
        }
    }

    /// Parse a catalog document without validating its structure.
    pub fn from_json(source: &str) -> Result<Self, CatalogError> {
        serde_json::from_str(source).map_err(|e| CatalogError::Parse {
            message: e.to_string(),
        })
    }

    /// Parse and validate a catalog document.
    pub fn load(source: &str) -> Result<Self, CatalogError> {
        let catalog = Catalog::from_json(source)?;
        let problems = catalog.validate();
        if problems.is_empty() {
            Ok(catalog)
        } else {
            Err(CatalogError::Invalid { problems })
        }
    }

    /// The built-in administrative remedies and missions.
    pub fn builtin() -> Result<Self, CatalogError> {
        Catalog::load(BUILTIN_CATALOG)
    }

    /// Every structural problem in the catalog; empty when it is sound.
    pub fn validate(&self) -> Vec<CatalogError> {
        let mut problems = Vec::new();
        validate::check_unique_ids(self, &mut problems);
        for definition in &self.remedies {
            validate::check_definition(definition, &mut problems);
        }
        for playbook in &self.playbooks {
            validate::check_playbook(playbook, self, &mut problems);
        }
        problems
    }

    pub fn remedy(&self, definition_id: &str) -> Option<&RemedyDefinition> {
        self.remedies.iter().find(|d| d.id == definition_id)
    }

    pub fn playbook(&self, playbook_id: &str) -> Option<&MissionPlaybook> {
        self.playbooks.iter().find(|p| p.id == playbook_id)
    }

    pub fn remedies(&self) -> &[RemedyDefinition] {
        &self.remedies
    }

    pub fn playbooks(&self) -> &[MissionPlaybook] {
        &self.playbooks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remedy::{StepAction, StepTarget};

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.remedies().len(), 6);
        assert_eq!(catalog.playbooks().len(), 2);
        assert!(catalog.validate().is_empty());
    }

    #[test]
    fn builtin_foia_request_awaits_twenty_business_days() {
        let catalog = Catalog::builtin().unwrap();
        let foia = catalog.remedy("FOIA-REQUEST-01").unwrap();
        assert_eq!(foia.authority, "5 U.S.C. § 552");
        let first = foia.first_step().unwrap();
        assert!(matches!(
            first.action,
            StepAction::GenerateDocument { ref template_id } if template_id == "FOIA_REQUEST_TEMPLATE"
        ));
        let wait = foia.step("foia-req-step-2").unwrap();
        assert!(wait.awaits_response());
        assert_eq!(
            wait.next_step.on_failure,
            Some(StepTarget::Step("foia-req-end-failure".to_string()))
        );
    }

    #[test]
    fn builtin_foia_mission_chains_to_appeal() {
        let catalog = Catalog::builtin().unwrap();
        let mission = catalog.playbook("MISSION-FOIA-01").unwrap();
        let first = mission.first_step().unwrap();
        assert_eq!(first.remedy_definition_id, "FOIA-REQUEST-01");
        assert_eq!(first.transitions.orders().collect::<Vec<_>>(), vec![2]);
        assert_eq!(
            mission.step(2).map(|s| s.remedy_definition_id.as_str()),
            Some("FOIA-APPEAL-01")
        );
    }

    #[test]
    fn lookups_miss_unknown_ids() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.remedy("NOPE").is_none());
        assert!(catalog.playbook("NOPE").is_none());
    }

    #[test]
    fn from_json_reports_parse_errors() {
        let err = Catalog::from_json("{ not json").unwrap_err();
        assert!(matches!(err, CatalogError::Parse { .. }));
    }

    #[test]
    fn load_rejects_structurally_invalid_catalog() {
        let source = serde_json::json!({
            "remedies": [{
                "id": "D",
                "name": "Broken",
                "authority": "none",
                "steps": [{
                    "id": "a",
                    "title": "A",
                    "description": "",
                    "action": { "type": "user_action", "description": "x" },
                    "next_step": { "on_success": { "step": "missing" } }
                }]
            }]
        })
        .to_string();
        match Catalog::load(&source) {
            Err(CatalogError::Invalid { problems }) => {
                assert_eq!(problems.len(), 1);
                assert!(matches!(problems[0], CatalogError::DanglingStepRef { .. }));
            }
            other => panic!("expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn catalog_round_trips_through_json() {
        let catalog = Catalog::builtin().unwrap();
        let json = serde_json::to_string(&catalog).unwrap();
        assert_eq!(Catalog::from_json(&json).unwrap(), catalog);
    }
}

//! Catalog data shared by the unit tests.

use remedy_core::{Catalog, MissionPlaybook, RemedyDefinition};

/// `D`: `a` awaits 20 business days and fails over to `b`, a user action
/// that ends the remedy.
/// `S`: a single user action, terminal on success and on failure.
/// `W`: `wait` awaits 10 calendar days and has no failure target.
/// `G`: `draft` generates a document, then `wait` awaits 5 business days,
/// then `appeal` awaits 20 business days; every failure is terminal.
/// `PAIR`: S then S again on success, fail on failure.
/// `SOLO`: a single S step that fails the mission on failure.
pub(crate) fn catalog() -> Catalog {
    let source = serde_json::json!({
        "remedies": [
            {
                "id": "D", "name": "Deadline then escalate", "authority": "Test Act § 1",
                "steps": [
                    { "id": "a", "title": "Await reply", "description": "Wait for the agency.",
                      "action": { "type": "await_response", "deadline": { "count": 20, "unit": "business" } },
                      "next_step": { "on_success": "terminal", "on_failure": { "step": "b" } } },
                    { "id": "b", "title": "Escalate", "description": "Do something about it.",
                      "action": { "type": "user_action", "description": "Escalate" },
                      "next_step": { "on_success": "terminal" } }
                ]
            },
            {
                "id": "S", "name": "Single step", "authority": "Test Act § 2",
                "steps": [
                    { "id": "only", "title": "Only", "description": "",
                      "action": { "type": "user_action", "description": "Do it" },
                      "next_step": { "on_success": "terminal", "on_failure": "terminal" } }
                ]
            },
            {
                "id": "W", "name": "Wait forever", "authority": "Test Act § 3",
                "steps": [
                    { "id": "wait", "title": "Wait", "description": "",
                      "action": { "type": "await_response", "deadline": { "count": 10, "unit": "calendar" } },
                      "next_step": { "on_success": "terminal" } }
                ]
            },
            {
                "id": "G", "name": "Draft and chase", "authority": "Test Act § 4",
                "steps": [
                    { "id": "draft", "title": "Draft letter", "description": "",
                      "action": { "type": "generate_document", "template_id": "LETTER" },
                      "next_step": { "on_success": { "step": "wait" }, "on_failure": "terminal" } },
                    { "id": "wait", "title": "Wait for reply", "description": "",
                      "action": { "type": "await_response", "deadline": { "count": 5, "unit": "business" } },
                      "next_step": { "on_success": "terminal", "on_failure": { "step": "appeal" } } },
                    { "id": "appeal", "title": "Await appeal", "description": "",
                      "action": { "type": "await_response", "deadline": { "count": 20, "unit": "business" } },
                      "next_step": { "on_success": "terminal", "on_failure": "terminal" } }
                ]
            }
        ],
        "playbooks": [
            {
                "id": "PAIR", "name": "Two in a row", "objective": "Chain",
                "steps": [
                    { "order": 1, "title": "First", "remedy_definition_id": "S",
                      "transitions": { "on_success": { "order": 2 }, "on_failure": "fail" } },
                    { "order": 2, "title": "Second", "remedy_definition_id": "S",
                      "transitions": { "on_success": "complete", "on_failure": "fail" } }
                ]
            },
            {
                "id": "SOLO", "name": "One shot", "objective": "Single",
                "steps": [
                    { "order": 1, "title": "Only", "remedy_definition_id": "S",
                      "transitions": { "on_success": "complete", "on_failure": "fail" } }
                ]
            }
        ]
    })
    .to_string();
    Catalog::load(&source).unwrap()
}

pub(crate) fn definition(id: &str) -> RemedyDefinition {
    catalog().remedy(id).unwrap().clone()
}

pub(crate) fn playbook(id: &str) -> MissionPlaybook {
    catalog().playbook(id).unwrap().clone()
}

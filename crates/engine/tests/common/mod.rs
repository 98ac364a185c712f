#![allow(dead_code)]

use std::sync::Arc;

use remedy_core::Catalog;
use remedy_engine::{Engine, ManualClock, RecordingDocuments};
use remedy_storage::{MemoryArchive, MemoryStore};
use time::macros::datetime;
use time::OffsetDateTime;

/// Friday.
pub const START: OffsetDateTime = datetime!(2025-03-07 10:00 UTC);

pub fn catalog() -> Catalog {
    let source = serde_json::json!({
        "remedies": [
            {
                "id": "D", "name": "Deadline then escalate", "authority": "Test Act § 1",
                "steps": [
                    { "id": "A", "title": "Await reply", "description": "",
                      "action": { "type": "await_response", "deadline": { "count": 20, "unit": "business" } },
                      "next_step": { "on_success": "terminal", "on_failure": { "step": "B" } } },
                    { "id": "B", "title": "Escalate", "description": "",
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
                "id": "L", "name": "Letter", "authority": "Test Act § 3",
                "steps": [
                    { "id": "draft", "title": "Draft letter", "description": "",
                      "action": { "type": "generate_document", "template_id": "LETTER" },
                      "next_step": { "on_success": { "step": "wait" }, "on_failure": "terminal" } },
                    { "id": "wait", "title": "Wait", "description": "",
                      "action": { "type": "await_response", "deadline": { "count": 5, "unit": "business" } },
                      "next_step": { "on_success": "terminal", "on_failure": "terminal" } }
                ]
            }
        ],
        "playbooks": [
            {
                "id": "CHAIN", "name": "Two in a row", "objective": "Chain",
                "steps": [
                    { "order": 1, "title": "First", "remedy_definition_id": "S",
                      "transitions": { "on_success": { "order": 2 }, "on_failure": "fail" } },
                    { "order": 2, "title": "Second", "remedy_definition_id": "L",
                      "transitions": { "on_success": "complete", "on_failure": "fail" } }
                ]
            },
            {
                "id": "ONE", "name": "One shot", "objective": "Single",
                "steps": [
                    { "order": 1, "title": "Only", "remedy_definition_id": "S",
                      "transitions": { "on_success": "complete", "on_failure": "fail" } }
                ]
            },
            {
                "id": "WAIT", "name": "Escalating mission", "objective": "Deadline driven",
                "steps": [
                    { "order": 1, "title": "Ask", "remedy_definition_id": "L",
                      "transitions": { "on_success": "complete", "on_failure": { "order": 2 } } },
                    { "order": 2, "title": "Fallback", "remedy_definition_id": "S",
                      "transitions": { "on_success": "complete", "on_failure": "fail" } }
                ]
            }
        ]
    })
    .to_string();
    Catalog::load(&source).unwrap()
}

pub struct Harness {
    pub engine: Engine<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub archive: Arc<MemoryArchive>,
    pub documents: Arc<RecordingDocuments>,
}

pub fn harness() -> Harness {
    harness_with(catalog())
}

pub fn harness_with(catalog: Catalog) -> Harness {
    let clock = Arc::new(ManualClock::new(START));
    let archive = Arc::new(MemoryArchive::new());
    let documents = Arc::new(RecordingDocuments::new());
    let engine = Engine::new(Arc::new(catalog), MemoryStore::new())
        .with_clock(clock.clone())
        .with_archive(archive.clone())
        .with_documents(documents.clone());
    Harness {
        engine,
        clock,
        archive,
        documents,
    }
}

pub fn vars(pairs: &[(&str, &str)]) -> std::collections::BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

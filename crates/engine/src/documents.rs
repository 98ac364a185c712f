//! Hand-off to whatever drafts and dispatches correspondence.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::Serialize;

use remedy_core::{ActiveRemedy, RemedyDefinition, StepAction};

/// Emitted when a remedy enters a `GenerateDocument` step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentRequest {
    pub remedy_instance_id: String,
    pub step_id: String,
    pub template_id: String,
    pub variables: BTreeMap<String, String>,
}

impl DocumentRequest {
    /// The request for the remedy's current step, if that step generates a
    /// document and the remedy is still open.
    pub fn for_current_step(definition: &RemedyDefinition, remedy: &ActiveRemedy) -> Option<Self> {
        if remedy.is_closed() {
            return None;
        }
        let step = definition.step(&remedy.current_step_id)?;
        match &step.action {
            StepAction::GenerateDocument { template_id } => Some(DocumentRequest {
                remedy_instance_id: remedy.instance_id.clone(),
                step_id: step.id.clone(),
                template_id: template_id.clone(),
                variables: remedy.variables.clone(),
            }),
            _ => None,
        }
    }
}

/// Receives document requests. Fire and forget: the remedy only moves on
/// when someone reports the step's result.
pub trait DocumentSink: Send + Sync {
    fn generate(&self, request: DocumentRequest);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullDocuments;

impl DocumentSink for NullDocuments {
    fn generate(&self, _request: DocumentRequest) {}
}

/// Keeps every request, in order.
#[derive(Debug, Default)]
pub struct RecordingDocuments {
    requests: Mutex<Vec<DocumentRequest>>,
}

impl RecordingDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<DocumentRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }
}

impl DocumentSink for RecordingDocuments {
    fn generate(&self, request: DocumentRequest) {
        self.requests
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(request);
    }
}

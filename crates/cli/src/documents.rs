use remedy_engine::{DocumentRequest, DocumentSink};
use tracing::info;

/// The CLI has no drafting front end; it records each request in the log
/// so the operator knows a letter is due.
#[derive(Debug, Default)]
pub(crate) struct LogDocuments;

impl DocumentSink for LogDocuments {
    fn generate(&self, request: DocumentRequest) {
        info!(
            remedy = %request.remedy_instance_id,
            step = %request.step_id,
            template = %request.template_id,
            variables = ?request.variables,
            "Document requested"
        );
    }
}

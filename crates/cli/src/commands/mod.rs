pub(crate) mod catalog;
pub(crate) mod deadline;
pub(crate) mod mission;
pub(crate) mod remedy;
pub(crate) mod show;
pub(crate) mod tick;
pub(crate) mod validate;

use std::sync::Arc;

use remedy_core::Catalog;
use remedy_engine::{Clock, Engine, EngineError, PassReport, SystemClock};
use remedy_storage::{FileStore, JsonlArchive};

use crate::config::Settings;
use crate::documents::LogDocuments;
use crate::{fail, OutputFormat};

/// The catalog named in the settings, or the built-in one.
pub(crate) fn load_catalog(settings: &Settings) -> Result<Catalog, String> {
    match &settings.catalog_path {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .map_err(|e| format!("error reading catalog '{}': {}", path.display(), e))?;
            Catalog::load(&source).map_err(|e| format!("catalog '{}': {}", path.display(), e))
        }
        None => Catalog::builtin().map_err(|e| format!("built-in catalog: {}", e)),
    }
}

pub(crate) fn open_engine_with_clock(
    settings: &Settings,
    clock: Arc<dyn Clock>,
) -> Result<Engine<FileStore>, String> {
    let catalog = load_catalog(settings)?;
    Ok(Engine::new(Arc::new(catalog), FileStore::new(&settings.state_path))
        .with_archive(Arc::new(JsonlArchive::new(&settings.archive_path)))
        .with_documents(Arc::new(LogDocuments))
        .with_clock(clock)
        .with_config(settings.engine.clone()))
}

/// Open the engine over the configured state file, or exit.
pub(crate) fn open_engine(settings: &Settings, output: OutputFormat, quiet: bool) -> Engine<FileStore> {
    open_engine_with_clock(settings, Arc::new(SystemClock))
        .unwrap_or_else(|msg| fail(&msg, output, quiet))
}

/// Run one tick after a state mutation. The mutation has already been
/// written, so a failing tick is reported but does not fail the command.
pub(crate) fn settle(engine: &Engine<FileStore>) -> Option<PassReport> {
    match engine.tick() {
        Ok(report) => Some(report),
        Err(e) => {
            tracing::warn!(error = %e, "Follow-up tick failed");
            None
        }
    }
}

pub(crate) fn engine_error(e: EngineError, output: OutputFormat, quiet: bool) -> ! {
    fail(&format!("error: {}", e), output, quiet)
}

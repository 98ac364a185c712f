//! `remedy.toml` loading and flag overrides.
//!
//! ```toml
//! [engine]
//! tick_interval_secs = 60
//! max_orchestration_passes = 4
//!
//! [storage]
//! state_path = "remedy-state.json"
//! archive_path = "remedy-archive.jsonl"
//!
//! [catalog]
//! path = "catalog.json"   # optional; built-in catalog otherwise
//!
//! [log]
//! filter = "info"         # RUST_LOG wins when set
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use remedy_engine::EngineConfig;

const DEFAULT_CONFIG: &str = "remedy.toml";
const DEFAULT_STATE: &str = "remedy-state.json";
const DEFAULT_ARCHIVE: &str = "remedy-archive.jsonl";
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    engine: EngineConfig,
    storage: StorageSection,
    catalog: CatalogSection,
    log: LogSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct StorageSection {
    state_path: Option<PathBuf>,
    archive_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CatalogSection {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LogSection {
    filter: Option<String>,
}

/// Values given on the command line; they win over the file.
#[derive(Debug, Default)]
pub(crate) struct Overrides {
    pub state: Option<PathBuf>,
    pub archive: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Settings {
    pub engine: EngineConfig,
    pub state_path: PathBuf,
    pub archive_path: PathBuf,
    pub catalog_path: Option<PathBuf>,
    pub log_filter: String,
}

impl Settings {
    /// Read `explicit` (which must exist) or `./remedy.toml` (if it exists),
    /// then apply `overrides`.
    pub(crate) fn load(explicit: Option<&Path>, overrides: Overrides) -> Result<Self, String> {
        let file = match explicit {
            Some(path) => read_file(path)?,
            None if Path::new(DEFAULT_CONFIG).is_file() => read_file(Path::new(DEFAULT_CONFIG))?,
            None => FileConfig::default(),
        };
        Ok(Settings::resolve(file, overrides))
    }

    fn resolve(file: FileConfig, overrides: Overrides) -> Self {
        Settings {
            engine: file.engine,
            state_path: overrides
                .state
                .or(file.storage.state_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE)),
            archive_path: overrides
                .archive
                .or(file.storage.archive_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ARCHIVE)),
            catalog_path: overrides.catalog.or(file.catalog.path),
            log_filter: file
                .log
                .filter
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        }
    }
}

fn read_file(path: &Path) -> Result<FileConfig, String> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("error reading config '{}': {}", path.display(), e))?;
    parse(&contents).map_err(|e| format!("error parsing config '{}': {}", path.display(), e))
}

fn parse(contents: &str) -> Result<FileConfig, toml::de::Error> {
    toml::from_str(contents)
}

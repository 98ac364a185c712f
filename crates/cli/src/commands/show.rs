use serde::Serialize;

use remedy_core::{ActiveMission, ActiveRemedy};
use remedy_engine::{EngineError, MissionView, RemedyView};
use remedy_storage::StorageError;

use super::{engine_error, open_engine};
use crate::config::Settings;
use crate::{emit, fail, render, OutputFormat};

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Shown {
    Remedy(RemedyView),
    Mission(MissionView),
}

pub(crate) fn cmd_show(settings: &Settings, instance_id: &str, output: OutputFormat, quiet: bool) {
    let engine = open_engine(settings, output, quiet);
    let shown = match engine.remedy_view(instance_id) {
        Ok(view) => Shown::Remedy(view),
        Err(EngineError::Storage(StorageError::NotFound { .. })) => {
            match engine.mission_view(instance_id) {
                Ok(view) => Shown::Mission(view),
                Err(EngineError::Storage(StorageError::NotFound { .. })) => fail(
                    &format!("error: no remedy or mission '{}'", instance_id),
                    output,
                    quiet,
                ),
                Err(e) => engine_error(e, output, quiet),
            }
        }
        Err(e) => engine_error(e, output, quiet),
    };
    emit(&shown, output, quiet, || match &shown {
        Shown::Remedy(view) => render::remedy(view),
        Shown::Mission(view) => render::mission(view),
    });
}

#[derive(Serialize)]
struct Listing {
    remedies: Vec<ActiveRemedy>,
    missions: Vec<ActiveMission>,
}

pub(crate) fn cmd_list(settings: &Settings, output: OutputFormat, quiet: bool) {
    let engine = open_engine(settings, output, quiet);
    let listing = Listing {
        remedies: engine
            .remedies()
            .unwrap_or_else(|e| engine_error(e, output, quiet)),
        missions: engine
            .missions()
            .unwrap_or_else(|e| engine_error(e, output, quiet)),
    };
    emit(&listing, output, quiet, || {
        render::listing(&listing.remedies, &listing.missions)
    });
}

use std::collections::BTreeMap;

use serde::Serialize;

use remedy_engine::EngineError;
use remedy_storage::StorageError;

use super::{engine_error, open_engine, settle};
use crate::config::Settings;
use crate::{emit, fail, render, OutputFormat};

pub(crate) fn cmd_launch(
    settings: &Settings,
    playbook_id: &str,
    variables: BTreeMap<String, String>,
    output: OutputFormat,
    quiet: bool,
) {
    let engine = open_engine(settings, output, quiet);
    let mission = engine
        .launch_mission(playbook_id, variables)
        .unwrap_or_else(|e| engine_error(e, output, quiet));
    // Starts the mission's first remedy.
    settle(&engine);
    let view = engine
        .mission_view(&mission.instance_id)
        .unwrap_or_else(|e| engine_error(e, output, quiet));
    emit(&view, output, quiet, || render::mission(&view));
}

#[derive(Serialize)]
struct Cancelled<'a> {
    kind: &'a str,
    instance_id: &'a str,
    status: String,
}

/// Cancel whichever kind of instance carries `instance_id`.
pub(crate) fn cmd_cancel(settings: &Settings, instance_id: &str, output: OutputFormat, quiet: bool) {
    let engine = open_engine(settings, output, quiet);
    let cancelled = match engine.cancel_remedy(instance_id) {
        Ok(remedy) => Cancelled {
            kind: "remedy",
            instance_id,
            status: remedy.status.to_string(),
        },
        Err(EngineError::Storage(StorageError::NotFound { .. })) => {
            match engine.cancel_mission(instance_id) {
                Ok(mission) => Cancelled {
                    kind: "mission",
                    instance_id,
                    status: mission.status.to_string(),
                },
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
    settle(&engine);
    emit(&cancelled, output, quiet, || {
        format!(
            "cancelled {} {} ({})",
            cancelled.kind, cancelled.instance_id, cancelled.status
        )
    });
}

use std::collections::BTreeMap;

use remedy_core::StepResult;

use super::{engine_error, open_engine, settle};
use crate::config::Settings;
use crate::{emit, render, OutputFormat};

pub(crate) fn cmd_initiate(
    settings: &Settings,
    definition_id: &str,
    variables: BTreeMap<String, String>,
    output: OutputFormat,
    quiet: bool,
) {
    let engine = open_engine(settings, output, quiet);
    let remedy = engine
        .initiate_remedy(definition_id, variables)
        .unwrap_or_else(|e| engine_error(e, output, quiet));
    settle(&engine);
    let view = engine
        .remedy_view(&remedy.instance_id)
        .unwrap_or_else(|e| engine_error(e, output, quiet));
    emit(&view, output, quiet, || render::remedy(&view));
}

pub(crate) fn cmd_report(
    settings: &Settings,
    instance_id: &str,
    result: StepResult,
    notes: Option<String>,
    output: OutputFormat,
    quiet: bool,
) {
    let engine = open_engine(settings, output, quiet);
    engine
        .report_step_result(instance_id, result, notes)
        .unwrap_or_else(|e| engine_error(e, output, quiet));
    settle(&engine);
    let view = engine
        .remedy_view(instance_id)
        .unwrap_or_else(|e| engine_error(e, output, quiet));
    emit(&view, output, quiet, || render::remedy(&view));
}

use crate::config::Settings;
use crate::{emit, fail, render, OutputFormat};

pub(crate) fn cmd_catalog(settings: &Settings, output: OutputFormat, quiet: bool) {
    let catalog = super::load_catalog(settings).unwrap_or_else(|msg| fail(&msg, output, quiet));
    emit(&catalog, output, quiet, || render::catalog(&catalog));
}

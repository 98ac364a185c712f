use std::sync::Arc;

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::info;

use remedy_engine::{scheduler, Clock, ManualClock, SystemClock};

use super::{engine_error, open_engine, open_engine_with_clock};
use crate::config::Settings;
use crate::{emit, fail, render, OutputFormat};

pub(crate) fn cmd_tick(settings: &Settings, now: Option<&str>, output: OutputFormat, quiet: bool) {
    let clock: Arc<dyn Clock> = match now {
        Some(now) => {
            let instant = OffsetDateTime::parse(now, &Rfc3339).unwrap_or_else(|e| {
                fail(&format!("error: invalid --now '{}': {}", now, e), output, quiet)
            });
            Arc::new(ManualClock::new(instant))
        }
        None => Arc::new(SystemClock),
    };
    let engine =
        open_engine_with_clock(settings, clock).unwrap_or_else(|msg| fail(&msg, output, quiet));
    let report = engine
        .tick()
        .unwrap_or_else(|e| engine_error(e, output, quiet));
    emit(&report, output, quiet, || render::pass_report(&report));
}

/// Tick on the configured interval until Ctrl-C.
pub(crate) fn cmd_run(settings: &Settings, quiet: bool) {
    let output = OutputFormat::Text;
    let engine = Arc::new(open_engine(settings, output, quiet));
    let period = settings.engine.tick_interval();

    let rt = tokio::runtime::Runtime::new()
        .unwrap_or_else(|e| fail(&format!("failed to create tokio runtime: {}", e), output, quiet));
    rt.block_on(async move {
        let handle = scheduler::spawn(engine, period);
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
        info!("Interrupt received");
        handle.shutdown().await;
    });
}

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Logs go to stderr so stdout carries only
/// command output. `RUST_LOG` takes precedence over `default_filter`;
/// `--quiet` lowers the default to errors only.
pub(crate) fn init(default_filter: &str, quiet: bool) {
    let fallback = if quiet { "error" } else { default_filter };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

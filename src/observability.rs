use tracing_subscriber::EnvFilter;

/// Install the global `fmt` subscriber. `RUST_LOG` takes precedence.
pub fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "home_metrics=debug"
    } else {
        "home_metrics=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

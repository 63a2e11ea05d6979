use tracing_subscriber::{fmt, EnvFilter, prelude::*};

/// Install the global subscriber. Output goes to stderr so stdout stays
/// reserved for pipeline results.
pub fn init_logging(json: bool) {
    let json_layer = json.then(|| {
        fmt::layer()
            .with_target(false)
            .with_thread_ids(true)
            .with_writer(std::io::stderr)
            .json()
    });
    let text_layer = (!json).then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    let filter_layer = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(json_layer)
        .with(text_layer)
        .init();
}

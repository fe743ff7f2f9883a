//! Diagnostic logging on stderr, separate from the user-facing console.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

pub fn level_for(debug: u8) -> LevelFilter {
    match debug {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Installs the global subscriber. Later calls are ignored.
pub fn setup_logging(debug: u8) {
    let filter = level_for(debug);
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false);

    let _ = tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .try_init();

    tracing::debug!(level = %filter, "logging initialised");
}

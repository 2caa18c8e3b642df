//! Log setup for the command line.
//!
//! Everything goes to stderr so stdout only carries NAL listings. The level
//! comes from `-v` (warn, debug, trace) unless `NALX_LOG` holds a filter.
//! `log` records from the bitstream crate are picked up through
//! tracing-subscriber's log bridge.

use tracing_subscriber::{
    EnvFilter, Registry, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

pub const LOG_ENV: &str = "NALX_LOG";

pub fn init(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = fmt::Layer::default()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter);

    // A second init (tests, embedding) keeps the first subscriber.
    Registry::default().with(stderr_layer).try_init().ok();
}

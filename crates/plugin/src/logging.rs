//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

use repairme_core::RepairMeConfig;

/// Install the global fmt subscriber
///
/// `RUST_LOG` wins when set; otherwise the level follows `config.debug`.
/// Safe to call more than once; later calls keep the first subscriber.
pub fn init_logging(config: &RepairMeConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config)));

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .try_init()
        .is_err()
    {
        tracing::debug!("Tracing subscriber already installed");
    }
}

fn default_directive(config: &RepairMeConfig) -> &'static str {
    if config.debug {
        "debug"
    } else {
        "info"
    }
}

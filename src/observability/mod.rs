pub mod log;
pub mod noop;
pub mod traits;

pub use self::log::LogObserver;
pub use noop::NoopObserver;
pub use traits::{Observer, ObserverEvent};

use crate::config::ObservabilityConfig;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Factory: create the right observer from config
pub fn create_observer(config: &ObservabilityConfig) -> Box<dyn Observer> {
    match config.backend.as_str() {
        "log" => Box::new(LogObserver::new()),
        "none" | "noop" => Box::new(NoopObserver),
        _ => {
            tracing::warn!(
                "Unknown observability backend '{}', falling back to noop",
                config.backend
            );
            Box::new(NoopObserver)
        }
    }
}

/// Parse a configured level name, defaulting to `INFO`.
pub fn parse_level(raw: &str) -> Level {
    match raw.trim().to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Install a fmt subscriber at the configured level.
///
/// Returns `false` when the host application already installed one; that
/// subscriber is left in place.
pub fn init_logging(config: &ObservabilityConfig) -> bool {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&config.log_level))
        .finish();
    tracing::subscriber::set_global_default(subscriber).is_ok()
}

//! Headless Encore player
//!
//! Browses the public catalog and plays track previews through the playback
//! service, using a simulated platform player and a log-backed media session.

pub mod config;
pub mod console;
pub mod error;
pub mod session;
pub mod simulator;

pub use config::{EncoreConfig, SimulatorSettings};
pub use error::{CliError, Result};
pub use session::LogSession;
pub use simulator::SimulatedPlayer;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Log filter used when neither `RUST_LOG` nor the config sets one
pub const DEFAULT_LOG_FILTER: &str = "encore=info,encore_cli=info,encore_playback=info,encore_catalog=info";

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over `configured`. Logs go to stderr so listings on stdout
/// stay clean.
pub fn init_tracing(configured: Option<&str>) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(configured.unwrap_or(DEFAULT_LOG_FILTER)))
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

pub mod config;
pub mod error;
pub mod models;
pub mod intake; // Keyword triage of free text
pub mod composer; // Input box helpers and quick-symptom chips
pub mod client; // Backend HTTP client
pub mod render; // Results panel and transcript HTML
pub mod session; // Conversation state machine
pub mod controller; // Effect driver
pub mod terminal; // Line-oriented front end

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins over the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}

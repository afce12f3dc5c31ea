// Library exports for night_consolidate

pub mod api;
pub mod config;
pub mod consolidate;
pub mod error;
pub mod report;
pub mod wallet;

// Re-export main types for convenience
pub use config::{ConsolidateConfig, Settings};
pub use consolidate::{Consolidator, RunOutcome};
pub use wallet::{derive_wallets, WalletRecord};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the stderr subscriber used by both binaries. `RUST_LOG` overrides
/// the default `night_consolidate=warn`.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "night_consolidate=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

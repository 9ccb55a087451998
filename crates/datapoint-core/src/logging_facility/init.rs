//! Logging initialization

use serde::Deserialize;
use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Logging profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Human-readable output, debug level for workspace crates
    #[default]
    Development,
    /// JSON output, info level
    Production,
    /// No output; tests install their own capture layer
    Test,
}

const DEVELOPMENT_FILTER: &str =
    "datapoint_core=debug,datapoint_store=debug,datapoint_engine=debug,datapoint_cli=debug";
const PRODUCTION_FILTER: &str =
    "datapoint_core=info,datapoint_store=info,datapoint_engine=info,datapoint_cli=info";

static INIT_ONCE: Once = Once::new();

/// Install the global subscriber for `profile`.
///
/// Only the first call has any effect. `RUST_LOG` overrides the profile's
/// default filter.
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| match profile {
        Profile::Development => {
            // try_init: an embedding application may already own the global subscriber
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter_or(DEVELOPMENT_FILTER))
                .with_writer(std::io::stderr)
                .finish()
                .try_init();
        }
        Profile::Production => {
            let _ = tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter_or(PRODUCTION_FILTER))
                .with_writer(std::io::stderr)
                .finish()
                .try_init();
        }
        Profile::Test => {
            let _ = tracing_subscriber::registry().try_init();
        }
    });
}

fn filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

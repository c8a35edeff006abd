//! lintconf core
//!
//! Layered configuration resolution for lint tooling. An ordered stack of
//! partial configuration fragments (a shared base first, package overrides
//! after) is validated once into a [`FragmentStore`]; the driver then asks a
//! [`ConfigResolver`] for the effective rule set of every file it checks.

pub mod cache;
pub mod config;
pub mod error;
pub mod glob;
pub mod merge;
pub mod resolver;
pub mod result;
pub mod store;

// Re-export commonly used types
pub use cache::{CacheStats, ResolutionCache};
pub use config::{
    ConfigDocument, ConfigFragment, ConfigLoader, ResolverOptions, RuleSetting, Severity,
    config_schema,
};
pub use error::{ConfigError, ErrorKind};
pub use glob::{GlobMatcher, GlobPattern, NormalizedPath, PatternSet};
pub use merge::{EffectiveConfig, Explanation, IgnoreSource, Merger, Resolution};
pub use resolver::{ConfigResolver, ResolveConfig};
pub use result::Result;
pub use store::{CompiledFragment, FragmentStore};

/// Initialize the tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lintconf=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

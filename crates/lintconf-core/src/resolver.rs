//! Resolver facade used by the rule-checking driver
//!
//! ```no_run
//! use lintconf_core::{ConfigFragment, ConfigResolver};
//!
//! let resolver = ConfigResolver::new(vec![
//!     ConfigFragment::named("base").with_rule("@typescript-eslint/no-explicit-any", "error"),
//!     ConfigFragment::named("package")
//!         .with_ignores(["node_modules/**"])
//!         .with_rule("@typescript-eslint/no-explicit-any", "off"),
//! ])?;
//!
//! if let Some(config) = resolver.resolve("src/index.ts").config() {
//!     for (rule, setting) in config.enabled_rules() {
//!         println!("{rule}: {}", setting.severity);
//!     }
//! }
//! # Ok::<(), lintconf_core::ConfigError>(())
//! ```

use crate::cache::{CacheStats, ResolutionCache};
use crate::config::{ConfigFragment, ConfigLoader, ResolverOptions};
use crate::merge::{Explanation, Merger, Resolution};
use crate::store::FragmentStore;
use crate::Result;
use rayon::prelude::*;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{error, info};

/// Query interface consumed by lint drivers
pub trait ResolveConfig: Send + Sync {
    /// Resolve the effective configuration for one file
    fn resolve_path(&self, path: &Path) -> Resolution;
}

/// Facade composing fragment store, merger and cache
#[derive(Debug)]
pub struct ConfigResolver {
    options: ResolverOptions,
    session: RwLock<Arc<ResolutionCache>>,
}

impl ConfigResolver {
    /// Build a resolver over `fragments` with default options
    pub fn new(fragments: Vec<ConfigFragment>) -> Result<Self> {
        Self::with_options(fragments, ResolverOptions::default())
    }

    /// Build a resolver, rejecting any invalid fragment.
    ///
    /// An error here must abort the session: checks never run under a
    /// partially understood configuration.
    pub fn with_options(fragments: Vec<ConfigFragment>, options: ResolverOptions) -> Result<Self> {
        let store = FragmentStore::load_with_options(fragments, &options).inspect_err(|e| {
            error!("Invalid configuration: {}", e);
        })?;
        Ok(Self::from_store(store, options))
    }

    /// Load fragments from a config file (following `extends`) and build a resolver
    pub fn from_config_file(path: &Path, options: ResolverOptions) -> Result<Self> {
        let fragments = ConfigLoader::load_from_file(path)?;
        Self::with_options(fragments, options)
    }

    fn from_store(store: FragmentStore, options: ResolverOptions) -> Self {
        Self {
            options,
            session: RwLock::new(Arc::new(ResolutionCache::new(Arc::new(store)))),
        }
    }

    /// Effective configuration for `path`, or [`Resolution::Ignored`]
    pub fn resolve(&self, path: impl AsRef<Path>) -> Resolution {
        self.session().get_or_compute(path)
    }

    /// Resolve a batch of paths in parallel, preserving input order
    pub fn resolve_many<P>(&self, paths: &[P]) -> Vec<Resolution>
    where
        P: AsRef<Path> + Sync,
    {
        let session = self.session();
        paths
            .par_iter()
            .map(|path| session.get_or_compute(path))
            .collect()
    }

    /// Explain which fragments shaped the resolution of `path`
    pub fn explain(&self, path: impl AsRef<Path>) -> Explanation {
        let session = self.session();
        Merger::new(session.store()).explain(path)
    }

    /// Replace the fragment sequence.
    ///
    /// The new sequence is validated first; on error the current session
    /// stays in place. On success the store and cache are swapped together,
    /// so no stale entry survives.
    pub fn reload(&self, fragments: Vec<ConfigFragment>) -> Result<()> {
        let store = FragmentStore::load_with_options(fragments, &self.options).inspect_err(|e| {
            error!("Rejected configuration reload: {}", e);
        })?;
        let fresh = Arc::new(ResolutionCache::new(Arc::new(store)));

        let mut session = self.session.write().unwrap_or_else(PoisonError::into_inner);
        *session = fresh;
        info!("Configuration reloaded, resolution cache reset");
        Ok(())
    }

    /// Drop all cached resolutions of the current session
    pub fn clear_cache(&self) {
        self.session().clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.session().stats()
    }

    /// The fragment store of the current session
    pub fn store(&self) -> Arc<FragmentStore> {
        Arc::clone(self.session().store())
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    fn session(&self) -> Arc<ResolutionCache> {
        let session = self.session.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*session)
    }
}

impl ResolveConfig for ConfigResolver {
    fn resolve_path(&self, path: &Path) -> Resolution {
        self.resolve(path)
    }
}

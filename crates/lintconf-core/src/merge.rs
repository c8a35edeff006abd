//! Folding applicable fragments into an effective configuration
//!
//! For one path the merger:
//!
//! 1. checks ignores (outside-root, default ignores, then every fragment's
//!    `ignores` in declaration order); any hit yields [`Resolution::Ignored`]
//! 2. selects, in order, the fragments whose `files` match (no `files` means
//!    every file)
//! 3. folds their rules left to right, each entry overwriting any earlier
//!    entry for the same rule name
//!
//! Precedence is purely positional. A later fragment wins on a shared rule
//! even when its scope is narrower, and a later `off` fully replaces an
//! earlier `warn` or `error`, options included.

use crate::config::{RuleSetting, Severity};
use crate::glob::NormalizedPath;
use crate::store::{CompiledFragment, FragmentStore};
use globset::Candidate;
use indexmap::IndexMap;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace};

/// Fully merged rule set for one file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EffectiveConfig {
    rules: IndexMap<String, RuleSetting>,
}

impl EffectiveConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, rule: &str) -> Option<&RuleSetting> {
        self.rules.get(rule)
    }

    pub fn severity(&self, rule: &str) -> Option<Severity> {
        self.rules.get(rule).map(|setting| setting.severity)
    }

    /// Whether `rule` is configured at `warn` or `error`
    pub fn is_enabled(&self, rule: &str) -> bool {
        self.severity(rule).is_some_and(|severity| severity.is_enabled())
    }

    /// Rules that are not turned off, in first-configured order
    pub fn enabled_rules(&self) -> impl Iterator<Item = (&str, &RuleSetting)> {
        self.iter().filter(|(_, setting)| setting.severity.is_enabled())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleSetting)> {
        self.rules.iter().map(|(rule, setting)| (rule.as_str(), setting))
    }

    pub fn rules(&self) -> &IndexMap<String, RuleSetting> {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Outcome of resolving one path
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The path is excluded from all processing
    Ignored,
    Config(Arc<EffectiveConfig>),
}

impl Resolution {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Resolution::Ignored)
    }

    /// The effective configuration, unless the path is ignored
    pub fn config(&self) -> Option<&EffectiveConfig> {
        match self {
            Resolution::Ignored => None,
            Resolution::Config(config) => Some(config.as_ref()),
        }
    }
}

/// What caused a path to be ignored
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IgnoreSource {
    /// The path lies outside the project root
    OutsideRoot,
    /// A session-wide default ignore pattern matched
    DefaultIgnore { pattern: String },
    /// An `ignores` pattern of a fragment matched
    Fragment { index: usize, pattern: String },
}

/// Provenance of a resolution, for debugging configuration stacks
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Explanation {
    /// Root-relative path that was matched
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignored_by: Option<IgnoreSource>,
    /// Indices of the fragments whose scope matched, in fold order
    pub matched_fragments: Vec<usize>,
    /// Index of the fragment that supplied each final rule setting
    pub rule_origins: IndexMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<EffectiveConfig>,
}

/// Which fragments matched a path and which supplied each rule
#[derive(Debug, Default)]
struct Provenance {
    matched_fragments: Vec<usize>,
    rule_origins: IndexMap<String, usize>,
}

/// Merges the fragments of a store for individual paths
#[derive(Debug, Clone, Copy)]
pub struct Merger<'a> {
    store: &'a FragmentStore,
}

impl<'a> Merger<'a> {
    pub fn new(store: &'a FragmentStore) -> Self {
        Self { store }
    }

    /// Normalize `path` against the store's root and merge
    pub fn merge(&self, path: impl AsRef<Path>) -> Resolution {
        let normalized = self.store.matcher().normalize(path);
        self.merge_normalized(&normalized)
    }

    /// Merge for a path that has already been normalized
    pub fn merge_normalized(&self, path: &NormalizedPath) -> Resolution {
        let candidate = path.candidate();

        if let Some(source) = self.ignored_by(path, &candidate) {
            debug!("Ignoring {} ({:?})", path.relative(), source);
            return Resolution::Ignored;
        }

        Resolution::Config(Arc::new(self.fold(path, &candidate, None)))
    }

    /// Resolve `path` and record which fragments shaped the result
    pub fn explain(&self, path: impl AsRef<Path>) -> Explanation {
        let normalized = self.store.matcher().normalize(path);
        let candidate = normalized.candidate();

        if let Some(source) = self.ignored_by(&normalized, &candidate) {
            return Explanation {
                path: normalized.relative().to_string(),
                ignored_by: Some(source),
                matched_fragments: Vec::new(),
                rule_origins: IndexMap::new(),
                config: None,
            };
        }

        let mut provenance = Provenance::default();
        let config = self.fold(&normalized, &candidate, Some(&mut provenance));

        Explanation {
            path: normalized.relative().to_string(),
            ignored_by: None,
            matched_fragments: provenance.matched_fragments,
            rule_origins: provenance.rule_origins,
            config: Some(config),
        }
    }

    /// Fold the rules of every applicable fragment, left to right
    fn fold(
        &self,
        path: &NormalizedPath,
        candidate: &Candidate<'_>,
        mut provenance: Option<&mut Provenance>,
    ) -> EffectiveConfig {
        let mut rules = IndexMap::new();
        for fragment in self.store.fragments() {
            if !Self::applies(fragment, path, candidate) {
                continue;
            }
            if let Some(provenance) = provenance.as_deref_mut() {
                provenance.matched_fragments.push(fragment.index());
                for rule in fragment.rules().keys() {
                    provenance.rule_origins.insert(rule.clone(), fragment.index());
                }
            }
            for (rule, setting) in fragment.rules() {
                rules.insert(rule.clone(), setting.clone());
            }
        }
        EffectiveConfig { rules }
    }

    fn ignored_by(&self, path: &NormalizedPath, candidate: &Candidate<'_>) -> Option<IgnoreSource> {
        if path.is_outside_root() && self.store.ignores_outside_root() {
            return Some(IgnoreSource::OutsideRoot);
        }

        if let Some(pattern) = self
            .store
            .default_ignores()
            .and_then(|set| set.first_match(candidate))
        {
            return Some(IgnoreSource::DefaultIgnore {
                pattern: pattern.to_string(),
            });
        }

        self.store.fragments().iter().find_map(|fragment| {
            fragment
                .ignores()
                .and_then(|set| set.first_match(candidate))
                .map(|pattern| IgnoreSource::Fragment {
                    index: fragment.index(),
                    pattern: pattern.to_string(),
                })
        })
    }

    fn applies(fragment: &CompiledFragment, path: &NormalizedPath, candidate: &Candidate<'_>) -> bool {
        let applies = match fragment.files() {
            None => true,
            Some(files) => files.is_match(candidate),
        };
        trace!(
            "fragment #{} {} {}",
            fragment.index(),
            if applies { "applies to" } else { "skips" },
            path.relative()
        );
        applies
    }
}

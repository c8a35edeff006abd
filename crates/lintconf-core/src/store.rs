//! Validated, ordered fragment storage
//!
//! [`FragmentStore::load`] is the single validation point: every pattern is
//! compiled and every rule value is normalized here, so nothing downstream
//! can fail. A store is immutable after loading and can be shared across
//! worker threads without locking.

use crate::config::{ConfigFragment, ResolverOptions, RuleSetting};
use crate::glob::{GlobMatcher, PatternSet};
use crate::{ConfigError, Result};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// A fragment after validation, tagged with its declaration index
#[derive(Debug, Clone)]
pub struct CompiledFragment {
    index: usize,
    name: Option<String>,
    source: Option<PathBuf>,
    files: Option<PatternSet>,
    ignores: Option<PatternSet>,
    rules: IndexMap<String, RuleSetting>,
}

impl CompiledFragment {
    fn compile(index: usize, fragment: ConfigFragment) -> Result<Self> {
        let label = fragment.label(index);

        let files = match &fragment.files {
            Some(patterns) if patterns.is_empty() => {
                return Err(ConfigError::EmptyFiles { fragment: label });
            }
            Some(patterns) => Some(PatternSet::compile(patterns, &label)?),
            None => None,
        };

        let ignores = match &fragment.ignores {
            Some(patterns) if !patterns.is_empty() => Some(PatternSet::compile(patterns, &label)?),
            _ => None,
        };

        let mut rules = IndexMap::with_capacity(fragment.rules.len());
        for (rule, value) in &fragment.rules {
            if rule.is_empty() {
                return Err(ConfigError::InvalidRuleName { fragment: label });
            }
            rules.insert(rule.clone(), RuleSetting::parse(rule, &label, value)?);
        }

        Ok(Self {
            index,
            name: fragment.name,
            source: fragment.source,
            files,
            ignores,
            rules,
        })
    }

    /// Position in the declaration sequence
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn files(&self) -> Option<&PatternSet> {
        self.files.as_ref()
    }

    pub fn ignores(&self) -> Option<&PatternSet> {
        self.ignores.as_ref()
    }

    pub fn rules(&self) -> &IndexMap<String, RuleSetting> {
        &self.rules
    }

    /// Whether the fragment has no `files` scope
    pub fn applies_to_all(&self) -> bool {
        self.files.is_none()
    }
}

/// Ordered sequence of validated fragments for one resolution session
#[derive(Debug, Clone, Default)]
pub struct FragmentStore {
    fragments: Vec<CompiledFragment>,
    default_ignores: Option<PatternSet>,
    matcher: GlobMatcher,
    ignore_outside_root: bool,
}

impl FragmentStore {
    /// Validate `fragments` with default options
    pub fn load(fragments: Vec<ConfigFragment>) -> Result<Self> {
        Self::load_with_options(fragments, &ResolverOptions::default())
    }

    /// Validate `fragments`, failing on the first invalid pattern or rule
    pub fn load_with_options(
        fragments: Vec<ConfigFragment>,
        options: &ResolverOptions,
    ) -> Result<Self> {
        let default_ignores = if options.default_ignores.is_empty() {
            None
        } else {
            Some(PatternSet::compile(&options.default_ignores, "default ignores")?)
        };

        let fragments = fragments
            .into_iter()
            .enumerate()
            .map(|(index, fragment)| CompiledFragment::compile(index, fragment))
            .collect::<Result<Vec<_>>>()?;

        info!(
            "Loaded {} configuration fragment(s) for root '{}'",
            fragments.len(),
            options.root.display()
        );

        Ok(Self {
            fragments,
            default_ignores,
            matcher: GlobMatcher::new(&options.root),
            ignore_outside_root: options.ignore_outside_root,
        })
    }

    pub fn fragments(&self) -> &[CompiledFragment] {
        &self.fragments
    }

    pub fn get(&self, index: usize) -> Option<&CompiledFragment> {
        self.fragments.get(index)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn matcher(&self) -> &GlobMatcher {
        &self.matcher
    }

    pub fn default_ignores(&self) -> Option<&PatternSet> {
        self.default_ignores.as_ref()
    }

    pub fn ignores_outside_root(&self) -> bool {
        self.ignore_outside_root
    }
}

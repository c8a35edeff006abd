//! Resolver options

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ignore patterns applied by most lint hosts before any fragment
pub const STANDARD_IGNORES: &[&str] = &["**/node_modules/**", ".git/**"];

/// Session-wide settings that are not part of any fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolverOptions {
    /// Project root that patterns are relative to
    ///
    /// An empty root means input paths are already root-relative.
    #[schemars(description = "Project root all patterns are relative to")]
    pub root: PathBuf,

    /// Patterns ignored before any fragment is consulted
    #[schemars(description = "Ignore patterns evaluated before all fragments")]
    pub default_ignores: Vec<String>,

    /// Treat paths that escape the root as ignored
    #[schemars(description = "Ignore files that lie outside the project root")]
    pub ignore_outside_root: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            default_ignores: Vec::new(),
            ignore_outside_root: true,
        }
    }
}

impl ResolverOptions {
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Add [`STANDARD_IGNORES`] to the default ignores
    pub fn with_standard_ignores(mut self) -> Self {
        for pattern in STANDARD_IGNORES {
            if !self.default_ignores.iter().any(|p| p == pattern) {
                self.default_ignores.push((*pattern).to_string());
            }
        }
        self
    }

    pub fn with_default_ignores<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_ignores.extend(patterns.into_iter().map(Into::into));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ResolverOptions::default();
        assert!(options.root.as_os_str().is_empty());
        assert!(options.default_ignores.is_empty());
        assert!(options.ignore_outside_root);
    }

    #[test]
    fn test_standard_ignores_not_duplicated() {
        let options = ResolverOptions::default()
            .with_standard_ignores()
            .with_standard_ignores();
        assert_eq!(options.default_ignores.len(), STANDARD_IGNORES.len());
    }

    #[test]
    fn test_deserialize_camel_case_with_defaults() {
        let options: ResolverOptions =
            serde_json::from_str(r#"{"root": "/repo", "defaultIgnores": ["dist/**"]}"#).unwrap();
        assert_eq!(options.root, PathBuf::from("/repo"));
        assert_eq!(options.default_ignores, vec!["dist/**".to_string()]);
        assert!(options.ignore_outside_root);
    }
}

//! Glob matching for fragment scopes
//!
//! Patterns are compiled once with `globset` when a fragment sequence is
//! loaded, so matching never fails. The dialect:
//!
//! - `*` matches within a single path segment and never crosses `/`
//! - `**` matches any number of segments, including none (`src/**/*.ts`
//!   matches `src/a.ts`)
//! - `?`, character classes (`[a-z]`) and brace alternation (`{ts,tsx}`)
//! - a leading `./` or `/` anchors to the project root and is dropped
//! - a trailing `/` covers everything below a directory (`dist/` is `dist/**`)
//!
//! Matching is case-sensitive. Paths are normalized lexically before matching:
//! backslashes become `/`, `.` segments are dropped and `..` segments are
//! folded into their parent. No file system access happens here.

use crate::{ConfigError, Result};
use globset::{Candidate, Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use std::fmt;
use std::path::{Path, PathBuf};

/// A single compiled glob pattern
#[derive(Debug, Clone)]
pub struct GlobPattern {
    source: String,
    matcher: globset::GlobMatcher,
}

impl GlobPattern {
    /// Compile a pattern, naming `origin` (the owning fragment) in errors
    pub fn compile(pattern: &str, origin: &str) -> Result<Self> {
        let glob = build_glob(pattern, origin)?;
        Ok(Self {
            source: pattern.to_string(),
            matcher: glob.compile_matcher(),
        })
    }

    /// The pattern as written in the configuration
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Match against an already-normalized, root-relative path
    pub fn is_match(&self, path: &NormalizedPath) -> bool {
        self.matcher.is_match(path.relative())
    }
}

impl fmt::Display for GlobPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// An ordered set of patterns evaluated together
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<GlobPattern>,
    set: GlobSet,
}

impl PatternSet {
    /// Compile every pattern into one set, failing on the first bad pattern
    pub fn compile<S: AsRef<str>>(patterns: &[S], origin: &str) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        let mut compiled = Vec::with_capacity(patterns.len());

        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = build_glob(pattern, origin)?;
            compiled.push(GlobPattern {
                source: pattern.to_string(),
                matcher: glob.compile_matcher(),
            });
            builder.add(glob);
        }

        let set = builder
            .build()
            .map_err(|e| ConfigError::invalid_pattern(patterns_label(patterns), origin, e.to_string()))?;

        Ok(Self {
            patterns: compiled,
            set,
        })
    }

    /// Whether any pattern matches
    pub fn is_match(&self, candidate: &Candidate<'_>) -> bool {
        self.set.is_match_candidate(candidate)
    }

    /// The first pattern, in declaration order, that matches
    pub fn first_match(&self, candidate: &Candidate<'_>) -> Option<&GlobPattern> {
        self.set
            .matches_candidate(candidate)
            .into_iter()
            .min()
            .map(|index| &self.patterns[index])
    }

    pub fn patterns(&self) -> &[GlobPattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

fn patterns_label<S: AsRef<str>>(patterns: &[S]) -> String {
    patterns
        .iter()
        .map(|p| p.as_ref())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Rewrite a configured pattern into the `globset` dialect and compile it
fn build_glob(pattern: &str, origin: &str) -> Result<Glob> {
    if pattern.trim().is_empty() {
        return Err(ConfigError::invalid_pattern(pattern, origin, "pattern is empty"));
    }
    if pattern.starts_with('!') {
        return Err(ConfigError::invalid_pattern(
            pattern,
            origin,
            "negated patterns are not supported",
        ));
    }

    let mut rewritten = pattern;
    while let Some(rest) = rewritten.strip_prefix("./") {
        rewritten = rest;
    }
    let rewritten = rewritten.trim_start_matches('/');
    if rewritten.is_empty() {
        return Err(ConfigError::invalid_pattern(
            pattern,
            origin,
            "pattern names the project root itself",
        ));
    }

    let rewritten = if rewritten.ends_with('/') {
        format!("{rewritten}**")
    } else {
        rewritten.to_string()
    };

    GlobBuilder::new(&rewritten)
        .literal_separator(true)
        .backslash_escape(true)
        .case_insensitive(false)
        .empty_alternates(false)
        .build()
        .map_err(|e| ConfigError::invalid_pattern(pattern, origin, e.kind().to_string()))
}

/// A path prepared for matching and caching
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedPath {
    key: PathBuf,
    relative: String,
    outside_root: bool,
}

impl NormalizedPath {
    /// Cache key: the lexically normalized path joined onto the root
    pub fn key(&self) -> &Path {
        &self.key
    }

    /// Root-relative, `/`-separated path used for matching
    pub fn relative(&self) -> &str {
        &self.relative
    }

    /// Whether the path escapes the project root
    pub fn is_outside_root(&self) -> bool {
        self.outside_root
    }

    pub fn candidate(&self) -> Candidate<'_> {
        Candidate::new(&self.relative)
    }
}

/// Lexical view of a path: absolute marker plus folded segments
#[derive(Debug, Clone, Default)]
struct Segments {
    absolute: bool,
    parts: Vec<String>,
    /// `..` segments that climbed past the start of a relative path
    escapes: usize,
}

impl Segments {
    fn parse(raw: &str) -> Self {
        let unified = raw.replace('\\', "/");
        let absolute = unified.starts_with('/') || has_drive_prefix(&unified);
        let mut parts: Vec<String> = Vec::new();
        let mut escapes = 0;

        for segment in unified.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if parts.pop().is_none() && !absolute {
                        escapes += 1;
                    }
                }
                other => parts.push(other.to_string()),
            }
        }

        Self {
            absolute,
            parts,
            escapes,
        }
    }

    fn render(&self) -> String {
        let mut out = String::new();
        if self.absolute && !self.parts.first().is_some_and(|p| has_drive_prefix(p)) {
            out.push('/');
        }
        for _ in 0..self.escapes {
            out.push_str("../");
        }
        out.push_str(&self.parts.join("/"));
        out
    }
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Path normalizer and pattern matcher anchored at a project root
#[derive(Debug, Clone, Default)]
pub struct GlobMatcher {
    root: Segments,
}

impl GlobMatcher {
    /// Create a matcher for `root`; an empty root accepts relative paths only
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: Segments::parse(&root.as_ref().to_string_lossy()),
        }
    }

    pub fn root(&self) -> PathBuf {
        PathBuf::from(self.root.render())
    }

    /// Normalize `path` relative to the project root.
    ///
    /// Relative inputs are joined onto the root before folding, so every
    /// spelling of one file yields the same key, match path and root flag.
    /// A path is inside the root only if its folded form starts with the
    /// root's segments. Paths outside are matched by their full folded form.
    pub fn normalize(&self, path: impl AsRef<Path>) -> NormalizedPath {
        let input = Segments::parse(&path.as_ref().to_string_lossy());
        let base = self.root.render();
        let joined = if input.absolute || base.is_empty() {
            input
        } else {
            Segments::parse(&format!("{base}/{}", input.render()))
        };

        let under_root = joined.absolute == self.root.absolute
            && joined.escapes == self.root.escapes
            && joined.parts.starts_with(&self.root.parts);

        let relative = if under_root {
            joined.parts[self.root.parts.len()..].join("/")
        } else {
            joined.render()
        };

        NormalizedPath {
            key: PathBuf::from(joined.render()),
            relative,
            outside_root: !under_root,
        }
    }

    /// Whether `pattern` matches `path` once normalized against the root
    pub fn matches(&self, pattern: &GlobPattern, path: impl AsRef<Path>) -> bool {
        pattern.is_match(&self.normalize(path))
    }

    /// Whether any pattern of `set` matches `path`
    pub fn matches_any(&self, set: &PatternSet, path: impl AsRef<Path>) -> bool {
        let normalized = self.normalize(path);
        set.is_match(&normalized.candidate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(p: &str) -> GlobPattern {
        GlobPattern::compile(p, "test").unwrap()
    }

    fn matches(p: &str, path: &str) -> bool {
        GlobMatcher::default().matches(&pattern(p), path)
    }

    #[test]
    fn test_double_star_matches_zero_or_more_directories() {
        assert!(matches("src/**/*.ts", "src/a.ts"));
        assert!(matches("src/**/*.ts", "src/deep/nested/a.ts"));
        assert!(matches("**/*.ts", "a.ts"));
        assert!(matches("**/*.ts", "x/y/a.ts"));
        assert!(!matches("src/**/*.ts", "test/a.ts"));
    }

    #[test]
    fn test_single_star_does_not_cross_separator() {
        assert!(matches("src/*.ts", "src/a.ts"));
        assert!(!matches("src/*.ts", "src/nested/a.ts"));
        assert!(matches("*.js", "eslint.config.js"));
        assert!(!matches("*.js", "lib/index.js"));
    }

    #[test]
    fn test_question_mark_classes_and_braces() {
        assert!(matches("file?.ts", "file1.ts"));
        assert!(!matches("file?.ts", "file10.ts"));
        assert!(matches("v[0-9].ts", "v3.ts"));
        assert!(!matches("v[0-9].ts", "vx.ts"));
        assert!(matches("**/*.{ts,tsx}", "ui/button.tsx"));
        assert!(matches("**/*.{ts,tsx}", "ui/button.ts"));
        assert!(!matches("**/*.{ts,tsx}", "ui/button.js"));
    }

    #[test]
    fn test_case_sensitive() {
        assert!(!matches("src/**/*.ts", "SRC/a.ts"));
        assert!(!matches("**/*.ts", "a.TS"));
    }

    #[test]
    fn test_directory_and_anchor_shorthand() {
        assert!(matches("dist/", "dist/bundle.js"));
        assert!(matches("dist/", "dist/nested/chunk.js"));
        assert!(matches("./src/*.ts", "src/a.ts"));
        assert!(matches("/src/*.ts", "src/a.ts"));
    }

    #[test]
    fn test_path_separator_normalization() {
        assert!(matches("src/**/*.ts", "src\\nested\\a.ts"));
        assert!(matches("src/**/*.ts", "./src/./a.ts"));
        assert!(matches("src/**/*.ts", "lib/../src/a.ts"));
    }

    #[test]
    fn test_malformed_patterns_rejected() {
        for bad in ["src/[a", "{a,b", "", "   ", "!dist/**", "./"] {
            let err = GlobPattern::compile(bad, "fragment #3").unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidPattern { .. }),
                "expected InvalidPattern for {bad:?}"
            );
            assert!(err.to_string().contains("fragment #3"));
        }
    }

    #[test]
    fn test_normalize_relative_to_absolute_root() {
        let matcher = GlobMatcher::new("/repo/packages/core");

        let path = matcher.normalize("/repo/packages/core/src/index.ts");
        assert_eq!(path.relative(), "src/index.ts");
        assert_eq!(path.key(), Path::new("/repo/packages/core/src/index.ts"));
        assert!(!path.is_outside_root());

        let relative = matcher.normalize("src/./index.ts");
        assert_eq!(relative.key(), path.key());
        assert_eq!(relative.relative(), "src/index.ts");
    }

    #[test]
    fn test_normalize_outside_root() {
        let matcher = GlobMatcher::new("/repo/packages/core");
        assert!(matcher.normalize("/repo/packages/other/a.ts").is_outside_root());
        assert!(matcher.normalize("../other/a.ts").is_outside_root());
        assert_eq!(
            matcher.normalize("../other/a.ts").key(),
            Path::new("/repo/packages/other/a.ts")
        );
        assert!(GlobMatcher::default().normalize("/abs/a.ts").is_outside_root());
    }

    #[test]
    fn test_outside_paths_match_by_full_folded_path() {
        let matcher = GlobMatcher::new("/repo/packages/core");
        let path = matcher.normalize("../other/a.ts");
        assert_eq!(path.relative(), "/repo/packages/other/a.ts");
        assert!(!matcher.matches(&pattern("other/**"), "../other/a.ts"));

        let escaped = GlobMatcher::default().normalize("../x/a.ts");
        assert!(escaped.is_outside_root());
        assert_eq!(escaped.relative(), "../x/a.ts");
    }

    #[test]
    fn test_aliased_spellings_normalize_identically() {
        let matcher = GlobMatcher::new("/repo");
        let canonical = matcher.normalize("src/a.ts");
        for alias in [
            "../repo/src/a.ts",
            "/repo/src/a.ts",
            "src\\a.ts",
            "./lib/../src/./a.ts",
            "/repo/lib/../src/a.ts",
        ] {
            assert_eq!(matcher.normalize(alias), canonical, "{alias}");
        }
        assert!(!canonical.is_outside_root());
        assert_eq!(canonical.relative(), "src/a.ts");

        let relative_root = GlobMatcher::new("packages/core");
        assert_eq!(
            relative_root.normalize("../core/src/a.ts"),
            relative_root.normalize("src/a.ts")
        );
        assert!(relative_root.normalize("../../a.ts").is_outside_root());
    }

    #[test]
    fn test_pattern_set_first_match_in_declaration_order() {
        let set = PatternSet::compile(&["**/*.ts", "dist/**"], "test").unwrap();
        let path = GlobMatcher::default().normalize("dist/x.ts");
        let first = set.first_match(&path.candidate()).unwrap();
        assert_eq!(first.as_str(), "**/*.ts");
        assert!(set.is_match(&path.candidate()));

        let other = GlobMatcher::default().normalize("README.md");
        assert!(set.first_match(&other.candidate()).is_none());
        assert_eq!(set.len(), 2);
    }
}

//! Fragment data model
//!
//! A [`ConfigFragment`] is one partial configuration contribution as written
//! by a package or project author. Rule values stay in their wire form until
//! [`crate::FragmentStore::load`] validates them into [`RuleSetting`]s.

use crate::{ConfigError, Result};
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

/// One partial, ordered configuration contribution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigFragment {
    /// Optional display name used in errors and explanations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Name shown in errors and resolution explanations")]
    pub name: Option<String>,

    /// Scope patterns; absent means the fragment applies to every file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Glob patterns of files this fragment applies to")]
    pub files: Option<Vec<String>>,

    /// Patterns excluding matching files from all processing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Glob patterns of files excluded from linting entirely")]
    pub ignores: Option<Vec<String>>,

    /// Rule name to severity, `[severity, ...options]`, or legacy 0/1/2
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    #[schemars(description = "Rule settings: \"off\" | \"warn\" | \"error\", 0 | 1 | 2, or [severity, options...]")]
    pub rules: IndexMap<String, Value>,

    /// File the fragment was read from, when loaded from disk
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl ConfigFragment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty fragment with a display name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Restrict the fragment to files matching any of `patterns`
    pub fn with_files<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    /// Exclude files matching any of `patterns` from all processing
    pub fn with_ignores<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignores = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    /// Add or replace a rule setting in wire form
    pub fn with_rule(mut self, rule: impl Into<String>, setting: impl Into<Value>) -> Self {
        self.rules.insert(rule.into(), setting.into());
        self
    }

    /// Human-readable label for error messages
    pub fn label(&self, index: usize) -> String {
        let mut label = format!("fragment #{index}");
        if let Some(name) = &self.name {
            label.push_str(&format!(" ({name})"));
        }
        if let Some(source) = &self.source {
            label.push_str(&format!(" from {}", source.display()));
        }
        label
    }
}

/// Severity classification of a rule's enforcement level
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Disable the rule
    Off,
    /// Report without failing
    Warn,
    /// Report and fail
    Error,
}

impl Severity {
    /// Parse `"off" | "warn" | "error"` or the legacy numeric aliases `0 | 1 | 2`
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => match s.as_str() {
                "off" => Some(Severity::Off),
                "warn" => Some(Severity::Warn),
                "error" => Some(Severity::Error),
                _ => None,
            },
            Value::Number(n) => {
                let level = n
                    .as_u64()
                    .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))?;
                match level {
                    0 => Some(Severity::Off),
                    1 => Some(Severity::Warn),
                    2 => Some(Severity::Error),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Off => "off",
            Severity::Warn => "warn",
            Severity::Error => "error",
        }
    }

    /// Whether the rule runs at all
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Severity::Off)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated rule setting: severity plus an opaque options payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleSetting {
    pub severity: Severity,

    /// Rule-defined options, carried through unexamined
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

impl RuleSetting {
    pub fn new(severity: Severity) -> Self {
        Self {
            severity,
            options: None,
        }
    }

    pub fn off() -> Self {
        Self::new(Severity::Off)
    }

    pub fn warn() -> Self {
        Self::new(Severity::Warn)
    }

    pub fn error() -> Self {
        Self::new(Severity::Error)
    }

    pub fn with_options(mut self, options: Value) -> Self {
        self.options = Some(options);
        self
    }

    /// Validate a wire-form rule value.
    ///
    /// Accepts a bare severity or an array whose first element is the
    /// severity. A single trailing element becomes the options payload;
    /// several trailing elements are kept together as an array.
    pub fn parse(rule: &str, origin: &str, value: &Value) -> Result<Self> {
        let invalid = || ConfigError::invalid_severity(rule, origin, value.to_string());

        match value {
            Value::Array(items) => {
                let (first, rest) = items.split_first().ok_or_else(invalid)?;
                let severity = Severity::from_value(first).ok_or_else(invalid)?;
                let options = match rest {
                    [] => None,
                    [single] => Some(single.clone()),
                    many => Some(Value::Array(many.to_vec())),
                };
                Ok(Self { severity, options })
            }
            other => Severity::from_value(other)
                .map(Self::new)
                .ok_or_else(invalid),
        }
    }
}

impl From<Severity> for RuleSetting {
    fn from(severity: Severity) -> Self {
        Self::new(severity)
    }
}

impl From<RuleSetting> for Value {
    fn from(setting: RuleSetting) -> Self {
        let severity = Value::String(setting.severity.as_str().to_string());
        match setting.options {
            Some(options) => Value::Array(vec![severity, options]),
            None => severity,
        }
    }
}

impl From<Severity> for Value {
    fn from(severity: Severity) -> Self {
        Value::String(severity.as_str().to_string())
    }
}

/// Top-level shape of a configuration file
///
/// The shape is chosen from the document itself: an array is a fragment
/// list, an object with `extends` or `fragments` is layered, and any other
/// object is a single fragment. Errors then name the offending field.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum ConfigDocument {
    /// A bare ordered list of fragments
    List(Vec<ConfigFragment>),
    /// Imported documents followed by local fragments
    Layered(LayeredDocument),
    /// A single fragment object
    Single(ConfigFragment),
}

/// Configuration document that imports other documents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LayeredDocument {
    /// Documents whose fragments precede this document's own, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[schemars(description = "Paths of base configurations, relative to this file")]
    pub extends: Vec<String>,

    #[serde(default)]
    #[schemars(description = "Fragments declared by this document, lowest precedence first")]
    pub fragments: Vec<ConfigFragment>,
}

impl ConfigDocument {
    /// Interpret an already-parsed document
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        match &value {
            Value::Array(_) => serde_json::from_value(value).map(ConfigDocument::List),
            Value::Object(map) if map.contains_key("extends") || map.contains_key("fragments") => {
                serde_json::from_value(value).map(ConfigDocument::Layered)
            }
            _ => serde_json::from_value(value).map(ConfigDocument::Single),
        }
    }

    /// Split into `(extends, fragments)`
    pub fn into_parts(self) -> (Vec<String>, Vec<ConfigFragment>) {
        match self {
            ConfigDocument::List(fragments) => (Vec::new(), fragments),
            ConfigDocument::Layered(doc) => (doc.extends, doc.fragments),
            ConfigDocument::Single(fragment) => (Vec::new(), vec![fragment]),
        }
    }
}

impl<'de> Deserialize<'de> for ConfigDocument {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        ConfigDocument::from_value(value).map_err(de::Error::custom)
    }
}

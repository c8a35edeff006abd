//! Configuration documents and fragment data model
//!
//! A configuration is an ordered list of fragments. The position of a
//! fragment is its precedence: later fragments override earlier ones. A
//! shared base configuration is imported by listing it first, either
//! programmatically or through `extends`:
//!
//! ```jsonc
//! {
//!   "extends": ["../../shared/base.json"],
//!   "fragments": [
//!     {
//!       "ignores": ["node_modules/**"],
//!       "rules": {
//!         "@typescript-eslint/no-explicit-any": "off"
//!       }
//!     }
//!   ]
//! }
//! ```
//!
//! ## File formats
//!
//! - `lintconf.json` - Standard JSON
//! - `lintconf.jsonc` - JSON with comments and trailing commas
//! - `lintconf.yaml` / `lintconf.yml` - YAML
//! - `lintconf.toml` - TOML (object form only: `extends` + `[[fragments]]`)
//!
//! A document may also be a bare array of fragments or a single fragment
//! object.

mod fragment;
mod loader;
mod options;

pub use fragment::{ConfigDocument, ConfigFragment, LayeredDocument, RuleSetting, Severity};
pub use loader::{CONFIG_FILE_NAMES, ConfigLoader};
pub use options::{ResolverOptions, STANDARD_IGNORES};

/// JSON Schema describing a configuration document
pub fn config_schema() -> serde_json::Value {
    schemars::schema_for!(ConfigDocument).to_value()
}

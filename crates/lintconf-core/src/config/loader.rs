//! Configuration file discovery and loading

use super::fragment::{ConfigDocument, ConfigFragment};
use crate::{ConfigError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Config file names searched by [`ConfigLoader::auto_discover`], in priority order
pub const CONFIG_FILE_NAMES: &[&str] = &[
    "lintconf.json",
    "lintconf.jsonc",
    "lintconf.yaml",
    "lintconf.yml",
    "lintconf.toml",
];

/// Configuration loader for discovering and loading config files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Auto-discover a config file by traversing upward from `start_path`
    ///
    /// Starts from the given directory and moves up the directory tree until
    /// a config is found or the filesystem root is reached.
    pub fn auto_discover(start_path: &Path) -> Result<Option<PathBuf>> {
        let mut current = start_path
            .canonicalize()
            .map_err(|e| ConfigError::io_error(start_path, e))?;

        loop {
            for filename in CONFIG_FILE_NAMES {
                let config_path = current.join(filename);
                if config_path.is_file() {
                    debug!("Found config: {}", config_path.display());
                    return Ok(Some(config_path));
                }
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(None)
    }

    /// Load the flattened fragment sequence of a config file.
    ///
    /// Fragments of every `extends` entry come first, depth-first in the
    /// order listed, followed by the file's own fragments.
    pub fn load_from_file(path: &Path) -> Result<Vec<ConfigFragment>> {
        let mut chain = Vec::new();
        let mut fragments = Vec::new();
        Self::load_into(path, &mut chain, &mut fragments)?;
        info!(
            "Loaded {} fragment(s) from {}",
            fragments.len(),
            path.display()
        );
        Ok(fragments)
    }

    /// Load from an explicit path, or auto-discover starting at `start_dir`.
    ///
    /// When nothing is discovered the result is an empty sequence, which
    /// resolves every file to an empty rule set.
    pub fn load(custom_path: Option<&Path>, start_dir: Option<&Path>) -> Result<Vec<ConfigFragment>> {
        if let Some(path) = custom_path {
            return Self::load_from_file(path);
        }

        let search_dir = start_dir.unwrap_or_else(|| Path::new("."));
        match Self::auto_discover(search_dir)? {
            Some(path) => Self::load_from_file(&path),
            None => {
                info!(
                    "No config file found above {}, using an empty configuration",
                    search_dir.display()
                );
                Ok(Vec::new())
            }
        }
    }

    /// Parse document content, choosing the format from the file extension
    pub fn parse_document(content: &str, path: &Path) -> Result<ConfigDocument> {
        let ext = path.extension().and_then(|e| e.to_str());

        match ext {
            Some("json") => {
                serde_json::from_str(content).map_err(|e| ConfigError::parse_error(path, e))
            }
            Some("jsonc") | Some("json5") => {
                json5::from_str(content).map_err(|e| ConfigError::parse_error(path, e))
            }
            Some("yaml") | Some("yml") => {
                serde_yaml::from_str(content).map_err(|e| ConfigError::parse_error(path, e))
            }
            Some("toml") => toml::from_str(content).map_err(|e| ConfigError::parse_error(path, e)),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    fn load_into(
        path: &Path,
        chain: &mut Vec<PathBuf>,
        out: &mut Vec<ConfigFragment>,
    ) -> Result<()> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let canonical = path
            .canonicalize()
            .map_err(|e| ConfigError::io_error(path, e))?;

        if chain.contains(&canonical) {
            let cycle = chain
                .iter()
                .chain(std::iter::once(&canonical))
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(ConfigError::CircularExtends { chain: cycle });
        }

        debug!("Loading config document {}", canonical.display());
        let content = fs::read_to_string(&canonical).map_err(|e| ConfigError::io_error(path, e))?;
        let (extends, fragments) = Self::parse_document(&content, &canonical)?.into_parts();

        chain.push(canonical.clone());
        let base_dir = canonical.parent().unwrap_or_else(|| Path::new("."));
        for extend in &extends {
            let extend_path = Path::new(extend);
            let extend_path = if extend_path.is_absolute() {
                extend_path.to_path_buf()
            } else {
                base_dir.join(extend_path)
            };
            Self::load_into(&extend_path, chain, out)?;
        }
        chain.pop();

        out.extend(fragments.into_iter().map(|mut fragment| {
            fragment.source = Some(canonical.clone());
            fragment
        }));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_temp_config(dir: &Path, filename: &str, content: &str) -> PathBuf {
        let path = dir.join(filename);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_from_file_json_list() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_temp_config(
            temp_dir.path(),
            "lintconf.json",
            r#"[
                { "ignores": ["node_modules/**"] },
                { "rules": { "@typescript-eslint/no-explicit-any": "off" } }
            ]"#,
        );

        let fragments = ConfigLoader::load_from_file(&config_path).unwrap();
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].ignores, Some(vec!["node_modules/**".to_string()]));
        assert_eq!(
            fragments[1].rules["@typescript-eslint/no-explicit-any"],
            json!("off")
        );
        assert!(fragments[1].source.is_some());
    }

    #[test]
    fn test_load_from_file_jsonc() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_temp_config(
            temp_dir.path(),
            "lintconf.jsonc",
            r#"[
                // package overrides
                { "rules": { "no-console": ["warn", { "allow": ["error"] }], }, },
            ]"#,
        );

        let fragments = ConfigLoader::load_from_file(&config_path).unwrap();
        assert_eq!(fragments.len(), 1);
        assert_eq!(
            fragments[0].rules["no-console"],
            json!(["warn", { "allow": ["error"] }])
        );
    }

    #[test]
    fn test_load_from_file_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_temp_config(
            temp_dir.path(),
            "lintconf.yaml",
            "- files: [\"**/*.ts\"]\n  rules:\n    eqeqeq: 2\n",
        );

        let fragments = ConfigLoader::load_from_file(&config_path).unwrap();
        assert_eq!(fragments[0].files, Some(vec!["**/*.ts".to_string()]));
        assert_eq!(fragments[0].rules["eqeqeq"], json!(2));
    }

    #[test]
    fn test_load_from_file_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_temp_config(
            temp_dir.path(),
            "lintconf.toml",
            r#"
[[fragments]]
ignores = ["dist/**"]

[[fragments]]
files = ["src/**/*.ts"]

[fragments.rules]
eqeqeq = "error"
"#,
        );

        let fragments = ConfigLoader::load_from_file(&config_path).unwrap();
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[1].rules["eqeqeq"], json!("error"));
    }

    #[test]
    fn test_extends_flattens_base_first() {
        let temp_dir = TempDir::new().unwrap();
        let shared = temp_dir.path().join("shared");
        fs::create_dir_all(&shared).unwrap();
        create_temp_config(
            &shared,
            "base.json",
            r#"[{ "name": "base", "rules": { "no-explicit-any": "error", "semi": "warn" } }]"#,
        );
        let config_path = create_temp_config(
            temp_dir.path(),
            "lintconf.json",
            r#"{
                "extends": ["./shared/base.json"],
                "fragments": [{ "name": "local", "rules": { "no-explicit-any": "off" } }]
            }"#,
        );

        let fragments = ConfigLoader::load_from_file(&config_path).unwrap();
        let names: Vec<_> = fragments.iter().map(|f| f.name.as_deref()).collect();
        assert_eq!(names, vec![Some("base"), Some("local")]);
    }

    #[test]
    fn test_extends_cycle_detected() {
        let temp_dir = TempDir::new().unwrap();
        create_temp_config(temp_dir.path(), "a.json", r#"{ "extends": ["b.json"] }"#);
        let b = create_temp_config(temp_dir.path(), "b.json", r#"{ "extends": ["a.json"] }"#);

        let err = ConfigLoader::load_from_file(&b).unwrap_err();
        assert!(matches!(err, ConfigError::CircularExtends { .. }));
    }

    #[test]
    fn test_extends_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_config(
            temp_dir.path(),
            "lintconf.json",
            r#"{ "extends": ["missing.json"] }"#,
        );

        let err = ConfigLoader::load_from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_load_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_config(temp_dir.path(), "invalid.json", r#"{ invalid json }"#);

        let err = ConfigLoader::load_from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_misspelled_key_is_named_in_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_config(
            temp_dir.path(),
            "lintconf.yaml",
            "- rules:\n    eqeqeq: error\n- files: [\"src/**\"]\n  ignore: [\"src/gen/**\"]\n",
        );

        match ConfigLoader::load_from_file(&path).unwrap_err() {
            ConfigError::Parse { message, .. } => {
                assert!(message.contains("unknown field `ignore`"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unsupported_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_config(temp_dir.path(), "lintconf.ini", "[rules]");

        let err = ConfigLoader::load_from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_auto_discover_from_nested_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("packages/core/src");
        fs::create_dir_all(&nested).unwrap();
        create_temp_config(temp_dir.path(), "lintconf.yaml", "[]");

        let found = ConfigLoader::auto_discover(&nested).unwrap();
        assert_eq!(found.unwrap().file_name().unwrap(), "lintconf.yaml");
    }

    #[test]
    fn test_auto_discover_priority() {
        let temp_dir = TempDir::new().unwrap();
        create_temp_config(temp_dir.path(), "lintconf.toml", "fragments = []");
        create_temp_config(temp_dir.path(), "lintconf.json", "[]");

        let found = ConfigLoader::auto_discover(temp_dir.path()).unwrap();
        assert_eq!(found.unwrap().file_name().unwrap(), "lintconf.json");
    }
}

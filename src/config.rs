//! Optional `.lintkit.toml` configuration.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = ".lintkit.toml";

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub wikifmt: WikifmtConfig,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct WikifmtConfig {
    /// Glob patterns, matched against paths relative to each root
    pub exclude: Vec<String>,
}

impl Config {
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `path`. When `required` is false a missing file yields defaults.
    pub fn load(path: &Path, required: bool) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => {
                tracing::debug!("loaded config from {}", path.display());
                Self::parse(path, &text)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound && !required => {
                tracing::debug!("no config at {}, using defaults", path.display());
                Ok(Config::default())
            }
            Err(source) => Err(Error::ConfigRead {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_exclude_list() {
        let cfg = Config::parse(
            Path::new("x.toml"),
            "[wikifmt]\nexclude = [\"drafts/**\", \"*.tmp.md\"]\n",
        )
        .unwrap();
        assert_eq!(cfg.wikifmt.exclude, ["drafts/**", "*.tmp.md"]);
    }

    #[test]
    fn test_empty_file_is_default() {
        let cfg = Config::parse(Path::new("x.toml"), "").unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = Config::parse(Path::new("x.toml"), "[wikifmt]\nexclud = []\n").unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_missing_optional_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load(&dir.path().join(".lintkit.toml"), false).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn test_missing_required_file_is_error() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(&dir.path().join("custom.toml"), true).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }

    #[test]
    fn test_load_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".lintkit.toml");
        fs::write(&path, "[wikifmt]\nexclude = [\"archive/**\"]\n").unwrap();
        let cfg = Config::load(&path, true).unwrap();
        assert_eq!(cfg.wikifmt.exclude, ["archive/**"]);
    }
}

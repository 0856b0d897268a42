//! Optional YAML config file for assembly runs.
//!
//! Every field is optional; fields that are present override the built-in
//! defaults and are themselves overridden by command-line flags.
//!
//! # Example YAML
//!
//! ```yaml
//! root_dir: ./spec
//! index_file: ./spec/index.yml
//! out_file: ./dist/openapi.yml
//! indent: "  "
//! auto_gen_marker: "# Auto Generated"
//! quote_key_pattern: "^[0-9]"
//! relative_paths: true
//! openapi: true
//! ```

use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File-backed option overrides, merged with
/// [`Options::merge_file_config`](crate::Options::merge_file_config).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub root_dir: Option<PathBuf>,
    pub index_file: Option<PathBuf>,
    pub out_file: Option<PathBuf>,
    pub indent: Option<String>,
    pub auto_gen_marker: Option<String>,
    /// Regular expression for map keys that need quoting. Empty disables.
    pub quote_key_pattern: Option<String>,
    pub relative_paths: Option<bool>,
    pub openapi: Option<bool>,
}

impl FileConfig {
    /// Loads a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ConfigRead`] if the file cannot be opened, or
    /// [`ConfigError::ConfigParse`] if it is not a valid config document.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| ConfigError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(file);
        serde_yaml::from_reader(reader).map_err(|source| ConfigError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_partial() {
        let config: FileConfig = serde_yaml::from_str("openapi: true\n").unwrap();
        assert_eq!(config.openapi, Some(true));
        assert!(config.root_dir.is_none());
        assert!(config.indent.is_none());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result: Result<FileConfig, _> = serde_yaml::from_str("indentation: 4\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("yamlfrag.yml");
        std::fs::write(
            &path,
            "root_dir: spec\nout_file: dist/api.yml\nrelative_paths: false\n",
        )
        .unwrap();

        let config = FileConfig::load(&path).unwrap();
        assert_eq!(config.root_dir, Some(PathBuf::from("spec")));
        assert_eq!(config.out_file, Some(PathBuf::from("dist/api.yml")));
        assert_eq!(config.relative_paths, Some(false));
    }

    #[test]
    fn test_load_missing_file() {
        let err = FileConfig::load("/no/such/yamlfrag.yml").unwrap_err();
        assert!(matches!(err, ConfigError::ConfigRead { .. }));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("yamlfrag.yml");
        std::fs::write(&path, "openapi: [not, a, bool]\n").unwrap();

        let err = FileConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigParse { .. }));
    }
}

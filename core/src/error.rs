//! Error types for document assembly.
//!
//! Two tiers are kept apart: [`ConfigError`] covers problems with the
//! options a run was started with and is meant to be shown to the user as a
//! short message, while [`AssembleError`] covers everything that can go
//! wrong once resolution is under way.

use std::path::PathBuf;

use thiserror::Error;

/// Invalid or incomplete run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No root fragment directory was given.
    #[error("root fragment directory not specified")]
    MissingRootDir,

    /// The root fragment directory does not exist.
    #[error("root fragment directory not found {}", .0.display())]
    RootDirNotFound(PathBuf),

    /// No index fragment was given.
    #[error("yaml index file not specified")]
    MissingIndexFile,

    /// The index fragment does not exist.
    #[error("yaml index file not found {}", .0.display())]
    IndexFileNotFound(PathBuf),

    /// No output path was given.
    #[error("yaml output file not specified")]
    MissingOutFile,

    /// The indentation unit is empty.
    #[error("yaml indentation not specified")]
    EmptyIndent,

    /// The map-key quote pattern is not a valid regular expression.
    #[error("invalid map key quote pattern '{pattern}': {source}")]
    InvalidQuotePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The config file could not be read.
    #[error("failed to read config file '{}': {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid YAML for [`FileConfig`](crate::FileConfig).
    #[error("failed to parse config file '{}': {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Failure while assembling a document.
///
/// Any of these aborts the whole run; no partial output is written.
#[derive(Debug, Error)]
pub enum AssembleError {
    /// The run configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A referenced fragment could not be read.
    #[error("failed to read fragment '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A collection directory could not be scanned.
    #[error("failed to scan fragment directory '{}': {message}", .dir.display())]
    Scan { dir: PathBuf, message: String },

    /// A fragment references itself, directly or through other fragments.
    #[error("reference cycle detected: {chain}")]
    Cycle { chain: String },

    /// A generated file could not be written.
    #[error("failed to write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AssembleError {
    /// Returns `true` for errors caused by the run configuration rather than
    /// by the fragments themselves.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// Convenience alias for results with [`AssembleError`].
pub type Result<T> = std::result::Result<T, AssembleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_is_config() {
        let err = AssembleError::from(ConfigError::MissingOutFile);
        assert!(err.is_config());
        assert_eq!(err.to_string(), "yaml output file not specified");
    }

    #[test]
    fn test_read_error_message_names_path() {
        let err = AssembleError::Read {
            path: PathBuf::from("/frags/missing.yml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(!err.is_config());
        assert!(err.to_string().contains("/frags/missing.yml"));
    }
}

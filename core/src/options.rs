//! Run options for document assembly.
//!
//! [`Options`] carries everything a run needs: where the fragments live,
//! which fragment is the index, where the assembled document goes, and the
//! formatting policy used when collection files are synthesized. It is built
//! once (defaults, then an optional [`FileConfig`], then command-line
//! overrides) and never mutated while a run is in progress.
//!
//! # Examples
//!
//! ```
//! use yamlfrag_core::{CollectionStrategy, Options};
//!
//! let options = Options::new("fragments", "out/api.yml").with_openapi(true);
//! assert_eq!(options.indent, "  ");
//! assert!(options.needs_quotes("404"));
//! assert_eq!(
//!     options.strategy_for("fragments/paths".as_ref()),
//!     CollectionStrategy::OpenApiPaths
//! );
//! ```

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::collection::CollectionStrategy;
use crate::config::FileConfig;
use crate::error::ConfigError;

/// Indentation unit used when nothing else is configured.
pub const DEFAULT_INDENT: &str = "  ";

/// First line written into materialized collection files, and stripped from
/// raw fragments that start with it.
pub const DEFAULT_AUTO_GEN_MARKER: &str = "# Auto Generated";

/// Map keys matching this pattern are wrapped in single quotes.
pub const DEFAULT_QUOTE_KEY_PATTERN: &str = "^[0-9]";

/// Index fragment used when none is given.
pub const DEFAULT_INDEX_FILE: &str = "./index.yml";

/// Directory name that switches collections to OpenAPI path handling.
pub const OPENAPI_PATHS_DIR: &str = "paths";

/// Options for a single assembly run.
#[derive(Debug, Clone)]
pub struct Options {
    /// Root directory of the fragment tree.
    pub root_dir: PathBuf,
    /// Index fragment that references the rest of the tree.
    pub index_file: PathBuf,
    /// Where the assembled document is written.
    pub out_file: PathBuf,
    /// One level of YAML indentation.
    pub indent: String,
    /// Header line marking generated files. Empty disables stripping.
    pub auto_gen_marker: String,
    /// Map keys matching this pattern are single-quoted. `None` never quotes.
    pub quote_key_pattern: Option<Regex>,
    /// Use bare file names in synthesized `$ref`s instead of paths relative
    /// to [`root_dir`](Self::root_dir).
    pub relative_paths: bool,
    /// Enable OpenAPI key formatting and ordering for `paths` directories.
    pub openapi: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::new(),
            index_file: PathBuf::from(DEFAULT_INDEX_FILE),
            out_file: PathBuf::new(),
            indent: DEFAULT_INDENT.to_string(),
            auto_gen_marker: DEFAULT_AUTO_GEN_MARKER.to_string(),
            quote_key_pattern: Some(default_quote_key_pattern()),
            relative_paths: true,
            openapi: false,
        }
    }
}

fn default_quote_key_pattern() -> Regex {
    Regex::new(DEFAULT_QUOTE_KEY_PATTERN).expect("static regex must compile")
}

impl Options {
    /// Creates options with the given root directory and output file, and
    /// defaults for everything else.
    pub fn new(root_dir: impl Into<PathBuf>, out_file: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            out_file: out_file.into(),
            ..Self::default()
        }
    }

    pub fn with_index_file(mut self, index_file: impl Into<PathBuf>) -> Self {
        self.index_file = index_file.into();
        self
    }

    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    pub fn with_auto_gen_marker(mut self, marker: impl Into<String>) -> Self {
        self.auto_gen_marker = marker.into();
        self
    }

    pub fn with_relative_paths(mut self, relative_paths: bool) -> Self {
        self.relative_paths = relative_paths;
        self
    }

    pub fn with_openapi(mut self, openapi: bool) -> Self {
        self.openapi = openapi;
        self
    }

    /// Sets the map-key quote pattern. An empty pattern disables quoting.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidQuotePattern`] if `pattern` does not
    /// compile.
    pub fn with_quote_key_pattern(mut self, pattern: &str) -> Result<Self, ConfigError> {
        self.quote_key_pattern = if pattern.is_empty() {
            None
        } else {
            Some(
                Regex::new(pattern).map_err(|source| ConfigError::InvalidQuotePattern {
                    pattern: pattern.to_string(),
                    source,
                })?,
            )
        };
        Ok(self)
    }

    /// Overlays every field set in `config` onto these options.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidQuotePattern`] if the config carries a
    /// pattern that does not compile.
    pub fn merge_file_config(mut self, config: FileConfig) -> Result<Self, ConfigError> {
        if let Some(root_dir) = config.root_dir {
            self.root_dir = root_dir;
        }
        if let Some(index_file) = config.index_file {
            self.index_file = index_file;
        }
        if let Some(out_file) = config.out_file {
            self.out_file = out_file;
        }
        if let Some(indent) = config.indent {
            self.indent = indent;
        }
        if let Some(marker) = config.auto_gen_marker {
            self.auto_gen_marker = marker;
        }
        if let Some(relative_paths) = config.relative_paths {
            self.relative_paths = relative_paths;
        }
        if let Some(openapi) = config.openapi {
            self.openapi = openapi;
        }
        match config.quote_key_pattern {
            Some(pattern) => self.with_quote_key_pattern(&pattern),
            None => Ok(self),
        }
    }

    /// Picks the collection strategy for fragments listed from `dir`.
    ///
    /// OpenAPI handling applies only when OpenAPI mode is on and the
    /// directory itself is named `paths`.
    pub fn strategy_for(&self, dir: &Path) -> CollectionStrategy {
        let is_paths_dir = dir
            .file_name()
            .is_some_and(|name| name == OPENAPI_PATHS_DIR);
        if self.openapi && is_paths_dir {
            CollectionStrategy::OpenApiPaths
        } else {
            CollectionStrategy::Default
        }
    }

    /// Returns `true` if a synthesized map key must be single-quoted.
    pub fn needs_quotes(&self, key: &str) -> bool {
        self.quote_key_pattern
            .as_ref()
            .is_some_and(|re| re.is_match(key))
    }

    /// Resolves the index fragment path.
    ///
    /// Absolute paths are used as is. A relative path that exists from the
    /// current directory is taken from there, anything else is looked up
    /// under [`root_dir`](Self::root_dir).
    pub fn resolve_index_file(&self) -> PathBuf {
        let index_file = if self.index_file.as_os_str().is_empty() {
            Path::new(DEFAULT_INDEX_FILE)
        } else {
            self.index_file.as_path()
        };
        if index_file.is_absolute() || index_file.exists() {
            return index_file.to_path_buf();
        }
        self.root_dir.join(index_file)
    }

    /// Checks that all required options are present and point at something.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found, in the order root directory,
    /// index file, output file, indentation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.root_dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingRootDir);
        }
        if !self.root_dir.exists() {
            return Err(ConfigError::RootDirNotFound(self.root_dir.clone()));
        }
        let index_file = self.resolve_index_file();
        if index_file.as_os_str().is_empty() {
            return Err(ConfigError::MissingIndexFile);
        }
        if !index_file.exists() {
            return Err(ConfigError::IndexFileNotFound(index_file));
        }
        if self.out_file.as_os_str().is_empty() {
            return Err(ConfigError::MissingOutFile);
        }
        if self.indent.is_empty() {
            return Err(ConfigError::EmptyIndent);
        }
        Ok(())
    }
}

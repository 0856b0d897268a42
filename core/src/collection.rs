//! Collection synthesis.
//!
//! A file named `.map.yml` or `.list.yml` (or the `.yaml` variants) stands for
//! "every fragment in this directory". Its content on disk is never used:
//! whenever it is referenced, [`render`] scans the directory and produces a
//! map or list of `$ref`s to the sibling fragments.
//!
//! ```text
//! defs/
//!   .map.yml   ->  Error:
//!   Error.yml        $ref: ./Error.yml
//!   Pet.yml        Pet:
//!                    $ref: ./Pet.yml
//! ```
//!
//! Ordering and key formatting depend on a [`CollectionStrategy`] chosen per
//! directory by [`Options::strategy_for`](crate::Options::strategy_for).

use std::cmp::Ordering;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{AssembleError, Result};
use crate::options::Options;
use crate::paths;
use crate::source::FragmentSource;

static COLLECTION_FILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\.(map|list)\.ya?ml$").expect("static regex must compile")
});

/// Shape of a synthesized collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    /// `key: {$ref}` per fragment.
    Map,
    /// `- $ref` per fragment.
    List,
}

impl CollectionKind {
    /// Classifies a path by its file name.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use yamlfrag_core::CollectionKind;
    ///
    /// assert_eq!(CollectionKind::classify(Path::new("defs/.map.yml")), Some(CollectionKind::Map));
    /// assert_eq!(CollectionKind::classify(Path::new("defs/.list.yaml")), Some(CollectionKind::List));
    /// assert_eq!(CollectionKind::classify(Path::new("defs/map.yml")), None);
    /// ```
    pub fn classify(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        let caps = COLLECTION_FILE_RE.captures(name)?;
        match &caps[1] {
            "map" => Some(Self::Map),
            _ => Some(Self::List),
        }
    }
}

/// Returns `true` if `path` names a collection file.
pub fn is_collection_file(path: &Path) -> bool {
    CollectionKind::classify(path).is_some()
}

/// Ordering and key policy for one collection directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollectionStrategy {
    /// Keys are base file names, entries sorted by name.
    #[default]
    Default,
    /// OpenAPI `paths` directory: `pets_{petId}` becomes `/pets/{petId}` and
    /// fixed segments sort before templated ones sharing the same prefix.
    OpenApiPaths,
}

impl CollectionStrategy {
    /// Formats the map key for a fragment base name.
    ///
    /// # Examples
    ///
    /// ```
    /// use yamlfrag_core::CollectionStrategy;
    ///
    /// assert_eq!(CollectionStrategy::Default.format_key("pets_{petId}"), "pets_{petId}");
    /// assert_eq!(CollectionStrategy::OpenApiPaths.format_key("pets_{petId}"), "/pets/{petId}");
    /// assert_eq!(CollectionStrategy::OpenApiPaths.format_key("_pets"), "/pets");
    /// ```
    pub fn format_key(self, name: &str) -> String {
        match self {
            Self::Default => name.to_string(),
            Self::OpenApiPaths => {
                let key = name.replace('_', "/");
                if key.starts_with('/') {
                    key
                } else {
                    format!("/{key}")
                }
            }
        }
    }

    /// Compares two fragment base names.
    pub fn compare(self, a: &str, b: &str) -> Ordering {
        if self == Self::OpenApiPaths {
            let a_templated = a.ends_with('}');
            let b_templated = b.ends_with('}');
            // templated paths go last so they don't shadow fixed ones
            if a_templated != b_templated && path_prefix(a) == path_prefix(b) {
                return if a_templated {
                    Ordering::Greater
                } else {
                    Ordering::Less
                };
            }
        }
        collate(a, b)
    }
}

/// Everything before the last `_`, or nothing if there is none.
fn path_prefix(name: &str) -> &str {
    name.rfind('_').map_or("", |idx| &name[..idx])
}

/// Root-collation order of ASCII punctuation and symbols. All of them sort
/// before digits and letters.
const PUNCTUATION_ORDER: &str = "_-,;:!?.'\"()[]{}@*/\\&#%`^+<=>|~$";

/// Primary weight of a character: whitespace, then punctuation and symbols,
/// then digits, then letters regardless of case.
fn primary_weight(c: char) -> (u8, u32) {
    if c.is_whitespace() || c.is_control() {
        (0, c as u32)
    } else if let Some(idx) = PUNCTUATION_ORDER.find(c) {
        (1, idx as u32)
    } else if c.is_alphabetic() {
        let lower = c.to_lowercase().next().unwrap_or(c);
        (3, lower as u32)
    } else if c.is_numeric() {
        (2, c.to_digit(10).unwrap_or(c as u32))
    } else {
        // symbols outside ASCII follow the known ones
        (1, PUNCTUATION_ORDER.len() as u32 + c as u32)
    }
}

/// Locale-style ascending comparison.
///
/// Names are compared by primary weight first; among names equal at that
/// level lowercase sorts before uppercase at the first case difference, and
/// code-point order settles whatever is left.
fn collate(a: &str, b: &str) -> Ordering {
    a.chars()
        .map(primary_weight)
        .cmp(b.chars().map(primary_weight))
        .then_with(|| {
            a.chars()
                .map(char::is_uppercase)
                .cmp(b.chars().map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}

#[derive(Debug)]
struct Entry {
    path: PathBuf,
    name: String,
    file_name: String,
}

impl Entry {
    fn from_path(path: PathBuf) -> Option<Self> {
        let name = path.file_stem()?.to_string_lossy().into_owned();
        let file_name = path.file_name()?.to_string_lossy().into_owned();
        Some(Self {
            path,
            name,
            file_name,
        })
    }
}

/// Renders the content of a collection file from its directory.
///
/// Returns an empty string for paths that are not collection files.
///
/// # Errors
///
/// Returns [`AssembleError::Scan`] if the directory cannot be listed.
pub fn render(path: &Path, options: &Options, source: &dyn FragmentSource) -> Result<String> {
    let Some(kind) = CollectionKind::classify(path) else {
        return Ok(String::new());
    };
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let strategy = options.strategy_for(dir);

    let mut entries: Vec<Entry> = source
        .list_fragments(dir)?
        .into_iter()
        .filter_map(Entry::from_path)
        .collect();
    entries.sort_by(|a, b| strategy.compare(&a.name, &b.name));

    debug!(
        collection = %path.display(),
        ?kind,
        ?strategy,
        entries = entries.len(),
        "synthesizing collection"
    );

    let mut out = String::new();
    for entry in &entries {
        let ref_path = if options.relative_paths {
            entry.file_name.clone()
        } else {
            paths::relative_to(&entry.path, &options.root_dir)
        };
        match kind {
            CollectionKind::Map => {
                let mut key = strategy.format_key(&entry.name);
                if options.needs_quotes(&key) {
                    key = format!("'{key}'");
                }
                let _ = write!(out, "{key}:\n{}", options.indent);
            }
            CollectionKind::List => out.push_str("- "),
        }
        let _ = writeln!(out, "$ref: ./{ref_path}");
    }
    Ok(out)
}

/// Finds every collection file below `root`, sorted by path.
///
/// # Errors
///
/// Returns [`AssembleError::Scan`] if part of the tree cannot be read.
pub fn find_collection_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|err| AssembleError::Scan {
            dir: err
                .path()
                .map_or_else(|| root.to_path_buf(), Path::to_path_buf),
            message: err.to_string(),
        })?;
        if entry.file_type().is_file() && is_collection_file(entry.path()) {
            found.push(entry.into_path());
        }
    }
    found.sort();
    Ok(found)
}

/// Renders every collection file below the root directory and writes it
/// back to disk, headed by the auto-generated marker.
///
/// Returns the paths that were written.
///
/// # Errors
///
/// Returns [`AssembleError::Scan`] if a directory cannot be listed, or
/// [`AssembleError::Write`] if a file cannot be written.
pub fn write_collection_files(
    options: &Options,
    source: &dyn FragmentSource,
) -> Result<Vec<PathBuf>> {
    let files = find_collection_files(&options.root_dir)?;
    for path in &files {
        let body = render(path, options, source)?;
        let contents = if options.auto_gen_marker.is_empty() {
            body
        } else {
            format!("{}\n{body}", options.auto_gen_marker)
        };
        source
            .write_text(path, &contents)
            .map_err(|err| AssembleError::Write {
                path: path.clone(),
                source: err,
            })?;
        info!(path = %path.display(), "wrote collection file");
    }
    Ok(files)
}

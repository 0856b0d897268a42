//! Where fragments come from and where generated files go.
//!
//! The resolver and the collection synthesizer never touch the filesystem
//! directly; they go through a [`FragmentSource`]. [`FsSource`] is the real
//! implementation, [`MemorySource`] keeps everything in memory for tests and
//! embedding.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};

use crate::error::{AssembleError, Result};
use crate::paths;

/// Extensions recognized as YAML fragments.
pub const FRAGMENT_EXTENSIONS: [&str; 2] = ["yml", "yaml"];

/// File access needed to assemble a document.
pub trait FragmentSource {
    /// Reads a fragment as UTF-8 text.
    fn read_text(&self, path: &Path) -> io::Result<String>;

    /// Lists the fragment files directly inside `dir`.
    ///
    /// Hidden (dot-prefixed) files are not listed, so collection marker files
    /// never show up as entries of their own collection.
    fn list_fragments(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    /// Writes `text` to `path`, creating parent directories as needed.
    fn write_text(&self, path: &Path, text: &str) -> io::Result<()>;
}

/// Filesystem-backed [`FragmentSource`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl FragmentSource for FsSource {
    fn read_text(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn list_fragments(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let options = MatchOptions {
            require_literal_leading_dot: true,
            ..MatchOptions::new()
        };
        let escaped = Pattern::escape(&dir.to_string_lossy());

        let mut files = Vec::new();
        for ext in FRAGMENT_EXTENSIONS {
            let pattern = format!("{escaped}/*.{ext}");
            let matches =
                glob::glob_with(&pattern, options).map_err(|err| AssembleError::Scan {
                    dir: dir.to_path_buf(),
                    message: err.to_string(),
                })?;
            for entry in matches {
                let path = entry.map_err(|err| AssembleError::Scan {
                    dir: dir.to_path_buf(),
                    message: err.to_string(),
                })?;
                if path.is_file() {
                    files.push(path);
                }
            }
        }
        files.sort();
        Ok(files)
    }

    fn write_text(&self, path: &Path, text: &str) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, text)
    }
}

/// In-memory [`FragmentSource`] keyed by normalized path.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use yamlfrag_core::{FragmentSource, MemorySource};
///
/// let source = MemorySource::new()
///     .with_file("/spec/defs/Pet.yml", "type: object\n")
///     .with_file("/spec/defs/.map.yml", "");
///
/// let listed = source.list_fragments(Path::new("/spec/defs")).unwrap();
/// assert_eq!(listed, vec![Path::new("/spec/defs/Pet.yml").to_path_buf()]);
/// ```
#[derive(Debug, Default)]
pub struct MemorySource {
    files: RefCell<BTreeMap<PathBuf, String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file, builder style.
    pub fn with_file(self, path: impl AsRef<Path>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    /// Adds or replaces a file.
    pub fn insert(&self, path: impl AsRef<Path>, text: impl Into<String>) {
        self.files
            .borrow_mut()
            .insert(paths::normalize(path.as_ref()), text.into());
    }

    /// Returns the current contents of a file, if present.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files
            .borrow()
            .get(&paths::normalize(path.as_ref()))
            .cloned()
    }

    /// Returns `true` if the file is present.
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.files
            .borrow()
            .contains_key(&paths::normalize(path.as_ref()))
    }
}

impl FragmentSource for MemorySource {
    fn read_text(&self, path: &Path) -> io::Result<String> {
        self.get(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such fragment: {}", path.display()),
            )
        })
    }

    fn list_fragments(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let dir = paths::normalize(dir);
        let files = self.files.borrow();
        Ok(files
            .keys()
            .filter(|path| path.parent() == Some(dir.as_path()))
            .filter(|path| is_listed_fragment(path))
            .cloned()
            .collect())
    }

    fn write_text(&self, path: &Path, text: &str) -> io::Result<()> {
        self.insert(path, text);
        Ok(())
    }
}

fn is_listed_fragment(path: &Path) -> bool {
    let visible = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| !name.starts_with('.'));
    let yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| FRAGMENT_EXTENSIONS.contains(&ext));
    visible && yaml
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_list_fragments_skips_hidden_and_other_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["Pet.yml", "Error.yaml", ".map.yml", ".list.yaml", "notes.txt"] {
            std::fs::write(dir.path().join(name), "a: b\n").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.yml")).unwrap();

        let files = FsSource.list_fragments(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["Error.yaml", "Pet.yml"]);
    }

    #[test]
    fn test_fs_list_fragments_escapes_dir_name() {
        let dir = tempfile::tempdir().unwrap();
        let odd = dir.path().join("[v1]");
        std::fs::create_dir(&odd).unwrap();
        std::fs::write(odd.join("Pet.yml"), "a: b\n").unwrap();

        let files = FsSource.list_fragments(&odd).unwrap();
        assert_eq!(files, vec![odd.join("Pet.yml")]);
    }

    #[test]
    fn test_fs_write_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/nested/api.yml");
        FsSource.write_text(&path, "openapi: 3.0.0\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "openapi: 3.0.0\n");
    }

    #[test]
    fn test_memory_read_missing_is_not_found() {
        let err = MemorySource::new()
            .read_text(Path::new("/spec/missing.yml"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_memory_paths_are_normalized() {
        let source = MemorySource::new().with_file("/spec/./defs/../defs/Pet.yml", "x: 1\n");
        assert!(source.contains("/spec/defs/Pet.yml"));
        assert_eq!(
            source.read_text(Path::new("/spec/paths/../defs/Pet.yml")).unwrap(),
            "x: 1\n"
        );
    }

    #[test]
    fn test_memory_list_is_not_recursive() {
        let source = MemorySource::new()
            .with_file("/spec/defs/Pet.yml", "")
            .with_file("/spec/defs/inner/Deep.yml", "")
            .with_file("/spec/index.yml", "");
        let files = source.list_fragments(Path::new("/spec/defs")).unwrap();
        assert_eq!(files, vec![PathBuf::from("/spec/defs/Pet.yml")]);
    }
}

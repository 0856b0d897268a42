//! Recursive `$ref` inlining.
//!
//! [`Resolver`] walks a fragment's reference lines in document order. Each
//! reference is loaded (synthesized when it names a collection file),
//! re-indented to the position of the reference, resolved recursively
//! against its own directory, and spliced in at the exact span of the
//! reference line. Splicing is positional: every reference line is replaced
//! where it was found, so two identical lines each get their own copy and a
//! reference can never be substituted inside a different line that happens
//! to contain the same text.
//!
//! Per-run state lives in a [`ResolveContext`]: the fragment cache and the
//! chain of fragments currently being expanded, which turns reference
//! cycles into a [`AssembleError::Cycle`] instead of unbounded recursion.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::collection::{self, CollectionKind};
use crate::error::{AssembleError, Result};
use crate::options::Options;
use crate::reference::find_references;
use crate::source::FragmentSource;

/// State of one top-level resolution run.
#[derive(Debug, Default)]
pub struct ResolveContext {
    cache: HashMap<PathBuf, String>,
    active: Vec<PathBuf>,
}

impl ResolveContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a run whose root text was loaded from `path`, so references
    /// back to the root are reported as cycles.
    pub fn with_root(path: impl Into<PathBuf>) -> Self {
        Self {
            cache: HashMap::new(),
            active: vec![path.into()],
        }
    }

    /// Number of distinct fragments loaded so far.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Returns `true` if `path` has been loaded in this run.
    pub fn is_cached(&self, path: &Path) -> bool {
        self.cache.contains_key(path)
    }

    fn enter(&mut self, path: &Path) -> Result<()> {
        if self.active.iter().any(|p| p == path) {
            let chain = self
                .active
                .iter()
                .chain(std::iter::once(&path.to_path_buf()))
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(AssembleError::Cycle { chain });
        }
        self.active.push(path.to_path_buf());
        Ok(())
    }

    fn leave(&mut self) {
        self.active.pop();
    }
}

/// Inlines `$ref`s using one set of options and one fragment source.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use yamlfrag_core::{MemorySource, Options, Resolver};
///
/// let source = MemorySource::new()
///     .with_file("/spec/defs/Pet.yml", "type: object\n")
///     .with_file("/spec/defs/Error.yml", "type: string\n");
/// let options = Options::new("/spec", "/out/api.yml");
/// let resolver = Resolver::new(&options, &source);
///
/// let doc = resolver
///     .resolve("definitions:\n  $ref: ./defs/.map.yml\n", Path::new("/spec"))
///     .unwrap();
/// assert_eq!(
///     doc,
///     "definitions:\n  Error:\n    type: string\n  Pet:\n    type: object\n"
/// );
/// ```
pub struct Resolver<'a> {
    options: &'a Options,
    source: &'a dyn FragmentSource,
}

impl<'a> Resolver<'a> {
    pub fn new(options: &'a Options, source: &'a dyn FragmentSource) -> Self {
        Self { options, source }
    }

    /// Resolves every reference in `text`, a fragment located in `dir`,
    /// with a fresh [`ResolveContext`].
    ///
    /// # Errors
    ///
    /// Returns [`AssembleError::Read`] if a referenced fragment cannot be
    /// read, [`AssembleError::Scan`] if a collection directory cannot be
    /// listed, or [`AssembleError::Cycle`] if fragments reference each other.
    pub fn resolve(&self, text: &str, dir: &Path) -> Result<String> {
        let mut ctx = ResolveContext::new();
        self.resolve_in(&mut ctx, text, dir)
    }

    /// Resolves every reference in `text` within an existing run.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve).
    pub fn resolve_in(&self, ctx: &mut ResolveContext, text: &str, dir: &Path) -> Result<String> {
        let references = find_references(text);
        if references.is_empty() {
            return Ok(text.to_string());
        }

        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for reference in references {
            out.push_str(&text[cursor..reference.span.start]);
            cursor = reference.span.end;

            let target = reference.target(dir);
            debug!(
                from = %dir.display(),
                target = %target.display(),
                list = reference.is_list,
                "resolving reference"
            );
            let fragment = self.load(ctx, &target)?;
            let block = reference.indent_block(&fragment, &self.options.indent);
            let target_dir = target.parent().unwrap_or_else(|| Path::new("."));

            ctx.enter(&target)?;
            let resolved = self.resolve_in(ctx, &block, target_dir);
            ctx.leave();
            out.push_str(&resolved?);
        }
        out.push_str(&text[cursor..]);
        Ok(out)
    }

    /// Loads a fragment through the run cache.
    ///
    /// Collection files are synthesized; anything else is read and has a
    /// leading auto-generated marker line removed.
    pub fn load(&self, ctx: &mut ResolveContext, path: &Path) -> Result<String> {
        if let Some(text) = ctx.cache.get(path) {
            trace!(path = %path.display(), "fragment cache hit");
            return Ok(text.clone());
        }

        let text = match CollectionKind::classify(path) {
            Some(_) => collection::render(path, self.options, self.source)?,
            None => {
                let raw = self
                    .source
                    .read_text(path)
                    .map_err(|err| AssembleError::Read {
                        path: path.to_path_buf(),
                        source: err,
                    })?;
                strip_marker(&raw, &self.options.auto_gen_marker).to_string()
            }
        };
        ctx.cache.insert(path.to_path_buf(), text.clone());
        Ok(text)
    }
}

/// Drops the first line of `text` if it is exactly `marker`.
fn strip_marker<'t>(text: &'t str, marker: &str) -> &'t str {
    if marker.is_empty() {
        return text;
    }
    let (first, rest) = text.split_once('\n').unwrap_or((text, ""));
    if first.strip_suffix('\r').unwrap_or(first) == marker {
        rest
    } else {
        text
    }
}

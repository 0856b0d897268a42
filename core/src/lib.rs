//! Assemble one YAML document from a tree of fragment files.
//!
//! Large specification documents (OpenAPI schemas in particular) are easier
//! to maintain as many small files. This crate stitches them back together:
//! starting from an index fragment, every line of the form
//!
//! ```text
//! <indent>[- ]$ref: ./relative/path.yml
//! ```
//!
//! is replaced by the referenced file's content, re-indented to where the
//! reference stood, with nested references resolved recursively. Nothing is
//! parsed as YAML; resolution is purely textual.
//!
//! - [`Resolver`] - recursive `$ref` inlining with a per-run
//!   [`ResolveContext`] (fragment cache and cycle detection).
//! - [`collection`] - synthesis of `.map.yml` / `.list.yml` collection files
//!   that stand for "every fragment in this directory", including the
//!   OpenAPI `paths` key and ordering policy ([`CollectionStrategy`]).
//! - [`Options`] / [`FileConfig`] - run configuration and validation.
//! - [`FragmentSource`] - the file I/O seam, with [`FsSource`] and
//!   [`MemorySource`] implementations.
//! - [`assemble`] / [`render_document`] - end-to-end runs.
//!
//! # Example
//!
//! ```
//! use yamlfrag_core::{MemorySource, Options, render_document};
//!
//! let source = MemorySource::new()
//!     .with_file(
//!         "/spec/index.yml",
//!         "swagger: '2.0'\npaths:\n  $ref: ./paths/.map.yml\n",
//!     )
//!     .with_file("/spec/paths/pets.yml", "get:\n  summary: List pets\n")
//!     .with_file("/spec/paths/pets_{petId}.yml", "get:\n  summary: Show pet\n");
//!
//! let options = Options::new("/spec", "/dist/api.yml")
//!     .with_index_file("/spec/index.yml")
//!     .with_openapi(true);
//!
//! let doc = render_document(&options, &source).unwrap();
//! assert_eq!(
//!     doc,
//!     "swagger: '2.0'
//! paths:
//!   /pets:
//!     get:
//!       summary: List pets
//!   /pets/{petId}:
//!     get:
//!       summary: Show pet
//! "
//! );
//! ```

mod assemble;
pub mod collection;
mod config;
mod error;
mod options;
pub mod paths;
mod reference;
mod resolver;
mod source;

pub use assemble::{absolutize_options, assemble, render_document};
pub use collection::{
    CollectionKind, CollectionStrategy, find_collection_files, is_collection_file,
    write_collection_files,
};
pub use config::FileConfig;
pub use error::{AssembleError, ConfigError, Result};
pub use options::{
    DEFAULT_AUTO_GEN_MARKER, DEFAULT_INDENT, DEFAULT_INDEX_FILE, DEFAULT_QUOTE_KEY_PATTERN,
    OPENAPI_PATHS_DIR, Options,
};
pub use reference::{Reference, find_references};
pub use resolver::{ResolveContext, Resolver};
pub use source::{FRAGMENT_EXTENSIONS, FragmentSource, FsSource, MemorySource};

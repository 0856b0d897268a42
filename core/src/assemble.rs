//! Whole-document assembly: load the index, resolve it, write the result.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{AssembleError, Result};
use crate::options::Options;
use crate::paths;
use crate::resolver::{ResolveContext, Resolver};
use crate::source::FragmentSource;

/// Returns `options` with root directory, index file and output file made
/// absolute, so cache keys and root-relative `$ref`s agree on one form.
///
/// # Errors
///
/// Returns [`AssembleError::Read`] if the current directory is needed and
/// cannot be determined.
pub fn absolutize_options(options: &Options) -> Result<Options> {
    let index_file = options.resolve_index_file();
    Ok(Options {
        root_dir: absolute(&options.root_dir)?,
        index_file: absolute(&index_file)?,
        out_file: absolute(&options.out_file)?,
        ..options.clone()
    })
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Ok(PathBuf::new());
    }
    paths::absolutize(path).map_err(|err| AssembleError::Read {
        path: path.to_path_buf(),
        source: err,
    })
}

/// Resolves the index fragment named by `options` and returns the
/// assembled document without writing it.
///
/// # Errors
///
/// Returns [`AssembleError::Read`] if the index or any referenced fragment
/// cannot be read, plus any error raised by the [`Resolver`].
pub fn render_document(options: &Options, source: &dyn FragmentSource) -> Result<String> {
    let options = absolutize_options(options)?;
    let index = &options.index_file;
    let text = source
        .read_text(index)
        .map_err(|err| AssembleError::Read {
            path: index.clone(),
            source: err,
        })?;
    let dir = index.parent().unwrap_or_else(|| Path::new("/"));

    let mut ctx = ResolveContext::with_root(index.clone());
    let document = Resolver::new(&options, source).resolve_in(&mut ctx, &text, dir)?;
    info!(
        index = %index.display(),
        fragments = ctx.cached_len(),
        "assembled document"
    );
    Ok(document)
}

/// Validates `options`, assembles the document and writes it to the output
/// file. Nothing is written if any step fails.
///
/// Returns the path that was written.
///
/// # Errors
///
/// Returns [`AssembleError::Config`] for invalid options,
/// [`AssembleError::Write`] if the output cannot be written, plus anything
/// [`render_document`] can return.
pub fn assemble(options: &Options, source: &dyn FragmentSource) -> Result<PathBuf> {
    options.validate()?;
    let document = render_document(options, source)?;
    let out_file = absolute(&options.out_file)?;
    source
        .write_text(&out_file, &document)
        .map_err(|err| AssembleError::Write {
            path: out_file.clone(),
            source: err,
        })?;
    info!(out = %out_file.display(), bytes = document.len(), "wrote document");
    Ok(out_file)
}

use std::error::Error as _;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use yamlfrag_core::{
    AssembleError, FileConfig, FsSource, Options, assemble, write_collection_files,
};

#[derive(Debug, Parser)]
#[command(name = "yamlfrag")]
#[command(version)]
#[command(about = "Assemble one YAML document from $ref-linked fragment files")]
struct Cli {
    /// Root directory of your fragments.
    #[arg(short = 'd', long)]
    root_dir: Option<PathBuf>,
    /// Index document which references fragments (default: ./index.yml).
    #[arg(short = 'i', long)]
    index_file: Option<PathBuf>,
    /// Output file of the grouped fragments.
    #[arg(short = 'o', long)]
    out_file: Option<PathBuf>,
    /// OpenAPI fragment processing for `paths` collections.
    #[arg(long)]
    openapi: bool,
    /// Number of spaces per indentation level.
    #[arg(long)]
    indent: Option<usize>,
    /// YAML config file providing defaults for any of these options.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write `$ref`s in generated collections relative to the root
    /// directory instead of the collection's own directory.
    #[arg(long)]
    absolute_refs: bool,
    /// Write every `.map.yml` / `.list.yml` under the root directory to disk
    /// before assembling.
    #[arg(long)]
    write_collections: bool,
    /// Log each resolved reference to stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(out_file) => {
            println!("Generated '{}'", out_file.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "yamlfrag=debug,yamlfrag_core=debug"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<PathBuf, AssembleError> {
    let options = build_options(&cli)?;
    let source = FsSource;

    if cli.write_collections {
        options.validate()?;
        let written = write_collection_files(&options, &source)?;
        tracing::info!(count = written.len(), "wrote collection files");
    }

    assemble(&options, &source)?;
    Ok(options.out_file)
}

/// Defaults, then the config file, then command-line flags.
fn build_options(cli: &Cli) -> Result<Options, AssembleError> {
    let mut options = Options::default();
    if let Some(path) = &cli.config {
        options = options.merge_file_config(FileConfig::load(path)?)?;
    }
    if let Some(root_dir) = &cli.root_dir {
        options.root_dir = root_dir.clone();
    }
    if let Some(index_file) = &cli.index_file {
        options.index_file = index_file.clone();
    }
    if let Some(out_file) = &cli.out_file {
        options.out_file = out_file.clone();
    }
    if let Some(width) = cli.indent {
        options.indent = " ".repeat(width);
    }
    if cli.openapi {
        options.openapi = true;
    }
    if cli.absolute_refs {
        options.relative_paths = false;
    }
    Ok(options)
}

/// Configuration problems get a one-line message; anything else is
/// unexpected and printed with its full cause chain.
fn report(err: &AssembleError) {
    if err.is_config() {
        eprintln!("error: {err}");
        return;
    }
    eprintln!("Unexpected error generating yaml document");
    eprintln!("  {err}");
    let mut cause = err.source();
    while let Some(inner) = cause {
        eprintln!("  caused by: {inner}");
        cause = inner.source();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "yamlfrag",
            "-d",
            "spec",
            "-o",
            "dist/api.yml",
            "--openapi",
            "--indent",
            "4",
            "--absolute-refs",
        ]);
        let options = build_options(&cli).unwrap();
        assert_eq!(options.root_dir, PathBuf::from("spec"));
        assert_eq!(options.out_file, PathBuf::from("dist/api.yml"));
        assert_eq!(options.index_file, PathBuf::from("./index.yml"));
        assert_eq!(options.indent, "    ");
        assert!(options.openapi);
        assert!(!options.relative_paths);
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("yamlfrag.yml");
        std::fs::write(&config, "root_dir: from-config\nout_file: config.yml\nopenapi: true\n")
            .unwrap();

        let cli = Cli::parse_from([
            "yamlfrag",
            "--config",
            config.to_str().unwrap(),
            "-o",
            "flag.yml",
        ]);
        let options = build_options(&cli).unwrap();
        assert_eq!(options.root_dir, PathBuf::from("from-config"));
        assert_eq!(options.out_file, PathBuf::from("flag.yml"));
        assert!(options.openapi);
    }

    #[test]
    fn test_missing_config_file_is_config_error() {
        let cli = Cli::parse_from(["yamlfrag", "--config", "/no/such/yamlfrag.yml"]);
        let err = build_options(&cli).unwrap_err();
        assert!(err.is_config());
    }
}

//! The `twig-ast` Command-Line Interface.
//!
//! This module is the entry point for all CLI commands. It reads templates
//! from disk, runs the [`Normalizer`] and hands results to [`output`].

use std::{fs, path::Path, process};

use clap::Parser;
use miette::Report;
use tracing_subscriber::EnvFilter;

use crate::cli::args::{Command, TwigAstArgs};
use crate::{err_msg, NormalizeOptions, Normalizer, TemplateError};

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    init_tracing();
    let args = TwigAstArgs::parse();

    let result = match args.command {
        Command::Ast {
            file,
            no_locations,
            compact,
            max_depth,
        } => handle_ast(
            &file,
            NormalizeOptions {
                locations: !no_locations,
                max_depth,
            },
            compact,
        ),
        Command::Check { file, max_depth } => handle_check(
            &file,
            NormalizeOptions {
                max_depth,
                ..NormalizeOptions::default()
            },
        ),
    };

    if let Err(e) = result {
        eprintln!("{:?}", Report::new(e));
        process::exit(1);
    }
}

/// Logs go to stderr; `RUST_LOG` selects the level, `warn` by default.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Handles the `ast` subcommand.
fn handle_ast(path: &Path, options: NormalizeOptions, compact: bool) -> Result<(), TemplateError> {
    let source = read_template(path)?;
    let template = Normalizer::new(options).parse(&source)?;
    output::print_json(&template, compact)
}

/// Handles the `check` subcommand.
fn handle_check(path: &Path, options: NormalizeOptions) -> Result<(), TemplateError> {
    let source = read_template(path)?;
    let normalized = Normalizer::new(options).parse_with_report(&source)?;
    output::print_summary(&normalized);
    Ok(())
}

fn read_template(path: &Path) -> Result<String, TemplateError> {
    fs::read_to_string(path).map_err(|e| {
        err_msg!(Io, "cannot read {}", path.display())
            .with_cause(e)
            .with_help("check that the file exists and is readable")
    })
}

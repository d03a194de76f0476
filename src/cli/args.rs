//! Defines the command-line arguments and subcommands for the `twig-ast` CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "twig-ast",
    version,
    about = "Normalizes Twig + HTML + Vue templates into a nested AST."
)]
pub struct TwigAstArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the normalized AST of a template as JSON.
    Ast {
        /// The path to the template file to parse.
        #[arg(required = true)]
        file: PathBuf,
        /// Omit `loc` from every node.
        #[arg(long)]
        no_locations: bool,
        /// Print the JSON on a single line.
        #[arg(long)]
        compact: bool,
        /// Deepest element or directive nesting kept in the tree.
        #[arg(long, default_value_t = 256)]
        max_depth: usize,
    },
    /// Summarize node counts and dropped constructs of a template.
    Check {
        /// The path to the template file to check.
        #[arg(required = true)]
        file: PathBuf,
        /// Deepest element or directive nesting kept in the tree.
        #[arg(long, default_value_t = 256)]
        max_depth: usize,
    },
}

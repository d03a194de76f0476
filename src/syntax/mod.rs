//! Syntax layer: the CST Provider and the Location Extractor.

pub mod location;
pub mod parser;

pub use location::{LineIndex, Point};
pub use parser::{fold_tag_names, parse_cst, Rule, TemplateGrammar};

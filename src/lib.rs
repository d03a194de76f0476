//! Parses Twig + HTML + Vue-interpolation templates into a normalized AST.
//!
//! The pipeline has two stages: a PEG grammar produces a concrete syntax
//! tree ([`syntax`]), and the [`Normalizer`] folds it into a [`Template`]
//! whose `{% block %}` and `{% if %}` directives own the nodes between their
//! open and close markers.
//!
//! ```rust
//! let template = twig_ast::parse("<p class=\"test\">Hello</p>").unwrap();
//! let p = template.children[0].as_element().unwrap();
//! assert_eq!(p.name, "p");
//! assert_eq!(p.attribute("class").unwrap().value.as_deref(), Some("test"));
//! ```

pub use crate::ast::{Node, Template};
pub use crate::diagnostics::{ErrorContext, TemplateError};
pub use crate::normalize::{parse, DropReason, Dropped, NormalizeOptions, Normalized, Normalizer};

pub mod ast;
pub mod cli;
pub mod diagnostics;
pub mod normalize;
pub mod syntax;

//! Normalizer
//!
//! Turns the CST of a template into the normalized [`Template`] tree. Each
//! scope (the document root and every element's children) is classified node
//! by node into events, which the nesting builder then folds into directive
//! subtrees.
//!
//! ```rust
//! use twig_ast::Normalizer;
//!
//! let template = Normalizer::default().parse("{% block a %}Hi{% endblock %}").unwrap();
//! let block = template.children[0].as_directive().unwrap();
//! assert_eq!(block.block_name(), Some("a"));
//! assert_eq!(block.children()[0].text(), Some("Hi"));
//! ```

use pest::iterators::Pair;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ast::{Location, Node, Template};
use crate::diagnostics::TemplateError;
use crate::syntax::{fold_tag_names, parse_cst, LineIndex, Rule};

mod classify;
mod element;
mod nesting;

use nesting::Scope;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Options controlling the produced tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    /// Attach a `loc` to every node. When false, all locations are omitted.
    pub locations: bool,
    /// Maximum number of nested elements and directives. Deeper elements are
    /// dropped with their subtree; deeper directives are dropped and their
    /// children kept in the enclosing node.
    pub max_depth: usize,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            locations: true,
            max_depth: 256,
        }
    }
}

// ============================================================================
// DROP REPORTS
// ============================================================================

/// Why a CST construct has no counterpart in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// The node kind or directive shape has no AST mapping.
    Unrecognized,
    /// `{% endblock %}` or `{% endif %}` with nothing open in its scope.
    OrphanClose,
    /// Nested deeper than [`NormalizeOptions::max_depth`].
    TooDeep,
}

/// A CST construct left out of the normalized tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dropped {
    pub kind: Rule,
    pub reason: DropReason,
    pub loc: Location,
}

/// A normalized template together with everything that was dropped from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub template: Template,
    pub dropped: Vec<Dropped>,
}

// ============================================================================
// NORMALIZER
// ============================================================================

/// Converts template source into a normalized [`Template`].
///
/// A normalizer holds only its options; it can be shared across threads and
/// reused for any number of documents.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    options: NormalizeOptions,
}

impl Normalizer {
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Parses and normalizes `source`.
    pub fn parse(&self, source: &str) -> Result<Template, TemplateError> {
        self.parse_with_report(source).map(|normalized| normalized.template)
    }

    /// Like [`Normalizer::parse`], also reporting dropped constructs.
    pub fn parse_with_report(&self, source: &str) -> Result<Normalized, TemplateError> {
        let folded = fold_tag_names(source);
        let root = parse_cst(&folded)?;
        Ok(self.normalize_with_report(source, root))
    }

    /// Normalizes an already parsed `template` root of `source`.
    ///
    /// `root` may come from `source` itself or from its
    /// [`fold_tag_names`](crate::syntax::fold_tag_names) form; all text is
    /// taken from `source`.
    pub fn normalize(&self, source: &str, root: Pair<'_, Rule>) -> Template {
        self.normalize_with_report(source, root).template
    }

    pub fn normalize_with_report(&self, source: &str, root: Pair<'_, Rule>) -> Normalized {
        debug!(bytes = source.len(), "normalizing template");

        let mut builder = Builder::new(&self.options, source);
        let loc = builder.loc(&root);
        let children = builder.scope(root.into_inner().filter(|p| p.as_rule() != Rule::EOI));

        debug!(
            nodes = children.len(),
            dropped = builder.dropped.len(),
            "normalized template"
        );

        Normalized {
            template: Template { children, loc },
            dropped: builder.dropped,
        }
    }
}

/// Parses `source` with default options.
pub fn parse(source: &str) -> Result<Template, TemplateError> {
    Normalizer::default().parse(source)
}

// ============================================================================
// BUILDER STATE
// ============================================================================

/// Per-document state shared by the classifier and the element builder.
pub(crate) struct Builder<'a> {
    options: &'a NormalizeOptions,
    source: &'a str,
    lines: LineIndex<'a>,
    /// Elements and open directives enclosing the node being classified.
    depth: usize,
    dropped: Vec<Dropped>,
}

impl<'a> Builder<'a> {
    pub(crate) fn new(options: &'a NormalizeOptions, source: &'a str) -> Self {
        Self {
            options,
            source,
            lines: LineIndex::new(source),
            depth: 0,
            dropped: Vec::new(),
        }
    }

    /// Location of `pair`, if locations are enabled.
    fn loc(&self, pair: &Pair<'_, Rule>) -> Option<Location> {
        self.options.locations.then(|| self.lines.locate(pair))
    }

    /// Source text under `pair`.
    fn text(&self, pair: &Pair<'_, Rule>) -> &'a str {
        let span = pair.as_span();
        self.source.get(span.start()..span.end()).unwrap_or_default()
    }

    fn too_deep(&self) -> bool {
        self.depth >= self.options.max_depth
    }

    /// Classifies the CST nodes of one scope and nests the result.
    fn scope<'i>(&mut self, pairs: impl Iterator<Item = Pair<'i, Rule>>) -> Vec<Node> {
        let base = self.depth;
        let mut scope = Scope::default();
        for pair in pairs {
            self.depth = base + scope.depth();
            let event = self.classify(pair);
            scope.push(event, &mut self.dropped);
        }
        self.depth = base;
        scope.finish()
    }
}

//! `miette`-based diagnostics for twig-ast.
//!
//! The normalizer itself never fails: every CST it is handed becomes a
//! template. Errors only arise around it, when the CST Provider rejects its
//! input or when the command-line front end touches the file system or
//! writes output. All of those are represented by [`TemplateError`].
//!
//! Error construction goes through the `err_msg!` and `err_ctx!` macros:
//!
//! - `err_msg!(Io, "cannot read {}", path)` for message-only errors;
//! - `err_ctx!(Parse, "unexpected input", src, span)` when a source and a
//!   byte span are available (`src` is a [`SourceArc`]).

use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use thiserror::Error;

pub type SourceArc = Arc<NamedSource<String>>;

/// Byte range into a template source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Minimal, composable error context for diagnostics.
#[derive(Debug, Default)]
pub struct ErrorContext {
    /// The source the span points into (if any).
    pub source: Option<SourceArc>,
    /// The primary span for this error (if any).
    pub span: Option<Span>,
    /// An optional help message.
    pub help: Option<String>,
}

impl ErrorContext {
    /// Returns an empty error context (no source, span, or help).
    pub fn none() -> Self {
        Self::default()
    }

    /// Creates a context with both source and span.
    pub fn with_source_and_span(source: SourceArc, span: Span) -> Self {
        Self {
            source: Some(source),
            span: Some(span),
            help: None,
        }
    }
}

/// Every failure mode surfaced by the crate.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The CST Provider could not build a tree for the input.
    #[error("Parse error: {message}")]
    Parse {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    /// Reading a template or writing output failed.
    #[error("I/O error: {message}")]
    Io {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    /// The AST could not be encoded for output.
    #[error("Serialization error: {message}")]
    Serialize {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
}

impl TemplateError {
    fn get_ctx(&self) -> &ErrorContext {
        match self {
            TemplateError::Parse { ctx, .. }
            | TemplateError::Io { ctx, .. }
            | TemplateError::Serialize { ctx, .. } => ctx,
        }
    }

    fn message(&self) -> &str {
        match self {
            TemplateError::Parse { message, .. }
            | TemplateError::Io { message, .. }
            | TemplateError::Serialize { message, .. } => message,
        }
    }

    /// Attaches a cause to this error.
    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        match &mut self {
            TemplateError::Parse { source, .. }
            | TemplateError::Io { source, .. }
            | TemplateError::Serialize { source, .. } => *source = Some(Box::new(cause)),
        }
        self
    }

    /// Attaches a help message to this error.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        match &mut self {
            TemplateError::Parse { ctx, .. }
            | TemplateError::Io { ctx, .. }
            | TemplateError::Serialize { ctx, .. } => ctx.help = Some(help.into()),
        }
        self
    }

    /// The primary byte span, when the error points into a template.
    pub fn span(&self) -> Option<Span> {
        self.get_ctx().span
    }
}

impl Diagnostic for TemplateError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let code = match self {
            TemplateError::Parse { .. } => "twig_ast::parse",
            TemplateError::Io { .. } => "twig_ast::io",
            TemplateError::Serialize { .. } => "twig_ast::serialize",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.get_ctx()
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn std::fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.get_ctx()
            .source
            .as_ref()
            .map(|s| s.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.get_ctx().span?;
        let len = if span.end > span.start {
            span.end - span.start
        } else {
            1
        };
        let label = LabeledSpan::new(Some(self.message().to_string()), span.start, len);
        Some(Box::new(std::iter::once(label)))
    }
}

/// Converts a template into a named source for error contexts.
pub fn to_error_source(name: impl AsRef<str>, source: impl AsRef<str>) -> SourceArc {
    Arc::new(NamedSource::new(name.as_ref(), source.as_ref().to_string()))
}

/// Constructs a `TemplateError` variant with a formatted message and no context.
#[macro_export]
macro_rules! err_msg {
    ($variant:ident, $msg:expr, $($arg:expr),+ $(,)?) => {
        $crate::TemplateError::$variant {
            message: format!($msg, $($arg),+),
            ctx: $crate::ErrorContext::none(),
            source: None,
        }
    };
    ($variant:ident, $msg:expr) => {
        $crate::TemplateError::$variant {
            message: format!("{}", $msg),
            ctx: $crate::ErrorContext::none(),
            source: None,
        }
    };
}

/// Constructs a `TemplateError` variant pointing at a span of a source.
#[macro_export]
macro_rules! err_ctx {
    // Message, src, span, help
    ($variant:ident, $msg:expr, $src:expr, $span:expr, $help:expr) => {
        $crate::TemplateError::$variant {
            message: $msg.to_string(),
            ctx: $crate::ErrorContext {
                source: Some($crate::diagnostics::SourceArc::clone($src)),
                span: Some($span),
                help: Some(format!("{}", $help)),
            },
            source: None,
        }
    };
    // Message, src, span
    ($variant:ident, $msg:expr, $src:expr, $span:expr) => {
        $crate::TemplateError::$variant {
            message: $msg.to_string(),
            ctx: $crate::ErrorContext::with_source_and_span(
                $crate::diagnostics::SourceArc::clone($src),
                $span,
            ),
            source: None,
        }
    };
}

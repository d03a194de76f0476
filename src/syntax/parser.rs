//! CST Provider
//!
//! Parses template source into a concrete syntax tree using the PEG grammar in
//! `grammar.pest`. The tree is exposed as `pest` pairs: each pair offers its
//! kind (`as_rule`), ordered children (`into_inner`), verbatim text
//! (`as_str`) and byte span. The normalizer needs nothing else from it.

use std::borrow::Cow;

use pest::{error::Error, iterators::Pair, Parser};
use pest_derive::Parser;

use crate::diagnostics::{to_error_source, Span, TemplateError};
use crate::err_ctx;

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
pub struct TemplateGrammar;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parses `source` into its `template` root node.
///
/// The grammar accepts every input, so an error here means `pest` itself gave
/// up (for instance on its call limit); it is reported, never unwrapped.
pub fn parse_cst(source: &str) -> Result<Pair<'_, Rule>, TemplateError> {
    let mut pairs = TemplateGrammar::parse(Rule::template, source)
        .map_err(|e| convert_parse_error(e, source))?;

    pairs.next().ok_or_else(|| {
        let src = to_error_source("template", source);
        err_ctx!(Parse, "grammar produced no template node", &src, Span::default())
    })
}

/// Lowercases the ASCII letters of every tag name following `<` or `</`.
///
/// HTML tag names are case-insensitive but the grammar matches end tags
/// against the open element byte for byte. Folding keeps every byte offset
/// unchanged, so spans found in the folded text index the original as well.
pub fn fold_tag_names(source: &str) -> Cow<'_, str> {
    let bytes = source.as_bytes();
    let mut folded: Option<String> = None;
    let mut at = 0;

    while let Some(found) = bytes[at..].iter().position(|&b| b == b'<') {
        let mut start = at + found + 1;
        if bytes.get(start) == Some(&b'/') {
            start += 1;
        }
        let mut end = start;
        if bytes.get(start).is_some_and(u8::is_ascii_alphabetic) {
            while bytes.get(end).is_some_and(|&b| is_tag_name_byte(b)) {
                end += 1;
            }
        }
        if bytes[start..end].iter().any(u8::is_ascii_uppercase) {
            let text = folded.get_or_insert_with(|| source.to_string());
            if let Some(name) = text.get_mut(start..end) {
                name.make_ascii_lowercase();
            }
        }
        at = end.max(at + found + 1);
    }

    folded.map_or(Cow::Borrowed(source), Cow::Owned)
}

fn is_tag_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b':' | b'_' | b'.')
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

fn convert_parse_error(error: Error<Rule>, source: &str) -> TemplateError {
    let span = match error.location {
        pest::error::InputLocation::Pos(pos) => Span {
            start: pos,
            end: pos,
        },
        pest::error::InputLocation::Span((start, end)) => Span { start, end },
    };

    let message = match &error.variant {
        pest::error::ErrorVariant::ParsingError { positives, .. } if !positives.is_empty() => {
            let expected: Vec<String> = positives.iter().map(|rule| format!("{rule:?}")).collect();
            format!("expected {}", expected.join(", "))
        }
        pest::error::ErrorVariant::CustomError { message } => message.clone(),
        _ => "Syntax error".to_string(),
    };

    let src = to_error_source("template", source);
    err_ctx!(Parse, message, &src, span)
}

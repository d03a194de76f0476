//! Location Extractor
//!
//! Converts CST byte offsets into normalized `{line, column}` spans: lines
//! are 1-based, columns 0-based and counted in characters from the start of
//! the line.

use pest::iterators::Pair;

use super::Rule;
use crate::ast::{Location, Position};

/// A zero-based `(row, column)` position as reported by the CST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub row: usize,
    pub column: usize,
}

/// Normalizes a CST position pair: `line = row + 1`, column unchanged.
pub fn extract(start: Point, end: Point) -> Location {
    Location {
        start: Position {
            line: start.row + 1,
            column: start.column,
        },
        end: Position {
            line: end.row + 1,
            column: end.column,
        },
    }
}

/// Byte offsets of line starts and of multi-byte characters, built once per
/// source text. Both lookups are binary searches.
#[derive(Debug, Clone)]
pub struct LineIndex<'s> {
    source: &'s str,
    line_starts: Vec<usize>,
    /// `(offset, extra)` per multi-byte character: its byte offset and the
    /// running total of continuation bytes up to and including it.
    wide: Vec<(usize, usize)>,
}

impl<'s> LineIndex<'s> {
    pub fn new(source: &'s str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();

        let mut extra = 0;
        let wide = source
            .char_indices()
            .filter(|(_, c)| !c.is_ascii())
            .map(|(offset, c)| {
                extra += c.len_utf8() - 1;
                (offset, extra)
            })
            .collect();

        Self {
            source,
            line_starts,
            wide,
        }
    }

    /// Continuation bytes of all characters starting before `offset`.
    fn extra_before(&self, offset: usize) -> usize {
        match self.wide.partition_point(|&(start, _)| start < offset) {
            0 => 0,
            n => self.wide[n - 1].1,
        }
    }

    /// Zero-based point of a byte offset. Offsets past the end clamp to it.
    pub fn point(&self, offset: usize) -> Point {
        let offset = offset.min(self.source.len());
        let row = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let line_start = self.line_starts.get(row).copied().unwrap_or(0);
        let bytes = offset.saturating_sub(line_start);
        let column = bytes.saturating_sub(self.extra_before(offset) - self.extra_before(line_start));
        Point { row, column }
    }

    /// Location of a CST node.
    pub fn locate(&self, pair: &Pair<'_, Rule>) -> Location {
        let span = pair.as_span();
        extract(self.point(span.start()), self.point(span.end()))
    }

    /// Location of the whole source text.
    pub fn document(&self) -> Location {
        extract(self.point(0), self.point(self.source.len()))
    }
}

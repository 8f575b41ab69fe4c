//! Block extractor: the literal text of the block that starts at a position.
//!
//! Lines are scanned from the start line, opener and closer tokens are
//! counted on the code part of each line, and the scan stops on the first
//! line where both counts are equal and non-zero. Comment lines are skipped
//! for counting but always kept in the output.

use crate::comment::{CommentScanner, LineClass};
use crate::dialect::{BlockRules, Dialect, NoDelimiterFallback};
use crate::error::ExtractError;
use crate::types::{Position, SourceText};
use std::borrow::Cow;
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    /// Openers and closers balanced on `end_line`.
    Balanced,
    /// No balanced block; a fixed window of lines from the start line.
    Window,
}

/// The text of one extracted block, lines `start_line..=end_line`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSpan {
    start_line: usize,
    end_line: usize,
    text: String,
    kind: SpanKind,
}

impl BlockSpan {
    pub fn start_line(&self) -> usize {
        self.start_line
    }

    pub fn end_line(&self) -> usize {
        self.end_line
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn kind(&self) -> SpanKind {
        self.kind
    }

    pub fn is_fallback(&self) -> bool {
        self.kind == SpanKind::Window
    }

    pub fn line_count(&self) -> usize {
        self.end_line - self.start_line + 1
    }

    fn from_lines(text: &SourceText<'_>, start_line: usize, end_line: usize, kind: SpanKind) -> Self {
        Self {
            start_line,
            end_line,
            text: text.join(start_line, end_line),
            kind,
        }
    }
}

/// Extracts the block starting on `start.line`.
///
/// The column is advisory and not used; the whole start line takes part in
/// counting.
pub fn extract(text: &SourceText<'_>, start: Position, dialect: &Dialect) -> Result<BlockSpan, ExtractError> {
    let Some(first) = text.line(start.line) else {
        return Err(ExtractError::StartOutOfRange {
            line: start.line,
            len: text.len(),
        });
    };

    let (rules, mut opened) = select_rules(first, dialect);
    let mut closed = 0;
    let mut scanner = CommentScanner::new(dialect.comments());

    for (offset, line) in text.lines().skip(start.line).enumerate() {
        let index = start.line + offset;
        if let LineClass::Code(code) = scanner.classify(line) {
            opened += rules.count_opens(&code);
            closed += rules.count_closes(&code);
        }
        trace!(line = index, opened, closed, "counted");

        if opened == closed && opened != 0 {
            debug!(
                start = start.line,
                end = index,
                opened,
                dialect = dialect.name(),
                "block balanced"
            );
            return Ok(BlockSpan::from_lines(text, start.line, index, SpanKind::Balanced));
        }

        // No opener within the window: a declaration without a body.
        if let NoDelimiterFallback::Window(size) = dialect.fallback() {
            if opened == 0 && offset + 1 >= size {
                debug!(start = start.line, size, "no opener near start, using window");
                return Ok(window(text, start.line, size));
            }
        }
    }

    match dialect.fallback() {
        NoDelimiterFallback::Window(size) => {
            warn!(start = start.line, opened, closed, size, "block never balanced, using window");
            Ok(window(text, start.line, size))
        }
        NoDelimiterFallback::Fail => {
            warn!(start = start.line, opened, closed, "block never balanced");
            Err(ExtractError::Unbalanced {
                start_line: start.line,
                opened,
                closed,
            })
        }
    }
}

/// Picks the counting rules for this block and the initial open count.
///
/// Inline rules win when the start line opens one of their blocks before any
/// primary opener. Otherwise a dialect with implicit opens starts at one when
/// the start line has no opener at all.
fn select_rules<'d>(first: &str, dialect: &'d Dialect) -> (&'d BlockRules, usize) {
    let code = match CommentScanner::new(dialect.comments()).classify(first) {
        LineClass::Code(code) => code,
        LineClass::Comment => Cow::Borrowed(""),
    };

    let primary = dialect.blocks().first_opener(&code);
    if let Some(inline) = dialect.inline_blocks() {
        if let Some(at) = inline.first_opener(&code) {
            if primary.is_none_or(|primary| at < primary) {
                trace!("start line opens an inline block");
                return (inline, 0);
            }
        }
    }

    let implicit = usize::from(dialect.implicit_open() && primary.is_none());
    (dialect.blocks(), implicit)
}

fn window(text: &SourceText<'_>, start_line: usize, size: usize) -> BlockSpan {
    let end_line = (start_line + size - 1).min(text.len() - 1);
    BlockSpan::from_lines(text, start_line, end_line, SpanKind::Window)
}

//! Symbol locator: finds the line and column where a name occurs.
//!
//! Candidates are ranked in fixed tiers. A match in an earlier tier always
//! beats a later tier, wherever it sits in the file; within a tier the first
//! line wins.
//!
//! 1. `Hint`: the hint (usually a whole code line) occurs on the line.
//! 2. `Qualified`: the last segment of a qualified name, right after its
//!    separator (`::bar` for `Foo::bar`).
//! 3. `Name`: the name itself.

use crate::comment::{CommentScanner, LineClass};
use crate::dialect::Dialect;
use crate::error::QueryError;
use crate::types::{Position, SourceText};
use regex::Regex;
use std::ops::Range;
use tracing::{debug, trace};

/// Whether lines that define the name are candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Looking for the defining occurrence; definition lines are kept.
    Declaration,
    /// Looking for a use site; lines that define the name are skipped.
    #[default]
    Usage,
}

/// A validated request for [`locate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocateQuery<'q> {
    name: &'q str,
    hint: Option<&'q str>,
    mode: SearchMode,
}

impl<'q> LocateQuery<'q> {
    /// Builds a query. Surrounding whitespace is ignored and a blank hint is
    /// treated as no hint.
    pub fn new(name: &'q str, hint: Option<&'q str>, mode: SearchMode) -> Result<Self, QueryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(QueryError::EmptyName);
        }
        let hint = hint.map(str::trim).filter(|hint| !hint.is_empty());
        Ok(Self { name, hint, mode })
    }

    pub fn name(&self) -> &'q str {
        self.name
    }

    pub fn hint(&self) -> Option<&'q str> {
        self.hint
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Tier {
    Hint,
    Qualified,
    Name,
}

impl Tier {
    const ALL: [Tier; 3] = [Tier::Hint, Tier::Qualified, Tier::Name];
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct MatchCandidate {
    line: usize,
    span: Range<usize>,
    tier: Tier,
}

/// The tail of a qualified name: `::bar` of `Foo::bar`.
#[derive(Debug, Clone, Copy)]
struct Qualified<'q> {
    /// Separator plus leaf.
    needle: &'q str,
    separator_len: usize,
    leaf: &'q str,
}

impl<'q> Qualified<'q> {
    fn split(name: &'q str, separators: &[String]) -> Option<Self> {
        let (at, separator_len) = separators
            .iter()
            .filter_map(|sep| name.rfind(sep.as_str()).map(|at| (at, sep.len())))
            .max_by_key(|&(at, len)| at + len)?;
        let leaf = &name[at + separator_len..];
        if leaf.is_empty() {
            return None;
        }
        Some(Self {
            needle: &name[at..],
            separator_len,
            leaf,
        })
    }

    /// Leaf spans that directly follow the separator.
    fn find_in(&self, haystack: &str) -> impl Iterator<Item = Range<usize>> {
        let check_right = self.needle.ends_with(is_ident);
        haystack
            .match_indices(self.needle)
            .map(move |(at, _)| at..at + self.needle.len())
            .filter(move |span| {
                !check_right
                    || haystack[span.end..]
                        .chars()
                        .next()
                        .is_none_or(|c| !is_ident(c))
            })
            .map(move |span| span.start + self.separator_len..span.end)
    }
}

struct MatchPlan<'q> {
    query: LocateQuery<'q>,
    qualified: Option<Qualified<'q>>,
    definition: Option<Regex>,
}

impl<'q> MatchPlan<'q> {
    fn new(query: LocateQuery<'q>, dialect: &Dialect) -> Self {
        let qualified = Qualified::split(query.name, dialect.qualifiers());
        let definition = match query.mode {
            SearchMode::Declaration => None,
            SearchMode::Usage => {
                let leaf = qualified.map_or(query.name, |q| q.leaf);
                definition_pattern(dialect.definition_keywords(), leaf)
            }
        };
        Self {
            query,
            qualified,
            definition,
        }
    }

    fn is_definition(&self, code: &str) -> bool {
        self.definition
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(code))
    }

    fn match_tier(&self, tier: Tier, line: &str, code: &str) -> Option<Range<usize>> {
        match tier {
            // The hint is copied verbatim from source, comments included, so
            // it is matched against the raw line, but it must start in code.
            Tier::Hint => {
                let hint = self.query.hint?;
                bounded_matches(line, hint)
                    .filter(|span| starts_in_code(line, code, span.start))
                    .find_map(|span| self.refine_hint(line, span))
            }
            Tier::Qualified => self.qualified?.find_in(code).next(),
            Tier::Name => bounded_matches(code, self.query.name).next(),
        }
    }

    /// Narrows a hint occurrence down to the name inside it. Qualified names
    /// must appear with their separator inside the hint occurrence.
    fn refine_hint(&self, line: &str, hint: Range<usize>) -> Option<Range<usize>> {
        let (lo, hi) = (hint.start, hint.end);
        let within = move |span: &Range<usize>| span.start >= lo && span.end <= hi;
        match self.qualified {
            Some(qualified) => qualified.find_in(line).find(within),
            None => Some(
                bounded_matches(line, self.query.name)
                    .find(within)
                    .unwrap_or(hint),
            ),
        }
    }
}

/// Finds the best position of `query` in `text`, or `None` when no tier matches.
pub fn locate(text: &SourceText<'_>, query: &LocateQuery<'_>, dialect: &Dialect) -> Option<Position> {
    let plan = MatchPlan::new(*query, dialect);
    let mut scanner = CommentScanner::new(dialect.comments());
    let mut best: Option<MatchCandidate> = None;

    for (index, line) in text.lines().enumerate() {
        let LineClass::Code(code) = scanner.classify(line) else {
            continue;
        };
        if plan.is_definition(&code) {
            trace!(line = index, name = query.name, "skipping definition line");
            continue;
        }

        let ceiling = best.as_ref().map(|b| b.tier);
        for tier in Tier::ALL {
            if ceiling.is_some_and(|ceiling| tier >= ceiling) {
                break;
            }
            if let Some(span) = plan.match_tier(tier, line, &code) {
                trace!(line = index, ?tier, "candidate");
                best = Some(MatchCandidate {
                    line: index,
                    span,
                    tier,
                });
                break;
            }
        }

        if best.as_ref().is_some_and(|b| b.tier == Tier::Hint) {
            break;
        }
    }

    let Some(candidate) = best else {
        debug!(name = query.name, hint = ?query.hint, "no match");
        return None;
    };
    let line = text.line(candidate.line).unwrap_or_default();
    let column = line
        .get(..candidate.span.start)
        .map_or(candidate.span.start, |prefix| prefix.chars().count());
    debug!(
        name = query.name,
        line = candidate.line,
        column,
        tier = ?candidate.tier,
        "located"
    );
    Some(Position::new(candidate.line, column))
}

/// Whether byte `at` of `line` survived comment removal in `code`.
fn starts_in_code(line: &str, code: &str, at: usize) -> bool {
    at < code.len() && line.as_bytes().get(at) == code.as_bytes().get(at)
}

fn is_ident(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_right_boundary(c: char) -> bool {
    c.is_whitespace() || "(){}[]<>|,;".contains(c)
}

/// Occurrences of `needle` that are not glued to a neighbouring identifier.
///
/// A word-like edge must be preceded by a non-identifier character and
/// followed by whitespace, a bracket, a pipe, `,` or `;`.
fn bounded_matches(haystack: &str, needle: &str) -> impl Iterator<Item = Range<usize>> {
    let check_left = needle.starts_with(is_ident);
    let check_right = needle.ends_with(is_ident);
    haystack
        .match_indices(needle)
        .map(|(at, found)| at..at + found.len())
        .filter(move |span| {
            let left_ok = !check_left
                || haystack[..span.start]
                    .chars()
                    .next_back()
                    .is_none_or(|c| !is_ident(c));
            let right_ok = !check_right
                || haystack[span.end..]
                    .chars()
                    .next()
                    .is_none_or(is_right_boundary);
            left_ok && right_ok
        })
}

/// `def name`, `class Name`, `fn name`, `def self.name`, ... for the dialect's keywords.
fn definition_pattern(keywords: &[String], leaf: &str) -> Option<Regex> {
    if keywords.is_empty() {
        return None;
    }
    let keywords = keywords
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(
        r"(?:^|\W)(?:{keywords})\s+(?:[\w:]+(?:\.|::))?{}(?:[^\w?!]|$)",
        regex::escape(leaf)
    );
    Regex::new(&pattern).ok()
}

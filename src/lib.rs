//! Heuristic source span resolution.
//!
//! Given the text of a source file, [`locate`] finds where a symbol occurs and
//! [`extract`] returns the literal text of the block starting at a position.
//! Both work line by line over brace-delimited and keyword-delimited
//! languages, described by a [`Dialect`]. Neither builds a syntax tree.

pub mod comment;
pub mod config;
pub mod dialect;
pub mod display;
pub mod error;
pub mod extractor;
pub mod file_resolver;
pub mod locator;
pub mod resolver;
pub mod types;

pub use dialect::{Dialect, DialectKind, NoDelimiterFallback};
pub use error::{DialectError, ExtractError, QueryError, ResolveError};
pub use extractor::{BlockSpan, SpanKind, extract};
pub use locator::{LocateQuery, SearchMode, locate};
pub use resolver::{Resolution, resolve};
pub use types::{Position, SourceText};

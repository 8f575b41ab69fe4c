//! Locate, then extract: the two steps every navigation hop performs.

use crate::dialect::Dialect;
use crate::error::ResolveError;
use crate::extractor::{BlockSpan, extract};
use crate::locator::{LocateQuery, locate};
use crate::types::{Position, SourceText};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub position: Position,
    pub span: BlockSpan,
}

/// Finds `query` in `text` and extracts the block that starts on its line.
pub fn resolve(text: &SourceText<'_>, query: &LocateQuery<'_>, dialect: &Dialect) -> Result<Resolution, ResolveError> {
    let position = locate(text, query, dialect).ok_or_else(|| ResolveError::NotFound {
        name: query.name().to_string(),
    })?;
    let span = extract(text, position, dialect)?;
    Ok(Resolution { position, span })
}

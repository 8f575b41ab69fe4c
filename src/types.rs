use std::fmt;
use std::path::{Path, PathBuf};

/// A `(line, column)` pair, both 0-indexed.
///
/// `column` counts characters, not bytes. It points at the start of the
/// matched token and is advisory: callers clamp it against the line they
/// actually hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

// 1-based, the way editors and compilers print locations.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// Source file content split into lines on `\n`.
///
/// Lines are kept verbatim (a trailing `\r` stays), so joining a range back
/// together reproduces the original bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText<'a> {
    lines: Vec<&'a str>,
}

impl<'a> SourceText<'a> {
    pub fn new(content: &'a str) -> Self {
        Self {
            lines: content.split('\n').collect(),
        }
    }

    pub fn from_lines<I>(lines: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self {
            lines: lines.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, index: usize) -> Option<&'a str> {
        self.lines.get(index).copied()
    }

    pub fn lines(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.lines.iter().copied()
    }

    /// Joins lines `first..=last` with `\n`, clamping `last` to the end.
    pub fn join(&self, first: usize, last: usize) -> String {
        let end = last.saturating_add(1).min(self.lines.len());
        if first >= end {
            return String::new();
        }
        self.lines[first..end].join("\n")
    }
}

/// Represents a successfully resolved file, ready to be read.
///
/// It stores the path intended for display to the user and the canonicalized,
/// absolute path used for reading.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedFile {
    // Path to show to the user (e.g., relative to the working directory).
    pub(crate) display_path: PathBuf,
    // Absolute, canonicalized path for reading the file.
    pub(crate) canonical_path: PathBuf,
}

impl ResolvedFile {
    pub(crate) fn new(display_path: PathBuf, canonical_path: PathBuf) -> Self {
        Self {
            display_path,
            canonical_path,
        }
    }

    /// Returns the path suitable for display to the user.
    pub fn display_path(&self) -> &Path {
        &self.display_path
    }

    /// Returns the canonical, absolute path to the file.
    pub fn canonical_path(&self) -> &Path {
        &self.canonical_path
    }
}

/// Represents the outcome of resolving a single file argument.
/// It is generic over a lifetime `'a` to borrow the input string, avoiding allocations.
#[derive(Debug, Clone)]
pub enum InputResolution<'a> {
    /// Resolved to one or more files.
    Success(Vec<ResolvedFile>),

    /// The input matched several files and a single source file is needed.
    Ambiguous {
        input_string: &'a str,
        /// Paths (relative to the working directory for display) that caused the ambiguity.
        conflicting_paths: Vec<PathBuf>,
    },

    /// The input string could not be found after searching.
    NotFound { input_string: &'a str },

    /// The input string was treated as an explicit path, but it does not exist on the filesystem.
    PathDoesNotExist {
        input_string: &'a str,
        /// The absolute or relative path that was checked.
        path_tried: PathBuf,
    },

    /// The input looked like a glob but could not be compiled.
    InvalidGlobPattern { input_string: &'a str, error: String },
}

impl InputResolution<'_> {
    /// The input string this resolution was produced for, if it failed.
    pub fn failed_input(&self) -> Option<&str> {
        match self {
            InputResolution::Success(_) => None,
            InputResolution::Ambiguous { input_string, .. }
            | InputResolution::NotFound { input_string }
            | InputResolution::PathDoesNotExist { input_string, .. }
            | InputResolution::InvalidGlobPattern { input_string, .. } => Some(input_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_text_keeps_lines_verbatim() {
        let text = SourceText::new("a\r\nb\n\nc");
        assert_eq!(text.len(), 4);
        assert_eq!(text.line(0), Some("a\r"));
        assert_eq!(text.line(2), Some(""));
        assert_eq!(text.join(0, 3), "a\r\nb\n\nc");
    }

    #[test]
    fn join_clamps_to_the_last_line() {
        let text = SourceText::from_lines(["one", "two", "three"]);
        assert_eq!(text.join(1, 10), "two\nthree");
        assert_eq!(text.join(5, 10), "");
    }

    #[test]
    fn position_displays_one_based() {
        assert_eq!(Position::new(0, 4).to_string(), "1:5");
    }
}

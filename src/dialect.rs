//! Dialect descriptions: the comment and block syntax of a language family.
//!
//! One resolver engine serves every language through a [`Dialect`] value.
//! Two are built in, [`Dialect::brace`] for C-like languages and
//! [`Dialect::keyword`] for Ruby-like `def`/`do`/`end` languages.

use crate::error::DialectError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// What the extractor returns when a block never balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoDelimiterFallback {
    /// Return this many lines starting at the start line.
    Window(usize),
    /// Report the block as unbalanced.
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentSyntax {
    pub line: String,
    pub block_open: String,
    pub block_close: String,
    /// A line marker glued to code (`x++;// }`) still starts a comment,
    /// unless it follows `:` as in `http://`. Otherwise the marker must
    /// follow whitespace.
    pub glued_line_comments: bool,
}

/// A pattern whose every occurrence on a code line opens one block, unless
/// the line also matches the rule's exclusion.
#[derive(Debug, Clone)]
pub struct OpenerRule {
    pattern: Regex,
    unless: Option<Regex>,
}

impl OpenerRule {
    pub fn new(pattern: &str) -> Result<Self, DialectError> {
        Ok(Self {
            pattern: compile(pattern)?,
            unless: None,
        })
    }

    /// Lines matching `pattern` are block-less uses of this opener.
    pub fn except(mut self, pattern: &str) -> Result<Self, DialectError> {
        self.unless = Some(compile(pattern)?);
        Ok(self)
    }

    fn applies(&self, code: &str) -> bool {
        self.unless.as_ref().is_none_or(|unless| !unless.is_match(code))
    }

    pub fn count(&self, code: &str) -> usize {
        if self.applies(code) {
            self.pattern.find_iter(code).count()
        } else {
            0
        }
    }

    pub fn first_match(&self, code: &str) -> Option<usize> {
        if self.applies(code) {
            self.pattern.find(code).map(|m| m.start())
        } else {
            None
        }
    }
}

/// Opener rules plus the closer that balances them.
#[derive(Debug, Clone)]
pub struct BlockRules {
    openers: Vec<OpenerRule>,
    closer: Regex,
}

impl BlockRules {
    pub fn new(openers: Vec<OpenerRule>, closer: &str) -> Result<Self, DialectError> {
        Ok(Self {
            openers,
            closer: compile(closer)?,
        })
    }

    pub fn count_opens(&self, code: &str) -> usize {
        self.openers.iter().map(|rule| rule.count(code)).sum()
    }

    pub fn count_closes(&self, code: &str) -> usize {
        self.closer.find_iter(code).count()
    }

    /// Byte offset of the leftmost opener on the line.
    pub fn first_opener(&self, code: &str) -> Option<usize> {
        self.openers
            .iter()
            .filter_map(|rule| rule.first_match(code))
            .min()
    }
}

/// Comment syntax, block delimiters and fallback policy of one language family.
///
/// Built once and shared read-only; every resolver call borrows it.
#[derive(Debug, Clone)]
pub struct Dialect {
    name: String,
    comments: CommentSyntax,
    blocks: BlockRules,
    inline_blocks: Option<BlockRules>,
    implicit_open: bool,
    fallback: NoDelimiterFallback,
    definition_keywords: Vec<String>,
    qualifiers: Vec<String>,
}

impl Dialect {
    pub fn builder(name: impl Into<String>) -> DialectBuilder {
        DialectBuilder {
            name: name.into(),
            comments: None,
            blocks: None,
            inline_blocks: None,
            implicit_open: false,
            fallback: NoDelimiterFallback::Fail,
            definition_keywords: Vec::new(),
            qualifiers: Vec::new(),
        }
    }

    /// C-like languages: `//`, `/* */`, `{` and `}`.
    pub fn brace() -> &'static Dialect {
        &BRACE
    }

    /// Ruby-like languages: `#`, `=begin`/`=end`, `def`/`do`/.../`end`.
    pub fn keyword() -> &'static Dialect {
        &KEYWORD
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn comments(&self) -> &CommentSyntax {
        &self.comments
    }

    pub fn blocks(&self) -> &BlockRules {
        &self.blocks
    }

    /// Secondary rules used when the start line opens one of these blocks
    /// before any primary opener, like a Ruby `{ |x| ... }` block.
    pub fn inline_blocks(&self) -> Option<&BlockRules> {
        self.inline_blocks.as_ref()
    }

    /// Whether a start line without any opener counts as already inside a block.
    pub fn implicit_open(&self) -> bool {
        self.implicit_open
    }

    pub fn fallback(&self) -> NoDelimiterFallback {
        self.fallback
    }

    pub fn definition_keywords(&self) -> &[String] {
        &self.definition_keywords
    }

    /// Separators of qualified names (`::`, `.`, `->`).
    pub fn qualifiers(&self) -> &[String] {
        &self.qualifiers
    }

    /// A copy of this dialect with a different fallback policy.
    pub fn with_fallback(&self, fallback: NoDelimiterFallback) -> Result<Dialect, DialectError> {
        if fallback == NoDelimiterFallback::Window(0) {
            return Err(DialectError::EmptyWindow);
        }
        let mut dialect = self.clone();
        dialect.fallback = fallback;
        Ok(dialect)
    }
}

pub struct DialectBuilder {
    name: String,
    comments: Option<CommentSyntax>,
    blocks: Option<BlockRules>,
    inline_blocks: Option<BlockRules>,
    implicit_open: bool,
    fallback: NoDelimiterFallback,
    definition_keywords: Vec<String>,
    qualifiers: Vec<String>,
}

impl DialectBuilder {
    pub fn comments(mut self, line: &str, block_open: &str, block_close: &str) -> Self {
        self.comments = Some(CommentSyntax {
            line: line.to_string(),
            block_open: block_open.to_string(),
            block_close: block_close.to_string(),
            glued_line_comments: false,
        });
        self
    }

    /// See [`CommentSyntax::glued_line_comments`]. Call after `comments`.
    pub fn glued_line_comments(mut self) -> Self {
        if let Some(comments) = self.comments.as_mut() {
            comments.glued_line_comments = true;
        }
        self
    }

    pub fn blocks(mut self, rules: BlockRules) -> Self {
        self.blocks = Some(rules);
        self
    }

    pub fn inline_blocks(mut self, rules: BlockRules) -> Self {
        self.inline_blocks = Some(rules);
        self
    }

    pub fn implicit_open(mut self, implicit_open: bool) -> Self {
        self.implicit_open = implicit_open;
        self
    }

    pub fn fallback(mut self, fallback: NoDelimiterFallback) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn definition_keywords(mut self, keywords: &[&str]) -> Self {
        self.definition_keywords = keywords.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn qualifiers(mut self, separators: &[&str]) -> Self {
        self.qualifiers = separators.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn build(self) -> Result<Dialect, DialectError> {
        let empty = |field| DialectError::EmptyField {
            dialect: self.name.clone(),
            field,
        };

        let comments = self.comments.clone().ok_or_else(|| empty("comment syntax"))?;
        if comments.line.is_empty() {
            return Err(empty("line comment marker"));
        }
        if comments.block_open.is_empty() || comments.block_close.is_empty() {
            return Err(empty("block comment markers"));
        }

        let blocks = self.blocks.clone().ok_or_else(|| empty("block rules"))?;
        for rules in std::iter::once(&blocks).chain(self.inline_blocks.as_ref()) {
            if rules.openers.is_empty() {
                return Err(DialectError::NoOpeners(self.name.clone()));
            }
            if rules.closer.as_str().is_empty() {
                return Err(empty("closer pattern"));
            }
        }

        if self.fallback == NoDelimiterFallback::Window(0) {
            return Err(DialectError::EmptyWindow);
        }
        if self.qualifiers.iter().any(|q| q.is_empty()) {
            return Err(empty("qualifier separator"));
        }

        Ok(Dialect {
            name: self.name,
            comments,
            blocks,
            inline_blocks: self.inline_blocks,
            implicit_open: self.implicit_open,
            fallback: self.fallback,
            definition_keywords: self.definition_keywords,
            qualifiers: self.qualifiers,
        })
    }
}

/// The built-in dialects, selectable by name on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DialectKind {
    Brace,
    Keyword,
}

impl DialectKind {
    pub fn dialect(self) -> &'static Dialect {
        match self {
            DialectKind::Brace => Dialect::brace(),
            DialectKind::Keyword => Dialect::keyword(),
        }
    }

    /// Picks a dialect from a file's extension or well-known file name.
    pub fn for_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        if KEYWORD_FILE_NAMES.contains(&file_name) {
            return Some(DialectKind::Keyword);
        }
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        if BRACE_EXTENSIONS.contains(&extension.as_str()) {
            Some(DialectKind::Brace)
        } else if KEYWORD_EXTENSIONS.contains(&extension.as_str()) {
            Some(DialectKind::Keyword)
        } else {
            None
        }
    }
}

const BRACE_EXTENSIONS: &[&str] = &[
    "c", "h", "cc", "cpp", "cxx", "hh", "hpp", "hxx", "cs", "dart", "go", "java", "js", "jsx",
    "kt", "kts", "m", "mjs", "php", "rs", "scala", "swift", "ts", "tsx",
];

const KEYWORD_EXTENSIONS: &[&str] = &["rb", "rake", "gemspec", "ru", "rbw"];

const KEYWORD_FILE_NAMES: &[&str] = &["Rakefile", "Gemfile", "Guardfile", "Podfile", "Vagrantfile"];

// Matched on the comment-stripped code of a line.
const RUBY_DEF: &str = r"(?:^|\s)def\s";
// `def name = x` and `def f(a) = x`, but not the setter `def name=(v)`.
const RUBY_ENDLESS_DEF: &str = r"def\s+[\w.?!]+(?:\(.*\)\s*|\s+)=(?:[^=~>]|$)";
const RUBY_DO: &str = r"(?:^|[^.:\w@$])do(?:[^\w:?!]|$)";
const RUBY_CLASS: &str = r"^\s*(?:class|module)\s";
const RUBY_CASE: &str = r"(?:^\s*|=\s*)(?:case|begin)\b";
const RUBY_CONDITIONAL: &str = r"(?:^\s*|=\s*)(?:if|unless|while|until|for)\s";
// Anchoring at line start already rules out trailing modifiers (`return 1 if x`).
// `while x do` and `for a in b do` open one block, counted by the `do`.
const RUBY_CONDITIONAL_GUARD: &str = r"(?:^|\s)do\b";
// A lambda carrying its own `do`, `{` or argument list is counted by that block.
const RUBY_LAMBDA: &str = r"^\s*lambda\s";
const RUBY_LAMBDA_GUARD: &str = r"(?:^|\s)do\b|[{(&]";
const RUBY_END: &str = r"(?:^|[^.:\w@$])end(?:[^\w:?!]|$)";

static BRACE: Lazy<Dialect> = Lazy::new(|| {
    brace_dialect().expect("built-in brace dialect is well formed")
});

static KEYWORD: Lazy<Dialect> = Lazy::new(|| {
    keyword_dialect().expect("built-in keyword dialect is well formed")
});

fn brace_dialect() -> Result<Dialect, DialectError> {
    Dialect::builder("brace")
        .comments("//", "/*", "*/")
        .glued_line_comments()
        .blocks(BlockRules::new(vec![OpenerRule::new(r"\{")?], r"\}")?)
        .fallback(NoDelimiterFallback::Window(5))
        .definition_keywords(&[
            "fn", "func", "function", "def", "class", "struct", "enum", "interface", "trait",
            "union",
        ])
        .qualifiers(&["::", "->", "."])
        .build()
}

fn keyword_dialect() -> Result<Dialect, DialectError> {
    let openers = vec![
        OpenerRule::new(RUBY_DEF)?.except(RUBY_ENDLESS_DEF)?,
        OpenerRule::new(RUBY_DO)?,
        OpenerRule::new(RUBY_CLASS)?,
        OpenerRule::new(RUBY_CASE)?,
        OpenerRule::new(RUBY_CONDITIONAL)?.except(RUBY_CONDITIONAL_GUARD)?,
        OpenerRule::new(RUBY_LAMBDA)?.except(RUBY_LAMBDA_GUARD)?,
    ];
    Dialect::builder("keyword")
        .comments("#", "=begin", "=end")
        .blocks(BlockRules::new(openers, RUBY_END)?)
        .inline_blocks(BlockRules::new(vec![OpenerRule::new(r"\{")?], r"\}")?)
        .implicit_open(true)
        .fallback(NoDelimiterFallback::Fail)
        .definition_keywords(&["def", "class", "module"])
        .qualifiers(&["::", "."])
        .build()
}

fn compile(pattern: &str) -> Result<Regex, DialectError> {
    Regex::new(pattern).map_err(|source| DialectError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

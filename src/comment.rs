//! Line-by-line comment tracking shared by the locator and the extractor.
//!
//! The model is flat: one level of block comment, no awareness
//! of string literals, and at most one open/close pair considered per line
//! (the first open marker and the last close marker).

use crate::dialect::CommentSyntax;
use std::borrow::Cow;

/// How a line takes part in matching and counting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass<'a> {
    /// Pure line comment or block-comment territory; skipped for counting.
    Comment,
    /// Live code. Comment text on the line is blanked or cut off so byte
    /// offsets still line up with the original line.
    Code(Cow<'a, str>),
}

/// Block comment state threaded through a scan of consecutive lines.
#[derive(Debug)]
pub struct CommentScanner<'d> {
    syntax: &'d CommentSyntax,
    inside: bool,
}

impl<'d> CommentScanner<'d> {
    pub fn new(syntax: &'d CommentSyntax) -> Self {
        Self {
            syntax,
            inside: false,
        }
    }

    pub fn in_block_comment(&self) -> bool {
        self.inside
    }

    /// Classifies one line and advances the state. Must be called once per
    /// line, in order.
    pub fn classify<'a>(&mut self, line: &'a str) -> LineClass<'a> {
        if line.trim_start().starts_with(self.syntax.line.as_str()) {
            return LineClass::Comment;
        }

        let open = line.find(self.syntax.block_open.as_str());
        let close = line
            .rfind(self.syntax.block_close.as_str())
            .map(|at| at + self.syntax.block_close.len());

        match (open, close) {
            (Some(open), Some(close)) if open < close => {
                if self.inside {
                    return LineClass::Comment;
                }
                let blanked = blank(line, open, close);
                LineClass::Code(Cow::Owned(self.cut_line_comment(&blanked).to_string()))
            }
            (_, Some(_)) if self.inside => {
                self.inside = false;
                LineClass::Comment
            }
            (Some(open), _) if !self.inside => {
                let code = self.cut_line_comment(line);
                if code.len() <= open {
                    // The opener sits inside a trailing line comment.
                    return LineClass::Code(Cow::Borrowed(code));
                }
                // Code before the marker still counts; a bare opener line does not.
                self.inside = true;
                let code = &line[..open];
                if code.trim().is_empty() {
                    LineClass::Comment
                } else {
                    LineClass::Code(Cow::Borrowed(code))
                }
            }
            _ if self.inside => LineClass::Comment,
            _ => LineClass::Code(Cow::Borrowed(self.cut_line_comment(line))),
        }
    }

    /// Drops a trailing line comment. A marker followed by `{` never counts,
    /// so Ruby's `"#{x}"` survives; see [`CommentSyntax::glued_line_comments`]
    /// for what may precede it.
    fn cut_line_comment<'s>(&self, code: &'s str) -> &'s str {
        let marker = self.syntax.line.as_str();
        for (at, _) in code.match_indices(marker) {
            if code[at + marker.len()..].starts_with('{') {
                continue;
            }
            let starts_comment = match code[..at].chars().next_back() {
                None => false,
                Some(before) if self.syntax.glued_line_comments => before != ':',
                Some(before) => before.is_whitespace(),
            };
            if starts_comment {
                return &code[..at];
            }
        }
        code
    }
}

fn blank(line: &str, start: usize, end: usize) -> String {
    let mut blanked = String::with_capacity(line.len());
    blanked.push_str(&line[..start]);
    blanked.extend(std::iter::repeat_n(' ', end - start));
    blanked.push_str(&line[end..]);
    blanked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use rstest::rstest;

    fn classify_all<'a>(syntax: &CommentSyntax, lines: &[&'a str]) -> Vec<LineClass<'a>> {
        let mut scanner = CommentScanner::new(syntax);
        lines.iter().map(|&line| scanner.classify(line)).collect()
    }

    fn is_code(class: &LineClass<'_>) -> bool {
        matches!(class, LineClass::Code(_))
    }

    #[rstest]
    #[case::brace_line_comment("  // } not a real close")]
    #[case::brace_doc_comment("/// docs")]
    fn brace_line_comments_are_skipped(#[case] line: &str) {
        let mut scanner = CommentScanner::new(Dialect::brace().comments());
        assert_eq!(scanner.classify(line), LineClass::Comment);
        assert!(!scanner.in_block_comment());
    }

    #[test]
    fn block_comment_spans_lines() {
        let lines = ["int a;", "/* start {", "  middle }", "end */", "int b;"];
        let classes = classify_all(Dialect::brace().comments(), &lines);
        let live: Vec<bool> = classes.iter().map(is_code).collect();
        assert_eq!(live, vec![true, false, false, false, true]);
    }

    #[test]
    fn self_contained_comment_is_blanked_in_place() {
        let mut scanner = CommentScanner::new(Dialect::brace().comments());
        let line = "int f() { /* } */ return 1;";
        match scanner.classify(line) {
            LineClass::Code(code) => {
                assert_eq!(code.len(), line.len());
                assert_eq!(code, "int f() {         return 1;");
            }
            LineClass::Comment => panic!("expected code"),
        }
        assert!(!scanner.in_block_comment());
    }

    #[test]
    fn last_close_marker_wins() {
        let mut scanner = CommentScanner::new(Dialect::brace().comments());
        let line = "a /* x */ b /* y */ c";
        let LineClass::Code(code) = scanner.classify(line) else {
            panic!("expected code");
        };
        assert_eq!(code, "a                   c");
    }

    #[test]
    fn close_then_open_on_one_line_enters_a_comment() {
        let lines = ["x = 1; */ y /* z", "still comment", "*/"];
        let classes = classify_all(Dialect::brace().comments(), &lines);
        assert_eq!(classes[0], LineClass::Code(Cow::Borrowed("x = 1; */ y ")));
        assert_eq!(classes[1..], [LineClass::Comment, LineClass::Comment]);
    }

    #[test]
    fn code_before_an_opening_block_comment_is_live() {
        let lines = ["int f() { /* begin", "   explanation } */", "  return 1;"];
        let classes = classify_all(Dialect::brace().comments(), &lines);
        assert_eq!(
            classes,
            vec![
                LineClass::Code(Cow::Borrowed("int f() { ")),
                LineClass::Comment,
                LineClass::Code(Cow::Borrowed("  return 1;")),
            ]
        );
    }

    #[test]
    fn opener_inside_a_line_comment_is_ignored() {
        let lines = ["close(); // see /* notes", "return 0;"];
        let classes = classify_all(Dialect::brace().comments(), &lines);
        assert_eq!(classes[0], LineClass::Code(Cow::Borrowed("close(); ")));
        assert!(is_code(&classes[1]));
    }

    #[test]
    fn bare_opener_line_is_comment() {
        let mut scanner = CommentScanner::new(Dialect::brace().comments());
        assert_eq!(scanner.classify("    /* {"), LineClass::Comment);
        assert!(scanner.in_block_comment());
    }

    #[rstest]
    #[case::glued_after_semicolon("x++;// }", "x++;")]
    #[case::glued_after_paren("foo();//}", "foo();")]
    #[case::spaced("if (x) { // }", "if (x) { ")]
    #[case::url_scheme("url = \"http://example.com\"; {", "url = \"http://example.com\"; {")]
    fn brace_trailing_comments(#[case] line: &str, #[case] code: &str) {
        let mut scanner = CommentScanner::new(Dialect::brace().comments());
        assert_eq!(scanner.classify(line), LineClass::Code(Cow::Borrowed(code)));
    }

    #[test]
    fn ruby_hash_needs_leading_whitespace() {
        let mut scanner = CommentScanner::new(Dialect::keyword().comments());
        assert_eq!(
            scanner.classify("  tag = \"issue#42\" do"),
            LineClass::Code(Cow::Borrowed("  tag = \"issue#42\" do"))
        );
    }

    #[test]
    fn trailing_line_comment_is_cut() {
        let mut scanner = CommentScanner::new(Dialect::brace().comments());
        assert_eq!(
            scanner.classify("if (x) { // }"),
            LineClass::Code(Cow::Borrowed("if (x) { "))
        );
        assert_eq!(
            scanner.classify("url = \"http://example.com\"; {"),
            LineClass::Code(Cow::Borrowed("url = \"http://example.com\"; {"))
        );
    }

    #[test]
    fn ruby_interpolation_is_not_a_comment() {
        let mut scanner = CommentScanner::new(Dialect::keyword().comments());
        assert_eq!(
            scanner.classify("  puts \"value #{x}\" # do not count"),
            LineClass::Code(Cow::Borrowed("  puts \"value #{x}\" "))
        );
    }

    #[test]
    fn ruby_begin_end_comments() {
        let lines = ["def f", "=begin", "  def g", "=end", "end"];
        let classes = classify_all(Dialect::keyword().comments(), &lines);
        let live: Vec<bool> = classes.iter().map(is_code).collect();
        assert_eq!(live, vec![true, false, false, false, true]);
    }

    #[test]
    fn pure_line_comment_inside_block_keeps_state() {
        let mut scanner = CommentScanner::new(Dialect::brace().comments());
        scanner.classify("/*");
        assert_eq!(scanner.classify("// inside"), LineClass::Comment);
        assert!(scanner.in_block_comment());
        assert_eq!(scanner.classify("*/"), LineClass::Comment);
        assert!(!scanner.in_block_comment());
    }
}

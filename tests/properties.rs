//! Property-based tests for block extraction and symbol location.
//!
//! Programs are generated from a shape of nested blocks, optionally salted
//! with asides (comments full of delimiters, or members that balance on
//! their own), and the extractor must always stop on the line that closes
//! the outermost block.

use proptest::prelude::*;
use span_pick::{Dialect, LocateQuery, Position, SearchMode, SourceText, SpanKind, extract, locate};

struct Syntax {
    header: &'static str,
    open: &'static str,
    statement: &'static str,
    close: &'static str,
    trailer: [&'static str; 2],
    /// Inserts that must never move the end of the outer block.
    asides: &'static [&'static [&'static str]],
}

const BRACE: Syntax = Syntax {
    header: "int outer(void) {",
    open: "if (ready) {",
    statement: "count += 1;",
    close: "}",
    trailer: ["int next(void) {", "}"],
    asides: &[
        &["// } }"],
        &["/* } { } */"],
        &["count += 1; // }"],
        &["count += 1;// }"],
        &["// {{"],
        &["count += 1; /* {", "} */"],
        &["/* {", "   { */"],
    ],
};

const KEYWORD: Syntax = Syntax {
    header: "def outer",
    open: "if ready",
    statement: "count += 1",
    close: "end",
    trailer: ["def following", "end"],
    asides: &[
        &["# end end"],
        &["count += 1 # end"],
        &["# if x then"],
        &["def name=(value)", "  @name = value", "end"],
        &["def self.label=(text)", "  @label = text", "end"],
        &["def twice(x) = x * 2"],
        &["=begin", "def hidden", "=end"],
    ],
};

/// A rendered program and the index of the line closing its first block.
struct Program {
    lines: Vec<String>,
    close_line: usize,
}

/// Each step is `(op, aside)`: op 0 opens a block, 1 adds a statement, 2
/// closes the innermost block; `aside` inserts one of the syntax's asides
/// first.
fn render(syntax: &Syntax, steps: &[(u8, Option<usize>)]) -> Program {
    let mut lines = vec![syntax.header.to_string()];
    let mut depth = 1;
    let indent = |depth: usize| "  ".repeat(depth);

    for &(op, aside) in steps {
        if let Some(kind) = aside {
            let aside = syntax.asides[kind % syntax.asides.len()];
            lines.extend(aside.iter().map(|line| format!("{}{}", indent(depth), line)));
        }
        match op {
            0 => {
                lines.push(format!("{}{}", indent(depth), syntax.open));
                depth += 1;
            }
            2 if depth > 1 => {
                depth -= 1;
                lines.push(format!("{}{}", indent(depth), syntax.close));
            }
            _ => lines.push(format!("{}{}", indent(depth), syntax.statement)),
        }
    }
    while depth > 1 {
        depth -= 1;
        lines.push(format!("{}{}", indent(depth), syntax.close));
    }
    lines.push(syntax.close.to_string());
    let close_line = lines.len() - 1;
    lines.extend(syntax.trailer.iter().map(|line| line.to_string()));

    Program { lines, close_line }
}

fn clean_steps() -> impl Strategy<Value = Vec<(u8, Option<usize>)>> {
    prop::collection::vec((0u8..3, Just(None)), 0..40)
}

fn steps_with_asides() -> impl Strategy<Value = Vec<(u8, Option<usize>)>> {
    prop::collection::vec((0u8..3, prop::option::of(0usize..8)), 0..40)
}

fn check_balanced(syntax: &Syntax, dialect: &Dialect, steps: &[(u8, Option<usize>)]) -> Result<(), TestCaseError> {
    let program = render(syntax, steps);
    let joined = program.lines.join("\n");
    let text = SourceText::new(&joined);

    let span = extract(&text, Position::new(0, 0), dialect)
        .map_err(|e| TestCaseError::fail(e.to_string()))?;
    prop_assert_eq!(span.kind(), SpanKind::Balanced);
    prop_assert_eq!(span.end_line(), program.close_line);
    prop_assert_eq!(span.text(), program.lines[..=program.close_line].join("\n"));
    Ok(())
}

proptest! {
    #[test]
    fn brace_blocks_end_on_the_outer_close(steps in clean_steps()) {
        check_balanced(&BRACE, Dialect::brace(), &steps)?;
    }

    #[test]
    fn keyword_blocks_end_on_the_outer_close(steps in clean_steps()) {
        check_balanced(&KEYWORD, Dialect::keyword(), &steps)?;
    }

    #[test]
    fn brace_asides_never_move_the_end(steps in steps_with_asides()) {
        check_balanced(&BRACE, Dialect::brace(), &steps)?;
    }

    #[test]
    fn keyword_asides_never_move_the_end(steps in steps_with_asides()) {
        check_balanced(&KEYWORD, Dialect::keyword(), &steps)?;
    }

    #[test]
    fn re_extracting_a_span_reproduces_it(steps in steps_with_asides(), keyword in any::<bool>()) {
        let (syntax, dialect) = if keyword {
            (&KEYWORD, Dialect::keyword())
        } else {
            (&BRACE, Dialect::brace())
        };
        let joined = render(syntax, &steps).lines.join("\n");
        let first = extract(&SourceText::new(&joined), Position::new(0, 0), dialect)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        let again = extract(&SourceText::new(first.text()), Position::new(0, 0), dialect)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(again.text(), first.text());
        prop_assert_eq!(again.line_count(), first.line_count());
    }

    #[test]
    fn usage_is_found_below_commented_mentions(
        filler in 0usize..30,
        mentions in prop::collection::vec(0usize..30, 0..5),
    ) {
        let mut lines: Vec<String> = (0..filler).map(|i| format!("    total += {};", i)).collect();
        for &at in &mentions {
            let at = at.min(lines.len());
            lines.insert(at, "    // target_call(0) is slow".to_string());
        }
        let target = lines.len();
        lines.push("    target_call(42);".to_string());
        lines.push("}".to_string());

        let joined = lines.join("\n");
        let text = SourceText::new(&joined);
        let query = LocateQuery::new("target_call", None, SearchMode::Usage).unwrap();
        prop_assert_eq!(locate(&text, &query, Dialect::brace()), Some(Position::new(target, 4)));
    }
}

use crate::extractor::BlockSpan;
use crate::types::{InputResolution, Position};
use console::{Style, Term};
use std::io::{self, Write};
use std::path::Path;

/// Preview lines are cut to this many characters.
const PREVIEW_WIDTH: usize = 100;

pub struct DisplayManager {
    term: Term,
    // Predefined styles for consistency
    pub error_style: Style,
    pub warning_style: Style,
    pub success_style: Style,
    pub filename_style: Style,
    pub metadata_style: Style,
    pub ambiguous_style: Style,
    pub preview_style: Style,
}

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayManager {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(), // Status goes to stderr, results to stdout
            error_style: Style::new().red().bold(),
            warning_style: Style::new().yellow(),
            success_style: Style::new().green(),
            filename_style: Style::new().cyan().bold(),
            metadata_style: Style::new().dim(),
            ambiguous_style: Style::new().magenta().bold(),
            preview_style: Style::new().white().dim(),
        }
    }

    /// Explain why a file argument did not resolve to exactly one file.
    pub fn print_resolution_error(&self, resolution: &InputResolution<'_>) -> io::Result<()> {
        let mut stderr = self.term.clone();

        match resolution {
            InputResolution::Success(_) => {}
            InputResolution::PathDoesNotExist {
                input_string,
                path_tried,
            } => {
                writeln!(
                    stderr,
                    "{} {}",
                    self.error_style
                        .apply_to(format!("Path does not exist: '{}'", input_string)),
                    self.metadata_style
                        .apply_to(format!("(checked: {:?})", path_tried))
                )?;
            }
            InputResolution::NotFound { input_string } => {
                writeln!(
                    stderr,
                    "{}",
                    self.warning_style
                        .apply_to(format!("No file matches '{}'", input_string))
                )?;
            }
            InputResolution::InvalidGlobPattern {
                input_string,
                error,
            } => {
                writeln!(
                    stderr,
                    "{} {}",
                    self.error_style
                        .apply_to(format!("Invalid glob pattern '{}':", input_string)),
                    self.metadata_style.apply_to(error)
                )?;
            }
            InputResolution::Ambiguous {
                input_string,
                conflicting_paths,
            } => {
                writeln!(
                    stderr,
                    "{} {}",
                    self.ambiguous_style
                        .apply_to(format!("Input '{}' is ambiguous,", input_string)),
                    self.metadata_style.apply_to("matched:")
                )?;
                for path in conflicting_paths {
                    writeln!(
                        stderr,
                        "  {} {}",
                        self.metadata_style.apply_to("→"),
                        self.filename_style.apply_to(path.to_string_lossy())
                    )?;
                }
                writeln!(
                    stderr,
                    "{}",
                    self.metadata_style
                        .apply_to("Pass a longer path to pick one file.")
                )?;
            }
        }
        Ok(())
    }

    pub fn print_not_found(&self, name: &str, path: &Path) -> io::Result<()> {
        let mut stderr = self.term.clone();
        writeln!(
            stderr,
            "{} {}",
            self.warning_style
                .apply_to(format!("'{}' does not occur in", name)),
            self.filename_style.apply_to(path.to_string_lossy())
        )
    }

    /// Styled preview of an extracted span, numbered with 1-based lines.
    pub fn print_span_preview(&self, path: &Path, span: &BlockSpan) -> io::Result<()> {
        let mut stderr = self.term.clone();

        writeln!(
            stderr,
            "{} {}",
            self.filename_style.apply_to(path.to_string_lossy()),
            self.metadata_style.apply_to(format!(
                "lines {}-{} ({} lines)",
                span.start_line() + 1,
                span.end_line() + 1,
                span.line_count()
            ))
        )?;
        if span.is_fallback() {
            writeln!(
                stderr,
                "{} {}",
                self.warning_style.apply_to("⚠"),
                self.warning_style
                    .apply_to("no balanced block found; showing a fixed window")
            )?;
        }

        let width = (span.end_line() + 1).to_string().len();
        for (offset, line) in span.text().split('\n').enumerate() {
            writeln!(
                stderr,
                "{} {}",
                self.metadata_style
                    .apply_to(format!("{:>width$}│", span.start_line() + offset + 1)),
                self.preview_style.apply_to(truncate(line, PREVIEW_WIDTH))
            )?;
        }
        Ok(())
    }

    /// Print clipboard status
    pub fn print_clipboard_status(&self, result: Result<usize, &str>) -> io::Result<()> {
        let mut stderr = self.term.clone();

        match result {
            Ok(size) => writeln!(
                stderr,
                "{} Prompt copied to clipboard ({} bytes)",
                self.success_style.apply_to("✅"),
                self.metadata_style.apply_to(size.to_string())
            ),
            Err(err_msg) => {
                writeln!(
                    stderr,
                    "{} Failed to copy to clipboard: {}",
                    self.warning_style.apply_to("⚠"),
                    self.warning_style.apply_to(err_msg)
                )?;
                writeln!(stderr, "   Output printed to stdout instead.")
            }
        }
    }
}

/// `path:line:column`, 1-based unless `raw` asks for the 0-based values.
pub fn format_location(path: &Path, position: Position, raw: bool) -> String {
    if raw {
        format!("{}:{}:{}", path.display(), position.line, position.column)
    } else {
        format!("{}:{}", path.display(), position)
    }
}

/// The prompt handed to a model: what to look for, then the code to read.
pub fn generate_prompt_markdown(purpose: Option<&str>, code: &str) -> String {
    let mut markdown_output = String::new();
    if let Some(purpose) = purpose.map(str::trim).filter(|p| !p.is_empty()) {
        markdown_output.push_str(&format!("```purpose\n{}\n```\n\n", purpose));
    }
    markdown_output.push_str(&format!("```code\n{}\n```\n", code.trim_end()));
    markdown_output
}

fn truncate(line: &str, max_chars: usize) -> String {
    if line.chars().count() <= max_chars {
        return line.to_string();
    }
    let kept: String = line.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_has_purpose_then_code() {
        let prompt = generate_prompt_markdown(Some("  find the retry loop "), "def f\nend\n\n");
        assert_eq!(
            prompt,
            "```purpose\nfind the retry loop\n```\n\n```code\ndef f\nend\n```\n"
        );
    }

    #[test]
    fn blank_purpose_is_omitted() {
        assert_eq!(generate_prompt_markdown(Some("  "), "x"), "```code\nx\n```\n");
        assert_eq!(generate_prompt_markdown(None, "x"), "```code\nx\n```\n");
    }

    #[test]
    fn locations_are_one_based_unless_raw() {
        let path = Path::new("lib/a.rb");
        assert_eq!(format_location(path, Position::new(0, 4), false), "lib/a.rb:1:5");
        assert_eq!(format_location(path, Position::new(0, 4), true), "lib/a.rb:0:4");
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate("héllo", 5), "héllo");
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
    }
}

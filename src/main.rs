//! span-pick: find a symbol in a source file and cut out the block around it.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use arboard::Clipboard;
use clap::{Parser, Subcommand};
use console::style;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use span_pick::config::Config;
use span_pick::display::{DisplayManager, format_location, generate_prompt_markdown};
use span_pick::error::AppError;
use span_pick::file_resolver::resolve_single_file;
use span_pick::types::{InputResolution, ResolvedFile};
use span_pick::{
    DialectKind, LocateQuery, Position, ResolveError, SearchMode, SourceText, extract, locate,
    resolve,
};

#[derive(Parser)]
#[command(name = "span-pick")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Directory file arguments are resolved against (defaults to current directory)
    #[arg(short, long, global = true)]
    workspace: Option<PathBuf>,

    /// Force a dialect instead of choosing one from the file name
    #[arg(short, long, value_enum, global = true)]
    dialect: Option<DialectKind>,

    /// Fall back to a window of this many lines when no block balances
    #[arg(long, global = true)]
    window: Option<usize>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print where a symbol occurs as path:line:column
    Locate {
        /// Source file: a path, a file:// URI, a glob or part of a name
        file: String,

        /// Symbol name, optionally qualified (e.g. "User::save", "conn->send")
        name: String,

        /// A line of text expected to contain the symbol
        #[arg(long)]
        hint: Option<String>,

        /// Accept the symbol's own definition line
        #[arg(long)]
        declaration: bool,

        /// Print 0-based line and column
        #[arg(long)]
        raw: bool,
    },

    /// Print the block that starts on a line
    Extract {
        /// Source file: a path, a file:// URI, a glob or part of a name
        file: String,

        /// 1-based line the block starts on
        #[arg(short, long)]
        line: usize,

        /// 1-based column (informational)
        #[arg(short, long, default_value = "1")]
        column: usize,
    },

    /// Locate a symbol and build a prompt from the block it starts
    Resolve {
        /// Source file: a path, a file:// URI, a glob or part of a name
        file: String,

        /// Symbol name, optionally qualified
        name: String,

        /// A line of text expected to contain the symbol
        #[arg(long)]
        hint: Option<String>,

        /// Accept the symbol's own definition line
        #[arg(long)]
        declaration: bool,

        /// What the reader of the prompt should look for
        #[arg(short, long)]
        purpose: Option<String>,

        /// Copy the prompt to the clipboard instead of printing it
        #[arg(long)]
        copy: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", style("error").red().bold());
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  {}: {cause}", style("caused by").dim());
                source = std::error::Error::source(cause);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let config = Config::new(cli.workspace, cli.dialect, cli.window)?;
    let display = DisplayManager::new();

    match cli.command {
        Commands::Locate {
            file,
            name,
            hint,
            declaration,
            raw,
        } => {
            let (resolved, content) = load_source(&file, &config, &display)?;
            let dialect = config.dialect_for(resolved.canonical_path())?;
            let text = SourceText::new(&content);
            let query = LocateQuery::new(&name, hint.as_deref(), search_mode(declaration))?;

            match locate(&text, &query, &dialect) {
                Some(position) => {
                    println!("{}", format_location(resolved.display_path(), position, raw));
                    Ok(())
                }
                None => {
                    display
                        .print_not_found(&name, resolved.display_path())
                        .unwrap_or_else(|e| warn!("display error: {}", e));
                    Err(ResolveError::NotFound { name }.into())
                }
            }
        }
        Commands::Extract { file, line, column } => {
            if line == 0 || column == 0 {
                return Err(AppError::ConfigError(
                    "--line and --column are 1-based".to_string(),
                ));
            }
            let (resolved, content) = load_source(&file, &config, &display)?;
            let dialect = config.dialect_for(resolved.canonical_path())?;
            let text = SourceText::new(&content);

            let span = extract(&text, Position::new(line - 1, column - 1), &dialect)?;
            if span.is_fallback() {
                warn!(
                    file = %resolved.display_path().display(),
                    lines = span.line_count(),
                    "no balanced block, printed a fixed window"
                );
            }
            println!("{}", span.text());
            Ok(())
        }
        Commands::Resolve {
            file,
            name,
            hint,
            declaration,
            purpose,
            copy,
        } => {
            let (resolved, content) = load_source(&file, &config, &display)?;
            let dialect = config.dialect_for(resolved.canonical_path())?;
            let text = SourceText::new(&content);
            let query = LocateQuery::new(&name, hint.as_deref(), search_mode(declaration))?;

            let resolution = match resolve(&text, &query, &dialect) {
                Ok(resolution) => resolution,
                Err(ResolveError::NotFound { name }) => {
                    display
                        .print_not_found(&name, resolved.display_path())
                        .unwrap_or_else(|e| warn!("display error: {}", e));
                    return Err(ResolveError::NotFound { name }.into());
                }
                Err(other) => return Err(other.into()),
            };
            info!(
                position = %resolution.position,
                lines = resolution.span.line_count(),
                "resolved"
            );

            display
                .print_span_preview(resolved.display_path(), &resolution.span)
                .unwrap_or_else(|e| warn!("display error: {}", e));

            let prompt = generate_prompt_markdown(purpose.as_deref(), resolution.span.text());
            if copy && copy_to_clipboard(&prompt, &display) {
                return Ok(());
            }
            print!("{}", prompt);
            Ok(())
        }
    }
}

fn search_mode(declaration: bool) -> SearchMode {
    if declaration {
        SearchMode::Declaration
    } else {
        SearchMode::Usage
    }
}

/// Resolves a file argument to exactly one file and reads it.
fn load_source(
    input: &str,
    config: &Config,
    display: &DisplayManager,
) -> Result<(ResolvedFile, String), AppError> {
    let resolved = match resolve_single_file(input, config) {
        InputResolution::Success(mut files) if files.len() == 1 => files.remove(0),
        failure => {
            display
                .print_resolution_error(&failure)
                .unwrap_or_else(|e| warn!("display error: {}", e));
            return Err(AppError::ResolutionError {
                input: input.to_string(),
                message: "expected exactly one source file".to_string(),
            });
        }
    };
    debug!(path = %resolved.canonical_path().display(), "reading source");

    let content = fs::read_to_string(resolved.canonical_path()).map_err(|e| {
        AppError::IoError(format!(
            "Failed to read {}: {}",
            resolved.display_path().display(),
            e
        ))
    })?;
    Ok((resolved, content))
}

/// Returns whether the prompt ended up on the clipboard.
fn copy_to_clipboard(prompt: &str, display: &DisplayManager) -> bool {
    let outcome = Clipboard::new().and_then(|mut clipboard| clipboard.set_text(prompt.to_string()));
    let status = match &outcome {
        Ok(()) => display.print_clipboard_status(Ok(prompt.len())),
        Err(err) => display.print_clipboard_status(Err(&err.to_string())),
    };
    status.unwrap_or_else(|e| warn!("display error: {}", e));
    outcome.is_ok()
}

use crate::dialect::{Dialect, DialectKind, NoDelimiterFallback};
use crate::error::AppError;
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Config {
    pub working_dir: PathBuf,
    /// Dialect forced from the command line instead of guessing from the file name.
    pub dialect: Option<DialectKind>,
    /// Replaces the dialect's fallback with a window of this many lines.
    pub fallback_window: Option<usize>,
}

impl Config {
    /// Creates a new Config instance.
    ///
    /// Uses `working_dir` when given, the current directory otherwise.
    pub fn new(
        working_dir: Option<PathBuf>,
        dialect: Option<DialectKind>,
        fallback_window: Option<usize>,
    ) -> Result<Self, AppError> {
        let working_dir = match working_dir {
            Some(dir) => dir,
            None => env::current_dir().map_err(|io_err| {
                AppError::IoError(format!(
                    "Failed to determine current working directory: {}",
                    io_err
                ))
            })?,
        };
        if fallback_window == Some(0) {
            return Err(AppError::ConfigError(
                "fallback window must be at least one line".to_string(),
            ));
        }
        Ok(Config {
            working_dir,
            dialect,
            fallback_window,
        })
    }

    /// The dialect to use for `path`, with the window override applied.
    pub fn dialect_for(&self, path: &Path) -> Result<Dialect, AppError> {
        let kind = self
            .dialect
            .or_else(|| DialectKind::for_path(path))
            .ok_or_else(|| AppError::UnsupportedFile {
                path: path.to_path_buf(),
            })?;
        let dialect = kind.dialect();
        match self.fallback_window {
            Some(size) => Ok(dialect.with_fallback(NoDelimiterFallback::Window(size))?),
            None => Ok(dialect.clone()),
        }
    }
}

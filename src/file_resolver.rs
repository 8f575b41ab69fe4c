// src/file_resolver.rs

use crate::config::Config;
use crate::types::{InputResolution, ResolvedFile};
use glob::glob;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

const FILE_URI_PREFIX: &str = "file://";

fn is_walkdir_file_entry(entry: &DirEntry) -> bool {
    entry.file_type().is_file()
}

/// Attempts to create a ResolvedFile instance from a given path.
fn create_resolved_file(path_to_resolve: &Path, config: &Config) -> Result<ResolvedFile, String> {
    let canonical_path = fs::canonicalize(path_to_resolve)
        .map_err(|e| format!("Failed to canonicalize path {:?}: {}", path_to_resolve, e))?;

    let display_path = pathdiff::diff_paths(&canonical_path, &config.working_dir)
        .unwrap_or_else(|| canonical_path.clone());

    Ok(ResolvedFile::new(display_path, canonical_path))
}

/// Drops a leading `file://` so editor URIs can be passed as paths.
pub fn strip_file_uri(input: &str) -> &str {
    input.strip_prefix(FILE_URI_PREFIX).unwrap_or(input)
}

/// Resolves a single input string into an `InputResolution` outcome.
///
/// Three phases, first hit wins:
/// 1. Direct Match: the input is an existing file or directory.
/// 2. Glob Match: the input contains glob characters.
/// 3. Fuzzy Search: a recursive search for paths containing the input.
pub fn resolve_input_string<'a>(input_str: &'a str, config: &Config) -> InputResolution<'a> {
    let path_str = strip_file_uri(input_str);

    // --- Phase 1: Direct Match ---
    // Checked before globbing so that names like "file[1].rb" still resolve.
    let path_to_check = config.working_dir.join(path_str);
    if path_to_check.is_file() {
        return match create_resolved_file(&path_to_check, config) {
            Ok(resolved) => InputResolution::Success(vec![resolved]),
            Err(err_msg) => {
                warn!(input = input_str, "found explicit file but could not process it: {}", err_msg);
                InputResolution::NotFound {
                    input_string: input_str,
                }
            }
        };
    } else if path_to_check.is_dir() {
        let files_in_dir: Vec<ResolvedFile> = WalkDir::new(&path_to_check)
            .min_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(is_walkdir_file_entry)
            .filter_map(|entry| match create_resolved_file(entry.path(), config) {
                Ok(resolved) => Some(resolved),
                Err(err_msg) => {
                    warn!(input = input_str, path = ?entry.path(), "skipping file in directory: {}", err_msg);
                    None
                }
            })
            .collect();
        debug!(input = input_str, count = files_in_dir.len(), "expanded directory");
        return InputResolution::Success(files_in_dir);
    }

    // --- Phase 2: Glob Pattern Match ---
    let is_glob_pattern = path_str.contains(&['*', '?', '[', '{'][..]);
    if is_glob_pattern {
        let pattern = config.working_dir.join(path_str);
        return match glob(&pattern.to_string_lossy()) {
            Err(pattern_error) => InputResolution::InvalidGlobPattern {
                input_string: input_str,
                error: pattern_error.to_string(),
            },
            Ok(paths) => {
                let mut resolved_files: Vec<ResolvedFile> = Vec::new();
                for entry in paths {
                    match entry {
                        Ok(path) if path.is_file() => match create_resolved_file(&path, config) {
                            Ok(resolved) => resolved_files.push(resolved),
                            Err(err_msg) => {
                                warn!(input = input_str, path = ?path, "glob match could not be processed: {}", err_msg);
                            }
                        },
                        Ok(_) => {}
                        Err(glob_error) => {
                            warn!(input = input_str, "error while reading glob match: {}", glob_error);
                        }
                    }
                }

                if resolved_files.is_empty() {
                    InputResolution::NotFound {
                        input_string: input_str,
                    }
                } else {
                    InputResolution::Success(resolved_files)
                }
            }
        };
    }

    // --- Phase 3: Fuzzy Search (Fallback) ---
    let mut candidate_paths: Vec<PathBuf> = WalkDir::new(&config.working_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(is_walkdir_file_entry)
        .filter(|entry| {
            let relative_path = pathdiff::diff_paths(entry.path(), &config.working_dir)
                .unwrap_or_else(|| entry.path().to_path_buf());
            relative_path.to_string_lossy().contains(path_str)
        })
        .map(DirEntry::into_path)
        .collect();

    candidate_paths.sort();
    candidate_paths.dedup();
    debug!(input = input_str, candidates = candidate_paths.len(), "fuzzy search finished");

    match candidate_paths.as_slice() {
        [] => {
            // Distinguish a mistyped path from a name that simply isn't there.
            if path_str.contains(std::path::MAIN_SEPARATOR) {
                InputResolution::PathDoesNotExist {
                    input_string: input_str,
                    path_tried: config.working_dir.join(path_str),
                }
            } else {
                InputResolution::NotFound {
                    input_string: input_str,
                }
            }
        }
        [only] => match create_resolved_file(only, config) {
            Ok(resolved) => InputResolution::Success(vec![resolved]),
            Err(err_msg) => {
                warn!(input = input_str, "unique match could not be processed: {}", err_msg);
                InputResolution::NotFound {
                    input_string: input_str,
                }
            }
        },
        _ => InputResolution::Ambiguous {
            input_string: input_str,
            conflicting_paths: display_paths(&candidate_paths, config),
        },
    }
}

/// Like [`resolve_input_string`], but demands exactly one file.
///
/// A directory or glob that expands to several files is reported as
/// ambiguous, and one that expands to none as not found.
pub fn resolve_single_file<'a>(input_str: &'a str, config: &Config) -> InputResolution<'a> {
    match resolve_input_string(input_str, config) {
        InputResolution::Success(files) if files.is_empty() => InputResolution::NotFound {
            input_string: input_str,
        },
        InputResolution::Success(files) if files.len() > 1 => {
            let paths: Vec<PathBuf> = files
                .iter()
                .map(|file| file.display_path().to_path_buf())
                .collect();
            InputResolution::Ambiguous {
                input_string: input_str,
                conflicting_paths: paths,
            }
        }
        other => other,
    }
}

fn display_paths(paths: &[PathBuf], config: &Config) -> Vec<PathBuf> {
    paths
        .iter()
        .map(|p| pathdiff::diff_paths(p, &config.working_dir).unwrap_or_else(|| p.clone()))
        .collect()
}

use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Thin wrapper around `syn::parse_file`.
pub struct AstParser;

/// A Rust source file together with its syntax tree.
#[derive(Debug)]
pub struct ParsedFile {
    pub path: PathBuf,
    pub syntax_tree: syn::File,
}

impl ParsedFile {
    /// Builds a `ParsedFile` from in-memory source; `path` is only used for messages.
    pub fn from_source(path: impl Into<PathBuf>, source: &str) -> Result<Self> {
        let path = path.into();
        let syntax_tree = syn::parse_file(source)
            .with_context(|| format!("Failed to parse Rust syntax in file: {}", path.display()))?;
        Ok(Self { path, syntax_tree })
    }
}

impl AstParser {
    /// Reads and parses one file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or is not valid Rust.
    pub fn parse_file(path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        ParsedFile::from_source(path, &content)
    }

    /// Parses every path, keeping the per-file outcome in input order.
    pub fn parse_files(paths: &[PathBuf]) -> Vec<Result<ParsedFile>> {
        let results: Vec<Result<ParsedFile>> =
            paths.iter().map(|path| Self::parse_file(path)).collect();

        let failures = results.iter().filter(|r| r.is_err()).count();
        debug!(
            "Parsing complete: {} succeeded, {} failed",
            results.len() - failures,
            failures
        );

        results
    }
}

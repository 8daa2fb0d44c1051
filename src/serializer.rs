//! Serialization of the OpenAPI document.
//!
//! The document is written as JSON indented by two spaces. Every map in
//! [`OpenApiDocument`] is ordered, so the output is byte-for-byte stable.

use crate::openapi_builder::OpenApiDocument;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Serializes a document as pretty-printed JSON (two-space indent, no trailing newline).
pub fn serialize_json(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to JSON");
    serde_json::to_string_pretty(doc).context("Failed to serialize OpenAPI document to JSON")
}

/// Writes `content` to `path`, replacing any existing file.
///
/// The parent directory must already exist.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

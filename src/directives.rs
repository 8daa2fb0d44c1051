//! Documentation directives read from doc comments.
//!
//! General API information lives in the entry file, either as inner doc comments
//! (`//!`) or on `fn main`:
//!
//! ```text
//! //! @title Pet Store
//! //! @version 1.2.0
//! //! @description.markdown
//! //! @BasePath /api/v1
//! ```
//!
//! Handlers carry operation directives in their `///` comments. Leading prose
//! becomes the summary (first line) and description (remaining lines).
//!
//! ```text
//! /// Fetch a single user.
//! /// @tags users
//! /// @description.markdown get_user
//! ```
//!
//! Directive names are matched case-insensitively. Unknown directives are ignored.

use crate::error::EngineError;
use std::fs;
use std::path::Path;
use syn::{Attribute, Expr, Item, Lit, Meta};

/// Markdown file read for a general-info `@description.markdown` without a name.
pub const GENERAL_MARKDOWN_NAME: &str = "api";

/// General API information from the entry file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneralInfo {
    pub title: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    /// Set when `@description.markdown` was present.
    pub description_markdown: bool,
    pub terms_of_service: Option<String>,
    pub contact_name: Option<String>,
    pub contact_url: Option<String>,
    pub contact_email: Option<String>,
    pub license_name: Option<String>,
    pub license_url: Option<String>,
    pub base_path: Option<String>,
}

/// Documentation attached to one handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationDocs {
    pub summary: Option<String>,
    pub description: Option<String>,
    /// `Some(name)` when `@description.markdown` was present; an empty name means
    /// "use the handler name".
    pub description_markdown: Option<String>,
    pub tags: Vec<String>,
    pub deprecated: bool,
}

/// Returns the text of every `#[doc = "..."]` attribute, one entry per line.
pub fn doc_lines(attrs: &[Attribute]) -> Vec<String> {
    let mut lines = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("doc") {
            continue;
        }
        if let Meta::NameValue(name_value) = &attr.meta {
            if let Expr::Lit(expr_lit) = &name_value.value {
                if let Lit::Str(text) = &expr_lit.lit {
                    for line in text.value().lines() {
                        let line = line.strip_prefix(' ').unwrap_or(line);
                        lines.push(line.trim_end().to_string());
                    }
                }
            }
        }
    }
    lines
}

/// Splits `@key value` into a lowercase key and a trimmed value.
fn split_directive(line: &str) -> Option<(String, &str)> {
    let rest = line.trim_start().strip_prefix('@')?;
    let (key, value) = match rest.find(char::is_whitespace) {
        Some(pos) => (&rest[..pos], rest[pos..].trim()),
        None => (rest, ""),
    };
    if key.is_empty() {
        return None;
    }
    Some((key.to_ascii_lowercase(), value))
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn append_line(target: &mut Option<String>, value: &str) {
    match target {
        Some(existing) => {
            existing.push('\n');
            existing.push_str(value);
        }
        None => *target = Some(value.to_string()),
    }
}

/// Reads general API info from the entry file's inner docs and `fn main` docs.
pub fn parse_general_info(file: &syn::File) -> GeneralInfo {
    let mut lines = doc_lines(&file.attrs);
    for item in &file.items {
        if let Item::Fn(item_fn) = item {
            if item_fn.sig.ident == "main" {
                lines.extend(doc_lines(&item_fn.attrs));
            }
        }
    }

    let mut info = GeneralInfo::default();
    for line in &lines {
        let Some((key, value)) = split_directive(line) else {
            continue;
        };
        match key.as_str() {
            "title" => info.title = non_empty(value),
            "version" => info.version = non_empty(value),
            "description" => append_line(&mut info.description, value),
            "description.markdown" => info.description_markdown = true,
            "termsofservice" => info.terms_of_service = non_empty(value),
            "contact.name" => info.contact_name = non_empty(value),
            "contact.url" => info.contact_url = non_empty(value),
            "contact.email" => info.contact_email = non_empty(value),
            "license.name" => info.license_name = non_empty(value),
            "license.url" => info.license_url = non_empty(value),
            "basepath" => info.base_path = non_empty(value),
            _ => {}
        }
    }
    info
}

/// Reads operation documentation from a handler's attributes.
pub fn parse_operation_docs(attrs: &[Attribute]) -> OperationDocs {
    let mut docs = OperationDocs::default();
    let mut prose: Vec<&str> = Vec::new();
    let mut explicit_description: Option<String> = None;

    let lines = doc_lines(attrs);
    for line in &lines {
        match split_directive(line) {
            Some((key, value)) => match key.as_str() {
                "summary" => docs.summary = non_empty(value),
                "description" => append_line(&mut explicit_description, value),
                "description.markdown" => docs.description_markdown = Some(value.to_string()),
                "tags" => docs.tags.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(str::to_string),
                ),
                "deprecated" => docs.deprecated = true,
                _ => {}
            },
            None => prose.push(line.as_str()),
        }
    }

    // Leading prose: first non-blank line is the summary, the rest the description.
    let mut prose = prose.into_iter().skip_while(|l| l.trim().is_empty());
    if let Some(first) = prose.next() {
        if docs.summary.is_none() {
            docs.summary = Some(first.trim().to_string());
        }
        let rest: Vec<&str> = prose.collect();
        let rest = rest.join("\n");
        let rest = rest.trim();
        if !rest.is_empty() {
            docs.description = Some(rest.to_string());
        }
    }
    if explicit_description.is_some() {
        docs.description = explicit_description;
    }

    docs
}

/// Loads `<dir>/<name>.md`.
///
/// `owner` names whoever asked for the include and only appears in errors.
pub fn load_markdown(dir: Option<&Path>, name: &str, owner: &str) -> Result<String, EngineError> {
    let dir = dir.ok_or_else(|| EngineError::MarkdownDirUnset {
        directive_owner: owner.to_string(),
    })?;
    let file = dir.join(format!("{}.md", name));
    fs::read_to_string(&file)
        .map(|content| content.trim_end().to_string())
        .map_err(|source| EngineError::MarkdownRead { file, source })
}

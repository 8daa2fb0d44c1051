use std::path::PathBuf;

/// Errors reported by the specification engine.
#[derive(Debug)]
pub enum EngineError {
    /// The entry file does not exist below the search directory.
    EntryFileNotFound(PathBuf),
    /// The entry file exists but is not valid Rust.
    EntryFileParse { file: PathBuf, message: String },
    /// A `@description.markdown` directive was found but no markdown directory is configured.
    MarkdownDirUnset { directive_owner: String },
    /// A markdown include could not be read.
    MarkdownRead { file: PathBuf, source: std::io::Error },
    /// The search directory could not be walked at all.
    Scan { root: PathBuf, message: String },
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            EngineError::EntryFileNotFound(path) => {
                write!(f, "entry file not found: {}", path.display())
            }
            EngineError::EntryFileParse { file, message } => {
                write!(f, "cannot parse entry file {}: {}", file.display(), message)
            }
            EngineError::MarkdownDirUnset { directive_owner } => write!(
                f,
                "{} uses @description.markdown but no markdown include directory is set",
                directive_owner
            ),
            EngineError::MarkdownRead { file, source } => {
                write!(f, "cannot read markdown include {}: {}", file.display(), source)
            }
            EngineError::Scan { root, message } => {
                write!(f, "cannot scan {}: {}", root.display(), message)
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::MarkdownRead { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display_names_the_file() {
        let err = EngineError::EntryFileNotFound(PathBuf::from("src/main.rs"));
        assert_eq!(err.to_string(), "entry file not found: src/main.rs");
    }

    #[test]
    fn test_markdown_read_keeps_io_source() {
        let err = EngineError::MarkdownRead {
            file: PathBuf::from("md/api.md"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("md/api.md"));
        assert!(err.source().is_some());
    }
}

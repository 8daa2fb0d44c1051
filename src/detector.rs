use crate::parser::ParsedFile;
use log::debug;
use std::collections::BTreeSet;
use syn::{Item, UseTree};

/// Web frameworks the engine knows how to extract routes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Framework {
    Axum,
    ActixWeb,
}

impl Framework {
    fn from_crate_name(name: &str) -> Option<Self> {
        match name {
            "axum" => Some(Framework::Axum),
            "actix_web" => Some(Framework::ActixWeb),
            _ => None,
        }
    }
}

/// Finds which frameworks a project imports by looking at its `use` trees.
pub struct FrameworkDetector;

/// Frameworks found in a project, Axum first.
pub struct DetectionResult {
    pub frameworks: Vec<Framework>,
}

impl FrameworkDetector {
    /// Inspects top-level and inline-module `use` items of every file.
    ///
    /// ```no_run
    /// use swagger_doc::detector::FrameworkDetector;
    /// use swagger_doc::parser::AstParser;
    /// use std::path::Path;
    ///
    /// let parsed = AstParser::parse_file(Path::new("src/main.rs")).unwrap();
    /// let result = FrameworkDetector::detect(&[parsed]);
    /// println!("Detected {:?}", result.frameworks);
    /// ```
    pub fn detect(parsed_files: &[ParsedFile]) -> DetectionResult {
        let mut detected = BTreeSet::new();

        for parsed_file in parsed_files {
            Self::check_items(&parsed_file.syntax_tree.items, &mut detected);
        }

        let frameworks: Vec<Framework> = detected.into_iter().collect();
        debug!("Detected frameworks: {:?}", frameworks);

        DetectionResult { frameworks }
    }

    fn check_items(items: &[Item], detected: &mut BTreeSet<Framework>) {
        for item in items {
            match item {
                Item::Use(use_item) => Self::check_use_tree(&use_item.tree, detected),
                Item::Mod(module) => {
                    if let Some((_, items)) = &module.content {
                        Self::check_items(items, detected);
                    }
                }
                _ => {}
            }
        }
    }

    /// Only the first segment of a path names a crate, so nested segments are not inspected.
    fn check_use_tree(tree: &UseTree, detected: &mut BTreeSet<Framework>) {
        let name = match tree {
            UseTree::Path(path) => path.ident.to_string(),
            UseTree::Rename(rename) => rename.ident.to_string(),
            UseTree::Name(name) => name.ident.to_string(),
            UseTree::Group(group) => {
                for item in &group.items {
                    Self::check_use_tree(item, detected);
                }
                return;
            }
            UseTree::Glob(_) => return,
        };

        let name = name.trim_start_matches("r#");
        if let Some(framework) = Framework::from_crate_name(name) {
            detected.insert(framework);
        }
    }
}

//! Module-qualified names for the functions of a project.
//!
//! Every file maps to a module path derived from its location below `src/`
//! (`src/users/mod.rs` and `src/users.rs` are `users`, `src/main.rs` is the crate
//! root), extended by inline `mod` blocks. A [`SymbolTable`] keys items by that
//! path and resolves the paths written at call sites (`users::routes`,
//! `crate::orders::list`, `super::config`, imported names) against it.

use crate::parser::ParsedFile;
use std::collections::HashMap;
use std::path::{Component, Path};
use syn::{Item, UseTree};

/// Module-qualified item path without the leading `crate`, e.g. `["users", "list"]`.
pub type ItemPath = Vec<String>;

/// Renders an item path the way it is written in source.
pub fn display_path(path: &[String]) -> String {
    path.join("::")
}

/// Module path of a source file.
pub fn file_module_path(file: &Path) -> ItemPath {
    let components: Vec<String> = file
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => part.to_str().map(str::to_string),
            _ => None,
        })
        .collect();

    let start = match components.iter().rposition(|c| c == "src") {
        Some(src) => src + 1,
        None => components.len().saturating_sub(1),
    };
    let mut module: ItemPath = components[start..].to_vec();

    // src/bin/*.rs are crate roots of their own
    if module.first().map(String::as_str) == Some("bin") {
        return Vec::new();
    }
    if let Some(file_name) = module.pop() {
        let stem = file_name.strip_suffix(".rs").unwrap_or(&file_name);
        if !matches!(stem, "main" | "lib" | "mod") {
            module.push(stem.to_string());
        }
    }
    module
}

/// Visits every item of `parsed_files` with the module it is declared in,
/// descending into inline `mod` blocks.
pub fn for_each_item<'ast>(
    parsed_files: &'ast [ParsedFile],
    mut visit: impl FnMut(&[String], &'ast Item),
) {
    fn walk<'ast>(
        items: &'ast [Item],
        module: &mut ItemPath,
        visit: &mut dyn FnMut(&[String], &'ast Item),
    ) {
        for item in items {
            visit(module.as_slice(), item);
            if let Item::Mod(item_mod) = item {
                if let Some((_, content)) = &item_mod.content {
                    module.push(item_mod.ident.to_string());
                    walk(content, module, visit);
                    module.pop();
                }
            }
        }
    }

    for parsed_file in parsed_files {
        let mut module = file_module_path(&parsed_file.path);
        walk(&parsed_file.syntax_tree.items, &mut module, &mut visit);
    }
}

/// Outcome of resolving a path written in source.
#[derive(Debug)]
pub enum Lookup<'a, T> {
    Found(&'a ItemPath, &'a T),
    /// Several items match a partial path; they are listed in declaration order.
    Ambiguous(Vec<&'a ItemPath>),
    Missing,
}

/// `use` declarations of one module.
#[derive(Default)]
struct Imports {
    /// Imported name -> path as written after `use`
    names: HashMap<String, Vec<String>>,
    /// Prefixes of `use prefix::*`
    globs: Vec<Vec<String>>,
}

/// Items keyed by their module-qualified path.
pub struct SymbolTable<T> {
    entries: HashMap<ItemPath, T>,
    order: Vec<ItemPath>,
    imports: HashMap<ItemPath, Imports>,
}

impl<T> Default for SymbolTable<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
            imports: HashMap::new(),
        }
    }
}

impl<T> SymbolTable<T> {
    /// Adds an item. A second item with the same path is ignored.
    pub fn insert(&mut self, path: ItemPath, value: T) -> bool {
        if self.entries.contains_key(&path) {
            return false;
        }
        self.order.push(path.clone());
        self.entries.insert(path, value);
        true
    }

    /// Records the names a `use` item of `module` brings into scope.
    pub fn add_use(&mut self, module: &[String], tree: &UseTree) {
        let imports = self.imports.entry(module.to_vec()).or_default();
        collect_use(tree, Vec::new(), imports);
    }

    pub fn get(&self, path: &[String]) -> Option<&T> {
        self.entries.get(path)
    }

    /// Item paths in insertion order.
    pub fn paths(&self) -> &[ItemPath] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Resolves `path` as written inside `module`.
    ///
    /// Exact candidates (imports, relative to `module`, crate-absolute) are tried
    /// first. Otherwise the path is matched against the end of every known item
    /// path, and only a unique match counts.
    pub fn lookup(&self, module: &[String], path: &[String]) -> Lookup<'_, T> {
        if path.is_empty() {
            return Lookup::Missing;
        }

        for candidate in self.candidates(module, path, true) {
            if let Some((key, value)) = self.entries.get_key_value(&candidate) {
                return Lookup::Found(key, value);
            }
        }

        let tail: Vec<String> = path
            .iter()
            .skip_while(|segment| matches!(segment.as_str(), "crate" | "self" | "super"))
            .cloned()
            .collect();
        if tail.is_empty() {
            return Lookup::Missing;
        }
        let mut matches = self.order.iter().filter(|key| key.ends_with(&tail));
        match (matches.next(), matches.next()) {
            (None, _) => Lookup::Missing,
            (Some(key), None) => match self.entries.get(key) {
                Some(value) => Lookup::Found(key, value),
                None => Lookup::Missing,
            },
            (Some(first), Some(second)) => {
                let mut all = vec![first, second];
                all.extend(matches);
                Lookup::Ambiguous(all)
            }
        }
    }

    /// Absolute paths `path` may denote inside `module`, most specific first.
    fn candidates(
        &self,
        module: &[String],
        path: &[String],
        follow_imports: bool,
    ) -> Vec<ItemPath> {
        let (first, rest) = match path.split_first() {
            Some(split) => split,
            None => return Vec::new(),
        };

        match first.as_str() {
            "crate" => return vec![rest.to_vec()],
            "self" => return vec![joined(module, rest)],
            "super" => {
                let supers = path.iter().take_while(|s| s.as_str() == "super").count();
                let base = &module[..module.len().saturating_sub(supers)];
                return vec![joined(base, &path[supers..])];
            }
            _ => {}
        }

        let mut candidates = Vec::new();
        if follow_imports {
            if let Some(imports) = self.imports.get(module) {
                if let Some(target) = imports.names.get(first) {
                    let expanded = joined(target, rest);
                    candidates.extend(self.candidates(module, &expanded, false));
                }
                for glob in &imports.globs {
                    let expanded = joined(glob, path);
                    candidates.extend(self.candidates(module, &expanded, false));
                }
            }
        }
        candidates.push(joined(module, path));
        candidates.push(path.to_vec());
        candidates
    }
}

fn joined(prefix: &[String], rest: &[String]) -> ItemPath {
    prefix.iter().chain(rest).cloned().collect()
}

fn collect_use(tree: &UseTree, prefix: Vec<String>, imports: &mut Imports) {
    match tree {
        UseTree::Path(path) => {
            let mut prefix = prefix;
            prefix.push(path.ident.to_string());
            collect_use(&path.tree, prefix, imports);
        }
        UseTree::Name(name) if name.ident == "self" => {
            if let Some(last) = prefix.last() {
                imports.names.insert(last.clone(), prefix.clone());
            }
        }
        UseTree::Name(name) => {
            let ident = name.ident.to_string();
            imports.names.insert(ident.clone(), joined(&prefix, &[ident]));
        }
        UseTree::Rename(rename) => {
            let target = joined(&prefix, &[rename.ident.to_string()]);
            imports.names.insert(rename.rename.to_string(), target);
        }
        UseTree::Glob(_) => imports.globs.push(prefix),
        UseTree::Group(group) => {
            for tree in &group.items {
                collect_use(tree, prefix.clone(), imports);
            }
        }
    }
}

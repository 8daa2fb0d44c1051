//! The specification engine: turns a project's sources into an [`OpenApiDocument`].
//!
//! [`SpecEngine`] is the contract the generator drives. [`SourceEngine`] implements
//! it by scanning, parsing and analysing the project with the modules of this crate.

use crate::detector::{Framework, FrameworkDetector};
use crate::diagnostics::{Debugger, NullDebugger, BENIGN_DIAGNOSTIC};
use crate::directives::{load_markdown, parse_general_info, GENERAL_MARKDOWN_NAME};
use crate::error::EngineError;
use crate::extractor::actix::ActixExtractor;
use crate::extractor::axum::AxumExtractor;
use crate::extractor::{RouteExtractor, RouteInfo};
use crate::openapi_builder::{OpenApiBuilder, OpenApiDocument};
use crate::parser::AstParser;
use crate::scanner::FileScanner;
use crate::schema_generator::{SchemaGenerator, SchemaOptions};
use crate::type_resolver::TypeResolver;
use log::{debug, info};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Produces an OpenAPI document from a source tree.
pub trait SpecEngine {
    /// Analyses the project below `search_dir`, starting from the entry file
    /// `main_file` (relative to `search_dir`).
    ///
    /// `max_depth` bounds how deep model types are followed under
    /// [`ResolutionStrategy::Legacy`]; 0 means no bound.
    fn parse_api(
        &mut self,
        search_dir: &Path,
        main_file: &Path,
        max_depth: usize,
    ) -> Result<(), EngineError>;

    /// The document built by the last successful [`SpecEngine::parse_api`].
    fn document(&self) -> &OpenApiDocument;
}

/// How model types referenced by routes are followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionStrategy {
    /// Every model reachable from a route is documented.
    #[default]
    ProjectListing,
    /// Models are followed at most `max_depth` levels deep.
    Legacy,
}

/// Which referenced types get full schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseDependency {
    /// Model types are documented as plain objects.
    #[default]
    None,
    /// Structs and enums declared in the project are documented as components.
    Models,
}

pub struct EngineOptions {
    /// Comma-separated path fragments to skip while scanning
    pub excluded_dirs_and_files: Option<String>,
    /// Directory holding the `.md` files named by `@description.markdown`
    pub markdown_file_dir: Option<PathBuf>,
    pub strategy: ResolutionStrategy,
    pub parse_dependency: ParseDependency,
    /// Also document private handlers and model types
    pub parse_internal: bool,
    pub debugger: Box<dyn Debugger>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            excluded_dirs_and_files: None,
            markdown_file_dir: None,
            strategy: ResolutionStrategy::default(),
            parse_dependency: ParseDependency::default(),
            parse_internal: false,
            debugger: Box::new(NullDebugger),
        }
    }
}

impl fmt::Debug for EngineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineOptions")
            .field("excluded_dirs_and_files", &self.excluded_dirs_and_files)
            .field("markdown_file_dir", &self.markdown_file_dir)
            .field("strategy", &self.strategy)
            .field("parse_dependency", &self.parse_dependency)
            .field("parse_internal", &self.parse_internal)
            .finish_non_exhaustive()
    }
}

/// [`SpecEngine`] backed by static analysis of Axum and Actix-Web sources.
pub struct SourceEngine {
    options: EngineOptions,
    document: OpenApiDocument,
}

impl SourceEngine {
    pub fn new(options: EngineOptions) -> Self {
        Self {
            options,
            document: OpenApiDocument::default(),
        }
    }

    fn report(&mut self, args: fmt::Arguments<'_>) {
        self.options.debugger.printf(args);
    }

    fn schema_options(&self, max_depth: usize) -> SchemaOptions {
        SchemaOptions {
            resolve_models: self.options.parse_dependency == ParseDependency::Models,
            max_depth: match self.options.strategy {
                ResolutionStrategy::Legacy if max_depth > 0 => Some(max_depth),
                _ => None,
            },
        }
    }

    /// Drops private handlers when internals are excluded and reports handlers
    /// that could not be analysed.
    fn review_routes(&mut self, routes: &mut Vec<RouteInfo>) {
        if !self.options.parse_internal {
            routes.retain(|route| {
                let keep = !route.handler_resolved || route.handler_public;
                if !keep {
                    debug!("Skipping private handler {}", route.handler_name);
                }
                keep
            });
        }

        for route in routes.iter() {
            if route.is_closure {
                self.report(format_args!(
                    "warning: {} for {} {}",
                    BENIGN_DIAGNOSTIC,
                    route.method.as_str(),
                    route.path
                ));
            } else if !route.ambiguous_handlers.is_empty() {
                self.report(format_args!(
                    "warning: ambiguous handler {} for {} {}: {}",
                    route.handler_name,
                    route.method.as_str(),
                    route.path,
                    route.ambiguous_handlers.join(", ")
                ));
            } else if !route.handler_resolved {
                self.report(format_args!(
                    "warning: failed to resolve handler {} for {} {}",
                    route.handler_name,
                    route.method.as_str(),
                    route.path
                ));
            }
        }
    }

    /// Replaces operation descriptions with their markdown includes.
    fn apply_markdown(&self, routes: &mut [RouteInfo]) -> Result<(), EngineError> {
        let dir = self.options.markdown_file_dir.as_deref();
        for route in routes {
            let Some(name) = route.docs.description_markdown.as_deref() else {
                continue;
            };
            let name = if name.is_empty() {
                route.handler_name.as_str()
            } else {
                name
            };
            let text = load_markdown(dir, name, &route.handler_name)?;
            route.docs.description = Some(text);
        }
        Ok(())
    }
}

impl SpecEngine for SourceEngine {
    fn parse_api(
        &mut self,
        search_dir: &Path,
        main_file: &Path,
        max_depth: usize,
    ) -> Result<(), EngineError> {
        let entry_file = search_dir.join(main_file);
        if !entry_file.is_file() {
            return Err(EngineError::EntryFileNotFound(entry_file));
        }

        self.report(format_args!(
            "Generate general API Info, search dir: {}",
            search_dir.display()
        ));
        let source = fs::read_to_string(&entry_file).map_err(|err| EngineError::EntryFileParse {
            file: entry_file.clone(),
            message: err.to_string(),
        })?;
        let entry_tree = syn::parse_file(&source).map_err(|err| EngineError::EntryFileParse {
            file: entry_file.clone(),
            message: err.to_string(),
        })?;

        let mut general = parse_general_info(&entry_tree);
        if general.description_markdown {
            general.description = Some(load_markdown(
                self.options.markdown_file_dir.as_deref(),
                GENERAL_MARKDOWN_NAME,
                "general API info",
            )?);
        }

        let scan = FileScanner::new(search_dir.to_path_buf())
            .with_exclusions(self.options.excluded_dirs_and_files.as_deref())
            .scan()?;
        for warning in &scan.warnings {
            self.report(format_args!("warning: {}", warning));
        }

        let mut parsed_files = Vec::with_capacity(scan.rust_files.len());
        for result in AstParser::parse_files(&scan.rust_files) {
            match result {
                Ok(parsed) => parsed_files.push(parsed),
                Err(err) => self.report(format_args!("warning: skipping file: {:#}", err)),
            }
        }

        let detection = FrameworkDetector::detect(&parsed_files);
        if detection.frameworks.is_empty() {
            self.report(format_args!(
                "warning: no supported web framework found below {}",
                search_dir.display()
            ));
        }

        let mut routes = Vec::new();
        for framework in &detection.frameworks {
            let found = match framework {
                Framework::Axum => AxumExtractor.extract_routes(&parsed_files),
                Framework::ActixWeb => ActixExtractor.extract_routes(&parsed_files),
            };
            debug!("{:?}: {} routes", framework, found.len());
            routes.extend(found);
        }

        self.review_routes(&mut routes);
        self.apply_markdown(&mut routes)?;

        let resolver = TypeResolver::new(&parsed_files, self.options.parse_internal);
        if resolver.is_empty() {
            debug!("No model types declared below {}", search_dir.display());
        }
        for (name, declarations) in resolver.ambiguous_types() {
            self.report(format_args!(
                "warning: type {} is declared more than once, documenting {}: {}",
                name,
                declarations[0],
                declarations.join(", ")
            ));
        }
        let mut schema_gen = SchemaGenerator::new(&resolver, self.schema_options(max_depth));
        let mut builder = OpenApiBuilder::new().with_general_info(&general);
        for route in &routes {
            builder.add_route(route, &mut schema_gen);
        }
        self.document = builder.build(schema_gen.into_schemas());

        info!(
            "Documented {} operations from {} files",
            routes.len(),
            parsed_files.len()
        );
        Ok(())
    }

    fn document(&self) -> &OpenApiDocument {
        &self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::HttpMethod;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::TempDir;

    /// Keeps every diagnostic for inspection.
    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl Debugger for Recorder {
        fn printf(&mut self, args: fmt::Arguments<'_>) {
            self.0.borrow_mut().push(args.to_string());
        }
    }

    impl Recorder {
        fn messages(&self) -> Vec<String> {
            self.0.borrow().clone()
        }
    }

    const MAIN: &str = r#"
//! @title Inventory
//! @version 0.3.0
//! @BasePath /api
use axum::{routing::get, Router};

mod handlers;

fn main() {
    let app = Router::new()
        .route("/items", get(handlers::list_items).post(handlers::create_item))
        .route("/items/:id", get(handlers::get_item))
        .route("/health", get(|| async { "ok" }))
        .route("/gone", get(missing_handler));
}
"#;

    const HANDLERS: &str = r#"
use axum::{extract::Path, Json};

/// List every item.
/// @tags items
pub async fn list_items() -> Json<Vec<Item>> { todo!() }

pub async fn create_item(Json(item): Json<NewItem>) -> Json<Item> { todo!() }

/// @description.markdown
async fn get_item(Path(id): Path<u64>) -> Json<Item> { todo!() }

pub struct Item { pub id: u64, pub name: String, pub owner: Owner }
pub struct NewItem { pub name: String }
pub struct Owner { pub team: Team }
pub struct Team { pub name: String }
"#;

    fn project() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("main.rs"), MAIN).unwrap();
        fs::write(src.join("handlers.rs"), HANDLERS).unwrap();
        temp_dir
    }

    fn options(recorder: &Recorder) -> EngineOptions {
        EngineOptions {
            parse_dependency: ParseDependency::Models,
            parse_internal: true,
            debugger: Box::new(recorder.clone()),
            ..EngineOptions::default()
        }
    }

    fn with_markdown(project: &TempDir, mut options: EngineOptions) -> EngineOptions {
        let md = project.path().join("md");
        fs::create_dir_all(&md).unwrap();
        fs::write(md.join("get_item.md"), "Fetches **one** item.\n").unwrap();
        options.markdown_file_dir = Some(md);
        options
    }

    #[test]
    fn test_parse_api_builds_document() {
        let project = project();
        let recorder = Recorder::default();
        let mut engine = SourceEngine::new(with_markdown(&project, options(&recorder)));

        engine
            .parse_api(project.path(), Path::new("src/main.rs"), 2)
            .unwrap();
        let document = engine.document();

        assert_eq!(document.info.title, "Inventory");
        assert_eq!(document.info.version, "0.3.0");
        assert_eq!(document.servers[0].url, "/api");
        assert_eq!(
            document.paths.keys().collect::<Vec<_>>(),
            vec!["/gone", "/health", "/items", "/items/{id}"]
        );

        let get_item = document.paths["/items/{id}"].operation(HttpMethod::Get).unwrap();
        assert_eq!(get_item.description.as_deref(), Some("Fetches **one** item."));
        let list = document.paths["/items"].get.as_ref().unwrap();
        assert_eq!(list.summary.as_deref(), Some("List every item."));
        assert_eq!(document.tags.len(), 1);

        let schemas = &document.components.as_ref().unwrap().schemas;
        assert!(schemas.contains_key("Team"));

        let messages = recorder.messages();
        assert!(messages[0].starts_with("Generate general API Info"));
        assert!(messages
            .iter()
            .any(|m| m.contains(BENIGN_DIAGNOSTIC) && m.contains("GET /health")));
        assert!(messages
            .iter()
            .any(|m| m == "warning: failed to resolve handler missing_handler for GET /gone"));
    }

    #[test]
    fn test_private_handlers_dropped_without_parse_internal() {
        let project = project();
        let recorder = Recorder::default();
        let mut options = options(&recorder);
        options.parse_internal = false;
        let mut engine = SourceEngine::new(options);

        engine
            .parse_api(project.path(), Path::new("src/main.rs"), 0)
            .unwrap();

        assert!(!engine.document().paths.contains_key("/items/{id}"));
        assert!(engine.document().paths.contains_key("/items"));
    }

    #[test]
    fn test_legacy_strategy_limits_depth() {
        let project = project();
        let recorder = Recorder::default();
        let mut options = with_markdown(&project, options(&recorder));
        options.strategy = ResolutionStrategy::Legacy;
        let mut engine = SourceEngine::new(options);

        engine
            .parse_api(project.path(), Path::new("src/main.rs"), 2)
            .unwrap();

        let schemas = &engine.document().components.as_ref().unwrap().schemas;
        assert!(schemas.contains_key("Item"));
        assert!(schemas.contains_key("Owner"));
        assert!(!schemas.contains_key("Team"));
    }

    #[test]
    fn test_models_not_resolved_without_parse_dependency() {
        let project = project();
        let recorder = Recorder::default();
        let mut options = with_markdown(&project, options(&recorder));
        options.parse_dependency = ParseDependency::None;
        let mut engine = SourceEngine::new(options);

        engine
            .parse_api(project.path(), Path::new("src/main.rs"), 2)
            .unwrap();

        assert!(engine.document().components.is_none());
    }

    #[test]
    fn test_missing_entry_file() {
        let project = project();
        let mut engine = SourceEngine::new(EngineOptions::default());

        let err = engine
            .parse_api(project.path(), Path::new("src/lib.rs"), 2)
            .unwrap_err();

        assert!(matches!(
            err,
            EngineError::EntryFileNotFound(path) if path.ends_with("src/lib.rs")
        ));
    }

    #[test]
    fn test_unparsable_entry_file() {
        let project = project();
        fs::write(project.path().join("src/main.rs"), "fn main( {").unwrap();
        let mut engine = SourceEngine::new(EngineOptions::default());

        let err = engine
            .parse_api(project.path(), Path::new("src/main.rs"), 2)
            .unwrap_err();

        assert!(matches!(err, EngineError::EntryFileParse { .. }));
    }

    #[test]
    fn test_markdown_directive_without_directory() {
        let project = project();
        let recorder = Recorder::default();
        let mut engine = SourceEngine::new(options(&recorder));

        let err = engine
            .parse_api(project.path(), Path::new("src/main.rs"), 2)
            .unwrap_err();

        assert!(matches!(
            err,
            EngineError::MarkdownDirUnset { directive_owner } if directive_owner == "get_item"
        ));
    }

    #[test]
    fn test_excluded_files_are_not_analysed() {
        let project = project();
        let recorder = Recorder::default();
        let mut options = options(&recorder);
        options.excluded_dirs_and_files = Some("src/handlers.rs".to_string());
        let mut engine = SourceEngine::new(options);

        engine
            .parse_api(project.path(), Path::new("src/main.rs"), 2)
            .unwrap();

        assert!(engine.document().components.is_none());
        let messages = recorder.messages();
        assert!(messages
            .iter()
            .any(|m| m.contains("failed to resolve handler list_items")));
    }

    #[test]
    fn test_unparsable_file_is_skipped_with_warning() {
        let project = project();
        fs::write(project.path().join("src/broken.rs"), "struct {").unwrap();
        let recorder = Recorder::default();
        let mut engine = SourceEngine::new(with_markdown(&project, options(&recorder)));

        engine
            .parse_api(project.path(), Path::new("src/main.rs"), 2)
            .unwrap();

        assert!(recorder
            .messages()
            .iter()
            .any(|m| m.starts_with("warning: skipping file") && m.contains("broken.rs")));
    }

    #[test]
    fn test_ambiguous_names_are_reported() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(
            src.join("main.rs"),
            r#"
use axum::{routing::get, Router};
mod orders;
mod users;
fn main() {
    let app = Router::new()
        .route("/all", get(list))
        .route("/users", get(users::list));
}
"#,
        )
        .unwrap();
        let handlers = |model: &str| {
            format!(
                "use axum::Json;\n\
                 pub async fn list() -> Json<Vec<Item>> {{ todo!() }}\n\
                 pub struct Item {{ pub {}: String }}\n",
                model
            )
        };
        fs::write(src.join("orders.rs"), handlers("sku")).unwrap();
        fs::write(src.join("users.rs"), handlers("name")).unwrap();
        let recorder = Recorder::default();
        let mut engine = SourceEngine::new(options(&recorder));

        engine
            .parse_api(temp_dir.path(), Path::new("src/main.rs"), 0)
            .unwrap();

        let messages = recorder.messages();
        assert!(messages.contains(
            &"warning: ambiguous handler list for GET /all: \
              orders::list, users::list"
                .to_string()
        ));
        assert!(messages.contains(
            &"warning: type Item is declared more than once, documenting orders::Item: \
              orders::Item, users::Item"
                .to_string()
        ));
        let users = engine.document().paths["/users"].get.as_ref().unwrap();
        assert_eq!(users.operation_id.as_deref(), Some("list"));
    }
}

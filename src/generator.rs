//! One generation run: engine, document, viewer page.

use crate::config::Config;
use crate::diagnostics::{Debugger, DiagnosticFilter};
use crate::engine::{EngineOptions, ParseDependency, ResolutionStrategy, SourceEngine, SpecEngine};
use crate::serializer::{serialize_json, write_to_file};
use crate::viewer::{render_index, ViewerPage};
use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;
use std::path::PathBuf;

/// Paths of the artifacts written by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFiles {
    pub json: PathBuf,
    pub html: PathBuf,
}

/// Engine options derived from the configuration.
///
/// Dependency parsing and internal parsing are left at their defaults; the
/// generator sets them separately.
pub fn build_engine_options(config: &Config, debugger: Box<dyn Debugger>) -> EngineOptions {
    EngineOptions {
        excluded_dirs_and_files: (!config.exclude.is_empty()).then(|| config.exclude.join(",")),
        markdown_file_dir: config.markdown_dir.clone(),
        strategy: if config.old_method {
            ResolutionStrategy::Legacy
        } else {
            ResolutionStrategy::ProjectListing
        },
        debugger,
        ..EngineOptions::default()
    }
}

/// Generates `<name>.json` and `index.html` with the source engine.
pub fn generate(config: &Config) -> Result<GeneratedFiles> {
    generate_with(config, SourceEngine::new)
}

/// Generates the artifacts with the engine built by `factory`.
///
/// The output directory is created first, so it may exist even when a later
/// step fails. Existing artifacts are overwritten.
pub fn generate_with<E, F>(config: &Config, factory: F) -> Result<GeneratedFiles>
where
    E: SpecEngine,
    F: FnOnce(EngineOptions) -> E,
{
    let api_dir = config.api_output_dir();
    fs::create_dir_all(&api_dir)
        .with_context(|| format!("failed to create output directory {}", api_dir.display()))?;

    let mut options = build_engine_options(config, Box::new(DiagnosticFilter::stderr()));
    options.parse_dependency = ParseDependency::Models;
    options.parse_internal = true;
    debug!("Engine options: {:?}", options);

    let mut engine = factory(options);
    engine
        .parse_api(&config.search_dir, &config.main_file, config.max_depth)
        .with_context(|| {
            format!(
                "failed to parse API sources in {}",
                config.search_dir.display()
            )
        })?;

    let json = serialize_json(engine.document())?;
    let json_path = api_dir.join(config.json_file_name());
    write_to_file(&json, &json_path)?;
    info!("Wrote OpenAPI document to {}", json_path.display());

    let json_file_name = config.json_file_name();
    let page = ViewerPage {
        title: config.page_title(),
        spec_file: &json_file_name,
        server_url: config.server_url.as_deref(),
        embedded_spec: config.embedded.then_some(json.as_str()),
    };
    let html_path = api_dir.join("index.html");
    write_to_file(&render_index(&page), &html_path)?;

    Ok(GeneratedFiles {
        json: json_path,
        html: html_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::NullDebugger;
    use crate::error::EngineError;
    use crate::openapi_builder::OpenApiDocument;
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use tempfile::TempDir;

    /// Engine returning a fixed document and recording how it was called.
    struct FakeEngine {
        options: EngineOptions,
        calls: Vec<(PathBuf, PathBuf, usize)>,
        fail: bool,
        document: OpenApiDocument,
    }

    impl FakeEngine {
        fn new(options: EngineOptions) -> Self {
            let mut document = OpenApiDocument::default();
            document.info.title = "Fake </script> API".to_string();
            Self {
                options,
                calls: Vec::new(),
                fail: false,
                document,
            }
        }
    }

    impl SpecEngine for FakeEngine {
        fn parse_api(
            &mut self,
            search_dir: &Path,
            main_file: &Path,
            max_depth: usize,
        ) -> Result<(), EngineError> {
            self.calls
                .push((search_dir.to_path_buf(), main_file.to_path_buf(), max_depth));
            assert_eq!(self.options.parse_dependency, ParseDependency::Models);
            assert!(self.options.parse_internal);
            if self.fail {
                return Err(EngineError::EntryFileNotFound(search_dir.join(main_file)));
            }
            Ok(())
        }

        fn document(&self) -> &OpenApiDocument {
            &self.document
        }
    }

    fn config_in(dir: &TempDir) -> Config {
        Config {
            output_dir: dir.path().join("docs"),
            ..Config::default()
        }
    }

    #[test]
    fn test_engine_options_from_config() {
        let config = Config {
            exclude: vec!["vendor".into(), "gen".into()],
            markdown_dir: Some(PathBuf::from("md")),
            old_method: true,
            ..Config::default()
        };

        let options = build_engine_options(&config, Box::new(NullDebugger));

        assert_eq!(options.excluded_dirs_and_files.as_deref(), Some("vendor,gen"));
        assert_eq!(options.markdown_file_dir, Some(PathBuf::from("md")));
        assert_eq!(options.strategy, ResolutionStrategy::Legacy);

        let options = build_engine_options(&Config::default(), Box::new(NullDebugger));
        assert_eq!(options.excluded_dirs_and_files, None);
        assert_eq!(options.markdown_file_dir, None);
        assert_eq!(options.strategy, ResolutionStrategy::ProjectListing);
    }

    #[test]
    fn test_default_run_writes_linked_page() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(&temp_dir);

        let files = generate_with(&config, FakeEngine::new).unwrap();

        let api_dir = temp_dir.path().join("docs").join("api");
        assert_eq!(files.json, api_dir.join("swagger.json"));
        assert_eq!(files.html, api_dir.join("index.html"));

        let json = fs::read_to_string(&files.json).unwrap();
        let expected = serialize_json(&FakeEngine::new(EngineOptions::default()).document);
        assert_eq!(json, expected.unwrap());

        let html = fs::read_to_string(&files.html).unwrap();
        assert!(html.contains("<title>swagger</title>"));
        assert!(html.contains("spec-url=\"swagger.json\""));
        assert!(!html.contains("server-url"));
        assert!(!html.contains("loadSpec"));
    }

    #[test]
    fn test_embedded_run_with_title_and_url() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            base_name: "petstore".into(),
            title: "Pet Store".into(),
            server_url: Some("https://api.example.com".into()),
            embedded: true,
            ..config_in(&temp_dir)
        };

        let files = generate_with(&config, FakeEngine::new).unwrap();

        assert!(files.json.ends_with("petstore.json"));
        let html = fs::read_to_string(&files.html).unwrap();
        assert!(html.contains("<title>Pet Store</title>"));
        assert!(html.contains("server-url=\"https://api.example.com\""));
        assert!(!html.contains("spec-url"));
        assert!(html.contains("rapidocEl.loadSpec({"));
        assert!(html.contains("Fake <\\/script> API"));
    }

    #[test]
    fn test_page_title_follows_base_name() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            base_name: "inventory".into(),
            ..config_in(&temp_dir)
        };

        let files = generate_with(&config, FakeEngine::new).unwrap();

        let html = fs::read_to_string(&files.html).unwrap();
        assert!(html.contains("<title>inventory</title>"));
        assert!(html.contains("spec-url=\"inventory.json\""));
    }

    #[test]
    fn test_uncreatable_output_directory_fails_before_engine_runs() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("docs");
        fs::write(&blocker, "not a directory").unwrap();
        let config = config_in(&temp_dir);

        let mut engine_built = false;
        let err = generate_with(&config, |options| {
            engine_built = true;
            FakeEngine::new(options)
        })
        .unwrap_err();

        assert!(!engine_built);
        assert!(err.to_string().contains("failed to create output directory"));
    }

    #[test]
    fn test_engine_failure_leaves_only_the_directory() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(&temp_dir);

        let err = generate_with(&config, |options| FakeEngine {
            fail: true,
            ..FakeEngine::new(options)
        })
        .unwrap_err();

        assert!(err.to_string().contains("failed to parse API sources in ."));
        assert!(err.root_cause().to_string().contains("entry file not found"));
        let api_dir = temp_dir.path().join("docs").join("api");
        assert!(api_dir.is_dir());
        assert_eq!(fs::read_dir(&api_dir).unwrap().count(), 0);
    }

    #[test]
    fn test_engine_receives_config_values() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            search_dir: PathBuf::from("svc"),
            main_file: PathBuf::from("src/bin/api.rs"),
            max_depth: 5,
            ..config_in(&temp_dir)
        };

        let mut calls = Vec::new();
        let recorded = &mut calls;
        generate_with(&config, move |options| RecordingEngine {
            inner: FakeEngine::new(options),
            calls: recorded,
        })
        .unwrap();

        assert_eq!(
            calls,
            vec![(PathBuf::from("svc"), PathBuf::from("src/bin/api.rs"), 5)]
        );
    }

    /// Forwards to a [`FakeEngine`] and copies its calls out.
    struct RecordingEngine<'a> {
        inner: FakeEngine,
        calls: &'a mut Vec<(PathBuf, PathBuf, usize)>,
    }

    impl SpecEngine for RecordingEngine<'_> {
        fn parse_api(
            &mut self,
            search_dir: &Path,
            main_file: &Path,
            max_depth: usize,
        ) -> Result<(), EngineError> {
            self.inner.parse_api(search_dir, main_file, max_depth)?;
            self.calls.extend(self.inner.calls.drain(..));
            Ok(())
        }

        fn document(&self) -> &OpenApiDocument {
            self.inner.document()
        }
    }

    #[test]
    fn test_repeated_runs_are_byte_identical() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            embedded: true,
            ..config_in(&temp_dir)
        };

        let first = generate_with(&config, FakeEngine::new).unwrap();
        let json = fs::read(&first.json).unwrap();
        let html = fs::read(&first.html).unwrap();

        let second = generate_with(&config, FakeEngine::new).unwrap();
        assert_eq!(fs::read(&second.json).unwrap(), json);
        assert_eq!(fs::read(&second.html).unwrap(), html);
    }
}

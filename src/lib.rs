//! Swagger Doc - OpenAPI documents and a browsable viewer page from Rust web sources.
//!
//! A run reads the project below a search directory, builds an OpenAPI 3.0
//! document from its Axum or Actix-Web routes, and writes two files into
//! `<output>/<api>/`: `<name>.json` and an `index.html` that renders the
//! document with RapiDoc.
//!
//! # Architecture
//!
//! 1. [`cli`] / [`config`] - command line and environment options
//! 2. [`generator`] - one run: output directory, engine, document, viewer page
//! 3. [`engine`] - the [`engine::SpecEngine`] contract and its source-analysis implementation
//! 4. [`diagnostics`] - the engine's logging callback and the filter installed by the generator
//! 5. [`scanner`], [`parser`], [`detector`] - finding and parsing the sources
//! 6. [`extractor`], [`directives`] - routes, handler signatures and doc-comment directives
//! 7. [`type_resolver`], [`schema_generator`], [`openapi_builder`] - the document itself
//! 8. [`serializer`], [`viewer`] - the two artifacts
//!
//! # Example Usage
//!
//! ```no_run
//! use swagger_doc::config::Config;
//! use swagger_doc::generator::generate;
//! use std::path::PathBuf;
//!
//! let config = Config {
//!     search_dir: PathBuf::from("./my-service"),
//!     title: "My Service".to_string(),
//!     ..Config::default()
//! };
//! let files = generate(&config).unwrap();
//! println!("Open {}", files.html.display());
//! ```

pub mod cli;
pub mod config;
pub mod detector;
pub mod diagnostics;
pub mod directives;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod generator;
pub mod openapi_builder;
pub mod parser;
pub mod scanner;
pub mod schema_generator;
pub mod serializer;
pub mod type_resolver;
pub mod viewer;

//! Swagger Doc - command-line tool generating an OpenAPI document and a RapiDoc
//! viewer page from Axum or Actix-Web sources.
//!
//! # Usage
//!
//! ```bash
//! swagger-doc [OPTIONS]
//! ```
//!
//! # Examples
//!
//! Document the project in the current directory into `docs/api/`:
//! ```bash
//! swagger-doc
//! ```
//!
//! Inline the document into the page and point the viewer at a live server:
//! ```bash
//! swagger-doc -s ./service -e -u https://api.example.com -t "Service API"
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! swagger-doc -v
//! ```

use anyhow::Result;
use log::info;
use swagger_doc::cli;

fn main() -> Result<()> {
    let args = cli::parse_args();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .parse_default_env()
        .init();

    info!("{} {} starting", cli::APP_IDENTITY.name, cli::APP_IDENTITY.version);

    cli::run(args)?;

    info!("Documentation generated successfully");
    Ok(())
}

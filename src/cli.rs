use crate::config::Config;
use crate::generator;
use anyhow::Result;
use chrono::{Datelike, Local};
use clap::{ArgAction, CommandFactory, FromArgMatches, Parser};
use log::{debug, info};
use std::path::PathBuf;

/// Who the tool is, as shown by `--version`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppIdentity {
    pub name: &'static str,
    pub version: &'static str,
    pub copyright_start_year: i32,
    pub copyright_holder: &'static str,
}

pub const APP_IDENTITY: AppIdentity = AppIdentity {
    name: "Swagger Doc",
    version: env!("CARGO_PKG_VERSION"),
    copyright_start_year: 2019,
    copyright_holder: "Richard A. Wilkes",
};

impl AppIdentity {
    pub fn copyright(&self, current_year: i32) -> String {
        if current_year > self.copyright_start_year {
            format!(
                "Copyright (c) {}-{} by {}",
                self.copyright_start_year, current_year, self.copyright_holder
            )
        } else {
            format!(
                "Copyright (c) {} by {}",
                self.copyright_start_year, self.copyright_holder
            )
        }
    }

    /// Text printed after the binary name by `--version`.
    pub fn long_version(&self, current_year: i32) -> String {
        format!(
            "{} ({})\n{}",
            self.version,
            self.name,
            self.copyright(current_year)
        )
    }
}

/// Generate an OpenAPI document and a RapiDoc viewer page from Axum or Actix-Web sources
#[derive(Parser, Debug)]
#[command(name = "swagger-doc", version, about, long_about = None)]
pub struct CliArgs {
    /// The directory to search for Rust sources
    #[arg(
        short = 's',
        long = "search",
        env = "SWAGGER_DOC_SEARCH",
        default_value = ".",
        value_name = "DIR"
    )]
    pub search_dir: PathBuf,

    /// The file holding the general API directives, relative to the search directory
    #[arg(
        short = 'm',
        long = "main",
        env = "SWAGGER_DOC_MAIN",
        default_value = "src/main.rs",
        value_name = "FILE"
    )]
    pub main_file: PathBuf,

    /// The output directory
    #[arg(
        short = 'o',
        long = "output",
        env = "SWAGGER_DOC_OUTPUT",
        default_value = "docs",
        value_name = "DIR"
    )]
    pub output_dir: PathBuf,

    /// The sub-directory of the output directory that receives the files
    #[arg(
        short = 'a',
        long = "api",
        env = "SWAGGER_DOC_API",
        default_value = "api",
        value_name = "DIR"
    )]
    pub api_dir: PathBuf,

    /// The base name of the generated document
    #[arg(short = 'n', long = "name", env = "SWAGGER_DOC_NAME", default_value = "swagger")]
    pub base_name: String,

    /// How many levels of model types --old-method follows (0 = unlimited)
    #[arg(short = 'd', long = "depth", env = "SWAGGER_DOC_DEPTH", default_value_t = 2)]
    pub max_depth: usize,

    /// Directory holding the markdown files named by @description.markdown
    #[arg(
        short = 'i',
        long = "mdincludes",
        env = "SWAGGER_DOC_MDINCLUDES",
        default_value = "",
        value_name = "DIR"
    )]
    pub markdown_dir: String,

    /// Title of the HTML page (defaults to the base name)
    #[arg(short = 't', long = "title", env = "SWAGGER_DOC_TITLE", default_value = "")]
    pub title: String,

    /// Server URL the viewer sends requests to
    #[arg(short = 'u', long = "url", env = "SWAGGER_DOC_URL", default_value = "")]
    pub server_url: String,

    /// Embed the document in the HTML page instead of linking to it
    #[arg(short = 'e', long = "embedded", env = "SWAGGER_DOC_EMBEDDED")]
    pub embedded: bool,

    /// Follow model types with the depth-limited strategy
    #[arg(long = "old-method", env = "SWAGGER_DOC_OLD_METHOD")]
    pub old_method: bool,

    /// Exclude a directory or file from the scan (repeatable, or comma-separated)
    #[arg(
        short = 'x',
        long = "exclude",
        env = "SWAGGER_DOC_EXCLUDE",
        value_delimiter = ',',
        action = ArgAction::Append,
        value_name = "PATH"
    )]
    pub exclude: Vec<String>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// The clap command, with the identity of the tool as its long version.
pub fn command() -> clap::Command {
    CliArgs::command().long_version(APP_IDENTITY.long_version(Local::now().year()))
}

/// Parses the process arguments; on a usage error clap prints it and exits with status 2.
pub fn parse_args() -> CliArgs {
    let matches = command().get_matches();
    CliArgs::from_arg_matches(&matches).unwrap_or_else(|err| err.exit())
}

/// Parses `flags` (without the binary name) with every `SWAGGER_DOC_*`
/// variable lookup disabled, so the process environment cannot leak in.
#[cfg(test)]
pub(crate) fn parse_flags(flags: &[&str]) -> Result<CliArgs, clap::Error> {
    let matches = CliArgs::command()
        .mut_args(|arg| arg.env(Option::<&'static str>::None))
        .try_get_matches_from(std::iter::once("swagger-doc").chain(flags.iter().copied()))?;
    CliArgs::from_arg_matches(&matches)
}

/// Runs one generation with the given arguments.
pub fn run(args: CliArgs) -> Result<()> {
    let config = Config::from(args);
    debug!("Configuration: {:?}", config);

    info!(
        "Generating documentation for {} into {}",
        config.search_dir.display(),
        config.api_output_dir().display()
    );
    let files = generator::generate(&config)?;

    info!("Wrote {}", files.json.display());
    info!("Wrote {}", files.html.display());
    Ok(())
}

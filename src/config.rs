use crate::cli::CliArgs;
use std::path::PathBuf;

/// Settings of one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub search_dir: PathBuf,
    /// Entry file, relative to `search_dir`
    pub main_file: PathBuf,
    pub output_dir: PathBuf,
    /// Sub-directory of `output_dir` receiving both artifacts
    pub api_dir: PathBuf,
    /// File name of the document without `.json`
    pub base_name: String,
    pub max_depth: usize,
    pub markdown_dir: Option<PathBuf>,
    /// Title of the viewer page; empty means the base name
    pub title: String,
    pub server_url: Option<String>,
    pub embedded: bool,
    pub old_method: bool,
    pub exclude: Vec<String>,
}

impl Config {
    pub fn api_output_dir(&self) -> PathBuf {
        self.output_dir.join(&self.api_dir)
    }

    pub fn json_file_name(&self) -> String {
        format!("{}.json", self.base_name)
    }

    /// The viewer page title, falling back to the base name.
    pub fn page_title(&self) -> &str {
        if self.title.is_empty() {
            &self.base_name
        } else {
            &self.title
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_dir: PathBuf::from("."),
            main_file: PathBuf::from("src/main.rs"),
            output_dir: PathBuf::from("docs"),
            api_dir: PathBuf::from("api"),
            base_name: "swagger".to_string(),
            max_depth: 2,
            markdown_dir: None,
            title: String::new(),
            server_url: None,
            embedded: false,
            old_method: false,
            exclude: Vec::new(),
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

impl From<CliArgs> for Config {
    /// Empty URL and markdown directory mean "not set".
    fn from(args: CliArgs) -> Self {
        Self {
            search_dir: args.search_dir,
            main_file: args.main_file,
            output_dir: args.output_dir,
            api_dir: args.api_dir,
            base_name: args.base_name,
            max_depth: args.max_depth,
            markdown_dir: non_empty(args.markdown_dir).map(PathBuf::from),
            title: args.title,
            server_url: non_empty(args.server_url),
            embedded: args.embedded,
            old_method: args.old_method,
            exclude: args.exclude,
        }
    }
}

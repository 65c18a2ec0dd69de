use crate::utils::config::{DEFAULT_MARKER, DEFAULT_OUTPUT};
use clap::ValueEnum;
use std::path::{Path, PathBuf};

/// Output document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Nested collapsible `<details>` sections
    Html,
    /// Nested JSON objects
    Json,
}

impl OutputFormat {
    /// Infer the format from an output path (`.json` → JSON, anything else → HTML)
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
            _ => OutputFormat::Html,
        }
    }
}

/// Arguments for the build command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct BuildArgs {
    /// Trace input file
    pub input: PathBuf,

    /// Output document path
    pub output: PathBuf,

    /// Output format; inferred from `output` when `None`
    pub format: Option<OutputFormat>,

    /// Frame line marker character
    pub marker: char,

    /// Register an unterminated final trace as a root
    pub flush_trailing: bool,

    /// Print a text summary to stdout
    pub print_summary: bool,
}

impl BuildArgs {
    /// Effective output format
    pub fn output_format(&self) -> OutputFormat {
        self.format
            .unwrap_or_else(|| OutputFormat::from_path(&self.output))
    }
}

impl Default for BuildArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            format: None,
            marker: DEFAULT_MARKER,
            flush_trailing: false,
            print_summary: false,
        }
    }
}

/// What a build produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub format: OutputFormat,
    pub frames: usize,
    pub frame_lines: usize,
    pub roots: usize,
    pub backrefs: usize,
    pub bytes_written: usize,
}

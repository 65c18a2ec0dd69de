//! Output renderers and writers for call trees.
//!
//! This module handles:
//! - HTML documents with collapsible sections
//! - JSON tree documents
//! - Writing a finished document to disk in one step

pub mod html;
pub mod json;

// Re-export main functions
pub use html::render_html;
pub use json::{read_tree_json, render_json, to_document, TreeDocument, TreeEntry};

use crate::utils::error::OutputError;
use log::{debug, info};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Common path validation for output files
pub fn validate_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.exists() && path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

/// Write a rendered document to `output_path`
///
/// **Public** - main entry point for file output
///
/// The content goes to a temporary file next to the target, which is renamed
/// into place only once fully written. On failure the target is untouched.
///
/// # Errors
/// * `OutputError::InvalidPath` - Path is empty, a directory, or its parent cannot be created
/// * `OutputError::WriteFailed` - I/O error during write or rename
pub fn write_document(content: &str, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing document to: {}", output_path.display());

    validate_path(output_path)?;

    let parent = match output_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    // Create parent directories if needed
    if !parent.exists() {
        debug!("Creating parent directories: {}", parent.display());
        std::fs::create_dir_all(parent).map_err(|e| {
            OutputError::InvalidPath(format!(
                "Cannot create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let mut file = NamedTempFile::new_in(parent).map_err(OutputError::WriteFailed)?;
    file.write_all(content.as_bytes())
        .map_err(OutputError::WriteFailed)?;
    file.flush().map_err(OutputError::WriteFailed)?;
    file.persist(output_path)
        .map_err(|e| OutputError::WriteFailed(e.error))?;

    info!(
        "Document written successfully ({} bytes, {:.2} KB)",
        content.len(),
        content.len() as f64 / 1024.0
    );

    Ok(())
}

// ABOUTME: Utility functions for the pptreport application
// ABOUTME: Provides path validation and directory helpers shared by the CLI and renderers

use crate::errors::{ReportError, Result};
use std::io;
use std::path::Path;

/// Validate that a file exists
pub fn validate_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(ReportError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("File does not exist: {}", path.display()),
        )));
    }
    if !path.is_file() {
        return Err(ReportError::config(format!("Path is not a file: {:?}", path)));
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    } else if !path.is_dir() {
        return Err(ReportError::config(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    }
    Ok(())
}

/// Ensure a file's parent directory exists
pub fn ensure_parent_directory_exists(file_path: &Path) -> Result<()> {
    match file_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_directory_exists(parent),
        _ => Ok(()),
    }
}

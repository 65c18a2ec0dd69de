//! Trace input parsing.
//!
//! This module handles:
//! - Classifying lines as frames or separators
//! - Deriving frame identifiers and display names
//! - Scanning traces into the frame registry

pub mod frame;
pub mod scanner;

// Re-export main types
pub use frame::{display_name, frame_id, is_frame_line};
pub use scanner::{scan_file, scan_reader, ScanOptions, ScanStats, TraceScanner};

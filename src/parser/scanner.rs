//! Trace scanner for textual profiler output.
//!
//! A trace is a contiguous run of frame lines. Anything else (an empty line,
//! a goroutine header, free text) is a separator. Each frame line is
//! registered with the [`Registry`] and linked to the frame line before it;
//! the last frame before a separator becomes a root.

use super::frame::{frame_id, is_frame_line};
use crate::aggregator::registry::{NodeId, Registry};
use crate::utils::config::DEFAULT_MARKER;
use crate::utils::error::ScanError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Scanner options
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Character that starts a frame line
    pub marker: char,

    /// Register a trace that runs to end of input without a separator as a root.
    /// Off by default: such traces only contribute counts and associations.
    pub flush_trailing: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER,
            flush_trailing: false,
        }
    }
}

/// Counters collected while scanning
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Total lines read
    pub lines: usize,

    /// Lines classified as frames
    pub frame_lines: usize,

    /// Terminated traces; a trace ending on an existing root counts again
    pub traces: usize,
}

/// Line-by-line scanning state
///
/// **Public** - can be fed line by line, or driven by [`scan_reader`]
#[derive(Debug)]
pub struct TraceScanner<'a> {
    registry: &'a mut Registry,
    options: ScanOptions,
    previous: Option<NodeId>,
    stats: ScanStats,
}

impl<'a> TraceScanner<'a> {
    pub fn new(registry: &'a mut Registry, options: ScanOptions) -> Self {
        Self {
            registry,
            options,
            previous: None,
            stats: ScanStats::default(),
        }
    }

    /// Process one input line
    pub fn feed(&mut self, line: &str) {
        self.stats.lines += 1;

        if !is_frame_line(line, self.options.marker) {
            self.end_trace();
            return;
        }

        self.stats.frame_lines += 1;
        let current = self.registry.observe(frame_id(line));
        if let Some(previous) = self.previous {
            self.registry.link(current, previous);
        }
        self.previous = Some(current);
    }

    /// Finish scanning and return the counters
    pub fn finish(mut self) -> ScanStats {
        if self.options.flush_trailing {
            self.end_trace();
        } else if let Some(previous) = self.previous {
            debug!(
                "Trailing trace ending at {} has no separator, not registered as root",
                self.registry.node(previous).name
            );
        }
        self.stats
    }

    fn end_trace(&mut self) {
        if let Some(last) = self.previous.take() {
            self.registry.mark_root(last);
            self.stats.traces += 1;
        }
    }
}

/// Scan every line of `reader` into `registry`
///
/// **Public** - main entry point for scanning
///
/// # Errors
/// * `ScanError::Read` - I/O error or invalid UTF-8 on some line
pub fn scan_reader<R: BufRead>(
    reader: R,
    registry: &mut Registry,
    options: ScanOptions,
) -> Result<ScanStats, ScanError> {
    let mut scanner = TraceScanner::new(registry, options);

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| ScanError::Read {
            line: index + 1,
            source,
        })?;
        scanner.feed(&line);
    }

    Ok(scanner.finish())
}

/// Scan a trace file into `registry`
///
/// # Errors
/// * `ScanError::Open` - input file cannot be opened
/// * `ScanError::Read` - input file cannot be read
pub fn scan_file(
    path: impl AsRef<Path>,
    registry: &mut Registry,
    options: ScanOptions,
) -> Result<ScanStats, ScanError> {
    let path = path.as_ref();
    info!("Scanning traces from: {}", path.display());

    let file = File::open(path).map_err(|source| ScanError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let stats = scan_reader(BufReader::new(file), registry, options)?;

    debug!(
        "Scanned {} lines, {} frame lines, {} traces, {} distinct frames",
        stats.lines,
        stats.frame_lines,
        stats.traces,
        registry.len()
    );

    Ok(stats)
}

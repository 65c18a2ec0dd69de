//! Configuration and constants for the CLI.

/// Character that marks a frame line in profiler output
pub const DEFAULT_MARKER: char = '#';

/// Default output document path
pub const DEFAULT_OUTPUT: &str = "out.html";

/// Prefix of the text that replaces a cyclic edge
pub const BACKREF_PREFIX: &str = "Backlink: ";

/// Current JSON tree schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

// Dense DAGs with shared descendants expand once per distinct path.
// Past this many node visits in one linearize pass we warn about it.
pub const VISIT_WARN_THRESHOLD: u64 = 1_000_000;

/// Number of roots listed by `--summary`
pub const SUMMARY_TOP_ROOTS: usize = 10;

// Sequence collapsed to a single space when building display names
pub const NAME_SEPARATOR: &str = "\t ";

//! Callfreq
//!
//! Call-frequency trees from textual profiler stack traces.
//!
//! Frame lines are counted and linked into a shared call graph, ordered by
//! frequency, stripped of cycles, and rendered as nested collapsible HTML
//! sections or as nested JSON.
//!
//! ```bash
//! callfreq --input traces.txt --output out.html
//! ```

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod parser;
pub mod utils;

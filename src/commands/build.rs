//! Build command implementation.
//!
//! The build command:
//! 1. Scans the trace file into the frame registry
//! 2. Sorts children and roots by frequency
//! 3. Cuts cycles into back-reference markers
//! 4. Renders the forest (HTML or JSON)
//! 5. Writes the document in one step

use crate::aggregator::{linearize, sort_by_frequency, CallForest, Registry};
use crate::commands::models::{BuildArgs, BuildReport, OutputFormat};
use crate::output::{render_html, render_json, to_document, write_document};
use crate::parser::{scan_file, ScanOptions};
use crate::utils::config::SUMMARY_TOP_ROOTS;
use anyhow::{Context, Result};
use chrono::Utc;
use log::{debug, info};
use std::time::Instant;

/// Execute the build command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Input file cannot be opened or read
/// * Output cannot be serialized or written
///
/// Nothing is written unless the whole input was processed.
pub fn execute_build(args: BuildArgs) -> Result<BuildReport> {
    let start_time = Instant::now();
    let format = args.output_format();

    info!("Building call tree from: {}", args.input.display());

    let mut registry = Registry::new();
    let options = ScanOptions {
        marker: args.marker,
        flush_trailing: args.flush_trailing,
    };
    let scan_stats = scan_file(&args.input, &mut registry, options)
        .with_context(|| format!("Failed to scan {}", args.input.display()))?;

    info!(
        "Scanned {} frame lines: {} distinct frames, {} roots",
        scan_stats.frame_lines,
        registry.len(),
        registry.root_count()
    );

    let mut forest = sort_by_frequency(registry);
    let link_stats = linearize(&mut forest);
    debug!(
        "Linearized in {} walks, {} back-references",
        link_stats.walks, link_stats.backrefs
    );

    let content = match format {
        OutputFormat::Html => render_html(&forest),
        OutputFormat::Json => {
            let document = to_document(&forest, Utc::now().to_rfc3339());
            render_json(&document).context("Failed to serialize call tree")?
        }
    };

    write_document(&content, &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    info!("✓ Call tree written to: {}", args.output.display());

    if args.print_summary {
        print_summary(&forest, link_stats.backrefs);
    }

    info!(
        "Build completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    Ok(BuildReport {
        format,
        frames: forest.registry().len(),
        frame_lines: scan_stats.frame_lines,
        roots: forest.roots().len(),
        backrefs: link_stats.backrefs,
        bytes_written: content.len(),
    })
}

/// Validate build arguments
///
/// **Public** - can be called before execute_build for early validation
pub fn validate_args(args: &BuildArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input path cannot be empty");
    }

    if args.output.as_os_str().is_empty() {
        anyhow::bail!("Output path cannot be empty");
    }

    if args.input == args.output {
        anyhow::bail!("Output path must differ from the input path");
    }

    if args.marker.is_whitespace() {
        anyhow::bail!("Frame marker cannot be whitespace");
    }

    Ok(())
}

/// Print a human-readable summary of the forest to stdout.
///
/// **Private** - internal helper for execute_build
fn print_summary(forest: &CallForest, backrefs: usize) {
    let registry = forest.registry();

    println!();
    println!("  CALL TREE SUMMARY");
    println!("  Distinct frames: {}", registry.len());
    println!("  Roots:           {}", forest.roots().len());
    println!("  Back-references: {}", backrefs);
    println!();

    if forest.roots().is_empty() {
        println!("  No traces found.");
        return;
    }

    println!("  Top roots:");
    for &root in forest.roots().iter().take(SUMMARY_TOP_ROOTS) {
        let node = registry.node(root);
        println!("  {:>10}  {}", node.count, node.display_name());
    }
    println!();
}

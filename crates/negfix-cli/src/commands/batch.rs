use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::{bail, Context, Result};

use negfix_cli::{
    determine_batch_output_path, expand_inputs, process_single_image, OutputNaming, ToneArgs,
    SUPPORTED_EXTENSIONS,
};
use negfix_core::config::PipelineDefaults;

/// Execute the batch command over folders and files.
///
/// Every image is processed independently with its own black/white points.
/// Results go to `<folder>/<output_dir_name>/` (or `out`); files already
/// carrying the edit tag are skipped. Failures are collected and reported
/// after all files have been attempted.
pub fn cmd_batch(
    inputs: Vec<PathBuf>,
    recursive: bool,
    out: Option<PathBuf>,
    threads: Option<usize>,
    tone: &ToneArgs,
    defaults: &PipelineDefaults,
    silent: bool,
) -> Result<()> {
    let batch_start = Instant::now();

    if inputs.is_empty() {
        bail!("No input files or directories specified");
    }

    let (params, policy) = tone.resolve(defaults);
    let naming = OutputNaming::new(&defaults.edit_tag, &defaults.output_dir_name);

    // Expand directories to file lists
    let inputs = expand_inputs(&inputs, recursive, &naming)?;

    if inputs.is_empty() {
        bail!(
            "No supported image files found (supported: {})",
            SUPPORTED_EXTENSIONS.join(", ")
        );
    }

    if !silent {
        println!("Found {} image files to process", inputs.len());
    }

    // Configure thread pool if specified
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .context("Failed to configure thread pool")?;
        if !silent {
            println!("Using {} threads for parallel processing", num_threads);
        }
    }

    if let Some(dir) = &out {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    }

    if !silent {
        println!("\nProcessing {} files in parallel...\n", inputs.len());
    }

    // Progress tracking
    let processed_count = AtomicUsize::new(0);
    let total_files = inputs.len();

    let results: Vec<Result<PathBuf>> = inputs
        .par_iter()
        .map(|input| {
            let file_start = Instant::now();
            let output_path = determine_batch_output_path(input, out.as_deref(), &naming)?;
            let result = process_single_image(input, &output_path, &params, policy);

            let count = processed_count.fetch_add(1, Ordering::SeqCst) + 1;
            match &result {
                Ok(report) if !silent => println!(
                    "[{}/{}] {} -> {} ({:.2}s)",
                    count,
                    total_files,
                    input.display(),
                    report.output.display(),
                    file_start.elapsed().as_secs_f64()
                ),
                Ok(report) => println!("{}", report.output.display()),
                Err(e) => tracing::warn!(file = %input.display(), "{:#}", e),
            }

            result.map(|report| report.output)
        })
        .collect();

    // Summarize results
    let mut success_count = 0;
    let mut errors: Vec<(PathBuf, String)> = Vec::new();

    for (input, result) in inputs.iter().zip(results.iter()) {
        match result {
            Ok(_) => success_count += 1,
            Err(e) => errors.push((input.clone(), format!("{:#}", e))),
        }
    }

    let batch_elapsed = batch_start.elapsed();

    if !silent {
        println!("\n========================================");
        println!("BATCH PROCESSING COMPLETE");
        println!("========================================");
        println!("  Successful: {}", success_count);
        println!("  Failed:     {}", errors.len());
        match &out {
            Some(dir) => println!("  Output dir: {}", dir.display()),
            None => println!("  Output dir: <input folder>/{}", naming.output_dir_name),
        }
        println!("  Total time: {:.2}s", batch_elapsed.as_secs_f64());
        if success_count > 0 {
            println!(
                "  Avg time:   {:.2}s per file",
                batch_elapsed.as_secs_f64() / success_count as f64
            );
        }

        if !errors.is_empty() {
            println!("\nErrors:");
            for (path, error) in &errors {
                println!("  {}: {}", path.display(), error);
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        bail!("{} files failed to process", errors.len())
    }
}

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;

use negfix_cli::{determine_output_path, process_single_image, OutputNaming, ToneArgs};
use negfix_core::config::PipelineDefaults;

/// Execute the convert command for a single image.
///
/// Decodes the scan, runs the tone pipeline and writes the result in the
/// input's format as `<stem><edit_tag>.<ext>`, next to the input or into
/// `out`.
pub fn cmd_convert(
    input: PathBuf,
    out: Option<PathBuf>,
    tone: &ToneArgs,
    defaults: &PipelineDefaults,
    silent: bool,
) -> Result<()> {
    let start_time = Instant::now();
    let (params, policy) = tone.resolve(defaults);
    let naming = OutputNaming::new(&defaults.edit_tag, &defaults.output_dir_name);

    let output_path = determine_output_path(&input, out.as_deref(), &naming)?;

    if !silent {
        println!("Converting {}...", input.display());
    }

    let report = process_single_image(&input, &output_path, &params, policy)?;

    if !silent {
        println!(
            "  Black point: {}",
            format_point(report.black_point.as_slice())
        );
        println!(
            "  White point: {}",
            format_point(report.white_point.as_slice())
        );
        println!(
            "  Format: {} ({} -> {})",
            report.format, report.input_storage, report.output_storage
        );
        println!(
            "Wrote {} ({:.2}s)",
            report.output.display(),
            start_time.elapsed().as_secs_f64()
        );
    } else {
        println!("{}", report.output.display());
    }

    Ok(())
}

/// Format a per-channel point as `[a, b, c]`
pub fn format_point(values: &[f32]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{:.1}", v)).collect();
    format!("[{}]", parts.join(", "))
}

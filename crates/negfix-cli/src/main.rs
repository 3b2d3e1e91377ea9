use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use negfix_cli::ToneArgs;
use negfix_core::config::{load_pipeline_config, PipelineDefaults};

mod commands;

#[derive(Parser)]
#[command(name = "negfix")]
#[command(version, about = "Film scan tone mapper", long_about = None)]
struct Cli {
    /// Pipeline config file (YAML)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log per-stage statistics and config details
    #[arg(short, long, global = true, conflicts_with = "silent")]
    verbose: bool,

    /// Only print output paths and errors
    #[arg(short, long, global = true)]
    silent: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tone map a single scan
    Convert {
        /// Input file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output directory (defaults to the input's folder)
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,

        #[command(flatten)]
        tone: ToneArgs,
    },

    /// Tone map every scan in one or more folders
    Batch {
        /// Input folders or files
        #[arg(value_name = "INPUTS", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory (defaults to an Edits folder next to each input)
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,

        /// Number of parallel threads
        #[arg(short = 'j', long, value_name = "N")]
        threads: Option<usize>,

        /// Scan subdirectories too
        #[arg(short, long)]
        recursive: bool,

        #[command(flatten)]
        tone: ToneArgs,
    },

    /// Estimate black/white points and channel statistics
    Analyze {
        /// Input file
        input: PathBuf,

        /// Histogram tail fraction discarded when estimating points
        #[arg(long, value_name = "FRACTION")]
        clip: Option<f32>,

        /// Invert the scan before estimating
        #[arg(long, conflicts_with = "no_invert")]
        invert: bool,

        /// Do not invert, even if the config enables it
        #[arg(long)]
        no_invert: bool,

        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,

        /// Save the analysis as JSON
        #[arg(long, value_name = "FILE")]
        save: Option<PathBuf>,
    },

    /// Write the built-in defaults to a config file
    Init {
        /// Config file to write (defaults to the user config directory)
        #[arg(long, value_name = "FILE")]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing(verbose: bool, silent: bool) {
    let default_level = if verbose {
        "debug"
    } else if silent {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Load config defaults, reporting where they came from.
///
/// An explicit `--config` file that cannot be read or parsed is an error.
fn load_defaults(config: Option<&Path>, verbose: bool) -> Result<PipelineDefaults> {
    let handle = load_pipeline_config(config)?;
    if verbose {
        handle.log_usage();
    }
    Ok(handle.config.defaults)
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.silent);

    let result = match cli.command {
        Commands::Convert { input, out, tone } => {
            load_defaults(cli.config.as_deref(), cli.verbose).and_then(|defaults| {
                commands::cmd_convert(input, out, &tone, &defaults, cli.silent)
            })
        }

        Commands::Batch {
            inputs,
            out,
            threads,
            recursive,
            tone,
        } => load_defaults(cli.config.as_deref(), cli.verbose).and_then(|defaults| {
            commands::cmd_batch(inputs, recursive, out, threads, &tone, &defaults, cli.silent)
        }),

        Commands::Analyze {
            input,
            clip,
            invert,
            no_invert,
            json,
            save,
        } => load_defaults(cli.config.as_deref(), cli.verbose).and_then(|defaults| {
            let invert_scan = if invert {
                Some(true)
            } else if no_invert {
                Some(false)
            } else {
                None
            };
            commands::cmd_analyze(input, clip, invert_scan, json, save, &defaults)
        }),

        Commands::Init { path, force } => commands::cmd_init(path, force),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

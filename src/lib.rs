//! vadtrim - trim silence and noise around speech in WAV recordings.
//!
//! Each recording is enhanced (denoised, mixed to mono, peak-normalized),
//! segmented by frame energy, and the first speech region is cut from the
//! original audio without re-encoding.

#![warn(missing_docs)]

pub mod audio;
pub mod cli;
pub mod config;
pub mod constants;
pub mod detection;
pub mod error;
pub mod output;
pub mod pipeline;

use clap::Parser;
use cli::{Cli, Command, ConfigAction, DirArgs, WavArgs};
use config::{Config, config_file_path, load_config_file, save_config, validate_config};
use output::{BatchPayload, ConfigPayload, ExtractionPayload};
use pipeline::{BatchOptions, Extractor, default_output_path, run_batch};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub use error::{Error, Result};

/// Console behaviour shared by all commands.
#[derive(Debug, Clone, Copy)]
struct OutputMode {
    json: bool,
    progress: bool,
}

/// Main entry point for vadtrim CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    // Remove in-flight temp artifacts on interrupt
    if let Err(e) = ctrlc::set_handler(|| {
        detection::cleanup_all_artifacts();
        std::process::exit(130); // 128 + SIGINT(2)
    }) {
        warn!("Failed to install Ctrl+C handler: {e}");
    }

    let mode = OutputMode {
        json: cli.json,
        progress: !(cli.quiet || cli.json || cli.no_progress),
    };

    let result = handle_command(cli.command, cli.config.as_deref(), mode);
    if mode.json
        && let Err(ref e) = result
    {
        output::emit_json_error(e);
    }
    result
}

fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter_str = if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str));

    // stdout is reserved for results
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    explicit.map_or_else(config_file_path, |p| Ok(p.to_path_buf()))
}

fn load_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => load_config_file(path),
        None => config::load_default_config(),
    }
}

fn handle_command(command: Command, config_path: Option<&Path>, mode: OutputMode) -> Result<()> {
    match command {
        Command::Wav(args) => {
            let config = load_config(config_path)?;
            run_single(&args, config, mode)
        }
        Command::Dir(args) => {
            let config = load_config(config_path)?;
            run_dir(&args, config, mode)
        }
        Command::Config { action } => handle_config_command(action, config_path, mode),
    }
}

fn run_single(args: &WavArgs, mut config: Config, mode: OutputMode) -> Result<()> {
    args.detection.apply(&mut config.detection);
    validate_config(&config)?;

    let output = args
        .out
        .clone()
        .unwrap_or_else(|| default_output_path(&args.file));

    let extractor = Extractor::from_config(&config);
    let extraction = extractor.extract(&args.file, &output)?;

    if mode.json {
        output::emit_json_result(&ExtractionPayload::new(&args.file, &extraction));
    } else {
        println!("{}", extraction.output.display());
    }
    Ok(())
}

fn run_dir(args: &DirArgs, mut config: Config, mode: OutputMode) -> Result<()> {
    args.detection.apply(&mut config.detection);
    if let Some(ref suffix) = args.suffix {
        config.output.suffix.clone_from(suffix);
    }
    validate_config(&config)?;

    let options = BatchOptions {
        suffix: config.output.suffix.clone(),
        report_every: args.verbose_every,
        progress: mode.progress,
    };

    let extractor = Extractor::from_config(&config);
    let report = run_batch(&extractor, &args.dir, &args.out_dir, &options)?;

    info!(
        "Finished: {} saved, {} failed",
        report.saved.len(),
        report.failures.len()
    );

    if mode.json {
        output::emit_json_result(&BatchPayload::new(&args.dir, &args.out_dir, &report));
    } else {
        println!(
            "Processed {} file(s): {} saved, {} failed",
            report.processed,
            report.saved.len(),
            report.failures.len()
        );
        if let Some(ref log) = report.error_log {
            println!("Failed files listed in {}", log.display());
        }
    }
    Ok(())
}

fn handle_config_command(
    action: ConfigAction,
    config_path: Option<&Path>,
    mode: OutputMode,
) -> Result<()> {
    let path = resolve_config_path(config_path)?;

    match action {
        ConfigAction::Init => {
            if path.exists() {
                println!("Configuration file already exists: {}", path.display());
            } else {
                save_config(&Config::default(), &path)?;
                println!("Created configuration file: {}", path.display());
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_config_file(&path)?;
            if mode.json {
                output::emit_json_result(&ConfigPayload::new(&path, &config)?);
            } else {
                let text = toml::to_string_pretty(&config)
                    .map_err(|e| Error::ConfigSerialize { source: e })?;
                println!("# {}", path.display());
                print!("{text}");
            }
            Ok(())
        }
        ConfigAction::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

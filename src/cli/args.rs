//! CLI argument definitions.

use super::validators::{parse_finite, parse_non_negative_secs, parse_positive_secs};
use crate::detection::DetectionParams;
use clap::builder::BoolishValueParser;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Trim silence and background noise around the speech in WAV recordings.
#[derive(Debug, Parser)]
#[command(name = "vadtrim")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Increase verbosity (-v: debug, -vv: trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Hide the progress bar in directory mode.
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Print one JSON result line on stdout.
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (default: platform config directory).
    #[arg(long, env = "VADTRIM_CONFIG", global = true)]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Trim a single WAV file.
    Wav(WavArgs),
    /// Trim every WAV file in a directory.
    Dir(DirArgs),
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

/// Arguments for the `wav` command.
#[derive(Debug, Args)]
pub struct WavArgs {
    /// Input WAV file.
    pub file: PathBuf,

    /// Output path (default: input name with `_out` before the extension).
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Detection overrides.
    #[command(flatten)]
    pub detection: DetectionArgs,
}

/// Arguments for the `dir` command.
#[derive(Debug, Args)]
pub struct DirArgs {
    /// Directory containing WAV files.
    pub dir: PathBuf,

    /// Directory for trimmed files (created if missing).
    pub out_dir: PathBuf,

    /// Suffix inserted before `.wav` in output names.
    #[arg(long)]
    pub suffix: Option<String>,

    /// Log a progress line every N files (0 disables).
    #[arg(long, default_value_t = 0)]
    pub verbose_every: usize,

    /// Detection overrides.
    #[command(flatten)]
    pub detection: DetectionArgs,
}

/// Segmentation overrides shared by `wav` and `dir`.
#[derive(Debug, Clone, Default, Args)]
pub struct DetectionArgs {
    /// Longest region before a forced split, in seconds.
    #[arg(long = "max-dur", visible_alias = "max_dur", value_parser = parse_positive_secs)]
    pub max_duration: Option<f64>,

    /// Longest silence tolerated inside a region, in seconds.
    #[arg(long = "max-silence", visible_alias = "max_silence", value_parser = parse_non_negative_secs)]
    pub max_silence: Option<f64>,

    /// Energy threshold in dB; quieter frames are silence.
    #[arg(long = "eth", value_parser = parse_finite, allow_negative_numbers = true)]
    pub energy_threshold: Option<f64>,

    /// Drop trailing silence from regions (true/false).
    #[arg(long = "dtl", value_parser = BoolishValueParser::new())]
    pub drop_trailing_silence: Option<bool>,

    /// Shortest region kept, in seconds.
    #[arg(long = "min-dur", value_parser = parse_non_negative_secs)]
    pub min_duration: Option<f64>,
}

impl DetectionArgs {
    /// Apply the flags that were given on top of `params`.
    pub fn apply(&self, params: &mut DetectionParams) {
        if let Some(v) = self.max_duration {
            params.max_duration = v;
        }
        if let Some(v) = self.max_silence {
            params.max_silence = v;
        }
        if let Some(v) = self.energy_threshold {
            params.energy_threshold = v;
        }
        if let Some(v) = self.drop_trailing_silence {
            params.drop_trailing_silence = v;
        }
        if let Some(v) = self.min_duration {
            params.min_duration = v;
        }
    }
}

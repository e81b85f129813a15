//! CLI argument parsing.

mod args;
mod validators;

pub use args::{Cli, Command, ConfigAction, DetectionArgs, DirArgs, WavArgs};

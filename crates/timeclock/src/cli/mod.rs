//! Command-line interface for timeclock.
//!
//! This module provides the CLI structure, the status presentation, and the
//! interactive terminal kiosk for the `timeclock` binary.

mod commands;
pub mod present;
pub mod terminal;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{CameraCommand, ConfigCommand, FacingArg, RunCommand};

/// timeclock - Photo-verified employee time clock
///
/// A kiosk where employees pick their profile and clock in or out. Every
/// clock action is recorded with a photo taken at the kiosk.
#[derive(Debug, Parser)]
#[command(name = "timeclock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the interactive kiosk
    Run(RunCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Exercise the camera
    #[command(subcommand)]
    Camera(CameraCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::camera::Facing;

/// Arguments for the interactive kiosk.
#[derive(Debug, Args)]
pub struct RunCommand {
    /// Read a still image instead of the configured camera
    #[arg(long, value_name = "FILE")]
    pub image: Option<PathBuf>,

    /// Start without the built-in demo employees
    #[arg(long)]
    pub no_seed: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Camera commands.
#[derive(Debug, Subcommand)]
pub enum CameraCommand {
    /// Open the camera, take one JPEG snapshot, and close it
    Snapshot {
        /// Where to write the JPEG
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Camera to request
        #[arg(long, value_enum)]
        facing: Option<FacingArg>,

        /// Keep the raw sensor orientation instead of mirroring
        #[arg(long)]
        no_mirror: bool,
    },
}

/// Camera facing argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FacingArg {
    /// Front camera
    User,
    /// Rear camera
    Environment,
}

impl From<FacingArg> for Facing {
    fn from(arg: FacingArg) -> Self {
        match arg {
            FacingArg::User => Self::User,
            FacingArg::Environment => Self::Environment,
        }
    }
}

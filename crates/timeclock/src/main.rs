//! `timeclock` - CLI for the time-clock kiosk
//!
//! This binary runs the interactive kiosk and provides helpers for checking
//! configuration and the camera.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;

use timeclock::camera::{self, CaptureSession};
use timeclock::cli::{terminal, CameraCommand, Cli, Command, ConfigCommand, RunCommand};
use timeclock::config::CameraSource;
use timeclock::{init_logging, Config, Error, Kiosk, NoOpError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    // Execute the command
    match cli.command {
        Command::Run(run_cmd) => handle_run(config, run_cmd).await,
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
        Command::Camera(camera_cmd) => handle_camera(&config, camera_cmd).await,
    }
}

async fn handle_run(mut config: Config, cmd: RunCommand) -> anyhow::Result<()> {
    if let Some(path) = cmd.image {
        config.camera.source = CameraSource::StillImage;
        config.camera.image_path = Some(path);
    }
    if cmd.no_seed {
        config.registry.seed_employees.clear();
    }

    let mut kiosk = Kiosk::from_config(&config)?;
    println!("timeclock kiosk (camera: {}). Type 'help' for commands.", kiosk.camera_name());

    let input = BufReader::new(tokio::io::stdin());
    let mut out = std::io::stdout();
    terminal::run(&mut kiosk, input, &mut out).await?;
    Ok(())
}

async fn handle_camera(config: &Config, cmd: CameraCommand) -> anyhow::Result<()> {
    match cmd {
        CameraCommand::Snapshot {
            output,
            facing,
            no_mirror,
        } => {
            let device = camera::from_config(&config.camera);
            let mut request = config.stream_request();
            if let Some(facing) = facing {
                request.facing = facing.into();
            }
            let mut encoding = config.snapshot_encoding();
            if no_mirror {
                encoding.mirror = false;
            }

            let mut session = CaptureSession::open(device.as_ref(), &request)
                .await
                .map_err(|err| anyhow::anyhow!("{}", err.user_message()))?;
            let photo = session.capture(encoding).await?;
            session.close();

            let bytes = photo
                .jpeg_bytes()
                .ok_or(Error::NoOp(NoOpError::EmptyFrame))?;
            std::fs::write(&output, &bytes).map_err(|source| Error::FileWrite {
                path: output.clone(),
                source,
            })?;
            println!(
                "Wrote {} bytes from {} to {}",
                bytes.len(),
                device.name(),
                output.display()
            );
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Camera]");
                println!("  Source:             {:?}", config.camera.source);
                if let Some(path) = &config.camera.image_path {
                    println!("  Image path:         {}", path.display());
                }
                println!("  Facing:             {}", config.camera.facing);
                println!(
                    "  Resolution:         {}x{}",
                    config.camera.width, config.camera.height
                );
                println!("  Mirror:             {}", config.camera.mirror);
                println!("  JPEG quality:       {}", config.camera.jpeg_quality);
                println!();
                println!("[Clock]");
                println!(
                    "  Processing delay:   {} ms",
                    config.clock.processing_delay_ms
                );
                println!();
                println!("[Registry]");
                println!(
                    "  Seed employees:     {}",
                    config.registry.seed_employees.len()
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

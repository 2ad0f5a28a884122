//! retouch-cli: chain filter edits through a processing service from the
//! command line.
//!
//! Loads an image into an edit session, applies the filter flags, sends
//! the image to the service one or more times (each pass edits the
//! previous result), and writes the final image to disk.
//!
//! # Usage
//!
//! ```text
//! cargo run --bin retouch-cli -- --brightness 150 --rotate 1 photo.jpg
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod http;

use std::cell::RefCell;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use retouch_session::{
    ApplyOutcome, Command, Coordinator, EditSession, FilterOptions, ImageBlob, SessionError,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::http::HttpService;

/// Endpoint of a processing service running locally.
const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/api/edit";

/// Apply brightness, contrast, grayscale, rotation, and flip to an image
/// using a remote retouch processing service.
#[derive(Debug, Parser)]
#[command(name = "retouch-cli", version)]
struct Cli {
    /// Path to the input image.
    image_path: PathBuf,

    /// Processing service URL.
    #[arg(long, env = "RETOUCH_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Brightness in percent (0-200).
    #[arg(long, default_value_t = FilterOptions::DEFAULT_BRIGHTNESS)]
    brightness: f64,

    /// Contrast in percent (0-200).
    #[arg(long, default_value_t = FilterOptions::DEFAULT_CONTRAST)]
    contrast: f64,

    /// Grayscale amount in percent (0-100).
    #[arg(long, default_value_t = FilterOptions::DEFAULT_GRAYSCALE)]
    grayscale: f64,

    /// Number of 90° clockwise turns.
    #[arg(long, default_value_t = 0)]
    rotate: u32,

    /// Mirror the image horizontally.
    #[arg(long)]
    flip: bool,

    /// How many times to send the image; each pass edits the last result.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    passes: u32,

    /// Output path. Defaults to `edited-image.<ext>` in the current
    /// directory.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Raise log verbosity (-v debug, -vv trace). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Session commands equivalent to the filter flags.
    fn commands(&self) -> Vec<Command> {
        let mut commands = vec![
            Command::SetBrightness(self.brightness),
            Command::SetContrast(self.contrast),
            Command::SetGrayscale(self.grayscale),
        ];
        commands.extend((0..self.rotate).map(|_| Command::RotateClockwise));
        if self.flip {
            commands.push(Command::ToggleFlip);
        }
        commands
    }

    const fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("reading {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("writing {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("building HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("pass {pass} did not produce an image ({outcome:?})")]
    Dropped { pass: u32, outcome: ApplyOutcome },
}

#[allow(clippy::future_not_send)]
async fn run(cli: &Cli) -> Result<PathBuf, CliError> {
    let bytes = tokio::fs::read(&cli.image_path)
        .await
        .map_err(|source| CliError::Read {
            path: cli.image_path.clone(),
            source,
        })?;
    let name = cli
        .image_path
        .file_name()
        .map_or_else(|| "image".to_owned(), |n| n.to_string_lossy().into_owned());
    let image = ImageBlob::from_file(bytes, name);
    info!(image = %image.name(), mime = %image.mime(), bytes = image.len(), "loaded");

    let session = RefCell::new(EditSession::new());
    {
        let mut session = session.borrow_mut();
        session.dispatch(Command::LoadImage(Some(image)));
        for command in cli.commands() {
            session.dispatch(command);
        }
        info!(options = ?session.options(), "options set");
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(cli.timeout))
        .build()?;
    let coordinator = Coordinator::new(HttpService::new(client, cli.endpoint.as_str()));
    info!(endpoint = coordinator.service().endpoint(), passes = cli.passes, "sending");

    for pass in 1..=cli.passes {
        match coordinator.apply(&session).await? {
            ApplyOutcome::Applied(image) => {
                info!(pass, bytes = image.len(), "pass applied");
            }
            outcome => return Err(CliError::Dropped { pass, outcome }),
        }
    }

    let export = retouch_session::download(&session.borrow())?;
    let path = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(export.filename()));
    tokio::fs::write(&path, export.bytes())
        .await
        .map_err(|source| CliError::Write {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level())),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli).await {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

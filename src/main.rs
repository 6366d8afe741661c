//! `mileage-lens` command line.
//!
//! ```text
//! mileage-lens serve
//! mileage-lens snap odometer.jpg --rect 120,340,400,90 [--preview out.png] [--dry-run]
//! mileage-lens snap odometer.jpg --center
//! mileage-lens records
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mileage_lens_lib::capture::{CaptureSession, CropStrategy, ImageFileSource};
use mileage_lens_lib::config::Settings;
use mileage_lens_lib::selection::{ClientPoint, DisplayBox, Rect};
use mileage_lens_lib::server;
use mileage_lens_lib::transport::MileageClient;

#[derive(Debug, Parser)]
#[command(name = "mileage-lens", version, about = "Odometer snapshot and mileage log")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the upload/records service.
    Serve,

    /// Crop an odometer photo and upload the reading.
    Snap {
        /// Photo to read.
        image: PathBuf,

        /// Selection as x,y,w,h in image pixels.
        #[arg(long, value_parser = parse_rect, conflicts_with = "center")]
        rect: Option<Rect>,

        /// Use the fixed centre crop instead of a manual selection.
        #[arg(long)]
        center: bool,

        /// Write the frame with the selection overlay to this PNG.
        #[arg(long)]
        preview: Option<PathBuf>,

        /// Encode the crop but do not upload it.
        #[arg(long)]
        dry_run: bool,

        /// Service base URL (defaults to MILEAGE_SERVER_URL).
        #[arg(long)]
        server: Option<String>,
    },

    /// Print the most recent readings.
    Records {
        #[arg(long)]
        server: Option<String>,
    },
}

fn parse_rect(s: &str) -> Result<Rect, String> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("expected x,y,w,h: {}", e))?;

    match parts.as_slice() {
        [x, y, w, h] if *w >= 0.0 && *h >= 0.0 => Ok(Rect::new(*x, *y, *w, *h)),
        [_, _, _, _] => Err("width and height must not be negative".to_string()),
        _ => Err(format!("expected 4 values, got {}", parts.len())),
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load()?;

    match cli.command {
        Command::Serve => {
            log::info!("Mileage Lens service starting up");
            server::serve(&settings).await?;
        }
        Command::Snap {
            image,
            rect,
            center,
            preview,
            dry_run,
            server,
        } => {
            let strategy = if center {
                CropStrategy::center_default()
            } else {
                CropStrategy::Manual
            };
            let url = server.unwrap_or_else(|| settings.server_url.clone());
            snap(image, strategy, rect, preview, dry_run, &url).await?;
        }
        Command::Records { server } => {
            let url = server.unwrap_or_else(|| settings.server_url.clone());
            let records = MileageClient::new(url).records().await?;
            if records.is_empty() {
                println!("No readings yet.");
            }
            for record in records {
                println!("{:>12}  {}", record.mileage, record.timestamp.to_rfc3339());
            }
        }
    }

    Ok(())
}

/// Runs one full capture cycle headless: the rectangle is replayed as a
/// drag over an unscaled canvas.
async fn snap(
    image: PathBuf,
    strategy: CropStrategy,
    rect: Option<Rect>,
    preview: Option<PathBuf>,
    dry_run: bool,
    server_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = CaptureSession::new(strategy);
    let mut source = ImageFileSource::new(&image);

    if !session.acquire(&mut source) {
        return Err(session.status().into());
    }
    session.snapshot(&mut source)?;

    let (width, height) = session
        .frame()
        .map(|f| f.dimensions())
        .ok_or("snapshot produced no frame")?;
    let display = DisplayBox::new(0.0, 0.0, width as f64, height as f64);

    if strategy == CropStrategy::Manual {
        let rect = rect.ok_or("--rect is required unless --center is given")?;
        session.pointer_down(ClientPoint::new(rect.x, rect.y), display);
        session.pointer_move(ClientPoint::new(rect.x + rect.w, rect.y + rect.h), display);
        session.pointer_up();
    }

    if let Some(path) = preview {
        if let Some(frame) = session.render() {
            frame.save(&path)?;
            println!("Preview written to {}", path.display());
        }
    }

    if !session.can_submit() {
        println!(
            "Selection {} is too small to submit; both sides must exceed {} pixels.",
            session.selection().rect(),
            mileage_lens_lib::selection::MIN_SELECTION_SIZE
        );
        return Ok(());
    }

    let payload = session.submit()?;
    if dry_run {
        println!("Encoded crop: {} characters of data URL (not uploaded).", payload.image.len());
        return Ok(());
    }

    let client = MileageClient::new(server_url);
    let outcome = client.upload(&payload).await;
    session.finish_upload(&mut source, &outcome);
    println!("{}", session.status());
    Ok(())
}

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::{Config, DEFAULT_CONFIG_PATH};
use rollcall_core::{
    FrameSource, Gallery, NotifyOutcome, ScheduleResolver, Session, SessionReport,
};
use rollcall_media::{AnnotationWriter, ImageSequence, LabelFont, RawBgrVideo};
use rollcall_store::AttendanceStore;
use rollcall_vision::OnnxFaceEncoder;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "rollcall", about = "Face-recognition attendance and intruder alerts")]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a recorded session and take attendance
    Run {
        /// Directory of extracted video frames (read in filename order),
        /// or a raw BGR24 file when --size is given
        #[arg(short, long)]
        video: PathBuf,
        /// Frame size of a raw BGR24 video, as WIDTHxHEIGHT
        #[arg(long, value_parser = parse_size)]
        size: Option<(u32, u32)>,
        /// Write annotated sampled frames to this directory
        #[arg(short, long)]
        annotate: Option<PathBuf>,
        /// Font for overlay labels (overrides [paths] font)
        #[arg(long, requires = "annotate")]
        font: Option<PathBuf>,
        /// Print the session report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the class slot for the current time
    Slot,
    /// List identities in the reference gallery
    Gallery,
    /// Print attendance rows from the last session
    Records,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Run {
            video,
            size,
            annotate,
            font,
            json,
        } => {
            let font = font.or_else(|| config.paths.font.clone());
            let report = run(&config, &video, size, annotate, font).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.summary());
            }
        }
        Commands::Slot => {
            let resolver = ScheduleResolver::load(&config.paths.schedule);
            let slot = resolver.resolve(&chrono::Local::now().naive_local());
            println!("Subject: {}", slot.subject);
            println!("Timing:  {}", slot.timing);
        }
        Commands::Gallery => {
            let gallery = Gallery::load(&config.paths.gallery)
                .with_context(|| format!("failed to load gallery {}", config.paths.gallery.display()))?;
            println!(
                "{} vectors, {} dimensions",
                gallery.len(),
                gallery.dimension()
            );
            for name in gallery.names() {
                println!("  {name}");
            }
        }
        Commands::Records => {
            let store = AttendanceStore::open_existing(&config.paths.database)?;
            let records = store.records()?;
            if records.is_empty() {
                println!("No attendance recorded");
            }
            for r in records {
                println!("{:<24} {:<20} {:<15} {} {}", r.name, r.subject, r.timing, r.date, r.timestamp);
            }
        }
    }

    Ok(())
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let dim = |v: &str| match v.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("invalid frame dimension {v:?}")),
    };
    Ok((dim(w)?, dim(h)?))
}

/// A directory is an image sequence; a file needs a frame size to be read as raw BGR24.
fn open_source(video: &Path, size: Option<(u32, u32)>) -> Result<Box<dyn FrameSource + Send>> {
    let source: Box<dyn FrameSource + Send> = if video.is_dir() {
        Box::new(ImageSequence::open(video)?)
    } else {
        let (width, height) =
            size.context("--size WIDTHxHEIGHT is required for a raw BGR24 video file")?;
        Box::new(RawBgrVideo::open(video, width, height)?)
    };
    Ok(source)
}

/// Load every collaborator, then run the frame loop off the async runtime.
///
/// All fatal inputs are checked here, before the first frame is read.
async fn run(
    config: &Config,
    video: &Path,
    size: Option<(u32, u32)>,
    annotate: Option<PathBuf>,
    font: Option<PathBuf>,
) -> Result<SessionReport> {
    let session_config = config.session.clone();
    session_config.validate().context("invalid session config")?;

    let gallery = Gallery::load(&config.paths.gallery)
        .with_context(|| format!("failed to load gallery {}", config.paths.gallery.display()))?;
    let slot = ScheduleResolver::load(&config.paths.schedule)
        .resolve(&chrono::Local::now().naive_local());
    let source = open_source(video, size)
        .with_context(|| format!("failed to open video {}", video.display()))?;
    let encoder = OnnxFaceEncoder::load(&config.paths.models).context("failed to load face models")?;
    let store = AttendanceStore::open(&config.paths.database).with_context(|| {
        format!("failed to open attendance database {}", config.paths.database.display())
    })?;
    let writer = match annotate {
        Some(dir) => {
            let writer = AnnotationWriter::create(&dir)
                .with_context(|| format!("failed to create annotation directory {}", dir.display()))?;
            Some(match font {
                Some(path) => writer.with_font(LabelFont::load(&path)?),
                None => {
                    tracing::info!("no label font configured; overlays carry boxes only");
                    writer
                }
            })
        }
        None => None,
    };

    tracing::info!(
        gallery = gallery.len(),
        subject = %slot.subject,
        "session ready"
    );
    let session = Session::new(session_config, gallery, slot, encoder, store)?;

    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt requested; finishing current frame");
            flag.store(true, Ordering::Relaxed);
        }
    });

    let (report, written) = tokio::task::spawn_blocking(move || {
        let mut writer = writer;
        let result = match writer.as_mut() {
            Some(w) => session.run(source, &stop, w),
            None => session.run(source, &stop, &mut ()),
        };
        result.map(|report| (report, writer.map(|w| w.written())))
    })
    .await
    .context("session task panicked")?
    .context("session aborted")?;

    if let Some(n) = written {
        tracing::info!(frames = n, "annotated frames written");
    }

    let notifier = rollcall_notify::from_config(&config.notification);
    if let NotifyOutcome::Failed(reason) = report.notify(notifier.as_ref()) {
        eprintln!("Warning: intrusion alert could not be delivered: {reason}");
    }

    Ok(report)
}

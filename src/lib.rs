//! Cheese - hands-free selfies
//!
//! Watches a video stream for a raised hand or a peace sign, counts down,
//! and takes a selfie. Built for headless use: detections come from a
//! recording, selfies go to the downloads folder and a persistent gallery.

pub mod capture;
pub mod config;
pub mod database;
pub mod detector;
pub mod download;
pub mod frame_loop;
pub mod gallery;
pub mod gesture;
pub mod keypoint;
pub mod replay;
pub mod trigger;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use crate::capture::{CaptureSequencer, Collaborators, LatestFrame, LogDisplay, MirroredPngCapture};
use crate::config::Config;
use crate::database::SqliteListStore;
use crate::download::FileDownloader;
use crate::frame_loop::FrameLoop;
use crate::gallery::{Gallery, ListStore, MemoryListStore};
use crate::gesture::GestureClassifier;
use crate::replay::Recording;
use crate::trigger::SharedArbiter;

/// Sets up logging to stdout and `~/.cheese/logs/cheese-debug.log`
///
/// The filter comes from `RUST_LOG`, defaulting to `info`.
pub fn init_logging() {
    use tracing_subscriber::prelude::*;

    /// Format timestamps using the system's local time via chrono
    struct LocalTimer;
    impl tracing_subscriber::fmt::time::FormatTime for LocalTimer {
        fn format_time(
            &self,
            w: &mut tracing_subscriber::fmt::format::Writer<'_>,
        ) -> std::fmt::Result {
            write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
        }
    }

    let log_dir = config::get_data_dir().join("logs");
    let _ = std::fs::create_dir_all(&log_dir);
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("cheese-debug.log"))
        .ok();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if let Some(file) = log_file {
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::sync::Mutex::new(file))
            .with_timer(LocalTimer)
            .with_ansi(false);
        let stdout_layer = tracing_subscriber::fmt::layer().with_timer(LocalTimer);
        tracing_subscriber::registry()
            .with(filter)
            .with(stdout_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_timer(LocalTimer)
            .init();
    }
}

/// What the binary was asked to do
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Recorded detections to replay
    pub recording: PathBuf,
    /// Config file to use instead of `~/.cheese/config.json`
    pub config_path: Option<PathBuf>,
    /// Keep the gallery in memory only
    pub no_persist: bool,
}

/// Loads the config from `path`, or the default location
///
/// An explicit file must exist; it becomes the process-wide config.
pub fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(config::get_config());
    };

    if !path.exists() {
        anyhow::bail!("Config file {:?} does not exist", path);
    }

    let config = config::load_from_path(path)
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("Failed to load config from {:?}", path))?;
    if !config::install_config(config.clone()) {
        tracing::warn!("Config already loaded, {:?} applies to this run only", path);
    }
    Ok(config)
}

/// Opens the gallery, durable unless `no_persist` or the config says not to
pub fn open_gallery(config: &Config, no_persist: bool) -> anyhow::Result<Arc<Gallery>> {
    let store: Arc<dyn ListStore> = if no_persist || !config.storage.persist_gallery {
        tracing::info!("Gallery kept in memory for this run");
        Arc::new(MemoryListStore::new())
    } else {
        Arc::new(SqliteListStore::open_default().context("Failed to open gallery database")?)
    };

    let gallery = Gallery::restore(store, config.storage.gallery_key.clone())
        .context("Failed to restore gallery")?;
    Ok(Arc::new(gallery))
}

/// Replays a recording through the full pipeline
///
/// Returns once the recording has ended and any countdown in flight has
/// finished. Ctrl-C stops the loop and cancels a running countdown.
pub async fn run(options: RunOptions) -> anyhow::Result<()> {
    tracing::info!("Cheese starting");

    let config = load_config(options.config_path.as_deref())?;
    config.validate().map_err(anyhow::Error::msg)?;

    let recording = Recording::load(&options.recording)?;
    if recording.is_empty() {
        tracing::warn!("Recording {:?} has no frames", options.recording);
    }

    let gallery = open_gallery(&config, options.no_persist)?;

    let collaborators = Collaborators {
        capture: Arc::new(MirroredPngCapture::new(config.camera.mirror)),
        downloader: Arc::new(FileDownloader::from_config(&config.storage)),
        gallery: gallery.clone(),
        display: Arc::new(LogDisplay),
    };

    let latest_frame = LatestFrame::new();
    let sequencer = Arc::new(CaptureSequencer::new(
        (&config.countdown).into(),
        collaborators,
        latest_frame.clone(),
    ));
    let arbiter = SharedArbiter::new(Duration::from_millis(config.trigger.cooldown_ms));

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        let sequencer = sequencer.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupted, stopping");
                stop.store(true, Ordering::SeqCst);
                sequencer.cancel();
            }
        });
    }

    let frame_loop = FrameLoop::new(
        GestureClassifier::new(&config.detection),
        arbiter.clone(),
        sequencer.clone(),
        latest_frame,
    )
    .with_stop_flag(stop);

    let mut frames = recording.frames(&config.camera);
    let mut poses = recording.pose_detector();
    let mut hands = recording.hand_detector();
    let stats = frame_loop.run(&mut frames, &mut poses, &mut hands).await;

    if let Some(status) = sequencer.join().await {
        tracing::info!("Last countdown ended: {:?}", status);
    }

    let trigger = arbiter.status(stats.last_frame_at);
    tracing::info!(
        "Cheese finished: {} frames, {} selfie session(s), {} gesture(s) ignored, trigger {}, gallery holds {}",
        stats.frames,
        stats.captures_started,
        trigger.discarded,
        trigger.description,
        gallery.len()
    );
    Ok(())
}

//! Countdown-then-capture sequencing
//!
//! Each accepted gesture becomes one [`CaptureSession`] running on its own
//! tokio task, so the frame loop keeps scanning while the countdown ticks.
//! A started session always ends in a terminal state: its failures are
//! logged and shown, never retried.

use super::{
    CountdownDisplay, Downloader, EncodedImage, GalleryAppender, LatestFrame, StillCapture,
};
use crate::config::CountdownConfig;
use crate::keypoint::Timestamp;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

/// Capture session status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Countdown in progress
    Counting,
    /// Frame grabbed (persistence may still have failed)
    Captured,
    /// Cancelled before the final tick
    Cancelled,
    /// The frame grab itself failed; nothing was persisted
    Failed,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::Counting)
    }
}

/// One countdown-to-still-image run
#[derive(Debug, Clone)]
pub struct CaptureSession {
    pub id: Uuid,
    /// Stream time of the gesture that started the session
    pub started_at: Timestamp,
    pub remaining_ticks: u32,
    pub status: SessionStatus,
}

/// Countdown timing
#[derive(Debug, Clone, Copy)]
pub struct SequencerConfig {
    /// Number of countdown ticks before the capture
    pub ticks: u32,
    /// Time between ticks
    pub tick_interval: Duration,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            ticks: 3,
            tick_interval: Duration::from_secs(1),
        }
    }
}

impl From<&CountdownConfig> for SequencerConfig {
    fn from(config: &CountdownConfig) -> Self {
        Self {
            ticks: config.ticks,
            tick_interval: Duration::from_millis(config.tick_interval_ms),
        }
    }
}

/// External collaborators used at the end of the countdown
#[derive(Clone)]
pub struct Collaborators {
    pub capture: Arc<dyn StillCapture>,
    pub downloader: Arc<dyn Downloader>,
    pub gallery: Arc<dyn GalleryAppender>,
    pub display: Arc<dyn CountdownDisplay>,
}

/// Errors starting a session
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SequencerError {
    #[error("A capture session is already counting down")]
    Busy,

    #[error("No async runtime available to run the countdown")]
    NoRuntime,
}

/// Resets the busy flag when the session task ends, however it ends
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Runs countdown sessions, one at a time
pub struct CaptureSequencer {
    config: SequencerConfig,
    collaborators: Collaborators,
    latest_frame: LatestFrame,
    busy: Arc<AtomicBool>,
    cancel_requested: Arc<AtomicBool>,
    task: Mutex<Option<JoinHandle<SessionStatus>>>,
}

impl CaptureSequencer {
    pub fn new(
        config: SequencerConfig,
        collaborators: Collaborators,
        latest_frame: LatestFrame,
    ) -> Self {
        Self {
            config,
            collaborators,
            latest_frame,
            busy: Arc::new(AtomicBool::new(false)),
            cancel_requested: Arc::new(AtomicBool::new(false)),
            task: Mutex::new(None),
        }
    }

    /// Whether a session is counting down
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Starts a countdown session
    ///
    /// Must be called from within a tokio runtime. Returns immediately; the
    /// countdown runs on its own task.
    pub fn begin(&self, started_at: Timestamp) -> Result<Uuid, SequencerError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| SequencerError::NoRuntime)?;

        if self.busy.swap(true, Ordering::SeqCst) {
            tracing::warn!("Sequencer: session already counting, rejecting begin");
            return Err(SequencerError::Busy);
        }
        let guard = BusyGuard(self.busy.clone());
        self.cancel_requested.store(false, Ordering::SeqCst);

        let session = CaptureSession {
            id: Uuid::new_v4(),
            started_at,
            remaining_ticks: self.config.ticks,
            status: SessionStatus::Counting,
        };
        let id = session.id;

        tracing::info!(
            "Sequencer: session {} started ({} ticks every {:?})",
            id,
            self.config.ticks,
            self.config.tick_interval
        );

        let run = SessionRun {
            session,
            tick_interval: self.config.tick_interval,
            collaborators: self.collaborators.clone(),
            latest_frame: self.latest_frame.clone(),
            cancel_requested: self.cancel_requested.clone(),
        };

        let handle = runtime.spawn(async move {
            let _guard = guard;
            run.run().await
        });
        *self.task.lock() = Some(handle);

        Ok(id)
    }

    /// Cancels the counting session, if any
    ///
    /// Takes effect before the session's next tick. Returns false when there
    /// was nothing to cancel.
    pub fn cancel(&self) -> bool {
        if !self.is_busy() {
            return false;
        }
        self.cancel_requested.store(true, Ordering::SeqCst);
        tracing::info!("Sequencer: cancellation requested");
        true
    }

    /// Waits for the most recent session to finish
    pub async fn join(&self) -> Option<SessionStatus> {
        let handle = self.task.lock().take()?;
        match handle.await {
            Ok(status) => Some(status),
            Err(e) => {
                tracing::error!("Sequencer: session task failed: {}", e);
                None
            }
        }
    }
}

/// State moved into the session task
struct SessionRun {
    session: CaptureSession,
    tick_interval: Duration,
    collaborators: Collaborators,
    latest_frame: LatestFrame,
    cancel_requested: Arc<AtomicBool>,
}

impl SessionRun {
    async fn run(mut self) -> SessionStatus {
        let display = self.collaborators.display.clone();
        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // The first tick completes immediately, so the first count shows at once
        let status = loop {
            interval.tick().await;

            if self.cancel_requested.load(Ordering::SeqCst) {
                display.hide_countdown();
                break SessionStatus::Cancelled;
            }

            if self.session.remaining_ticks == 0 {
                display.hide_countdown();
                break self.capture();
            }

            display.show_countdown(self.session.remaining_ticks);
            self.session.remaining_ticks -= 1;
        };

        self.session.status = status;
        tracing::info!(
            "Sequencer: session {} finished: {:?}",
            self.session.id,
            self.session.status
        );
        status
    }

    fn capture(&self) -> SessionStatus {
        let Collaborators {
            capture,
            downloader,
            gallery,
            display,
        } = &self.collaborators;

        let image: EncodedImage = match self.latest_frame.get() {
            Some(frame) => match capture.grab_still_image(&frame) {
                Ok(image) => image,
                Err(e) => {
                    tracing::warn!("Sequencer: frame grab failed: {}", e);
                    display.show_error(&format!("Selfie failed: {}", e));
                    return SessionStatus::Failed;
                }
            },
            None => {
                tracing::warn!("Sequencer: no frame available to capture");
                display.show_error("Selfie failed: video is not ready");
                return SessionStatus::Failed;
            }
        };

        match downloader.download(&image) {
            Ok(path) => tracing::info!("Sequencer: selfie saved to {}", path.display()),
            Err(e) => {
                tracing::warn!("Sequencer: download failed: {}", e);
                display.show_error(&format!("Could not save selfie: {}", e));
            }
        }

        if let Err(e) = gallery.append_to_gallery(&image) {
            tracing::warn!("Sequencer: gallery append failed: {}", e);
            display.show_error(&format!("Could not add selfie to gallery: {}", e));
        }

        display.show_captured(&image);
        SessionStatus::Captured
    }
}

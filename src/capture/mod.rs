//! Countdown and still capture
//!
//! When the arbiter accepts a gesture, the [`CaptureSequencer`] runs a
//! countdown on its own task and then grabs, saves and shelves one frame.
//!
//! The sequencer only talks to its collaborators through the traits below:
//!
//! - [`StillCapture`] - turns the latest video frame into an encoded image
//! - [`Downloader`] - user-facing save (a file in the downloads folder)
//! - [`GalleryAppender`] - display list plus durable store
//! - [`CountdownDisplay`] - countdown text and capture feedback

pub mod display;
pub mod sequencer;
pub mod still;

pub use display::{countdown_text, ChannelDisplay, DisplayEvent, LogDisplay};
pub use sequencer::{
    CaptureSequencer, CaptureSession, Collaborators, SequencerConfig, SequencerError,
    SessionStatus,
};
pub use still::MirroredPngCapture;

use crate::database::DatabaseError;
use crate::detector::VideoFrame;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

/// An encoded still image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// MIME type of `data` (e.g. "image/png")
    pub mime_type: String,
    /// Encoded bytes
    pub data: Vec<u8>,
    /// When the frame was grabbed
    pub captured_at: DateTime<Utc>,
}

impl EncodedImage {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
            captured_at: Utc::now(),
        }
    }

    /// File extension matching the MIME type
    pub fn extension(&self) -> Option<&'static str> {
        match self.mime_type.as_str() {
            "image/png" => Some("png"),
            "image/jpeg" => Some("jpg"),
            "image/webp" => Some("webp"),
            _ => None,
        }
    }
}

/// Frame grab failures
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Video is not ready (no frame available)")]
    VideoNotReady,

    #[error("Failed to encode still image: {0}")]
    Encode(#[from] image::ImageError),
}

/// Persistence failures (download or gallery)
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Unsupported image type: {0}")]
    UnsupportedFormat(String),
}

impl From<rusqlite::Error> for PersistError {
    fn from(e: rusqlite::Error) -> Self {
        PersistError::Database(DatabaseError::Sqlite(e))
    }
}

/// Grabs a still image from a video frame
pub trait StillCapture: Send + Sync {
    fn grab_still_image(&self, frame: &VideoFrame) -> Result<EncodedImage, CaptureError>;
}

/// Saves an image where the user will find it
pub trait Downloader: Send + Sync {
    /// Returns the location the image was saved to
    fn download(&self, image: &EncodedImage) -> Result<PathBuf, PersistError>;
}

/// Appends an image to the gallery
///
/// Appending never deduplicates: the same image twice is two entries.
pub trait GalleryAppender: Send + Sync {
    fn append_to_gallery(&self, image: &EncodedImage) -> Result<(), PersistError>;
}

/// Shows countdown progress and capture results to the user
pub trait CountdownDisplay: Send + Sync {
    fn show_countdown(&self, remaining: u32);
    fn hide_countdown(&self);
    fn show_captured(&self, image: &EncodedImage);
    fn show_error(&self, message: &str);
}

/// Most recent frame seen by the frame loop
///
/// The loop publishes every frame here; the sequencer reads it at the end of
/// the countdown, so the selfie shows the moment of capture rather than the
/// moment of the gesture.
#[derive(Debug, Clone, Default)]
pub struct LatestFrame {
    inner: Arc<Mutex<Option<VideoFrame>>>,
}

impl LatestFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, frame: VideoFrame) {
        *self.inner.lock() = Some(frame);
    }

    pub fn get(&self) -> Option<VideoFrame> {
        self.inner.lock().clone()
    }
}

//! Recorded detection replay
//!
//! Lets the headless binary run the full loop without a camera or model.
//! A recording is JSON Lines, one frame per line:
//!
//! ```json
//! {"timestamp_ms": 0, "poses": [{"keypoints": [{"name": "nose", "x": 320, "y": 200, "score": 0.9}]}], "hands": []}
//! ```
//!
//! Frames are paced in real time from the first frame. Each one carries the
//! same placeholder image so the capture path has pixels to encode.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::config::CameraConfig;
use crate::detector::{DetectorError, FrameSource, HandDetector, PoseDetector, VideoFrame};
use crate::keypoint::{HandDetection, PoseDetection, Timestamp};

/// One line of a recording
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    /// Offset from the start of the recording
    pub timestamp_ms: u64,
    #[serde(default)]
    pub poses: Vec<PoseDetection>,
    #[serde(default)]
    pub hands: Vec<HandDetection>,
}

/// Parses a recording, skipping blank lines
///
/// Timestamps must not go backwards.
pub fn parse_recording(contents: &str) -> anyhow::Result<Vec<RecordedFrame>> {
    let mut frames: Vec<RecordedFrame> = Vec::new();

    for (number, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let frame: RecordedFrame = serde_json::from_str(line)
            .with_context(|| format!("Invalid recorded frame on line {}", number + 1))?;

        if let Some(previous) = frames.last() {
            if frame.timestamp_ms < previous.timestamp_ms {
                bail!(
                    "Timestamp goes backwards on line {} ({} ms after {} ms)",
                    number + 1,
                    frame.timestamp_ms,
                    previous.timestamp_ms
                );
            }
        }
        frames.push(frame);
    }

    Ok(frames)
}

/// A loaded recording
#[derive(Debug, Clone)]
pub struct Recording {
    frames: Arc<Vec<RecordedFrame>>,
}

impl Recording {
    pub fn new(frames: Vec<RecordedFrame>) -> Self {
        Self {
            frames: Arc::new(frames),
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read recording {:?}", path))?;
        let frames = parse_recording(&contents)?;
        tracing::info!("Loaded {} recorded frame(s) from {:?}", frames.len(), path);
        Ok(Self::new(frames))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame source pacing this recording in real time
    pub fn frames(&self, camera: &CameraConfig) -> ReplayFrames {
        ReplayFrames::new(self.frames.clone(), placeholder_image(camera))
    }

    pub fn pose_detector(&self) -> ReplayPoseDetector {
        ReplayPoseDetector {
            frames: self.frames.clone(),
        }
    }

    pub fn hand_detector(&self) -> ReplayHandDetector {
        ReplayHandDetector {
            frames: self.frames.clone(),
        }
    }
}

/// Mid-grey image at the configured camera size
pub fn placeholder_image(camera: &CameraConfig) -> Arc<RgbaImage> {
    Arc::new(RgbaImage::from_pixel(
        camera.width,
        camera.height,
        Rgba([128, 128, 128, 255]),
    ))
}

pub struct ReplayFrames {
    frames: Arc<Vec<RecordedFrame>>,
    image: Arc<RgbaImage>,
    next: usize,
    started: Option<Instant>,
}

impl ReplayFrames {
    fn new(frames: Arc<Vec<RecordedFrame>>, image: Arc<RgbaImage>) -> Self {
        Self {
            frames,
            image,
            next: 0,
            started: None,
        }
    }
}

impl FrameSource for ReplayFrames {
    async fn next_frame(&mut self) -> Option<VideoFrame> {
        let recorded = self.frames.get(self.next)?;
        let offset = Duration::from_millis(recorded.timestamp_ms);

        let started = *self.started.get_or_insert_with(Instant::now);
        tokio::time::sleep_until(started + offset).await;

        let frame = VideoFrame::new(self.next as u64, Timestamp::from_duration(offset))
            .with_image(self.image.clone());
        self.next += 1;
        Some(frame)
    }
}

/// Serves recorded poses by frame index
pub struct ReplayPoseDetector {
    frames: Arc<Vec<RecordedFrame>>,
}

impl PoseDetector for ReplayPoseDetector {
    async fn estimate_poses(
        &mut self,
        frame: &VideoFrame,
    ) -> Result<Vec<PoseDetection>, DetectorError> {
        self.frames
            .get(frame.index as usize)
            .map(|recorded| recorded.poses.clone())
            .ok_or(DetectorError::FrameUnavailable(frame.index))
    }
}

/// Serves recorded hands by frame index
pub struct ReplayHandDetector {
    frames: Arc<Vec<RecordedFrame>>,
}

impl HandDetector for ReplayHandDetector {
    async fn estimate_hands(
        &mut self,
        frame: &VideoFrame,
    ) -> Result<Vec<HandDetection>, DetectorError> {
        self.frames
            .get(frame.index as usize)
            .map(|recorded| recorded.hands.clone())
            .ok_or(DetectorError::FrameUnavailable(frame.index))
    }
}

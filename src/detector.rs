//! Keypoint sources
//!
//! The pose and hand estimators are external models. This module defines the
//! contracts the frame loop drives them through, plus the frame type they
//! are fed.

use crate::keypoint::{HandDetection, PoseDetection, Timestamp};
use image::RgbaImage;
use std::future::Future;
use std::sync::Arc;

/// One frame of the video stream
///
/// Pixels are shared, not copied, between the loop, the detectors and the
/// capture collaborator.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Sequence number, starting at 0
    pub index: u64,
    /// Offset from the start of the stream
    pub timestamp: Timestamp,
    /// Pixel data, if the video source has produced any yet
    pub image: Option<Arc<RgbaImage>>,
}

impl VideoFrame {
    pub fn new(index: u64, timestamp: Timestamp) -> Self {
        Self {
            index,
            timestamp,
            image: None,
        }
    }

    pub fn with_image(mut self, image: Arc<RgbaImage>) -> Self {
        self.image = Some(image);
        self
    }
}

/// Detector call failures
#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    #[error("Detector not initialised")]
    NotInitialised,

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Frame {0} is not available to this detector")]
    FrameUnavailable(u64),
}

/// Body pose estimator
pub trait PoseDetector: Send {
    /// Estimates poses in `frame`; an empty result means nobody was found
    fn estimate_poses(
        &mut self,
        frame: &VideoFrame,
    ) -> impl Future<Output = Result<Vec<PoseDetection>, DetectorError>> + Send;
}

/// Hand landmark estimator
pub trait HandDetector: Send {
    /// Estimates hands in `frame`; an empty result means no hands were found
    fn estimate_hands(
        &mut self,
        frame: &VideoFrame,
    ) -> impl Future<Output = Result<Vec<HandDetection>, DetectorError>> + Send;
}

/// Source of video frames, one per display refresh
pub trait FrameSource: Send {
    /// Waits for the next frame; `None` once the stream has ended
    fn next_frame(&mut self) -> impl Future<Output = Option<VideoFrame>> + Send;
}

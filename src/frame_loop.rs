//! Frame loop
//!
//! Drives one frame at a time: publish it for capture, run pose then hand
//! detection, classify, offer the resulting events to the arbiter and start a
//! countdown when the arbiter fires. A frame's detector calls resolve before
//! the next frame is pulled.
//!
//! Detector failures are logged and counted but never end the loop. The loop
//! ends when the frame source runs dry or the stop flag is raised.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::capture::{CaptureSequencer, LatestFrame};
use crate::detector::{FrameSource, HandDetector, PoseDetector, VideoFrame};
use crate::gesture::{GestureClassifier, GestureEvent, GestureKind};
use crate::keypoint::Timestamp;
use crate::trigger::SharedArbiter;

/// Counters for a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameLoopStats {
    /// Frames processed
    pub frames: u64,
    /// Detector calls that returned an error
    pub detector_failures: u64,
    /// Gesture events offered to the arbiter
    pub events: u64,
    /// Countdown sessions started
    pub captures_started: u64,
    /// Stream time of the last frame processed
    pub last_frame_at: Timestamp,
}

pub struct FrameLoop {
    classifier: GestureClassifier,
    arbiter: SharedArbiter,
    sequencer: Arc<CaptureSequencer>,
    latest_frame: LatestFrame,
    stop: Option<Arc<AtomicBool>>,
}

impl FrameLoop {
    pub fn new(
        classifier: GestureClassifier,
        arbiter: SharedArbiter,
        sequencer: Arc<CaptureSequencer>,
        latest_frame: LatestFrame,
    ) -> Self {
        Self {
            classifier,
            arbiter,
            sequencer,
            latest_frame,
            stop: None,
        }
    }

    /// Ends the loop before the next frame once `stop` is set
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    fn stop_requested(&self) -> bool {
        self.stop
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Runs until the frame source ends
    pub async fn run<S, P, H>(&self, source: &mut S, poses: &mut P, hands: &mut H) -> FrameLoopStats
    where
        S: FrameSource,
        P: PoseDetector,
        H: HandDetector,
    {
        let mut stats = FrameLoopStats::default();
        tracing::info!("Frame loop started");

        loop {
            if self.stop_requested() {
                tracing::info!("Frame loop stop requested");
                break;
            }

            let Some(frame) = source.next_frame().await else {
                tracing::info!("Frame source ended");
                break;
            };

            self.process_frame(&frame, poses, hands, &mut stats).await;
            stats.frames += 1;
            stats.last_frame_at = frame.timestamp;
        }

        tracing::info!(
            "Frame loop finished: {} frames, {} events, {} captures, {} detector failures",
            stats.frames,
            stats.events,
            stats.captures_started,
            stats.detector_failures
        );
        stats
    }

    async fn process_frame<P, H>(
        &self,
        frame: &VideoFrame,
        poses: &mut P,
        hands: &mut H,
        stats: &mut FrameLoopStats,
    ) where
        P: PoseDetector,
        H: HandDetector,
    {
        self.latest_frame.publish(frame.clone());
        self.arbiter.poll(frame.timestamp);

        // Pose goes first, so it wins a same-frame tie with the hand
        let pose_event = match poses.estimate_poses(frame).await {
            Ok(found) => found
                .first()
                .and_then(|pose| self.classifier.classify_pose(pose, frame.timestamp)),
            Err(e) => {
                tracing::debug!("Pose detection failed on frame {}: {}", frame.index, e);
                stats.detector_failures += 1;
                None
            }
        };

        let hand_event = match hands.estimate_hands(frame).await {
            Ok(found) => found
                .first()
                .and_then(|hand| self.classifier.classify_hand(hand, frame.timestamp)),
            Err(e) => {
                tracing::debug!("Hand detection failed on frame {}: {}", frame.index, e);
                stats.detector_failures += 1;
                None
            }
        };

        for event in [pose_event, hand_event].into_iter().flatten() {
            stats.events += 1;
            self.offer(event, stats);
        }
    }

    fn offer(&self, event: GestureEvent, stats: &mut FrameLoopStats) {
        let Some(transition) = self.arbiter.offer(event) else {
            return;
        };
        if !transition.starts_capture() {
            return;
        }

        match event.kind {
            GestureKind::RaisedHand => tracing::info!("Hand raised. Starting countdown..."),
            GestureKind::PeaceSign => tracing::info!("Peace sign detected"),
        }

        match self.sequencer.begin(event.detected_at) {
            Ok(id) => {
                stats.captures_started += 1;
                tracing::debug!("Countdown session {} begun", id);
            }
            Err(e) => tracing::warn!("Could not start countdown: {}", e),
        }
    }
}

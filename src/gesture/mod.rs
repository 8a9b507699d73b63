//! Gesture recognition
//!
//! Maps keypoint sets to trigger signals. Two gestures start a selfie:
//!
//! - **Raised hand** (pose detector): the right wrist is above the nose.
//! - **Peace sign** (hand detector): index and middle fingertips above the
//!   wrist, ring and pinky below it.
//!
//! Classification is stateless. Debouncing and arbitration between the two
//! gestures happen in [`crate::trigger`].

pub mod classifier;

pub use classifier::{is_peace_sign, is_raised_hand, GestureClassifier};

use crate::keypoint::Timestamp;
use serde::{Deserialize, Serialize};

/// The recognised trigger gestures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    RaisedHand,
    PeaceSign,
}

impl GestureKind {
    /// Returns a human-readable description of the gesture
    pub fn description(&self) -> &'static str {
        match self {
            GestureKind::RaisedHand => "Hand raised",
            GestureKind::PeaceSign => "Peace sign",
        }
    }
}

/// A gesture recognised in one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureEvent {
    pub kind: GestureKind,
    pub detected_at: Timestamp,
}

impl GestureEvent {
    pub fn new(kind: GestureKind, detected_at: Timestamp) -> Self {
        Self { kind, detected_at }
    }
}

/// How the peace sign treats ring/pinky tips the detector did not report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingPointPolicy {
    /// Absent fingertips count as lowered
    #[default]
    TreatAsNotRaised,
    /// Absent fingertips make the hand unclassifiable (no trigger)
    TreatAsAbsent,
}

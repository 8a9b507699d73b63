//! Keypoint data model
//!
//! Detectors report named landmarks with a position and a confidence score.
//! A `KeypointSet` holds the landmarks of one subject for one frame and
//! guarantees that names are unique, so lookups by name are unambiguous.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default score for points that arrive without one (3D hand points)
fn default_score() -> f32 {
    1.0
}

/// A named anatomical landmark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// Landmark name (e.g. "nose", "right_wrist", "index_finger_tip")
    pub name: String,
    /// Horizontal position (image coordinates, grows to the right)
    pub x: f32,
    /// Vertical position (image coordinates, grows downwards)
    pub y: f32,
    /// Depth, only reported by 3D detectors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
    /// Detector confidence in [0, 1]
    #[serde(default = "default_score")]
    pub score: f32,
}

impl Keypoint {
    /// Creates a 2D keypoint
    pub fn new(name: impl Into<String>, x: f32, y: f32, score: f32) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            z: None,
            score,
        }
    }

    /// Creates a 3D keypoint
    pub fn with_depth(name: impl Into<String>, x: f32, y: f32, z: f32, score: f32) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            z: Some(z),
            score,
        }
    }

    /// Returns true if the point is more confident than `threshold`
    pub fn is_confident(&self, threshold: f32) -> bool {
        self.score > threshold
    }
}

/// Errors raised while assembling keypoint sets
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum KeypointError {
    #[error("Duplicate keypoint name in set: {0}")]
    DuplicateName(String),
}

/// Keypoints of one subject from one detector for one frame
///
/// Order is preserved as reported by the detector.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct KeypointSet {
    points: Vec<Keypoint>,
}

impl KeypointSet {
    /// Builds a set, rejecting duplicate names
    pub fn new(points: Vec<Keypoint>) -> Result<Self, KeypointError> {
        for (i, point) in points.iter().enumerate() {
            if points[..i].iter().any(|p| p.name == point.name) {
                return Err(KeypointError::DuplicateName(point.name.clone()));
            }
        }
        Ok(Self { points })
    }

    /// Finds a keypoint by name
    pub fn get(&self, name: &str) -> Option<&Keypoint> {
        self.points.iter().find(|p| p.name == name)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Keypoint> {
        self.points.iter()
    }
}

impl<'de> Deserialize<'de> for KeypointSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let points = Vec::<Keypoint>::deserialize(deserializer)?;
        KeypointSet::new(points).map_err(serde::de::Error::custom)
    }
}

/// One body detected by the pose estimator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseDetection {
    pub keypoints: KeypointSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

/// One hand detected by the hand estimator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandDetection {
    /// 2D landmarks in image coordinates
    pub keypoints: KeypointSet,
    /// 3D landmarks, when the model provides them
    #[serde(default, rename = "keypoints3d", skip_serializing_if = "Option::is_none")]
    pub keypoints_3d: Option<KeypointSet>,
    /// "Left" or "Right" as reported by the model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handedness: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl HandDetection {
    /// The landmarks gesture classification should use: 3D if present
    pub fn preferred_keypoints(&self) -> &KeypointSet {
        self.keypoints_3d.as_ref().unwrap_or(&self.keypoints)
    }
}

/// Monotonic offset from the start of the video stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(Duration);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(Duration::ZERO);

    pub fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    pub fn from_duration(duration: Duration) -> Self {
        Self(duration)
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }

    pub fn as_millis(&self) -> u128 {
        self.0.as_millis()
    }

    /// Time elapsed from `earlier` to `self`, zero if `earlier` is later
    pub fn saturating_since(&self, earlier: Timestamp) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Timestamp {
        Timestamp(self.0 + rhs)
    }
}

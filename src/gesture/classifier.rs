//! Gesture predicates
//!
//! Both predicates fail closed: missing landmarks or low confidence mean
//! "no gesture", never an error. Image coordinates grow downwards, so a
//! smaller `y` is higher up.

use super::{GestureEvent, GestureKind, MissingPointPolicy};
use crate::config::DetectionConfig;
use crate::keypoint::{HandDetection, Keypoint, KeypointSet, PoseDetection, Timestamp};

pub const NOSE: &str = "nose";
pub const RIGHT_WRIST: &str = "right_wrist";

pub const WRIST: &str = "wrist";
pub const INDEX_TIP: &str = "index_finger_tip";
pub const MIDDLE_TIP: &str = "middle_finger_tip";
pub const RING_TIP: &str = "ring_finger_tip";
pub const PINKY_TIP: &str = "pinky_finger_tip";

/// Raised hand: `nose` and `right_wrist` both above `min_confidence`, wrist
/// strictly higher than the nose.
pub fn is_raised_hand(keypoints: &KeypointSet, min_confidence: f32) -> bool {
    let (Some(nose), Some(wrist)) = (keypoints.get(NOSE), keypoints.get(RIGHT_WRIST)) else {
        return false;
    };

    nose.is_confident(min_confidence) && wrist.is_confident(min_confidence) && wrist.y < nose.y
}

/// Peace sign: exactly index and middle raised above the wrist, ring and
/// pinky below it.
///
/// A tip level with the wrist is neither raised nor lowered, so it never
/// completes the gesture.
pub fn is_peace_sign(keypoints: &KeypointSet, policy: MissingPointPolicy) -> bool {
    let (Some(wrist), Some(index), Some(middle)) = (
        keypoints.get(WRIST),
        keypoints.get(INDEX_TIP),
        keypoints.get(MIDDLE_TIP),
    ) else {
        return false;
    };

    let ring = keypoints.get(RING_TIP);
    let pinky = keypoints.get(PINKY_TIP);

    if policy == MissingPointPolicy::TreatAsAbsent && (ring.is_none() || pinky.is_none()) {
        return false;
    }

    let raised = [Some(index), Some(middle), ring, pinky]
        .iter()
        .flatten()
        .filter(|tip| tip.y < wrist.y)
        .count();

    // Absent tips are only reachable here under TreatAsNotRaised
    let lowered = |tip: Option<&Keypoint>| tip.map_or(true, |t| t.y > wrist.y);

    raised == 2 && index.y < wrist.y && middle.y < wrist.y && lowered(ring) && lowered(pinky)
}

/// Applies the configured predicates to detector output
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    min_confidence: f32,
    missing_point_policy: MissingPointPolicy,
}

impl GestureClassifier {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            min_confidence: config.min_confidence,
            missing_point_policy: config.missing_point_policy,
        }
    }

    /// Classifies a pose, yielding a raised-hand event if present
    pub fn classify_pose(&self, pose: &PoseDetection, at: Timestamp) -> Option<GestureEvent> {
        is_raised_hand(&pose.keypoints, self.min_confidence)
            .then(|| GestureEvent::new(GestureKind::RaisedHand, at))
    }

    /// Classifies a hand, yielding a peace-sign event if present
    pub fn classify_hand(&self, hand: &HandDetection, at: Timestamp) -> Option<GestureEvent> {
        is_peace_sign(hand.preferred_keypoints(), self.missing_point_policy)
            .then(|| GestureEvent::new(GestureKind::PeaceSign, at))
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(&DetectionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose(nose: (f32, f32), wrist: (f32, f32)) -> KeypointSet {
        KeypointSet::new(vec![
            Keypoint::new(NOSE, 320.0, nose.0, nose.1),
            Keypoint::new("left_wrist", 200.0, 400.0, 0.9),
            Keypoint::new(RIGHT_WRIST, 420.0, wrist.0, wrist.1),
        ])
        .unwrap()
    }

    fn hand(index: f32, middle: f32, ring: Option<f32>, pinky: Option<f32>) -> KeypointSet {
        let mut points = vec![
            Keypoint::new(WRIST, 300.0, 200.0, 0.9),
            Keypoint::new("thumb_tip", 260.0, 170.0, 0.9),
            Keypoint::new(INDEX_TIP, 290.0, index, 0.9),
            Keypoint::new(MIDDLE_TIP, 310.0, middle, 0.9),
        ];
        if let Some(y) = ring {
            points.push(Keypoint::new(RING_TIP, 320.0, y, 0.9));
        }
        if let Some(y) = pinky {
            points.push(Keypoint::new(PINKY_TIP, 330.0, y, 0.9));
        }
        KeypointSet::new(points).unwrap()
    }

    #[test]
    fn test_raised_hand_wrist_above_nose() {
        assert!(is_raised_hand(&pose((200.0, 0.9), (120.0, 0.9)), 0.5));
    }

    #[test]
    fn test_raised_hand_wrist_below_nose() {
        assert!(!is_raised_hand(&pose((200.0, 0.9), (350.0, 0.9)), 0.5));
    }

    #[test]
    fn test_raised_hand_equal_height_does_not_trigger() {
        assert!(!is_raised_hand(&pose((200.0, 0.9), (200.0, 0.9)), 0.5));
    }

    #[test]
    fn test_raised_hand_requires_confidence_above_threshold() {
        // Exactly at the threshold is not enough
        assert!(!is_raised_hand(&pose((200.0, 0.5), (120.0, 0.9)), 0.5));
        assert!(!is_raised_hand(&pose((200.0, 0.9), (120.0, 0.5)), 0.5));
        assert!(is_raised_hand(&pose((200.0, 0.51), (120.0, 0.51)), 0.5));
    }

    #[test]
    fn test_raised_hand_missing_points() {
        let no_nose =
            KeypointSet::new(vec![Keypoint::new(RIGHT_WRIST, 420.0, 50.0, 0.99)]).unwrap();
        let no_wrist = KeypointSet::new(vec![Keypoint::new(NOSE, 320.0, 200.0, 0.99)]).unwrap();

        assert!(!is_raised_hand(&no_nose, 0.5));
        assert!(!is_raised_hand(&no_wrist, 0.5));
        assert!(!is_raised_hand(&KeypointSet::default(), 0.5));
    }

    #[test]
    fn test_raised_hand_ignores_left_wrist() {
        let set = KeypointSet::new(vec![
            Keypoint::new(NOSE, 320.0, 200.0, 0.9),
            Keypoint::new("left_wrist", 200.0, 50.0, 0.9),
            Keypoint::new(RIGHT_WRIST, 420.0, 400.0, 0.9),
        ])
        .unwrap();
        assert!(!is_raised_hand(&set, 0.5));
    }

    #[test]
    fn test_peace_sign_reference_pose() {
        let set = hand(100.0, 100.0, Some(250.0), Some(260.0));
        assert!(is_peace_sign(&set, MissingPointPolicy::TreatAsNotRaised));
    }

    #[test]
    fn test_peace_sign_ring_raised_fails() {
        let set = hand(100.0, 100.0, Some(150.0), Some(260.0));
        assert!(!is_peace_sign(&set, MissingPointPolicy::TreatAsNotRaised));
    }

    #[test]
    fn test_peace_sign_other_raised_sets_fail() {
        let policy = MissingPointPolicy::TreatAsNotRaised;
        // Only index
        assert!(!is_peace_sign(&hand(100.0, 250.0, Some(250.0), Some(260.0)), policy));
        // Four fingers (open hand)
        assert!(!is_peace_sign(&hand(100.0, 90.0, Some(110.0), Some(130.0)), policy));
        // Index and pinky ("rock on")
        assert!(!is_peace_sign(&hand(100.0, 250.0, Some(250.0), Some(120.0)), policy));
        // Middle and ring
        assert!(!is_peace_sign(&hand(250.0, 100.0, Some(110.0), Some(260.0)), policy));
        // Fist
        assert!(!is_peace_sign(&hand(250.0, 250.0, Some(250.0), Some(260.0)), policy));
    }

    #[test]
    fn test_peace_sign_tip_level_with_wrist_fails() {
        let set = hand(100.0, 100.0, Some(200.0), Some(260.0));
        assert!(!is_peace_sign(&set, MissingPointPolicy::TreatAsNotRaised));
    }

    #[test]
    fn test_peace_sign_requires_index_middle_wrist() {
        let set = KeypointSet::new(vec![
            Keypoint::new(WRIST, 300.0, 200.0, 0.9),
            Keypoint::new(INDEX_TIP, 290.0, 100.0, 0.9),
        ])
        .unwrap();
        assert!(!is_peace_sign(&set, MissingPointPolicy::TreatAsNotRaised));
        assert!(!is_peace_sign(&KeypointSet::default(), MissingPointPolicy::TreatAsNotRaised));
    }

    #[test]
    fn test_peace_sign_missing_point_policy() {
        let no_ring_pinky = hand(100.0, 100.0, None, None);
        assert!(is_peace_sign(&no_ring_pinky, MissingPointPolicy::TreatAsNotRaised));
        assert!(!is_peace_sign(&no_ring_pinky, MissingPointPolicy::TreatAsAbsent));

        let no_pinky = hand(100.0, 100.0, Some(250.0), None);
        assert!(is_peace_sign(&no_pinky, MissingPointPolicy::TreatAsNotRaised));
        assert!(!is_peace_sign(&no_pinky, MissingPointPolicy::TreatAsAbsent));

        let complete = hand(100.0, 100.0, Some(250.0), Some(260.0));
        assert!(is_peace_sign(&complete, MissingPointPolicy::TreatAsAbsent));
    }

    #[test]
    fn test_classifier_uses_3d_keypoints() {
        let classifier = GestureClassifier::default();
        let detection = HandDetection {
            // 2D landmarks show a fist
            keypoints: hand(250.0, 250.0, Some(250.0), Some(260.0)),
            keypoints_3d: Some(hand(100.0, 100.0, Some(250.0), Some(260.0))),
            ..Default::default()
        };

        let event = classifier.classify_hand(&detection, Timestamp::from_millis(40));
        assert_eq!(
            event,
            Some(GestureEvent::new(GestureKind::PeaceSign, Timestamp::from_millis(40)))
        );
    }

    #[test]
    fn test_classifier_pose_event() {
        let classifier = GestureClassifier::default();
        let detection = PoseDetection {
            keypoints: pose((200.0, 0.9), (120.0, 0.9)),
            score: Some(0.95),
        };

        let event = classifier.classify_pose(&detection, Timestamp::ZERO).unwrap();
        assert_eq!(event.kind, GestureKind::RaisedHand);

        let lowered = PoseDetection {
            keypoints: pose((200.0, 0.9), (350.0, 0.9)),
            score: None,
        };
        assert!(classifier.classify_pose(&lowered, Timestamp::ZERO).is_none());
    }
}

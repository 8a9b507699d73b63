//! Trigger arbitration state machine
//!
//! Defines the arm/cooldown states shared by every gesture kind and the
//! transitions that decide when a capture may start.

use crate::gesture::{GestureEvent, GestureKind};
use crate::keypoint::Timestamp;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default time between accepted triggers
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(5);

/// Arm state
///
/// One instance covers both gestures, so a raised hand and a peace sign can
/// never both start a capture inside the same cooldown window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArmState {
    /// Accepting triggers
    #[default]
    Armed,
    /// Ignoring triggers until the deadline
    Cooldown { until: Timestamp },
}

impl ArmState {
    /// Returns a human-readable description of the state
    pub fn description(&self) -> &'static str {
        match self {
            ArmState::Armed => "Waiting for a gesture",
            ArmState::Cooldown { .. } => "Cooling down",
        }
    }

    pub fn is_armed(&self) -> bool {
        matches!(self, ArmState::Armed)
    }
}

/// Serialisable label for [`ArmState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmStateKind {
    Armed,
    Cooldown,
}

impl From<ArmState> for ArmStateKind {
    fn from(state: ArmState) -> Self {
        match state {
            ArmState::Armed => ArmStateKind::Armed,
            ArmState::Cooldown { .. } => ArmStateKind::Cooldown,
        }
    }
}

/// Reason for a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionReason {
    /// A gesture was accepted; a capture should start
    GestureAccepted { kind: GestureKind },
    /// The cooldown deadline passed
    CooldownElapsed,
}

/// Result of a state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionResult {
    pub new_state: ArmState,
    pub reason: TransitionReason,
}

impl TransitionResult {
    /// Returns true if this transition starts a capture
    pub fn starts_capture(&self) -> bool {
        matches!(self.reason, TransitionReason::GestureAccepted { .. })
    }
}

/// Read-only snapshot of the arbiter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerStatus {
    pub state: ArmStateKind,
    pub description: String,
    /// Remaining cooldown in milliseconds (0 when armed)
    pub cooldown_remaining_ms: u64,
    /// Gestures that started a capture
    pub accepted: u64,
    /// Gestures dropped during cooldown
    pub discarded: u64,
}

/// Trigger arbiter
///
/// Events are evaluated in the order they are offered. The frame loop offers
/// the pose gesture before the hand gesture, so when both appear in one frame
/// the raised hand wins and the peace sign lands in the cooldown.
///
/// Nothing is buffered: an event offered during cooldown is gone.
#[derive(Debug)]
pub struct TriggerArbiter {
    state: ArmState,
    cooldown: Duration,
    accepted: u64,
    discarded: u64,
}

impl TriggerArbiter {
    /// Creates an armed arbiter
    pub fn new(cooldown: Duration) -> Self {
        Self {
            state: ArmState::Armed,
            cooldown,
            accepted: 0,
            discarded: 0,
        }
    }

    pub fn state(&self) -> ArmState {
        self.state
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Re-arms the arbiter once the cooldown deadline has passed
    pub fn poll(&mut self, now: Timestamp) -> Option<TransitionResult> {
        match self.state {
            ArmState::Cooldown { until } if now >= until => {
                let result = TransitionResult {
                    new_state: ArmState::Armed,
                    reason: TransitionReason::CooldownElapsed,
                };
                self.apply_transition(&result);
                Some(result)
            }
            _ => None,
        }
    }

    /// Offers a gesture to the arbiter
    ///
    /// Returns the transition that started a capture, or `None` if the event
    /// was discarded.
    pub fn process_event(&mut self, event: GestureEvent) -> Option<TransitionResult> {
        self.poll(event.detected_at);

        match self.state {
            ArmState::Armed => {
                let result = TransitionResult {
                    new_state: ArmState::Cooldown {
                        until: event.detected_at + self.cooldown,
                    },
                    reason: TransitionReason::GestureAccepted { kind: event.kind },
                };
                self.accepted += 1;
                self.apply_transition(&result);
                Some(result)
            }
            ArmState::Cooldown { until } => {
                self.discarded += 1;
                tracing::debug!(
                    "Discarding {:?} during cooldown ({} ms left)",
                    event.kind,
                    until.saturating_since(event.detected_at).as_millis()
                );
                None
            }
        }
    }

    fn apply_transition(&mut self, result: &TransitionResult) {
        let previous_state = self.state;
        self.state = result.new_state;

        tracing::info!(
            "Trigger state transition: {:?} -> {:?} (reason: {:?})",
            previous_state,
            result.new_state,
            result.reason
        );
    }

    /// Status snapshot relative to `now`
    pub fn status(&self, now: Timestamp) -> TriggerStatus {
        let cooldown_remaining_ms = match self.state {
            ArmState::Armed => 0,
            ArmState::Cooldown { until } => until.saturating_since(now).as_millis() as u64,
        };

        TriggerStatus {
            state: self.state.into(),
            description: self.state.description().to_string(),
            cooldown_remaining_ms,
            accepted: self.accepted,
            discarded: self.discarded,
        }
    }

    /// Reset to Armed, keeping counters
    pub fn reset(&mut self) {
        self.state = ArmState::Armed;
        tracing::info!("Trigger arbiter reset to Armed");
    }
}

impl Default for TriggerArbiter {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}

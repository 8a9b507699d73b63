//! Gesture trigger arbitration
//!
//! Debounces recognised gestures so each one starts at most one selfie. A
//! single arm/cooldown state is shared by every gesture kind.
//!
//! ## States
//!
//! 1. **ARMED** - Accepting gestures
//! 2. **COOLDOWN** - Ignoring gestures until a deadline (default 5 s)
//!
//! ## State Transitions
//!
//! ```text
//!            gesture (start capture)
//! ┌───────┐ ─────────────────────────► ┌──────────┐
//! │ ARMED │                            │ COOLDOWN │──┐ gesture
//! └───────┘ ◄───────────────────────── └──────────┘◄─┘ (discarded)
//!               now >= cooldown_until
//! ```
//!
//! The cooldown is longer than the countdown, so a gesture held through the
//! countdown or repeated during the capture never queues a second selfie.
//!
//! ## Ordering
//!
//! Events are offered in frame order, pose before hand within a frame. When
//! both gestures show up in the same frame the raised hand starts the
//! capture and the peace sign is discarded by the cooldown it just entered.

pub mod manager;
pub mod state;

pub use manager::SharedArbiter;
pub use state::{
    ArmState, ArmStateKind, TransitionReason, TransitionResult, TriggerArbiter, TriggerStatus,
    DEFAULT_COOLDOWN,
};

//! Shared access to the trigger arbiter
//!
//! The frame loop and the countdown task run on a multi-threaded runtime, so
//! the arbiter sits behind one mutex. Every transition happens inside a
//! single lock hold.

use super::state::{ArmState, TransitionResult, TriggerArbiter, TriggerStatus};
use crate::gesture::GestureEvent;
use crate::keypoint::Timestamp;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Cloneable handle to one arbiter
#[derive(Debug, Clone, Default)]
pub struct SharedArbiter {
    inner: Arc<Mutex<TriggerArbiter>>,
}

impl SharedArbiter {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TriggerArbiter::new(cooldown))),
        }
    }

    /// Offers a gesture; `Some` means a capture should start now
    pub fn offer(&self, event: GestureEvent) -> Option<TransitionResult> {
        self.inner.lock().process_event(event)
    }

    /// Re-arms if the cooldown has elapsed
    pub fn poll(&self, now: Timestamp) -> Option<TransitionResult> {
        self.inner.lock().poll(now)
    }

    pub fn state(&self) -> ArmState {
        self.inner.lock().state()
    }

    pub fn status(&self, now: Timestamp) -> TriggerStatus {
        self.inner.lock().status(now)
    }

    pub fn reset(&self) {
        self.inner.lock().reset();
    }
}

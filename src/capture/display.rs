//! Countdown display implementations

use super::{CountdownDisplay, EncodedImage};
use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};

/// Text shown while counting down
pub fn countdown_text(remaining: u32) -> String {
    format!("Taking selfie in {}...", remaining)
}

/// Display updates forwarded to a UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DisplayEvent {
    Countdown { remaining: u32, text: String },
    CountdownHidden,
    Captured {
        mime_type: String,
        size_bytes: usize,
        captured_at: DateTime<Utc>,
    },
    Error { message: String },
}

/// Forwards display updates through a bounded channel
///
/// Sending never blocks the countdown task. When the receiver falls behind,
/// updates are dropped and logged.
#[derive(Debug, Clone)]
pub struct ChannelDisplay {
    sender: Sender<DisplayEvent>,
}

impl ChannelDisplay {
    pub fn new(capacity: usize) -> (Self, Receiver<DisplayEvent>) {
        let (sender, receiver) = bounded(capacity);
        (Self { sender }, receiver)
    }

    fn send(&self, event: DisplayEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                tracing::warn!("Display channel full, dropping {:?}", event);
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::debug!("Display receiver gone");
            }
        }
    }
}

impl CountdownDisplay for ChannelDisplay {
    fn show_countdown(&self, remaining: u32) {
        self.send(DisplayEvent::Countdown {
            remaining,
            text: countdown_text(remaining),
        });
    }

    fn hide_countdown(&self) {
        self.send(DisplayEvent::CountdownHidden);
    }

    fn show_captured(&self, image: &EncodedImage) {
        self.send(DisplayEvent::Captured {
            mime_type: image.mime_type.clone(),
            size_bytes: image.data.len(),
            captured_at: image.captured_at,
        });
    }

    fn show_error(&self, message: &str) {
        self.send(DisplayEvent::Error {
            message: message.to_string(),
        });
    }
}

/// Writes display updates to the log (headless runs)
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDisplay;

impl CountdownDisplay for LogDisplay {
    fn show_countdown(&self, remaining: u32) {
        tracing::info!("{}", countdown_text(remaining));
    }

    fn hide_countdown(&self) {}

    fn show_captured(&self, image: &EncodedImage) {
        tracing::info!(
            "Selfie taken! ({}, {} bytes)",
            image.mime_type,
            image.data.len()
        );
    }

    fn show_error(&self, message: &str) {
        tracing::warn!("{}", message);
    }
}

// SPDX-License-Identifier: MPL-2.0
//! Tap recognition with double-tap precedence.
//!
//! A single tap is only reported once the double-tap window has passed
//! without a second tap, so a double tap never also triggers the single-tap
//! action.

use crate::config::DOUBLE_TAP_THRESHOLD;
use iced::Point;
use std::time::Instant;

/// Recognized tap gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tap {
    Single(Point),
    Double(Point),
}

#[derive(Debug, Clone, Default)]
pub struct TapState {
    pending: Option<(Point, Instant)>,
}

impl TapState {
    /// Registers a completed tap. Returns a double tap immediately when it
    /// follows a pending tap inside the window.
    pub fn tap(&mut self, position: Point, now: Instant) -> Option<Tap> {
        match self.pending.take() {
            Some((_, at)) if now.saturating_duration_since(at) < DOUBLE_TAP_THRESHOLD => {
                Some(Tap::Double(position))
            }
            _ => {
                self.pending = Some((position, now));
                None
            }
        }
    }

    /// Releases a pending tap as a single tap once the window has passed.
    pub fn tick(&mut self, now: Instant) -> Option<Tap> {
        let (position, at) = self.pending?;
        if now.saturating_duration_since(at) >= DOUBLE_TAP_THRESHOLD {
            self.pending = None;
            Some(Tap::Single(position))
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}

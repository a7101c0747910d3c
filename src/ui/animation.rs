// SPDX-License-Identifier: MPL-2.0
//! Time-based interpolation for the preview's transitions.
//!
//! Nothing here owns a clock: callers pass the instant of the latest tick,
//! which keeps every animation deterministic under test.

use crate::config::TRANSITION_DURATION;
use iced::{Rectangle, Vector};
use std::time::{Duration, Instant};

/// Eased progress over a fixed time window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    started_at: Instant,
    duration: Duration,
}

impl Tween {
    #[must_use]
    pub fn new(started_at: Instant, duration: Duration) -> Self {
        Self {
            started_at,
            duration,
        }
    }

    /// Raw elapsed fraction in [0, 1].
    #[must_use]
    fn linear_progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Ease-in-out progress in [0, 1].
    #[must_use]
    pub fn progress(&self, now: Instant) -> f32 {
        ease_in_out(self.linear_progress(now))
    }

    #[must_use]
    pub fn is_finished(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started_at) >= self.duration
    }
}

/// Smoothstep easing, matching the default platform curve closely enough.
#[must_use]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Linear interpolation, exact at both ends.
#[must_use]
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from * (1.0 - t) + to * t
}

#[must_use]
pub fn lerp_vector(from: Vector, to: Vector, t: f32) -> Vector {
    Vector::new(lerp(from.x, to.x, t), lerp(from.y, to.y, t))
}

#[must_use]
pub fn lerp_rect(from: Rectangle, to: Rectangle, t: f32) -> Rectangle {
    Rectangle {
        x: lerp(from.x, to.x, t),
        y: lerp(from.y, to.y, t),
        width: lerp(from.width, to.width, t),
        height: lerp(from.height, to.height, t),
    }
}

/// Snapshot of a transition view between its origin and its target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionFrame {
    pub origin_rect: Rectangle,
    pub current_rect: Rectangle,
    pub target_rect: Rectangle,
    /// Normalized progress in [0, 1].
    pub progress: f32,
}

/// Animates a transition view's rect and the background opacity together.
///
/// The completion is reported exactly once, by whichever of [`advance`]
/// or [`interrupt`] observes it first.
///
/// [`advance`]: Transition::advance
/// [`interrupt`]: Transition::interrupt
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    origin: Rectangle,
    target: Rectangle,
    opacity_from: f32,
    opacity_to: f32,
    tween: Tween,
    completed: bool,
}

impl Transition {
    /// Starts a transition of the standard duration.
    #[must_use]
    pub fn new(origin: Rectangle, target: Rectangle, started_at: Instant) -> Self {
        Self {
            origin,
            target,
            opacity_from: 1.0,
            opacity_to: 1.0,
            tween: Tween::new(started_at, TRANSITION_DURATION),
            completed: false,
        }
    }

    /// Sets the opacity the animated backdrop moves between.
    #[must_use]
    pub fn with_opacity(mut self, from: f32, to: f32) -> Self {
        self.opacity_from = from;
        self.opacity_to = to;
        self
    }

    fn eased(&self, now: Instant) -> f32 {
        if self.completed {
            1.0
        } else {
            self.tween.progress(now)
        }
    }

    #[must_use]
    pub fn frame(&self, now: Instant) -> TransitionFrame {
        let progress = self.eased(now);
        TransitionFrame {
            origin_rect: self.origin,
            current_rect: lerp_rect(self.origin, self.target, progress),
            target_rect: self.target,
            progress,
        }
    }

    #[must_use]
    pub fn opacity(&self, now: Instant) -> f32 {
        lerp(self.opacity_from, self.opacity_to, self.eased(now))
    }

    /// Returns `true` on the first call made at or after the end time.
    pub fn advance(&mut self, now: Instant) -> bool {
        if self.completed || !self.tween.is_finished(now) {
            return false;
        }
        self.completed = true;
        true
    }

    /// Jumps to the end. Returns `true` if this call completed the transition.
    pub fn interrupt(&mut self) -> bool {
        if self.completed {
            return false;
        }
        self.completed = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_abs_diff_eq;
    use iced::{Point, Size};

    fn rects() -> (Rectangle, Rectangle) {
        (
            Rectangle::new(Point::new(0.0, 0.0), Size::new(100.0, 100.0)),
            Rectangle::new(Point::new(100.0, 200.0), Size::new(10.0, 10.0)),
        )
    }

    #[test]
    fn easing_is_anchored_at_both_ends() {
        assert_abs_diff_eq!(ease_in_out(0.0), 0.0);
        assert_abs_diff_eq!(ease_in_out(0.5), 0.5);
        assert_abs_diff_eq!(ease_in_out(1.0), 1.0);
        assert_abs_diff_eq!(ease_in_out(3.0), 1.0);
    }

    #[test]
    fn zero_duration_tween_is_done_immediately() {
        let start = Instant::now();
        let tween = Tween::new(start, Duration::ZERO);
        assert!(tween.is_finished(start));
        assert_abs_diff_eq!(tween.progress(start), 1.0);
    }

    #[test]
    fn frame_interpolates_between_origin_and_target() {
        let (origin, target) = rects();
        let start = Instant::now();
        let transition = Transition::new(origin, target, start).with_opacity(1.0, 0.0);

        let begin = transition.frame(start);
        assert_eq!(begin.current_rect, origin);
        assert_abs_diff_eq!(transition.opacity(start), 1.0);

        let halfway = start + TRANSITION_DURATION / 2;
        let mid = transition.frame(halfway);
        assert_abs_diff_eq!(mid.current_rect.x, 50.0, epsilon = 0.5);
        assert_abs_diff_eq!(transition.opacity(halfway), 0.5, epsilon = 0.01);

        let end = transition.frame(start + TRANSITION_DURATION);
        assert_eq!(end.current_rect, target);
    }

    #[test]
    fn completion_fires_exactly_once() {
        let (origin, target) = rects();
        let start = Instant::now();
        let mut transition = Transition::new(origin, target, start);

        assert!(!transition.advance(start));
        assert!(transition.advance(start + TRANSITION_DURATION));
        assert!(!transition.advance(start + TRANSITION_DURATION * 2));
        assert!(!transition.interrupt());
    }

    #[test]
    fn interrupt_completes_and_jumps_to_target() {
        let (origin, target) = rects();
        let start = Instant::now();
        let mut transition = Transition::new(origin, target, start);

        assert!(transition.interrupt());
        assert_eq!(transition.frame(start).current_rect, target);
        assert!(!transition.advance(start + TRANSITION_DURATION));
    }
}

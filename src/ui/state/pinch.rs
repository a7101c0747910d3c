// SPDX-License-Identifier: MPL-2.0
//! Two-finger pinch tracking.

use iced::Point;

/// Distance between the fingers at the previous sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchState {
    last_distance: f32,
}

/// Minimum finger distance for a meaningful scale ratio.
const MIN_PINCH_DISTANCE: f32 = 1.0;

impl PinchState {
    #[must_use]
    pub fn start(a: Point, b: Point) -> Self {
        Self {
            last_distance: a.distance(b),
        }
    }

    /// Scale change since the previous sample, and the midpoint to anchor it at.
    pub fn update(&mut self, a: Point, b: Point) -> Option<(f32, Point)> {
        let distance = a.distance(b);
        if self.last_distance < MIN_PINCH_DISTANCE || distance < MIN_PINCH_DISTANCE {
            self.last_distance = distance;
            return None;
        }
        let scale = distance / self.last_distance;
        self.last_distance = distance;
        Some((scale, midpoint(a, b)))
    }
}

#[must_use]
pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

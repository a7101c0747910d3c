// SPDX-License-Identifier: MPL-2.0
//! Zoom state management
//!
//! This module handles the zoom state of one page, including:
//! - The committed zoom factor and content offset
//! - Double-tap toggling between fit and maximum zoom
//! - Pinch zoom anchored under the fingers
//! - Panning of zoomed content and the animated return to fit
//!
//! All geometry is expressed against the page's fitted image rect (the
//! result of `fit_rect`) and the page viewport.

use crate::domain::preview::ZoomFactor;
use crate::ui::animation::{lerp, lerp_vector, Tween};
use iced::{Point, Rectangle, Size, Vector};
use std::time::Instant;

pub use crate::config::{MAX_ZOOM_FACTOR, MIN_ZOOM_FACTOR, TRANSITION_DURATION};

#[derive(Debug, Clone, Copy, PartialEq)]
struct ZoomAnimation {
    from_factor: f32,
    from_offset: Vector,
    tween: Tween,
}

/// Manages the zoom factor and scroll offset of one page
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ZoomState {
    factor: ZoomFactor,
    /// Scroll offset of the zoomed content, in zoomed pixels.
    offset: Vector,
    animation: Option<ZoomAnimation>,
}

impl ZoomState {
    #[must_use]
    pub fn factor(&self) -> ZoomFactor {
        self.factor
    }

    #[must_use]
    pub fn offset(&self) -> Vector {
        self.offset
    }

    #[must_use]
    pub fn is_fit(&self) -> bool {
        self.factor.is_fit()
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Returns to zoom 1.0. Calling it on an already fitted page is a no-op.
    pub fn reset(&mut self, animated: bool, now: Instant) {
        if self.is_fit() && self.offset == Vector::ZERO {
            return;
        }
        self.set(ZoomFactor::FIT, Vector::ZERO, animated, now);
    }

    /// Scrolls back to the top-left without touching the zoom factor.
    pub fn scroll_to_origin(&mut self) {
        self.offset = Vector::ZERO;
        self.animation = None;
    }

    /// Toggles between fit and maximum zoom around `point` (viewport coordinates).
    pub fn toggle_at(&mut self, point: Point, image: Rectangle, viewport: Size, now: Instant) {
        if !self.is_fit() {
            self.reset(true, now);
            return;
        }

        let frame = self.frame(image, viewport);
        let local = Point::new(point.x - frame.x, point.y - frame.y);
        let zoom_width = viewport.width / MAX_ZOOM_FACTOR;
        let zoom_height = viewport.height / MAX_ZOOM_FACTOR;
        let target = Rectangle {
            x: local.x - zoom_width / 2.0,
            y: local.y - zoom_height / 2.0,
            width: zoom_width,
            height: zoom_height,
        };

        let factor = ZoomFactor::MAX;
        let offset = Vector::new(
            target.center_x() * factor.value() - viewport.width / 2.0,
            target.center_y() * factor.value() - viewport.height / 2.0,
        );
        let offset = clamp_offset(offset, factor, image, viewport);
        self.set(factor, offset, true, now);
    }

    /// Multiplies the zoom by `scale`, keeping the content under `anchor` in place.
    pub fn pinch(&mut self, scale: f32, anchor: Point, image: Rectangle, viewport: Size) {
        let old_frame = self.frame(image, viewport);
        let old_factor = self.factor.value();
        let new_factor = self.factor.scaled(scale);

        let content_x = (anchor.x - old_frame.x) / old_factor;
        let content_y = (anchor.y - old_frame.y) / old_factor;
        let offset = Vector::new(
            content_x * new_factor.value() - anchor.x,
            content_y * new_factor.value() - anchor.y,
        );

        self.factor = new_factor;
        self.offset = clamp_offset(offset, new_factor, image, viewport);
        self.animation = None;
    }

    /// Moves the zoomed content along with a finger.
    pub fn pan(&mut self, delta: Vector, image: Rectangle, viewport: Size) {
        self.offset = clamp_offset(self.offset - delta, self.factor, image, viewport);
        self.animation = None;
    }

    /// Whether a vertical finger movement of `dy` would scroll the content.
    #[must_use]
    pub fn can_scroll_vertically(&self, dy: f32, image: Rectangle, viewport: Size) -> bool {
        let max = max_offset(self.factor, image, viewport);
        if dy > 0.0 {
            self.offset.y > 0.0
        } else if dy < 0.0 {
            self.offset.y < max.y
        } else {
            false
        }
    }

    /// On-screen rect of the image for the committed zoom state.
    #[must_use]
    pub fn frame(&self, image: Rectangle, viewport: Size) -> Rectangle {
        image_frame(self.factor.value(), self.offset, image, viewport)
    }

    /// On-screen rect of the image including any running zoom animation.
    #[must_use]
    pub fn rendered_frame(&self, image: Rectangle, viewport: Size, now: Instant) -> Rectangle {
        match self.animation {
            Some(animation) => {
                let t = animation.tween.progress(now);
                let factor = lerp(animation.from_factor, self.factor.value(), t);
                let offset = lerp_vector(animation.from_offset, self.offset, t);
                image_frame(factor, offset, image, viewport)
            }
            None => self.frame(image, viewport),
        }
    }

    /// Drops a finished animation. Returns `true` when one just ended.
    pub fn advance(&mut self, now: Instant) -> bool {
        match self.animation {
            Some(animation) if animation.tween.is_finished(now) => {
                self.animation = None;
                true
            }
            _ => false,
        }
    }

    fn set(&mut self, factor: ZoomFactor, offset: Vector, animated: bool, now: Instant) {
        self.animation = animated.then_some(ZoomAnimation {
            from_factor: self.factor.value(),
            from_offset: self.offset,
            tween: Tween::new(now, TRANSITION_DURATION),
        });
        self.factor = factor;
        self.offset = offset;
    }
}

fn zoomed_size(factor: f32, image: Rectangle) -> Size {
    Size::new(image.width * factor, image.height * factor)
}

fn max_offset(factor: ZoomFactor, image: Rectangle, viewport: Size) -> Vector {
    let content = zoomed_size(factor.value(), image);
    Vector::new(
        (content.width - viewport.width).max(0.0),
        (content.height - viewport.height).max(0.0),
    )
}

fn clamp_offset(offset: Vector, factor: ZoomFactor, image: Rectangle, viewport: Size) -> Vector {
    let max = max_offset(factor, image, viewport);
    Vector::new(offset.x.clamp(0.0, max.x), offset.y.clamp(0.0, max.y))
}

/// Content smaller than the viewport is centered, larger content scrolls.
fn image_frame(factor: f32, offset: Vector, image: Rectangle, viewport: Size) -> Rectangle {
    let content = zoomed_size(factor, image);
    let x = if content.width < viewport.width {
        (viewport.width - content.width) / 2.0
    } else {
        -offset.x
    };
    let y = if content.height < viewport.height {
        (viewport.height - content.height) / 2.0
    } else {
        -offset.y
    };
    Rectangle {
        x,
        y,
        width: content.width,
        height: content.height,
    }
}

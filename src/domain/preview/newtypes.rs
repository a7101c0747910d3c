// SPDX-License-Identifier: MPL-2.0
//! Preview newtypes.
//!
//! This module provides type-safe wrappers for preview values,
//! ensuring they are always within valid ranges.

use crate::config::{DISMISS_COMMIT_THRESHOLD, MAX_ZOOM_FACTOR, MIN_ZOOM_FACTOR};

// =============================================================================
// ZoomFactor
// =============================================================================

/// Zoom multiplier of one page, guaranteed to be within 1.0–2.5.
///
/// 1.0 means the image is fitted to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ZoomFactor(f32);

impl ZoomFactor {
    /// The fitted zoom level.
    pub const FIT: Self = Self(MIN_ZOOM_FACTOR);

    /// The zoom level a double tap zooms into.
    pub const MAX: Self = Self(MAX_ZOOM_FACTOR);

    /// Creates a new zoom factor, clamping the value to the valid range.
    /// Non-finite input falls back to the fitted level.
    #[must_use]
    pub fn new(factor: f32) -> Self {
        if !factor.is_finite() {
            return Self::FIT;
        }
        Self(factor.clamp(MIN_ZOOM_FACTOR, MAX_ZOOM_FACTOR))
    }

    /// Returns the raw multiplier.
    #[must_use]
    pub fn value(self) -> f32 {
        self.0
    }

    /// Returns whether the page shows its fitted layout.
    #[must_use]
    pub fn is_fit(self) -> bool {
        self.0 <= MIN_ZOOM_FACTOR
    }

    /// Returns whether the zoom is at the maximum value.
    #[must_use]
    pub fn is_max(self) -> bool {
        self.0 >= MAX_ZOOM_FACTOR
    }

    /// Multiplies the factor by a pinch scale, clamping the result.
    #[must_use]
    pub fn scaled(self, scale: f32) -> Self {
        Self::new(self.0 * scale)
    }
}

impl Default for ZoomFactor {
    fn default() -> Self {
        Self::FIT
    }
}

// =============================================================================
// DragProgress
// =============================================================================

/// Normalized vertical drag distance of a dismiss gesture (0.0–1.0).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct DragProgress(f32);

impl DragProgress {
    /// Creates a progress value, clamping to the valid range.
    #[must_use]
    pub fn new(value: f32) -> Self {
        if !value.is_finite() {
            return Self(0.0);
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// Progress of a vertical travel relative to the viewport height.
    #[must_use]
    pub fn from_travel(vertical_travel: f32, viewport_height: f32) -> Self {
        if viewport_height <= 0.0 {
            return Self(0.0);
        }
        Self::new(vertical_travel.abs() / viewport_height)
    }

    /// Returns the raw value.
    #[must_use]
    pub fn value(self) -> f32 {
        self.0
    }

    /// Whether releasing the gesture at this progress dismisses the viewer.
    #[must_use]
    pub fn commits(self) -> bool {
        self.0 > DISMISS_COMMIT_THRESHOLD
    }
}

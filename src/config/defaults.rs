// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! This module serves as the single source of truth for the tuning values
//! of the preview. Constants are organized by category.
//!
//! # Categories
//!
//! - **Zoom**: Per-page zoom bounds
//! - **Transitions**: Present/dismiss animation timing and dismiss gesture tuning
//! - **Gestures**: Tap and drag recognition thresholds
//! - **Paging**: Page snapping and cell recycling

use std::time::Duration;

// ==========================================================================
// Zoom Defaults
// ==========================================================================

/// Zoom factor of a page showing its image fitted to the viewport.
pub const MIN_ZOOM_FACTOR: f32 = 1.0;

/// Maximum zoom factor, also the target of a double tap.
pub const MAX_ZOOM_FACTOR: f32 = 2.5;

// ==========================================================================
// Transition Defaults
// ==========================================================================

/// Duration shared by the present, dismiss, commit and cancel animations.
pub const TRANSITION_DURATION: Duration = Duration::from_millis(300);

/// Drag progress that must be exceeded at release to dismiss the viewer.
pub const DISMISS_COMMIT_THRESHOLD: f32 = 0.2;

/// Edge length of the rect a dragged image shrinks toward, and of the
/// fallback target when the host supplies no destination view.
pub const DISMISS_TARGET_EDGE: f32 = 10.0;

// ==========================================================================
// Gesture Defaults
// ==========================================================================

/// Maximum delay between two taps for them to count as a double tap.
pub const DOUBLE_TAP_THRESHOLD: Duration = Duration::from_millis(350);

/// Minimum movement (in pixels) before a press becomes a drag.
pub const TOUCH_SLOP: f32 = 10.0;

// ==========================================================================
// Paging Defaults
// ==========================================================================

/// Fraction of a page width a drag must cover to advance to the neighbour.
pub const PAGE_SNAP_THRESHOLD: f32 = 0.2;

/// Number of zoom cells kept for recycling. Two pages are visible at most
/// while scrolling, the third absorbs out-of-order visibility updates.
pub const CELL_POOL_SIZE: usize = 3;

/// Tick interval driving animations while one is in flight.
pub const ANIMATION_TICK: Duration = Duration::from_millis(16);

// ==========================================================================
// Compile-time Validation
// ==========================================================================

const _: () = {
    assert!(MIN_ZOOM_FACTOR > 0.0);
    assert!(MAX_ZOOM_FACTOR > MIN_ZOOM_FACTOR);

    assert!(DISMISS_COMMIT_THRESHOLD > 0.0);
    assert!(DISMISS_COMMIT_THRESHOLD < 1.0);
    assert!(DISMISS_TARGET_EDGE > 0.0);

    assert!(TOUCH_SLOP > 0.0);
    assert!(PAGE_SNAP_THRESHOLD > 0.0);
    assert!(PAGE_SNAP_THRESHOLD < 0.5);
    assert!(CELL_POOL_SIZE >= 2);
};

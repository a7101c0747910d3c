// SPDX-License-Identifier: MPL-2.0
//! UI state management modules
//!
//! This module contains the gesture and zoom state logic separated from the
//! preview components, following the principle of separation of concerns.

pub mod drag;
pub mod pinch;
pub mod tap;
pub mod zoom;

// Re-export commonly used types for convenience
pub use drag::{DragAxis, DragSample, DragState};
pub use pinch::PinchState;
pub use tap::{Tap, TapState};
pub use zoom::ZoomState;

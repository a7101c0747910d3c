// SPDX-License-Identifier: MPL-2.0
//! Preview domain types.
//!
//! Value objects shared by the zoom cells, the pager and the dismiss
//! gesture, independent of how they end up on screen.

pub mod newtypes;

pub use newtypes::{DragProgress, ZoomFactor};

// SPDX-License-Identifier: MPL-2.0
//! User interface components and state management.
//!
//! This module follows the Elm-style "state down, messages up" pattern used
//! throughout the crate.
//!
//! - [`preview`] - The modal image-gallery preview
//! - [`state`] - Reusable gesture and zoom state
//! - [`animation`] - Tweens and transitions driven by ticks
//! - [`styles`] - Centralized styling for the overlay chrome
//! - [`design_tokens`] - Design system constants (colors, spacing, sizing)

pub mod animation;
pub mod design_tokens;
pub mod preview;
pub mod state;
pub mod styles;

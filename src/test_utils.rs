// SPDX-License-Identifier: MPL-2.0
//! Test utilities for float comparisons and other common test helpers.
//!
//! This module re-exports the `approx` crate's assertion macros for float comparison,
//! which properly handle floating-point precision issues that `assert_eq!` cannot.

// Re-export approx macros for convenient use in tests
pub use approx::assert_abs_diff_eq;

use crate::media::Bitmap;

/// Creates an opaque bitmap of the given pixel size.
pub fn solid_bitmap(width: u32, height: u32) -> Bitmap {
    Bitmap::from_rgba(width, height, vec![255; (width * height * 4) as usize])
}

// SPDX-License-Identifier: MPL-2.0
//! Domain layer - Core value objects with no UI or I/O dependencies.
//!
//! # Modules
//!
//! - [`preview`]: Preview value objects ([`ZoomFactor`](preview::ZoomFactor),
//!   [`DragProgress`](preview::DragProgress))

pub mod preview;

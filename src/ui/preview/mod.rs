// SPDX-License-Identifier: MPL-2.0
//! Modal image-gallery preview.
//!
//! - [`geometry`] - Best-fit rect shared by the present transition and page layout
//! - [`cell`] - Zoom cell: one page's zoomable image surface
//! - [`pager`] - Paging container recycling a small pool of cells
//! - [`dismiss`] - Drag-to-dismiss gesture engine
//! - [`delegate`] - Host callbacks
//! - [`component`] - Orchestrator: session, gesture arbitration, transitions
//! - `view` - Canvas rendering and overlay chrome

pub mod cell;
pub mod component;
pub mod delegate;
pub mod dismiss;
pub mod geometry;
pub mod pager;
mod view;

pub use component::{Effect, Message, PointerEvent, Session, State};
pub use delegate::{PreviewDelegate, ViewHandle};
pub use geometry::fit_rect;

// SPDX-License-Identifier: MPL-2.0
//! Fit computation shared by the present transition and every page layout.

use crate::config::DISMISS_TARGET_EDGE;
use iced::{Point, Rectangle, Size};

/// Computes where an image of `image` size is drawn inside `viewport`.
///
/// The image always spans the viewport width. Images taller than the
/// viewport's aspect ratio ("long" images) are top-aligned and overflow
/// vertically; the others are centered vertically. A height that overshoots
/// the viewport by at most one unit is snapped to the viewport height.
///
/// Degenerate sizes (zero, negative or non-finite) yield the full viewport.
#[must_use]
pub fn fit_rect(image: Size, viewport: Size) -> Rectangle {
    if !is_drawable(image) || !is_drawable(viewport) {
        return Rectangle::new(Point::ORIGIN, viewport);
    }

    let height_ratio = image.height / image.width;
    let viewport_ratio = viewport.height / viewport.width;
    let scaled_height = image.height * viewport.width / image.width;

    let (mut height, mut y) = if height_ratio > viewport_ratio {
        (scaled_height.floor(), 0.0)
    } else {
        let height = if scaled_height < 1.0 {
            viewport.height
        } else {
            scaled_height
        }
        .floor();
        (height, (viewport.height - height) / 2.0)
    };

    if height > viewport.height && height - viewport.height <= 1.0 {
        height = viewport.height;
        y = 0.0;
    }

    Rectangle {
        x: 0.0,
        y,
        width: viewport.width,
        height,
    }
}

/// A square of `DISMISS_TARGET_EDGE` centered in the viewport.
#[must_use]
pub fn centered_target(viewport: Size) -> Rectangle {
    centered_rect(viewport, Size::new(DISMISS_TARGET_EDGE, DISMISS_TARGET_EDGE))
}

/// A rect of the given size centered in the viewport.
#[must_use]
pub fn centered_rect(viewport: Size, size: Size) -> Rectangle {
    Rectangle {
        x: (viewport.width - size.width) / 2.0,
        y: (viewport.height - size.height) / 2.0,
        width: size.width,
        height: size.height,
    }
}

fn is_drawable(size: Size) -> bool {
    size.width.is_finite() && size.height.is_finite() && size.width > 0.0 && size.height > 0.0
}

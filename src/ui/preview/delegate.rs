// SPDX-License-Identifier: MPL-2.0
//! The preview's only boundary with host code.
//!
//! A host implements [`PreviewDelegate`] to hand out image sources and to be
//! told about saves and the final teardown. The optional capabilities have
//! defaults that describe the behaviour when the host does not care:
//!
//! | Method                  | Default                                   |
//! |-------------------------|-------------------------------------------|
//! | `placeholder_image`     | no placeholder                            |
//! | `dismiss_destination`   | none: default shrink/fade dismissal       |
//! | `save_requested`        | ignored                                   |

use crate::media::{Bitmap, ImageSource};
use iced::{Point, Rectangle, Vector};

/// Host callbacks driving one preview session.
pub trait PreviewDelegate {
    /// Number of pages. Queried once per presentation.
    fn number_of_images(&self) -> usize;

    /// Source of the image shown on page `index`.
    fn image_source(&self, index: usize) -> ImageSource;

    /// Image shown while the source of page `index` is loading.
    fn placeholder_image(&self, _index: usize) -> Option<Bitmap> {
        None
    }

    /// View the image of page `index` shrinks into when dismissed.
    fn dismiss_destination(&self, _index: usize) -> Option<ViewHandle> {
        None
    }

    /// The user tapped the save affordance. `image` is `None` while the page
    /// is still loading or when loading failed.
    fn save_requested(&self, _index: usize, _image: Option<&Bitmap>) {}

    /// The preview is fully torn down. Called exactly once per session.
    fn did_dismiss(&self);
}

/// A host view the preview animates from or into.
///
/// `frame` is expressed in the coordinate space of the view's parent; the
/// parent's origin in viewer coordinates is known only while the view is
/// attached to a visible hierarchy.
#[derive(Debug, Clone)]
pub struct ViewHandle {
    pub frame: Rectangle,
    parent_origin: Option<Point>,
    image: Option<Bitmap>,
}

impl ViewHandle {
    /// A view attached under a parent whose origin is `parent_origin`.
    #[must_use]
    pub fn attached(frame: Rectangle, parent_origin: Point) -> Self {
        Self {
            frame,
            parent_origin: Some(parent_origin),
            image: None,
        }
    }

    /// A view that is not part of any visible hierarchy.
    #[must_use]
    pub fn detached(frame: Rectangle) -> Self {
        Self {
            frame,
            parent_origin: None,
            image: None,
        }
    }

    /// Attaches the bitmap the view currently displays.
    #[must_use]
    pub fn with_image(mut self, image: Bitmap) -> Self {
        self.image = Some(image);
        self
    }

    #[must_use]
    pub fn image(&self) -> Option<&Bitmap> {
        self.image.as_ref()
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.parent_origin.is_some()
    }

    /// The frame converted into viewer coordinates, if the view is attached.
    #[must_use]
    pub fn frame_in_viewer(&self) -> Option<Rectangle> {
        let origin = self.parent_origin?;
        Some(self.frame + Vector::new(origin.x, origin.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iced::Size;

    #[test]
    fn attached_view_converts_into_viewer_space() {
        let frame = Rectangle::new(Point::new(10.0, 20.0), Size::new(50.0, 40.0));
        let view = ViewHandle::attached(frame, Point::new(100.0, 200.0));

        assert_eq!(
            view.frame_in_viewer(),
            Some(Rectangle::new(Point::new(110.0, 220.0), Size::new(50.0, 40.0)))
        );
    }

    #[test]
    fn detached_view_has_no_viewer_frame() {
        let frame = Rectangle::new(Point::new(10.0, 20.0), Size::new(50.0, 40.0));
        let view = ViewHandle::detached(frame);

        assert!(!view.is_attached());
        assert!(view.frame_in_viewer().is_none());
    }
}

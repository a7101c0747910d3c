// SPDX-License-Identifier: MPL-2.0
//! Decoded image handed to the preview by the host or its loader.

use iced::widget::image;
use iced::Size;
use image_rs::{DynamicImage, GenericImageView};

/// A decoded image ready to be drawn, with its pixel dimensions.
#[derive(Debug, Clone)]
pub struct Bitmap {
    handle: image::Handle,
    width: u32,
    height: u32,
}

impl Bitmap {
    /// Creates a bitmap from RGBA pixels.
    #[must_use]
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            handle: image::Handle::from_rgba(width, height, pixels),
            width,
            height,
        }
    }

    /// Converts a decoded `image` buffer.
    #[must_use]
    pub fn from_dynamic(dynamic: &DynamicImage) -> Self {
        let (width, height) = dynamic.dimensions();
        Self::from_rgba(width, height, dynamic.to_rgba8().into_vec())
    }

    #[must_use]
    pub fn handle(&self) -> &image::Handle {
        &self.handle
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Intrinsic size used by the fit computation.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn size(&self) -> Size {
        Size::new(self.width as f32, self.height as f32)
    }

    /// Whether the bitmap has a usable, non-empty size.
    #[must_use]
    pub fn has_valid_size(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image_rs::{ImageBuffer, Rgba};

    #[test]
    fn from_dynamic_keeps_dimensions() {
        let buffer = ImageBuffer::from_pixel(6, 3, Rgba([10, 20, 30, 255]));
        let bitmap = Bitmap::from_dynamic(&DynamicImage::ImageRgba8(buffer));
        assert_eq!(bitmap.width(), 6);
        assert_eq!(bitmap.height(), 3);
        assert_eq!(bitmap.size(), Size::new(6.0, 3.0));
    }

    #[test]
    fn zero_sized_bitmap_is_not_valid() {
        assert!(!Bitmap::from_rgba(0, 4, Vec::new()).has_valid_size());
        assert!(Bitmap::from_rgba(1, 1, vec![0; 4]).has_valid_size());
    }
}

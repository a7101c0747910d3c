// SPDX-License-Identifier: MPL-2.0
//! Image sources and the loading boundary of the preview.
//!
//! The preview never fetches or decodes on its own: in-memory bitmaps are
//! shown as-is and everything else goes through an [`ImageLoader`].

pub mod bitmap;
pub mod loader;
pub mod source;

// Re-export commonly used types
pub use bitmap::Bitmap;
pub use loader::{FsImageLoader, ImageLoader};
pub use source::{ImageSource, ResolvedSource};

/// URL type accepted by [`ImageSource::Url`].
pub use reqwest::Url;

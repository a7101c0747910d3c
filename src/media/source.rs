// SPDX-License-Identifier: MPL-2.0
//! Image source descriptors supplied by the host for each page.

use super::{Bitmap, Url};

/// Where the image of one page comes from.
#[derive(Debug, Clone, Default)]
pub enum ImageSource {
    /// A link that still has to be parsed as a URL.
    Link(String),
    /// An already parsed URL.
    Url(Url),
    /// A bitmap the host already holds.
    Image(Bitmap),
    /// No image; only the placeholder (if any) is shown.
    #[default]
    Empty,
}

/// What a cell has to do with a source.
#[derive(Debug, Clone)]
pub enum ResolvedSource {
    /// Show this bitmap right away.
    Ready(Bitmap),
    /// Ask the loader for this URL.
    Fetch(Url),
    /// Nothing to load.
    Nothing,
}

impl ImageSource {
    /// Resolves the descriptor without touching the network or disk.
    ///
    /// A link that does not parse as a URL behaves like [`ImageSource::Empty`].
    #[must_use]
    pub fn resolve(self) -> ResolvedSource {
        match self {
            ImageSource::Image(bitmap) => ResolvedSource::Ready(bitmap),
            ImageSource::Url(url) => ResolvedSource::Fetch(url),
            ImageSource::Link(link) => match Url::parse(link.trim()) {
                Ok(url) => ResolvedSource::Fetch(url),
                Err(err) => {
                    tracing::debug!(%link, "treating malformed image link as empty: {err}");
                    ResolvedSource::Nothing
                }
            },
            ImageSource::Empty => ResolvedSource::Nothing,
        }
    }
}

impl From<Bitmap> for ImageSource {
    fn from(bitmap: Bitmap) -> Self {
        ImageSource::Image(bitmap)
    }
}

impl From<Url> for ImageSource {
    fn from(url: Url) -> Self {
        ImageSource::Url(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::solid_bitmap;

    #[test]
    fn link_is_parsed_into_fetch() {
        let resolved = ImageSource::Link("https://example.com/a.png".into()).resolve();
        assert!(
            matches!(resolved, ResolvedSource::Fetch(url) if url.host_str() == Some("example.com"))
        );
    }

    #[test]
    fn malformed_link_resolves_to_nothing() {
        let resolved = ImageSource::Link("not a url".into()).resolve();
        assert!(matches!(resolved, ResolvedSource::Nothing));
    }

    #[test]
    fn in_memory_image_is_ready() {
        let resolved = ImageSource::from(solid_bitmap(2, 2)).resolve();
        assert!(matches!(resolved, ResolvedSource::Ready(bitmap) if bitmap.width() == 2));
    }

    #[test]
    fn empty_resolves_to_nothing() {
        assert!(matches!(ImageSource::Empty.resolve(), ResolvedSource::Nothing));
    }
}

// SPDX-License-Identifier: MPL-2.0
//! Image loading port definition and the filesystem adapter.
//!
//! The preview only depends on the [`ImageLoader`] trait. Fetching, caching
//! and retry policy belong to whichever implementation the host plugs in.

use super::{Bitmap, Url};
use crate::error::LoadError;
use futures_util::future::{BoxFuture, FutureExt};
use std::fmt;
use std::path::Path;

/// Port for resolving remote image sources into bitmaps.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: futures are driven by the iced
/// executor, and their completions come back as messages on the UI loop.
pub trait ImageLoader: Send + Sync + fmt::Debug {
    /// Starts loading the image behind `url`.
    ///
    /// # Errors
    ///
    /// The future resolves to a [`LoadError`] when the URL cannot be served
    /// or the data cannot be decoded. The preview keeps the placeholder.
    fn load(&self, url: &Url) -> BoxFuture<'static, Result<Bitmap, LoadError>>;
}

/// Loader for `file://` URLs, decoding on a blocking tokio thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsImageLoader;

impl ImageLoader for FsImageLoader {
    fn load(&self, url: &Url) -> BoxFuture<'static, Result<Bitmap, LoadError>> {
        let url = url.clone();
        async move {
            if url.scheme() != "file" {
                return Err(LoadError::UnsupportedScheme(url.scheme().to_string()));
            }
            let path = url
                .to_file_path()
                .map_err(|()| LoadError::InvalidUrl(url.to_string()))?;

            tokio::task::spawn_blocking(move || decode_file(&path))
                .await
                .map_err(|err| LoadError::Io(err.to_string()))?
        }
        .boxed()
    }
}

fn decode_file(path: &Path) -> Result<Bitmap, LoadError> {
    let dynamic = image_rs::open(path)?;
    let bitmap = Bitmap::from_dynamic(&dynamic);
    tracing::debug!(
        path = %path.display(),
        width = bitmap.width(),
        height = bitmap.height(),
        "decoded image"
    );
    Ok(bitmap)
}

// SPDX-License-Identifier: MPL-2.0
//! The demo's image list and its [`PreviewDelegate`] implementation.
//!
//! Pages load full-size through `file://` URLs while the strip thumbnails
//! double as placeholders. Dismissal flies back into the thumbnail when it
//! is inside the window.

use crate::error::{Error, LoadError};
use crate::media::{Bitmap, ImageSource, Url};
use crate::ui::design_tokens::spacing;
use crate::ui::preview::{PreviewDelegate, ViewHandle};
use iced::{Point, Rectangle, Size};
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

/// Edge of a thumbnail in the strip, in logical pixels.
pub const THUMBNAIL_EDGE: f32 = 96.0;

/// Longest edge thumbnails are downscaled to when decoded.
const THUMBNAIL_PIXELS: u32 = 256;

/// Padding around the strip.
pub const STRIP_PADDING: f32 = spacing::MD;

/// Gap between two thumbnails.
pub const THUMBNAIL_GAP: f32 = spacing::XS;

#[derive(Debug)]
struct Entry {
    path: PathBuf,
    url: Option<Url>,
    thumbnail: Option<Bitmap>,
}

/// Images of the demo, in page order.
#[derive(Debug)]
pub struct Gallery {
    entries: Vec<Entry>,
    viewport: Size,
    pending_saves: RefCell<Vec<usize>>,
    dismissals: Cell<usize>,
}

impl Gallery {
    pub fn new(paths: Vec<PathBuf>, viewport: Size) -> Self {
        let entries = paths
            .into_iter()
            .map(|path| {
                let url = std::path::absolute(&path)
                    .ok()
                    .and_then(|absolute| Url::from_file_path(absolute).ok());
                if url.is_none() {
                    tracing::warn!(path = %path.display(), "cannot build a file URL");
                }
                Entry {
                    path,
                    url,
                    thumbnail: None,
                }
            })
            .collect();
        Self {
            entries,
            viewport,
            pending_saves: RefCell::new(Vec::new()),
            dismissals: Cell::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self, index: usize) -> Option<&Path> {
        self.entries.get(index).map(|entry| entry.path.as_path())
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(|entry| entry.path.as_path())
    }

    pub fn thumbnail(&self, index: usize) -> Option<&Bitmap> {
        self.entries.get(index)?.thumbnail.as_ref()
    }

    pub fn set_thumbnail(&mut self, index: usize, thumbnail: Bitmap) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.thumbnail = Some(thumbnail);
        }
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Number of sessions that were fully torn down.
    pub fn dismissals(&self) -> usize {
        self.dismissals.get()
    }

    /// Takes the pages whose save button was pressed since the last call.
    pub fn take_pending_saves(&self) -> Vec<usize> {
        self.pending_saves.take()
    }

    /// The thumbnail of page `index` as a preview origin.
    ///
    /// Thumbnails scrolled past the window edge are reported detached.
    pub fn thumbnail_view(&self, index: usize) -> ViewHandle {
        let frame = thumbnail_frame(index);
        let origin = Point::new(STRIP_PADDING, STRIP_PADDING);
        let visible = origin.x + frame.x + frame.width <= self.viewport.width
            && origin.y + frame.height <= self.viewport.height;
        let view = if visible {
            ViewHandle::attached(frame, origin)
        } else {
            ViewHandle::detached(frame)
        };
        match self.thumbnail(index) {
            Some(thumbnail) => view.with_image(thumbnail.clone()),
            None => view,
        }
    }
}

impl PreviewDelegate for Gallery {
    fn number_of_images(&self) -> usize {
        self.entries.len()
    }

    fn image_source(&self, index: usize) -> ImageSource {
        self.entries
            .get(index)
            .and_then(|entry| entry.url.clone())
            .map_or(ImageSource::Empty, ImageSource::Url)
    }

    fn placeholder_image(&self, index: usize) -> Option<Bitmap> {
        self.thumbnail(index).cloned()
    }

    fn dismiss_destination(&self, index: usize) -> Option<ViewHandle> {
        (index < self.entries.len()).then(|| self.thumbnail_view(index))
    }

    fn save_requested(&self, index: usize, image: Option<&Bitmap>) {
        if image.is_none() {
            tracing::info!(index, "page not loaded yet, saving the source file anyway");
        }
        self.pending_saves.borrow_mut().push(index);
    }

    fn did_dismiss(&self) {
        self.dismissals.set(self.dismissals.get() + 1);
    }
}

/// Frame of thumbnail `index` inside the strip row.
pub fn thumbnail_frame(index: usize) -> Rectangle {
    #[allow(clippy::cast_precision_loss)]
    let x = index as f32 * (THUMBNAIL_EDGE + THUMBNAIL_GAP);
    Rectangle::new(
        Point::new(x, 0.0),
        Size::new(THUMBNAIL_EDGE, THUMBNAIL_EDGE),
    )
}

/// Decodes `path` and downscales it for the strip.
pub async fn load_thumbnail(path: PathBuf) -> Result<Bitmap, LoadError> {
    tokio::task::spawn_blocking(move || {
        let dynamic = image_rs::open(&path)?;
        let thumbnail = dynamic.thumbnail(THUMBNAIL_PIXELS, THUMBNAIL_PIXELS);
        Ok(Bitmap::from_dynamic(&thumbnail))
    })
    .await
    .map_err(|err| LoadError::Io(err.to_string()))?
}

/// Copies `source` into `directory`, keeping its file name.
pub async fn save_copy(source: PathBuf, directory: PathBuf) -> Result<PathBuf, Error> {
    tokio::task::spawn_blocking(move || {
        let name = source
            .file_name()
            .ok_or_else(|| Error::Io(format!("{} has no file name", source.display())))?;
        std::fs::create_dir_all(&directory)?;
        let target = directory.join(name);
        std::fs::copy(&source, &target)?;
        Ok(target)
    })
    .await
    .map_err(|err| Error::Io(err.to_string()))?
}

/// Directory saved copies go to.
pub fn save_directory() -> PathBuf {
    dirs::picture_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("iced_preview")
}

// SPDX-License-Identifier: MPL-2.0
//! Zoom cell: one page's zoomable image surface.
//!
//! A cell is reused for different pages as the pager scrolls. Every
//! (re)configuration bumps its generation, and load completions carry the
//! generation they were issued for, so a completion that arrives after the
//! cell moved on is dropped instead of overwriting the new page.

use crate::error::LoadError;
use crate::media::{Bitmap, ImageSource, ResolvedSource, Url};
use crate::ui::preview::geometry::fit_rect;
use crate::ui::state::ZoomState;
use iced::{Point, Rectangle, Size, Vector};
use std::time::Instant;

/// Loading phase of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No image to load; the placeholder (if any) is shown.
    #[default]
    Idle,
    /// Waiting for the loader, or the load failed and the placeholder stays.
    Loading { fetching: bool },
    /// The real image is shown.
    Loaded,
}

/// Fitted layout of the displayed bitmap at zoom 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    /// Image rect in page coordinates.
    pub image_rect: Rectangle,
    /// Scrollable content size.
    pub content_size: Size,
    /// Vertical rubber-banding only for content taller than the page.
    pub bounces_vertically: bool,
}

impl Layout {
    fn compute(image: Size, viewport: Size) -> Self {
        let image_rect = fit_rect(image, viewport);
        Self {
            image_rect,
            content_size: Size::new(viewport.width, image_rect.height.max(viewport.height)),
            bounces_vertically: image_rect.height > viewport.height,
        }
    }
}

/// Zoom cell state.
#[derive(Debug, Clone)]
pub struct State {
    page: Option<usize>,
    generation: u64,
    phase: Phase,
    placeholder: Option<Bitmap>,
    image: Option<Bitmap>,
    zoom: ZoomState,
    viewport: Size,
    layout: Option<Layout>,
}

/// Messages for the zoom cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message {
    SingleTap,
    /// Double tap at a point in page coordinates.
    DoubleTap(Point),
    Pinch {
        scale: f32,
        anchor: Point,
    },
    Pan(Vector),
    ResetZoom {
        animated: bool,
    },
}

/// Effects produced by the zoom cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Single tap on a fitted page: the container should dismiss.
    RequestDismiss,
    ZoomChanged,
}

impl State {
    #[must_use]
    pub fn new(viewport: Size) -> Self {
        Self {
            page: None,
            generation: 0,
            phase: Phase::Idle,
            placeholder: None,
            image: None,
            zoom: ZoomState::default(),
            viewport,
            layout: None,
        }
    }

    /// Shows `source` for `page`. Returns the URL to fetch and the generation
    /// its completion must present, when the source is remote.
    pub fn configure(
        &mut self,
        page: usize,
        source: ImageSource,
        placeholder: Option<Bitmap>,
        now: Instant,
    ) -> Option<(Url, u64)> {
        self.generation = self.generation.wrapping_add(1);
        self.page = Some(page);
        self.placeholder = placeholder;
        self.image = None;

        let fetch = match source.resolve() {
            ResolvedSource::Ready(bitmap) => {
                self.image = Some(bitmap);
                self.phase = Phase::Loaded;
                None
            }
            ResolvedSource::Fetch(url) => {
                self.phase = Phase::Loading { fetching: true };
                Some((url, self.generation))
            }
            ResolvedSource::Nothing => {
                self.phase = Phase::Idle;
                None
            }
        };

        self.relayout();
        self.zoom.reset(false, now);
        fetch
    }

    /// Applies a load result. Returns `false` when it belongs to an older
    /// configuration of this cell and was ignored.
    pub fn complete_load(&mut self, generation: u64, result: Result<Bitmap, LoadError>) -> bool {
        if generation != self.generation {
            tracing::debug!(
                page = ?self.page,
                generation,
                current = self.generation,
                "dropping stale image load"
            );
            return false;
        }

        match result {
            Ok(bitmap) => {
                self.image = Some(bitmap);
                self.phase = Phase::Loaded;
                self.relayout();
            }
            Err(err) => {
                tracing::warn!(page = ?self.page, "image load failed, keeping placeholder: {err}");
                self.phase = Phase::Loading { fetching: false };
            }
        }
        true
    }

    /// Releases the cell for reuse. Pending loads become stale.
    pub fn recycle(&mut self, now: Instant) {
        self.zoom.reset(false, now);
        self.generation = self.generation.wrapping_add(1);
        self.page = None;
    }

    pub fn set_viewport(&mut self, viewport: Size, now: Instant) {
        if self.viewport == viewport {
            return;
        }
        self.viewport = viewport;
        self.zoom.reset(false, now);
        self.relayout();
    }

    /// Handle a cell message.
    pub fn handle(&mut self, msg: Message, now: Instant) -> Effect {
        match msg {
            Message::SingleTap => {
                if self.zoom.is_fit() {
                    Effect::RequestDismiss
                } else {
                    Effect::None
                }
            }
            Message::DoubleTap(point) => {
                let Some(layout) = self.layout else {
                    return Effect::None;
                };
                self.zoom
                    .toggle_at(point, layout.image_rect, self.viewport, now);
                Effect::ZoomChanged
            }
            Message::Pinch { scale, anchor } => {
                let Some(layout) = self.layout else {
                    return Effect::None;
                };
                self.zoom
                    .pinch(scale, anchor, layout.image_rect, self.viewport);
                Effect::ZoomChanged
            }
            Message::Pan(delta) => {
                let Some(layout) = self.layout else {
                    return Effect::None;
                };
                self.zoom.pan(delta, layout.image_rect, self.viewport);
                Effect::ZoomChanged
            }
            Message::ResetZoom { animated } => {
                if self.zoom.is_fit() && self.zoom.offset() == Vector::ZERO {
                    return Effect::None;
                }
                self.zoom.reset(animated, now);
                Effect::ZoomChanged
            }
        }
    }

    /// Advances a running zoom animation.
    pub fn advance(&mut self, now: Instant) -> bool {
        self.zoom.advance(now)
    }

    fn relayout(&mut self) {
        self.layout = self
            .displayed()
            .filter(|bitmap| bitmap.has_valid_size())
            .map(|bitmap| Layout::compute(bitmap.size(), self.viewport));
        self.zoom.scroll_to_origin();
    }

    #[must_use]
    pub fn page(&self) -> Option<usize> {
        self.page
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn is_fetching(&self) -> bool {
        matches!(self.phase, Phase::Loading { fetching: true })
    }

    /// The real image of the page, once resolved.
    #[must_use]
    pub fn image(&self) -> Option<&Bitmap> {
        self.image.as_ref()
    }

    /// What is on screen: the real image, else the placeholder.
    #[must_use]
    pub fn displayed(&self) -> Option<&Bitmap> {
        self.image.as_ref().or(self.placeholder.as_ref())
    }

    #[must_use]
    pub fn layout(&self) -> Option<Layout> {
        self.layout
    }

    #[must_use]
    pub fn zoom(&self) -> &ZoomState {
        &self.zoom
    }

    #[must_use]
    pub fn is_zoom_animating(&self) -> bool {
        self.zoom.is_animating()
    }

    /// Committed on-screen rect of the displayed image, in page coordinates.
    #[must_use]
    pub fn display_rect(&self) -> Option<Rectangle> {
        let layout = self.layout?;
        Some(self.zoom.frame(layout.image_rect, self.viewport))
    }

    /// Rect to draw at `now`, following any zoom animation.
    #[must_use]
    pub fn rendered_rect(&self, now: Instant) -> Option<Rectangle> {
        let layout = self.layout?;
        Some(
            self.zoom
                .rendered_frame(layout.image_rect, self.viewport, now),
        )
    }

    /// Whether a vertical finger movement would scroll a long image.
    #[must_use]
    pub fn can_scroll_vertically(&self, dy: f32) -> bool {
        self.layout.is_some_and(|layout| {
            layout.bounces_vertically
                && self
                    .zoom
                    .can_scroll_vertically(dy, layout.image_rect, self.viewport)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_ZOOM_FACTOR;
    use crate::test_utils::solid_bitmap;

    fn viewport() -> Size {
        Size::new(400.0, 800.0)
    }

    fn remote() -> ImageSource {
        ImageSource::Link("https://example.com/photo.jpg".into())
    }

    #[test]
    fn in_memory_source_loads_synchronously() {
        let mut cell = State::new(viewport());
        let fetch = cell.configure(0, solid_bitmap(300, 600).into(), None, Instant::now());

        assert!(fetch.is_none());
        assert_eq!(cell.phase(), Phase::Loaded);
        assert_eq!(
            cell.display_rect(),
            Some(Rectangle::new(Point::ORIGIN, viewport()))
        );
    }

    #[test]
    fn remote_source_shows_placeholder_until_loaded() {
        let mut cell = State::new(viewport());
        let (url, generation) = cell
            .configure(0, remote(), Some(solid_bitmap(800, 400)), Instant::now())
            .expect("remote source needs a fetch");

        assert_eq!(url.host_str(), Some("example.com"));
        assert!(cell.is_fetching());
        assert!(cell.image().is_none());
        assert_eq!(cell.displayed().map(Bitmap::width), Some(800));
        assert_eq!(cell.layout().map(|l| l.image_rect.height), Some(200.0));

        assert!(cell.complete_load(generation, Ok(solid_bitmap(300, 600))));
        assert_eq!(cell.phase(), Phase::Loaded);
        assert_eq!(cell.layout().map(|l| l.image_rect.height), Some(800.0));
    }

    #[test]
    fn failed_load_keeps_placeholder() {
        let mut cell = State::new(viewport());
        let (_, generation) = cell
            .configure(0, remote(), Some(solid_bitmap(10, 10)), Instant::now())
            .expect("remote source needs a fetch");

        cell.complete_load(generation, Err(LoadError::Io("offline".into())));

        assert_eq!(cell.phase(), Phase::Loading { fetching: false });
        assert!(cell.image().is_none());
        assert_eq!(cell.displayed().map(Bitmap::width), Some(10));
    }

    #[test]
    fn malformed_link_behaves_as_empty() {
        let mut cell = State::new(viewport());
        let fetch = cell.configure(
            0,
            ImageSource::Link("::nope::".into()),
            Some(solid_bitmap(4, 4)),
            Instant::now(),
        );

        assert!(fetch.is_none());
        assert_eq!(cell.phase(), Phase::Idle);
        assert!(cell.displayed().is_some());
    }

    #[test]
    fn empty_source_without_placeholder_is_idle_and_blank() {
        let mut cell = State::new(viewport());
        cell.configure(0, ImageSource::Empty, None, Instant::now());

        assert_eq!(cell.phase(), Phase::Idle);
        assert!(cell.displayed().is_none());
        assert!(cell.display_rect().is_none());
    }

    #[test]
    fn stale_completion_is_ignored_after_reuse() {
        let now = Instant::now();
        let mut cell = State::new(viewport());
        let (_, first) = cell
            .configure(0, remote(), None, now)
            .expect("remote source needs a fetch");
        cell.recycle(now);
        cell.configure(5, solid_bitmap(800, 400).into(), None, now);

        assert!(!cell.complete_load(first, Ok(solid_bitmap(300, 600))));
        assert_eq!(cell.page(), Some(5));
        assert_eq!(cell.image().map(Bitmap::width), Some(800));
    }

    #[test]
    fn single_tap_requests_dismiss_only_when_fitted() {
        let now = Instant::now();
        let mut cell = State::new(viewport());
        cell.configure(0, solid_bitmap(800, 400).into(), None, now);

        assert_eq!(cell.handle(Message::SingleTap, now), Effect::RequestDismiss);

        cell.handle(Message::DoubleTap(Point::new(200.0, 400.0)), now);
        assert_eq!(cell.zoom().factor().value(), MAX_ZOOM_FACTOR);
        assert_eq!(cell.handle(Message::SingleTap, now), Effect::None);
    }

    #[test]
    fn reset_zoom_is_idempotent() {
        let now = Instant::now();
        let mut cell = State::new(viewport());
        cell.configure(0, solid_bitmap(800, 400).into(), None, now);

        let before = cell.display_rect();
        let effect = cell.handle(Message::ResetZoom { animated: true }, now);

        assert_eq!(effect, Effect::None);
        assert_eq!(cell.display_rect(), before);
        assert!(!cell.is_zoom_animating());
    }

    #[test]
    fn recycle_resets_zoom() {
        let now = Instant::now();
        let mut cell = State::new(viewport());
        cell.configure(0, solid_bitmap(800, 400).into(), None, now);
        cell.handle(Message::DoubleTap(Point::new(200.0, 400.0)), now);

        cell.recycle(now);

        assert!(cell.zoom().is_fit());
        assert!(cell.page().is_none());
    }

    #[test]
    fn vertical_bounce_only_for_overflowing_content() {
        let now = Instant::now();
        let mut cell = State::new(viewport());

        cell.configure(0, solid_bitmap(300, 600).into(), None, now);
        assert_eq!(cell.layout().map(|l| l.bounces_vertically), Some(false));

        cell.configure(1, solid_bitmap(100, 1000).into(), None, now);
        let layout = cell.layout().expect("image has a layout");
        assert!(layout.bounces_vertically);
        assert_eq!(layout.content_size, Size::new(400.0, 4000.0));
    }

    #[test]
    fn viewport_change_relayouts() {
        let now = Instant::now();
        let mut cell = State::new(viewport());
        cell.configure(0, solid_bitmap(800, 400).into(), None, now);

        cell.set_viewport(Size::new(800.0, 400.0), now);

        assert_eq!(
            cell.display_rect(),
            Some(Rectangle::new(Point::ORIGIN, Size::new(800.0, 400.0)))
        );
    }
}

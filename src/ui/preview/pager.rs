// SPDX-License-Identifier: MPL-2.0
//! Paging container: a horizontally paged strip of recycled zoom cells.
//!
//! Only the pages intersecting the viewport own a cell. When a page scrolls
//! out its cell is recycled (zoom reset, generation bumped) and handed to the
//! next page that scrolls in.

use super::cell;
use super::delegate::PreviewDelegate;
use crate::config::{CELL_POOL_SIZE, PAGE_SNAP_THRESHOLD, TRANSITION_DURATION};
use crate::error::LoadError;
use crate::invariant_violation;
use crate::media::{Bitmap, Url};
use crate::ui::animation::{lerp, Tween};
use iced::Size;
use std::ops::RangeInclusive;
use std::time::Instant;

/// Identity of an issued image load.
///
/// A completion is applied only if the slot still shows `page` at the same
/// `generation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    pub slot: usize,
    pub page: usize,
    pub generation: u64,
}

/// A remote image the host's loader must fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub ticket: LoadTicket,
    pub url: Url,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Snap {
    from: f32,
    to: f32,
    target: usize,
    tween: Tween,
}

#[derive(Debug, Clone)]
pub struct Pager {
    cells: Vec<cell::State>,
    page_count: usize,
    page_size: Size,
    offset_x: f32,
    /// Page the strip rests on. Survives a zero page width, where the offset
    /// cannot encode it.
    page: usize,
    drag_origin: Option<usize>,
    snap: Option<Snap>,
}

impl Pager {
    #[must_use]
    pub fn new(page_count: usize, page_size: Size) -> Self {
        Self {
            cells: (0..CELL_POOL_SIZE)
                .map(|_| cell::State::new(page_size))
                .collect(),
            page_count,
            page_size,
            offset_x: 0.0,
            page: 0,
            drag_origin: None,
            snap: None,
        }
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// `floor(offset / page width)`, kept inside `[0, page_count)`. Without a
    /// page width, the page the strip rests on.
    #[must_use]
    pub fn current_index(&self) -> usize {
        if self.page_count == 0 {
            return 0;
        }
        if self.page_size.width <= 0.0 {
            return self.page.min(self.page_count - 1);
        }
        let raw = (self.offset_x / self.page_size.width).floor().max(0.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let index = raw as usize;
        index.min(self.page_count - 1)
    }

    /// Pages intersecting the viewport at the current offset.
    #[must_use]
    pub fn visible_pages(&self) -> Option<RangeInclusive<usize>> {
        if self.page_count == 0 || self.page_size.width <= 0.0 {
            return None;
        }
        let first = self.current_index();
        let right_edge = self.offset_x + self.page_size.width;
        let overflows = right_edge > self.page_origin_x(first + 1) && first + 1 < self.page_count;
        let last = if overflows { first + 1 } else { first };
        Some(first..=last)
    }

    /// Horizontal position of `page` relative to the viewport.
    #[must_use]
    pub fn page_x(&self, page: usize) -> f32 {
        self.page_origin_x(page) - self.offset_x
    }

    #[allow(clippy::cast_precision_loss)]
    fn page_origin_x(&self, page: usize) -> f32 {
        page as f32 * self.page_size.width
    }

    #[allow(clippy::cast_precision_loss)]
    fn max_offset(&self) -> f32 {
        self.page_count.saturating_sub(1) as f32 * self.page_size.width
    }

    /// Moves to `index` without animation. Out-of-range indices are ignored.
    pub fn jump_to(&mut self, index: usize) {
        if index >= self.page_count {
            tracing::debug!(index, count = self.page_count, "ignoring jump past last page");
            return;
        }
        self.snap = None;
        self.drag_origin = None;
        self.page = index;
        self.offset_x = self.page_origin_x(index);
    }

    /// Follows a horizontal finger movement of `dx`.
    pub fn drag_by(&mut self, dx: f32) {
        if self.drag_origin.is_none() {
            self.drag_origin = Some(self.current_index());
        }
        self.snap = None;
        self.offset_x = (self.offset_x - dx).clamp(0.0, self.max_offset());
    }

    /// Ends a horizontal drag and animates to the settling page.
    pub fn release(&mut self, now: Instant) {
        let Some(origin) = self.drag_origin.take() else {
            return;
        };
        let travelled = self.offset_x - self.page_origin_x(origin);
        let threshold = self.page_size.width * PAGE_SNAP_THRESHOLD;
        let target = if travelled > threshold {
            (origin + 1).min(self.page_count.saturating_sub(1))
        } else if travelled < -threshold {
            origin.saturating_sub(1)
        } else {
            origin
        };
        self.snap = Some(Snap {
            from: self.offset_x,
            to: self.page_origin_x(target),
            target,
            tween: Tween::new(now, TRANSITION_DURATION),
        });
    }

    #[must_use]
    pub fn is_snapping(&self) -> bool {
        self.snap.is_some()
    }

    /// Advances a running snap. Returns `true` when it settled on this tick.
    pub fn advance(&mut self, now: Instant) -> bool {
        let Some(snap) = self.snap else {
            return false;
        };
        if snap.tween.is_finished(now) {
            self.offset_x = snap.to;
            self.page = snap.target;
            self.snap = None;
            return true;
        }
        self.offset_x = lerp(snap.from, snap.to, snap.tween.progress(now));
        false
    }

    /// Recycles cells of pages that left the viewport and configures cells
    /// for pages that entered it. Returns the remote loads to issue.
    pub fn sync(&mut self, delegate: &dyn PreviewDelegate, now: Instant) -> Vec<LoadRequest> {
        let visible = self.visible_pages();
        let is_visible = |page: usize| visible.as_ref().is_some_and(|r| r.contains(&page));

        for cell in &mut self.cells {
            if let Some(page) = cell.page().filter(|&page| !is_visible(page)) {
                tracing::debug!(page, "page did end displaying");
                cell.recycle(now);
            }
        }

        let mut requests = Vec::new();
        for page in visible.into_iter().flatten() {
            if self.slot_for_page(page).is_some() {
                continue;
            }
            let Some(slot) = self.cells.iter().position(|cell| cell.page().is_none()) else {
                invariant_violation!("no free cell for page {page}");
                continue;
            };
            let source = delegate.image_source(page);
            let placeholder = delegate.placeholder_image(page);
            tracing::debug!(page, slot, "page will display");
            if let Some((url, generation)) =
                self.cells[slot].configure(page, source, placeholder, now)
            {
                requests.push(LoadRequest {
                    ticket: LoadTicket {
                        slot,
                        page,
                        generation,
                    },
                    url,
                });
            }
        }
        requests
    }

    /// Applies a load completion. Stale tickets are dropped.
    pub fn complete_load(&mut self, ticket: LoadTicket, result: Result<Bitmap, LoadError>) -> bool {
        let Some(cell) = self.cells.get_mut(ticket.slot) else {
            invariant_violation!("load ticket for unknown slot {}", ticket.slot);
            return false;
        };
        if cell.page() != Some(ticket.page) {
            tracing::debug!(?ticket, "dropping load for a recycled cell");
            return false;
        }
        cell.complete_load(ticket.generation, result)
    }

    /// Re-lays out every cell for a new page size, keeping the current page.
    pub fn set_page_size(&mut self, page_size: Size, now: Instant) {
        if self.page_size == page_size {
            return;
        }
        let index = self.resting_page();
        self.page_size = page_size;
        for cell in &mut self.cells {
            cell.set_viewport(page_size, now);
        }
        self.snap = None;
        self.drag_origin = None;
        self.page = index;
        self.offset_x = self.page_origin_x(index);
    }

    /// Page the strip settles on once any snap or drag is over.
    fn resting_page(&self) -> usize {
        match self.snap {
            Some(snap) => snap.target,
            None => self.current_index(),
        }
    }

    fn slot_for_page(&self, page: usize) -> Option<usize> {
        self.cells.iter().position(|cell| cell.page() == Some(page))
    }

    #[must_use]
    pub fn cell_for_page(&self, page: usize) -> Option<&cell::State> {
        let slot = self.slot_for_page(page)?;
        self.cells.get(slot)
    }

    pub fn cell_for_page_mut(&mut self, page: usize) -> Option<&mut cell::State> {
        let slot = self.slot_for_page(page)?;
        self.cells.get_mut(slot)
    }

    /// Cells currently showing a page, with their page index.
    pub fn live_cells(&self) -> impl Iterator<Item = (usize, &cell::State)> {
        self.cells
            .iter()
            .filter_map(|cell| cell.page().map(|page| (page, cell)))
    }

    /// Advances zoom animations of every live cell. Returns `true` if any is
    /// still running.
    pub fn advance_cells(&mut self, now: Instant) -> bool {
        let mut animating = false;
        for cell in &mut self.cells {
            cell.advance(now);
            animating |= cell.is_zoom_animating();
        }
        animating
    }
}

// SPDX-License-Identifier: MPL-2.0
//! Drag-to-dismiss gesture engine.
//!
//! One continuous vertical drag over a fitted page moves a floating copy of
//! the page image: it follows the finger, shrinks toward a small square and
//! fades the backdrop as the drag progresses. On release the gesture either
//! commits (the copy flies into the host's destination view) or cancels (it
//! flies back to where it started).
//!
//! ```text
//! Inactive ──Began (zoom 1)──▶ Tracking ──Ended/Cancelled──▶ Resolving ──tick──▶ Inactive
//! ```

use crate::config::DISMISS_TARGET_EDGE;
use crate::domain::preview::{DragProgress, ZoomFactor};
use crate::media::Bitmap;
use crate::ui::animation::{lerp, Transition, TransitionFrame};
use crate::ui::preview::geometry::centered_target;
use iced::{Point, Rectangle, Size, Vector};
use std::time::Instant;

/// Phase of a drag sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Began,
    Changed,
    Ended,
    Cancelled,
}

/// One drag sample, consumed once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSample {
    /// Finger movement since the previous sample.
    pub translation_delta: Vector,
    pub phase: GesturePhase,
}

impl GestureSample {
    #[must_use]
    pub fn new(phase: GesturePhase, translation_delta: Vector) -> Self {
        Self {
            translation_delta,
            phase,
        }
    }
}

/// Terminal outcome of a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Commit,
    Cancel,
}

/// The page the gesture operates on.
#[derive(Debug, Clone)]
pub struct ActivePage {
    pub index: usize,
    /// On-screen display rect, viewer coordinates.
    pub rect: Rectangle,
    /// Committed image of the page.
    pub image: Bitmap,
    pub zoom: ZoomFactor,
}

/// What the engine needs from the container while it runs.
pub trait DismissContext {
    fn viewport(&self) -> Size;

    /// The active page, if it has a committed image.
    fn active_page(&self) -> Option<ActivePage>;

    /// The host's destination rect for `page` in viewer coordinates, if it
    /// supplied an attached view.
    fn destination(&self, page: usize) -> Option<Rectangle>;
}

#[derive(Debug, Clone)]
struct Tracking {
    /// Page the drag began on.
    page: usize,
    origin: Rectangle,
    image: Bitmap,
    translation: Vector,
    viewport: Size,
}

impl Tracking {
    fn progress(&self) -> DragProgress {
        DragProgress::from_travel(self.translation.y, self.viewport.height)
    }

    /// Live rect: shrinks toward the target edge with the origin's own aspect
    /// ratio, centered under the finger.
    fn live_rect(&self) -> Rectangle {
        let progress = self.progress().value();
        let height = lerp(self.origin.height, DISMISS_TARGET_EDGE, progress);
        let width = if self.origin.height > 0.0 {
            height * self.origin.width / self.origin.height
        } else {
            height
        };
        let center = self.origin.center() + self.translation;
        Rectangle {
            x: center.x - width / 2.0,
            y: center.y - height / 2.0,
            width,
            height,
        }
    }

    fn frame(&self) -> TransitionFrame {
        let current = self.live_rect();
        TransitionFrame {
            origin_rect: self.origin,
            current_rect: current,
            target_rect: square_at(current.center()),
            progress: self.progress().value(),
        }
    }
}

#[derive(Debug, Clone)]
struct Resolving {
    outcome: Resolution,
    image: Bitmap,
    transition: Transition,
}

#[derive(Debug, Clone, Default)]
enum Phase {
    #[default]
    Inactive,
    Tracking(Tracking),
    Resolving(Resolving),
}

/// Effects produced by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Tracking started: hide the pager and the overlay chrome.
    Began,
    Moved,
    /// Released: the resolve animation is running.
    Resolving(Resolution),
}

#[derive(Debug, Clone, Default)]
pub struct DismissEngine {
    phase: Phase,
}

impl DismissEngine {
    /// Feeds one drag sample.
    pub fn handle(
        &mut self,
        sample: GestureSample,
        context: &impl DismissContext,
        now: Instant,
    ) -> Effect {
        match sample.phase {
            GesturePhase::Began => self.begin(sample.translation_delta, context),
            GesturePhase::Changed => {
                let Phase::Tracking(tracking) = &mut self.phase else {
                    return Effect::None;
                };
                tracking.translation = tracking.translation + sample.translation_delta;
                Effect::Moved
            }
            GesturePhase::Ended | GesturePhase::Cancelled => {
                if let Phase::Tracking(tracking) = &mut self.phase {
                    tracking.translation = tracking.translation + sample.translation_delta;
                }
                let outcome = match &self.phase {
                    Phase::Tracking(tracking) if tracking.progress().commits() => {
                        Resolution::Commit
                    }
                    Phase::Tracking(_) => Resolution::Cancel,
                    _ => return Effect::None,
                };
                self.resolve(outcome, context, now)
            }
        }
    }

    fn begin(&mut self, translation: Vector, context: &impl DismissContext) -> Effect {
        if !matches!(self.phase, Phase::Inactive) {
            tracing::debug!("dismiss drag ignored while a previous one resolves");
            return Effect::None;
        }
        let Some(page) = context.active_page() else {
            return Effect::None;
        };
        if !page.zoom.is_fit() {
            return Effect::None;
        }

        tracing::debug!(page = page.index, origin = ?page.rect, "dismiss drag began");
        self.phase = Phase::Tracking(Tracking {
            page: page.index,
            origin: page.rect,
            image: page.image,
            translation,
            viewport: context.viewport(),
        });
        Effect::Began
    }

    /// Resolves a tracking drag as cancelled whatever its progress, e.g. when
    /// a second finger turns the gesture into a pinch.
    pub fn abort(&mut self, context: &impl DismissContext, now: Instant) -> Effect {
        if !matches!(self.phase, Phase::Tracking(_)) {
            return Effect::None;
        }
        self.resolve(Resolution::Cancel, context, now)
    }

    fn resolve(
        &mut self,
        outcome: Resolution,
        context: &impl DismissContext,
        now: Instant,
    ) -> Effect {
        let Phase::Tracking(tracking) = std::mem::take(&mut self.phase) else {
            return Effect::None;
        };
        let current = tracking.live_rect();
        let opacity = 1.0 - tracking.progress().value();

        let transition = match outcome {
            Resolution::Commit => {
                let target = context.destination(tracking.page).unwrap_or_else(|| {
                    tracing::debug!("no attached destination, shrinking to center");
                    centered_target(context.viewport())
                });
                Transition::new(current, target, now).with_opacity(opacity, 0.0)
            }
            Resolution::Cancel => {
                Transition::new(current, tracking.origin, now).with_opacity(opacity, 1.0)
            }
        };

        tracing::info!(?outcome, page = tracking.page, progress = tracking.progress().value(), "dismiss drag released");
        self.phase = Phase::Resolving(Resolving {
            outcome,
            image: tracking.image,
            transition,
        });
        Effect::Resolving(outcome)
    }

    /// Advances the resolve animation. Returns the outcome exactly once, on
    /// the tick that finishes it.
    pub fn advance(&mut self, now: Instant) -> Option<Resolution> {
        let Phase::Resolving(resolving) = &mut self.phase else {
            return None;
        };
        if !resolving.transition.advance(now) {
            return None;
        }
        let outcome = resolving.outcome;
        self.phase = Phase::Inactive;
        Some(outcome)
    }

    #[must_use]
    pub fn is_inactive(&self) -> bool {
        matches!(self.phase, Phase::Inactive)
    }

    #[must_use]
    pub fn is_resolving(&self) -> bool {
        matches!(self.phase, Phase::Resolving(_))
    }

    /// Drag progress while tracking.
    #[must_use]
    pub fn progress(&self) -> Option<DragProgress> {
        match &self.phase {
            Phase::Tracking(tracking) => Some(tracking.progress()),
            _ => None,
        }
    }

    /// Frame of the floating transition view, if one exists.
    #[must_use]
    pub fn frame(&self, now: Instant) -> Option<TransitionFrame> {
        match &self.phase {
            Phase::Inactive => None,
            Phase::Tracking(tracking) => Some(tracking.frame()),
            Phase::Resolving(resolving) => Some(resolving.transition.frame(now)),
        }
    }

    /// Image carried by the transition view.
    #[must_use]
    pub fn image(&self) -> Option<&Bitmap> {
        match &self.phase {
            Phase::Inactive => None,
            Phase::Tracking(tracking) => Some(&tracking.image),
            Phase::Resolving(resolving) => Some(&resolving.image),
        }
    }

    /// Backdrop opacity driven by the gesture, `None` when inactive.
    #[must_use]
    pub fn background_opacity(&self, now: Instant) -> Option<f32> {
        match &self.phase {
            Phase::Inactive => None,
            Phase::Tracking(tracking) => Some(1.0 - tracking.progress().value()),
            Phase::Resolving(resolving) => Some(resolving.transition.opacity(now)),
        }
    }
}

fn square_at(center: Point) -> Rectangle {
    let half = DISMISS_TARGET_EDGE / 2.0;
    Rectangle {
        x: center.x - half,
        y: center.y - half,
        width: DISMISS_TARGET_EDGE,
        height: DISMISS_TARGET_EDGE,
    }
}

// SPDX-License-Identifier: MPL-2.0
//! Preview component encapsulating the session state and update logic.
//!
//! The component presents the pager over the host with a transition from the
//! tapped thumbnail, arbitrates touch input between zoom, paging and the
//! dismiss drag, and tears the session down with exactly one
//! [`PreviewDelegate::did_dismiss`] call.
//!
//! Host callbacks are reached through the `&dyn PreviewDelegate` passed to
//! every entry point; the component never stores it.

use super::cell;
use super::delegate::{PreviewDelegate, ViewHandle};
use super::dismiss::{
    self, ActivePage, DismissContext, DismissEngine, GesturePhase, GestureSample, Resolution,
};
use super::geometry::{centered_rect, fit_rect};
use super::pager::{LoadRequest, LoadTicket, Pager};
use crate::config::{PreviewConfig, ANIMATION_TICK, TRANSITION_DURATION};
use crate::error::LoadError;
use crate::media::{Bitmap, ImageLoader};
use crate::ui::animation::{Transition, Tween};
use crate::ui::state::{DragAxis, DragSample, DragState, PinchState, Tap, TapState};
use iced::touch::Finger;
use iced::{Element, Point, Rectangle, Size, Subscription, Task, Vector};
use std::sync::Arc;
use std::time::Instant;

/// Finger id used for the left mouse button.
pub const MOUSE_FINGER: Finger = Finger(u64::MAX);

/// Pointer input in viewer coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Pressed { finger: Finger, position: Point },
    Moved { finger: Finger, position: Point },
    Released { finger: Finger, position: Point },
    /// The platform cancelled the touch.
    Lost { finger: Finger },
}

/// Messages handled by the preview.
#[derive(Debug, Clone)]
pub enum Message {
    Tick(Instant),
    Resized(Size),
    Pointer(PointerEvent),
    /// A pointer event that arrived together with a new canvas size. The
    /// resize is applied first.
    PointerResized(Size, PointerEvent),
    ImageLoaded(LoadTicket, Result<Bitmap, LoadError>),
    SaveRequested,
    /// Programmatic dismissal, as if the fitted page was tapped.
    DismissRequested,
}

/// Effects reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// The present transition finished; the pager is interactive.
    Presented,
    /// The session is torn down and `did_dismiss` was called.
    Dismissed,
}

/// Public view of a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub current_index: usize,
    pub page_count: usize,
}

#[derive(Debug, Clone)]
enum Stage {
    Presenting {
        transition: Transition,
        image: Option<Bitmap>,
    },
    Interactive,
    /// Programmatic dismissal into the host's destination view.
    Flying {
        transition: Transition,
        image: Bitmap,
    },
    /// Programmatic dismissal without a destination: the whole view fades.
    Fading { tween: Tween },
}

/// What a single-finger pan drives once its axis is locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PanMode {
    Content,
    Page,
    Dismiss,
}

#[derive(Debug, Clone, Default)]
enum Gesture {
    #[default]
    Idle,
    Pan {
        finger: Finger,
        drag: DragState,
        mode: Option<PanMode>,
    },
    Pinch(PinchState),
}

enum Movement {
    Pan(DragSample, Option<PanMode>),
    Pinch(f32, Point),
}

#[derive(Debug, Default)]
struct Outcome {
    effect: Option<Effect>,
    loads: Vec<LoadRequest>,
    teardown: bool,
}

impl Outcome {
    fn loads(loads: Vec<LoadRequest>) -> Self {
        Self {
            loads,
            ..Self::default()
        }
    }

    fn teardown() -> Self {
        Self {
            teardown: true,
            ..Self::default()
        }
    }

    fn absorb(&mut self, later: Outcome) {
        self.effect = later.effect.or(self.effect);
        self.loads.extend(later.loads);
        self.teardown |= later.teardown;
    }
}

#[derive(Debug, Clone)]
struct Active {
    session: Session,
    viewport: Size,
    pager: Pager,
    stage: Stage,
    dismiss: DismissEngine,
    gesture: Gesture,
    taps: TapState,
    fingers: Vec<(Finger, Point)>,
}

/// Preview component state.
#[derive(Debug)]
pub struct State {
    config: PreviewConfig,
    loader: Arc<dyn ImageLoader>,
    active: Option<Active>,
    /// Instant of the latest update, used for drawing.
    now: Instant,
}

impl State {
    #[must_use]
    pub fn new(config: PreviewConfig, loader: Arc<dyn ImageLoader>) -> Self {
        Self {
            config,
            loader,
            active: None,
            now: Instant::now(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    /// Replaces the configuration. Takes effect at the next `show`.
    pub fn set_config(&mut self, config: PreviewConfig) {
        self.config = config;
    }

    #[must_use]
    pub fn is_presented(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.active.as_ref().map(|active| active.session)
    }

    /// Presents the preview from `origin`, the thumbnail the user tapped.
    pub fn show(
        &mut self,
        origin: &ViewHandle,
        viewport: Size,
        delegate: &dyn PreviewDelegate,
    ) -> Task<Message> {
        let requests = self.present(origin, viewport, delegate, Instant::now());
        self.load_tasks(requests)
    }

    /// Starts a session at `now`. Returns the image loads to issue.
    pub fn present(
        &mut self,
        origin: &ViewHandle,
        viewport: Size,
        delegate: &dyn PreviewDelegate,
        now: Instant,
    ) -> Vec<LoadRequest> {
        if self.active.is_some() {
            tracing::warn!("preview is already shown, ignoring show");
            return Vec::new();
        }

        let page_count = delegate.number_of_images();
        let mut pager = Pager::new(page_count, viewport);
        let default_index = self.config.default_display_index;
        if default_index > 0 && default_index < page_count {
            pager.jump_to(default_index);
        }
        let requests = pager.sync(delegate, now);

        let from = origin.frame_in_viewer().unwrap_or_else(|| {
            tracing::debug!("origin view is detached, presenting from the center");
            centered_rect(viewport, origin.frame.size())
        });
        let to = match origin.image().filter(|image| image.has_valid_size()) {
            Some(image) => fit_rect(image.size(), viewport),
            None => centered_rect(viewport, origin.frame.size()),
        };

        let current_index = pager.current_index();
        tracing::info!(page_count, current_index, "preview shown");
        self.now = now;
        self.active = Some(Active {
            session: Session {
                current_index,
                page_count,
            },
            viewport,
            pager,
            stage: Stage::Presenting {
                transition: Transition::new(from, to, now).with_opacity(0.0, 1.0),
                image: origin.image().cloned(),
            },
            dismiss: DismissEngine::default(),
            gesture: Gesture::Idle,
            taps: TapState::default(),
            fingers: Vec::new(),
        });
        requests
    }

    /// Handle a preview message.
    pub fn handle_message(
        &mut self,
        message: Message,
        delegate: &dyn PreviewDelegate,
    ) -> (Effect, Task<Message>) {
        let now = match message {
            Message::Tick(at) => at,
            _ => Instant::now(),
        };
        let (effect, requests) = self.update(message, delegate, now);
        (effect, self.load_tasks(requests))
    }

    /// Applies `message` at `now`. Returns the effect and the image loads to
    /// issue.
    pub fn update(
        &mut self,
        message: Message,
        delegate: &dyn PreviewDelegate,
        now: Instant,
    ) -> (Effect, Vec<LoadRequest>) {
        let Some(active) = self.active.as_mut() else {
            if let Message::ImageLoaded(ticket, _) = &message {
                tracing::debug!(?ticket, "image load finished after teardown");
            }
            return (Effect::None, Vec::new());
        };
        self.now = now;

        let outcome = match message {
            Message::Tick(_) => active.tick(delegate, now),
            Message::Resized(size) => active.resize(size, delegate, now),
            Message::Pointer(event) => active.pointer(event, delegate, now),
            Message::PointerResized(size, event) => {
                let mut outcome = active.resize(size, delegate, now);
                outcome.absorb(active.pointer(event, delegate, now));
                outcome
            }
            Message::ImageLoaded(ticket, result) => {
                active.pager.complete_load(ticket, result);
                Outcome::default()
            }
            Message::SaveRequested => {
                if self.config.support_save_image {
                    let index = active.session.current_index;
                    let image = active.pager.cell_for_page(index).and_then(cell::State::image);
                    tracing::debug!(index, loaded = image.is_some(), "save requested");
                    delegate.save_requested(index, image);
                }
                Outcome::default()
            }
            Message::DismissRequested => {
                active.request_dismiss(delegate, now);
                Outcome::default()
            }
        };

        if outcome.teardown {
            self.active = None;
            tracing::info!("preview dismissed");
            delegate.did_dismiss();
            return (Effect::Dismissed, Vec::new());
        }
        (outcome.effect.unwrap_or(Effect::None), outcome.loads)
    }

    fn load_tasks(&self, requests: Vec<LoadRequest>) -> Task<Message> {
        if requests.is_empty() {
            return Task::none();
        }
        Task::batch(requests.into_iter().map(|LoadRequest { ticket, url }| {
            tracing::debug!(?ticket, %url, "loading page image");
            Task::perform(self.loader.load(&url), move |result| {
                Message::ImageLoaded(ticket, result)
            })
        }))
    }

    /// Ticks only run while something moves on their own.
    pub fn subscription(&self) -> Subscription<Message> {
        if self.active.as_ref().is_some_and(Active::is_animating) {
            iced::time::every(ANIMATION_TICK).map(Message::Tick)
        } else {
            Subscription::none()
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        super::view::view(self)
    }

    /// "current/total" counter text, while the chrome is visible.
    #[must_use]
    pub fn index_label(&self) -> Option<String> {
        let active = self.active.as_ref()?;
        if !self.config.show_index_label || !active.shows_chrome() {
            return None;
        }
        let session = active.session;
        (session.page_count > 0)
            .then(|| format!("{}/{}", session.current_index + 1, session.page_count))
    }

    #[must_use]
    pub fn shows_save_button(&self) -> bool {
        self.config.support_save_image && self.active.as_ref().is_some_and(Active::shows_chrome)
    }

    /// What to draw at the latest update instant.
    #[must_use]
    pub fn scene(&self) -> Option<Scene<'_>> {
        self.scene_at(self.now)
    }

    /// What to draw at `now`.
    #[must_use]
    pub fn scene_at(&self, now: Instant) -> Option<Scene<'_>> {
        self.active.as_ref().map(|active| active.scene(now))
    }
}

/// A bitmap drawn at a rect.
#[derive(Debug, Clone, Copy)]
pub struct Sprite<'a> {
    pub image: &'a Bitmap,
    pub rect: Rectangle,
}

/// Everything the canvas draws for one frame.
#[derive(Debug, Clone, Default)]
pub struct Scene<'a> {
    /// Viewport the scene was laid out for.
    pub viewport: Size,
    /// Black backdrop opacity.
    pub backdrop: f32,
    /// Opacity applied to the whole preview.
    pub opacity: f32,
    /// Page images, in viewer coordinates.
    pub pages: Vec<Sprite<'a>>,
    /// Pages still waiting for their image, by frame.
    pub loading: Vec<Rectangle>,
    /// The floating transition view.
    pub floating: Option<Sprite<'a>>,
}

impl Active {
    fn is_animating(&self) -> bool {
        !matches!(self.stage, Stage::Interactive)
            || self.dismiss.is_resolving()
            || self.pager.is_snapping()
            || self.taps.is_pending()
            || self
                .pager
                .live_cells()
                .any(|(_, cell)| cell.is_zoom_animating())
    }

    fn accepts_input(&self) -> bool {
        matches!(self.stage, Stage::Interactive) && !self.dismiss.is_resolving()
    }

    fn shows_chrome(&self) -> bool {
        matches!(self.stage, Stage::Interactive) && self.dismiss.is_inactive()
    }

    fn shows_pager(&self) -> bool {
        match self.stage {
            Stage::Interactive => self.dismiss.is_inactive(),
            Stage::Fading { .. } => true,
            Stage::Presenting { .. } | Stage::Flying { .. } => false,
        }
    }

    /// Viewer point to the coordinates of the current page.
    fn to_page(&self, point: Point) -> Point {
        point - Vector::new(self.pager.page_x(self.session.current_index), 0.0)
    }

    fn sync(&mut self, delegate: &dyn PreviewDelegate, now: Instant) -> Vec<LoadRequest> {
        let loads = self.pager.sync(delegate, now);
        let index = self.pager.current_index();
        if index != self.session.current_index {
            tracing::debug!(from = self.session.current_index, to = index, "current page changed");
            self.session.current_index = index;
        }
        loads
    }

    fn tick(&mut self, delegate: &dyn PreviewDelegate, now: Instant) -> Outcome {
        let mut outcome = Outcome::default();

        match &mut self.stage {
            Stage::Presenting { transition, .. } => {
                if transition.advance(now) {
                    tracing::debug!("present transition finished");
                    self.stage = Stage::Interactive;
                    outcome.effect = Some(Effect::Presented);
                }
            }
            Stage::Flying { transition, .. } => {
                if transition.advance(now) {
                    return Outcome::teardown();
                }
            }
            Stage::Fading { tween } => {
                if tween.is_finished(now) {
                    return Outcome::teardown();
                }
            }
            Stage::Interactive => {}
        }

        match self.dismiss.advance(now) {
            Some(Resolution::Commit) => return Outcome::teardown(),
            Some(Resolution::Cancel) => tracing::debug!("dismiss drag cancelled, pager restored"),
            None => {}
        }

        // A dismiss drag holds the strip where it was, so the page it lifted
        // stays the current one.
        if self.pager.is_snapping() && self.dismiss.is_inactive() {
            self.pager.advance(now);
            outcome.loads = self.sync(delegate, now);
        }
        self.pager.advance_cells(now);

        if let Some(Tap::Single(_)) = self.taps.tick(now) {
            self.single_tap(delegate, now);
        }
        outcome
    }

    fn resize(&mut self, size: Size, delegate: &dyn PreviewDelegate, now: Instant) -> Outcome {
        if size == self.viewport {
            return Outcome::default();
        }
        tracing::debug!(?size, "preview resized");
        self.viewport = size;
        self.pager.set_page_size(size, now);
        let mut outcome = Outcome::loads(self.sync(delegate, now));

        // The present target was fitted to the old size.
        if let Stage::Presenting { transition, .. } = &mut self.stage {
            if transition.interrupt() {
                tracing::debug!("present transition cut short by resize");
                self.stage = Stage::Interactive;
                outcome.effect = Some(Effect::Presented);
            }
        }
        outcome
    }

    fn single_tap(&mut self, delegate: &dyn PreviewDelegate, now: Instant) {
        if !self.shows_chrome() {
            return;
        }
        let index = self.session.current_index;
        let effect = match self.pager.cell_for_page_mut(index) {
            Some(cell) => cell.handle(cell::Message::SingleTap, now),
            None => cell::Effect::RequestDismiss,
        };
        if effect == cell::Effect::RequestDismiss {
            self.request_dismiss(delegate, now);
        }
    }

    fn request_dismiss(&mut self, delegate: &dyn PreviewDelegate, now: Instant) {
        if !self.shows_chrome() {
            tracing::debug!("dismiss already in progress");
            return;
        }

        let index = self.session.current_index;
        let flight = self.pager.cell_for_page(index).and_then(|cell| {
            let image = cell.image()?.clone();
            let rect = cell.display_rect()? + Vector::new(self.pager.page_x(index), 0.0);
            Some((image, rect))
        });
        let destination = delegate
            .dismiss_destination(index)
            .and_then(|view| view.frame_in_viewer());

        self.gesture = Gesture::Idle;
        self.taps.clear();
        self.stage = match (flight, destination) {
            (Some((image, from)), Some(to)) => {
                tracing::info!(index, "dismissing into destination view");
                Stage::Flying {
                    transition: Transition::new(from, to, now).with_opacity(1.0, 0.0),
                    image,
                }
            }
            _ => {
                tracing::info!(index, "dismissing with fade");
                Stage::Fading {
                    tween: Tween::new(now, TRANSITION_DURATION),
                }
            }
        };
    }

    fn pointer(
        &mut self,
        event: PointerEvent,
        delegate: &dyn PreviewDelegate,
        now: Instant,
    ) -> Outcome {
        match event {
            PointerEvent::Pressed { finger, position } => {
                self.finger_down(finger, position, delegate, now);
                Outcome::default()
            }
            PointerEvent::Moved { finger, position } => {
                Outcome::loads(self.finger_moved(finger, position, delegate, now))
            }
            PointerEvent::Released { finger, position } => {
                self.finger_up(finger, Some(position), delegate, now);
                Outcome::default()
            }
            PointerEvent::Lost { finger } => {
                self.finger_up(finger, None, delegate, now);
                Outcome::default()
            }
        }
    }

    fn finger_down(
        &mut self,
        finger: Finger,
        position: Point,
        delegate: &dyn PreviewDelegate,
        now: Instant,
    ) {
        if !self.accepts_input() {
            return;
        }
        self.fingers.retain(|(id, _)| *id != finger);
        self.fingers.push((finger, position));

        match self.fingers.as_slice() {
            [_] => {
                let mut drag = DragState::default();
                drag.start(position);
                self.gesture = Gesture::Pan {
                    finger,
                    drag,
                    mode: None,
                };
            }
            [(_, a), (_, b)] => {
                let pinch = PinchState::start(*a, *b);
                match std::mem::take(&mut self.gesture) {
                    Gesture::Pan {
                        mode: Some(PanMode::Dismiss),
                        ..
                    } => {
                        let context = PageContext {
                            pager: &self.pager,
                            index: self.session.current_index,
                            viewport: self.viewport,
                            delegate,
                        };
                        self.dismiss.abort(&context, now);
                    }
                    Gesture::Pan {
                        mode: Some(PanMode::Page),
                        ..
                    } => self.pager.release(now),
                    _ => {}
                }
                self.taps.clear();
                self.gesture = Gesture::Pinch(pinch);
            }
            _ => {}
        }
    }

    fn finger_moved(
        &mut self,
        finger: Finger,
        position: Point,
        delegate: &dyn PreviewDelegate,
        now: Instant,
    ) -> Vec<LoadRequest> {
        let Some(entry) = self.fingers.iter_mut().find(|(id, _)| *id == finger) else {
            return Vec::new();
        };
        entry.1 = position;

        let movement = match &mut self.gesture {
            Gesture::Idle => return Vec::new(),
            Gesture::Pinch(pinch) => {
                let [(_, a), (_, b), ..] = self.fingers.as_slice() else {
                    return Vec::new();
                };
                match pinch.update(*a, *b) {
                    Some((scale, midpoint)) => Movement::Pinch(scale, midpoint),
                    None => return Vec::new(),
                }
            }
            Gesture::Pan {
                finger: owner,
                drag,
                mode,
            } => {
                if *owner != finger {
                    return Vec::new();
                }
                match drag.update(position) {
                    Some(sample) => Movement::Pan(sample, *mode),
                    None => return Vec::new(),
                }
            }
        };

        match movement {
            Movement::Pinch(scale, midpoint) => {
                let anchor = self.to_page(midpoint);
                if let Some(cell) = self.pager.cell_for_page_mut(self.session.current_index) {
                    cell.handle(cell::Message::Pinch { scale, anchor }, now);
                }
                Vec::new()
            }
            Movement::Pan(sample, Some(mode)) => self.apply_pan(mode, sample.delta, delegate, now),
            Movement::Pan(sample, None) => {
                let Some(axis) = sample.locked else {
                    return Vec::new();
                };
                let mode = self.choose_mode(axis, &sample, delegate, now);
                if let Gesture::Pan { mode: slot, .. } = &mut self.gesture {
                    *slot = Some(mode);
                }
                self.taps.clear();
                if mode == PanMode::Dismiss {
                    Vec::new()
                } else {
                    self.apply_pan(mode, sample.delta, delegate, now)
                }
            }
        }
    }

    /// Picks what a pan drives once it leaves the touch slop.
    fn choose_mode(
        &mut self,
        axis: DragAxis,
        sample: &DragSample,
        delegate: &dyn PreviewDelegate,
        now: Instant,
    ) -> PanMode {
        let index = self.session.current_index;
        let cell = self.pager.cell_for_page(index);
        if cell.is_some_and(|cell| !cell.zoom().is_fit()) {
            return PanMode::Content;
        }
        match axis {
            DragAxis::Horizontal => PanMode::Page,
            DragAxis::Vertical => {
                if cell.is_some_and(|cell| cell.can_scroll_vertically(sample.translation.y)) {
                    return PanMode::Content;
                }
                let context = PageContext {
                    pager: &self.pager,
                    index,
                    viewport: self.viewport,
                    delegate,
                };
                let began = GestureSample::new(GesturePhase::Began, sample.translation);
                match self.dismiss.handle(began, &context, now) {
                    dismiss::Effect::Began => PanMode::Dismiss,
                    _ => PanMode::Content,
                }
            }
        }
    }

    fn apply_pan(
        &mut self,
        mode: PanMode,
        delta: Vector,
        delegate: &dyn PreviewDelegate,
        now: Instant,
    ) -> Vec<LoadRequest> {
        match mode {
            PanMode::Content => {
                if let Some(cell) = self.pager.cell_for_page_mut(self.session.current_index) {
                    cell.handle(cell::Message::Pan(delta), now);
                }
                Vec::new()
            }
            PanMode::Page => {
                self.pager.drag_by(delta.x);
                self.sync(delegate, now)
            }
            PanMode::Dismiss => {
                let context = PageContext {
                    pager: &self.pager,
                    index: self.session.current_index,
                    viewport: self.viewport,
                    delegate,
                };
                let changed = GestureSample::new(GesturePhase::Changed, delta);
                self.dismiss.handle(changed, &context, now);
                Vec::new()
            }
        }
    }

    fn finger_up(
        &mut self,
        finger: Finger,
        position: Option<Point>,
        delegate: &dyn PreviewDelegate,
        now: Instant,
    ) {
        let Some(at) = self.fingers.iter().position(|(id, _)| *id == finger) else {
            return;
        };
        self.fingers.remove(at);

        match std::mem::take(&mut self.gesture) {
            Gesture::Pan {
                finger: owner,
                mut drag,
                mode,
            } if owner == finger => {
                drag.stop();
                match mode {
                    None => {
                        if let Some(position) = position {
                            self.tap(position, now);
                        }
                    }
                    Some(PanMode::Page) => self.pager.release(now),
                    Some(PanMode::Dismiss) => {
                        let phase = if position.is_some() {
                            GesturePhase::Ended
                        } else {
                            GesturePhase::Cancelled
                        };
                        let context = PageContext {
                            pager: &self.pager,
                            index: self.session.current_index,
                            viewport: self.viewport,
                            delegate,
                        };
                        let ended = GestureSample::new(phase, Vector::ZERO);
                        self.dismiss.handle(ended, &context, now);
                    }
                    Some(PanMode::Content) => {}
                }
            }
            Gesture::Pinch(_) => {}
            other => self.gesture = other,
        }
    }

    fn tap(&mut self, position: Point, now: Instant) {
        if let Some(Tap::Double(point)) = self.taps.tap(position, now) {
            let anchor = self.to_page(point);
            if let Some(cell) = self.pager.cell_for_page_mut(self.session.current_index) {
                cell.handle(cell::Message::DoubleTap(anchor), now);
            }
        }
    }

    fn scene(&self, now: Instant) -> Scene<'_> {
        let mut scene = Scene {
            viewport: self.viewport,
            backdrop: 1.0,
            opacity: 1.0,
            ..Scene::default()
        };

        if self.shows_pager() {
            for (page, cell) in self.pager.live_cells() {
                let shift = Vector::new(self.pager.page_x(page), 0.0);
                if let (Some(image), Some(rect)) = (cell.displayed(), cell.rendered_rect(now)) {
                    scene.pages.push(Sprite {
                        image,
                        rect: rect + shift,
                    });
                }
                if cell.is_fetching() {
                    let page_rect = Rectangle::new(Point::ORIGIN, self.viewport) + shift;
                    scene.loading.push(page_rect);
                }
            }
        }

        match &self.stage {
            Stage::Presenting { transition, image } => {
                scene.backdrop = transition.opacity(now);
                scene.floating = image.as_ref().map(|image| Sprite {
                    image,
                    rect: transition.frame(now).current_rect,
                });
            }
            Stage::Flying { transition, image } => {
                scene.backdrop = transition.opacity(now);
                scene.floating = Some(Sprite {
                    image,
                    rect: transition.frame(now).current_rect,
                });
            }
            Stage::Fading { tween } => {
                scene.opacity = 1.0 - tween.progress(now);
            }
            Stage::Interactive => {
                scene.backdrop = self.dismiss.background_opacity(now).unwrap_or(1.0);
                scene.floating = self
                    .dismiss
                    .image()
                    .zip(self.dismiss.frame(now))
                    .map(|(image, frame)| Sprite {
                        image,
                        rect: frame.current_rect,
                    });
            }
        }
        scene
    }
}

/// The container as seen by the dismiss engine.
struct PageContext<'a> {
    pager: &'a Pager,
    index: usize,
    viewport: Size,
    delegate: &'a dyn PreviewDelegate,
}

impl DismissContext for PageContext<'_> {
    fn viewport(&self) -> Size {
        self.viewport
    }

    fn active_page(&self) -> Option<ActivePage> {
        let Some(cell) = self.pager.cell_for_page(self.index) else {
            if self.index < self.pager.page_count() {
                crate::invariant_violation!("no cell for current page {}", self.index);
            }
            return None;
        };
        let image = cell.image()?.clone();
        let rect = cell.display_rect()? + Vector::new(self.pager.page_x(self.index), 0.0);
        Some(ActivePage {
            index: self.index,
            rect,
            image,
            zoom: cell.zoom().factor(),
        })
    }

    fn destination(&self, page: usize) -> Option<Rectangle> {
        let view = self.delegate.dismiss_destination(page)?;
        let frame = view.frame_in_viewer();
        if frame.is_none() {
            tracing::debug!(page, "dismiss destination is detached");
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{FsImageLoader, ImageSource};
    use crate::test_utils::{assert_abs_diff_eq, solid_bitmap};
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct Host {
        count: usize,
        /// Serve pages by URL instead of in memory.
        remote: bool,
        destination: Option<ViewHandle>,
        /// Pages the destination was asked for.
        asked: RefCell<Vec<usize>>,
        dismissed: Cell<usize>,
        saved: RefCell<Vec<(usize, bool)>>,
    }

    impl PreviewDelegate for Host {
        fn number_of_images(&self) -> usize {
            self.count
        }

        fn image_source(&self, index: usize) -> ImageSource {
            if self.remote {
                return ImageSource::Link(format!("https://example.com/{index}.png"));
            }
            // Widths tell the pages apart.
            solid_bitmap(800 + 100 * index as u32, 400).into()
        }

        fn dismiss_destination(&self, index: usize) -> Option<ViewHandle> {
            self.asked.borrow_mut().push(index);
            self.destination.clone()
        }

        fn save_requested(&self, index: usize, image: Option<&Bitmap>) {
            self.saved.borrow_mut().push((index, image.is_some()));
        }

        fn did_dismiss(&self) {
            self.dismissed.set(self.dismissed.get() + 1);
        }
    }

    fn host(count: usize) -> Host {
        Host {
            count,
            ..Host::default()
        }
    }

    fn viewport() -> Size {
        Size::new(400.0, 800.0)
    }

    fn origin() -> ViewHandle {
        ViewHandle::attached(
            Rectangle::new(Point::new(10.0, 10.0), Size::new(80.0, 40.0)),
            Point::new(0.0, 100.0),
        )
        .with_image(solid_bitmap(80, 40))
    }

    fn preview(config: PreviewConfig) -> State {
        State::new(config, Arc::new(FsImageLoader))
    }

    /// Presents and runs the present transition to completion.
    fn shown(host: &Host, config: PreviewConfig, start: Instant) -> (State, Instant) {
        let mut state = preview(config);
        state.present(&origin(), viewport(), host, start);
        let settled = start + TRANSITION_DURATION;
        let (effect, _) = state.update(Message::Tick(settled), host, settled);
        assert_eq!(effect, Effect::Presented);
        (state, settled)
    }

    fn press(finger: u64, x: f32, y: f32) -> Message {
        Message::Pointer(PointerEvent::Pressed {
            finger: Finger(finger),
            position: Point::new(x, y),
        })
    }

    fn moved(finger: u64, x: f32, y: f32) -> Message {
        Message::Pointer(PointerEvent::Moved {
            finger: Finger(finger),
            position: Point::new(x, y),
        })
    }

    fn release(finger: u64, x: f32, y: f32) -> Message {
        Message::Pointer(PointerEvent::Released {
            finger: Finger(finger),
            position: Point::new(x, y),
        })
    }

    fn lost(finger: u64) -> Message {
        Message::Pointer(PointerEvent::Lost {
            finger: Finger(finger),
        })
    }

    fn send(state: &mut State, host: &Host, messages: &[Message], now: Instant) {
        for message in messages {
            state.update(message.clone(), host, now);
        }
    }

    #[test]
    fn present_jumps_to_default_index() {
        let host = host(3);
        let config = PreviewConfig {
            default_display_index: 1,
            ..PreviewConfig::default()
        };
        let mut state = preview(config);
        state.present(&origin(), viewport(), &host, Instant::now());

        assert_eq!(
            state.session(),
            Some(Session {
                current_index: 1,
                page_count: 3
            })
        );
    }

    #[test]
    fn out_of_range_default_index_stays_on_first_page() {
        let host = host(3);
        let config = PreviewConfig {
            default_display_index: 7,
            ..PreviewConfig::default()
        };
        let mut state = preview(config);
        state.present(&origin(), viewport(), &host, Instant::now());

        assert_eq!(state.session().map(|s| s.current_index), Some(0));
    }

    #[test]
    fn present_animates_origin_into_fit_rect() {
        let host = host(1);
        let start = Instant::now();
        let mut state = preview(PreviewConfig::default());
        state.present(&origin(), viewport(), &host, start);

        let scene = state.scene_at(start).expect("session is active");
        assert_abs_diff_eq!(scene.backdrop, 0.0);
        assert!(scene.pages.is_empty());
        let floating = scene.floating.expect("origin carries an image");
        assert_eq!(
            floating.rect,
            Rectangle::new(Point::new(10.0, 110.0), Size::new(80.0, 40.0))
        );

        let end = state
            .scene_at(start + TRANSITION_DURATION)
            .and_then(|scene| scene.floating)
            .expect("floating view until the completion tick");
        assert_eq!(end.rect, fit_rect(Size::new(80.0, 40.0), viewport()));
    }

    #[test]
    fn second_show_is_ignored() {
        let host = host(2);
        let mut state = preview(PreviewConfig::default());
        let now = Instant::now();
        state.present(&origin(), viewport(), &host, now);
        let loads = state.present(&origin(), viewport(), &host, now);

        assert!(loads.is_empty());
        assert_eq!(state.session().map(|s| s.page_count), Some(2));
    }

    #[test]
    fn index_label_is_one_based() {
        let host = host(3);
        let config = PreviewConfig {
            show_index_label: true,
            default_display_index: 2,
            ..PreviewConfig::default()
        };
        let (state, _) = shown(&host, config, Instant::now());

        assert_eq!(state.index_label().as_deref(), Some("3/3"));
    }

    #[test]
    fn index_label_follows_paging() {
        let host = host(3);
        let config = PreviewConfig {
            show_index_label: true,
            ..PreviewConfig::default()
        };
        let (mut state, now) = shown(&host, config, Instant::now());

        send(
            &mut state,
            &host,
            &[
                press(1, 300.0, 400.0),
                moved(1, 250.0, 400.0),
                moved(1, 100.0, 400.0),
                release(1, 100.0, 400.0),
            ],
            now,
        );
        let settled = now + TRANSITION_DURATION;
        state.update(Message::Tick(settled), &host, settled);

        assert_eq!(state.index_label().as_deref(), Some("2/3"));
    }

    #[test]
    fn index_label_hidden_unless_configured() {
        let host = host(3);
        let (state, _) = shown(&host, PreviewConfig::default(), Instant::now());
        assert!(state.index_label().is_none());
    }

    #[test]
    fn short_vertical_drag_restores_pager() {
        let host = host(1);
        let (mut state, now) = shown(&host, PreviewConfig::default(), Instant::now());

        send(
            &mut state,
            &host,
            &[press(1, 200.0, 400.0), moved(1, 200.0, 420.0), moved(1, 200.0, 500.0)],
            now,
        );
        let tracking = state.scene_at(now).expect("session is active");
        assert!(tracking.pages.is_empty());
        assert!(tracking.floating.is_some());

        send(&mut state, &host, &[release(1, 200.0, 500.0)], now);
        let end = now + TRANSITION_DURATION;
        let (effect, _) = state.update(Message::Tick(end), &host, end);

        assert_eq!(effect, Effect::None);
        let scene = state.scene_at(end).expect("session is still active");
        assert!(scene.floating.is_none());
        assert_eq!(scene.pages.len(), 1);
        assert_abs_diff_eq!(scene.backdrop, 1.0);
        assert_eq!(host.dismissed.get(), 0);
    }

    #[test]
    fn long_vertical_drag_dismisses_once() {
        let host = host(1);
        let (mut state, now) = shown(&host, PreviewConfig::default(), Instant::now());

        send(
            &mut state,
            &host,
            &[
                press(1, 200.0, 400.0),
                moved(1, 200.0, 420.0),
                moved(1, 200.0, 600.0),
                release(1, 200.0, 600.0),
            ],
            now,
        );
        let end = now + TRANSITION_DURATION;
        let (effect, _) = state.update(Message::Tick(end), &host, end);

        assert_eq!(effect, Effect::Dismissed);
        assert_eq!(host.dismissed.get(), 1);
        assert!(!state.is_presented());
        assert!(state.scene_at(end).is_none());

        state.update(Message::Tick(end + TRANSITION_DURATION), &host, end);
        assert_eq!(host.dismissed.get(), 1);
    }

    #[test]
    fn horizontal_drag_does_not_dismiss() {
        let host = host(2);
        let (mut state, now) = shown(&host, PreviewConfig::default(), Instant::now());

        send(
            &mut state,
            &host,
            &[press(1, 300.0, 400.0), moved(1, 280.0, 402.0)],
            now,
        );
        let scene = state.scene_at(now).expect("session is active");
        assert!(scene.floating.is_none());
        assert_eq!(scene.pages.len(), 2);
    }

    #[test]
    fn single_tap_fades_out_without_destination() {
        let host = host(1);
        let (mut state, now) = shown(&host, PreviewConfig::default(), Instant::now());

        send(
            &mut state,
            &host,
            &[press(1, 200.0, 400.0), release(1, 200.0, 400.0)],
            now,
        );
        let after_window = now + crate::config::DOUBLE_TAP_THRESHOLD;
        state.update(Message::Tick(after_window), &host, after_window);

        let halfway = after_window + TRANSITION_DURATION / 2;
        let scene = state.scene_at(halfway).expect("still fading");
        assert!(scene.opacity < 1.0);
        assert!(state.index_label().is_none());

        let end = after_window + TRANSITION_DURATION;
        let (effect, _) = state.update(Message::Tick(end), &host, end);
        assert_eq!(effect, Effect::Dismissed);
        assert_eq!(host.dismissed.get(), 1);
    }

    #[test]
    fn single_tap_flies_into_attached_destination() {
        let destination = Rectangle::new(Point::new(20.0, 20.0), Size::new(40.0, 20.0));
        let host = Host {
            count: 1,
            destination: Some(ViewHandle::attached(destination, Point::ORIGIN)),
            ..Host::default()
        };
        let (mut state, now) = shown(&host, PreviewConfig::default(), Instant::now());

        state.update(Message::DismissRequested, &host, now);

        let end = state
            .scene_at(now + TRANSITION_DURATION)
            .and_then(|scene| scene.floating)
            .expect("flying view");
        assert_eq!(end.rect, destination);
    }

    #[test]
    fn detached_destination_falls_back_to_fade() {
        let host = Host {
            count: 1,
            destination: Some(ViewHandle::detached(Rectangle::new(
                Point::ORIGIN,
                Size::new(10.0, 10.0),
            ))),
            ..Host::default()
        };
        let (mut state, now) = shown(&host, PreviewConfig::default(), Instant::now());

        state.update(Message::DismissRequested, &host, now);

        let scene = state.scene_at(now).expect("still fading");
        assert!(scene.floating.is_none());
        assert_eq!(scene.pages.len(), 1);
    }

    #[test]
    fn double_tap_zooms_instead_of_dismissing() {
        let host = host(1);
        let (mut state, now) = shown(&host, PreviewConfig::default(), Instant::now());

        send(
            &mut state,
            &host,
            &[
                press(1, 200.0, 400.0),
                release(1, 200.0, 400.0),
                press(1, 200.0, 400.0),
                release(1, 200.0, 400.0),
            ],
            now,
        );
        let later = now + crate::config::DOUBLE_TAP_THRESHOLD + TRANSITION_DURATION;
        state.update(Message::Tick(later), &host, later);

        assert!(state.is_presented());
        let scene = state.scene_at(later).expect("session is active");
        assert_abs_diff_eq!(scene.pages[0].rect.width, 1000.0);
    }

    #[test]
    fn vertical_drag_on_zoomed_page_pans_content() {
        let host = host(1);
        let (mut state, now) = shown(&host, PreviewConfig::default(), Instant::now());
        send(
            &mut state,
            &host,
            &[
                press(1, 200.0, 400.0),
                release(1, 200.0, 400.0),
                press(1, 200.0, 400.0),
                release(1, 200.0, 400.0),
                press(1, 200.0, 400.0),
                moved(1, 200.0, 500.0),
            ],
            now,
        );

        let scene = state.scene_at(now).expect("session is active");
        assert!(scene.floating.is_none());
    }

    #[test]
    fn pinch_zooms_active_page() {
        let host = host(1);
        let (mut state, now) = shown(&host, PreviewConfig::default(), Instant::now());

        send(
            &mut state,
            &host,
            &[
                press(1, 150.0, 400.0),
                press(2, 250.0, 400.0),
                moved(2, 350.0, 400.0),
            ],
            now,
        );

        let scene = state.scene_at(now).expect("session is active");
        assert!(scene.pages[0].rect.width > 400.0);
    }

    #[test]
    fn save_reports_current_image() {
        let host = host(2);
        let config = PreviewConfig {
            support_save_image: true,
            ..PreviewConfig::default()
        };
        let (mut state, now) = shown(&host, config, Instant::now());
        assert!(state.shows_save_button());

        state.update(Message::SaveRequested, &host, now);

        assert_eq!(*host.saved.borrow(), vec![(0, true)]);
    }

    #[test]
    fn save_is_ignored_when_unsupported() {
        let host = host(2);
        let (mut state, now) = shown(&host, PreviewConfig::default(), Instant::now());

        state.update(Message::SaveRequested, &host, now);

        assert!(host.saved.borrow().is_empty());
        assert!(!state.shows_save_button());
    }

    #[test]
    fn messages_after_teardown_are_ignored() {
        let host = host(1);
        let (mut state, now) = shown(&host, PreviewConfig::default(), Instant::now());
        state.update(Message::DismissRequested, &host, now);
        let end = now + TRANSITION_DURATION;
        state.update(Message::Tick(end), &host, end);

        let (effect, loads) = state.update(Message::DismissRequested, &host, end);
        assert_eq!(effect, Effect::None);
        assert!(loads.is_empty());
        assert_eq!(host.dismissed.get(), 1);
    }

    #[test]
    fn vertical_drag_during_page_snap_dismisses_the_lifted_page() {
        let destination = Rectangle::new(Point::new(20.0, 20.0), Size::new(40.0, 20.0));
        let host = Host {
            count: 2,
            destination: Some(ViewHandle::attached(destination, Point::ORIGIN)),
            ..Host::default()
        };
        let (mut state, now) = shown(&host, PreviewConfig::default(), Instant::now());

        // Half a page toward page 1, released: the strip snaps forward.
        send(
            &mut state,
            &host,
            &[
                press(1, 300.0, 400.0),
                moved(1, 250.0, 400.0),
                moved(1, 100.0, 400.0),
                release(1, 100.0, 400.0),
            ],
            now,
        );
        // Page 0 is lifted before the snap settles.
        send(
            &mut state,
            &host,
            &[press(2, 200.0, 400.0), moved(2, 200.0, 420.0), moved(2, 200.0, 600.0)],
            now,
        );
        let later = now + TRANSITION_DURATION;
        state.update(Message::Tick(later), &host, later);
        assert_eq!(state.session().map(|s| s.current_index), Some(0));

        send(&mut state, &host, &[release(2, 200.0, 600.0)], later);
        assert_eq!(*host.asked.borrow(), vec![0]);

        let end = later + TRANSITION_DURATION;
        let landing = state
            .scene_at(end)
            .and_then(|scene| scene.floating)
            .expect("the lifted page flies home");
        assert_eq!(landing.image.width(), 800);
        assert_eq!(landing.rect, destination);

        let (effect, _) = state.update(Message::Tick(end), &host, end);
        assert_eq!(effect, Effect::Dismissed);
        assert_eq!(host.dismissed.get(), 1);
    }

    #[test]
    fn default_index_survives_first_layout() {
        let host = Host {
            count: 3,
            remote: true,
            ..Host::default()
        };
        let config = PreviewConfig {
            default_display_index: 1,
            ..PreviewConfig::default()
        };
        let mut state = preview(config);
        let start = Instant::now();

        let loads = state.present(&origin(), Size::ZERO, &host, start);
        assert!(loads.is_empty());
        assert_eq!(state.session().map(|s| s.current_index), Some(1));

        let (_, loads) = state.update(Message::Resized(viewport()), &host, start);

        assert_eq!(state.session().map(|s| s.current_index), Some(1));
        let pages: Vec<usize> = loads.iter().map(|load| load.ticket.page).collect();
        assert_eq!(pages, vec![1]);
    }

    #[test]
    fn resize_keeps_page_and_relays_out() {
        let host = Host {
            count: 3,
            remote: true,
            ..Host::default()
        };
        let config = PreviewConfig {
            default_display_index: 1,
            ..PreviewConfig::default()
        };
        let (mut state, now) = shown(&host, config, Instant::now());
        let landscape = Size::new(800.0, 400.0);

        let (effect, loads) = state.update(Message::Resized(landscape), &host, now);

        assert_eq!(effect, Effect::None);
        assert!(loads.is_empty());
        assert_eq!(state.session().map(|s| s.current_index), Some(1));
        let scene = state.scene_at(now).expect("session is active");
        assert_eq!(scene.viewport, landscape);
        assert_eq!(scene.loading, vec![Rectangle::new(Point::ORIGIN, landscape)]);
    }

    #[test]
    fn resize_during_present_ends_the_transition() {
        let host = host(1);
        let start = Instant::now();
        let mut state = preview(PreviewConfig::default());
        state.present(&origin(), viewport(), &host, start);
        let landscape = Size::new(800.0, 400.0);

        let (effect, _) = state.update(Message::Resized(landscape), &host, start);
        assert_eq!(effect, Effect::Presented);

        let scene = state.scene_at(start).expect("session is active");
        assert!(scene.floating.is_none());
        assert_eq!(scene.pages.len(), 1);
        assert_eq!(scene.pages[0].rect, Rectangle::new(Point::ORIGIN, landscape));

        let end = start + TRANSITION_DURATION;
        let (effect, _) = state.update(Message::Tick(end), &host, end);
        assert_eq!(effect, Effect::None);
    }

    #[test]
    fn lost_touch_past_threshold_dismisses() {
        let host = host(1);
        let (mut state, now) = shown(&host, PreviewConfig::default(), Instant::now());

        send(
            &mut state,
            &host,
            &[
                press(1, 200.0, 400.0),
                moved(1, 200.0, 420.0),
                moved(1, 200.0, 600.0),
                lost(1),
            ],
            now,
        );
        let end = now + TRANSITION_DURATION;
        let (effect, _) = state.update(Message::Tick(end), &host, end);

        assert_eq!(effect, Effect::Dismissed);
        assert_eq!(host.dismissed.get(), 1);
    }

    #[test]
    fn lost_touch_below_threshold_restores() {
        let host = host(1);
        let (mut state, now) = shown(&host, PreviewConfig::default(), Instant::now());

        send(
            &mut state,
            &host,
            &[
                press(1, 200.0, 400.0),
                moved(1, 200.0, 420.0),
                moved(1, 200.0, 500.0),
                lost(1),
            ],
            now,
        );
        let end = now + TRANSITION_DURATION;
        let (effect, _) = state.update(Message::Tick(end), &host, end);

        assert_eq!(effect, Effect::None);
        let scene = state.scene_at(end).expect("session is still active");
        assert!(scene.floating.is_none());
        assert_eq!(scene.pages.len(), 1);
        assert_eq!(host.dismissed.get(), 0);
    }

    #[test]
    fn press_carrying_a_resize_uses_the_new_size() {
        let host = host(1);
        let (mut state, now) = shown(&host, PreviewConfig::default(), Instant::now());
        let landscape = Size::new(800.0, 400.0);
        let pressed = PointerEvent::Pressed {
            finger: Finger(1),
            position: Point::new(400.0, 200.0),
        };

        send(
            &mut state,
            &host,
            &[
                Message::PointerResized(landscape, pressed),
                moved(1, 400.0, 220.0),
                moved(1, 400.0, 300.0),
                release(1, 400.0, 300.0),
            ],
            now,
        );
        // A 100px drag is a quarter of the new height, past the threshold.
        let end = now + TRANSITION_DURATION;
        let (effect, _) = state.update(Message::Tick(end), &host, end);

        assert_eq!(effect, Effect::Dismissed);
    }
}

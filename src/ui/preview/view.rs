// SPDX-License-Identifier: MPL-2.0
//! Rendering of the preview and translation of raw input into pointer events.
//!
//! Pages, the backdrop and the floating transition view are drawn on one
//! canvas so that the transition view can move freely above the pager. The
//! index counter and the save button are regular widgets stacked on top.

use super::component::{Message, PointerEvent, Scene, State, MOUSE_FINGER};
use crate::ui::design_tokens::{opacity, palette, radius, spacing, typography};
use crate::ui::styles;
use iced::alignment::{Horizontal, Vertical};
use iced::widget::canvas::{self, Canvas, Frame, Text};
use iced::widget::{button, Container, Stack};
use iced::{mouse, touch, Color, Element, Length, Point, Rectangle, Size, Vector};

/// Build the preview element. Empty when no session is active.
pub fn view(state: &State) -> Element<'_, Message> {
    let Some(scene) = state.scene() else {
        return Container::new(iced::widget::Space::new())
            .width(Length::Fill)
            .height(Length::Fill)
            .into();
    };
    let viewport = scene.viewport;
    let surface = Canvas::new(PreviewCanvas { scene, viewport })
        .width(Length::Fill)
        .height(Length::Fill);

    let mut stack = Stack::new().push(surface);

    if let Some(label) = state.index_label() {
        let counter = Container::new(iced::widget::Text::new(label).size(typography::BODY_LG))
            .padding([spacing::XXS, spacing::SM])
            .style(styles::overlay::indicator(radius::FULL));
        stack = stack.push(
            Container::new(counter)
                .width(Length::Fill)
                .padding(spacing::LG)
                .align_x(Horizontal::Center)
                .align_y(Vertical::Top),
        );
    }

    if state.shows_save_button() {
        let save = button(iced::widget::Text::new("Save").size(typography::BODY_LG))
            .padding([spacing::XS, spacing::MD])
            .style(styles::button::overlay(
                opacity::OVERLAY_MEDIUM,
                opacity::OVERLAY_HOVER,
            ))
            .on_press(Message::SaveRequested);
        stack = stack.push(
            Container::new(save)
                .width(Length::Fill)
                .height(Length::Fill)
                .padding(spacing::LG)
                .align_x(Horizontal::Right)
                .align_y(Vertical::Bottom),
        );
    }

    stack.into()
}

/// Canvas program drawing one [`Scene`].
struct PreviewCanvas<'a> {
    scene: Scene<'a>,
    viewport: Size,
}

/// Whether the left mouse button is down on the canvas.
#[derive(Debug, Default)]
struct MouseDrag {
    pressed: bool,
}

impl canvas::Program<Message> for PreviewCanvas<'_> {
    type State = MouseDrag;

    fn update(
        &self,
        state: &mut Self::State,
        event: &iced::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<iced::widget::Action<Message>> {
        use iced::widget::Action;

        let pointer = pointer_event(state, event, bounds, cursor);
        let captured = pointer.is_some();
        let action = Action::publish(message_for(self.viewport, bounds.size(), pointer)?);
        Some(if captured { action.and_capture() } else { action })
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &iced::Renderer,
        _theme: &iced::Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        let scene = &self.scene;
        let alpha = scene.opacity;

        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color {
                a: scene.backdrop * alpha,
                ..palette::BLACK
            },
        );

        for sprite in &scene.pages {
            frame.draw_image(
                sprite.rect,
                canvas::Image::new(sprite.image.handle().clone()).opacity(alpha),
            );
        }

        for page in &scene.loading {
            let center = page.center();
            frame.fill_text(Text {
                content: "Loading…".to_string(),
                position: Point::new(center.x - spacing::LG * 1.5, center.y - spacing::XS),
                color: Color {
                    a: opacity::OVERLAY_STRONG * alpha,
                    ..palette::WHITE
                },
                size: typography::BODY.into(),
                ..Text::default()
            });
        }

        if let Some(sprite) = scene.floating {
            frame.draw_image(
                sprite.rect,
                canvas::Image::new(sprite.image.handle().clone()).opacity(alpha),
            );
        }

        vec![frame.into_geometry()]
    }
}

/// What to publish for one canvas event. A size change rides along with the
/// pointer event that revealed it.
fn message_for(viewport: Size, bounds: Size, pointer: Option<PointerEvent>) -> Option<Message> {
    let resized = bounds != viewport;
    match pointer {
        Some(pointer) if resized => Some(Message::PointerResized(bounds, pointer)),
        Some(pointer) => Some(Message::Pointer(pointer)),
        None => resized.then_some(Message::Resized(bounds)),
    }
}

/// Translates touch and left-button input into canvas-local pointer events.
fn pointer_event(
    state: &mut MouseDrag,
    event: &iced::Event,
    bounds: Rectangle,
    cursor: mouse::Cursor,
) -> Option<PointerEvent> {
    let local = |position: Point| position - Vector::new(bounds.x, bounds.y);
    match event {
        iced::Event::Touch(touch::Event::FingerPressed { id, position }) => bounds
            .contains(*position)
            .then(|| PointerEvent::Pressed {
                finger: *id,
                position: local(*position),
            }),
        iced::Event::Touch(touch::Event::FingerMoved { id, position }) => {
            Some(PointerEvent::Moved {
                finger: *id,
                position: local(*position),
            })
        }
        iced::Event::Touch(touch::Event::FingerLifted { id, position }) => {
            Some(PointerEvent::Released {
                finger: *id,
                position: local(*position),
            })
        }
        iced::Event::Touch(touch::Event::FingerLost { id, .. }) => {
            Some(PointerEvent::Lost { finger: *id })
        }
        iced::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
            let position = cursor.position_in(bounds)?;
            state.pressed = true;
            Some(PointerEvent::Pressed {
                finger: MOUSE_FINGER,
                position,
            })
        }
        iced::Event::Mouse(mouse::Event::CursorMoved { position }) if state.pressed => {
            Some(PointerEvent::Moved {
                finger: MOUSE_FINGER,
                position: local(*position),
            })
        }
        iced::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) if state.pressed => {
            state.pressed = false;
            let position = cursor.position().map_or(Point::ORIGIN, local);
            Some(PointerEvent::Released {
                finger: MOUSE_FINGER,
                position,
            })
        }
        iced::Event::Mouse(mouse::Event::CursorLeft) if state.pressed => {
            state.pressed = false;
            Some(PointerEvent::Lost {
                finger: MOUSE_FINGER,
            })
        }
        _ => None,
    }
}

// SPDX-License-Identifier: MPL-2.0
//! View rendering for the demo host.
//!
//! The thumbnail strip is always laid out; the preview is stacked over it
//! while a session is active.

use super::gallery::{Gallery, STRIP_PADDING, THUMBNAIL_EDGE, THUMBNAIL_GAP};
use super::Message;
use crate::ui::design_tokens::{palette, typography};
use crate::ui::preview;
use iced::widget::{button, container, image, Container, Row, Stack, Text};
use iced::{Background, ContentFit, Element, Length, Theme};

/// Renders the strip and, on top of it, the preview.
pub fn view<'a>(gallery: &'a Gallery, preview: &'a preview::State) -> Element<'a, Message> {
    let strip = gallery
        .paths()
        .enumerate()
        .fold(Row::new().spacing(THUMBNAIL_GAP), |row, (index, path)| {
            row.push(thumbnail(gallery, index, path))
        });

    let backdrop = Container::new(strip)
        .padding(STRIP_PADDING)
        .width(Length::Fill)
        .height(Length::Fill)
        .style(|_theme: &Theme| container::Style {
            background: Some(Background::Color(palette::GRAY_900)),
            ..Default::default()
        });

    let mut stack = Stack::new().push(backdrop);
    if preview.is_presented() {
        stack = stack.push(preview.view().map(Message::Preview));
    }
    stack.into()
}

fn thumbnail<'a>(gallery: &'a Gallery, index: usize, path: &'a std::path::Path) -> Element<'a, Message> {
    let content: Element<'a, Message> = match gallery.thumbnail(index) {
        Some(bitmap) => image(bitmap.handle().clone())
            .width(Length::Fixed(THUMBNAIL_EDGE))
            .height(Length::Fixed(THUMBNAIL_EDGE))
            .content_fit(ContentFit::Cover)
            .into(),
        None => {
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            Container::new(Text::new(name).size(typography::BODY))
                .center_x(Length::Fixed(THUMBNAIL_EDGE))
                .center_y(Length::Fixed(THUMBNAIL_EDGE))
                .style(|_theme: &Theme| container::Style {
                    background: Some(Background::Color(palette::GRAY_400)),
                    ..Default::default()
                })
                .into()
        }
    };

    button(content)
        .padding(0)
        .on_press(Message::ThumbnailPressed(index))
        .into()
}

// SPDX-License-Identifier: MPL-2.0
//! Centralized button styles.

use crate::ui::design_tokens::{
    opacity,
    palette::{BLACK, WHITE},
    radius, shadow,
};
use iced::widget::button;
use iced::{Background, Border, Color, Theme};

/// Style for buttons floating over the preview (save, etc.).
pub fn overlay(alpha_normal: f32, alpha_hover: f32) -> impl Fn(&Theme, button::Status) -> button::Style {
    move |_theme: &Theme, status: button::Status| {
        let alpha = match status {
            button::Status::Hovered => alpha_hover,
            button::Status::Pressed => opacity::OVERLAY_PRESSED,
            _ => alpha_normal,
        };

        button::Style {
            background: Some(Background::Color(Color { a: alpha, ..BLACK })),
            text_color: WHITE,
            border: Border {
                radius: radius::MD.into(),
                ..Border::default()
            },
            shadow: shadow::MD,
            snap: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_darkens_when_hovered() {
        let style = overlay(opacity::OVERLAY_MEDIUM, opacity::OVERLAY_HOVER);
        let theme = Theme::Dark;

        let active = style(&theme, button::Status::Active);
        let hovered = style(&theme, button::Status::Hovered);

        assert_eq!(
            active.background,
            Some(Background::Color(Color {
                a: opacity::OVERLAY_MEDIUM,
                ..BLACK
            }))
        );
        assert_eq!(
            hovered.background,
            Some(Background::Color(Color {
                a: opacity::OVERLAY_HOVER,
                ..BLACK
            }))
        );
    }
}

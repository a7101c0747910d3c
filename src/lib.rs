// SPDX-License-Identifier: MPL-2.0
//! `iced_preview` is a full-screen image preview for the Iced GUI framework.
//!
//! A host presents it from a thumbnail and gets a horizontally paged gallery
//! with per-page pinch and double-tap zoom. Dragging a page vertically shrinks
//! it and dismisses the preview into the thumbnail it came from.
//!
//! The host talks to the preview through [`ui::preview::PreviewDelegate`] and
//! plugs image fetching in through [`media::ImageLoader`]. The `app` module
//! holds a small demo host used by the `iced_preview` binary.

#![doc(html_root_url = "https://docs.rs/iced_preview/0.1.0")]

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod media;
pub mod ui;

#[cfg(test)]
mod test_utils;

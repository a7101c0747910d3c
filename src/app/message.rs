// SPDX-License-Identifier: MPL-2.0
//! Top-level messages and runtime flags for the demo host.

use crate::error::{Error, LoadError};
use crate::media::Bitmap;
use crate::ui::preview;
use iced::Size;
use std::path::PathBuf;

/// Top-level messages consumed by `App::update`.
#[derive(Debug, Clone)]
pub enum Message {
    Preview(preview::Message),
    ThumbnailLoaded(usize, Result<Bitmap, LoadError>),
    ThumbnailPressed(usize),
    WindowResized(Size),
    /// A copy requested through the save button finished.
    Saved(Result<PathBuf, Error>),
}

/// Runtime flags passed from the command line.
#[derive(Debug, Default, Clone)]
pub struct Flags {
    /// Preview config file to use instead of the platform default.
    pub config_path: Option<PathBuf>,
    /// Page to open right after startup, from the window center.
    pub index: Option<usize>,
    /// Forces the "current/total" counter on.
    pub show_index: bool,
    /// Forces the save button on.
    pub save: bool,
    /// Images shown in the thumbnail strip, in page order.
    pub images: Vec<PathBuf>,
}

// SPDX-License-Identifier: MPL-2.0
//! Demo host: a thumbnail strip that opens the preview.
//!
//! `App` owns the [`Gallery`] (the preview delegate) and the preview state,
//! routes preview messages and turns delegate callbacks that need I/O
//! (saving a page) into tasks.

mod gallery;
mod message;
mod view;

pub use gallery::Gallery;
pub use message::{Flags, Message};

use crate::config::{self, PreviewConfig};
use crate::media::FsImageLoader;
use crate::ui::preview::{self, ViewHandle};
use iced::{event, window, Element, Point, Rectangle, Size, Subscription, Task, Theme};
use std::sync::Arc;

pub const WINDOW_DEFAULT_HEIGHT: u32 = 650;
pub const WINDOW_DEFAULT_WIDTH: u32 = 800;
pub const MIN_WINDOW_HEIGHT: u32 = 400;
pub const MIN_WINDOW_WIDTH: u32 = 400;

/// Root state of the demo.
#[derive(Debug)]
pub struct App {
    gallery: Gallery,
    preview: preview::State,
    viewport: Size,
}

/// Builds the window settings.
pub fn window_settings() -> window::Settings {
    window::Settings {
        size: default_viewport(),
        min_size: Some(Size::new(MIN_WINDOW_WIDTH as f32, MIN_WINDOW_HEIGHT as f32)),
        ..window::Settings::default()
    }
}

fn default_viewport() -> Size {
    Size::new(WINDOW_DEFAULT_WIDTH as f32, WINDOW_DEFAULT_HEIGHT as f32)
}

/// Entry point used by `main.rs` to launch the Iced application loop.
pub fn run(flags: Flags) -> iced::Result {
    use std::cell::RefCell;

    // iced calls boot through `Fn`; the flags are consumed on the first call.
    let boot_state = RefCell::new(Some(flags));
    let boot = move || {
        let flags = boot_state.borrow_mut().take().unwrap_or_default();
        App::new(flags)
    };

    iced::application(boot, App::update, App::view)
        .title(App::title)
        .theme(App::theme)
        .window(window_settings())
        .subscription(App::subscription)
        .run()
}

/// Reads the preview config and applies the command line overrides.
fn resolve_config(flags: &Flags) -> PreviewConfig {
    let loaded = match &flags.config_path {
        Some(path) => config::load_from_path(path),
        None => config::load(),
    };
    let mut config = loaded.unwrap_or_else(|err| {
        tracing::warn!("using default preview config: {err}");
        PreviewConfig::default()
    });
    config.show_index_label |= flags.show_index;
    config.support_save_image |= flags.save;
    config
}

impl App {
    /// Initializes the demo and starts decoding the thumbnails.
    pub fn new(flags: Flags) -> (Self, Task<Message>) {
        let config = resolve_config(&flags);
        let viewport = default_viewport();
        let gallery = Gallery::new(flags.images.clone(), viewport);
        let preview = preview::State::new(config, Arc::new(FsImageLoader));

        let mut app = Self {
            gallery,
            preview,
            viewport,
        };

        let thumbnails = Task::batch(app.gallery.paths().enumerate().map(|(index, path)| {
            Task::perform(gallery::load_thumbnail(path.to_path_buf()), move |result| {
                Message::ThumbnailLoaded(index, result)
            })
        }));

        let startup = match flags.index {
            Some(index) => app.open_centered(index),
            None => Task::none(),
        };

        (app, Task::batch([thumbnails, startup]))
    }

    fn title(&self) -> String {
        match self.preview.session() {
            Some(session) if session.page_count > 0 => {
                let name = self
                    .gallery
                    .path(session.current_index)
                    .and_then(|path| path.file_name())
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                format!("{name} - Iced Preview")
            }
            _ => "Iced Preview".to_string(),
        }
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }

    fn subscription(&self) -> Subscription<Message> {
        let resize = event::listen_with(|event, _status, _window| match event {
            iced::Event::Window(window::Event::Resized(size)) => {
                Some(Message::WindowResized(size))
            }
            _ => None,
        });
        Subscription::batch([resize, self.preview.subscription().map(Message::Preview)])
    }

    fn view(&self) -> Element<'_, Message> {
        view::view(&self.gallery, &self.preview)
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Preview(message) => {
                let (effect, task) = self.preview.handle_message(message, &self.gallery);
                if let preview::Effect::Dismissed = effect {
                    tracing::debug!(dismissals = self.gallery.dismissals(), "back to the strip");
                }
                Task::batch([task.map(Message::Preview), self.flush_saves()])
            }
            Message::ThumbnailLoaded(index, Ok(thumbnail)) => {
                self.gallery.set_thumbnail(index, thumbnail);
                Task::none()
            }
            Message::ThumbnailLoaded(index, Err(err)) => {
                tracing::warn!(index, "thumbnail failed: {err}");
                Task::none()
            }
            Message::ThumbnailPressed(index) => {
                let origin = self.gallery.thumbnail_view(index);
                self.open(index, &origin)
            }
            Message::WindowResized(size) => {
                self.viewport = size;
                self.gallery.set_viewport(size);
                Task::none()
            }
            Message::Saved(Ok(path)) => {
                tracing::info!(path = %path.display(), "page saved");
                Task::none()
            }
            Message::Saved(Err(err)) => {
                tracing::warn!("save failed: {err}");
                Task::none()
            }
        }
    }

    /// Opens the preview on page `index`, growing out of `origin`.
    fn open(&mut self, index: usize, origin: &ViewHandle) -> Task<Message> {
        if self.preview.is_presented() {
            return Task::none();
        }
        let mut config = self.preview.config().clone();
        config.default_display_index = index;
        self.preview.set_config(config);
        self.preview
            .show(origin, self.viewport, &self.gallery)
            .map(Message::Preview)
    }

    /// Opens page `index` from a detached view in the middle of the window.
    fn open_centered(&mut self, index: usize) -> Task<Message> {
        let origin = ViewHandle::detached(Rectangle::new(
            Point::ORIGIN,
            Size::new(gallery::THUMBNAIL_EDGE, gallery::THUMBNAIL_EDGE),
        ));
        self.open(index, &origin)
    }

    fn flush_saves(&self) -> Task<Message> {
        let directory = gallery::save_directory();
        Task::batch(
            self.gallery
                .take_pending_saves()
                .into_iter()
                .filter_map(|index| self.gallery.path(index).map(std::path::Path::to_path_buf))
                .map(|source| {
                    Task::perform(
                        gallery::save_copy(source, directory.clone()),
                        Message::Saved,
                    )
                }),
        )
    }
}

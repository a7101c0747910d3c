// SPDX-License-Identifier: MPL-2.0
//! Drag state management
//!
//! Tracks a single-finger drag from press to release: the translation since
//! the press, the movement since the last sample, and the axis the drag was
//! locked to once it left the touch slop.

use crate::config::TOUCH_SLOP;
use iced::{Point, Vector};

/// Axis a drag was locked to after crossing the touch slop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragAxis {
    Horizontal,
    Vertical,
}

/// One movement sample of an active drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSample {
    /// Movement since the previous sample.
    pub delta: Vector,
    /// Movement since the press.
    pub translation: Vector,
    /// Set on the sample that crossed the touch slop.
    pub locked: Option<DragAxis>,
}

/// Manages press-and-drag state
#[derive(Debug, Clone, Default)]
pub struct DragState {
    /// Position where the drag started
    pub start_position: Option<Point>,

    /// Position of the previous sample
    pub last_position: Option<Point>,

    /// Axis chosen once the slop was crossed
    pub axis: Option<DragAxis>,
}

impl DragState {
    /// Starts a drag operation
    pub fn start(&mut self, position: Point) {
        self.start_position = Some(position);
        self.last_position = Some(position);
        self.axis = None;
    }

    /// Stops the drag operation
    pub fn stop(&mut self) {
        self.start_position = None;
        self.last_position = None;
        self.axis = None;
    }

    /// Records a new finger position.
    pub fn update(&mut self, position: Point) -> Option<DragSample> {
        let start = self.start_position?;
        let last = self.last_position.unwrap_or(start);
        self.last_position = Some(position);

        let translation = position - start;
        let mut locked = None;
        if self.axis.is_none() && (translation.x.hypot(translation.y)) > TOUCH_SLOP {
            let axis = if translation.x.abs() > translation.y.abs() {
                DragAxis::Horizontal
            } else {
                DragAxis::Vertical
            };
            self.axis = Some(axis);
            locked = Some(axis);
        }

        Some(DragSample {
            delta: position - last,
            translation,
            locked,
        })
    }
}

// SPDX-License-Identifier: MPL-2.0
//! Centralized styles for the preview chrome.

pub mod button;
pub mod overlay;

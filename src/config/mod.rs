// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Application configuration.
//!
//! This module manages the application configuration file. Settings that
//! survive a restart (volume, repeat, the last directory) are written back on
//! exit; mute is deliberately never stored.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const CONFIG_NAME: &str = "wagom-player";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub version: u32,
    pub volume: u8,
    pub repeat: bool,
    pub settle_delay_ms: u64,
    pub min_rate: f32,
    pub max_rate: f32,
    pub rate_step: f32,
    pub seek_short_ms: i64,
    pub seek_long_ms: i64,
    pub poll_interval_ms: u64,
    pub accept_folder: String,
    pub reject_folder: String,
    pub video_window_id: Option<i64>,
    pub last_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            volume: 80,
            repeat: false,
            settle_delay_ms: 50,
            min_rate: 0.25,
            max_rate: 4.0,
            rate_step: 0.1,
            seek_short_ms: 10_000,
            seek_long_ms: 60_000,
            poll_interval_ms: 200,
            accept_folder: String::from("_ok"),
            reject_folder: String::from("_ng"),
            video_window_id: None,
            last_dir: None,
        }
    }
}

impl AppConfig {
    /// Brings hand-edited values back into range.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        self.volume = self.volume.min(100);

        if !(self.min_rate.is_finite() && self.min_rate > 0.0) {
            self.min_rate = defaults.min_rate;
        }
        if !(self.max_rate.is_finite() && self.max_rate > 0.0) {
            self.max_rate = defaults.max_rate;
        }
        if self.min_rate > self.max_rate {
            std::mem::swap(&mut self.min_rate, &mut self.max_rate);
        }
        if !(self.rate_step.is_finite() && self.rate_step > 0.0) {
            self.rate_step = defaults.rate_step;
        }

        if self.seek_short_ms <= 0 {
            self.seek_short_ms = defaults.seek_short_ms;
        }
        if self.seek_long_ms <= 0 {
            self.seek_long_ms = defaults.seek_long_ms;
        }
        if self.poll_interval_ms == 0 {
            self.poll_interval_ms = defaults.poll_interval_ms;
        }

        if !is_plain_folder_name(&self.accept_folder) {
            self.accept_folder = defaults.accept_folder;
        }
        if !is_plain_folder_name(&self.reject_folder) {
            self.reject_folder = defaults.reject_folder;
        }

        self
    }
}

// A single path component, so a move can never leave the video's directory.
fn is_plain_folder_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

pub fn load_config() -> AppConfig {
    confy::load::<AppConfig>(CONFIG_NAME, None)
        .unwrap_or_default()
        .sanitized()
}

pub fn save_config(cfg: &AppConfig) -> Result<(), confy::ConfyError> {
    confy::store(CONFIG_NAME, None, cfg)
}

/// The directory holding the configuration file, used for the run log.
pub fn config_dir() -> Option<PathBuf> {
    confy::get_configuration_file_path(CONFIG_NAME, None)
        .ok()
        .and_then(|path| path.parent().map(PathBuf::from))
}

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

//! Stand-in engine for builds without MPV support.
//!
//! Every command fails with [`EngineError::Unavailable`], which the session
//! logs and treats as a no-op, so the playlist and triage features remain
//! usable.

use std::{path::Path, sync::mpsc::Sender};

use crate::{
    engine::{EngineError, EngineState, MediaEngine},
    events::AppEvent,
};

const REASON: &str = "built without the `mpv` feature";

pub(crate) struct DetachedEngine;

impl DetachedEngine {
    pub(crate) fn new(_event_tx: Sender<AppEvent>, _window_id: Option<i64>) -> Self {
        Self
    }
}

fn unavailable() -> Result<(), EngineError> {
    Err(EngineError::Unavailable(String::from(REASON)))
}

impl MediaEngine for DetachedEngine {
    fn load(&mut self, _path: &Path) -> Result<(), EngineError> {
        unavailable()
    }

    fn bind_output_surface(&mut self) -> Result<(), EngineError> {
        unavailable()
    }

    fn play(&mut self) -> Result<(), EngineError> {
        unavailable()
    }

    fn pause(&mut self) -> Result<(), EngineError> {
        unavailable()
    }

    fn stop(&mut self) -> Result<(), EngineError> {
        unavailable()
    }

    fn is_playing(&self) -> bool {
        false
    }

    fn state(&self) -> EngineState {
        EngineState::Idle
    }

    fn set_time(&mut self, _ms: i64) -> Result<(), EngineError> {
        unavailable()
    }

    fn time_ms(&self) -> Option<i64> {
        None
    }

    fn length_ms(&self) -> Option<i64> {
        None
    }

    fn set_rate(&mut self, _rate: f32) -> Result<(), EngineError> {
        unavailable()
    }

    fn set_volume(&mut self, _volume: u8) -> Result<(), EngineError> {
        unavailable()
    }

    fn toggle_mute(&mut self) -> Result<(), EngineError> {
        unavailable()
    }

    fn muted(&self) -> Option<bool> {
        None
    }
}

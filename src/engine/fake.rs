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

//! A scripted engine that records every command it receives.

use std::path::{Path, PathBuf};

use crate::engine::{EngineError, EngineState, MediaEngine};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum EngineCall {
    Load(PathBuf),
    BindOutputSurface,
    Play,
    Pause,
    Stop,
    SetTime(i64),
    SetRate(f32),
    SetVolume(u8),
    ToggleMute,
}

pub(crate) struct FakeEngine {
    pub(crate) calls: Vec<EngineCall>,
    pub(crate) state: EngineState,
    pub(crate) time_ms: Option<i64>,
    pub(crate) length_ms: Option<i64>,
    pub(crate) muted: bool,
    pub(crate) fail_load: bool,
}

impl FakeEngine {
    pub(crate) fn new() -> Self {
        Self {
            calls: Vec::new(),
            state: EngineState::Idle,
            time_ms: None,
            length_ms: None,
            muted: false,
            fail_load: false,
        }
    }

    pub(crate) fn loads(&self) -> Vec<PathBuf> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                EngineCall::Load(path) => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn count(&self, wanted: &EngineCall) -> usize {
        self.calls.iter().filter(|call| *call == wanted).count()
    }

    pub(crate) fn last_seek(&self) -> Option<i64> {
        self.calls.iter().rev().find_map(|call| match call {
            EngineCall::SetTime(ms) => Some(*ms),
            _ => None,
        })
    }
}

impl MediaEngine for FakeEngine {
    fn load(&mut self, path: &Path) -> Result<(), EngineError> {
        self.calls.push(EngineCall::Load(path.to_path_buf()));

        if self.fail_load {
            self.state = EngineState::Error;
            return Err(EngineError::Command {
                command: String::from("load"),
                reason: String::from("unsupported media"),
            });
        }

        self.state = EngineState::Opening;
        self.time_ms = None;
        self.length_ms = None;
        Ok(())
    }

    fn bind_output_surface(&mut self) -> Result<(), EngineError> {
        self.calls.push(EngineCall::BindOutputSurface);
        Ok(())
    }

    fn play(&mut self) -> Result<(), EngineError> {
        self.calls.push(EngineCall::Play);
        self.state = EngineState::Playing;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), EngineError> {
        self.calls.push(EngineCall::Pause);
        self.state = EngineState::Paused;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), EngineError> {
        self.calls.push(EngineCall::Stop);
        self.state = EngineState::Stopped;
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.state == EngineState::Playing
    }

    fn state(&self) -> EngineState {
        self.state
    }

    fn set_time(&mut self, ms: i64) -> Result<(), EngineError> {
        self.calls.push(EngineCall::SetTime(ms));
        self.time_ms = Some(ms);
        Ok(())
    }

    fn time_ms(&self) -> Option<i64> {
        self.time_ms
    }

    fn length_ms(&self) -> Option<i64> {
        self.length_ms
    }

    fn set_rate(&mut self, rate: f32) -> Result<(), EngineError> {
        self.calls.push(EngineCall::SetRate(rate));
        Ok(())
    }

    fn set_volume(&mut self, volume: u8) -> Result<(), EngineError> {
        self.calls.push(EngineCall::SetVolume(volume));
        Ok(())
    }

    fn toggle_mute(&mut self) -> Result<(), EngineError> {
        self.calls.push(EngineCall::ToggleMute);
        self.muted = !self.muted;
        Ok(())
    }

    fn muted(&self) -> Option<bool> {
        Some(self.muted)
    }
}

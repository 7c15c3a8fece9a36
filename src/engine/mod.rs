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

//! The media engine seam.
//!
//! Decoding and presenting video is left entirely to an external engine. The
//! rest of the application only ever talks to it through [`MediaEngine`],
//! which keeps the playback session independent of the engine in use and
//! lets it be driven by a recording fake in tests.
//!
//! Engines deliver asynchronous notifications, such as reaching the end of
//! the media, as [`EngineEvent`]s posted to the application event channel.
//! They are therefore handled on the control thread like any other event.

#[cfg(not(feature = "mpv"))]
mod detached;
#[cfg(test)]
pub(crate) mod fake;
#[cfg(feature = "mpv")]
mod libmpv;

use std::path::Path;

use thiserror::Error;

#[cfg(not(feature = "mpv"))]
pub(crate) use detached::DetachedEngine as DefaultEngine;
#[cfg(feature = "mpv")]
pub(crate) use libmpv::MpvEngine as DefaultEngine;

/// Playback state as reported by the engine itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EngineState {
    Idle,
    Opening,
    Playing,
    Paused,
    Stopped,
    Ended,
    Error,
}

/// Notifications raised by the engine outside of any command.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum EngineEvent {
    EndOfMedia,
    /// The current media could not be played.
    Error(String),
    /// A command failed without affecting the media itself.
    CommandFailed(String),
}

#[derive(Debug, Error)]
pub(crate) enum EngineError {
    #[error("media engine is not available: {0}")]
    Unavailable(String),

    #[error("media engine rejected `{command}`: {reason}")]
    Command { command: String, reason: String },

    #[error("media engine worker has stopped")]
    WorkerGone,
}

/// Commands and queries understood by an external media engine.
///
/// Times are in milliseconds. Queries return `None` when the engine does not
/// (yet) know the answer, for example the length of media that is still
/// opening.
pub(crate) trait MediaEngine {
    /// Replaces the current media with the file at `path`.
    fn load(&mut self, path: &Path) -> Result<(), EngineError>;

    /// Attaches the engine's video output to the player's surface.
    fn bind_output_surface(&mut self) -> Result<(), EngineError>;

    fn play(&mut self) -> Result<(), EngineError>;

    fn pause(&mut self) -> Result<(), EngineError>;

    /// Stops playback. Returns once the engine has released the media file,
    /// or after a short bounded wait.
    fn stop(&mut self) -> Result<(), EngineError>;

    fn is_playing(&self) -> bool;

    fn state(&self) -> EngineState;

    fn set_time(&mut self, ms: i64) -> Result<(), EngineError>;

    fn time_ms(&self) -> Option<i64>;

    fn length_ms(&self) -> Option<i64>;

    fn set_rate(&mut self, rate: f32) -> Result<(), EngineError>;

    fn set_volume(&mut self, volume: u8) -> Result<(), EngineError>;

    fn toggle_mute(&mut self) -> Result<(), EngineError>;

    fn muted(&self) -> Option<bool>;
}

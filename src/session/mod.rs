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

//! The playback session.
//!
//! A [`Session`] owns the playlist and the one media engine, and is the only
//! thing that issues commands to that engine. It turns user requests and
//! engine notifications into engine commands while keeping transitions
//! strictly one at a time.
//!
//! All methods run on the control thread. Engine and filesystem failures are
//! logged and reported through a transient status message; they never
//! propagate out of the session.

mod timer;
pub(crate) mod triage;

use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use tracing::{debug, info, warn};

use crate::{
    config::AppConfig,
    engine::{EngineError, EngineState, MediaEngine},
    playlist::{Playlist, scan},
};
use timer::SettleTimer;
use triage::MoveError;

/// Forward long seeks never land inside this tail of the media.
const LONG_SEEK_TAIL_MS: i64 = 10_000;

/// No seek lands closer than this to the end of the media.
const END_GUARD_MS: i64 = 1_000;

/// Remaining time below which playback is reported as nearly over.
const NEAR_END_MS: i64 = 10_000;

const STATUS_INFO_TIME: Duration = Duration::from_millis(4_000);
const STATUS_ERROR_TIME: Duration = Duration::from_millis(5_000);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SessionState {
    Idle,
    Loading,
    Playing,
    Paused,
    Stopped,
}

#[derive(Clone, Debug)]
pub(crate) struct SessionSettings {
    pub(crate) settle_delay: Duration,
    pub(crate) min_rate: f32,
    pub(crate) max_rate: f32,
    pub(crate) seek_long_ms: i64,
    pub(crate) volume: u8,
    pub(crate) repeat: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for SessionSettings {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            settle_delay: Duration::from_millis(cfg.settle_delay_ms),
            min_rate: cfg.min_rate,
            max_rate: cfg.max_rate,
            seek_long_ms: cfg.seek_long_ms,
            volume: cfg.volume.min(100),
            repeat: cfg.repeat,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct StatusMessage {
    pub(crate) text: String,
    pub(crate) expires_at: Instant,
}

/// Position of the current media, refreshed by [`Session::poll`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Progress {
    pub(crate) elapsed_ms: i64,
    pub(crate) total_ms: i64,
    pub(crate) near_end: bool,
}

pub(crate) struct Session<E: MediaEngine> {
    engine: E,
    playlist: Playlist,
    settings: SessionSettings,
    state: SessionState,
    is_transitioning: bool,
    is_repeat_restarting: bool,
    settle: SettleTimer<usize>,
    playback_rate: f32,
    volume: u8,
    muted: bool,
    media_length: Option<i64>,
    directory: Option<PathBuf>,
    status: Option<StatusMessage>,
}

impl<E: MediaEngine> Session<E> {
    pub(crate) fn new(engine: E, mut playlist: Playlist, settings: SessionSettings) -> Self {
        playlist.set_repeat(settings.repeat);

        let mut session = Self {
            engine,
            playlist,
            settle: SettleTimer::new(settings.settle_delay),
            state: SessionState::Idle,
            is_transitioning: false,
            is_repeat_restarting: false,
            playback_rate: 1.0,
            volume: settings.volume,
            muted: false,
            media_length: None,
            directory: None,
            status: None,
            settings,
        };

        let volume = session.volume;
        if let Err(e) = session.engine.set_volume(volume) {
            warn!("Failed to apply initial volume: {}", e);
        }

        session
    }

    // ---- read-only status ----

    pub(crate) fn state(&self) -> SessionState {
        self.state
    }

    pub(crate) fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub(crate) fn current_path(&self) -> Option<&Path> {
        self.playlist.current_path()
    }

    /// `"N / M"` within the active order.
    pub(crate) fn describe(&self) -> String {
        self.playlist.describe()
    }

    /// Header line in the form `[N/M] name`.
    pub(crate) fn title(&self) -> String {
        match self.playlist.current() {
            Some(entry) => format!("[{}] {}", self.describe().replace(' ', ""), entry.name()),
            None => String::from("wagom-player"),
        }
    }

    pub(crate) fn is_repeat_enabled(&self) -> bool {
        self.playlist.is_repeat_enabled()
    }

    pub(crate) fn is_shuffle_enabled(&self) -> bool {
        self.playlist.is_shuffle_enabled()
    }

    pub(crate) fn playback_rate(&self) -> f32 {
        self.playback_rate
    }

    pub(crate) fn volume(&self) -> u8 {
        self.volume
    }

    pub(crate) fn is_muted(&self) -> bool {
        self.muted
    }

    /// The directory the playlist was built from.
    pub(crate) fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    pub(crate) fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// When the pending settle action is due, if one is waiting.
    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.settle.deadline()
    }

    // ---- opening and transitions ----

    /// Builds a playlist from the videos beside `path` and plays `path`.
    ///
    /// A directory loads every video in it and plays the first. This is the
    /// only way the active directory changes; the previous playlist is
    /// replaced entirely.
    pub(crate) fn open_file(&mut self, path: &Path) {
        self.settle.cancel();

        let path = match scan::normalize(path) {
            Ok(path) => path,
            Err(e) => {
                self.report(format!("Cannot open {}: {}", path.display(), e));
                return;
            }
        };

        let (dir, preferred) = if path.is_dir() {
            (path.clone(), None)
        } else {
            match path.parent() {
                Some(parent) => (parent.to_path_buf(), Some(path.as_path())),
                None => {
                    self.report(format!("Cannot open {}", path.display()));
                    return;
                }
            }
        };

        let files = match scan::list_video_files(&dir) {
            Ok(files) => files,
            Err(e) => {
                self.report(format!("Cannot read folder: {}", e));
                return;
            }
        };

        self.playlist.load(files, preferred);
        info!(
            "Loaded {} videos from {}",
            self.playlist.len(),
            dir.display()
        );
        self.directory = Some(dir);

        match self.playlist.current_index() {
            Some(index) => self.play_at(index),
            None => {
                self.stop();
                self.report(String::from("No videos found"));
            }
        }
    }

    /// Loads and plays the entry at `index`.
    ///
    /// Dropped when a transition is already in flight. The playlist selects
    /// the new entry before any engine command is issued, so it stays
    /// selected even if the engine then fails to play it.
    pub(crate) fn play_at(&mut self, index: usize) {
        if self.is_transitioning {
            debug!("Transition in flight, dropping request to play entry {}", index);
            return;
        }

        let Some(path) = self.playlist.select(index) else {
            debug!("No entry at {}", index);
            return;
        };

        self.is_transitioning = true;
        self.is_repeat_restarting = false;
        self.state = SessionState::Loading;

        let result = self.start_media(&path, true);

        self.media_length = None;
        self.is_transitioning = false;

        match result {
            Ok(()) => {
                info!("Playing {}", path.display());
                self.state = SessionState::Playing;
            }
            Err(e) => {
                warn!("Failed to play {}: {}", path.display(), e);
                self.state = SessionState::Stopped;
                self.report(format!("Cannot play {}", display_name(&path)));
            }
        }
    }

    /// Reloads the current entry from the start without stopping first.
    fn restart_current(&mut self) {
        let Some(path) = self.playlist.current_path().map(Path::to_path_buf) else {
            return;
        };

        self.is_repeat_restarting = true;
        self.media_length = None;

        match self.start_media(&path, false) {
            Ok(()) => {
                debug!("Repeating {}", path.display());
                self.state = SessionState::Playing;
            }
            Err(e) => {
                warn!("Failed to repeat {}: {}", path.display(), e);
                self.is_repeat_restarting = false;
                self.state = SessionState::Stopped;
                self.report(format!("Cannot play {}", display_name(&path)));
            }
        }
    }

    fn start_media(&mut self, path: &Path, stop_first: bool) -> Result<(), EngineError> {
        if stop_first && self.engine.is_playing() {
            self.engine.stop()?;
        }

        self.engine.load(path)?;
        self.engine.bind_output_surface()?;
        self.engine.set_rate(self.playback_rate)?;
        self.engine.play()
    }

    /// Handles the engine reaching the end of the current media.
    ///
    /// Repeat reloads the same entry, otherwise the next entry plays after
    /// the settle delay, or playback stops at the end of the playlist.
    /// Notifications arriving while a restart or advance is already under way
    /// are ignored, unless the engine reports the restarted media has itself
    /// already ended.
    pub(crate) fn on_end_of_media(&mut self) {
        if self.is_repeat_restarting && self.engine.state() == EngineState::Ended {
            self.is_repeat_restarting = false;
        }

        if self.is_transitioning || self.is_repeat_restarting || self.settle.is_armed() {
            debug!("Ignoring duplicate end of media");
            return;
        }

        if !matches!(self.state, SessionState::Playing | SessionState::Paused) {
            debug!("Ignoring end of media while {:?}", self.state);
            return;
        }

        if self.playlist.is_repeat_enabled() && self.playlist.current().is_some() {
            self.restart_current();
            return;
        }

        match self.playlist.next_index() {
            Some(index) => self.schedule_play(index),
            None => {
                info!("End of playlist");
                self.stop();
            }
        }
    }

    /// Handles a failure the engine reports after a command was accepted,
    /// typically media it could not decode. Playback is left stopped on the
    /// current entry; play/pause tries it again.
    pub(crate) fn on_engine_error(&mut self, message: &str) {
        warn!("Engine error: {}", message);

        self.settle.cancel();
        self.is_repeat_restarting = false;
        self.media_length = None;
        if self.state != SessionState::Idle {
            self.state = SessionState::Stopped;
        }

        self.report(format!("Playback error: {}", message));
    }

    pub(crate) fn next(&mut self) {
        if let Some(index) = self.playlist.next_index() {
            self.schedule_play(index);
        }
    }

    pub(crate) fn previous(&mut self) {
        if let Some(index) = self.playlist.previous_index() {
            self.schedule_play(index);
        }
    }

    fn schedule_play(&mut self, index: usize) {
        if let Some(index) = self.settle.arm(Instant::now(), index) {
            self.play_at(index);
        }
    }

    /// Runs the pending settle action once it is due.
    pub(crate) fn fire_due(&mut self, now: Instant) {
        if let Some(index) = self.settle.take_due(now) {
            self.play_at(index);
        }
    }

    // ---- transport ----

    /// Pauses or resumes; from a stopped, ended or failed engine the current
    /// entry is played again from the start.
    pub(crate) fn play_pause_toggle(&mut self) {
        match self.engine.state() {
            EngineState::Idle | EngineState::Stopped | EngineState::Ended | EngineState::Error => {
                if let Some(index) = self.playlist.current_index() {
                    self.play_at(index);
                }
            }
            _ if self.engine.is_playing() => match self.engine.pause() {
                Ok(()) => self.state = SessionState::Paused,
                Err(e) => warn!("Failed to pause: {}", e),
            },
            _ => match self.engine.play() {
                Ok(()) => self.state = SessionState::Playing,
                Err(e) => warn!("Failed to resume: {}", e),
            },
        }
    }

    pub(crate) fn stop(&mut self) {
        self.settle.cancel();
        self.is_repeat_restarting = false;

        if let Err(e) = self.engine.stop() {
            warn!("Failed to stop: {}", e);
        }

        self.media_length = None;
        if self.state != SessionState::Idle || self.playlist.current().is_some() {
            self.state = SessionState::Stopped;
        }
    }

    /// Seeks by `delta_ms` from the current position.
    ///
    /// Targets are kept at least a second before the end. A long forward seek
    /// additionally never jumps into the final ten seconds, and never moves
    /// backwards when already inside them. Nothing happens while the position
    /// or length is unknown.
    pub(crate) fn seek_relative(&mut self, delta_ms: i64) {
        let (Some(time), Some(length)) = (self.engine.time_ms(), self.engine.length_ms()) else {
            debug!("Seek ignored, position unknown");
            return;
        };

        if time < 0 || length <= 0 {
            return;
        }

        let mut target = time.saturating_add(delta_ms);
        if delta_ms >= self.settings.seek_long_ms && length > LONG_SEEK_TAIL_MS {
            target = target.min((length - LONG_SEEK_TAIL_MS).max(time));
        }
        let target = target.clamp(0, (length - END_GUARD_MS).max(0));

        self.seek_to(target);
    }

    pub(crate) fn seek_absolute(&mut self, ms: i64) {
        if !matches!(self.state, SessionState::Playing | SessionState::Paused) {
            return;
        }

        let target = match self.engine.length_ms() {
            Some(length) if length > 0 => ms.clamp(0, (length - END_GUARD_MS).max(0)),
            _ => ms.max(0),
        };

        self.seek_to(target);
    }

    fn seek_to(&mut self, target: i64) {
        debug!("Seeking to {}ms", target);
        if let Err(e) = self.engine.set_time(target) {
            warn!("Failed to seek: {}", e);
        }
    }

    // ---- audio and modes ----

    pub(crate) fn set_volume(&mut self, volume: u8) {
        let volume = volume.min(100);
        match self.engine.set_volume(volume) {
            Ok(()) => self.volume = volume,
            Err(e) => warn!("Failed to set volume: {}", e),
        }
    }

    pub(crate) fn adjust_volume(&mut self, delta: i32) {
        let volume = (i32::from(self.volume) + delta).clamp(0, 100);
        self.set_volume(volume as u8);
    }

    pub(crate) fn toggle_mute(&mut self) {
        match self.engine.toggle_mute() {
            Ok(()) => self.muted = !self.muted,
            Err(e) => warn!("Failed to toggle mute: {}", e),
        }
    }

    pub(crate) fn set_repeat(&mut self, enabled: bool) {
        self.playlist.set_repeat(enabled);
        self.notify(format!("Repeat {}", on_off(enabled)));
    }

    pub(crate) fn set_shuffle(&mut self, enabled: bool) {
        self.playlist.set_shuffle(enabled);
        self.notify(format!("Shuffle {}", on_off(enabled)));
    }

    /// Sets the playback rate, clamped to the configured range.
    ///
    /// The rate is kept and applied again to every newly loaded media.
    pub(crate) fn set_playback_rate(&mut self, rate: f32) {
        let rate = if rate.is_finite() { rate } else { 1.0 };
        let rate = ((rate * 100.0).round() / 100.0).clamp(self.settings.min_rate, self.settings.max_rate);

        self.playback_rate = rate;

        if matches!(self.state, SessionState::Playing | SessionState::Paused) {
            if let Err(e) = self.engine.set_rate(rate) {
                warn!("Failed to set playback rate: {}", e);
            }
        }

        self.notify(format!("Speed {:.2}x", rate));
    }

    pub(crate) fn adjust_playback_rate(&mut self, delta: f32) {
        self.set_playback_rate(self.playback_rate + delta);
    }

    // ---- triage ----

    /// Moves the current file into `subfolder` beside it and plays on.
    ///
    /// An existing destination aborts the move before playback is touched.
    /// Otherwise playback stops to release the file, the file is moved and
    /// removed from the playlist, and the entry that followed it in the
    /// active order plays after the settle delay. A failed move leaves
    /// playback stopped and the playlist unchanged.
    pub(crate) fn triage_move(&mut self, subfolder: &str) {
        let Some(index) = self.playlist.current_index() else {
            self.report(MoveError::NoCurrentFile.to_string());
            return;
        };
        let Some(source) = self.playlist.current_path().map(Path::to_path_buf) else {
            return;
        };

        let target = match triage::target_path(&source, subfolder) {
            Ok(target) => target,
            Err(e) => {
                self.report(format!("Move failed: {}", e));
                return;
            }
        };

        match target.try_exists() {
            Ok(false) => {}
            Ok(true) => {
                self.report(format!(
                    "Move failed: {} already exists in {}",
                    display_name(&source),
                    subfolder
                ));
                return;
            }
            Err(e) => {
                self.report(format!("Move failed: cannot check {}: {}", target.display(), e));
                return;
            }
        }

        info!("Stopping playback to release {}", source.display());
        self.stop();

        if let Err(e) = triage::move_into_subfolder(&source, subfolder) {
            self.report(format!("Move failed: {}", e));
            return;
        }

        info!("Moved {} to {}", source.display(), target.display());
        self.notify(format!("Moved {} -> {}", display_name(&source), subfolder));

        match self.playlist.remove_advancing(index) {
            Some(next) => self.schedule_play(next),
            None => info!("Nothing follows the moved file, playback remains stopped"),
        }
    }

    // ---- polling ----

    /// Refreshes the position, length and mute state from the engine and
    /// drops an expired status message.
    pub(crate) fn poll(&mut self, now: Instant) -> Progress {
        self.expire_status(now);

        if let Some(muted) = self.engine.muted() {
            self.muted = muted;
        }

        if !matches!(self.state, SessionState::Playing | SessionState::Paused) {
            return Progress::default();
        }

        let time = self.engine.time_ms();

        if self.is_repeat_restarting && time.is_some() && self.engine.state() == EngineState::Playing
        {
            self.is_repeat_restarting = false;
        }

        if let Some(length) = self.engine.length_ms().filter(|&length| length > 0) {
            self.media_length = Some(length);
        }

        let total_ms = self.media_length.unwrap_or(0);
        let elapsed_ms = time.unwrap_or(0).clamp(0, total_ms.max(0));

        Progress {
            elapsed_ms,
            total_ms,
            near_end: total_ms > 0 && elapsed_ms > 0 && total_ms - elapsed_ms <= NEAR_END_MS,
        }
    }

    pub(crate) fn expire_status(&mut self, now: Instant) {
        if self
            .status
            .as_ref()
            .is_some_and(|status| status.expires_at <= now)
        {
            self.status = None;
        }
    }

    pub(crate) fn notify(&mut self, text: String) {
        self.set_status(text, STATUS_INFO_TIME);
    }

    pub(crate) fn report(&mut self, text: String) {
        warn!("{}", text);
        self.set_status(text, STATUS_ERROR_TIME);
    }

    fn set_status(&mut self, text: String, duration: Duration) {
        self.status = Some(StatusMessage {
            text,
            expires_at: Instant::now() + duration,
        });
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

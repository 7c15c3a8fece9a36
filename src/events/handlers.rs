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

//! Handlers for application events other than key presses.

use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use tracing::debug;

use crate::{App, engine::EngineEvent, events::TriageFolder};

pub(super) fn handle_tick(app: &mut App) {
    app.progress = app.session.poll(Instant::now());
}

/// Engine notifications arrive from the engine's own thread and are only
/// acted on here, on the control thread.
pub(super) fn handle_engine_event(app: &mut App, event: EngineEvent) {
    debug!("Engine event: {:?}", event);

    match event {
        EngineEvent::EndOfMedia => app.session.on_end_of_media(),
        EngineEvent::Error(message) => app.session.on_engine_error(&message),
        EngineEvent::CommandFailed(message) => app.session.report(message),
    }
}

pub(super) fn handle_open_file(app: &mut App, path: PathBuf) {
    let base = app
        .session
        .directory()
        .or(app.config.last_dir.as_deref())
        .map(Path::to_path_buf);
    let path = resolve_open_path(path, base.as_deref());

    debug!("Opening {}", path.display());
    app.session.open_file(&path);
    app.progress = app.session.poll(Instant::now());
}

pub(super) fn handle_triage(app: &mut App, folder: TriageFolder) {
    let subfolder = match folder {
        TriageFolder::Accept => app.config.accept_folder.clone(),
        TriageFolder::Reject => app.config.reject_folder.clone(),
    };

    app.session.triage_move(&subfolder);
    app.progress = app.session.poll(Instant::now());
}

pub(super) fn handle_set_playback_rate(app: &mut App, rate: f32) {
    app.session.set_playback_rate(rate);
}

pub(super) fn handle_set_volume(app: &mut App, volume: u8) {
    app.session.set_volume(volume);
}

pub(super) fn handle_toggle_repeat(app: &mut App) {
    let enabled = !app.session.is_repeat_enabled();
    app.session.set_repeat(enabled);
}

pub(super) fn handle_toggle_shuffle(app: &mut App) {
    let enabled = !app.session.is_shuffle_enabled();
    app.session.set_shuffle(enabled);
}

pub(super) fn handle_error(app: &mut App, message: String) {
    app.session.report(message);
}

/// Relative paths are taken from the folder being played, or failing that
/// the folder played last time. An empty path opens that folder itself.
fn resolve_open_path(path: PathBuf, base: Option<&Path>) -> PathBuf {
    match base {
        Some(base) if path.as_os_str().is_empty() => base.to_path_buf(),
        Some(base) if path.is_relative() => base.join(path),
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_resolve_against_the_base_folder() {
        let base = Path::new("/videos");

        assert_eq!(
            resolve_open_path(PathBuf::from("trip/a.mp4"), Some(base)),
            PathBuf::from("/videos/trip/a.mp4")
        );
        assert_eq!(
            resolve_open_path(PathBuf::new(), Some(base)),
            base.to_path_buf()
        );
    }

    #[test]
    fn absolute_paths_and_missing_base_are_kept() {
        assert_eq!(
            resolve_open_path(PathBuf::from("/clips/b.mp4"), Some(Path::new("/videos"))),
            PathBuf::from("/clips/b.mp4")
        );
        assert_eq!(
            resolve_open_path(PathBuf::from("b.mp4"), None),
            PathBuf::from("b.mp4")
        );
    }
}

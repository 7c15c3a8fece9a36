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

//! Application events and the main event loop.
//!
//! Every input reaches the control thread as an [`AppEvent`] on one
//! channel: key presses, the periodic tick, engine notifications and the
//! commands typed on the command line. Only this thread touches the playback
//! session.
//!
//! # Organization
//!
//! * [`handlers`]: Applies non-key events to the application state.
//! * [`key_handlers`]: Maps key presses to player actions.

mod handlers;
mod key_handlers;

use handlers::*;
use key_handlers::process_key_event;

use std::{
    io::Stdout,
    path::PathBuf,
    sync::mpsc::RecvTimeoutError,
    time::Instant,
};

use anyhow::{Result, anyhow};
use crossterm::event::KeyEvent;
use ratatui::{Terminal, prelude::CrosstermBackend};

use crate::{App, engine::EngineEvent, render::draw, util};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TriageFolder {
    Accept,
    Reject,
}

#[derive(Debug)]
pub(crate) enum AppEvent {
    Key(KeyEvent),

    Tick,

    Engine(EngineEvent),

    OpenFile(PathBuf),
    Triage(TriageFolder),

    SetPlaybackRate(f32),
    SetVolume(u8),
    ToggleRepeat,
    ToggleShuffle,

    ExitApplication,

    Error(String),
    FatalError(String),
}

/// Runs the main application loop, handling events and rendering the UI in the
/// terminal.
///
/// While a settle delay is pending the loop wakes up at its deadline even if
/// no event arrives. This function loops until a quit event is received or the
/// event channel is closed.
pub(crate) fn process_events(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
) -> Result<()> {
    terminal.draw(|f| draw(f, app))?;

    loop {
        let event = match app.session.next_deadline() {
            Some(deadline) => {
                let timeout = deadline.saturating_duration_since(Instant::now());
                match app.event_rx.recv_timeout(timeout) {
                    Ok(event) => Some(event),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            None => match app.event_rx.recv() {
                Ok(event) => Some(event),
                Err(_) => break,
            },
        };

        app.session.fire_due(Instant::now());

        if let Some(event) = event {
            match event {
                AppEvent::ExitApplication => break,
                AppEvent::FatalError(message) => return Err(anyhow!(message)),
                AppEvent::Key(key) => process_key_event(app, key)?,
                AppEvent::Tick => handle_tick(app),
                AppEvent::Engine(engine_event) => handle_engine_event(app, engine_event),
                AppEvent::OpenFile(path) => handle_open_file(app, path),
                AppEvent::Triage(folder) => handle_triage(app, folder),
                AppEvent::SetPlaybackRate(rate) => handle_set_playback_rate(app, rate),
                AppEvent::SetVolume(volume) => handle_set_volume(app, volume),
                AppEvent::ToggleRepeat => handle_toggle_repeat(app),
                AppEvent::ToggleShuffle => handle_toggle_shuffle(app),
                AppEvent::Error(message) => handle_error(app, message),
            }
        }

        let title = app.session.title();
        if title != app.window_title {
            util::term::set_title(&title);
            app.window_title = title;
        }

        terminal.draw(|f| draw(f, app))?;
    }

    Ok(())
}

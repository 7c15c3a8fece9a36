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

//! Keyboard bindings.

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};

use crate::{
    App,
    events::{AppEvent, TriageFolder, handlers::handle_triage},
};

const VOLUME_DELTA: i32 = 10;

/// Maps keyboard input to player actions.
///
/// The command line gets the first look at every key; while it is open it
/// consumes them all.
///
/// # Errors
///
/// Returns an error if an event cannot be sent to the event loop.
pub(super) fn process_key_event(app: &mut App, key: KeyEvent) -> Result<()> {
    if key.kind == KeyEventKind::Release {
        return Ok(());
    }

    if app.commander.handle_event(&Event::Key(key), &app.event_tx) {
        return Ok(());
    }

    let seek_short = app.config.seek_short_ms;
    let seek_long = app.config.seek_long_ms;
    let rate_step = app.config.rate_step;

    match key.code {
        KeyCode::Char('q') => app.event_tx.send(AppEvent::ExitApplication)?,

        // Transport
        KeyCode::Char(' ') => app.session.play_pause_toggle(),
        KeyCode::Char('s') => app.session.stop(),
        KeyCode::PageUp => app.session.previous(),
        KeyCode::PageDown => app.session.next(),

        // Seeking
        KeyCode::Left => app.session.seek_relative(-seek_short),
        KeyCode::Right => app.session.seek_relative(seek_short),
        KeyCode::Char('<') => app.session.seek_relative(-seek_long),
        KeyCode::Char('>') => app.session.seek_relative(seek_long),

        // Audio
        KeyCode::Up => app.session.adjust_volume(VOLUME_DELTA),
        KeyCode::Down => app.session.adjust_volume(-VOLUME_DELTA),
        KeyCode::Char('m') => app.session.toggle_mute(),

        // Modes
        KeyCode::Char('r') => {
            let enabled = !app.session.is_repeat_enabled();
            app.session.set_repeat(enabled);
        }
        KeyCode::Char('z') => {
            let enabled = !app.session.is_shuffle_enabled();
            app.session.set_shuffle(enabled);
        }

        // Playback rate
        KeyCode::Char('[') => app.session.adjust_playback_rate(-rate_step),
        KeyCode::Char(']') => app.session.adjust_playback_rate(rate_step),
        KeyCode::Backspace => app.session.set_playback_rate(1.0),

        // Triage, laid out for the numeric keypad
        KeyCode::Char('9') => handle_triage(app, TriageFolder::Accept),
        KeyCode::Char('6') => handle_triage(app, TriageFolder::Reject),

        _ => {}
    }

    Ok(())
}

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

//! Command-line input logic and state management.
//!
//! This module implements the `:` command line: a text input component that,
//! when a command is submitted, dispatches the corresponding application
//! event.
//!
//! | Command        | Effect                                   |
//! |----------------|------------------------------------------|
//! | `open <path>`  | open a video or folder                   |
//! | `ok` / `ng`    | move the current video to accept/reject |
//! | `rate <x>`     | set the playback rate                    |
//! | `vol <n>`      | set the volume, 0 to 100                 |
//! | `repeat`       | toggle repeat                            |
//! | `shuffle`      | toggle shuffle                           |
//! | `q`            | quit                                     |

use std::{path::PathBuf, sync::mpsc::Sender};

use anyhow::Result;
use crossterm::event::{Event, KeyCode};
use tui_input::{Input, backend::crossterm::EventHandler};

use crate::events::{AppEvent, TriageFolder};

pub(crate) struct Commander {
    active: bool,
    pub(crate) input: Input,
}

impl Commander {
    pub(crate) fn new() -> Self {
        Self {
            active: false,
            input: Input::default(),
        }
    }

    pub(crate) fn active(&self) -> bool {
        self.active
    }

    /// Offers a terminal event to the command line.
    ///
    /// Returns `true` when the event was consumed, either by opening the
    /// command line or by editing or submitting a command.
    pub(crate) fn handle_event(&mut self, event: &Event, event_tx: &Sender<AppEvent>) -> bool {
        let Event::Key(key_event) = event else {
            return false;
        };

        if !self.active {
            if key_event.code == KeyCode::Char(':') {
                self.active = true;
                return true;
            }
            return false;
        }

        match key_event.code {
            KeyCode::Esc => {
                self.input.reset();
                self.active = false;
            }

            KeyCode::Enter => {
                let buffer = self.input.value().trim().to_string();
                if !buffer.is_empty() {
                    let _ = run_command(&buffer, event_tx);
                }
                self.input.reset();
                self.active = false;
            }

            _ => {
                // Delegate all other key events to the managed input component.
                self.input.handle_event(event);
            }
        }

        true
    }
}

fn run_command(buffer: &str, event_tx: &Sender<AppEvent>) -> Result<()> {
    let parts: Vec<&str> = buffer.split_whitespace().collect();

    match parts.as_slice() {
        ["q"] => event_tx.send(AppEvent::ExitApplication)?,

        ["open", ..] => {
            // Keep the path exactly as typed, including inner spaces. Empty
            // reopens the last folder.
            let path = buffer.trim_start()["open".len()..].trim();
            event_tx.send(AppEvent::OpenFile(PathBuf::from(path)))?
        }

        ["ok"] => event_tx.send(AppEvent::Triage(TriageFolder::Accept))?,
        ["ng"] => event_tx.send(AppEvent::Triage(TriageFolder::Reject))?,

        ["rate", rate] => match rate.parse::<f32>() {
            Ok(rate) => event_tx.send(AppEvent::SetPlaybackRate(rate))?,
            Err(_) => event_tx.send(AppEvent::Error(format!("Invalid rate: {}", rate)))?,
        },

        ["vol", volume] => match volume.parse::<u8>() {
            Ok(volume) if volume <= 100 => event_tx.send(AppEvent::SetVolume(volume))?,
            _ => event_tx.send(AppEvent::Error(format!("Invalid volume: {}", volume)))?,
        },

        ["repeat"] => event_tx.send(AppEvent::ToggleRepeat)?,
        ["shuffle"] => event_tx.send(AppEvent::ToggleShuffle)?,

        [] => {}

        [cmd, ..] => event_tx.send(AppEvent::Error(format!("Unknown command: {}", cmd)))?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;
    use std::sync::mpsc::{self, Receiver};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::from(code))
    }

    fn submit(text: &str) -> (Commander, Receiver<AppEvent>) {
        let (tx, rx) = mpsc::channel();
        let mut commander = Commander::new();

        assert!(commander.handle_event(&key(KeyCode::Char(':')), &tx));
        for c in text.chars() {
            commander.handle_event(&key(KeyCode::Char(c)), &tx);
        }
        commander.handle_event(&key(KeyCode::Enter), &tx);

        (commander, rx)
    }

    #[test]
    fn ignores_keys_until_opened() {
        let (tx, rx) = mpsc::channel();
        let mut commander = Commander::new();

        assert!(!commander.handle_event(&key(KeyCode::Char('q')), &tx));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn open_keeps_spaces_in_the_path() {
        let (commander, rx) = submit("open /videos/summer trip.mp4");

        assert!(!commander.active());
        assert!(matches!(
            rx.try_recv(),
            Ok(AppEvent::OpenFile(path)) if path == PathBuf::from("/videos/summer trip.mp4")
        ));
    }

    #[test]
    fn bare_open_asks_for_the_last_folder() {
        let (_, rx) = submit("open");

        assert!(matches!(rx.try_recv(), Ok(AppEvent::OpenFile(path)) if path.as_os_str().is_empty()));
    }

    #[test]
    fn triage_commands() {
        let (_, rx) = submit("ng");
        assert!(matches!(
            rx.try_recv(),
            Ok(AppEvent::Triage(TriageFolder::Reject))
        ));
    }

    #[test]
    fn parses_rate_and_volume() {
        let (_, rx) = submit("rate 1.5");
        assert!(matches!(rx.try_recv(), Ok(AppEvent::SetPlaybackRate(rate)) if rate == 1.5));

        let (_, rx) = submit("vol 101");
        assert!(matches!(rx.try_recv(), Ok(AppEvent::Error(_))));
    }

    #[test]
    fn unknown_commands_are_reported() {
        let (_, rx) = submit("rewind");
        assert!(matches!(rx.try_recv(), Ok(AppEvent::Error(message)) if message.contains("rewind")));
    }

    #[test]
    fn escape_cancels_without_sending() {
        let (tx, rx) = mpsc::channel();
        let mut commander = Commander::new();

        commander.handle_event(&key(KeyCode::Char(':')), &tx);
        commander.handle_event(&key(KeyCode::Char('q')), &tx);
        commander.handle_event(&key(KeyCode::Esc), &tx);

        assert!(!commander.active());
        assert_eq!(commander.input.value(), "");
        assert!(rx.try_recv().is_err());
    }
}

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

//! # Video Player TUI.
//!
//! A terminal front-end for watching and sorting a folder of videos.
//!
//! Opening a video builds a playlist from the videos beside it. The video
//! itself is shown by the media engine in its own window while this
//! application drives playback and lets each file be moved into an accept or
//! reject folder as it is watched.
//!
//! It uses an event-driven architecture where:
//!
//! * The **Main Thread** manages the terminal lifecycle, UI rendering and the
//!   playback session.
//! * The **Engine Worker** owns the media engine and reports back through the
//!   event channel.
//! * **Event Loops** capture user input and periodic ticks to drive the UI
//!   state.
//!
//! ## Architecture
//!
//! The application follows a strict setup-run-teardown pattern to ensure the
//! terminal state is preserved even in the event of a crash. Communication
//! between threads is handled via `std::sync::mpsc` channels.

mod commander;
mod config;
mod engine;
mod events;
mod logging;
mod playlist;
mod render;
mod session;
mod theme;
mod util;

use anyhow::{Context, Result};
use crossterm::{
    event::{self},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend, widgets::ListState};
use std::{
    env, io,
    path::PathBuf,
    sync::mpsc::{self, Receiver, Sender},
    thread,
    time::Duration,
};
use tracing::{info, warn};

use crate::{
    commander::Commander,
    config::AppConfig,
    engine::DefaultEngine,
    events::{AppEvent, process_events},
    playlist::Playlist,
    session::{Progress, Session, SessionSettings},
    theme::Theme,
};

/// Application state.
struct App {
    pub config: AppConfig,

    pub theme: Theme,

    pub event_tx: Sender<AppEvent>,
    pub event_rx: Receiver<AppEvent>,

    pub session: Session<DefaultEngine>,

    pub commander: Commander,

    pub progress: Progress,
    pub playlist_state: ListState,
    pub window_title: String,
}

impl App {
    /// Create a new instance of application state.
    pub fn new(config: AppConfig) -> Self {
        let (event_tx, event_rx) = mpsc::channel();

        let engine = DefaultEngine::new(event_tx.clone(), config.video_window_id);
        let session = Session::new(engine, Playlist::new(), SessionSettings::from(&config));

        Self {
            config,
            theme: Theme::default(),
            event_tx,
            event_rx,
            session,
            commander: Commander::new(),
            progress: Progress::default(),
            playlist_state: ListState::default(),
            window_title: String::new(),
        }
    }

    /// Copies the settings that outlive a run back into the configuration.
    fn store_settings(&mut self) {
        self.config.volume = self.session.volume();
        self.config.repeat = self.session.is_repeat_enabled();
        if let Some(dir) = self.session.directory() {
            self.config.last_dir = Some(dir.to_path_buf());
        }
    }
}

/// The entry point of the application.
///
/// Sets up logging and the communication channels, initializes the
/// application state, manages the terminal lifecycle, and saves the settings
/// on the way out. Returns an error if any part of the execution fails.
fn main() -> Result<()> {
    let config = config::load_config();

    if let Some(dir) = config::config_dir() {
        if let Err(e) = logging::init(&dir) {
            eprintln!("Logging disabled: {:?}", e);
        }
    }

    info!("Starting wagom-player {}", env!("CARGO_PKG_VERSION"));

    let mut app = App::new(config);

    if let Some(path) = startup_path() {
        app.session.open_file(&path);
    }

    let mut terminal = setup_terminal(&app)?;
    let res = run(&mut terminal, &mut app);
    restore_terminal(&mut terminal);

    app.session.stop();
    app.store_settings();
    if let Err(e) = config::save_config(&app.config) {
        warn!("Failed to save settings: {}", e);
    }

    res.context("Application error occurred")
}

/// The first command-line argument naming an existing file or folder.
fn startup_path() -> Option<PathBuf> {
    env::args_os()
        .skip(1)
        .map(PathBuf::from)
        .find(|path| path.exists())
}

/// Prepares the terminal for the TUI application.
///
/// This function performs the following side effects:
/// * Sets the terminal background color based on the provided theme.
/// * Enables raw mode to capture all keyboard input.
/// * Switches the terminal to the alternate screen buffer.
///
/// # Errors
///
/// Returns an error if raw mode cannot be enabled or if the alternate screen
/// cannot be entered.
fn setup_terminal(app: &App) -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    // Set the background of the entire terminal window, without this we'd get
    // a thin black outline
    if let Some(hex) = Theme::to_hex(app.theme.background_colour) {
        util::term::set_terminal_bg(&hex);
    }

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;

    Ok(terminal)
}

/// Restores the terminal to its original state.
///
/// This reverses the changes made by [`setup_terminal`], including disabling
/// raw mode, leaving the alternate screen, and resetting the background color.
/// It also ensures the cursor is made visible again.
///
/// This function is "best-effort" and does not return a result, as it is
/// called during cleanup.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) {
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    util::term::reset_terminal_bg();
    terminal.show_cursor().ok();
}

/// Starts the input and tick threads and enters the main event loop.
///
/// * An input thread polls for terminal keyboard events.
/// * A tick thread drives the position refresh at the configured poll
///   interval.
///
/// # Errors
///
/// Returns an error if the event processing loop encounters an unrecoverable
/// application error.
fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Spawn a thread to translate raw key events to application events.
    let tx_keys = app.event_tx.clone();
    thread::spawn(move || {
        loop {
            match event::read() {
                Ok(event::Event::Key(key)) => {
                    if tx_keys.send(AppEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        }
    });

    // Spawn a thread to send a periodic tick application event, this refreshes
    // the playback position and is the minimum "frame rate" of the UI.
    let tx_tick = app.event_tx.clone();
    let poll_interval = Duration::from_millis(app.config.poll_interval_ms);
    thread::spawn(move || {
        while tx_tick.send(AppEvent::Tick).is_ok() {
            thread::sleep(poll_interval);
        }
    });

    // Application event loop, process events until the user quits
    process_events(terminal, app)
}

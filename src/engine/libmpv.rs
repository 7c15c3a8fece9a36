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

//! MPV-backed video playback engine.
//!
//! `libmpv` does all of the decoding and presentation, showing the video in
//! its own window (or an embedding window when one is configured). A
//! dedicated worker thread owns the MPV handle so that waiting on MPV events
//! never blocks the user interface.
//!
//! # Architecture
//!
//! The engine operates using a dual-channel communication pattern:
//! 1. **Command Channel**: [`MpvEngine`] forwards playback commands (load,
//!    play, pause, seek and so on) to the worker.
//! 2. **Event Channel**: the worker posts [`AppEvent::Engine`] notifications,
//!    such as end of media, to the application event loop.
//!
//! Queries (position, length, pause state) are answered from a snapshot the
//! worker keeps up to date from observed MPV properties, so they never wait
//! on the worker.

use std::{
    path::Path,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError},
    },
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use mpv::Format;
use tracing::{debug, info, warn};

use crate::{
    engine::{EngineError, EngineEvent, EngineState, MediaEngine},
    events::AppEvent,
};

/// How long [`MpvEngine::stop`] waits for MPV to let go of the file.
const STOP_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Debug)]
enum EngineCommand {
    Load(String),
    BindSurface(i64),
    Play,
    Pause,
    /// Acknowledged once MPV has gone idle.
    Stop(Sender<()>),
    Seek(i64),
    SetRate(f32),
    SetVolume(u8),
    ToggleMute,
}

/// Engine state as last observed by the worker.
#[derive(Debug)]
struct Snapshot {
    has_media: bool,
    loading: bool,
    time_ms: Option<i64>,
    length_ms: Option<i64>,
    paused: bool,
    idle: bool,
    ended: bool,
    failed: bool,
    muted: Option<bool>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            has_media: false,
            loading: false,
            time_ms: None,
            length_ms: None,
            paused: false,
            idle: true,
            ended: false,
            failed: false,
            muted: None,
        }
    }
}

/// A handle to the MPV playback engine.
///
/// This struct acts as a command proxy; it does not touch MPV itself but
/// instead sends instructions to the background worker thread.
pub(crate) struct MpvEngine {
    command_tx: Sender<EngineCommand>,
    snapshot: Arc<Mutex<Snapshot>>,
    window_id: Option<i64>,
}

impl MpvEngine {
    /// Spawns the engine worker thread and returns a new engine handle.
    ///
    /// # Arguments
    ///
    /// * `event_tx` - Channel for end of media and error notifications.
    /// * `window_id` - Native window to embed the video into, if any.
    pub(crate) fn new(event_tx: Sender<AppEvent>, window_id: Option<i64>) -> Self {
        let (command_tx, command_rx) = mpsc::channel::<EngineCommand>();
        let snapshot = Arc::new(Mutex::new(Snapshot::default()));

        spawn_engine_worker(command_rx, event_tx, Arc::clone(&snapshot));

        Self {
            command_tx,
            snapshot,
            window_id,
        }
    }

    fn send(&self, command: EngineCommand) -> Result<(), EngineError> {
        self.command_tx
            .send(command)
            .map_err(|_| EngineError::WorkerGone)
    }

    fn snapshot(&self) -> MutexGuard<'_, Snapshot> {
        lock(&self.snapshot)
    }
}

impl MediaEngine for MpvEngine {
    fn load(&mut self, path: &Path) -> Result<(), EngineError> {
        {
            let mut snapshot = self.snapshot();
            snapshot.has_media = true;
            snapshot.loading = true;
            snapshot.time_ms = None;
            snapshot.length_ms = None;
            snapshot.ended = false;
            snapshot.failed = false;
            snapshot.idle = false;
        }

        self.send(EngineCommand::Load(path.to_string_lossy().into_owned()))
    }

    fn bind_output_surface(&mut self) -> Result<(), EngineError> {
        // Without an embedding window MPV opens its own.
        match self.window_id {
            Some(window_id) => self.send(EngineCommand::BindSurface(window_id)),
            None => Ok(()),
        }
    }

    fn play(&mut self) -> Result<(), EngineError> {
        self.snapshot().paused = false;
        self.send(EngineCommand::Play)
    }

    fn pause(&mut self) -> Result<(), EngineError> {
        self.snapshot().paused = true;
        self.send(EngineCommand::Pause)
    }

    fn stop(&mut self) -> Result<(), EngineError> {
        {
            let mut snapshot = self.snapshot();
            snapshot.idle = true;
            snapshot.loading = false;
            snapshot.ended = false;
            snapshot.time_ms = None;
        }

        // The caller may move or delete the file next, so wait for MPV to
        // close it rather than just queueing the command.
        let (done_tx, done_rx) = mpsc::channel();
        self.send(EngineCommand::Stop(done_tx))?;

        match done_rx.recv_timeout(STOP_TIMEOUT) {
            Ok(()) => Ok(()),
            Err(RecvTimeoutError::Timeout) => {
                warn!("MPV did not confirm stop within {:?}", STOP_TIMEOUT);
                Ok(())
            }
            Err(RecvTimeoutError::Disconnected) => Err(EngineError::WorkerGone),
        }
    }

    fn is_playing(&self) -> bool {
        self.state() == EngineState::Playing
    }

    fn state(&self) -> EngineState {
        let snapshot = self.snapshot();

        if snapshot.failed {
            EngineState::Error
        } else if snapshot.ended {
            EngineState::Ended
        } else if !snapshot.has_media {
            EngineState::Idle
        } else if snapshot.idle {
            EngineState::Stopped
        } else if snapshot.loading {
            EngineState::Opening
        } else if snapshot.paused {
            EngineState::Paused
        } else {
            EngineState::Playing
        }
    }

    fn set_time(&mut self, ms: i64) -> Result<(), EngineError> {
        self.snapshot().time_ms = Some(ms);
        self.send(EngineCommand::Seek(ms))
    }

    fn time_ms(&self) -> Option<i64> {
        self.snapshot().time_ms
    }

    fn length_ms(&self) -> Option<i64> {
        self.snapshot().length_ms
    }

    fn set_rate(&mut self, rate: f32) -> Result<(), EngineError> {
        self.send(EngineCommand::SetRate(rate))
    }

    fn set_volume(&mut self, volume: u8) -> Result<(), EngineError> {
        self.send(EngineCommand::SetVolume(volume))
    }

    fn toggle_mute(&mut self) -> Result<(), EngineError> {
        self.send(EngineCommand::ToggleMute)
    }

    fn muted(&self) -> Option<bool> {
        self.snapshot().muted
    }
}

fn lock(snapshot: &Mutex<Snapshot>) -> MutexGuard<'_, Snapshot> {
    snapshot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Spawns the engine worker thread to process playback commands.
///
/// If MPV cannot be initialised the failure is broadcast as a fatal
/// application event, there is nothing to play with otherwise.
fn spawn_engine_worker(
    command_rx: Receiver<EngineCommand>,
    event_tx: Sender<AppEvent>,
    snapshot: Arc<Mutex<Snapshot>>,
) {
    let error_tx = event_tx.clone();

    thread::spawn(move || {
        if let Err(e) = engine_worker(command_rx, event_tx, snapshot) {
            let _ = error_tx.send(AppEvent::FatalError(format!("MPV worker failure: {:?}", e)));
        }
    });
}

/// The primary execution loop for the engine backend.
///
/// Initialises a local `libmpv` context, then alternates between draining
/// commands and waiting briefly for MPV events until the command channel is
/// closed.
fn engine_worker(
    command_rx: Receiver<EngineCommand>,
    event_tx: Sender<AppEvent>,
    snapshot: Arc<Mutex<Snapshot>>,
) -> Result<()> {
    let mut handler = (|| {
        let mut builder = mpv::MpvHandlerBuilder::new().context("Failed to create MPV builder")?;
        builder
            .set_option("force-window", "yes")
            .context("Failed to enable the video window")?;
        builder
            .set_option("keep-open", "no")
            .context("Failed to disable keep-open")?;
        builder.build().context("Failed to build MPV handler")
    })()?;

    handler
        .observe_property::<f64>("time-pos", 0)
        .context("Failed to observe time-pos")?;
    handler
        .observe_property::<f64>("duration", 0)
        .context("Failed to observe duration")?;
    handler
        .observe_property::<bool>("pause", 0)
        .context("Failed to observe pause")?;
    handler
        .observe_property::<bool>("idle-active", 0)
        .context("Failed to observe idle-active")?;
    handler
        .observe_property::<bool>("mute", 0)
        .context("Failed to observe mute")?;

    info!("MPV engine started");

    let mut worker = WorkerState::default();

    while process_commands(&mut handler, &mut worker, &command_rx, &event_tx) {
        process_mpv_events(&mut handler, &mut worker, &event_tx, &snapshot)?;
    }

    info!("MPV engine stopped, command channel closed");

    Ok(())
}

/// What the worker itself has observed of MPV, independent of the snapshot
/// the engine handle updates eagerly.
struct WorkerState {
    idle: bool,
    stop_waiters: Vec<Sender<()>>,
}

impl Default for WorkerState {
    fn default() -> Self {
        Self {
            idle: true,
            stop_waiters: Vec::new(),
        }
    }
}

impl WorkerState {
    fn release_stop_waiters(&mut self) {
        for waiter in self.stop_waiters.drain(..) {
            let _ = waiter.send(());
        }
    }
}

/// Drains and executes all pending commands.
///
/// A failing command is logged and reported, it never stops the worker.
/// Returns `false` once the command channel has been closed.
fn process_commands(
    handler: &mut mpv::MpvHandler,
    worker: &mut WorkerState,
    command_rx: &Receiver<EngineCommand>,
    event_tx: &Sender<AppEvent>,
) -> bool {
    loop {
        match command_rx.try_recv() {
            Ok(command) => {
                debug!("Engine command: {:?}", command);

                let result = run_command(handler, &command);

                if let EngineCommand::Stop(done) = &command {
                    worker.stop_waiters.push(done.clone());
                    // Nothing is open, or stopping failed: MPV will not go
                    // idle on our account, so answer straight away.
                    if worker.idle || result.is_err() {
                        worker.release_stop_waiters();
                    }
                }

                if let Err(e) = result {
                    warn!("Engine command {:?} failed: {:?}", command, e);
                    let message = format!("{:?} failed", command);
                    let event = match command {
                        EngineCommand::Load(_) => EngineEvent::Error(message),
                        _ => EngineEvent::CommandFailed(message),
                    };
                    let _ = event_tx.send(AppEvent::Engine(event));
                }
            }
            Err(TryRecvError::Empty) => return true,
            Err(TryRecvError::Disconnected) => return false,
        }
    }
}

fn run_command(handler: &mut mpv::MpvHandler, command: &EngineCommand) -> Result<()> {
    match command {
        EngineCommand::Load(filename) => handler
            .command(&["loadfile", filename, "replace"])
            .context(format!("Failed to load file: {}", filename))?,
        EngineCommand::BindSurface(window_id) => handler.set_property("wid", *window_id)?,
        EngineCommand::Play => handler.set_property("pause", false)?,
        EngineCommand::Pause => handler.set_property("pause", true)?,
        EngineCommand::Stop(_) => handler.command(&["stop"])?,
        EngineCommand::Seek(ms) => {
            let seconds = format!("{:.3}", *ms as f64 / 1000.0);
            handler.command(&["seek", &seconds, "absolute"])?
        }
        EngineCommand::SetRate(rate) => handler.set_property("speed", f64::from(*rate))?,
        EngineCommand::SetVolume(volume) => {
            handler.set_property("volume", f64::from(*volume))?
        }
        EngineCommand::ToggleMute => handler.command(&["cycle", "mute"])?,
    }

    Ok(())
}

/// Waits up to 50ms for an MPV event and folds it into the snapshot.
///
/// Reaching the end of a file is forwarded to the application; a file that
/// ends for any other reason (stop, replaced by a new load) is not. Pending
/// stops are acknowledged once MPV reports it is idle.
fn process_mpv_events(
    handler: &mut mpv::MpvHandler,
    worker: &mut WorkerState,
    event_tx: &Sender<AppEvent>,
    snapshot: &Mutex<Snapshot>,
) -> Result<()> {
    let Some(mpv_event) = handler.wait_event(0.05) else {
        return Ok(());
    };

    let app_event = match mpv_event {
        mpv::Event::PropertyChange { name, change, .. } => {
            let mut snapshot = lock(snapshot);

            match (name, change) {
                ("time-pos", Format::Double(seconds)) if seconds >= 0.0 => {
                    snapshot.time_ms = Some((seconds * 1000.0) as i64);
                    snapshot.loading = false;
                }
                ("duration", Format::Double(seconds)) if seconds > 0.0 => {
                    snapshot.length_ms = Some((seconds * 1000.0) as i64);
                    snapshot.loading = false;
                }
                ("pause", Format::Flag(paused)) => snapshot.paused = paused,
                ("idle-active", Format::Flag(idle)) => {
                    snapshot.idle = idle;
                    worker.idle = idle;
                    if idle {
                        worker.release_stop_waiters();
                    }
                }
                ("mute", Format::Flag(muted)) => snapshot.muted = Some(muted),
                _ => {}
            }

            None
        }
        mpv::Event::EndFile(Ok(mpv::EndFileReason::MPV_END_FILE_REASON_EOF)) => {
            let mut snapshot = lock(snapshot);
            snapshot.ended = true;
            snapshot.time_ms = None;

            Some(AppEvent::Engine(EngineEvent::EndOfMedia))
        }
        mpv::Event::EndFile(Ok(mpv::EndFileReason::MPV_END_FILE_REASON_ERROR))
        | mpv::Event::EndFile(Err(_)) => {
            let mut snapshot = lock(snapshot);
            snapshot.failed = true;
            snapshot.loading = false;

            Some(AppEvent::Engine(EngineEvent::Error(String::from(
                "MPV could not play the file",
            ))))
        }
        _ => None,
    };

    if let Some(event) = app_event {
        event_tx.send(event).context("Failed to send engine event")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_releases_every_waiting_stop() {
        let mut worker = WorkerState::default();
        let (first_tx, first_rx) = mpsc::channel();
        let (second_tx, second_rx) = mpsc::channel();
        worker.stop_waiters.push(first_tx);
        worker.stop_waiters.push(second_tx);

        worker.release_stop_waiters();

        assert!(worker.stop_waiters.is_empty());
        assert_eq!(first_rx.try_recv(), Ok(()));
        assert_eq!(second_rx.try_recv(), Ok(()));
    }

    #[test]
    fn a_stop_waits_while_media_is_open() {
        let (done_tx, done_rx) = mpsc::channel();
        let mut worker = WorkerState {
            idle: false,
            stop_waiters: vec![done_tx],
        };

        assert!(done_rx.try_recv().is_err());

        worker.release_stop_waiters();
        assert_eq!(done_rx.recv_timeout(STOP_TIMEOUT), Ok(()));
    }
}

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

//! Render the video player controls.
//!
//! This module renders the playback state, the current file, elapsed and
//! total time, the playback modes and the position and volume gauges.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Padding, Paragraph},
};

use crate::{
    App,
    render::icons::{
        ICON_LOADING, ICON_MUTED, ICON_PAUSE, ICON_PLAY, ICON_REPEAT, ICON_SHUFFLE, ICON_STOP,
        ICON_VOLUME,
    },
    session::SessionState,
    util::format::format_ms,
};

/// Renders the main player widget including file info and controls.
pub(crate) fn draw_player(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::TOP | Borders::BOTTOM)
        .border_style(Style::default().fg(app.theme.border_colour))
        .padding(Padding::horizontal(1));

    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner_area);

    let info_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(30)])
        .split(chunks[0]);

    let session = &app.session;
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let icon = match session.state() {
        SessionState::Playing => ICON_PLAY,
        SessionState::Paused => ICON_PAUSE,
        SessionState::Loading => ICON_LOADING,
        SessionState::Idle | SessionState::Stopped => ICON_STOP,
    };

    if let Some(entry) = session.playlist().current() {
        let file_line = Line::from(vec![
            Span::styled(format!(" {} ", icon), bold).fg(Color::White),
            Span::styled(entry.name(), bold).fg(app.theme.accent_colour),
        ]);
        f.render_widget(Paragraph::new(file_line), info_chunks[0]);

        let progress = app.progress;
        let remaining = (progress.total_ms - progress.elapsed_ms).max(0);

        let time_line = Line::from(vec![
            Span::styled(format_ms(progress.elapsed_ms), bold).fg(app.theme.accent_colour),
            Span::styled(" / ", bold).fg(Color::White),
            Span::styled(format_ms(progress.total_ms), bold).fg(app.theme.accent_colour),
            Span::styled(" (-", bold).fg(Color::White),
            Span::styled(format_ms(remaining), bold).fg(app.theme.accent_colour),
            Span::styled(")", bold).fg(Color::White),
        ]);

        f.render_widget(
            Paragraph::new(time_line).alignment(Alignment::Right),
            info_chunks[1],
        );
    } else {
        f.render_widget(
            Paragraph::new(format!(" {}  Open a video with :open <path>", icon)).fg(Color::White),
            info_chunks[0],
        );
    }

    let control_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(26)])
        .split(chunks[2]);

    let mode = |active: bool| {
        if active {
            Style::default().fg(app.theme.accent_colour)
        } else {
            Style::default().fg(app.theme.border_colour)
        }
    };

    let modes_line = Line::from(vec![
        Span::styled(format!("{} ", ICON_REPEAT), mode(session.is_repeat_enabled())),
        Span::styled(format!("{} ", ICON_SHUFFLE), mode(session.is_shuffle_enabled())),
        Span::styled(format!(" {:.2}x ", session.playback_rate()), bold).fg(Color::White),
        Span::styled(format!(" {}", session.describe()), bold).fg(app.theme.accent_colour),
    ]);
    f.render_widget(Paragraph::new(modes_line), control_chunks[0]);

    let volume_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(5),
        ])
        .split(control_chunks[1]);

    let volume_icon = if session.is_muted() {
        ICON_MUTED
    } else {
        ICON_VOLUME
    };
    f.render_widget(Paragraph::new(volume_icon), volume_layout[0]);

    let volume = session.volume();
    let volume_gauge = Gauge::default()
        .gauge_style(
            Style::default()
                .fg(app.theme.accent_colour)
                .bg(app.theme.gauge_track_colour),
        )
        .ratio(f64::from(volume) / 100.0)
        .label("")
        .use_unicode(true);
    f.render_widget(volume_gauge, volume_layout[1]);

    let volume_label = Paragraph::new(format!(" {}%", volume))
        .alignment(Alignment::Right)
        .fg(Color::White);
    f.render_widget(volume_label, volume_layout[2]);

    let progress = app.progress;
    let position = if progress.total_ms > 0 {
        (progress.elapsed_ms as f64 / progress.total_ms as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let position_colour = if progress.near_end {
        app.theme.near_end_colour
    } else {
        app.theme.accent_colour
    };

    let position_gauge = Gauge::default()
        .gauge_style(
            Style::default()
                .fg(position_colour)
                .bg(app.theme.gauge_track_colour),
        )
        .ratio(position)
        .label("")
        .use_unicode(true);

    f.render_widget(position_gauge, chunks[4]);
}

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

//! Render the playlist panel.
//!
//! Entries are listed in folder order with the current entry highlighted.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState},
};

use crate::{playlist::Playlist, theme::Theme};

pub(crate) fn draw_playlist(
    f: &mut Frame,
    area: Rect,
    playlist: &Playlist,
    state: &mut ListState,
    theme: &Theme,
) {
    let items: Vec<ListItem> = playlist
        .entries()
        .iter()
        .map(|entry| ListItem::new(entry.name()).style(Style::default().fg(theme.entry_fg)))
        .collect();

    let title = format!(" Playlist {} ", playlist.describe());

    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border_colour)),
        )
        .highlight_style(
            Style::default()
                .fg(theme.current_entry_fg)
                .bg(theme.current_entry_bg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    state.select(playlist.current_index());

    f.render_stateful_widget(list, area, state);
}

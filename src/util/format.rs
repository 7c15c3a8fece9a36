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

//! Human-readable formatting for the player display.

/// Formats a position or duration in milliseconds as `MM:SS`, or `HH:MM:SS`
/// from one hour upwards.
///
/// Unknown or negative values display as `00:00`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(format_ms(65_000), "01:05");
/// assert_eq!(format_ms(3_600_000), "01:00:00");
/// ```
pub(crate) fn format_ms(ms: i64) -> String {
    if ms <= 0 {
        return String::from("00:00");
    }

    let total_seconds = ms / 1000;
    let hours = total_seconds / 3600;
    let mins = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{:02}:{:02}", mins, secs)
    }
}

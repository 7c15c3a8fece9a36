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

//! Explorer-style "logical" file name ordering.
//!
//! File names are compared so that embedded numbers sort by value rather than
//! character by character (`clip2` before `clip10`) and letters compare
//! without regard to case.
//!
//! On Windows the shell's own `StrCmpLogicalW` is used so that the playlist
//! matches what the user sees in Explorer. Everywhere else a portable
//! comparison is used: names are NFKC-normalised and case-folded, digit runs
//! are compared numerically and everything else character by character.

use std::{cmp::Ordering, path::Path};

use unicode_normalization::UnicodeNormalization;

/// Orders two paths by their file names, ignoring the directory portion.
///
/// The full path is only consulted to break ties between equal names, which
/// keeps the ordering total (and therefore sorting idempotent) when a list
/// spans several directories.
pub(crate) fn compare_paths(a: &Path, b: &Path) -> Ordering {
    compare_names(&file_name(a), &file_name(b)).then_with(|| a.cmp(b))
}

/// Compares two file names using the platform's logical ordering.
#[cfg(windows)]
pub(crate) fn compare_names(a: &str, b: &str) -> Ordering {
    logical::compare(a, b).then_with(|| a.cmp(b))
}

/// Compares two file names using the portable logical ordering.
#[cfg(not(windows))]
pub(crate) fn compare_names(a: &str, b: &str) -> Ordering {
    natural_compare(a, b)
}

/// Portable natural comparison, digit runs compared as integers and text
/// compared case-insensitively.
///
/// Names that compare equal once folded fall back to a plain comparison of
/// the original strings.
pub(crate) fn natural_compare(a: &str, b: &str) -> Ordering {
    let left = fold(a);
    let right = fold(b);

    let (mut i, mut j) = (0, 0);

    while i < left.len() && j < right.len() {
        let (x, y) = (left[i], right[j]);

        if x.is_ascii_digit() && y.is_ascii_digit() {
            let x_end = digit_run_end(&left, i);
            let y_end = digit_run_end(&right, j);

            let ord = compare_digit_runs(&left[i..x_end], &right[j..y_end]);
            if ord != Ordering::Equal {
                return ord;
            }

            i = x_end;
            j = y_end;
        } else {
            match x.cmp(&y) {
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
                ord => return ord,
            }
        }
    }

    (left.len() - i)
        .cmp(&(right.len() - j))
        .then_with(|| a.cmp(b))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn fold(name: &str) -> Vec<char> {
    name.nfkc().flat_map(char::to_lowercase).collect()
}

fn digit_run_end(chars: &[char], start: usize) -> usize {
    chars[start..]
        .iter()
        .position(|c| !c.is_ascii_digit())
        .map_or(chars.len(), |offset| start + offset)
}

// Compares digit runs by value without parsing, so arbitrarily long runs
// cannot overflow.
fn compare_digit_runs(a: &[char], b: &[char]) -> Ordering {
    let a = strip_leading_zeros(a);
    let b = strip_leading_zeros(b);

    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn strip_leading_zeros(run: &[char]) -> &[char] {
    let zeros = run.iter().take_while(|&&c| c == '0').count();
    &run[zeros..]
}

#[cfg(windows)]
mod logical {
    use std::cmp::Ordering;

    use windows_sys::Win32::UI::Shell::StrCmpLogicalW;

    pub(super) fn compare(a: &str, b: &str) -> Ordering {
        let a = wide(a);
        let b = wide(b);

        // SAFETY: both buffers are NUL-terminated UTF-16 and live for the
        // duration of the call.
        let result = unsafe { StrCmpLogicalW(a.as_ptr(), b.as_ptr()) };
        result.cmp(&0)
    }

    fn wide(s: &str) -> Vec<u16> {
        s.encode_utf16().chain(std::iter::once(0)).collect()
    }
}

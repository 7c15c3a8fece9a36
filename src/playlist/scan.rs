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

//! Video file discovery and path normalisation.
//!
//! Directory listings are single level only, a playlist is always the set of
//! videos sitting next to the file that was opened.

use std::{
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// File extensions recognised as playable video, lower case.
pub(crate) const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "wmv", "flv", "ts", "m4v", "3gp", "3g2", "mpeg", "mpg", "mpe",
    "rm", "rmvb", "vob", "webm",
];

#[derive(Debug, Error)]
pub(crate) enum ScanError {
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Whether the path carries one of the supported video extensions.
pub(crate) fn is_supported_video(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// The comparison key for a playlist entry.
///
/// Entries are matched case-insensitively on every platform, so two paths
/// that differ only by case are treated as the same file.
pub(crate) fn path_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

/// Makes a path absolute without touching the filesystem.
pub(crate) fn normalize(path: &Path) -> io::Result<PathBuf> {
    std::path::absolute(path)
}

/// Lists the supported video files directly inside `dir`.
///
/// The returned paths are in directory order; sorting is left to the
/// playlist. Entries that cannot be read are skipped, but an unreadable
/// directory is an error.
pub(crate) fn list_video_files(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    if !dir.is_dir() {
        return Err(ScanError::NotADirectory(dir.to_path_buf()));
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(ScanError::Walk {
                    path: dir.to_path_buf(),
                    source: e,
                });
            }
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if entry.file_type().is_file() && is_supported_video(entry.path()) {
            files.push(entry.into_path());
        }
    }

    debug!("Found {} video files in {}", files.len(), dir.display());

    Ok(files)
}

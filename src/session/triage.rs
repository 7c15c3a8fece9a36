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

//! Moving a video into an accept or reject subfolder beside it.
//!
//! Moves never overwrite: when the destination already exists the move is
//! refused and the source is left untouched.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub(crate) enum MoveError {
    #[error("no file is selected")]
    NoCurrentFile,

    #[error("{} has no containing directory", .0.display())]
    NoParent(PathBuf),

    #[error("{} already exists", .0.display())]
    TargetExists(PathBuf),

    #[error("failed to move {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// `<containing dir>/<subfolder>/<file name>` for `file`.
pub(crate) fn target_path(file: &Path, subfolder: &str) -> Result<PathBuf, MoveError> {
    let name = file
        .file_name()
        .ok_or_else(|| MoveError::NoParent(file.to_path_buf()))?;
    let parent = file
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .ok_or_else(|| MoveError::NoParent(file.to_path_buf()))?;

    Ok(parent.join(subfolder).join(name))
}

/// Moves `file` into `subfolder` of its own directory, creating the
/// subfolder when needed. Returns the new path.
pub(crate) fn move_into_subfolder(file: &Path, subfolder: &str) -> Result<PathBuf, MoveError> {
    let target = target_path(file, subfolder)?;

    if let Some(dir) = target.parent() {
        fs::create_dir_all(dir).map_err(|source| MoveError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    move_no_clobber(file, &target)?;

    Ok(target)
}

/// Renames `from` to `to`, failing if `to` already exists.
///
/// A hard link claims the destination atomically where the filesystem
/// supports it. Otherwise this falls back to an existence check followed by
/// a plain rename.
pub(crate) fn move_no_clobber(from: &Path, to: &Path) -> Result<(), MoveError> {
    match fs::hard_link(from, to) {
        Ok(()) => {
            if let Err(source) = fs::remove_file(from) {
                let _ = fs::remove_file(to);
                return Err(MoveError::Io {
                    path: from.to_path_buf(),
                    source,
                });
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            Err(MoveError::TargetExists(to.to_path_buf()))
        }
        Err(e) => {
            debug!("Hard link unavailable ({}), renaming instead", e);

            let exists = to.try_exists().map_err(|source| MoveError::Io {
                path: to.to_path_buf(),
                source,
            })?;
            if exists {
                return Err(MoveError::TargetExists(to.to_path_buf()));
            }

            fs::rename(from, to).map_err(|source| MoveError::Io {
                path: from.to_path_buf(),
                source,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn builds_target_beside_the_file() {
        let target = target_path(Path::new("/videos/clip.mp4"), "_ok").expect("target");
        assert_eq!(target, Path::new("/videos/_ok/clip.mp4"));
    }

    #[test]
    fn bare_file_name_has_no_parent() {
        assert!(matches!(
            target_path(Path::new("clip.mp4"), "_ok"),
            Err(MoveError::NoParent(_))
        ));
    }

    #[test]
    fn moves_and_creates_subfolder() {
        let dir = tempdir().expect("tempdir");
        let file = dir.path().join("clip.mp4");
        fs::write(&file, b"video").expect("write");

        let target = move_into_subfolder(&file, "_ng").expect("move");

        assert_eq!(target, dir.path().join("_ng").join("clip.mp4"));
        assert!(!file.exists());
        assert_eq!(fs::read(&target).expect("read"), b"video");
    }

    #[test]
    fn refuses_to_overwrite() {
        let dir = tempdir().expect("tempdir");
        let file = dir.path().join("clip.mp4");
        fs::write(&file, b"new").expect("write");
        fs::create_dir(dir.path().join("_ok")).expect("mkdir");
        let existing = dir.path().join("_ok").join("clip.mp4");
        fs::write(&existing, b"old").expect("write");

        let result = move_into_subfolder(&file, "_ok");

        assert!(matches!(result, Err(MoveError::TargetExists(_))));
        assert_eq!(fs::read(&file).expect("read"), b"new");
        assert_eq!(fs::read(&existing).expect("read"), b"old");
    }

    #[test]
    fn missing_source_is_an_io_error() {
        let dir = tempdir().expect("tempdir");
        let result = move_into_subfolder(&dir.path().join("gone.mp4"), "_ok");
        assert!(matches!(result, Err(MoveError::Io { .. })));
    }
}

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

//! Directory playlist state and ordering.
//!
//! The [`Playlist`] holds the videos of one directory in logical file name
//! order (the canonical order) and an optional shuffled view of the same
//! entries. All navigation answers are expressed as indices into the
//! canonical order, whichever view is active.
//!
//! # Shuffle
//!
//! Turning shuffle on builds a permutation that starts with the current entry
//! followed by every other entry in random order. The canonical order and the
//! current index are never changed by shuffling.
//!
//! # Repeat
//!
//! Repeat only affects automatic forward advance: [`Playlist::next_index`]
//! keeps returning the current entry. Going back is unaffected.

pub(crate) mod order;
pub(crate) mod scan;

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use rand::{SeedableRng, rngs::SmallRng, seq::SliceRandom};

/// A video file in the playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlaylistEntry {
    path: PathBuf,
    key: String,
}

impl PlaylistEntry {
    fn new(path: PathBuf) -> Self {
        let key = scan::path_key(&path);
        Self { path, key }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// The file name, for display.
    pub(crate) fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }
}

pub(crate) struct Playlist {
    files: Vec<PlaylistEntry>,
    current_index: Option<usize>,
    shuffle_enabled: bool,
    shuffled_order: Vec<usize>,
    repeat_enabled: bool,
    rng: SmallRng,
}

impl Playlist {
    pub(crate) fn new() -> Self {
        Self::with_rng(rand::make_rng())
    }

    /// Creates a playlist whose shuffles are reproducible.
    pub(crate) fn with_seed(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rng: SmallRng) -> Self {
        Self {
            files: Vec::new(),
            current_index: None,
            shuffle_enabled: false,
            shuffled_order: Vec::new(),
            repeat_enabled: false,
            rng,
        }
    }

    /// Replaces the playlist with the supported videos in `paths`.
    ///
    /// Paths are made absolute, de-duplicated case-insensitively and sorted
    /// into logical order. The current entry becomes `current` when it is in
    /// the new list, otherwise the first entry.
    pub(crate) fn load<I, P>(&mut self, paths: I, current: Option<&Path>)
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut seen = HashSet::new();

        let mut files: Vec<PlaylistEntry> = paths
            .into_iter()
            .filter(|path| scan::is_supported_video(path.as_ref()))
            .filter_map(|path| scan::normalize(path.as_ref()).ok())
            .map(PlaylistEntry::new)
            .filter(|entry| seen.insert(entry.key.clone()))
            .collect();

        files.sort_by(|a, b| order::compare_paths(&a.path, &b.path));

        self.files = files;
        self.shuffled_order.clear();
        self.current_index = self.resolve_index(current);

        if self.shuffle_enabled {
            self.rebuild_shuffle();
        }

        self.check_invariants();
    }

    fn resolve_index(&self, current: Option<&Path>) -> Option<usize> {
        if self.files.is_empty() {
            return None;
        }

        current.and_then(|path| self.position_of(path)).or(Some(0))
    }

    /// Finds the canonical index of `path`, matching case-insensitively.
    pub(crate) fn position_of(&self, path: &Path) -> Option<usize> {
        let key = scan::normalize(path).ok().map(|p| scan::path_key(&p))?;
        self.files.iter().position(|entry| entry.key == key)
    }

    pub(crate) fn entries(&self) -> &[PlaylistEntry] {
        &self.files
    }

    pub(crate) fn len(&self) -> usize {
        self.files.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub(crate) fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub(crate) fn current(&self) -> Option<&PlaylistEntry> {
        self.current_index.and_then(|index| self.files.get(index))
    }

    pub(crate) fn current_path(&self) -> Option<&Path> {
        self.current().map(PlaylistEntry::path)
    }

    /// Makes `index` the current entry, returning its path.
    pub(crate) fn select(&mut self, index: usize) -> Option<PathBuf> {
        let path = self.files.get(index)?.path.clone();
        self.current_index = Some(index);
        Some(path)
    }

    pub(crate) fn is_shuffle_enabled(&self) -> bool {
        self.shuffle_enabled
    }

    pub(crate) fn is_repeat_enabled(&self) -> bool {
        self.repeat_enabled
    }

    pub(crate) fn set_repeat(&mut self, enabled: bool) {
        self.repeat_enabled = enabled;
    }

    /// Enables or disables the shuffled view.
    ///
    /// Enabling always builds a fresh permutation with the current entry
    /// first, disabling throws the permutation away.
    pub(crate) fn set_shuffle(&mut self, enabled: bool) {
        self.shuffle_enabled = enabled;
        self.shuffled_order.clear();

        if enabled {
            self.rebuild_shuffle();
        }

        self.check_invariants();
    }

    /// The shuffled view as canonical indices, empty when shuffle is off.
    pub(crate) fn shuffled_order(&self) -> &[usize] {
        &self.shuffled_order
    }

    fn rebuild_shuffle(&mut self) {
        if self.files.is_empty() {
            return;
        }

        let current = self.current_index;

        let mut rest: Vec<usize> = (0..self.files.len())
            .filter(|&index| Some(index) != current)
            .collect();
        rest.shuffle(&mut self.rng);

        self.shuffled_order = current.into_iter().chain(rest).collect();
    }

    fn shuffle_active(&self) -> bool {
        self.shuffle_enabled && !self.shuffled_order.is_empty()
    }

    // Position of a canonical index within the active view.
    fn active_position(&self, index: usize) -> Option<usize> {
        if self.shuffle_active() {
            self.shuffled_order.iter().position(|&i| i == index)
        } else {
            (index < self.files.len()).then_some(index)
        }
    }

    // Canonical index at a position of the active view.
    fn active_at(&self, position: usize) -> Option<usize> {
        if self.shuffle_active() {
            self.shuffled_order.get(position).copied()
        } else {
            (position < self.files.len()).then_some(position)
        }
    }

    /// The entry after `index` in the active view, ignoring repeat.
    pub(crate) fn successor(&self, index: usize) -> Option<usize> {
        let position = self.active_position(index)?;
        self.active_at(position + 1)
    }

    /// The entry before `index` in the active view.
    pub(crate) fn predecessor(&self, index: usize) -> Option<usize> {
        let position = self.active_position(index)?;
        self.active_at(position.checked_sub(1)?)
    }

    /// The entry automatic playback should move on to.
    ///
    /// With repeat on this is the current entry itself. There is no wrap
    /// around, so the last entry of the active view has no next entry.
    pub(crate) fn next_index(&self) -> Option<usize> {
        if self.files.is_empty() {
            return None;
        }

        match self.current_index {
            Some(current) if self.repeat_enabled => Some(current),
            Some(current) => self.successor(current),
            None => Some(0),
        }
    }

    pub(crate) fn previous_index(&self) -> Option<usize> {
        self.predecessor(self.current_index?)
    }

    /// Removes the entry at `index` from both the canonical order and the
    /// shuffled view.
    ///
    /// When the current entry is removed, the entry that slides into its
    /// canonical slot becomes current (or the new last entry, or nothing when
    /// the playlist is now empty). Under shuffle that entry also takes over
    /// the removed entry's place in the shuffled view.
    pub(crate) fn remove(&mut self, index: usize) -> Option<PlaylistEntry> {
        if index >= self.files.len() {
            return None;
        }

        let removed = self.files.remove(index);
        let vacated = self.remove_from_shuffle(index);
        let was_current = self.current_index == Some(index);

        self.current_index = match self.current_index {
            Some(current) if index < current => Some(current - 1),
            Some(current) if index == current => match self.files.len() {
                0 => None,
                len => Some(current.min(len - 1)),
            },
            other => other,
        };

        if let (true, Some(slot), Some(current)) = (was_current, vacated, self.current_index) {
            self.shuffled_order.retain(|&i| i != current);
            let slot = slot.min(self.shuffled_order.len());
            self.shuffled_order.insert(slot, current);
        }

        if self.files.is_empty() {
            self.shuffled_order.clear();
        }

        self.check_invariants();

        Some(removed)
    }

    /// Removes the entry at `index` and makes the entry that followed it in
    /// the active view current.
    ///
    /// The follower is resolved before removal and returned as its index
    /// after removal. `None` means nothing followed the removed entry.
    pub(crate) fn remove_advancing(&mut self, index: usize) -> Option<usize> {
        if index >= self.files.len() {
            return None;
        }

        let Some(next) = self.successor(index) else {
            self.remove(index);
            return None;
        };

        self.current_index = Some(next);
        self.remove(index);

        self.current_index
    }

    // Drops a canonical index from the shuffled view, renumbering the rest.
    // Returns the position it occupied.
    fn remove_from_shuffle(&mut self, index: usize) -> Option<usize> {
        let position = self.shuffled_order.iter().position(|&i| i == index)?;
        self.shuffled_order.remove(position);

        for i in self.shuffled_order.iter_mut() {
            if *i > index {
                *i -= 1;
            }
        }

        Some(position)
    }

    /// `"position / total"` in the active view, 1-based.
    pub(crate) fn describe(&self) -> String {
        let total = self.files.len();
        if total == 0 {
            return String::from("0 / 0");
        }

        let position = self
            .current_index
            .and_then(|index| self.active_position(index))
            .map_or(0, |position| position + 1);

        format!("{} / {}", position, total)
    }

    fn check_invariants(&self) {
        debug_assert!(
            self.current_index
                .is_none_or(|index| index < self.files.len()),
            "current index out of range"
        );
        debug_assert!(
            self.shuffled_order.is_empty() || self.shuffled_order.len() == self.files.len(),
            "shuffled view is not a permutation"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn videos(count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|n| PathBuf::from(format!("/tmp/file{n}.mp4")))
            .collect()
    }

    fn loaded(count: usize, current: usize) -> Playlist {
        let files = videos(count);
        let mut playlist = Playlist::with_seed(1);
        playlist.load(&files, files.get(current).map(PathBuf::as_path));
        playlist
    }

    fn names(playlist: &Playlist) -> Vec<String> {
        playlist.entries().iter().map(PlaylistEntry::name).collect()
    }

    #[test]
    fn load_sorts_and_sets_current() {
        let mut playlist = Playlist::with_seed(1);
        playlist.load(["/tmp/b2.mkv", "/tmp/a1.mkv"], Some(Path::new("/tmp/b2.mkv")));

        assert!(playlist.entries()[0].path().ends_with("a1.mkv"));
        assert!(playlist.current_path().expect("current").ends_with("b2.mkv"));
    }

    #[test]
    fn load_filters_and_deduplicates_case_insensitively() {
        let mut playlist = Playlist::with_seed(1);
        playlist.load(
            ["/tmp/Clip.MP4", "/tmp/clip.mp4", "/tmp/readme.txt", "/tmp/other.webm"],
            None,
        );

        assert_eq!(names(&playlist), ["Clip.MP4", "other.webm"]);
    }

    #[test]
    fn load_matches_current_case_insensitively() {
        let mut playlist = Playlist::with_seed(1);
        playlist.load(["/tmp/a.mp4", "/tmp/B.mp4"], Some(Path::new("/TMP/b.MP4")));

        assert_eq!(playlist.current_index(), Some(1));
    }

    #[test]
    fn load_defaults_to_first_entry_or_none() {
        let mut playlist = Playlist::with_seed(1);
        playlist.load(["/tmp/a.mp4", "/tmp/b.mp4"], Some(Path::new("/tmp/missing.mp4")));
        assert_eq!(playlist.current_index(), Some(0));

        playlist.load(Vec::<PathBuf>::new(), None);
        assert_eq!(playlist.current_index(), None);
        assert_eq!(playlist.describe(), "0 / 0");
        assert_eq!(playlist.next_index(), None);
        assert_eq!(playlist.previous_index(), None);
    }

    #[test]
    fn load_is_idempotent() {
        let files = ["/tmp/file10.mp4", "/tmp/File1.mp4", "/tmp/file2.mp4"];
        let mut playlist = Playlist::with_seed(1);

        playlist.load(files, None);
        let first = names(&playlist);
        playlist.load(files, None);

        assert_eq!(first, names(&playlist));
        assert_eq!(first, ["File1.mp4", "file2.mp4", "file10.mp4"]);
    }

    #[test]
    fn load_replaces_rather_than_appends() {
        let mut playlist = loaded(3, 0);
        playlist.load(["/tmp/other.mkv"], None);

        assert_eq!(playlist.len(), 1);
    }

    #[test]
    fn shuffle_pins_current_first() {
        let mut playlist = loaded(3, 1);
        playlist.set_shuffle(true);

        let order = playlist.shuffled_order();
        assert_eq!(order[0], 1);
        let mut sorted = order.to_vec();
        sorted.sort();
        assert_eq!(sorted, [0, 1, 2]);
        assert_eq!(playlist.describe(), "1 / 3");
    }

    #[test]
    fn shuffle_is_reproducible_with_a_seed() {
        let mut a = loaded(10, 4);
        let mut b = loaded(10, 4);
        a.set_shuffle(true);
        b.set_shuffle(true);

        assert_eq!(a.shuffled_order(), b.shuffled_order());
    }

    #[test]
    fn disabling_shuffle_keeps_canonical_order_and_current() {
        let mut playlist = loaded(5, 3);
        let before = names(&playlist);

        playlist.set_shuffle(true);
        playlist.set_shuffle(false);

        assert_eq!(names(&playlist), before);
        assert_eq!(playlist.current_index(), Some(3));
        assert!(playlist.shuffled_order().is_empty());
    }

    #[test]
    fn load_rebuilds_shuffle_when_enabled() {
        let mut playlist = loaded(3, 0);
        playlist.set_shuffle(true);

        let files = videos(5);
        playlist.load(&files, Some(files[2].as_path()));

        assert_eq!(playlist.shuffled_order().len(), 5);
        assert_eq!(playlist.shuffled_order()[0], 2);
    }

    #[test]
    fn repeat_returns_current() {
        let mut playlist = loaded(3, 2);
        playlist.set_repeat(true);

        assert_eq!(playlist.next_index(), Some(2));
    }

    #[test]
    fn repeat_does_not_affect_previous() {
        let mut playlist = loaded(3, 2);
        playlist.set_repeat(true);

        assert_eq!(playlist.previous_index(), Some(1));
    }

    #[test]
    fn next_walks_to_the_end_without_wrapping() {
        let mut playlist = loaded(3, 0);

        assert_eq!(playlist.next_index(), Some(1));
        playlist.select(1);
        assert_eq!(playlist.next_index(), Some(2));
        playlist.select(2);
        assert_eq!(playlist.next_index(), None);
    }

    #[test]
    fn next_without_current_starts_at_first() {
        let mut playlist = loaded(3, 0);
        playlist.current_index = None;

        assert_eq!(playlist.next_index(), Some(0));
    }

    #[test]
    fn previous_stops_at_the_start() {
        let playlist = loaded(3, 0);
        assert_eq!(playlist.previous_index(), None);
    }

    #[test]
    fn previous_follows_the_shuffled_view() {
        let mut playlist = loaded(6, 0);
        playlist.set_shuffle(true);

        let order = playlist.shuffled_order().to_vec();
        playlist.select(order[3]);

        assert_eq!(playlist.previous_index(), Some(order[2]));
        assert_eq!(playlist.next_index(), Some(order[4]));
    }

    #[test]
    fn remove_before_current_shifts_current() {
        let mut playlist = loaded(3, 2);
        playlist.remove(0);

        assert_eq!(playlist.current_index(), Some(1));
        assert!(playlist.current_path().expect("current").ends_with("file2.mp4"));
    }

    #[test]
    fn remove_current_selects_entry_sliding_into_its_slot() {
        let mut playlist = loaded(3, 1);
        playlist.remove(1);

        assert_eq!(playlist.current_index(), Some(1));
        assert!(playlist.current_path().expect("current").ends_with("file2.mp4"));
    }

    #[test]
    fn remove_last_current_clamps() {
        let mut playlist = loaded(3, 2);
        playlist.remove(2);
        assert_eq!(playlist.current_index(), Some(1));

        let mut single = loaded(1, 0);
        single.remove(0);
        assert_eq!(single.current_index(), None);
        assert_eq!(single.describe(), "0 / 0");
    }

    #[test]
    fn remove_current_under_shuffle_keeps_position() {
        let mut playlist = loaded(3, 1);
        playlist.set_shuffle(true);

        playlist.remove(1);

        assert_eq!(playlist.len(), 2);
        assert!(playlist.describe().starts_with("1 / "));
        assert_eq!(playlist.shuffled_order().len(), 2);
    }

    #[test]
    fn remove_out_of_range_is_ignored() {
        let mut playlist = loaded(2, 0);
        assert!(playlist.remove(5).is_none());
        assert_eq!(playlist.len(), 2);
    }

    #[test]
    fn remove_advancing_follows_canonical_order() {
        let mut playlist = loaded(3, 1);

        assert_eq!(playlist.remove_advancing(1), Some(1));
        assert!(playlist.current_path().expect("current").ends_with("file2.mp4"));
    }

    #[test]
    fn remove_advancing_follows_shuffled_order() {
        let mut playlist = loaded(8, 3);
        playlist.set_shuffle(true);

        let order = playlist.shuffled_order().to_vec();
        let expected = playlist.entries()[order[1]].path().to_path_buf();

        let next = playlist.remove_advancing(3).expect("next");

        assert_eq!(playlist.entries()[next].path(), expected);
        assert_eq!(playlist.current_index(), Some(next));
        assert_eq!(playlist.len(), 7);
    }

    #[test]
    fn remove_advancing_from_the_end_has_no_next() {
        let mut playlist = loaded(3, 2);

        assert_eq!(playlist.remove_advancing(2), None);
        assert_eq!(playlist.len(), 2);
    }

    #[test]
    fn describe_reports_position_in_active_view() {
        let mut playlist = loaded(4, 2);
        assert_eq!(playlist.describe(), "3 / 4");

        playlist.set_shuffle(true);
        assert_eq!(playlist.describe(), "1 / 4");
    }

    proptest! {
        #[test]
        fn shuffle_is_a_pinned_permutation(len in 1usize..40, current in 0usize..40, seed in any::<u64>()) {
            let files = videos(len);
            let current = current % len;
            let mut playlist = Playlist::with_seed(seed);
            playlist.load(&files, Some(files[current].as_path()));
            let current_path = playlist.current_path().map(Path::to_path_buf);

            playlist.set_shuffle(true);

            let order = playlist.shuffled_order();
            prop_assert_eq!(order.len(), len);
            prop_assert_eq!(
                Some(playlist.entries()[order[0]].path().to_path_buf()),
                current_path
            );

            let mut sorted = order.to_vec();
            sorted.sort();
            prop_assert_eq!(sorted, (0..len).collect::<Vec<_>>());
        }

        #[test]
        fn remove_keeps_invariants(
            len in 1usize..30,
            current in 0usize..30,
            remove in 0usize..30,
            shuffle in any::<bool>(),
        ) {
            let current = current % len;
            let remove = remove % len;
            let mut playlist = loaded(len, current);
            playlist.set_shuffle(shuffle);

            playlist.remove(remove);

            prop_assert_eq!(playlist.len(), len - 1);
            match playlist.current_index() {
                Some(index) => prop_assert!(index < playlist.len()),
                None => prop_assert!(playlist.is_empty()),
            }
            if shuffle && !playlist.is_empty() {
                let mut sorted = playlist.shuffled_order().to_vec();
                sorted.sort();
                prop_assert_eq!(sorted, (0..len - 1).collect::<Vec<_>>());
            }
            if remove == current && remove == len - 1 && !shuffle {
                prop_assert_eq!(playlist.current_index(), (len > 1).then(|| len - 2));
            }
        }

        #[test]
        fn sorting_is_idempotent(names in proptest::collection::vec("[a-zA-Z0-9_-]{1,8}", 0..20)) {
            let paths: Vec<PathBuf> = names
                .iter()
                .map(|name| PathBuf::from(format!("/tmp/{name}.mkv")))
                .collect();

            let mut playlist = Playlist::with_seed(7);
            playlist.load(&paths, None);
            let first: Vec<PathBuf> = playlist.entries().iter().map(|e| e.path().to_path_buf()).collect();

            playlist.load(&first, None);
            let second: Vec<PathBuf> = playlist.entries().iter().map(|e| e.path().to_path_buf()).collect();

            prop_assert_eq!(first, second);
        }
    }
}

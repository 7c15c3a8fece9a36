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

//! Single-shot settle timer.
//!
//! A short pause between tearing down one media and loading the next keeps
//! the engine stable. Only one action can be pending: arming the timer again
//! replaces whatever was waiting, it never queues a second action.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub(crate) struct SettleTimer<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> SettleTimer<T> {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Schedules `action` to run one delay after `now`.
    ///
    /// With a zero delay nothing is scheduled and the action is handed
    /// straight back to run immediately.
    pub(crate) fn arm(&mut self, now: Instant, action: T) -> Option<T> {
        if self.delay.is_zero() {
            self.pending = None;
            return Some(action);
        }

        self.pending = Some((now + self.delay, action));
        None
    }

    pub(crate) fn cancel(&mut self) {
        self.pending = None;
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    /// Takes the pending action if its deadline has passed.
    pub(crate) fn take_due(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if *deadline <= now => self.pending.take().map(|(_, action)| action),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_delay_runs_inline() {
        let mut timer = SettleTimer::new(Duration::ZERO);
        assert_eq!(timer.arm(Instant::now(), 3), Some(3));
        assert!(!timer.is_armed());
    }

    #[test]
    fn fires_once_after_the_delay() {
        let start = Instant::now();
        let mut timer = SettleTimer::new(Duration::from_millis(50));

        assert_eq!(timer.arm(start, 1), None);
        assert_eq!(timer.deadline(), Some(start + Duration::from_millis(50)));
        assert_eq!(timer.take_due(start + Duration::from_millis(49)), None);
        assert_eq!(timer.take_due(start + Duration::from_millis(50)), Some(1));
        assert_eq!(timer.take_due(start + Duration::from_millis(100)), None);
    }

    #[test]
    fn rearming_supersedes_the_pending_action() {
        let start = Instant::now();
        let mut timer = SettleTimer::new(Duration::from_millis(50));

        timer.arm(start, 1);
        timer.arm(start + Duration::from_millis(30), 2);

        assert_eq!(timer.take_due(start + Duration::from_millis(50)), None);
        assert_eq!(timer.take_due(start + Duration::from_millis(80)), Some(2));
        assert!(!timer.is_armed());
    }

    #[test]
    fn cancel_discards_the_action() {
        let start = Instant::now();
        let mut timer = SettleTimer::new(Duration::from_millis(50));

        timer.arm(start, 1);
        timer.cancel();

        assert_eq!(timer.deadline(), None);
        assert_eq!(timer.take_due(start + Duration::from_secs(1)), None);
    }
}

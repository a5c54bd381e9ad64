//! Network time-sync budget.
//!
//! The polling itself is plain sleep/resample in the board loop; this
//! machine only accounts for attempts and resolves the terminal state.

use log::debug;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SyncState {
    Unsynced,
    Syncing,
    Synced,
    Failed,
}

/// Attempt-bounded time synchronization.
///
/// Fixed-interval polling, no backoff: the bootstrap window is short and
/// an NTP reply either arrives within a few polls or not at all.
#[derive(Clone, Copy, Debug)]
pub struct TimeSync {
    state: SyncState,
    attempts_left: u32,
}

impl TimeSync {
    pub const fn new(max_attempts: u32) -> Self {
        Self {
            state: SyncState::Unsynced,
            attempts_left: max_attempts,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Initial plausibility check, before any network activity. A clock
    /// that already reads a post-threshold year needs no sync at all.
    pub fn begin(&mut self, plausible: bool) -> SyncState {
        self.state = if plausible {
            SyncState::Synced
        } else {
            SyncState::Syncing
        };
        self.state
    }

    /// One polling iteration with the freshly resampled plausibility
    /// verdict. Consumes one attempt; the final attempt's verdict decides
    /// between Synced and Failed.
    pub fn on_poll(&mut self, plausible: bool) -> SyncState {
        if self.state != SyncState::Syncing {
            return self.state;
        }

        self.attempts_left = self.attempts_left.saturating_sub(1);
        if plausible {
            self.state = SyncState::Synced;
        } else if self.attempts_left == 0 {
            self.state = SyncState::Failed;
        } else {
            debug!("timesync: not yet plausible, {} attempts left", self.attempts_left);
        }
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plausible_clock_skips_syncing() {
        let mut sync = TimeSync::new(10);
        assert_eq!(sync.begin(true), SyncState::Synced);
        // Further polls change nothing.
        assert_eq!(sync.on_poll(false), SyncState::Synced);
    }

    #[test]
    fn never_plausible_fails_after_exactly_max_attempts() {
        let mut sync = TimeSync::new(10);
        assert_eq!(sync.begin(false), SyncState::Syncing);

        for _ in 0..9 {
            assert_eq!(sync.on_poll(false), SyncState::Syncing);
        }
        assert_eq!(sync.on_poll(false), SyncState::Failed);
        assert_eq!(sync.on_poll(false), SyncState::Failed);
    }

    #[test]
    fn sync_during_polling_succeeds() {
        let mut sync = TimeSync::new(10);
        sync.begin(false);
        sync.on_poll(false);
        assert_eq!(sync.on_poll(true), SyncState::Synced);
    }

    #[test]
    fn last_attempt_can_still_succeed() {
        let mut sync = TimeSync::new(2);
        sync.begin(false);
        assert_eq!(sync.on_poll(false), SyncState::Syncing);
        assert_eq!(sync.on_poll(true), SyncState::Synced);
    }

    #[test]
    fn zero_attempts_fails_on_first_poll() {
        let mut sync = TimeSync::new(0);
        sync.begin(false);
        assert_eq!(sync.on_poll(false), SyncState::Failed);
    }
}

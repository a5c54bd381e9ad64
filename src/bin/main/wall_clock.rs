//! Wall clock derived from the monotonic timer plus a Unix-time anchor.

use embassy_time::Instant;
use minutely_core::clock::ClockSample;

/// Until the anchor is set by a time sync, samples read as the Unix epoch
/// and fail the plausibility check.
pub(super) struct WallClock {
    anchor: Option<(Instant, u64)>,
    utc_offset_minutes: i32,
}

impl WallClock {
    pub(super) const fn new(utc_offset_minutes: i32) -> Self {
        Self {
            anchor: None,
            utc_offset_minutes,
        }
    }

    /// Anchors the clock: `unix_secs` corresponds to "now".
    pub(super) fn set_unix(&mut self, unix_secs: u64) {
        self.anchor = Some((Instant::now(), unix_secs));
    }

    /// Reads the clock in the configured local zone.
    pub(super) fn sample(&self) -> ClockSample {
        let unix = match self.anchor {
            Some((at, secs)) => secs.saturating_add(at.elapsed().as_secs()),
            None => 0,
        };
        let local = unix as i64 + i64::from(self.utc_offset_minutes) * 60;
        ClockSample::from_unix(local)
    }
}

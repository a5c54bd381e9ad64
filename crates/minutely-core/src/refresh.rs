//! Full-vs-partial refresh cadence.
//!
//! Bistable panels tolerate only so many partial updates before ghosting
//! builds up; a full redraw resets it at the cost of a slow, flashing
//! refresh. [`Cadence`] is the reusable policy and [`ClockScheduler`] the
//! minute/second instantiation used by the clock face.

use crate::clock::ClockSample;

/// Outcome of one scheduler tick.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Refresh {
    /// Slow damage-safe full redraw.
    Full,
    /// Fast partial redraw.
    Partial,
    /// Nothing changed; skip the tick.
    Skip,
}

/// Generalized refresh cadence.
///
/// A full redraw is forced whenever the caller's policy event fires or,
/// when a partial budget is configured, once that many partial redraws
/// have been flushed since the last full one. Otherwise a content change
/// gets a partial redraw, and an unchanged frame is skipped.
///
/// [`Cadence::decide`] is pure; call [`Cadence::commit`] only after the
/// corresponding frame actually reached the panel.
#[derive(Clone, Copy, Debug)]
pub struct Cadence {
    partial_budget: Option<u32>,
    partials_since_full: u32,
}

impl Cadence {
    /// Event-driven cadence: full redraws happen only on policy events.
    pub const fn on_event() -> Self {
        Self {
            partial_budget: None,
            partials_since_full: 0,
        }
    }

    /// Cycle-count cadence: every `budget` partial redraws force one full
    /// redraw even when the content is unchanged. Starts exhausted so the
    /// very first refresh is a full one.
    pub const fn every_n(budget: u32) -> Self {
        Self {
            partial_budget: Some(budget),
            partials_since_full: budget,
        }
    }

    pub fn partials_since_full(&self) -> u32 {
        self.partials_since_full
    }

    pub fn decide(&self, event_fired: bool, content_changed: bool) -> Refresh {
        let budget_spent = self
            .partial_budget
            .is_some_and(|budget| self.partials_since_full >= budget);

        if event_fired || budget_spent {
            Refresh::Full
        } else if content_changed {
            Refresh::Partial
        } else {
            Refresh::Skip
        }
    }

    /// Records a successfully flushed refresh.
    pub fn commit(&mut self, refresh: Refresh) {
        match refresh {
            Refresh::Full => self.partials_since_full = 0,
            Refresh::Partial => {
                self.partials_since_full = self.partials_since_full.saturating_add(1);
            }
            Refresh::Skip => {}
        }
    }
}

/// Last successfully rendered minute and second. Unset until the first
/// flush, so the first tick always takes the full-redraw path.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RenderCursor {
    pub minute: Option<u8>,
    pub second: Option<u8>,
}

/// Minute/second instantiation of [`Cadence`].
///
/// A minute boundary is the policy event (full face redraw); a second
/// boundary inside the same minute is the content change (partial seconds
/// redraw). The two are mutually exclusive per tick, and a full redraw
/// also commits the second so the same tick cannot schedule a stray
/// partial afterwards.
#[derive(Clone, Copy, Debug)]
pub struct ClockScheduler {
    cadence: Cadence,
    cursor: RenderCursor,
}

impl ClockScheduler {
    pub const fn new() -> Self {
        Self {
            cadence: Cadence::on_event(),
            cursor: RenderCursor {
                minute: None,
                second: None,
            },
        }
    }

    pub fn cursor(&self) -> RenderCursor {
        self.cursor
    }

    pub fn decide(&self, sample: &ClockSample) -> Refresh {
        self.cadence.decide(
            self.cursor.minute != Some(sample.minute),
            self.cursor.second != Some(sample.second),
        )
    }

    /// Records a flushed frame for `sample`. Full redraws advance both
    /// cursor fields, partial ones only the second.
    pub fn commit(&mut self, refresh: Refresh, sample: &ClockSample) {
        self.cadence.commit(refresh);
        match refresh {
            Refresh::Full => {
                self.cursor.minute = Some(sample.minute);
                self.cursor.second = Some(sample.second);
            }
            Refresh::Partial => self.cursor.second = Some(sample.second),
            Refresh::Skip => {}
        }
    }
}

impl Default for ClockScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(minute: u8, second: u8) -> ClockSample {
        ClockSample {
            year: 2026,
            month: 8,
            day: 8,
            weekday: crate::clock::Weekday::Saturday,
            hour: 12,
            minute,
            second,
        }
    }

    #[test]
    fn first_tick_is_a_full_redraw() {
        let scheduler = ClockScheduler::new();
        assert_eq!(scheduler.decide(&sample(0, 0)), Refresh::Full);
    }

    #[test]
    fn full_redraw_happens_exactly_once_per_minute() {
        let mut scheduler = ClockScheduler::new();
        let mut fulls = 0;

        // Four ticks per second across two minutes.
        for minute in 0..2u8 {
            for second in 0..60u8 {
                for _ in 0..4 {
                    let s = sample(minute, second);
                    let refresh = scheduler.decide(&s);
                    if refresh == Refresh::Full {
                        fulls += 1;
                    }
                    scheduler.commit(refresh, &s);
                }
            }
        }

        assert_eq!(fulls, 2);
    }

    #[test]
    fn partial_redraw_happens_at_most_once_per_second() {
        let mut scheduler = ClockScheduler::new();
        let first = sample(5, 10);
        scheduler.commit(Refresh::Full, &first);

        let next = sample(5, 11);
        assert_eq!(scheduler.decide(&next), Refresh::Partial);
        scheduler.commit(Refresh::Partial, &next);
        assert_eq!(scheduler.decide(&next), Refresh::Skip);
    }

    #[test]
    fn minute_change_takes_priority_over_second_change() {
        let mut scheduler = ClockScheduler::new();
        scheduler.commit(Refresh::Full, &sample(5, 59));

        // Both fields differ; the minute wins and the commit also adopts
        // the new second, so no partial follows within the tick.
        let rollover = sample(6, 0);
        assert_eq!(scheduler.decide(&rollover), Refresh::Full);
        scheduler.commit(Refresh::Full, &rollover);
        assert_eq!(scheduler.decide(&rollover), Refresh::Skip);
    }

    #[test]
    fn uncommitted_decision_is_repeated() {
        // A failed flush must not advance the cursor.
        let scheduler = ClockScheduler::new();
        let s = sample(1, 2);
        assert_eq!(scheduler.decide(&s), Refresh::Full);
        assert_eq!(scheduler.decide(&s), Refresh::Full);
    }

    #[test]
    fn cycle_cadence_starts_with_a_full_refresh() {
        let cadence = Cadence::every_n(60);
        assert_eq!(cadence.decide(false, true), Refresh::Full);
    }

    #[test]
    fn cycle_cadence_forces_full_after_budget() {
        let mut cadence = Cadence::every_n(60);
        cadence.commit(Refresh::Full);
        assert_eq!(cadence.partials_since_full(), 0);

        for _ in 0..60 {
            assert_eq!(cadence.decide(false, true), Refresh::Partial);
            cadence.commit(Refresh::Partial);
        }
        assert_eq!(cadence.partials_since_full(), 60);

        // 61st tick: full regardless of content equality.
        assert_eq!(cadence.decide(false, false), Refresh::Full);
        assert_eq!(cadence.decide(false, true), Refresh::Full);
    }

    #[test]
    fn cycle_cadence_skips_unchanged_content_under_budget() {
        let mut cadence = Cadence::every_n(60);
        cadence.commit(Refresh::Full);
        assert_eq!(cadence.decide(false, false), Refresh::Skip);
    }

    #[test]
    fn event_cadence_never_forces_by_count() {
        let mut cadence = Cadence::on_event();
        for _ in 0..1_000 {
            assert_eq!(cadence.decide(false, true), Refresh::Partial);
            cadence.commit(Refresh::Partial);
        }
        assert_eq!(cadence.decide(true, false), Refresh::Full);
    }
}

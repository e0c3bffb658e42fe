//! Busy/open/free region computation.
//!
//! Raw fetched commitments flow through recurrence expansion into interval
//! sets, which then combine under the set algebra: open regions minus busy
//! regions is what remains schedulable, and free time is the window minus
//! everything busy.

use crate::commitment::Commitment;
use crate::interval::Interval;
use crate::interval_set::IntervalSet;
use crate::recurrence::QueryWindow;

/// All time the given commitments occupy inside `window`, normalized.
pub fn busy_set(commitments: &[Commitment], window: &QueryWindow) -> IntervalSet {
    let mut entries = Vec::new();
    for commitment in commitments {
        entries.extend(commitment.intervals_within(window));
    }
    IntervalSet::new(entries).normalize()
}

/// All open-availability time the given commitments declare inside `window`,
/// normalized. An empty result here means "no windows declared", which
/// callers treat as no constraint — see [`available_set`].
pub fn open_set(commitments: &[Commitment], window: &QueryWindow) -> IntervalSet {
    busy_set(commitments, window)
}

/// Schedulable time inside `window`: declared open regions deprived of busy
/// regions. When no open commitments exist at all, availability constraints
/// do not apply and the whole window counts as open.
pub fn available_set(
    open: &[Commitment],
    busy: &[Commitment],
    window: &QueryWindow,
) -> IntervalSet {
    let busy = busy_set(busy, window);
    if open.is_empty() {
        return window_set(window).subtract(&busy);
    }
    open_set(open, window).subtract(&busy)
}

/// Gaps inside `window` not covered by `busy`.
pub fn free_slots(busy: &IntervalSet, window: &QueryWindow) -> IntervalSet {
    window_set(window).subtract(busy)
}

fn window_set(window: &QueryWindow) -> IntervalSet {
    IntervalSet::from(Interval::new(window.start, window.end))
}

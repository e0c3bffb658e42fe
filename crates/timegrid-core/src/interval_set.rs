//! Ordered interval collections with set algebra.
//!
//! A raw [`IntervalSet`] may be unsorted and contain `Empty` placeholders,
//! overlaps, and adjacent spans. [`IntervalSet::normalize`] reduces it to the
//! canonical form: no `Empty` entries, sorted ascending by start, and no two
//! entries that overlap or touch. Every operation returns a new set; nothing
//! here mutates in place.

use std::fmt;

use chrono::Duration;

use crate::error::Result;
use crate::interval::Interval;

/// An ordered collection of [`Interval`]s treated as one composite time
/// region via union semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntervalSet(Vec<Interval>);

impl IntervalSet {
    pub fn new(entries: Vec<Interval>) -> Self {
        IntervalSet(entries)
    }

    /// Number of entries, including any `Empty` placeholders.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the set covers no time at all (no entries, or only `Empty`
    /// placeholders).
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Interval::is_empty)
    }

    pub fn as_slice(&self) -> &[Interval] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Interval> {
        self.0.iter()
    }

    /// Canonical form: drop `Empty` entries, sort ascending, then left-fold,
    /// replacing the last accumulated entry with its hull whenever the next
    /// span touches or overlaps it.
    pub fn normalize(&self) -> IntervalSet {
        let mut spans: Vec<Interval> = self
            .0
            .iter()
            .copied()
            .filter(|entry| !entry.is_empty())
            .collect();
        spans.sort();

        let mut out: Vec<Interval> = Vec::with_capacity(spans.len());
        for span in spans {
            if let Some(last) = out.last_mut() {
                if last.touches_or_overlaps(&span) {
                    *last = last.merge(&span);
                    continue;
                }
            }
            out.push(span);
        }
        IntervalSet(out)
    }

    /// Union of two sets, in canonical form.
    pub fn merge(&self, other: &IntervalSet) -> IntervalSet {
        let mut all = self.0.clone();
        all.extend(other.0.iter().copied());
        IntervalSet(all).normalize()
    }

    /// Pairwise intersection followed by re-coalescing.
    ///
    /// Intersecting with an unsorted, overlapping `other` can produce
    /// adjacent fragments, so the concatenated results are normalized before
    /// returning.
    pub fn intersect(&self, other: &IntervalSet) -> IntervalSet {
        let lhs = self.normalize();
        let mut out = Vec::new();
        for a in lhs.iter() {
            for b in other.iter() {
                let piece = a.intersect(b);
                if !piece.is_empty() {
                    out.push(piece);
                }
            }
        }
        IntervalSet(out).normalize()
    }

    /// Deprive `self` of every region covered by `other`.
    ///
    /// For each span `a`, the per-obstacle remainders `a - b` are folded
    /// together by repeated set intersection: "what remains after removing
    /// b1" intersected with "what remains after removing b2" is exactly what
    /// remains after removing both. The fold stays correct even when `other`
    /// is unsorted or self-overlapping, which a single splitting pass over
    /// `other` would not be.
    pub fn subtract(&self, other: &IntervalSet) -> IntervalSet {
        let lhs = self.normalize();
        let mut out = Vec::new();
        for a in lhs.iter() {
            let mut remaining = IntervalSet::from(*a);
            for b in other.iter() {
                if b.is_empty() {
                    continue;
                }
                remaining = remaining.intersect(&a.subtract(b));
                if remaining.is_empty() {
                    break;
                }
            }
            out.extend(remaining.0);
        }
        IntervalSet(out).normalize()
    }

    /// Total covered time. Overlapping raw entries are not double-counted.
    pub fn total_duration(&self) -> Duration {
        self.normalize()
            .iter()
            .fold(Duration::zero(), |acc, entry| acc + entry.duration())
    }

    /// Canonical external form: one ISO-8601 `start/end` pair per entry
    /// (`-` for `Empty` placeholders still present in a raw set).
    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(Interval::to_string).collect()
    }

    /// Parse the canonical external form produced by [`to_strings`].
    ///
    /// [`to_strings`]: IntervalSet::to_strings
    pub fn from_strings<S: AsRef<str>>(entries: &[S]) -> Result<IntervalSet> {
        let parsed = entries
            .iter()
            .map(|entry| entry.as_ref().parse())
            .collect::<Result<Vec<Interval>>>()?;
        Ok(IntervalSet(parsed))
    }
}

impl From<Interval> for IntervalSet {
    fn from(interval: Interval) -> Self {
        IntervalSet(vec![interval])
    }
}

impl From<Vec<Interval>> for IntervalSet {
    fn from(entries: Vec<Interval>) -> Self {
        IntervalSet(entries)
    }
}

impl FromIterator<Interval> for IntervalSet {
    fn from_iter<I: IntoIterator<Item = Interval>>(iter: I) -> Self {
        IntervalSet(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a IntervalSet {
    type Item = &'a Interval;
    type IntoIter = std::slice::Iter<'a, Interval>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for IntervalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_strings().join(", "))
    }
}

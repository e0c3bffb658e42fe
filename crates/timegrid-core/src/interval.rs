//! Half-open time spans with an explicit empty value.
//!
//! An [`Interval`] is either `Empty` or a span `[start, end)` on the UTC
//! reference timeline. `Empty` is a first-class value — "no overlap" and "no
//! result" flow through the algebra like any other interval, so every call
//! site handles it exhaustively instead of juggling a nullable reference.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, SecondsFormat, Utc};

use crate::error::TimegridError;
use crate::interval_set::IntervalSet;

/// A half-open time region `[start, end)`, or the empty value.
///
/// Ordering: `Empty` sorts first; spans order by `start`, ties by `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Interval {
    Empty,
    Span {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl Interval {
    /// Build a span, swapping reversed endpoints. Equal endpoints produce
    /// `Empty` — a half-open `[t, t)` covers no instant.
    pub fn new(a: DateTime<Utc>, b: DateTime<Utc>) -> Self {
        use std::cmp::Ordering;
        match a.cmp(&b) {
            Ordering::Less => Interval::Span { start: a, end: b },
            Ordering::Greater => Interval::Span { start: b, end: a },
            Ordering::Equal => Interval::Empty,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Interval::Empty)
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        match self {
            Interval::Empty => None,
            Interval::Span { start, .. } => Some(*start),
        }
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        match self {
            Interval::Empty => None,
            Interval::Span { end, .. } => Some(*end),
        }
    }

    /// Width of the span; zero for `Empty`.
    pub fn duration(&self) -> Duration {
        match self {
            Interval::Empty => Duration::zero(),
            Interval::Span { start, end } => *end - *start,
        }
    }

    /// Strict overlap: `a.start < b.end && b.start < a.end`.
    ///
    /// Touching endpoints (one span ending exactly where another starts) do
    /// NOT overlap under this test. Conflict checking uses this form.
    pub fn overlaps(&self, other: &Interval) -> bool {
        match (*self, *other) {
            (
                Interval::Span { start: s1, end: e1 },
                Interval::Span { start: s2, end: e2 },
            ) => s1 < e2 && s2 < e1,
            _ => false,
        }
    }

    /// Overlap with adjacency: touching endpoints also count. Used when
    /// coalescing sets, where `[09:00,10:00)` and `[10:00,11:00)` form one
    /// region.
    pub fn touches_or_overlaps(&self, other: &Interval) -> bool {
        match (*self, *other) {
            (
                Interval::Span { start: s1, end: e1 },
                Interval::Span { start: s2, end: e2 },
            ) => s1 <= e2 && s2 <= e1,
            _ => false,
        }
    }

    /// The common region of two intervals, or `Empty` when they do not
    /// strictly overlap (adjacent spans share no instant).
    pub fn intersect(&self, other: &Interval) -> Interval {
        if !self.overlaps(other) {
            return Interval::Empty;
        }
        match (*self, *other) {
            (
                Interval::Span { start: s1, end: e1 },
                Interval::Span { start: s2, end: e2 },
            ) => Interval::Span {
                start: s1.max(s2),
                end: e1.min(e2),
            },
            _ => Interval::Empty,
        }
    }

    /// The portion(s) of `self` not covered by `other`: zero, one, or two
    /// spans, returned as a small set (two when `other` is strictly interior
    /// to `self`).
    pub fn subtract(&self, other: &Interval) -> IntervalSet {
        let Interval::Span {
            start: a_start,
            end: a_end,
        } = *self
        else {
            return IntervalSet::default();
        };
        let Interval::Span {
            start: b_start,
            end: b_end,
        } = *other
        else {
            return IntervalSet::from(*self);
        };
        if !self.overlaps(other) {
            return IntervalSet::from(*self);
        }
        let mut pieces = Vec::with_capacity(2);
        if b_start > a_start {
            pieces.push(Interval::new(a_start, b_start));
        }
        if b_end < a_end {
            pieces.push(Interval::new(b_end, a_end));
        }
        IntervalSet::new(pieces)
    }

    /// Convex hull of two intervals. Only meaningful for pairs that touch or
    /// overlap (`Empty` is the identity); callers are responsible for the
    /// precondition.
    pub fn merge(&self, other: &Interval) -> Interval {
        match (*self, *other) {
            (Interval::Empty, b) => b,
            (a, Interval::Empty) => a,
            (
                Interval::Span { start: s1, end: e1 },
                Interval::Span { start: s2, end: e2 },
            ) => {
                debug_assert!(
                    self.touches_or_overlaps(other),
                    "merge requires touching or overlapping intervals"
                );
                Interval::Span {
                    start: s1.min(s2),
                    end: e1.max(e2),
                }
            }
        }
    }
}

impl fmt::Display for Interval {
    /// Canonical text form: `start/end` as ISO-8601 pairs, `-` for `Empty`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interval::Empty => write!(f, "-"),
            Interval::Span { start, end } => write!(
                f,
                "{}/{}",
                start.to_rfc3339_opts(SecondsFormat::Secs, true),
                end.to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
        }
    }
}

impl FromStr for Interval {
    type Err = TimegridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "-" {
            return Ok(Interval::Empty);
        }
        let (start_text, end_text) = s
            .split_once('/')
            .ok_or_else(|| TimegridError::InvalidInterval(s.to_string()))?;
        let start: DateTime<Utc> = start_text
            .parse()
            .map_err(|_| TimegridError::InvalidInterval(s.to_string()))?;
        let end: DateTime<Utc> = end_text
            .parse()
            .map_err(|_| TimegridError::InvalidInterval(s.to_string()))?;
        Ok(Interval::new(start, end))
    }
}

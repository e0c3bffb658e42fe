//! Raw commitment ingestion and resolution.
//!
//! The fetching collaborator supplies commitments in two wire shapes: a
//! literal dated `{start, end}` pair, or a recurrence rule with a duration
//! and a source start acting as the anchor. Resolution parses the recurrence
//! text; a malformed entry is logged and dropped (an empty expansion), never
//! propagated — one bad commitment must not abort an entire batch.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::interval::Interval;
use crate::recurrence::{parse_recurrence, QueryWindow, RecurrenceSpec};

/// Inbound wire shape of a single commitment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCommitment {
    Recurring {
        recurrence: String,
        duration_ms: i64,
        source_start: DateTime<Utc>,
    },
    Literal {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// A raw commitment plus the optional human-readable label carried into
/// conflict reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEntry {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(flatten)]
    pub commitment: RawCommitment,
}

/// A resolved commitment ready for availability and conflict computation.
#[derive(Debug, Clone, PartialEq)]
pub struct Commitment {
    pub label: Option<String>,
    pub kind: CommitmentKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommitmentKind {
    Literal(Interval),
    Recurring(RecurrenceSpec),
}

impl Commitment {
    pub fn literal(interval: Interval) -> Self {
        Commitment {
            label: None,
            kind: CommitmentKind::Literal(interval),
        }
    }

    pub fn recurring(spec: RecurrenceSpec) -> Self {
        Commitment {
            label: None,
            kind: CommitmentKind::Recurring(spec),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Whether this commitment constrains the given calendar date. Recurring
    /// commitments match by weekday pattern; literal commitments only by the
    /// exact date.
    pub fn applies_on(&self, date: NaiveDate, weekday: Weekday) -> bool {
        match &self.kind {
            CommitmentKind::Literal(interval) => interval
                .start()
                .map(|start| start.date_naive() == date)
                .unwrap_or(false),
            CommitmentKind::Recurring(spec) => spec.by_weekday().contains(&weekday),
        }
    }

    /// Time-of-day range occupied on an applicable date. `None` for an empty
    /// literal interval.
    pub fn time_of_day(&self) -> Option<(NaiveTime, NaiveTime)> {
        match &self.kind {
            CommitmentKind::Literal(interval) => match (interval.start(), interval.end()) {
                (Some(start), Some(end)) => Some((start.time(), end.time())),
                _ => None,
            },
            CommitmentKind::Recurring(spec) => Some(spec.time_of_day()),
        }
    }

    /// Concrete intervals this commitment contributes inside `window`:
    /// the clipped literal span, or the recurrence expansion.
    pub fn intervals_within(&self, window: &QueryWindow) -> Vec<Interval> {
        match &self.kind {
            CommitmentKind::Literal(interval) => {
                let clipped = interval.intersect(&Interval::new(window.start, window.end));
                if clipped.is_empty() {
                    Vec::new()
                } else {
                    vec![clipped]
                }
            }
            CommitmentKind::Recurring(spec) => spec.expand(window),
        }
    }
}

/// Resolve a batch of raw entries. Entries whose recurrence text fails to
/// parse are logged and dropped.
pub fn resolve_commitments(raw: &[RawEntry]) -> Vec<Commitment> {
    let mut resolved = Vec::with_capacity(raw.len());
    for entry in raw {
        match &entry.commitment {
            RawCommitment::Literal { start, end } => {
                resolved.push(Commitment {
                    label: entry.label.clone(),
                    kind: CommitmentKind::Literal(Interval::new(*start, *end)),
                });
            }
            RawCommitment::Recurring {
                recurrence,
                duration_ms,
                source_start,
            } => match parse_recurrence(
                recurrence,
                *source_start,
                Duration::milliseconds(*duration_ms),
            ) {
                Ok(spec) => resolved.push(Commitment {
                    label: entry.label.clone(),
                    kind: CommitmentKind::Recurring(spec),
                }),
                Err(err) => {
                    warn!(
                        rule = recurrence.as_str(),
                        error = %err,
                        "dropping commitment with unparsable recurrence rule"
                    );
                }
            },
        }
    }
    resolved
}

//! Weekly recurrence rules: parse, serialize, and expand into occurrences.
//!
//! The RFC 5545 text codec is the `rrule` crate, fenced behind stateless
//! functions so its types never leak into the engine's API. Expansion is
//! bounded three ways: the query window, the rule's UNTIL, and a hard
//! occurrence ceiling — whichever bites first.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, Timelike, Utc, Weekday};
use rrule::{Frequency, NWeekday, RRuleSet, Tz};
use tracing::warn;

use crate::error::{Result, TimegridError};
use crate::interval::Interval;

/// Hard ceiling on occurrences materialized per expansion. Exceeding it is
/// not an error; it is the defined termination condition for unbounded rules.
pub const MAX_OCCURRENCES: u16 = 52;

/// Offset added to the anchor to stand in for "recurs indefinitely" when a
/// bounded UNTIL must be written out (1200 months = 100 years).
const UNBOUNDED_SENTINEL_MONTHS: u32 = 1200;

/// A bounded query window `[start, end)` on the reference timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl QueryWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        QueryWindow { start, end }
    }
}

/// One recurring commitment: weekly frequency, a civil anchor (date plus
/// hour/minute, kept separate so the hour-of-day survives calendar
/// arithmetic), a weekday pattern, an optional bound, and the duration of
/// each occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceSpec {
    anchor_date: NaiveDate,
    anchor_time: NaiveTime,
    by_weekday: Vec<Weekday>,
    until: Option<DateTime<Utc>>,
    duration: Duration,
}

impl RecurrenceSpec {
    /// Build a weekly rule. `by_weekday` is deduplicated and kept in MO..SU
    /// order; when empty, the anchor date's own weekday is used.
    pub fn weekly(
        anchor_date: NaiveDate,
        anchor_hour: u32,
        anchor_minute: u32,
        by_weekday: impl IntoIterator<Item = Weekday>,
        until: Option<DateTime<Utc>>,
        duration: Duration,
    ) -> Result<Self> {
        let anchor_time = NaiveTime::from_hms_opt(anchor_hour, anchor_minute, 0).ok_or(
            TimegridError::InvalidAnchor {
                hour: anchor_hour,
                minute: anchor_minute,
            },
        )?;
        let mut days: Vec<Weekday> = by_weekday.into_iter().collect();
        days.sort_by_key(|day| day.num_days_from_monday());
        days.dedup();
        if days.is_empty() {
            days.push(anchor_date.weekday());
        }
        Ok(RecurrenceSpec {
            anchor_date,
            anchor_time,
            by_weekday: days,
            until,
            duration,
        })
    }

    /// The anchor as a single instant on the reference timeline.
    pub fn anchor(&self) -> DateTime<Utc> {
        self.anchor_date.and_time(self.anchor_time).and_utc()
    }

    /// Weekday pattern in MO..SU order.
    pub fn by_weekday(&self) -> &[Weekday] {
        &self.by_weekday
    }

    pub fn until(&self) -> Option<DateTime<Utc>> {
        self.until
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Time-of-day range one occurrence occupies.
    pub fn time_of_day(&self) -> (NaiveTime, NaiveTime) {
        (self.anchor_time, self.anchor_time + self.duration)
    }

    /// The rule's bound, substituting a far-future sentinel for "recurs
    /// indefinitely" so consumers always see a finite rule. Expansion is
    /// bounded by [`MAX_OCCURRENCES`] independently of this value.
    pub fn effective_until(&self) -> DateTime<Utc> {
        self.until
            .unwrap_or_else(|| self.anchor() + Months::new(UNBOUNDED_SENTINEL_MONTHS))
    }

    /// Serialize to the RFC 5545 recurrence text consumed by calendar
    /// renderers: `FREQ=WEEKLY;BYDAY=...;UNTIL=...Z`. UNTIL is always
    /// present.
    pub fn to_rrule_string(&self) -> String {
        let byday: Vec<&str> = self.by_weekday.iter().map(|day| weekday_code(*day)).collect();
        format!(
            "FREQ=WEEKLY;BYDAY={};UNTIL={}",
            byday.join(","),
            self.effective_until().format("%Y%m%dT%H%M%SZ")
        )
    }

    /// Materialize the occurrences whose starts fall inside `window`
    /// (half-open: `window.start <= start < window.end`). Each occurrence
    /// spans `duration` from its start. At most [`MAX_OCCURRENCES`] are
    /// produced.
    pub fn expand(&self, window: &QueryWindow) -> Vec<Interval> {
        if window.end <= window.start {
            return Vec::new();
        }
        let block = format!(
            "DTSTART;TZID=UTC:{}\nRRULE:{}",
            self.anchor().format("%Y%m%dT%H%M%S"),
            self.to_rrule_string()
        );
        // Fields are validated at construction, so the block we just wrote
        // must parse; degrade to an empty expansion rather than panic if the
        // codec disagrees.
        let Ok(rule_set) = block.parse::<RRuleSet>() else {
            warn!(rule = block.as_str(), "engine-built recurrence block failed to parse");
            return Vec::new();
        };
        let rule_set = rule_set
            .after(window.start.with_timezone(&Tz::UTC))
            .before(window.end.with_timezone(&Tz::UTC));

        rule_set
            .all(MAX_OCCURRENCES)
            .dates
            .into_iter()
            .map(|occurrence| occurrence.with_timezone(&Utc))
            .filter(|start| *start >= window.start && *start < window.end)
            .map(|start| Interval::new(start, start + self.duration))
            .collect()
    }
}

/// Parse recurrence text into a [`RecurrenceSpec`] anchored at `anchor`,
/// with each occurrence lasting `duration`.
///
/// A leading `RRULE:` marker is tolerated. Only `FREQ=WEEKLY` rules are
/// accepted; the scheduling domain has no other shape.
///
/// # Errors
/// [`TimegridError::InvalidRule`] for unparsable text,
/// [`TimegridError::UnsupportedFrequency`] for non-weekly rules.
pub fn parse_recurrence(
    text: &str,
    anchor: DateTime<Utc>,
    duration: Duration,
) -> Result<RecurrenceSpec> {
    let rule_text = text.trim().trim_start_matches("RRULE:").trim();
    if rule_text.is_empty() {
        return Err(TimegridError::InvalidRule(
            "empty recurrence text".to_string(),
        ));
    }

    // The codec wants a full iCalendar block; give it the anchor as DTSTART.
    let block = format!(
        "DTSTART;TZID=UTC:{}\nRRULE:{}",
        anchor.format("%Y%m%dT%H%M%S"),
        rule_text
    );
    let rule_set: RRuleSet = block
        .parse()
        .map_err(|e| TimegridError::InvalidRule(format!("{}", e)))?;
    let rule = rule_set
        .get_rrule()
        .first()
        .ok_or_else(|| TimegridError::InvalidRule("no RRULE line present".to_string()))?;

    if rule.get_freq() != Frequency::Weekly {
        return Err(TimegridError::UnsupportedFrequency(format!(
            "{:?}",
            rule.get_freq()
        )));
    }

    let days: Vec<Weekday> = rule
        .get_by_weekday()
        .iter()
        .map(|entry| match entry {
            NWeekday::Every(day) => *day,
            NWeekday::Nth(_, day) => *day,
        })
        .collect();
    let until = rule.get_until().map(|bound| bound.with_timezone(&Utc));

    RecurrenceSpec::weekly(
        anchor.date_naive(),
        anchor.hour(),
        anchor.minute(),
        days,
        until,
        duration,
    )
}

/// Recovery wrapper for batch ingestion: a malformed rule contributes an
/// empty expansion instead of a fault, so one bad commitment cannot abort
/// validation of an entire batch.
pub fn expand_or_empty(
    text: &str,
    anchor: DateTime<Utc>,
    duration: Duration,
    window: &QueryWindow,
) -> Vec<Interval> {
    match parse_recurrence(text, anchor, duration) {
        Ok(spec) => spec.expand(window),
        Err(err) => {
            warn!(rule = text, error = %err, "unparsable recurrence rule, treating as empty expansion");
            Vec::new()
        }
    }
}

fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

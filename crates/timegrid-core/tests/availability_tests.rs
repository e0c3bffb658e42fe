//! Tests for the commitments → busy/open/free pipeline.

use chrono::{DateTime, Duration, NaiveDate, Utc, Weekday};
use timegrid_core::{
    available_set, busy_set, free_slots, resolve_commitments, Commitment, Interval, IntervalSet,
    QueryWindow, RawCommitment, RawEntry, RecurrenceSpec,
};

fn dt(s: &str) -> DateTime<Utc> {
    s.parse().expect("test datetime must parse")
}

fn date(s: &str) -> NaiveDate {
    s.parse().expect("test date must parse")
}

fn span(start: &str, end: &str) -> Interval {
    Interval::new(dt(start), dt(end))
}

fn literal(start: &str, end: &str) -> Commitment {
    Commitment::literal(span(start, end))
}

fn weekly(anchor: &str, hour: u32, days: &[Weekday], minutes: i64) -> Commitment {
    Commitment::recurring(
        RecurrenceSpec::weekly(
            date(anchor),
            hour,
            0,
            days.iter().copied(),
            None,
            Duration::minutes(minutes),
        )
        .expect("valid spec"),
    )
}

// ── Busy computation ────────────────────────────────────────────────────────

#[test]
fn busy_set_combines_literal_and_recurring_commitments() {
    let commitments = vec![
        literal("2026-03-02T09:00:00Z", "2026-03-02T10:00:00Z"),
        weekly("2026-03-02", 14, &[Weekday::Mon], 50),
    ];
    let window = QueryWindow::new(dt("2026-03-02T08:00:00Z"), dt("2026-03-02T17:00:00Z"));

    let busy = busy_set(&commitments, &window);
    assert_eq!(
        busy.as_slice(),
        &[
            span("2026-03-02T09:00:00Z", "2026-03-02T10:00:00Z"),
            span("2026-03-02T14:00:00Z", "2026-03-02T14:50:00Z"),
        ]
    );
}

#[test]
fn busy_set_clips_literals_to_the_window() {
    let commitments = vec![literal("2026-03-02T07:00:00Z", "2026-03-02T09:00:00Z")];
    let window = QueryWindow::new(dt("2026-03-02T08:00:00Z"), dt("2026-03-02T17:00:00Z"));

    let busy = busy_set(&commitments, &window);
    assert_eq!(
        busy.as_slice(),
        &[span("2026-03-02T08:00:00Z", "2026-03-02T09:00:00Z")]
    );
}

#[test]
fn busy_set_merges_overlapping_contributions() {
    let commitments = vec![
        literal("2026-03-02T09:00:00Z", "2026-03-02T11:00:00Z"),
        literal("2026-03-02T10:00:00Z", "2026-03-02T12:00:00Z"),
    ];
    let window = QueryWindow::new(dt("2026-03-02T08:00:00Z"), dt("2026-03-02T17:00:00Z"));

    let busy = busy_set(&commitments, &window);
    assert_eq!(
        busy.as_slice(),
        &[span("2026-03-02T09:00:00Z", "2026-03-02T12:00:00Z")]
    );
}

// ── Free slots ──────────────────────────────────────────────────────────────

#[test]
fn free_slots_are_the_gaps_between_busy_regions() {
    let busy = IntervalSet::new(vec![
        span("2026-03-02T09:00:00Z", "2026-03-02T10:00:00Z"),
        span("2026-03-02T14:00:00Z", "2026-03-02T15:00:00Z"),
    ]);
    let window = QueryWindow::new(dt("2026-03-02T08:00:00Z"), dt("2026-03-02T17:00:00Z"));

    let free = free_slots(&busy, &window);
    assert_eq!(
        free.as_slice(),
        &[
            span("2026-03-02T08:00:00Z", "2026-03-02T09:00:00Z"),
            span("2026-03-02T10:00:00Z", "2026-03-02T14:00:00Z"),
            span("2026-03-02T15:00:00Z", "2026-03-02T17:00:00Z"),
        ]
    );
}

#[test]
fn fully_busy_window_has_no_free_slots() {
    let busy = IntervalSet::from(span("2026-03-02T08:00:00Z", "2026-03-02T17:00:00Z"));
    let window = QueryWindow::new(dt("2026-03-02T08:00:00Z"), dt("2026-03-02T17:00:00Z"));
    assert!(free_slots(&busy, &window).is_empty());
}

// ── Availability ────────────────────────────────────────────────────────────

#[test]
fn available_set_is_open_time_deprived_of_busy_time() {
    let open = vec![weekly("2026-03-02", 9, &[Weekday::Mon], 8 * 60)];
    let busy = vec![literal("2026-03-02T10:00:00Z", "2026-03-02T11:00:00Z")];
    let window = QueryWindow::new(dt("2026-03-02T00:00:00Z"), dt("2026-03-03T00:00:00Z"));

    let available = available_set(&open, &busy, &window);
    assert_eq!(
        available.as_slice(),
        &[
            span("2026-03-02T09:00:00Z", "2026-03-02T10:00:00Z"),
            span("2026-03-02T11:00:00Z", "2026-03-02T17:00:00Z"),
        ]
    );
}

#[test]
fn no_open_commitments_means_the_whole_window_is_open() {
    let busy = vec![literal("2026-03-02T10:00:00Z", "2026-03-02T11:00:00Z")];
    let window = QueryWindow::new(dt("2026-03-02T08:00:00Z"), dt("2026-03-02T12:00:00Z"));

    let available = available_set(&[], &busy, &window);
    assert_eq!(
        available.as_slice(),
        &[
            span("2026-03-02T08:00:00Z", "2026-03-02T10:00:00Z"),
            span("2026-03-02T11:00:00Z", "2026-03-02T12:00:00Z"),
        ]
    );
}

// ── Raw commitment resolution ───────────────────────────────────────────────

#[test]
fn resolve_drops_malformed_recurrence_entries() {
    let raw = vec![
        RawEntry {
            label: Some("good literal".into()),
            commitment: RawCommitment::Literal {
                start: dt("2026-03-02T09:00:00Z"),
                end: dt("2026-03-02T10:00:00Z"),
            },
        },
        RawEntry {
            label: None,
            commitment: RawCommitment::Recurring {
                recurrence: "FREQ=WEEKLY;BYDAY=MO".into(),
                duration_ms: 50 * 60 * 1000,
                source_start: dt("2026-03-02T14:00:00Z"),
            },
        },
        RawEntry {
            label: Some("broken".into()),
            commitment: RawCommitment::Recurring {
                recurrence: "FREQ=SOMETIMES;BYDAY=??".into(),
                duration_ms: 50 * 60 * 1000,
                source_start: dt("2026-03-02T14:00:00Z"),
            },
        },
    ];

    let resolved = resolve_commitments(&raw);
    assert_eq!(resolved.len(), 2);
    assert_eq!(resolved[0].label.as_deref(), Some("good literal"));
}

#[test]
fn raw_entries_deserialize_from_both_wire_shapes() {
    let json = r#"[
        { "label": "one-off", "start": "2026-03-02T09:00:00Z", "end": "2026-03-02T10:00:00Z" },
        { "recurrence": "FREQ=WEEKLY;BYDAY=MO", "duration_ms": 3000000, "source_start": "2026-03-02T14:00:00Z" }
    ]"#;
    let raw: Vec<RawEntry> = serde_json::from_str(json).expect("wire shapes must deserialize");
    assert_eq!(raw.len(), 2);

    let resolved = resolve_commitments(&raw);
    assert_eq!(resolved.len(), 2);

    let window = QueryWindow::new(dt("2026-03-02T00:00:00Z"), dt("2026-03-03T00:00:00Z"));
    let busy = busy_set(&resolved, &window);
    assert_eq!(
        busy.as_slice(),
        &[
            span("2026-03-02T09:00:00Z", "2026-03-02T10:00:00Z"),
            span("2026-03-02T14:00:00Z", "2026-03-02T14:50:00Z"),
        ]
    );
}

//! Candidate-slot conflict detection and reporting.
//!
//! Every check is a stateless function of its explicit inputs; a candidate
//! with no conflicts yields an empty report, never an error. Boundary
//! policy: a slot ending exactly when a commitment starts is NOT a conflict
//! (strict overlap); open-window containment is closed, so a candidate may
//! fill its window edge to edge.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::commitment::Commitment;

/// A proposed session being checked for conflicts. The weekday is carried
/// explicitly because recurring commitments match by weekday pattern, not by
/// absolute date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSlot {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl CandidateSlot {
    /// Build a slot on a specific date, deriving the weekday from it.
    pub fn on_date(date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        CandidateSlot {
            date,
            weekday: date.weekday(),
            start_time,
            end_time,
        }
    }
}

/// Per-resource reference data for one candidate: busy commitments per
/// category, plus declared open windows for the categories that have them.
/// An empty open collection means no availability constraint is defined for
/// that category and the corresponding check is skipped entirely.
#[derive(Debug, Clone, Default)]
pub struct ResourcePlan {
    pub teacher_busy: Vec<Commitment>,
    pub room_busy: Vec<Commitment>,
    pub student_busy: Vec<Commitment>,
    pub teacher_open: Vec<Commitment>,
    pub student_open: Vec<Commitment>,
}

/// Conflict category.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictKind {
    Teacher,
    Room,
    Student,
    TeacherUnavailable,
    StudentUnavailable,
    Duplicate,
}

/// One human-renderable conflict: the date it occurs on, the offending time
/// range, and the label of the resource involved when one is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictRecord {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_label: Option<String>,
}

/// Categorized conflict output, built fresh per validation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConflictReport(BTreeMap<ConflictKind, Vec<ConflictRecord>>);

impl ConflictReport {
    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    pub fn add(&mut self, kind: ConflictKind, record: ConflictRecord) {
        self.0.entry(kind).or_default().push(record);
    }

    pub fn records(&self, kind: ConflictKind) -> &[ConflictRecord] {
        self.0.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ConflictKind, &Vec<ConflictRecord>)> {
        self.0.iter()
    }
}

/// Strict time-of-day collision: the commitment constrains the candidate's
/// date AND their time ranges share at least one instant. Touching
/// endpoints do not collide.
pub fn overlaps_candidate(commitment: &Commitment, candidate: &CandidateSlot) -> bool {
    if !commitment.applies_on(candidate.date, candidate.weekday) {
        return false;
    }
    let Some((busy_start, busy_end)) = commitment.time_of_day() else {
        return false;
    };
    candidate.start_time < busy_end && busy_start < candidate.end_time
}

/// Closed containment: the commitment applies on the candidate's date AND
/// the candidate's `[start, end)` lies fully inside the open range.
pub fn within_open_window(open: &Commitment, candidate: &CandidateSlot) -> bool {
    if !open.applies_on(candidate.date, candidate.weekday) {
        return false;
    }
    let Some((open_start, open_end)) = open.time_of_day() else {
        return false;
    };
    candidate.start_time >= open_start && candidate.end_time <= open_end
}

/// Evaluate one candidate against every commitment in the plan.
pub fn check_slot(candidate: &CandidateSlot, plan: &ResourcePlan) -> ConflictReport {
    let mut report = ConflictReport::default();
    collect_overlaps(&mut report, ConflictKind::Teacher, &plan.teacher_busy, candidate);
    collect_overlaps(&mut report, ConflictKind::Room, &plan.room_busy, candidate);
    collect_overlaps(&mut report, ConflictKind::Student, &plan.student_busy, candidate);
    collect_unavailable(
        &mut report,
        ConflictKind::TeacherUnavailable,
        &plan.teacher_open,
        candidate,
    );
    collect_unavailable(
        &mut report,
        ConflictKind::StudentUnavailable,
        &plan.student_open,
        candidate,
    );
    report
}

fn collect_overlaps(
    report: &mut ConflictReport,
    kind: ConflictKind,
    busy: &[Commitment],
    candidate: &CandidateSlot,
) {
    for commitment in busy {
        if !overlaps_candidate(commitment, candidate) {
            continue;
        }
        if let Some((start_time, end_time)) = commitment.time_of_day() {
            report.add(
                kind,
                ConflictRecord {
                    date: candidate.date,
                    start_time,
                    end_time,
                    resource_label: commitment.label.clone(),
                },
            );
        }
    }
}

fn collect_unavailable(
    report: &mut ConflictReport,
    kind: ConflictKind,
    open: &[Commitment],
    candidate: &CandidateSlot,
) {
    // No open windows declared: availability constraints only apply once
    // any are defined.
    if open.is_empty() {
        return;
    }
    if open.iter().any(|window| within_open_window(window, candidate)) {
        return;
    }
    report.add(
        kind,
        ConflictRecord {
            date: candidate.date,
            start_time: candidate.start_time,
            end_time: candidate.end_time,
            resource_label: None,
        },
    );
}

/// Room assignment of a proposed slot. `Unassigned` and `External` are
/// sentinel categories of their own for duplicate detection: two unassigned
/// slots at the same time for the same teacher still collide, but an
/// unassigned slot and an external one do not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomAssignment {
    Room(String),
    Unassigned,
    External,
}

impl RoomAssignment {
    fn key(&self) -> (u8, &str) {
        match self {
            RoomAssignment::Room(id) => (0, id.as_str()),
            RoomAssignment::Unassigned => (1, ""),
            RoomAssignment::External => (2, ""),
        }
    }
}

/// One row of a batch of candidates proposed together.
#[derive(Debug, Clone)]
pub struct BatchEntry {
    pub slot: CandidateSlot,
    pub teacher_id: String,
    pub room: RoomAssignment,
}

/// Evaluate a batch: each entry is checked against its own plan (rows are
/// independent and could be computed in parallel), then duplicate slots
/// within the batch are flagged. Two entries duplicate each other when they
/// share weekday, start time, teacher, and room-assignment key.
///
/// Entries beyond the end of `plans` get only duplicate checking.
pub fn check_batch(entries: &[BatchEntry], plans: &[ResourcePlan]) -> Vec<ConflictReport> {
    let mut reports: Vec<ConflictReport> = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| match plans.get(index) {
            Some(plan) => check_slot(&entry.slot, plan),
            None => ConflictReport::default(),
        })
        .collect();

    let mut groups: HashMap<(Weekday, NaiveTime, &str, (u8, &str)), Vec<usize>> = HashMap::new();
    for (index, entry) in entries.iter().enumerate() {
        groups
            .entry((
                entry.slot.weekday,
                entry.slot.start_time,
                entry.teacher_id.as_str(),
                entry.room.key(),
            ))
            .or_default()
            .push(index);
    }

    for indices in groups.values() {
        if indices.len() < 2 {
            continue;
        }
        for &index in indices {
            let slot = &entries[index].slot;
            reports[index].add(
                ConflictKind::Duplicate,
                ConflictRecord {
                    date: slot.date,
                    start_time: slot.start_time,
                    end_time: slot.end_time,
                    resource_label: Some(entries[index].teacher_id.clone()),
                },
            );
        }
    }

    reports
}

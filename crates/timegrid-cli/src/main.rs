//! `timegrid` CLI — expand recurrences, compute free time, and check
//! candidate session slots for conflicts from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Expand a weekly rule into concrete occurrences
//! timegrid expand --rule "FREQ=WEEKLY;BYDAY=MO" \
//!     --anchor 2026-03-02T14:00:00Z --duration-minutes 50 \
//!     --from 2026-03-02T00:00:00Z --to 2026-03-30T00:00:00Z
//!
//! # Compute free time from a commitment list (stdin → stdout)
//! timegrid free -i commitments.json
//!
//! # Check proposed slots; exits 1 when any conflict is found
//! timegrid check -i batch.json
//! ```

use std::io::{self, Read};
use std::process;

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use serde::Deserialize;

use timegrid_core::{
    busy_set, check_batch, free_slots, parse_recurrence, resolve_commitments, BatchEntry,
    CandidateSlot, QueryWindow, RawEntry, ResourcePlan, RoomAssignment,
};

#[derive(Parser)]
#[command(
    name = "timegrid",
    version,
    about = "Interval algebra and scheduling-conflict CLI"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand a weekly recurrence rule into concrete occurrences
    Expand {
        /// RFC 5545 recurrence rule (e.g. "FREQ=WEEKLY;BYDAY=MO,WE")
        #[arg(long)]
        rule: String,
        /// Anchor datetime, RFC 3339 (e.g. "2026-03-02T14:00:00Z")
        #[arg(long)]
        anchor: DateTime<Utc>,
        /// Duration of each occurrence in minutes
        #[arg(long, default_value_t = 60)]
        duration_minutes: u32,
        /// Window start, RFC 3339
        #[arg(long)]
        from: DateTime<Utc>,
        /// Window end, RFC 3339 (exclusive)
        #[arg(long)]
        to: DateTime<Utc>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Compute free time within a window from busy commitments
    Free {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Check candidate session slots for scheduling conflicts
    Check {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Input document for `free`.
#[derive(Deserialize)]
struct FreeInput {
    commitments: Vec<RawEntry>,
    window: WindowInput,
}

#[derive(Deserialize)]
struct WindowInput {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

/// Input document for `check`.
#[derive(Deserialize)]
struct CheckInput {
    entries: Vec<EntryInput>,
    #[serde(default)]
    plans: Vec<PlanInput>,
}

#[derive(Deserialize)]
struct EntryInput {
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    teacher_id: String,
    #[serde(default)]
    room: Option<String>,
    #[serde(default)]
    external: bool,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct PlanInput {
    teacher_busy: Vec<RawEntry>,
    room_busy: Vec<RawEntry>,
    student_busy: Vec<RawEntry>,
    teacher_open: Vec<RawEntry>,
    student_open: Vec<RawEntry>,
}

fn main() {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            process::exit(2);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Expand {
            rule,
            anchor,
            duration_minutes,
            from,
            to,
            output,
        } => {
            let spec = parse_recurrence(
                &rule,
                anchor,
                Duration::minutes(i64::from(duration_minutes)),
            )
            .context("parsing recurrence rule")?;
            let occurrences = spec.expand(&QueryWindow::new(from, to));
            let listed: Vec<String> = occurrences.iter().map(ToString::to_string).collect();
            let rendered =
                serde_json::to_string_pretty(&listed).context("serializing occurrences")?;
            write_output(output.as_deref(), &rendered)?;
            Ok(0)
        }
        Commands::Free { input, output } => {
            let text = read_input(input.as_deref())?;
            let doc: FreeInput = serde_json::from_str(&text).context("parsing free input")?;
            let window = QueryWindow::new(doc.window.start, doc.window.end);
            let commitments = resolve_commitments(&doc.commitments);
            let busy = busy_set(&commitments, &window);
            let free = free_slots(&busy, &window);
            let rendered = serde_json::to_string_pretty(&free.to_strings())
                .context("serializing free slots")?;
            write_output(output.as_deref(), &rendered)?;
            Ok(0)
        }
        Commands::Check { input, output } => {
            let text = read_input(input.as_deref())?;
            let doc: CheckInput = serde_json::from_str(&text).context("parsing check input")?;
            let entries: Vec<BatchEntry> = doc.entries.iter().map(to_batch_entry).collect();
            let plans: Vec<ResourcePlan> = doc.plans.iter().map(to_plan).collect();
            let reports = check_batch(&entries, &plans);
            let rendered =
                serde_json::to_string_pretty(&reports).context("serializing conflict reports")?;
            write_output(output.as_deref(), &rendered)?;
            // Scriptable gate: non-zero when anything collided.
            if reports.iter().any(|report| !report.is_empty()) {
                Ok(1)
            } else {
                Ok(0)
            }
        }
    }
}

fn to_batch_entry(entry: &EntryInput) -> BatchEntry {
    let room = if entry.external {
        RoomAssignment::External
    } else {
        match &entry.room {
            Some(id) => RoomAssignment::Room(id.clone()),
            None => RoomAssignment::Unassigned,
        }
    };
    BatchEntry {
        slot: CandidateSlot {
            date: entry.date,
            weekday: entry.date.weekday(),
            start_time: entry.start_time,
            end_time: entry.end_time,
        },
        teacher_id: entry.teacher_id.clone(),
        room,
    }
}

fn to_plan(plan: &PlanInput) -> ResourcePlan {
    ResourcePlan {
        teacher_busy: resolve_commitments(&plan.teacher_busy),
        room_busy: resolve_commitments(&plan.room_busy),
        student_busy: resolve_commitments(&plan.student_busy),
        teacher_open: resolve_commitments(&plan.teacher_open),
        student_open: resolve_commitments(&plan.student_open),
    }
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading input file {path}")),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("reading stdin")?;
            Ok(buffer)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("writing output file {path}")),
        None => {
            println!("{content}");
            Ok(())
        }
    }
}

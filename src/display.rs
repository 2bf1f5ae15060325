use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::items::Schedulable;
use crate::schedule::{DayTag, ItemId, Scope};

/// One row as it shows up on a given day
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub id: ItemId,
    pub label: String,
    pub day_scheduled: bool,
}

/// Weekly rotation of a single scope, Monday through Sunday
#[derive(Debug, Clone)]
pub struct ScopeWeek {
    pub scope: Scope,
    pub days: BTreeMap<DayTag, Vec<ReportEntry>>,
}

impl ScopeWeek {
    pub fn from_rows<R: Schedulable>(scope: Scope, week: BTreeMap<DayTag, Vec<R>>) -> Self {
        let days = week
            .into_iter()
            .map(|(day, rows)| {
                let entries = rows
                    .iter()
                    .map(|row| ReportEntry {
                        id: row.id().clone(),
                        label: row.label(),
                        day_scheduled: scope.rotates_by_day() && row.scheduled().is_day_scheduled,
                    })
                    .collect();
                (day, entries)
            })
            .collect();
        Self { scope, days }
    }
}

/// Writes every scope's week in the format: `Monday    label (day), label`
pub fn write_rotation<W: Write>(out: &mut W, weeks: &[ScopeWeek]) -> io::Result<()> {
    for week in weeks {
        writeln!(out, "** {} **", week.scope)?;
        for (day, entries) in &week.days {
            if entries.is_empty() {
                writeln!(out, "{:<10} [EMPTY]", day.label())?;
                continue;
            }
            let names: Vec<String> = entries
                .iter()
                .map(|entry| {
                    if entry.day_scheduled {
                        format!("{} (day)", entry.label)
                    } else {
                        entry.label.clone()
                    }
                })
                .collect();
            writeln!(out, "{:<10} {}", day.label(), names.join(", "))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Prints the weekly rotation in a readable format
pub fn print_rotation(weeks: &[ScopeWeek]) -> io::Result<()> {
    println!("\n=== Weekly Rotation ===");
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_rotation(&mut out, weeks)
}

pub fn write_rotation_to_file<P: AsRef<Path>>(weeks: &[ScopeWeek], filename: P) -> io::Result<()> {
    let mut file = File::create(filename)?;
    write_rotation(&mut file, weeks)
}

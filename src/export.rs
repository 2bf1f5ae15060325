use std::io;
use std::path::Path;

use csv::WriterBuilder;

use crate::display::ScopeWeek;

/// Writes the weekly rotation grid, one line per (scope, day, position)
pub fn write_rotation_csv<W: io::Write>(writer: W, weeks: &[ScopeWeek]) -> Result<(), csv::Error> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(["scope", "day", "position", "id", "label", "day_scheduled"])?;

    for week in weeks {
        let scope = week.scope.to_string();
        for (day, entries) in &week.days {
            for (position, entry) in entries.iter().enumerate() {
                wtr.write_record([
                    scope.as_str(),
                    day.as_str(),
                    position.to_string().as_str(),
                    entry.id.as_str(),
                    entry.label.as_str(),
                    if entry.day_scheduled { "true" } else { "false" },
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}

pub fn export_rotation_to_csv<P: AsRef<Path>>(weeks: &[ScopeWeek], csv_path: P) -> Result<(), csv::Error> {
    let file = std::fs::File::create(csv_path)?;
    write_rotation_csv(file, weeks)
}

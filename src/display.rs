use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::pivots::{Pivot, PivotData, Tabulated};
use crate::schedule::TeamSchedule;

/// Formats a team as shown on schedules: `number - name`.
pub fn format_team(number: u32, name: &str) -> String {
    format!("{} - {}", number, name)
}

/// Renders a table with each column padded to its widest cell.
pub fn render_table(table: &Tabulated) -> String {
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(w) => *w = (*w).max(len),
                None => widths.push(len),
            }
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{:<width$}", c, width = widths[i]))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&line(&table.headers));
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&line(&rule));
    out.push('\n');
    for row in &table.rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    out
}

/// Writes the team schedule to a file, headed by the event name.
pub fn write_schedule_to_file<P: AsRef<Path>>(
    event_name: &str,
    schedule: &[TeamSchedule],
    filename: P,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = File::create(filename)?;

    writeln!(file, "** {} **", event_name)?;
    write!(file, "{}", render_table(&PivotData::TeamSchedule(schedule.to_vec()).tabulate()))?;

    Ok(())
}

/// Prints the team schedule in a readable format.
pub fn print_team_schedule(event_name: &str, schedule: &[TeamSchedule]) {
    println!("\n=== {} ===", event_name);
    println!("Teams scheduled: {}", schedule.len());

    if let (Some(first), Some(last)) = (
        schedule.iter().flat_map(|s| s.matches()).map(|(_, t, _)| t).min(),
        schedule.iter().flat_map(|s| s.matches()).map(|(_, t, _)| t).max(),
    ) {
        println!("Robot game: {} to {}", first.format("%H:%M"), last.format("%H:%M"));
    }

    println!();
    print!("{}", render_table(&PivotData::TeamSchedule(schedule.to_vec()).tabulate()));
}

/// Prints one pivot under its name.
pub fn print_pivot(pivot: &Pivot) {
    println!("\n=== {} ===", pivot.name);
    if pivot.data.is_empty() {
        println!("  (no entries)");
    } else {
        print!("{}", render_table(&pivot.data.tabulate()));
    }
}

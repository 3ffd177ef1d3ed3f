use csv::WriterBuilder;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::pivots::{PivotData, Tabulated, Pivot};
use crate::schedule::TeamSchedule;

/// Writes headers and rows as CSV.
pub fn write_table<W: Write>(writer: W, table: &Tabulated) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// The team schedule as a CSV document.
pub fn team_schedule_csv(schedule: &[TeamSchedule]) -> Result<String, Box<dyn std::error::Error>> {
    let mut buffer = Vec::new();
    write_table(&mut buffer, &PivotData::TeamSchedule(schedule.to_vec()).tabulate())?;
    Ok(String::from_utf8(buffer)?)
}

/// File name for a pivot: lower-cased, anything not alphanumeric becomes `_`.
pub fn pivot_file_name(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{}.csv", stem)
}

/// Writes one CSV per pivot into `dir`, creating it if needed.
/// Returns the written paths in pivot order.
pub fn write_pivots_csv(dir: &Path, pivots: &[Pivot]) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(pivots.len());
    for pivot in pivots {
        let path = dir.join(pivot_file_name(&pivot.name));
        write_table(File::create(&path)?, &pivot.data.tabulate())?;
        debug!("wrote {} ({} rows)", path.display(), pivot.data.len());
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pivots::build_pivots;
    use crate::schedule::slot_utils::parse_time;

    fn team(number: u32, name: &str) -> TeamSchedule {
        let t = |s: &str| parse_time(s).unwrap();
        TeamSchedule {
            number,
            name: name.to_string(),
            judging_start: t("09:00"),
            judging_pod: "Pod 1".to_string(),
            practice_start: t("09:40"),
            practice_table: "Table 1".to_string(),
            match1_start: t("10:00"),
            match1_table: "Table 2".to_string(),
            match2_start: t("10:20"),
            match2_table: "Table 1".to_string(),
            match3_start: t("10:40"),
            match3_table: "Table 2".to_string(),
        }
    }

    #[test]
    fn test_pivot_file_name() {
        assert_eq!(pivot_file_name("Team Schedule"), "team_schedule.csv");
        assert_eq!(
            pivot_file_name("Pod #2 Judging Schedule"),
            "pod__2_judging_schedule.csv"
        );
    }

    #[test]
    fn test_team_schedule_csv_quotes_commas() {
        let csv = team_schedule_csv(&[team(3, "Nuts, Bolts")]).unwrap();
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("Team,Name,Judging,Pod,Practice"));
        assert_eq!(
            lines.next().unwrap(),
            "3,\"Nuts, Bolts\",09:00,Pod 1,09:40,Table 1,10:00,Table 2,10:20,Table 1,10:40,Table 2"
        );
    }

    #[test]
    fn test_write_pivots_csv_one_file_per_pivot() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("pivots");
        let pods = vec!["Pod 1".to_string()];
        let tables = vec!["Table 1".to_string(), "Table 2".to_string()];
        let pivots = build_pivots(&pods, &tables, &[team(1, "One")]);

        let written = write_pivots_csv(&out, &pivots).unwrap();
        assert_eq!(written.len(), pivots.len());
        assert!(out.join("registration.csv").exists());
        assert!(out.join("table_2_robot_game_table_schedule.csv").exists());

        let queue = fs::read_to_string(out.join("robot_game_queuing_schedule.csv")).unwrap();
        let lines: Vec<&str> = queue.lines().collect();
        assert_eq!(lines[0], "Queue Time,Team,Name,Match Time,Match,Table");
        assert_eq!(lines[1], "09:35,1,One,09:40,P,Table 1");
        assert_eq!(lines.len(), 5);
    }
}

use csv::{ReaderBuilder, StringRecord};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::request::{ScheduleRequest, TeamEntry};

/// Loads a schedule request from a JSON file.
pub fn load_request<P: AsRef<Path>>(path: P) -> Result<ScheduleRequest, Box<dyn std::error::Error>> {
    let raw = fs::read_to_string(path.as_ref())?;
    let request: ScheduleRequest = serde_json::from_str(&raw)?;
    debug!(
        "loaded request '{}' from {} with {} teams",
        request.name,
        path.as_ref().display(),
        request.teams.len()
    );
    Ok(request)
}

/// Finds a column whose header matches one of `names`, ignoring case and
/// surrounding whitespace.
fn find_column(headers: &StringRecord, names: &[&str]) -> Option<usize> {
    headers.iter().position(|h| {
        let h = h.trim().to_lowercase();
        names.iter().any(|n| h == *n)
    })
}

/// Loads a team roster from a CSV file with a header row.
///
/// The number column is found by a header of `number`, `team #`, `team number`
/// or `team`; the name column by `name` or `team name`. Without a matching
/// header the first two columns are used. Rows with a blank name or a
/// non-numeric number are skipped. A later row with the same number replaces
/// the earlier one.
pub fn load_teams<P: AsRef<Path>>(csv_path: P) -> Result<Vec<TeamEntry>, Box<dyn std::error::Error>> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(csv_path.as_ref())?;

    let headers = reader.headers()?.clone();
    let number_col = find_column(&headers, &["number", "team #", "team number", "team"]).unwrap_or(0);
    let name_col = find_column(&headers, &["name", "team name"]).unwrap_or(1);

    let mut order: Vec<u32> = Vec::new();
    let mut by_number: HashMap<u32, TeamEntry> = HashMap::new();

    for (line, result) in reader.records().enumerate() {
        let record = result?;
        let number = record.get(number_col).unwrap_or("");
        let name = record.get(name_col).unwrap_or("");

        let number: u32 = match number.parse() {
            Ok(n) => n,
            Err(_) => {
                warn!("skipping roster row {}: '{}' is not a team number", line + 2, number);
                continue;
            }
        };
        if name.is_empty() {
            warn!("skipping roster row {}: team {} has no name", line + 2, number);
            continue;
        }

        if by_number.insert(number, TeamEntry::new(number, name)).is_some() {
            debug!("team {} listed again, keeping the later row", number);
        } else {
            order.push(number);
        }
    }

    Ok(order
        .into_iter()
        .filter_map(|n| by_number.remove(&n))
        .collect())
}

//! Read-only views over a finished schedule: queuing sheets, per-pod and
//! per-table lists, and time-by-resource grids.

use std::collections::BTreeMap;

use chrono::NaiveTime;
use serde::Serialize;

use crate::display::format_team;
use crate::schedule::slot_utils::{format_time, hhmm, minutes_to_time, time_to_minutes};
use crate::schedule::{MatchKind, TeamSchedule};

/// Teams are asked to queue this many minutes before their slot.
pub const QUEUE_LEAD_MINUTES: u32 = 5;

/// Placeholder for an empty grid cell.
pub const EMPTY_CELL: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PivotType {
    Registration,
    TeamSchedule,
    JudgingQueuingSchedule,
    JudgingSchedule,
    PodJudgingSchedule,
    RobotGameQueuingSchedule,
    RobotGameSchedule,
    RobotGameTableSchedule,
}

#[derive(Debug, Clone, Serialize)]
pub struct Pivot {
    pub name: String,
    pub pivot_type: PivotType,
    pub data: PivotData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PivotData {
    Registration(Vec<RegistrationEntry>),
    TeamSchedule(Vec<TeamSchedule>),
    JudgingQueue(Vec<JudgingQueuingEntry>),
    Grid(Vec<FlexEntry>),
    PodJudging(Vec<PodJudgingEntry>),
    RobotGameQueue(Vec<RobotGameQueuingEntry>),
    RobotGameTable(Vec<RobotGameTableEntry>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationEntry {
    pub team: u32,
    pub name: String,
    pub roster: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JudgingQueuingEntry {
    #[serde(with = "hhmm")]
    pub queue_time: NaiveTime,
    pub team: u32,
    pub name: String,
    #[serde(with = "hhmm")]
    pub judging: NaiveTime,
    pub pod: String,
}

/// One row of a time-by-resource grid. `row[i]` belongs to `columns[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlexEntry {
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub columns: Vec<String>,
    pub row: Vec<String>,
}

impl FlexEntry {
    pub fn cell(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.row.get(i))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PodJudgingEntry {
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub team: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RobotGameQueuingEntry {
    #[serde(with = "hhmm")]
    pub queue_time: NaiveTime,
    pub team: u32,
    pub name: String,
    #[serde(with = "hhmm")]
    pub match_time: NaiveTime,
    #[serde(rename = "match")]
    pub kind: MatchKind,
    pub table: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RobotGameTableEntry {
    #[serde(with = "hhmm")]
    pub match_time: NaiveTime,
    pub team: u32,
    pub name: String,
    #[serde(rename = "match")]
    pub kind: MatchKind,
}

/// Headers plus stringified rows, shared by the CSV and text renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tabulated {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// All views, in the order they are presented: registration, team schedule,
/// judging views (queue, grid, one per pod), robot-game views (queue, grid, one per table).
pub fn build_pivots(pods: &[String], tables: &[String], schedule: &[TeamSchedule]) -> Vec<Pivot> {
    let mut pivots = vec![
        Pivot {
            name: "Registration".to_string(),
            pivot_type: PivotType::Registration,
            data: PivotData::Registration(registration(schedule)),
        },
        Pivot {
            name: "Team Schedule".to_string(),
            pivot_type: PivotType::TeamSchedule,
            data: PivotData::TeamSchedule(team_schedule(schedule)),
        },
        Pivot {
            name: "Judging Queuing Schedule".to_string(),
            pivot_type: PivotType::JudgingQueuingSchedule,
            data: PivotData::JudgingQueue(judging_queue(pods, schedule)),
        },
        Pivot {
            name: "Judging Schedule".to_string(),
            pivot_type: PivotType::JudgingSchedule,
            data: PivotData::Grid(judging_grid(pods, schedule)),
        },
    ];

    for pod in pods {
        pivots.push(Pivot {
            name: format!("{} Judging Schedule", pod),
            pivot_type: PivotType::PodJudgingSchedule,
            data: PivotData::PodJudging(pod_schedule(pod, schedule)),
        });
    }

    let games = robot_game_queue(tables, schedule);
    let game_grid = robot_game_grid(tables, &games);
    let per_table: Vec<Pivot> = tables
        .iter()
        .map(|table| Pivot {
            name: format!("{} Robot Game Table Schedule", table),
            pivot_type: PivotType::RobotGameTableSchedule,
            data: PivotData::RobotGameTable(table_schedule(table, &games)),
        })
        .collect();

    pivots.push(Pivot {
        name: "Robot Game Queuing Schedule".to_string(),
        pivot_type: PivotType::RobotGameQueuingSchedule,
        data: PivotData::RobotGameQueue(games),
    });
    pivots.push(Pivot {
        name: "Robot Game Schedule".to_string(),
        pivot_type: PivotType::RobotGameSchedule,
        data: PivotData::Grid(game_grid),
    });
    pivots.extend(per_table);

    pivots
}

pub fn registration(schedule: &[TeamSchedule]) -> Vec<RegistrationEntry> {
    let mut entries: Vec<RegistrationEntry> = schedule
        .iter()
        .map(|s| RegistrationEntry {
            team: s.number,
            name: s.name.clone(),
            roster: String::new(),
        })
        .collect();
    entries.sort_by_key(|e| e.team);
    entries
}

pub fn team_schedule(schedule: &[TeamSchedule]) -> Vec<TeamSchedule> {
    let mut entries = schedule.to_vec();
    entries.sort_by_key(|s| s.number);
    entries
}

pub fn judging_queue(pods: &[String], schedule: &[TeamSchedule]) -> Vec<JudgingQueuingEntry> {
    let mut entries: Vec<JudgingQueuingEntry> = schedule
        .iter()
        .map(|s| JudgingQueuingEntry {
            queue_time: queue_time(s.judging_start),
            team: s.number,
            name: s.name.clone(),
            judging: s.judging_start,
            pod: s.judging_pod.clone(),
        })
        .collect();
    entries.sort_by_key(|e| (e.queue_time, resource_order(pods, &e.pod)));
    entries
}

pub fn judging_grid(pods: &[String], schedule: &[TeamSchedule]) -> Vec<FlexEntry> {
    grid(
        pods,
        schedule.iter().map(|s| {
            (
                s.judging_start,
                s.judging_pod.as_str(),
                format_team(s.number, &s.name),
            )
        }),
    )
}

pub fn pod_schedule(pod: &str, schedule: &[TeamSchedule]) -> Vec<PodJudgingEntry> {
    let mut entries: Vec<PodJudgingEntry> = schedule
        .iter()
        .filter(|s| s.judging_pod == pod)
        .map(|s| PodJudgingEntry {
            time: s.judging_start,
            team: s.number,
            name: s.name.clone(),
        })
        .collect();
    entries.sort_by_key(|e| e.time);
    entries
}

/// Every match of every team, ordered by queue time and then by table order.
pub fn robot_game_queue(tables: &[String], schedule: &[TeamSchedule]) -> Vec<RobotGameQueuingEntry> {
    let mut entries: Vec<RobotGameQueuingEntry> = schedule
        .iter()
        .flat_map(|s| {
            s.matches()
                .into_iter()
                .map(move |(kind, time, table)| RobotGameQueuingEntry {
                    queue_time: queue_time(time),
                    team: s.number,
                    name: s.name.clone(),
                    match_time: time,
                    kind,
                    table: table.to_string(),
                })
        })
        .collect();
    entries.sort_by_key(|e| (e.queue_time, resource_order(tables, &e.table)));
    entries
}

pub fn robot_game_grid(tables: &[String], games: &[RobotGameQueuingEntry]) -> Vec<FlexEntry> {
    grid(
        tables,
        games.iter().map(|g| {
            (
                g.match_time,
                g.table.as_str(),
                format!("{} ({})", format_team(g.team, &g.name), g.kind.label()),
            )
        }),
    )
}

pub fn table_schedule(table: &str, games: &[RobotGameQueuingEntry]) -> Vec<RobotGameTableEntry> {
    let mut entries: Vec<RobotGameTableEntry> = games
        .iter()
        .filter(|g| g.table == table)
        .map(|g| RobotGameTableEntry {
            match_time: g.match_time,
            team: g.team,
            name: g.name.clone(),
            kind: g.kind,
        })
        .collect();
    entries.sort_by_key(|e| e.match_time);
    entries
}

fn queue_time(start: NaiveTime) -> NaiveTime {
    minutes_to_time(time_to_minutes(start).saturating_sub(QUEUE_LEAD_MINUTES)).unwrap_or(start)
}

/// Position of `name` in the configured list; unknown names sort last.
fn resource_order(resources: &[String], name: &str) -> usize {
    resources
        .iter()
        .position(|r| r == name)
        .unwrap_or(resources.len())
}

/// Groups `(time, column, text)` cells into one row per distinct time.
fn grid<'a, I>(columns: &[String], cells: I) -> Vec<FlexEntry>
where
    I: IntoIterator<Item = (NaiveTime, &'a str, String)>,
{
    let mut by_time: BTreeMap<NaiveTime, Vec<(&'a str, String)>> = BTreeMap::new();
    for (time, column, text) in cells {
        by_time.entry(time).or_default().push((column, text));
    }

    by_time
        .into_iter()
        .map(|(time, cells)| FlexEntry {
            time,
            columns: columns.to_vec(),
            row: columns
                .iter()
                .map(|column| {
                    cells
                        .iter()
                        .find(|(c, _)| c == column)
                        .map(|(_, text)| text.clone())
                        .unwrap_or_else(|| EMPTY_CELL.to_string())
                })
                .collect(),
        })
        .collect()
}

impl PivotData {
    pub fn len(&self) -> usize {
        match self {
            PivotData::Registration(rows) => rows.len(),
            PivotData::TeamSchedule(rows) => rows.len(),
            PivotData::JudgingQueue(rows) => rows.len(),
            PivotData::Grid(rows) => rows.len(),
            PivotData::PodJudging(rows) => rows.len(),
            PivotData::RobotGameQueue(rows) => rows.len(),
            PivotData::RobotGameTable(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn tabulate(&self) -> Tabulated {
        fn headers(names: &[&str]) -> Vec<String> {
            names.iter().map(|h| h.to_string()).collect()
        }

        match self {
            PivotData::Registration(rows) => Tabulated {
                headers: headers(&["Team", "Name", "Roster"]),
                rows: rows
                    .iter()
                    .map(|r| vec![r.team.to_string(), r.name.clone(), r.roster.clone()])
                    .collect(),
            },
            PivotData::TeamSchedule(rows) => Tabulated {
                headers: headers(&[
                    "Team",
                    "Name",
                    "Judging",
                    "Pod",
                    "Practice",
                    "Practice Table",
                    "Match 1",
                    "Match 1 Table",
                    "Match 2",
                    "Match 2 Table",
                    "Match 3",
                    "Match 3 Table",
                ]),
                rows: rows
                    .iter()
                    .map(|s| {
                        let mut row = vec![
                            s.number.to_string(),
                            s.name.clone(),
                            format_time(s.judging_start),
                            s.judging_pod.clone(),
                        ];
                        for (_, time, table) in s.matches() {
                            row.push(format_time(time));
                            row.push(table.to_string());
                        }
                        row
                    })
                    .collect(),
            },
            PivotData::JudgingQueue(rows) => Tabulated {
                headers: headers(&["Queue Time", "Team", "Name", "Judging", "Pod"]),
                rows: rows
                    .iter()
                    .map(|e| {
                        vec![
                            format_time(e.queue_time),
                            e.team.to_string(),
                            e.name.clone(),
                            format_time(e.judging),
                            e.pod.clone(),
                        ]
                    })
                    .collect(),
            },
            PivotData::Grid(rows) => Tabulated {
                headers: std::iter::once("Time".to_string())
                    .chain(rows.first().map(|r| r.columns.clone()).unwrap_or_default())
                    .collect(),
                rows: rows
                    .iter()
                    .map(|e| {
                        std::iter::once(format_time(e.time))
                            .chain(e.row.iter().cloned())
                            .collect()
                    })
                    .collect(),
            },
            PivotData::PodJudging(rows) => Tabulated {
                headers: headers(&["Time", "Team", "Name"]),
                rows: rows
                    .iter()
                    .map(|e| vec![format_time(e.time), e.team.to_string(), e.name.clone()])
                    .collect(),
            },
            PivotData::RobotGameQueue(rows) => Tabulated {
                headers: headers(&["Queue Time", "Team", "Name", "Match Time", "Match", "Table"]),
                rows: rows
                    .iter()
                    .map(|e| {
                        vec![
                            format_time(e.queue_time),
                            e.team.to_string(),
                            e.name.clone(),
                            format_time(e.match_time),
                            e.kind.label().to_string(),
                            e.table.clone(),
                        ]
                    })
                    .collect(),
            },
            PivotData::RobotGameTable(rows) => Tabulated {
                headers: headers(&["Match Time", "Team", "Name", "Match"]),
                rows: rows
                    .iter()
                    .map(|e| {
                        vec![
                            format_time(e.match_time),
                            e.team.to_string(),
                            e.name.clone(),
                            e.kind.label().to_string(),
                        ]
                    })
                    .collect(),
            },
        }
    }
}

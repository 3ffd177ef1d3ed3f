use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::request::TeamEntry;
use super::slot_utils::{hhmm, TimeWindow};

/// Practice plus three scored matches.
pub const MATCHES_PER_TEAM: usize = 4;

/// Position of a match within a team's robot-game run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MatchKind {
    #[serde(rename = "P")]
    Practice,
    #[serde(rename = "1")]
    Match1,
    #[serde(rename = "2")]
    Match2,
    #[serde(rename = "3")]
    Match3,
}

impl MatchKind {
    pub const ALL: [MatchKind; MATCHES_PER_TEAM] = [
        MatchKind::Practice,
        MatchKind::Match1,
        MatchKind::Match2,
        MatchKind::Match3,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Short label used in queuing sheets and grids.
    pub fn label(self) -> &'static str {
        match self {
            MatchKind::Practice => "P",
            MatchKind::Match1 => "1",
            MatchKind::Match2 => "2",
            MatchKind::Match3 => "3",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            MatchKind::Practice => "Practice",
            MatchKind::Match1 => "Match 1",
            MatchKind::Match2 => "Match 2",
            MatchKind::Match3 => "Match 3",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JudgingAssignment {
    pub start: u32,
    pub pod: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableAssignment {
    pub start: u32,
    pub table: String,
    /// Position of `table` in the request's table list.
    pub table_index: usize,
}

/// One robot-game match of a team, unassigned until the robot-game pass reaches it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotGameMatch {
    pub assignment: Option<TableAssignment>,
}

impl RobotGameMatch {
    pub fn is_assigned(&self) -> bool {
        self.assignment.is_some()
    }

    pub fn window(&self, cycle_minutes: u32) -> Option<TimeWindow> {
        self.assignment
            .as_ref()
            .map(|a| TimeWindow::starting_at(a.start, cycle_minutes))
    }
}

/// Mutable per-team state carried through the judging and robot-game passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingTeam {
    pub number: u32,
    pub name: String,
    pub judging: Option<JudgingAssignment>,
    pub matches: [RobotGameMatch; MATCHES_PER_TEAM],
}

impl WorkingTeam {
    pub fn new(entry: &TeamEntry) -> Self {
        Self {
            number: entry.number,
            name: entry.name.clone(),
            judging: None,
            matches: Default::default(),
        }
    }

    /// Index of the earliest match still waiting for a slot.
    pub fn next_unassigned(&self) -> Option<usize> {
        self.matches.iter().position(|m| !m.is_assigned())
    }

    pub fn is_fully_scheduled(&self) -> bool {
        self.judging.is_some() && self.matches.iter().all(RobotGameMatch::is_assigned)
    }

    pub fn has_played_table(&self, table_index: usize) -> bool {
        self.matches
            .iter()
            .filter_map(|m| m.assignment.as_ref())
            .any(|a| a.table_index == table_index)
    }

    pub fn judging_window(&self, cycle_minutes: u32) -> Option<TimeWindow> {
        self.judging
            .as_ref()
            .map(|j| TimeWindow::starting_at(j.start, cycle_minutes))
    }

    pub fn match_windows(&self, cycle_minutes: u32) -> impl Iterator<Item = TimeWindow> + '_ {
        self.matches.iter().filter_map(move |m| m.window(cycle_minutes))
    }

    /// Books the earliest unassigned match. Returns which match was booked.
    pub fn assign_next_match(
        &mut self,
        start: u32,
        table: &str,
        table_index: usize,
    ) -> Option<MatchKind> {
        let index = self.next_unassigned()?;
        self.matches[index].assignment = Some(TableAssignment {
            start,
            table: table.to_string(),
            table_index,
        });
        MatchKind::from_index(index)
    }
}

/// Flat, immutable schedule of one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSchedule {
    pub number: u32,
    pub name: String,
    #[serde(with = "hhmm")]
    pub judging_start: NaiveTime,
    pub judging_pod: String,
    #[serde(with = "hhmm")]
    pub practice_start: NaiveTime,
    pub practice_table: String,
    #[serde(with = "hhmm")]
    pub match1_start: NaiveTime,
    pub match1_table: String,
    #[serde(with = "hhmm")]
    pub match2_start: NaiveTime,
    pub match2_table: String,
    #[serde(with = "hhmm")]
    pub match3_start: NaiveTime,
    pub match3_table: String,
}

impl TeamSchedule {
    /// The four matches in positional order.
    pub fn matches(&self) -> [(MatchKind, NaiveTime, &str); MATCHES_PER_TEAM] {
        [
            (MatchKind::Practice, self.practice_start, self.practice_table.as_str()),
            (MatchKind::Match1, self.match1_start, self.match1_table.as_str()),
            (MatchKind::Match2, self.match2_start, self.match2_table.as_str()),
            (MatchKind::Match3, self.match3_start, self.match3_table.as_str()),
        ]
    }
}

/// Output of [`crate::compute_schedule`], one record per team ordered by team number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub teams: Vec<TeamSchedule>,
}

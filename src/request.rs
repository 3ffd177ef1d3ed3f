use std::collections::HashSet;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ScheduleError;
use crate::schedule::slot_utils::{hhmm, hhmm_list, hhmm_option, time_to_minutes, DAY_MINUTES};

/// A judging pod never sees more than this many teams.
pub const MAX_TEAMS_PER_POD: usize = 6;

/// Everything needed to build one tournament schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    #[serde(default)]
    pub name: String,
    pub event: EventConfig,
    pub judging: JudgingConfig,
    pub robot_game: RobotGameConfig,
    #[serde(default)]
    pub teams: Vec<TeamEntry>,
    #[serde(default)]
    pub seed: SeedPolicy,
}

/// Event-wide times. Only the lunch window constrains the assigners; the rest are echoed back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventConfig {
    #[serde(default, with = "hhmm_option", skip_serializing_if = "Option::is_none")]
    pub registration_time: Option<NaiveTime>,
    #[serde(default, with = "hhmm_option", skip_serializing_if = "Option::is_none")]
    pub coaches_meeting_time: Option<NaiveTime>,
    #[serde(default, with = "hhmm_option", skip_serializing_if = "Option::is_none")]
    pub opening_ceremony_time: Option<NaiveTime>,
    #[serde(with = "hhmm")]
    pub lunch_start: NaiveTime,
    #[serde(with = "hhmm")]
    pub lunch_end: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgingConfig {
    pub pods: Vec<String>,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    pub cycle_time_minutes: u32,
    #[serde(default)]
    pub buffer_minutes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotGameConfig {
    pub tables: Vec<String>,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    pub cycle_time_minutes: u32,
    #[serde(default)]
    pub buffer_minutes: u32,
    #[serde(default, with = "hhmm_list")]
    pub break_times: Vec<NaiveTime>,
    #[serde(default)]
    pub break_duration_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamEntry {
    pub number: u32,
    pub name: String,
}

impl TeamEntry {
    pub fn new(number: u32, name: impl Into<String>) -> Self {
        Self {
            number,
            name: name.into(),
        }
    }
}

/// Source of the tie-break shuffles.
///
/// `Fixed` makes the schedule reproducible; `Entropy` gives a different
/// (still valid) schedule on every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedPolicy {
    Fixed(u64),
    Entropy,
}

impl Default for SeedPolicy {
    fn default() -> Self {
        SeedPolicy::Fixed(0)
    }
}

impl ScheduleRequest {
    /// Rejects requests the assigners cannot turn into a complete schedule.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.teams.is_empty() {
            return Err(ScheduleError::invalid("at least one team is required"));
        }
        if self.judging.pods.is_empty() {
            return Err(ScheduleError::invalid("at least one judging pod is required"));
        }
        if self.robot_game.tables.is_empty() {
            return Err(ScheduleError::invalid("at least one robot game table is required"));
        }
        if self.robot_game.tables.len() % 2 != 0 {
            return Err(ScheduleError::invalid(format!(
                "tables must be even, got {}",
                self.robot_game.tables.len()
            )));
        }

        let pods_needed = self.teams.len().div_ceil(MAX_TEAMS_PER_POD);
        if self.judging.pods.len() < pods_needed {
            return Err(ScheduleError::invalid(format!(
                "{} teams need at least {} judging pods ({} teams per pod), got {}",
                self.teams.len(),
                pods_needed,
                MAX_TEAMS_PER_POD,
                self.judging.pods.len()
            )));
        }

        if self.judging.cycle_time_minutes == 0 {
            return Err(ScheduleError::invalid("judging cycle time must be greater than zero"));
        }
        if self.robot_game.cycle_time_minutes == 0 {
            return Err(ScheduleError::invalid("robot game cycle time must be greater than zero"));
        }
        for (field, minutes) in [
            ("judging cycle time", self.judging.cycle_time_minutes),
            ("judging buffer", self.judging.buffer_minutes),
            ("robot game cycle time", self.robot_game.cycle_time_minutes),
            ("robot game buffer", self.robot_game.buffer_minutes),
            ("break duration", self.robot_game.break_duration_minutes),
        ] {
            if minutes > DAY_MINUTES {
                return Err(ScheduleError::invalid(format!(
                    "{} of {} minutes is longer than a day",
                    field, minutes
                )));
            }
        }
        if self.event.lunch_end < self.event.lunch_start {
            return Err(ScheduleError::invalid(format!(
                "lunch ends ({}) before it starts ({})",
                self.event.lunch_end.format("%H:%M"),
                self.event.lunch_start.format("%H:%M")
            )));
        }

        let mut numbers = HashSet::new();
        for team in &self.teams {
            if team.name.trim().is_empty() {
                return Err(ScheduleError::invalid(format!("team {} has no name", team.number)));
            }
            if !numbers.insert(team.number) {
                return Err(ScheduleError::invalid(format!(
                    "team number {} appears more than once",
                    team.number
                )));
            }
        }
        check_resource_names("pod", &self.judging.pods)?;
        check_resource_names("table", &self.robot_game.tables)?;

        if !self.robot_game.break_times.is_empty() && self.robot_game.break_duration_minutes == 0 {
            warn!("break times given with a zero break duration; breaks will have no effect");
        }

        Ok(())
    }

    pub fn lunch_start_minutes(&self) -> u32 {
        time_to_minutes(self.event.lunch_start)
    }

    pub fn lunch_end_minutes(&self) -> u32 {
        time_to_minutes(self.event.lunch_end)
    }
}

fn check_resource_names(kind: &str, names: &[String]) -> Result<(), ScheduleError> {
    let mut seen = HashSet::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(ScheduleError::invalid(format!("{} names must not be blank", kind)));
        }
        if !seen.insert(name.as_str()) {
            return Err(ScheduleError::invalid(format!("{} '{}' is listed twice", kind, name)));
        }
    }
    Ok(())
}

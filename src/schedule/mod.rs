pub mod types;
pub mod slot_utils;
pub mod judging;
pub mod robot_game;
pub mod materialize;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use crate::error::ScheduleError;
use crate::request::{ScheduleRequest, SeedPolicy};

pub use types::{MatchKind, ScheduleResult, TeamSchedule, WorkingTeam};
pub use slot_utils::{minutes_to_time_string, parse_time_to_minutes, TimeWindow};
pub use judging::assign_judging;
pub use robot_game::{assign_robot_games, SlotRules};
pub use materialize::materialize;

/// Builds the complete schedule for one request.
///
/// Validates the request, shuffles the teams with the request's seed, assigns
/// judging, then robot-game matches, and flattens the result. Either every team
/// gets judging and all four matches, or an error is returned.
pub fn compute_schedule(request: &ScheduleRequest) -> Result<ScheduleResult, ScheduleError> {
    if let Err(err) = request.validate() {
        warn!("rejected schedule request '{}': {}", request.name, err);
        return Err(err);
    }

    let mut rng = match request.seed {
        SeedPolicy::Fixed(seed) => ChaCha8Rng::seed_from_u64(seed),
        SeedPolicy::Entropy => ChaCha8Rng::from_entropy(),
    };

    let mut teams: Vec<WorkingTeam> = request.teams.iter().map(WorkingTeam::new).collect();
    teams.shuffle(&mut rng);

    let lunch = TimeWindow::new(request.lunch_start_minutes(), request.lunch_end_minutes());
    let judging_rounds = assign_judging(&mut teams, &request.judging, &lunch)?;

    let rules = SlotRules::new(&request.robot_game, &request.judging, lunch);
    let game_rounds = assign_robot_games(&mut teams, &request.robot_game, &rules, &mut rng)?;

    if let Some(team) = teams.iter().find(|t| !t.is_fully_scheduled()) {
        return Err(ScheduleError::invariant(format!(
            "team {} finished scheduling with a partial schedule",
            team.number
        )));
    }

    let result = materialize(&teams)?;
    info!(
        "scheduled {} teams: {} judging slots across {} pods, {} robot game slots across {} tables",
        result.teams.len(),
        judging_rounds,
        request.judging.pods.len(),
        game_rounds,
        request.robot_game.tables.len()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{EventConfig, JudgingConfig, RobotGameConfig, TeamEntry};
    use chrono::NaiveTime;

    fn time(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn minimal_request() -> ScheduleRequest {
        ScheduleRequest {
            name: "Minimal".to_string(),
            event: EventConfig {
                registration_time: Some(time(8, 0)),
                coaches_meeting_time: None,
                opening_ceremony_time: None,
                lunch_start: time(21, 0),
                lunch_end: time(21, 30),
            },
            judging: JudgingConfig {
                pods: vec!["Pod 1".to_string()],
                start_time: time(9, 0),
                cycle_time_minutes: 10,
                buffer_minutes: 10,
            },
            robot_game: RobotGameConfig {
                tables: vec!["Table 1".to_string(), "Table 2".to_string()],
                start_time: time(9, 0),
                cycle_time_minutes: 10,
                buffer_minutes: 10,
                break_times: vec![],
                break_duration_minutes: 0,
            },
            teams: (1..=6).map(|n| TeamEntry::new(n, format!("Team {}", n))).collect(),
            seed: SeedPolicy::Fixed(0),
        }
    }

    #[test]
    fn test_minimal_schedule_judging_slots() {
        let result = compute_schedule(&minimal_request()).unwrap();
        assert_eq!(result.teams.len(), 6);

        let mut judging: Vec<String> = result
            .teams
            .iter()
            .map(|t| {
                assert_eq!(t.judging_pod, "Pod 1");
                t.judging_start.format("%H:%M").to_string()
            })
            .collect();
        judging.sort();
        assert_eq!(judging, vec!["09:00", "09:10", "09:20", "09:30", "09:40", "09:50"]);
    }

    #[test]
    fn test_invalid_request_never_reaches_assigners() {
        let mut request = minimal_request();
        request.robot_game.tables.pop();
        assert!(compute_schedule(&request).unwrap_err().is_input_error());
    }

    #[test]
    fn test_entropy_seed_still_completes() {
        let mut request = minimal_request();
        request.seed = SeedPolicy::Entropy;
        assert_eq!(compute_schedule(&request).unwrap().teams.len(), 6);
    }
}

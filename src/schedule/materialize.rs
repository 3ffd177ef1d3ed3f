use chrono::NaiveTime;

use crate::error::ScheduleError;
use super::slot_utils::minutes_to_time;
use super::types::{MatchKind, RobotGameMatch, ScheduleResult, TeamSchedule, WorkingTeam};

/// Flattens the working teams into output records, ordered by team number.
///
/// Fails if any team is missing its judging session or one of its matches;
/// a partial schedule is never returned.
pub fn materialize(teams: &[WorkingTeam]) -> Result<ScheduleResult, ScheduleError> {
    let mut schedules = teams
        .iter()
        .map(team_schedule)
        .collect::<Result<Vec<_>, _>>()?;
    schedules.sort_by_key(|s| s.number);
    Ok(ScheduleResult { teams: schedules })
}

fn team_schedule(team: &WorkingTeam) -> Result<TeamSchedule, ScheduleError> {
    let judging = team.judging.as_ref().ok_or_else(|| {
        ScheduleError::invariant(format!("team {} was never assigned judging", team.number))
    })?;

    let [practice, match1, match2, match3] = &team.matches;
    let (practice_start, practice_table) = booked(team, MatchKind::Practice, practice)?;
    let (match1_start, match1_table) = booked(team, MatchKind::Match1, match1)?;
    let (match2_start, match2_table) = booked(team, MatchKind::Match2, match2)?;
    let (match3_start, match3_table) = booked(team, MatchKind::Match3, match3)?;

    Ok(TeamSchedule {
        number: team.number,
        name: team.name.clone(),
        judging_start: clock(judging.start, team.number)?,
        judging_pod: judging.pod.clone(),
        practice_start,
        practice_table,
        match1_start,
        match1_table,
        match2_start,
        match2_table,
        match3_start,
        match3_table,
    })
}

fn booked(
    team: &WorkingTeam,
    kind: MatchKind,
    game: &RobotGameMatch,
) -> Result<(NaiveTime, String), ScheduleError> {
    let assignment = game.assignment.as_ref().ok_or_else(|| {
        ScheduleError::invariant(format!(
            "team {} has no slot for {}",
            team.number,
            kind.display_name()
        ))
    })?;
    Ok((clock(assignment.start, team.number)?, assignment.table.clone()))
}

fn clock(minutes: u32, team: u32) -> Result<NaiveTime, ScheduleError> {
    minutes_to_time(minutes).ok_or_else(|| {
        ScheduleError::invariant(format!("team {} was scheduled past midnight", team))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::TeamEntry;
    use crate::schedule::slot_utils::format_time;
    use crate::schedule::types::JudgingAssignment;

    fn scheduled_team(number: u32) -> WorkingTeam {
        let mut team = WorkingTeam::new(&TeamEntry::new(number, format!("Team {}", number)));
        team.judging = Some(JudgingAssignment {
            start: 540,
            pod: "Blue".to_string(),
        });
        for (i, table) in ["A", "B", "A", "B"].iter().enumerate() {
            team.assign_next_match(600 + 30 * i as u32, table, i % 2);
        }
        team
    }

    #[test]
    fn test_flattens_matches_positionally() {
        let result = materialize(&[scheduled_team(42)]).unwrap();
        let team = &result.teams[0];

        assert_eq!(team.number, 42);
        assert_eq!(format_time(team.judging_start), "09:00");
        assert_eq!(team.judging_pod, "Blue");
        assert_eq!(format_time(team.practice_start), "10:00");
        assert_eq!(team.practice_table, "A");
        assert_eq!(format_time(team.match1_start), "10:30");
        assert_eq!(team.match1_table, "B");
        assert_eq!(format_time(team.match3_start), "11:30");
        assert_eq!(team.match3_table, "B");
    }

    #[test]
    fn test_output_sorted_by_team_number() {
        let result = materialize(&[scheduled_team(30), scheduled_team(4), scheduled_team(17)]).unwrap();
        let numbers: Vec<u32> = result.teams.iter().map(|t| t.number).collect();
        assert_eq!(numbers, vec![4, 17, 30]);
    }

    #[test]
    fn test_partial_schedule_is_rejected() {
        let mut team = scheduled_team(1);
        team.matches[2].assignment = None;
        let err = materialize(&[team]).unwrap_err();
        assert!(matches!(err, ScheduleError::AlgorithmInvariantViolation(_)));

        let mut team = scheduled_team(2);
        team.judging = None;
        assert!(materialize(&[team]).is_err());
    }
}

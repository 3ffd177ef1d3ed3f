use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::error::ScheduleError;
use crate::request::{JudgingConfig, RobotGameConfig};
use super::slot_utils::{
    minutes_to_time_string, skip_window, time_to_minutes, TimeWindow, DAY_MINUTES,
};
use super::types::WorkingTeam;

/// Timing rules that decide whether a team may play at a given slot and where the next slot falls.
#[derive(Debug, Clone)]
pub struct SlotRules {
    pub game_cycle: u32,
    pub game_buffer: u32,
    pub judging_cycle: u32,
    pub judging_buffer: u32,
    pub lunch: TimeWindow,
    pub breaks: Vec<TimeWindow>,
}

impl SlotRules {
    pub fn new(game: &RobotGameConfig, judging: &JudgingConfig, lunch: TimeWindow) -> Self {
        let breaks = game
            .break_times
            .iter()
            .map(|&b| TimeWindow::starting_at(time_to_minutes(b), game.break_duration_minutes))
            .collect();
        Self {
            game_cycle: game.cycle_time_minutes,
            game_buffer: game.buffer_minutes,
            judging_cycle: judging.cycle_time_minutes,
            judging_buffer: judging.buffer_minutes,
            lunch,
            breaks,
        }
    }

    /// True when `team` still has a match to play and a match at `slot` would
    /// keep clear of its judging session and its other matches.
    pub fn can_play(&self, team: &WorkingTeam, slot: u32) -> bool {
        if team.next_unassigned().is_none() {
            return false;
        }
        let game = TimeWindow::starting_at(slot, self.game_cycle);

        // the match plus the larger buffer must finish before judging starts,
        // and judging plus its buffer must finish before the match starts
        if let Some(judging) = team.judging_window(self.judging_cycle) {
            let lead = self.judging_buffer.max(self.game_buffer);
            if game
                .padded(0, lead)
                .overlaps(&judging.padded(0, self.judging_buffer))
            {
                return false;
            }
        }

        !team
            .match_windows(self.game_cycle)
            .any(|booked| game.overlaps(&booked.padded(self.game_buffer, self.game_buffer)))
    }

    /// Moves `slot` past lunch and breaks until a full match fits before the next window.
    pub fn next_slot(&self, mut slot: u32) -> u32 {
        loop {
            let mut moved = false;
            if let Some(after_lunch) = skip_window(slot, self.game_cycle, &self.lunch) {
                debug!(
                    "robot game slot {} overlaps lunch, moving to {}",
                    minutes_to_time_string(slot),
                    minutes_to_time_string(after_lunch)
                );
                slot = after_lunch;
                moved = true;
            }
            for window in &self.breaks {
                if let Some(after_break) = skip_window(slot, self.game_cycle, window) {
                    debug!(
                        "robot game slot {} overlaps break at {}, moving to {}",
                        minutes_to_time_string(slot),
                        minutes_to_time_string(window.start),
                        minutes_to_time_string(after_break)
                    );
                    slot = after_break;
                    moved = true;
                    break;
                }
            }
            if !moved {
                return slot;
            }
        }
    }
}

/// Assigns the practice match and three scored matches of every team, one slot at a time.
///
/// All tables run in lockstep. At each slot the teams that may play are ordered
/// by how far behind they are (index of their first unassigned match), ties broken
/// by `rng`, and the tables are filled from table 0 upward. Each table prefers a
/// team that has not played at it before and falls back to the next team in
/// order. The table counter starts at 0 again every round.
///
/// Returns the number of slots (rounds) used, including rounds where nobody could play.
pub fn assign_robot_games<R: Rng + ?Sized>(
    teams: &mut [WorkingTeam],
    config: &RobotGameConfig,
    rules: &SlotRules,
    rng: &mut R,
) -> Result<usize, ScheduleError> {
    if config.tables.is_empty() {
        return Err(ScheduleError::invalid("at least one robot game table is required"));
    }

    let mut slot = rules.next_slot(time_to_minutes(config.start_time));
    let mut rounds = 0;

    while teams.iter().any(|t| t.next_unassigned().is_some()) {
        if slot.saturating_add(rules.game_cycle) > DAY_MINUTES {
            let remaining = teams.iter().filter(|t| t.next_unassigned().is_some()).count();
            return Err(ScheduleError::invariant(format!(
                "robot games would run past midnight with {} teams still unscheduled",
                remaining
            )));
        }

        let mut pool: Vec<usize> = (0..teams.len())
            .filter(|&i| rules.can_play(&teams[i], slot))
            .collect();
        pool.shuffle(rng);
        // stable, so the shuffle breaks ties
        pool.sort_by_key(|&i| teams[i].next_unassigned());

        let filled = fill_tables(teams, &pool, &config.tables, slot);
        debug!(
            "slot {}: {} of {} tables filled from {} candidates",
            minutes_to_time_string(slot),
            filled,
            config.tables.len(),
            pool.len()
        );

        rounds += 1;
        slot = rules.next_slot(slot.saturating_add(rules.game_cycle));
    }

    Ok(rounds)
}

/// Gives each table at most one team from `pool` (already in priority order).
fn fill_tables(teams: &mut [WorkingTeam], pool: &[usize], tables: &[String], slot: u32) -> usize {
    let mut taken = vec![false; pool.len()];
    let mut filled = 0;

    for (table_index, table) in tables.iter().enumerate() {
        let fresh = pool
            .iter()
            .enumerate()
            .find(|&(p, &team)| !taken[p] && !teams[team].has_played_table(table_index));
        let candidate = fresh
            .or_else(|| pool.iter().enumerate().find(|&(p, _)| !taken[p]))
            .map(|(p, &team)| (p, team));

        let Some((position, team)) = candidate else {
            break;
        };
        taken[position] = true;
        teams[team].assign_next_match(slot, table, table_index);
        filled += 1;
    }

    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::TeamEntry;
    use crate::schedule::types::JudgingAssignment;
    use chrono::NaiveTime;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn time(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn judged_teams(count: u32, judging_start: u32) -> Vec<WorkingTeam> {
        (1..=count)
            .map(|n| {
                let mut team = WorkingTeam::new(&TeamEntry::new(n, format!("Team {}", n)));
                team.judging = Some(JudgingAssignment {
                    start: judging_start,
                    pod: "Pod 1".to_string(),
                });
                team
            })
            .collect()
    }

    fn game_config(tables: usize, cycle: u32, buffer: u32) -> RobotGameConfig {
        RobotGameConfig {
            tables: (1..=tables).map(|t| format!("Table {}", t)).collect(),
            start_time: time(9, 0),
            cycle_time_minutes: cycle,
            buffer_minutes: buffer,
            break_times: vec![],
            break_duration_minutes: 0,
        }
    }

    fn judging_config(cycle: u32, buffer: u32) -> JudgingConfig {
        JudgingConfig {
            pods: vec!["Pod 1".to_string()],
            start_time: time(9, 0),
            cycle_time_minutes: cycle,
            buffer_minutes: buffer,
        }
    }

    fn no_lunch() -> TimeWindow {
        TimeWindow::new(22 * 60, 22 * 60)
    }

    fn all_starts(teams: &[WorkingTeam]) -> Vec<u32> {
        teams
            .iter()
            .flat_map(|t| t.matches.iter().map(|m| m.assignment.as_ref().unwrap().start))
            .collect()
    }

    #[test]
    fn test_every_match_gets_a_distinct_table_per_slot() {
        let mut teams = judged_teams(6, 20 * 60);
        let game = game_config(2, 10, 10);
        let rules = SlotRules::new(&game, &judging_config(30, 10), no_lunch());
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        assign_robot_games(&mut teams, &game, &rules, &mut rng).unwrap();

        let mut seen = std::collections::HashSet::new();
        for team in &teams {
            for m in &team.matches {
                let a = m.assignment.as_ref().unwrap();
                assert_eq!(game.tables[a.table_index], a.table);
                assert!(seen.insert((a.start, a.table_index)), "table double booked");
            }
        }
        assert_eq!(seen.len(), 24);
    }

    #[test]
    fn test_matches_keep_the_buffer() {
        let mut teams = judged_teams(4, 20 * 60);
        let game = game_config(2, 10, 15);
        let rules = SlotRules::new(&game, &judging_config(30, 10), no_lunch());
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        assign_robot_games(&mut teams, &game, &rules, &mut rng).unwrap();

        for team in &teams {
            let starts: Vec<u32> = team
                .matches
                .iter()
                .map(|m| m.assignment.as_ref().unwrap().start)
                .collect();
            for pair in starts.windows(2) {
                assert!(pair[1] >= pair[0] + 10 + 15, "{:?}", starts);
            }
        }
    }

    #[test]
    fn test_table_prefers_team_new_to_it() {
        let mut teams = judged_teams(2, 20 * 60);
        teams[0].assign_next_match(500, "Table 1", 0);
        let tables = vec!["Table 1".to_string(), "Table 2".to_string()];

        // team 1 leads the pool but has already played table 1
        let filled = fill_tables(&mut teams, &[0, 1], &tables, 540);

        assert_eq!(filled, 2);
        assert_eq!(teams[1].matches[0].assignment.as_ref().unwrap().table_index, 0);
        assert_eq!(teams[0].matches[1].assignment.as_ref().unwrap().table_index, 1);
    }

    #[test]
    fn test_table_falls_back_to_pool_order() {
        let mut teams = judged_teams(2, 20 * 60);
        teams[0].assign_next_match(500, "Table 1", 0);
        teams[1].assign_next_match(500, "Table 2", 1);
        teams[1].assign_next_match(520, "Table 1", 0);
        let tables = vec!["Table 1".to_string(), "Table 2".to_string()];

        let filled = fill_tables(&mut teams, &[0, 1], &tables, 540);

        assert_eq!(filled, 2);
        assert_eq!(teams[0].matches[1].assignment.as_ref().unwrap().table_index, 0);
        assert_eq!(teams[1].matches[2].assignment.as_ref().unwrap().table_index, 1);
    }

    #[test]
    fn test_short_pool_leaves_tables_empty() {
        let mut teams = judged_teams(1, 20 * 60);
        let tables: Vec<String> = (1..=4).map(|t| format!("Table {}", t)).collect();
        assert_eq!(fill_tables(&mut teams, &[0], &tables, 540), 1);
        assert_eq!(fill_tables(&mut teams, &[], &tables, 550), 0);
    }

    #[test]
    fn test_second_match_moves_to_the_other_table() {
        let mut teams = judged_teams(2, 20 * 60);
        let game = game_config(2, 10, 0);
        let rules = SlotRules::new(&game, &judging_config(30, 0), no_lunch());
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        assign_robot_games(&mut teams, &game, &rules, &mut rng).unwrap();

        for team in &teams {
            let practice = team.matches[0].assignment.as_ref().unwrap();
            let first = team.matches[1].assignment.as_ref().unwrap();
            assert_ne!(practice.table_index, first.table_index);
        }
    }

    #[test]
    fn test_team_is_held_back_around_judging() {
        // judging 09:30-10:00, buffers 10 and 5 -> no match may start in (09:10, 10:10)
        let mut teams = judged_teams(1, 9 * 60 + 30);
        let game = game_config(2, 10, 5);
        let rules = SlotRules::new(&game, &judging_config(30, 10), no_lunch());
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        assign_robot_games(&mut teams, &game, &rules, &mut rng).unwrap();

        let starts = all_starts(&teams);
        // 09:00 fits (ends 09:10, 20 minutes before judging); then blocked until 10:10
        assert_eq!(starts, vec![540, 610, 630, 650]);
    }

    #[test]
    fn test_breaks_and_lunch_are_skipped() {
        let mut teams = judged_teams(2, 20 * 60);
        let mut game = game_config(2, 10, 0);
        game.break_times = vec![time(9, 15)];
        game.break_duration_minutes = 10;
        let lunch = TimeWindow::new(9 * 60 + 30, 9 * 60 + 50);
        let rules = SlotRules::new(&game, &judging_config(30, 0), lunch);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        assign_robot_games(&mut teams, &game, &rules, &mut rng).unwrap();

        // 09:00, 09:10 would end in the break -> 09:25, which runs into lunch -> 09:50
        let mut starts = all_starts(&teams);
        starts.sort();
        starts.dedup();
        assert_eq!(starts, vec![540, 590, 600, 610]);
    }

    #[test]
    fn test_next_slot_is_stable_outside_windows() {
        let game = game_config(2, 10, 0);
        let rules = SlotRules::new(&game, &judging_config(30, 0), TimeWindow::new(720, 750));
        assert_eq!(rules.next_slot(700), 700);
        assert_eq!(rules.next_slot(715), 750);
        assert_eq!(rules.next_slot(750), 750);
    }

    #[test]
    fn test_same_seed_same_assignment() {
        let game = game_config(4, 8, 10);
        let rules = SlotRules::new(&game, &judging_config(30, 10), no_lunch());

        let mut first = judged_teams(10, 20 * 60);
        let mut second = first.clone();
        assign_robot_games(&mut first, &game, &rules, &mut ChaCha8Rng::seed_from_u64(5)).unwrap();
        assign_robot_games(&mut second, &game, &rules, &mut ChaCha8Rng::seed_from_u64(5)).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_day_overflow_is_reported() {
        let mut teams = judged_teams(4, 8 * 60);
        let mut game = game_config(2, 30, 30);
        game.start_time = time(21, 0);
        let rules = SlotRules::new(&game, &judging_config(30, 10), no_lunch());
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let err = assign_robot_games(&mut teams, &game, &rules, &mut rng).unwrap_err();
        assert!(matches!(err, ScheduleError::AlgorithmInvariantViolation(_)));
    }
}

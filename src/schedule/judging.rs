use tracing::debug;

use crate::error::ScheduleError;
use crate::request::JudgingConfig;
use super::slot_utils::{
    minutes_to_time_string, skip_window, time_to_minutes, TimeWindow, DAY_MINUTES,
};
use super::types::{JudgingAssignment, WorkingTeam};

/// Assigns every team a judging slot and pod, round-robin across pods.
///
/// Teams are taken in the order given. All pods run in lockstep: once every pod
/// has a team for the current slot, the slot advances one cycle. A round that
/// would touch the lunch window is moved to the end of lunch. The last round may
/// be only partly filled.
///
/// Returns the number of distinct judging slots used.
pub fn assign_judging(
    teams: &mut [WorkingTeam],
    config: &JudgingConfig,
    lunch: &TimeWindow,
) -> Result<usize, ScheduleError> {
    if config.pods.is_empty() {
        return Err(ScheduleError::invalid("at least one judging pod is required"));
    }

    let cycle = config.cycle_time_minutes;
    let mut slot = next_judging_slot(time_to_minutes(config.start_time), cycle, lunch);
    let mut pod_counter = 0;
    let mut rounds = 0;

    for team in teams.iter_mut() {
        if slot.saturating_add(cycle) > DAY_MINUTES {
            return Err(ScheduleError::invariant(format!(
                "judging for team {} would run past midnight",
                team.number
            )));
        }
        if pod_counter == 0 {
            rounds += 1;
        }

        team.judging = Some(JudgingAssignment {
            start: slot,
            pod: config.pods[pod_counter].clone(),
        });

        // a full round across all pods moves judging to the next slot
        pod_counter = (pod_counter + 1) % config.pods.len();
        if pod_counter == 0 {
            slot = next_judging_slot(slot.saturating_add(cycle), cycle, lunch);
        }
    }

    Ok(rounds)
}

fn next_judging_slot(slot: u32, cycle: u32, lunch: &TimeWindow) -> u32 {
    match skip_window(slot, cycle, lunch) {
        Some(after_lunch) => {
            debug!(
                "judging slot {} overlaps lunch, moving to {}",
                minutes_to_time_string(slot),
                minutes_to_time_string(after_lunch)
            );
            after_lunch
        }
        None => slot,
    }
}

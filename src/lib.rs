//! Tournament scheduler: assigns every team a judging session and four
//! robot-game matches (practice plus three scored) without double-booking,
//! keeping buffers between a team's activities and avoiding lunch and breaks.

pub mod error;
pub mod request;
pub mod schedule;
pub mod pivots;
pub mod parser;
pub mod export;
pub mod display;
pub mod web;

pub use error::ScheduleError;
pub use request::{ScheduleRequest, SeedPolicy, TeamEntry};
pub use schedule::{compute_schedule, ScheduleResult, TeamSchedule};

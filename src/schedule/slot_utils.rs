use chrono::{NaiveTime, Timelike};

/// Minutes in one event day. Every slot the assigners produce must end by then.
pub const DAY_MINUTES: u32 = 24 * 60;

/// Half-open window `[start, end)` in minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: u32,
    pub end: u32,
}

impl TimeWindow {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Window that starts at `start` and lasts `minutes`.
    pub fn starting_at(start: u32, minutes: u32) -> Self {
        Self::new(start, start.saturating_add(minutes))
    }

    /// Is `time` within `[start, end)`
    pub fn contains(&self, time: u32) -> bool {
        is_between(time, self.start, self.end)
    }

    /// True when the two windows share at least one minute.
    /// Empty windows never overlap anything.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < self.end
            && other.start < other.end
            && self.start < other.end
            && other.start < self.end
    }

    /// Extends the window by `before` minutes on the start side (clamped at midnight)
    /// and `after` minutes on the end side.
    pub fn padded(&self, before: u32, after: u32) -> Self {
        Self::new(self.start.saturating_sub(before), self.end.saturating_add(after))
    }

    pub fn duration(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }
}

/// If a session of `cycle_minutes` starting at `slot` would touch `window`,
/// returns the end of the window as the new slot.
pub fn skip_window(slot: u32, cycle_minutes: u32, window: &TimeWindow) -> Option<u32> {
    if TimeWindow::starting_at(slot, cycle_minutes).overlaps(window) {
        Some(window.end)
    } else {
        None
    }
}

/// Is `time` within `[start, end)`
pub fn is_between(time: u32, start: u32, end: u32) -> bool {
    start <= time && time < end
}

/// Parses a time string (HH:MM, optionally HH:MM:SS) to minutes since midnight.
/// Seconds are accepted and dropped.
pub fn parse_time_to_minutes(time_str: &str) -> Option<u32> {
    let parts: Vec<&str> = time_str.trim().split(':').collect();
    if parts.len() != 2 && parts.len() != 3 {
        return None;
    }
    let hours: u32 = parts[0].trim().parse().ok()?;
    let minutes: u32 = parts[1].trim().parse().ok()?;
    if parts.len() == 3 {
        let seconds: u32 = parts[2].trim().parse().ok()?;
        if seconds >= 60 {
            return None;
        }
    }
    if hours >= 24 || minutes >= 60 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Formats minutes since midnight to time string (HH:MM)
pub fn minutes_to_time_string(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    format!("{:02}:{:02}", hours % 24, mins)
}

pub fn time_to_minutes(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// `None` once `minutes` reaches midnight.
pub fn minutes_to_time(minutes: u32) -> Option<NaiveTime> {
    if minutes >= DAY_MINUTES {
        return None;
    }
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
}

pub fn parse_time(time_str: &str) -> Option<NaiveTime> {
    parse_time_to_minutes(time_str).and_then(minutes_to_time)
}

pub fn format_time(time: NaiveTime) -> String {
    minutes_to_time_string(time_to_minutes(time))
}

/// Serde adapter for `NaiveTime` as `"HH:MM"`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_time(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid time '{}', expected HH:MM", raw)))
    }
}

pub mod hhmm_option {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        time: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match time {
            Some(time) => serializer.serialize_some(&super::format_time(*time)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => super::parse_time(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid time '{}', expected HH:MM", raw))),
            None => Ok(None),
        }
    }
}

pub mod hhmm_list {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(times: &[NaiveTime], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(times.iter().map(|t| super::format_time(*t)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<NaiveTime>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|raw| {
                super::parse_time(raw)
                    .ok_or_else(|| D::Error::custom(format!("invalid time '{}', expected HH:MM", raw)))
            })
            .collect()
    }
}

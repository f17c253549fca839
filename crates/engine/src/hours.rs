//! Operating-hours and operating-days expressions.
//!
//! Candidate data arrives with loosely formatted expressions
//! (`"09:00-17:30"`, `"09:00-12:00, 14:00-18:00"`, `"24 hours"`,
//! `"Tue-Sun"`, `"Sat,Sun"`). Parsing is lenient: an empty or
//! unrecognizable expression means the venue never told us, and such
//! candidates are treated as always covering rather than silently
//! dropped. Overnight ranges (`"22:00-02:00"`) split at midnight.
//!
//! A candidate *covers* a slot when its open interval overlaps the slot's
//! canonical window and it is open on the slot's weekday.

use chrono::{NaiveTime, Weekday};
use tracing::debug;
use tripweaver_core::place::{Activity, ProvisionedItem};
use tripweaver_core::slot::TimeWindow;

/// Parsed operating-hours expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoursExpr {
    /// Unspecified or explicitly round-the-clock.
    Always,
    Ranges(Vec<TimeWindow>),
}

impl HoursExpr {
    /// Whether the open interval overlaps the window by at least a minute.
    pub fn covers(&self, window: &TimeWindow) -> bool {
        match self {
            HoursExpr::Always => true,
            HoursExpr::Ranges(ranges) => ranges.iter().any(|r| r.overlaps(window)),
        }
    }
}

/// Parsed operating-days expression. Weekday index 0 = Monday.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaysExpr {
    Daily,
    Days([bool; 7]),
}

impl DaysExpr {
    pub fn includes(&self, weekday: Weekday) -> bool {
        match self {
            DaysExpr::Daily => true,
            DaysExpr::Days(days) => days[weekday.num_days_from_monday() as usize],
        }
    }
}

/// Parse an operating-hours expression. Unrecognizable input falls back to
/// `Always` — unspecified hours never disqualify a candidate.
pub fn parse_hours(expr: &str) -> HoursExpr {
    let trimmed = expr.trim();
    if trimmed.is_empty() {
        return HoursExpr::Always;
    }
    let lowered = trimmed.to_ascii_lowercase();
    if lowered.contains("24 hours") || lowered == "24h" || lowered == "always open" {
        return HoursExpr::Always;
    }

    let mut ranges = Vec::new();
    for segment in trimmed.split(',') {
        match parse_range(segment) {
            Some(mut parsed) => ranges.append(&mut parsed),
            None => {
                debug!(segment = segment.trim(), "unparseable hours segment ignored");
            }
        }
    }

    if ranges.is_empty() {
        debug!(expr = trimmed, "hours expression unparseable, treating as always open");
        HoursExpr::Always
    } else {
        HoursExpr::Ranges(ranges)
    }
}

/// Parse one `"HH:MM-HH:MM"` segment; overnight ranges split at midnight.
fn parse_range(segment: &str) -> Option<Vec<TimeWindow>> {
    let (start_raw, end_raw) = segment.trim().split_once('-')?;
    let start = parse_clock(start_raw)?;
    let end = parse_clock(end_raw)?;

    if end >= start {
        Some(vec![TimeWindow::new(start, end)])
    } else {
        let midnight_end = NaiveTime::from_hms_opt(23, 59, 0)?;
        let midnight_start = NaiveTime::from_hms_opt(0, 0, 0)?;
        Some(vec![
            TimeWindow::new(start, midnight_end),
            TimeWindow::new(midnight_start, end),
        ])
    }
}

/// Parse `"HH:MM"` or a bare `"HH"`.
fn parse_clock(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    let (hour_raw, minute_raw) = match raw.split_once(':') {
        Some((h, m)) => (h, m),
        None => (raw, "0"),
    };
    let hour: u32 = hour_raw.trim().parse().ok()?;
    let minute: u32 = minute_raw.trim().parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Parse an operating-days expression. Supports `"daily"`, single days,
/// comma lists, and ranges (cyclic, so `"Sat-Mon"` works). Unrecognizable
/// input falls back to `Daily`.
pub fn parse_days(expr: &str) -> DaysExpr {
    let trimmed = expr.trim();
    if trimmed.is_empty() {
        return DaysExpr::Daily;
    }
    let lowered = trimmed.to_ascii_lowercase();
    if matches!(lowered.as_str(), "daily" | "everyday" | "every day" | "all") {
        return DaysExpr::Daily;
    }

    let mut days = [false; 7];
    let mut recognized = false;
    for part in lowered.split(',') {
        let part = part.trim();
        if let Some((from_raw, to_raw)) = part.split_once('-') {
            if let (Some(from), Some(to)) = (parse_day(from_raw), parse_day(to_raw)) {
                recognized = true;
                let mut index = from;
                loop {
                    days[index] = true;
                    if index == to {
                        break;
                    }
                    index = (index + 1) % 7;
                }
            } else {
                debug!(part, "unparseable day range ignored");
            }
        } else if let Some(index) = parse_day(part) {
            recognized = true;
            days[index] = true;
        } else {
            debug!(part, "unparseable day token ignored");
        }
    }

    if recognized {
        DaysExpr::Days(days)
    } else {
        debug!(expr = trimmed, "days expression unparseable, treating as daily");
        DaysExpr::Daily
    }
}

/// Map a day token to its Monday-based index.
fn parse_day(token: &str) -> Option<usize> {
    let token = token.trim();
    let prefix: String = token.chars().take(3).collect();
    match prefix.as_str() {
        "mon" => Some(0),
        "tue" => Some(1),
        "wed" => Some(2),
        "thu" => Some(3),
        "fri" => Some(4),
        "sat" => Some(5),
        "sun" => Some(6),
        _ => None,
    }
}

/// Whether an activity is open during the slot window on the given weekday.
pub fn activity_covers(activity: &Activity, weekday: Weekday, window: &TimeWindow) -> bool {
    parse_days(&activity.days).includes(weekday) && parse_hours(&activity.hours).covers(window)
}

/// Whether a provisioned item's per-weekday hours cover the meal window.
///
/// A day with no ranges is closed — unless the whole table is empty,
/// which means hours were never specified.
pub fn item_covers(item: &ProvisionedItem, weekday: Weekday, window: &TimeWindow) -> bool {
    if item.weekday_hours.is_empty() {
        return true;
    }
    item.weekday_hours
        .for_weekday(weekday)
        .iter()
        .filter_map(|range| parse_range(range))
        .flatten()
        .any(|r| r.overlaps(window))
}

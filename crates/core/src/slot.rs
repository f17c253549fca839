//! The fixed slot grid an itinerary is generated into.
//!
//! Every itinerary covers [`DAY_COUNT`] days. Each day has three session
//! slots (morning, afternoon, night) filled with activities and three meal
//! slots (breakfast, lunch, dinner) filled with provisioned items — 18 slots
//! total. Each slot kind owns a canonical local-clock time window used to
//! decide whether a candidate's operating hours cover the slot.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Number of days in a generated itinerary. Day indices run 1..=DAY_COUNT.
pub const DAY_COUNT: u8 = 3;

/// An activity session within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Morning,
    Afternoon,
    Night,
}

impl SessionKind {
    /// All sessions in within-day assignment order.
    pub const ALL: [SessionKind; 3] = [
        SessionKind::Morning,
        SessionKind::Afternoon,
        SessionKind::Night,
    ];

    /// The canonical local-clock window for this session.
    pub fn window(self) -> TimeWindow {
        match self {
            SessionKind::Morning => TimeWindow::new(hm(7, 0), hm(11, 59)),
            SessionKind::Afternoon => TimeWindow::new(hm(12, 0), hm(17, 59)),
            SessionKind::Night => TimeWindow::new(hm(18, 0), hm(23, 59)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionKind::Morning => "morning",
            SessionKind::Afternoon => "afternoon",
            SessionKind::Night => "night",
        }
    }
}

/// A meal within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealKind {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealKind {
    /// All meals in within-day assignment order.
    pub const ALL: [MealKind; 3] = [MealKind::Breakfast, MealKind::Lunch, MealKind::Dinner];

    /// The canonical local-clock window for this meal.
    pub fn window(self) -> TimeWindow {
        match self {
            MealKind::Breakfast => TimeWindow::new(hm(6, 0), hm(11, 29)),
            MealKind::Lunch => TimeWindow::new(hm(11, 30), hm(17, 29)),
            MealKind::Dinner => TimeWindow::new(hm(17, 30), hm(23, 59)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MealKind::Breakfast => "breakfast",
            MealKind::Lunch => "lunch",
            MealKind::Dinner => "dinner",
        }
    }
}

/// Either kind of slot within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum SlotKind {
    Session(SessionKind),
    Meal(MealKind),
}

/// Addresses one of the 18 slots of an itinerary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    /// Day index, 1-based.
    pub day: u8,
    pub kind: SlotKind,
}

impl SlotKey {
    pub fn session(day: u8, kind: SessionKind) -> Self {
        Self {
            day,
            kind: SlotKind::Session(kind),
        }
    }

    pub fn meal(day: u8, kind: MealKind) -> Self {
        Self {
            day,
            kind: SlotKind::Meal(kind),
        }
    }

    /// The slot's canonical time window.
    pub fn window(&self) -> TimeWindow {
        match self.kind {
            SlotKind::Session(s) => s.window(),
            SlotKind::Meal(m) => m.window(),
        }
    }
}

impl std::fmt::Display for SlotKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            SlotKind::Session(s) => s.as_str(),
            SlotKind::Meal(m) => m.as_str(),
        };
        write!(f, "day {} {}", self.day, kind)
    }
}

/// A half-day local-clock window, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Whether two windows share at least one minute.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Whether a clock time falls inside this window.
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time <= self.end
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid clock time")
}

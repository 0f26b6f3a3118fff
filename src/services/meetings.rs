use chrono::NaiveTime;

use crate::models::{MeetingWindow, TimePreference};

/// Part of day a section meets in, derived from its start time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPart {
    Morning,
    Afternoon,
    Evening,
    /// Meeting time could not be parsed from the registry
    Unknown,
}

/// Boundary times between the day parts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayPartBounds {
    /// Start times strictly before this are morning
    pub morning_end: NaiveTime,
    /// Start times strictly before this (and not morning) are afternoon
    pub afternoon_end: NaiveTime,
}

impl Default for DayPartBounds {
    fn default() -> Self {
        Self {
            morning_end: NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default(),
            afternoon_end: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default(),
        }
    }
}

/// Classifies a meeting window by its start time.
pub fn classify(meeting: Option<&MeetingWindow>, bounds: &DayPartBounds) -> DayPart {
    let Some(window) = meeting else {
        return DayPart::Unknown;
    };
    if window.start < bounds.morning_end {
        DayPart::Morning
    } else if window.start < bounds.afternoon_end {
        DayPart::Afternoon
    } else {
        DayPart::Evening
    }
}

/// Whether a day part satisfies a student's preference.
///
/// `Any` accepts everything, including sections with unknown times. A
/// specific preference only accepts sections known to meet in that window,
/// so unknown-time sections are excluded rather than guessed at.
pub fn matches_preference(part: DayPart, preference: TimePreference) -> bool {
    match preference {
        TimePreference::Any => true,
        TimePreference::Morning => part == DayPart::Morning,
        TimePreference::Afternoon => part == DayPart::Afternoon,
        TimePreference::Evening => part == DayPart::Evening,
    }
}

/// Whether two meeting windows collide.
///
/// A conflict requires a shared weekday and overlapping half-open
/// [start, end) intervals. A window that failed to parse never conflicts.
pub fn overlaps(a: Option<&MeetingWindow>, b: Option<&MeetingWindow>) -> bool {
    let (Some(a), Some(b)) = (a, b) else {
        return false;
    };
    let shares_day = a.days.iter().any(|day| b.days.contains(day));
    if !shares_day {
        return false;
    }
    a.start < b.end && b.start < a.end
}

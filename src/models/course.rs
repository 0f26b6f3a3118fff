use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use super::Term;

pub type CourseId = i64;
pub type SectionId = i64;

/// Catalog category of a course
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CourseCategory {
    Core,
    Track,
    GenEd,
    Foundation,
    Elective,
}

impl fmt::Display for CourseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CourseCategory::Core => "Core",
            CourseCategory::Track => "Track",
            CourseCategory::GenEd => "Gen-Ed",
            CourseCategory::Foundation => "Foundation",
            CourseCategory::Elective => "Elective",
        };
        write!(f, "{}", label)
    }
}

impl FromStr for CourseCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "core" => Ok(CourseCategory::Core),
            "track" => Ok(CourseCategory::Track),
            "gen_ed" | "gened" | "general_education" => Ok(CourseCategory::GenEd),
            "foundation" => Ok(CourseCategory::Foundation),
            "elective" => Ok(CourseCategory::Elective),
            other => Err(format!("unknown course category: {}", other)),
        }
    }
}

/// A catalog course with its prerequisite course ids
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Course {
    pub id: CourseId,
    /// Catalog code, e.g. "CS102"
    pub code: String,
    pub name: String,
    pub category: CourseCategory,
    pub credits: i32,
    /// Ids of courses that must be completed before enrolling
    pub prerequisites: Vec<CourseId>,
}

/// Weekly meeting pattern of a section, parsed from registry strings
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingWindow {
    pub days: Vec<Weekday>,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl MeetingWindow {
    /// Parses a meeting pattern from its stored string fields.
    ///
    /// Returns `None` when any piece fails to parse or the window is empty;
    /// such sections are treated as meeting at an unknown time.
    pub fn parse(days: &str, start: &str, end: &str) -> Option<Self> {
        let mut parsed_days = Vec::new();
        for token in days.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            let day = Weekday::from_str(token).ok()?;
            if !parsed_days.contains(&day) {
                parsed_days.push(day);
            }
        }
        if parsed_days.is_empty() {
            return None;
        }

        let start = parse_time(start)?;
        let end = parse_time(end)?;
        if start >= end {
            return None;
        }

        Some(Self {
            days: parsed_days,
            start,
            end,
        })
    }

    /// Human-readable label like "Mon,Wed 09:00-10:30".
    pub fn label(&self) -> String {
        let days = self
            .days
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{} {}-{}",
            days,
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

/// A scheduled offering of a course in a specific term
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: SectionId,
    pub course_id: CourseId,
    pub term: Term,
    pub capacity: i32,
    /// `None` when the registry's time strings could not be parsed
    pub meeting: Option<MeetingWindow>,
}

impl Section {
    /// Label shown to students; "TBA" when the meeting time is unknown.
    pub fn meeting_label(&self) -> String {
        match &self.meeting {
            Some(window) => window.label(),
            None => "TBA".to_string(),
        }
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub type StudentId = i64;

/// Preferred part of day for class meetings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimePreference {
    #[serde(alias = "Morning", alias = "MORNING")]
    Morning,
    #[serde(alias = "Afternoon", alias = "AFTERNOON")]
    Afternoon,
    #[serde(alias = "Evening", alias = "EVENING")]
    Evening,
    #[default]
    #[serde(alias = "Any", alias = "ANY")]
    Any,
}

impl fmt::Display for TimePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TimePreference::Morning => "morning",
            TimePreference::Afternoon => "afternoon",
            TimePreference::Evening => "evening",
            TimePreference::Any => "any",
        };
        write!(f, "{}", label)
    }
}

impl FromStr for TimePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "morning" => Ok(TimePreference::Morning),
            "afternoon" => Ok(TimePreference::Afternoon),
            "evening" => Ok(TimePreference::Evening),
            "any" | "" => Ok(TimePreference::Any),
            other => Err(format!("unknown time preference: {}", other)),
        }
    }
}

/// Academic standing derived from accumulated credits.
///
/// Informational only: standing is reported alongside recommendations but
/// never drives which template semester is resolved.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Standing {
    Freshman,
    Sophomore,
    Junior,
    Senior,
}

impl Standing {
    /// Maps completed credits onto a standing band. Boundaries are
    /// inclusive on the lower side: 30 credits is already a sophomore.
    pub fn from_credits(credits: u32) -> Self {
        match credits {
            0..=29 => Standing::Freshman,
            30..=59 => Standing::Sophomore,
            60..=89 => Standing::Junior,
            _ => Standing::Senior,
        }
    }
}

impl fmt::Display for Standing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Standing::Freshman => "Freshman",
            Standing::Sophomore => "Sophomore",
            Standing::Junior => "Junior",
            Standing::Senior => "Senior",
        };
        write!(f, "{}", label)
    }
}

/// A student as loaded from the registry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    /// Degree program code, e.g. "BSDS"
    pub program: String,
    /// Accumulated completed credits; missing in the registry counts as zero
    pub credits: Option<i32>,
    /// How many template semesters the student has already been through
    pub semesters_completed: u32,
    /// Stored scheduling preference, if the student has declared one
    pub preferred_time: Option<TimePreference>,
}

impl Student {
    /// Standing band for this student, treating missing or negative
    /// credit totals as zero.
    pub fn standing(&self) -> Standing {
        let credits = self.credits.unwrap_or(0).max(0) as u32;
        Standing::from_credits(credits)
    }
}

/// Status of a student's enrollment in a course
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    Completed,
    InProgress,
}

impl FromStr for CompletionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "completed" | "complete" | "passed" => Ok(CompletionStatus::Completed),
            "in_progress" | "in progress" | "enrolled" => Ok(CompletionStatus::InProgress),
            other => Err(format!("unknown completion status: {}", other)),
        }
    }
}

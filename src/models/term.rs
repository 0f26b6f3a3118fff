use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Semester within an academic year
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Semester {
    #[serde(alias = "Fall", alias = "FALL")]
    Fall,
    #[serde(alias = "Spring", alias = "SPRING")]
    Spring,
    #[serde(alias = "Summer", alias = "SUMMER")]
    Summer,
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Semester::Fall => "Fall",
            Semester::Spring => "Spring",
            Semester::Summer => "Summer",
        };
        write!(f, "{}", label)
    }
}

impl FromStr for Semester {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fall" => Ok(Semester::Fall),
            "spring" => Ok(Semester::Spring),
            "summer" => Ok(Semester::Summer),
            other => Err(format!("unknown semester: {}", other)),
        }
    }
}

/// A concrete academic term, e.g. Fall 2026
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Term {
    pub semester: Semester,
    pub year: i32,
}

impl Term {
    pub fn new(semester: Semester, year: i32) -> Self {
        Self { semester, year }
    }

    /// The term that follows this one in the academic calendar.
    ///
    /// Fall rolls over into Spring of the next calendar year; Spring and
    /// Summer both lead into Fall of the same year. Summer is never produced
    /// as a default target because it is an optional session.
    pub fn following(&self) -> Term {
        match self.semester {
            Semester::Fall => Term::new(Semester::Spring, self.year + 1),
            Semester::Spring => Term::new(Semester::Fall, self.year),
            Semester::Summer => Term::new(Semester::Fall, self.year),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.semester, self.year)
    }
}

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CourseCategory, CourseId, SectionId, StudentId, Term, TimePreference};

/// Version tag written with every persisted recommendation batch
pub const MODEL_VERSION: &str = "semester_scheduler_v1";

/// Which of the five machine slots a recommendation was produced for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    Main1,
    Main2,
    Main3,
    GenEd,
    Elective,
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SlotKind::Main1 => "main1",
            SlotKind::Main2 => "main2",
            SlotKind::Main3 => "main3",
            SlotKind::GenEd => "gen_ed",
            SlotKind::Elective => "elective",
        };
        write!(f, "{}", label)
    }
}

impl SlotKind {
    pub fn main(position: usize) -> Self {
        match position {
            0 => SlotKind::Main1,
            1 => SlotKind::Main2,
            _ => SlotKind::Main3,
        }
    }
}

/// A single filled slot produced by the scheduler
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub kind: SlotKind,
    pub course_id: CourseId,
    pub course_code: String,
    pub course_name: String,
    pub category: CourseCategory,
    pub credits: i32,
    /// Names of the gen-ed clusters the course belongs to, if any
    pub cluster: Option<String>,
    pub section_id: SectionId,
    pub meeting_label: String,
    pub score: f32,
    pub justification: String,
}

impl Recommendation {
    /// Binds this recommendation to a student and run, producing the row
    /// that gets persisted and returned.
    pub fn into_result(
        self,
        slot_number: i16,
        student_id: StudentId,
        term: Term,
        time_preference: TimePreference,
        created_at: DateTime<Utc>,
    ) -> RecommendationResult {
        RecommendationResult {
            student_id,
            term,
            slot_number,
            course_id: self.course_id,
            course_code: self.course_code,
            course_name: self.course_name,
            category: self.category,
            credits: self.credits,
            cluster: self.cluster,
            section_id: self.section_id,
            meeting_label: self.meeting_label,
            score: self.score,
            justification: self.justification,
            model_version: MODEL_VERSION.to_string(),
            time_preference,
            created_at,
        }
    }
}

/// A persisted recommendation row.
///
/// Rows are append-only: each generation run inserts a fresh batch tagged
/// with its creation timestamp and model version, and earlier batches are
/// never rewritten.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResult {
    pub student_id: StudentId,
    #[serde(flatten)]
    pub term: Term,
    /// Contiguous 1-based position within the run's filled slots
    pub slot_number: i16,
    pub course_id: CourseId,
    pub course_code: String,
    pub course_name: String,
    pub category: CourseCategory,
    pub credits: i32,
    pub cluster: Option<String>,
    pub section_id: SectionId,
    pub meeting_label: String,
    pub score: f32,
    pub justification: String,
    pub model_version: String,
    pub time_preference: TimePreference,
    pub created_at: DateTime<Utc>,
}

use std::collections::HashSet;
use std::fmt;

use crate::db::Snapshot;
use crate::models::{Course, CourseId, StudentId};

/// Why a course cannot be recommended to a student
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IneligibleReason {
    /// The student already completed the course or is enrolled in it
    AlreadyTaken,
    /// At least one prerequisite has not been completed
    MissingPrerequisite,
}

impl fmt::Display for IneligibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IneligibleReason::AlreadyTaken => "already completed or in progress",
            IneligibleReason::MissingPrerequisite => "prerequisite not satisfied",
        };
        write!(f, "{}", label)
    }
}

/// Per-student eligibility view over the snapshot's completion records.
///
/// A course is eligible when the student has not taken it (completed or
/// in progress) and every prerequisite id appears in the completed set.
/// In-progress work does not satisfy prerequisites. A prerequisite id with
/// no matching completion fails the check, so unknown references never
/// make a course eligible.
#[derive(Debug, Clone, Copy)]
pub struct Eligibility<'a> {
    completed: Option<&'a HashSet<CourseId>>,
    in_progress: Option<&'a HashSet<CourseId>>,
}

impl<'a> Eligibility<'a> {
    pub fn for_student(snapshot: &'a Snapshot, student_id: StudentId) -> Self {
        Self {
            completed: snapshot.completed_courses(student_id),
            in_progress: snapshot.in_progress_courses(student_id),
        }
    }

    pub fn has_completed(&self, course_id: CourseId) -> bool {
        self.completed.is_some_and(|set| set.contains(&course_id))
    }

    /// Completed or currently enrolled.
    pub fn has_taken(&self, course_id: CourseId) -> bool {
        self.has_completed(course_id)
            || self.in_progress.is_some_and(|set| set.contains(&course_id))
    }

    pub fn check(&self, course: &Course) -> Result<(), IneligibleReason> {
        if self.has_taken(course.id) {
            return Err(IneligibleReason::AlreadyTaken);
        }
        let all_met = course
            .prerequisites
            .iter()
            .all(|prereq| self.has_completed(*prereq));
        if all_met {
            Ok(())
        } else {
            Err(IneligibleReason::MissingPrerequisite)
        }
    }

    pub fn is_eligible(&self, course: &Course) -> bool {
        self.check(course).is_ok()
    }
}

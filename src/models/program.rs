use serde::{Deserialize, Serialize};

use super::CourseId;

pub type ClusterId = i64;

/// One course code pinned to a (semester, position) cell of a program template
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemplateSlot {
    /// Degree program code this slot belongs to, e.g. "BSDS"
    pub program: String,
    /// 1-based semester number within the template
    pub semester_index: u32,
    /// 1-based position within the semester's main block
    pub position: u32,
    pub course_code: String,
}

/// A general-education cluster and its member courses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenEdCluster {
    pub id: ClusterId,
    pub name: String,
    /// Declaration order; breaks ties between equally satisfied clusters
    pub position: u32,
    /// Member course ids, kept sorted for deterministic candidate order
    pub courses: Vec<CourseId>,
}

impl GenEdCluster {
    pub fn contains(&self, course_id: CourseId) -> bool {
        self.courses.contains(&course_id)
    }
}

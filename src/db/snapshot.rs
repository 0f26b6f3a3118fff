use std::collections::{HashMap, HashSet};

use crate::models::{
    CompletionStatus, Course, CourseCategory, CourseId, GenEdCluster, Section, Student, StudentId,
    TemplateSlot, Term,
};

/// In-memory view of the academic registry, loaded once per generation run.
///
/// All lookups the scheduler performs during a run go through this snapshot,
/// so a run sees one consistent state of the registry. Collections that feed
/// ordered decisions are kept sorted as they are built.
#[derive(Debug, Default)]
pub struct Snapshot {
    students: HashMap<StudentId, Student>,
    courses: HashMap<CourseId, Course>,
    course_ids_by_code: HashMap<String, CourseId>,
    sections_by_course: HashMap<CourseId, Vec<Section>>,
    offered_terms: HashSet<Term>,
    section_count: usize,
    completed: HashMap<StudentId, HashSet<CourseId>>,
    in_progress: HashMap<StudentId, HashSet<CourseId>>,
    template_slots: HashMap<String, Vec<TemplateSlot>>,
    clusters: Vec<GenEdCluster>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_student(&mut self, student: Student) {
        self.students.insert(student.id, student);
    }

    pub fn add_course(&mut self, course: Course) {
        self.course_ids_by_code.insert(course.code.clone(), course.id);
        self.courses.insert(course.id, course);
    }

    pub fn add_section(&mut self, section: Section) {
        self.offered_terms.insert(section.term);
        self.section_count += 1;
        let sections = self.sections_by_course.entry(section.course_id).or_default();
        sections.push(section);
        sections.sort_by_key(|s| s.id);
    }

    pub fn add_completion(
        &mut self,
        student_id: StudentId,
        course_id: CourseId,
        status: CompletionStatus,
    ) {
        let set = match status {
            CompletionStatus::Completed => self.completed.entry(student_id).or_default(),
            CompletionStatus::InProgress => self.in_progress.entry(student_id).or_default(),
        };
        set.insert(course_id);
    }

    pub fn add_template_slot(&mut self, slot: TemplateSlot) {
        let slots = self.template_slots.entry(slot.program.clone()).or_default();
        slots.push(slot);
        slots.sort_by_key(|s| (s.semester_index, s.position));
    }

    pub fn add_cluster(&mut self, mut cluster: GenEdCluster) {
        cluster.courses.sort_unstable();
        cluster.courses.dedup();
        self.clusters.push(cluster);
        self.clusters.sort_by_key(|c| (c.position, c.id));
    }

    pub fn student(&self, id: StudentId) -> Option<&Student> {
        self.students.get(&id)
    }

    pub fn course(&self, id: CourseId) -> Option<&Course> {
        self.courses.get(&id)
    }

    pub fn course_by_code(&self, code: &str) -> Option<&Course> {
        self.course_ids_by_code
            .get(code)
            .and_then(|id| self.courses.get(id))
    }

    pub fn courses(&self) -> &HashMap<CourseId, Course> {
        &self.courses
    }

    /// Sections of a course, ascending by section id.
    pub fn sections(&self, course_id: CourseId) -> &[Section] {
        self.sections_by_course
            .get(&course_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether any section at all is offered in the given term.
    pub fn term_offered(&self, term: Term) -> bool {
        self.offered_terms.contains(&term)
    }

    pub fn completed_courses(&self, student_id: StudentId) -> Option<&HashSet<CourseId>> {
        self.completed.get(&student_id)
    }

    pub fn in_progress_courses(&self, student_id: StudentId) -> Option<&HashSet<CourseId>> {
        self.in_progress.get(&student_id)
    }

    /// Template slots for a program, ordered by semester then position.
    pub fn template_slots(&self, program: &str) -> &[TemplateSlot] {
        self.template_slots
            .get(program)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Clusters in declaration order.
    pub fn clusters(&self) -> &[GenEdCluster] {
        &self.clusters
    }

    /// Courses eligible to fill free slots: foundations first, then
    /// electives, each ascending by course id.
    pub fn elective_pool(&self) -> Vec<&Course> {
        let mut pool: Vec<&Course> = self
            .courses
            .values()
            .filter(|c| {
                matches!(
                    c.category,
                    CourseCategory::Foundation | CourseCategory::Elective
                )
            })
            .collect();
        pool.sort_by_key(|c| (c.category != CourseCategory::Foundation, c.id));
        pool
    }

    pub fn student_count(&self) -> usize {
        self.students.len()
    }

    pub fn course_count(&self) -> usize {
        self.courses.len()
    }

    pub fn section_count(&self) -> usize {
        self.section_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MeetingWindow, Semester};

    fn course(id: CourseId, code: &str, category: CourseCategory) -> Course {
        Course {
            id,
            code: code.to_string(),
            name: format!("Course {}", code),
            category,
            credits: 3,
            prerequisites: Vec::new(),
        }
    }

    fn section(id: i64, course_id: CourseId, term: Term) -> Section {
        Section {
            id,
            course_id,
            term,
            capacity: 30,
            meeting: MeetingWindow::parse("Mon", "09:00", "10:15"),
        }
    }

    #[test]
    fn test_course_lookup_by_code() {
        let mut snapshot = Snapshot::new();
        snapshot.add_course(course(1, "CS101", CourseCategory::Core));

        assert_eq!(snapshot.course_by_code("CS101").unwrap().id, 1);
        assert!(snapshot.course_by_code("CS999").is_none());
    }

    #[test]
    fn test_sections_sorted_by_id() {
        let term = Term::new(Semester::Fall, 2026);
        let mut snapshot = Snapshot::new();
        snapshot.add_section(section(30, 1, term));
        snapshot.add_section(section(10, 1, term));
        snapshot.add_section(section(20, 1, term));

        let ids: Vec<i64> = snapshot.sections(1).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![10, 20, 30]);
        assert!(snapshot.sections(2).is_empty());
    }

    #[test]
    fn test_term_offered() {
        let mut snapshot = Snapshot::new();
        snapshot.add_section(section(1, 1, Term::new(Semester::Fall, 2026)));

        assert!(snapshot.term_offered(Term::new(Semester::Fall, 2026)));
        assert!(!snapshot.term_offered(Term::new(Semester::Spring, 2027)));
    }

    #[test]
    fn test_template_slots_sorted() {
        let mut snapshot = Snapshot::new();
        for (semester_index, position, code) in
            [(2, 1, "B1"), (1, 2, "A2"), (1, 1, "A1"), (2, 2, "B2")]
        {
            snapshot.add_template_slot(TemplateSlot {
                program: "BSDS".to_string(),
                semester_index,
                position,
                course_code: code.to_string(),
            });
        }

        let codes: Vec<&str> = snapshot
            .template_slots("BSDS")
            .iter()
            .map(|s| s.course_code.as_str())
            .collect();
        assert_eq!(codes, vec!["A1", "A2", "B1", "B2"]);
    }

    #[test]
    fn test_clusters_in_declaration_order() {
        let mut snapshot = Snapshot::new();
        snapshot.add_cluster(GenEdCluster {
            id: 2,
            name: "Social Sciences".to_string(),
            position: 2,
            courses: vec![202, 201],
        });
        snapshot.add_cluster(GenEdCluster {
            id: 1,
            name: "Humanities".to_string(),
            position: 1,
            courses: vec![103, 101, 103],
        });

        let names: Vec<&str> = snapshot.clusters().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Humanities", "Social Sciences"]);
        // Members sorted and deduplicated
        assert_eq!(snapshot.clusters()[0].courses, vec![101, 103]);
        assert_eq!(snapshot.clusters()[1].courses, vec![201, 202]);
    }

    #[test]
    fn test_elective_pool_order() {
        let mut snapshot = Snapshot::new();
        snapshot.add_course(course(5, "ELEC2", CourseCategory::Elective));
        snapshot.add_course(course(3, "FOUND2", CourseCategory::Foundation));
        snapshot.add_course(course(4, "ELEC1", CourseCategory::Elective));
        snapshot.add_course(course(1, "CORE1", CourseCategory::Core));
        snapshot.add_course(course(2, "FOUND1", CourseCategory::Foundation));

        let ids: Vec<CourseId> = snapshot.elective_pool().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_completions_split_by_status() {
        let mut snapshot = Snapshot::new();
        snapshot.add_completion(7, 1, CompletionStatus::Completed);
        snapshot.add_completion(7, 2, CompletionStatus::InProgress);

        assert!(snapshot.completed_courses(7).unwrap().contains(&1));
        assert!(!snapshot.completed_courses(7).unwrap().contains(&2));
        assert!(snapshot.in_progress_courses(7).unwrap().contains(&2));
        assert!(snapshot.completed_courses(99).is_none());
    }
}

use std::collections::HashSet;

use advisor_api::db::Snapshot;
use advisor_api::models::{
    CompletionStatus, Course, CourseCategory, CourseId, GenEdCluster, MeetingWindow, Section,
    Semester, SlotKind, Student, TemplateSlot, Term, TimePreference,
};
use advisor_api::services::integrity::IntegrityFault;
use advisor_api::services::scheduler::{plan, SchedulerConfig, SkipReason, SlotOutcome, SlotPlan};

const TERM: Term = Term {
    semester: Semester::Fall,
    year: 2026,
};

fn course(id: CourseId, code: &str, category: CourseCategory, prereqs: Vec<CourseId>) -> Course {
    Course {
        id,
        code: code.to_string(),
        name: format!("Course {}", code),
        category,
        credits: 3,
        prerequisites: prereqs,
    }
}

fn section(id: i64, course_id: CourseId, days: &str, start: &str, end: &str) -> Section {
    Section {
        id,
        course_id,
        term: TERM,
        capacity: 30,
        meeting: MeetingWindow::parse(days, start, end),
    }
}

fn template(semester_index: u32, position: u32, code: &str) -> TemplateSlot {
    TemplateSlot {
        program: "BSCS".to_string(),
        semester_index,
        position,
        course_code: code.to_string(),
    }
}

fn student(semesters_completed: u32) -> Student {
    Student {
        id: 42,
        name: "Ada Lovelace".to_string(),
        program: "BSCS".to_string(),
        credits: Some(semesters_completed as i32 * 15),
        semesters_completed,
        preferred_time: None,
    }
}

/// Catalog for a two-semester BSCS plan with two gen-ed clusters and a
/// small foundation/elective pool. MATH101's first section collides with
/// CS101's only one, and HUM110's only section meets in the afternoon.
fn create_catalog() -> Snapshot {
    let mut snapshot = Snapshot::new();
    snapshot.add_student(student(0));

    snapshot.add_course(course(1, "CS101", CourseCategory::Core, vec![]));
    snapshot.add_course(course(2, "MATH101", CourseCategory::Core, vec![]));
    snapshot.add_course(course(3, "CS102", CourseCategory::Core, vec![1]));
    snapshot.add_course(course(4, "MATH201", CourseCategory::Core, vec![2]));
    snapshot.add_course(course(5, "CS201", CourseCategory::Core, vec![3]));
    snapshot.add_course(course(101, "HUM110", CourseCategory::GenEd, vec![]));
    snapshot.add_course(course(102, "HUM120", CourseCategory::GenEd, vec![]));
    snapshot.add_course(course(103, "HUM130", CourseCategory::GenEd, vec![]));
    snapshot.add_course(course(111, "SOC110", CourseCategory::GenEd, vec![]));
    snapshot.add_course(course(112, "SOC120", CourseCategory::GenEd, vec![]));
    snapshot.add_course(course(201, "STAT110", CourseCategory::Foundation, vec![]));
    snapshot.add_course(course(202, "MUS100", CourseCategory::Elective, vec![]));
    snapshot.add_course(course(203, "PHIL150", CourseCategory::Elective, vec![]));

    snapshot.add_section(section(1101, 1, "Mon", "09:00", "10:15"));
    snapshot.add_section(section(1201, 2, "Mon", "09:30", "10:45"));
    snapshot.add_section(section(1202, 2, "Mon", "11:00", "12:15"));
    snapshot.add_section(section(1301, 3, "Tue", "09:00", "10:15"));
    snapshot.add_section(section(1401, 4, "Tue", "11:00", "12:15"));
    snapshot.add_section(section(1501, 5, "Wed", "09:00", "10:15"));
    snapshot.add_section(section(2101, 101, "Wed", "14:00", "15:15"));
    snapshot.add_section(section(2102, 102, "Thu", "09:00", "10:15"));
    snapshot.add_section(section(2103, 103, "Thu", "11:00", "12:15"));
    snapshot.add_section(section(2111, 111, "Fri", "09:00", "10:15"));
    snapshot.add_section(section(2112, 112, "Fri", "11:00", "12:15"));
    snapshot.add_section(section(3201, 201, "Mon", "14:00", "15:15"));
    snapshot.add_section(section(3202, 202, "Tue", "14:00", "15:15"));
    snapshot.add_section(section(3203, 203, "Wed", "11:00", "12:15"));

    snapshot.add_template_slot(template(1, 1, "CS101"));
    snapshot.add_template_slot(template(1, 2, "MATH101"));
    snapshot.add_template_slot(template(2, 1, "CS102"));
    snapshot.add_template_slot(template(2, 2, "MATH201"));
    snapshot.add_template_slot(template(2, 3, "CS201"));

    snapshot.add_cluster(GenEdCluster {
        id: 1,
        name: "Arts".to_string(),
        position: 1,
        courses: vec![101, 102, 103],
    });
    snapshot.add_cluster(GenEdCluster {
        id: 2,
        name: "Society".to_string(),
        position: 2,
        courses: vec![111, 112],
    });

    snapshot
}

fn run(snapshot: &Snapshot, student: &Student, preference: TimePreference) -> SlotPlan {
    plan(snapshot, student, TERM, preference, &SchedulerConfig::default()).unwrap()
}

fn filled_codes(plan: &SlotPlan) -> Vec<String> {
    plan.filled().map(|rec| rec.course_code.clone()).collect()
}

fn filled_sections(plan: &SlotPlan) -> Vec<i64> {
    plan.filled().map(|rec| rec.section_id).collect()
}

#[test]
fn test_new_student_gets_a_full_first_semester() {
    let snapshot = create_catalog();
    let plan = run(&snapshot, &student(0), TimePreference::Any);

    // Two templated mains, pool fill for the open third slot, then the
    // gen-ed and elective slots
    assert_eq!(
        filled_codes(&plan),
        vec!["CS101", "MATH101", "STAT110", "HUM110", "MUS100"]
    );
    let scores: Vec<f32> = plan.filled().map(|rec| rec.score).collect();
    assert_eq!(scores, vec![3.0, 3.0, 1.0, 2.0, 1.0]);

    let results = plan.into_results(42, TERM, TimePreference::Any, chrono::Utc::now());
    let numbers: Vec<i16> = results.iter().map(|r| r.slot_number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_conflicting_section_is_passed_over_for_the_next_one() {
    let snapshot = create_catalog();
    let plan = run(&snapshot, &student(0), TimePreference::Any);

    // MATH101's first section collides with CS101's pick, so the later
    // one wins even though its id is higher
    let sections = filled_sections(&plan);
    assert!(sections.contains(&1101));
    assert!(sections.contains(&1202));
    assert!(!sections.contains(&1201));
}

#[test]
fn test_missing_prerequisite_skips_the_slot_and_keeps_numbering_dense() {
    let mut snapshot = create_catalog();
    snapshot.add_completion(42, 1, CompletionStatus::Completed);
    snapshot.add_completion(42, 2, CompletionStatus::Completed);

    let plan = run(&snapshot, &student(1), TimePreference::Any);

    // CS201 needs CS102, which this student has not taken yet
    let skipped: Vec<_> = plan.skipped().collect();
    assert_eq!(
        skipped,
        vec![(
            SlotKind::Main3,
            Some("CS201"),
            SkipReason::PrerequisiteNotSatisfied
        )]
    );

    let results = plan.into_results(42, TERM, TimePreference::Any, chrono::Utc::now());
    let numbers: Vec<i16> = results.iter().map(|r| r.slot_number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
    let codes: Vec<&str> = results.iter().map(|r| r.course_code.as_str()).collect();
    assert_eq!(codes, vec!["CS102", "MATH201", "HUM110", "STAT110"]);
}

#[test]
fn test_in_progress_course_does_not_satisfy_a_prerequisite() {
    let mut snapshot = create_catalog();
    snapshot.add_completion(42, 1, CompletionStatus::InProgress);
    snapshot.add_completion(42, 2, CompletionStatus::Completed);

    let plan = run(&snapshot, &student(1), TimePreference::Any);

    assert!(plan.skipped().any(|(_, code, reason)| {
        code == Some("CS102") && reason == SkipReason::PrerequisiteNotSatisfied
    }));
    assert!(!filled_codes(&plan).contains(&"CS102".to_string()));
}

#[test]
fn test_completed_templated_course_is_not_recommended_again() {
    let mut snapshot = create_catalog();
    // Transfer credit for CS101 before the first semester
    snapshot.add_completion(42, 1, CompletionStatus::Completed);

    let plan = run(&snapshot, &student(0), TimePreference::Any);

    assert!(!filled_codes(&plan).contains(&"CS101".to_string()));
    assert!(plan
        .skipped()
        .any(|(_, code, reason)| code == Some("CS101") && reason == SkipReason::AlreadyTaken));
}

#[test]
fn test_no_two_picks_share_a_meeting_time() {
    let snapshot = create_catalog();
    let plan = run(&snapshot, &student(0), TimePreference::Any);

    let labels: Vec<String> = plan
        .filled()
        .filter(|rec| rec.meeting_label != "TBA")
        .map(|rec| rec.meeting_label.clone())
        .collect();
    let unique: HashSet<&String> = labels.iter().collect();
    assert_eq!(labels.len(), unique.len());
    assert_eq!(labels.len(), 5);
}

#[test]
fn test_satisfied_cluster_is_never_drawn_from_again() {
    let mut snapshot = create_catalog();
    for course_id in [101, 102, 103] {
        snapshot.add_completion(42, course_id, CompletionStatus::Completed);
    }

    let plan = run(&snapshot, &student(0), TimePreference::Any);

    let gen_ed = plan
        .filled()
        .find(|rec| rec.kind == SlotKind::GenEd)
        .expect("gen-ed slot should be filled from the open cluster");
    assert_eq!(gen_ed.course_code, "SOC110");
    assert_eq!(gen_ed.cluster.as_deref(), Some("Society"));
}

#[test]
fn test_gen_ed_slot_skips_when_no_cluster_has_a_candidate() {
    let mut snapshot = create_catalog();
    for course_id in [101, 102, 103, 111, 112] {
        snapshot.add_completion(42, course_id, CompletionStatus::Completed);
    }

    let plan = run(&snapshot, &student(0), TimePreference::Any);

    assert!(plan
        .skipped()
        .any(|(kind, _, reason)| kind == SlotKind::GenEd && reason == SkipReason::NoOpenCluster));
}

#[test]
fn test_morning_preference_never_fills_an_afternoon_section() {
    let snapshot = create_catalog();
    let plan = run(&snapshot, &student(0), TimePreference::Morning);

    // STAT110, MUS100 and HUM110 only meet in the afternoon; the pool
    // falls through to PHIL150 and the gen-ed slot to HUM120
    assert_eq!(
        filled_codes(&plan),
        vec!["CS101", "MATH101", "PHIL150", "HUM120"]
    );
    let sections = filled_sections(&plan);
    for id in [3201, 3202, 2101] {
        assert!(!sections.contains(&id));
    }
    // Nothing is left for the elective slot rather than an off-window pick
    assert!(plan
        .skipped()
        .any(|(kind, _, reason)| kind == SlotKind::Elective
            && reason == SkipReason::NoCandidateCourse));
}

#[test]
fn test_unscheduled_section_fills_any_but_not_a_specific_window() {
    let mut snapshot = Snapshot::new();
    snapshot.add_student(student(0));
    snapshot.add_course(course(301, "ONLINE101", CourseCategory::Elective, vec![]));
    snapshot.add_section(Section {
        id: 4301,
        course_id: 301,
        term: TERM,
        capacity: 100,
        meeting: None,
    });

    let any_plan = run(&snapshot, &student(0), TimePreference::Any);
    let filled: Vec<_> = any_plan.filled().collect();
    assert_eq!(filled.len(), 1);
    assert_eq!(filled[0].course_code, "ONLINE101");
    assert_eq!(filled[0].meeting_label, "TBA");

    // A concrete window cannot be confirmed for an unscheduled section
    let morning_plan = run(&snapshot, &student(0), TimePreference::Morning);
    assert_eq!(morning_plan.filled().count(), 0);
}

#[test]
fn test_same_snapshot_yields_identical_plans() {
    let snapshot = create_catalog();

    let first = run(&snapshot, &student(0), TimePreference::Any);
    let second = run(&snapshot, &student(0), TimePreference::Any);

    assert_eq!(first, second);
}

#[test]
fn test_prerequisite_cycle_fails_the_run() {
    let mut snapshot = create_catalog();
    // CS101 -> CS102 -> CS101
    snapshot.add_course(course(1, "CS101", CourseCategory::Core, vec![3]));

    let result = plan(
        &snapshot,
        &student(0),
        TERM,
        TimePreference::Any,
        &SchedulerConfig::default(),
    );
    assert!(matches!(result, Err(IntegrityFault::PrerequisiteCycle(_))));
}

#[test]
fn test_dangling_prerequisite_fails_the_run() {
    let mut snapshot = create_catalog();
    snapshot.add_course(course(2, "MATH101", CourseCategory::Core, vec![999]));

    let result = plan(
        &snapshot,
        &student(0),
        TERM,
        TimePreference::Any,
        &SchedulerConfig::default(),
    );
    assert_eq!(
        result,
        Err(IntegrityFault::DanglingPrerequisite {
            course: 2,
            missing: 999,
        })
    );
}

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::db::Snapshot;
use crate::models::{
    Course, CourseCategory, CourseId, Recommendation, RecommendationResult, Section, SlotKind,
    Student, Term, TimePreference,
};
use crate::services::clusters;
use crate::services::eligibility::{Eligibility, IneligibleReason};
use crate::services::integrity::{self, IntegrityFault};
use crate::services::meetings::{self, DayPartBounds};
use crate::services::templates;

/// Relative weight of each slot family in recommendation scores.
///
/// Passed in as configuration so callers and tests see one named table
/// instead of constants buried in selection code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub main: f32,
    pub gen_ed: f32,
    pub elective: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            main: 3.0,
            gen_ed: 2.0,
            elective: 1.0,
        }
    }
}

/// Tunables for a scheduling run
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SchedulerConfig {
    pub weights: ScoreWeights,
    pub bounds: DayPartBounds,
}

/// Why a slot stayed empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    UnknownCourseCode,
    AlreadyTaken,
    AlreadyRecommended,
    PrerequisiteNotSatisfied,
    NoSectionOffered,
    NoSectionInPreferredWindow,
    SectionConflict,
    NoOpenCluster,
    NoCandidateCourse,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SkipReason::UnknownCourseCode => "course code not in catalog",
            SkipReason::AlreadyTaken => "already completed or in progress",
            SkipReason::AlreadyRecommended => "already recommended in this run",
            SkipReason::PrerequisiteNotSatisfied => "prerequisite not satisfied",
            SkipReason::NoSectionOffered => "no section offered in the target term",
            SkipReason::NoSectionInPreferredWindow => "no section in the preferred time window",
            SkipReason::SectionConflict => "all sections conflict with earlier picks",
            SkipReason::NoOpenCluster => "no open cluster with a recommendable course",
            SkipReason::NoCandidateCourse => "no recommendable course available",
        };
        write!(f, "{}", label)
    }
}

impl From<IneligibleReason> for SkipReason {
    fn from(reason: IneligibleReason) -> Self {
        match reason {
            IneligibleReason::AlreadyTaken => SkipReason::AlreadyTaken,
            IneligibleReason::MissingPrerequisite => SkipReason::PrerequisiteNotSatisfied,
        }
    }
}

/// Outcome of one of the five machine slots
#[derive(Debug, Clone, PartialEq)]
pub enum SlotOutcome {
    Filled(Recommendation),
    Skipped {
        kind: SlotKind,
        /// The templated course code the slot was trying to honor, if any
        course_code: Option<String>,
        reason: SkipReason,
    },
}

/// Audit view of a completed run: always five outcomes.
///
/// Within the main block, filled slots precede skipped ones so persisted
/// slot numbers stay dense; the gen-ed and elective outcomes follow in
/// fixed positions four and five.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotPlan {
    pub outcomes: Vec<SlotOutcome>,
}

impl SlotPlan {
    pub fn filled(&self) -> impl Iterator<Item = &Recommendation> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            SlotOutcome::Filled(rec) => Some(rec),
            SlotOutcome::Skipped { .. } => None,
        })
    }

    pub fn skipped(&self) -> impl Iterator<Item = (SlotKind, Option<&str>, SkipReason)> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            SlotOutcome::Filled(_) => None,
            SlotOutcome::Skipped {
                kind,
                course_code,
                reason,
            } => Some((*kind, course_code.as_deref(), *reason)),
        })
    }

    /// Binds the filled slots to a run, numbering them 1..k with no gaps.
    pub fn into_results(
        self,
        student_id: i64,
        term: Term,
        time_preference: TimePreference,
        created_at: DateTime<Utc>,
    ) -> Vec<RecommendationResult> {
        self.outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                SlotOutcome::Filled(rec) => Some(rec),
                SlotOutcome::Skipped { .. } => None,
            })
            .enumerate()
            .map(|(index, rec)| {
                rec.into_result(
                    index as i16 + 1,
                    student_id,
                    term,
                    time_preference,
                    created_at,
                )
            })
            .collect()
    }
}

/// Builds the five-slot plan for one student and term.
///
/// Selection is fully deterministic: template slots are walked in position
/// order, cluster candidates in ascending course id, the elective pool
/// foundations-first, and sections in ascending section id. Running the
/// same snapshot twice yields the same plan.
pub fn plan(
    snapshot: &Snapshot,
    student: &Student,
    term: Term,
    preference: TimePreference,
    config: &SchedulerConfig,
) -> Result<SlotPlan, IntegrityFault> {
    let eligibility = Eligibility::for_student(snapshot, student.id);
    let semester_index = templates::next_semester_index(student.semesters_completed);
    let main_codes = templates::main_codes(snapshot.template_slots(&student.program), semester_index);

    check_reachable_prerequisites(snapshot, &main_codes)?;

    let mut picker = SectionPicker {
        snapshot,
        term,
        preference,
        bounds: config.bounds,
        chosen: Vec::new(),
    };
    let mut picked_courses: HashSet<CourseId> = HashSet::new();

    // 1. Main block: honor templated codes in position order, falling back
    //    to the elective pool for positions the template leaves open.
    let mut main_filled: Vec<Recommendation> = Vec::new();
    let mut main_skipped: Vec<(Option<String>, SkipReason)> = Vec::new();
    for code in main_codes {
        match code {
            Some(code) => match snapshot.course_by_code(code) {
                Some(course) => {
                    match attempt_course(course, &eligibility, &picked_courses, &picker) {
                        Ok(section) => {
                            let justification = format!(
                                "Required for semester {} of the {} plan",
                                semester_index, student.program
                            );
                            main_filled.push(build_recommendation(
                                snapshot,
                                course,
                                section,
                                config.weights.main,
                                justification,
                            ));
                            picked_courses.insert(course.id);
                            picker.take(section);
                        }
                        Err(reason) => main_skipped.push((Some(code.to_string()), reason)),
                    }
                }
                None => main_skipped.push((Some(code.to_string()), SkipReason::UnknownCourseCode)),
            },
            None => {
                let justification = format!(
                    "Open elective for semester {} of the {} plan",
                    semester_index, student.program
                );
                match pick_from_pool(snapshot, &eligibility, &picked_courses, &picker) {
                    Some((course, section)) => {
                        main_filled.push(build_recommendation(
                            snapshot,
                            course,
                            section,
                            config.weights.elective,
                            justification,
                        ));
                        picked_courses.insert(course.id);
                        picker.take(section);
                    }
                    None => main_skipped.push((None, SkipReason::NoCandidateCourse)),
                }
            }
        }
    }

    let mut outcomes: Vec<SlotOutcome> = Vec::with_capacity(5);
    for (index, mut rec) in main_filled.into_iter().enumerate() {
        rec.kind = SlotKind::main(index);
        outcomes.push(SlotOutcome::Filled(rec));
    }
    let filled_mains = outcomes.len();
    for (index, (course_code, reason)) in main_skipped.into_iter().enumerate() {
        outcomes.push(SlotOutcome::Skipped {
            kind: SlotKind::main(filled_mains + index),
            course_code,
            reason,
        });
    }

    // 2. Gen-ed slot: least satisfied open cluster that still has a
    //    recommendable member, earliest-declared on ties.
    let progress = clusters::progress(snapshot.clusters(), &eligibility);
    let chosen_cluster = clusters::least_satisfied_open(snapshot.clusters(), &progress, |cluster| {
        cluster.courses.iter().any(|id| {
            snapshot
                .course(*id)
                .is_some_and(|c| attempt_course(c, &eligibility, &picked_courses, &picker).is_ok())
        })
    });
    match chosen_cluster {
        Some(cluster) => {
            let completed = progress.get(&cluster.id).copied().unwrap_or(0);
            let candidate = cluster.courses.iter().find_map(|id| {
                let course = snapshot.course(*id)?;
                let section = attempt_course(course, &eligibility, &picked_courses, &picker).ok()?;
                Some((course, section))
            });
            match candidate {
                Some((course, section)) => {
                    let justification = format!(
                        "Gen-ed requirement for cluster '{}' ({}/{} completed)",
                        cluster.name,
                        completed,
                        clusters::COURSES_PER_CLUSTER
                    );
                    let mut rec = build_recommendation(
                        snapshot,
                        course,
                        section,
                        config.weights.gen_ed,
                        justification,
                    );
                    rec.kind = SlotKind::GenEd;
                    picked_courses.insert(course.id);
                    picker.take(section);
                    outcomes.push(SlotOutcome::Filled(rec));
                }
                None => outcomes.push(SlotOutcome::Skipped {
                    kind: SlotKind::GenEd,
                    course_code: None,
                    reason: SkipReason::NoOpenCluster,
                }),
            }
        }
        None => outcomes.push(SlotOutcome::Skipped {
            kind: SlotKind::GenEd,
            course_code: None,
            reason: SkipReason::NoOpenCluster,
        }),
    }

    // 3. Elective slot from the shared pool.
    match pick_from_pool(snapshot, &eligibility, &picked_courses, &picker) {
        Some((course, section)) => {
            let justification = match course.category {
                CourseCategory::Foundation => {
                    format!("Foundation requirement for the {} plan", student.program)
                }
                _ => "Free elective".to_string(),
            };
            let mut rec = build_recommendation(
                snapshot,
                course,
                section,
                config.weights.elective,
                justification,
            );
            rec.kind = SlotKind::Elective;
            picker.take(section);
            outcomes.push(SlotOutcome::Filled(rec));
        }
        None => outcomes.push(SlotOutcome::Skipped {
            kind: SlotKind::Elective,
            course_code: None,
            reason: SkipReason::NoCandidateCourse,
        }),
    }

    Ok(SlotPlan { outcomes })
}

/// Runs the dangling/cycle check over every course this run could touch:
/// resolved template codes, cluster members, and the elective pool.
fn check_reachable_prerequisites(
    snapshot: &Snapshot,
    main_codes: &[Option<&str>],
) -> Result<(), IntegrityFault> {
    let mut roots: Vec<CourseId> = Vec::new();
    for code in main_codes.iter().flatten() {
        if let Some(course) = snapshot.course_by_code(code) {
            roots.push(course.id);
        }
    }
    for cluster in snapshot.clusters() {
        roots.extend(cluster.courses.iter().copied());
    }
    roots.extend(snapshot.elective_pool().iter().map(|course| course.id));
    integrity::check_prerequisites(snapshot.courses(), roots)
}

fn build_recommendation(
    snapshot: &Snapshot,
    course: &Course,
    section: &Section,
    score: f32,
    justification: String,
) -> Recommendation {
    Recommendation {
        // Position is assigned once the main block is assembled
        kind: SlotKind::Main1,
        course_id: course.id,
        course_code: course.code.clone(),
        course_name: course.name.clone(),
        category: course.category,
        credits: course.credits,
        cluster: cluster_names(snapshot, course.id),
        section_id: section.id,
        meeting_label: section.meeting_label(),
        score,
        justification,
    }
}

fn cluster_names(snapshot: &Snapshot, course_id: CourseId) -> Option<String> {
    let names: Vec<&str> = snapshot
        .clusters()
        .iter()
        .filter(|cluster| cluster.contains(course_id))
        .map(|cluster| cluster.name.as_str())
        .collect();
    if names.is_empty() {
        None
    } else {
        Some(names.join(", "))
    }
}

/// Full recommendability check for one course: not yet picked, eligible,
/// and offered in a section that fits the preference without conflicts.
fn attempt_course<'a>(
    course: &Course,
    eligibility: &Eligibility,
    picked: &HashSet<CourseId>,
    picker: &SectionPicker<'a>,
) -> Result<&'a Section, SkipReason> {
    if picked.contains(&course.id) {
        return Err(SkipReason::AlreadyRecommended);
    }
    eligibility.check(course).map_err(SkipReason::from)?;
    picker.pick(course).map_err(SkipReason::from)
}

/// First recommendable course from the foundation/elective pool.
fn pick_from_pool<'a>(
    snapshot: &'a Snapshot,
    eligibility: &Eligibility,
    picked: &HashSet<CourseId>,
    picker: &SectionPicker<'a>,
) -> Option<(&'a Course, &'a Section)> {
    snapshot.elective_pool().into_iter().find_map(|course| {
        let section = attempt_course(course, eligibility, picked, picker).ok()?;
        Some((course, section))
    })
}

/// Picks sections for the run, remembering earlier picks so later slots
/// avoid meeting-time collisions.
struct SectionPicker<'a> {
    snapshot: &'a Snapshot,
    term: Term,
    preference: TimePreference,
    bounds: DayPartBounds,
    chosen: Vec<&'a Section>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PickFailure {
    NoneOffered,
    NoneInWindow,
    AllConflict,
}

impl From<PickFailure> for SkipReason {
    fn from(failure: PickFailure) -> Self {
        match failure {
            PickFailure::NoneOffered => SkipReason::NoSectionOffered,
            PickFailure::NoneInWindow => SkipReason::NoSectionInPreferredWindow,
            PickFailure::AllConflict => SkipReason::SectionConflict,
        }
    }
}

impl<'a> SectionPicker<'a> {
    /// Lowest-id section of the course in the target term that matches the
    /// time preference and does not collide with earlier picks. A specific
    /// preference is strict: rather than fall back to an off-window section,
    /// the pick fails.
    fn pick(&self, course: &Course) -> Result<&'a Section, PickFailure> {
        let offered: Vec<&Section> = self
            .snapshot
            .sections(course.id)
            .iter()
            .filter(|section| section.term == self.term)
            .collect();
        if offered.is_empty() {
            return Err(PickFailure::NoneOffered);
        }

        let in_window: Vec<&Section> = offered
            .into_iter()
            .filter(|section| {
                let part = meetings::classify(section.meeting.as_ref(), &self.bounds);
                meetings::matches_preference(part, self.preference)
            })
            .collect();
        if in_window.is_empty() {
            return Err(PickFailure::NoneInWindow);
        }

        in_window
            .into_iter()
            .find(|section| !self.conflicts(section))
            .ok_or(PickFailure::AllConflict)
    }

    fn conflicts(&self, section: &Section) -> bool {
        self.chosen
            .iter()
            .any(|chosen| meetings::overlaps(chosen.meeting.as_ref(), section.meeting.as_ref()))
    }

    fn take(&mut self, section: &'a Section) {
        self.chosen.push(section);
    }
}

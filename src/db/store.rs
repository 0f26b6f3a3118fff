use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::AppResult;
use crate::models::{
    CompletionStatus, Course, CourseCategory, MeetingWindow, RecommendationResult, Section,
    Semester, Student, Term, TimePreference,
};

use super::snapshot::Snapshot;

/// Filters for listing persisted recommendation rows
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultFilter {
    pub student_id: Option<i64>,
    pub semester: Option<Semester>,
    pub year: Option<i32>,
}

/// Storage seam between the engine and Postgres.
///
/// The engine loads everything it needs up front and writes one batch at
/// the end, so the trait stays at three coarse operations.
#[async_trait]
pub trait RecommendationStore: Send + Sync {
    /// Loads one consistent snapshot of the academic registry.
    async fn load_snapshot(&self) -> AppResult<Snapshot>;

    /// Appends the rows of one generation run. All-or-nothing: a failed
    /// insert leaves no partial batch behind.
    async fn persist_results(&self, results: Vec<RecommendationResult>) -> AppResult<()>;

    /// Lists persisted rows, newest runs first, slot order within a run.
    async fn list_results(&self, filter: ResultFilter) -> AppResult<Vec<RecommendationResult>>;
}

/// Postgres-backed store
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecommendationStore for PgStore {
    async fn load_snapshot(&self) -> AppResult<Snapshot> {
        let mut snapshot = Snapshot::new();

        // 1. Students
        let students = sqlx::query_as::<_, StudentRow>(
            "SELECT id, name, program, credits, semesters_completed, preferred_time \
             FROM students",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in students {
            snapshot.add_student(student_from_row(row));
        }

        // 2. Courses joined with their prerequisite links
        let prerequisites = sqlx::query_as::<_, PrerequisiteRow>(
            "SELECT course_id, prerequisite_id FROM course_prerequisites \
             ORDER BY course_id, prerequisite_id",
        )
        .fetch_all(&self.pool)
        .await?;
        let mut prereqs_by_course: HashMap<i64, Vec<i64>> = HashMap::new();
        for row in prerequisites {
            prereqs_by_course
                .entry(row.course_id)
                .or_default()
                .push(row.prerequisite_id);
        }

        let courses = sqlx::query_as::<_, CourseRow>(
            "SELECT id, code, name, category, credits FROM courses",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in courses {
            let prerequisites = prereqs_by_course.remove(&row.id).unwrap_or_default();
            snapshot.add_course(course_from_row(row, prerequisites));
        }

        // 3. Sections
        let sections = sqlx::query_as::<_, SectionRow>(
            "SELECT id, course_id, semester, year, capacity, meeting_days, start_time, end_time \
             FROM sections",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in sections {
            if let Some(section) = section_from_row(row) {
                snapshot.add_section(section);
            }
        }

        // 4. Completion records
        let completions = sqlx::query_as::<_, CompletionRow>(
            "SELECT student_id, course_id, status FROM completions",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in completions {
            let status = completion_status_from_row(&row);
            snapshot.add_completion(row.student_id, row.course_id, status);
        }

        // 5. Program templates
        let template_slots = sqlx::query_as::<_, TemplateSlotRow>(
            "SELECT program, semester_index, position, course_code FROM program_template_slots \
             ORDER BY program, semester_index, position, course_code",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in template_slots {
            snapshot.add_template_slot(row.into_slot());
        }

        // 6. Gen-ed clusters and their membership
        let memberships = sqlx::query_as::<_, ClusterCourseRow>(
            "SELECT cluster_id, course_id FROM gened_cluster_courses",
        )
        .fetch_all(&self.pool)
        .await?;
        let mut members_by_cluster: HashMap<i64, Vec<i64>> = HashMap::new();
        for row in memberships {
            members_by_cluster
                .entry(row.cluster_id)
                .or_default()
                .push(row.course_id);
        }

        let clusters = sqlx::query_as::<_, ClusterRow>(
            "SELECT id, name, position FROM gened_clusters ORDER BY position, id",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in clusters {
            let courses = members_by_cluster.remove(&row.id).unwrap_or_default();
            snapshot.add_cluster(row.into_cluster(courses));
        }

        tracing::info!(
            students = snapshot.student_count(),
            courses = snapshot.course_count(),
            sections = snapshot.section_count(),
            clusters = snapshot.clusters().len(),
            "Registry snapshot loaded"
        );

        Ok(snapshot)
    }

    async fn persist_results(&self, results: Vec<RecommendationResult>) -> AppResult<()> {
        if results.is_empty() {
            tracing::info!("Run produced no rows to persist");
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for result in &results {
            sqlx::query(
                "INSERT INTO recommendation_results \
                 (student_id, semester, year, slot_number, course_id, course_code, course_name, \
                  category, credits, cluster, section_id, meeting_label, score, justification, \
                  model_version, time_preference, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)",
            )
            .bind(result.student_id)
            .bind(result.term.semester.to_string())
            .bind(result.term.year)
            .bind(result.slot_number)
            .bind(result.course_id)
            .bind(&result.course_code)
            .bind(&result.course_name)
            .bind(result.category.to_string())
            .bind(result.credits)
            .bind(&result.cluster)
            .bind(result.section_id)
            .bind(&result.meeting_label)
            .bind(result.score)
            .bind(&result.justification)
            .bind(&result.model_version)
            .bind(result.time_preference.to_string())
            .bind(result.created_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        tracing::info!(rows = results.len(), "Recommendation batch persisted");
        Ok(())
    }

    async fn list_results(&self, filter: ResultFilter) -> AppResult<Vec<RecommendationResult>> {
        let rows = sqlx::query_as::<_, ResultRow>(
            "SELECT student_id, semester, year, slot_number, course_id, course_code, course_name, \
                    category, credits, cluster, section_id, meeting_label, score, justification, \
                    model_version, time_preference, created_at \
             FROM recommendation_results \
             WHERE ($1::bigint IS NULL OR student_id = $1) \
               AND ($2::text IS NULL OR semester = $2) \
               AND ($3::int IS NULL OR year = $3) \
             ORDER BY created_at DESC, slot_number ASC",
        )
        .bind(filter.student_id)
        .bind(filter.semester.map(|s| s.to_string()))
        .bind(filter.year)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().filter_map(result_from_row).collect())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StudentRow {
    id: i64,
    name: String,
    program: String,
    credits: Option<i32>,
    semesters_completed: i32,
    preferred_time: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct CourseRow {
    id: i64,
    code: String,
    name: String,
    category: String,
    credits: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct PrerequisiteRow {
    course_id: i64,
    prerequisite_id: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct SectionRow {
    id: i64,
    course_id: i64,
    semester: String,
    year: i32,
    capacity: i32,
    meeting_days: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct CompletionRow {
    student_id: i64,
    course_id: i64,
    status: String,
}

#[derive(Debug, sqlx::FromRow)]
struct TemplateSlotRow {
    program: String,
    semester_index: i32,
    position: i32,
    course_code: String,
}

impl TemplateSlotRow {
    fn into_slot(self) -> crate::models::TemplateSlot {
        crate::models::TemplateSlot {
            program: self.program,
            semester_index: self.semester_index.max(0) as u32,
            position: self.position.max(0) as u32,
            course_code: self.course_code,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ClusterCourseRow {
    cluster_id: i64,
    course_id: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct ClusterRow {
    id: i64,
    name: String,
    position: i32,
}

impl ClusterRow {
    fn into_cluster(self, courses: Vec<i64>) -> crate::models::GenEdCluster {
        crate::models::GenEdCluster {
            id: self.id,
            name: self.name,
            position: self.position.max(0) as u32,
            courses,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ResultRow {
    student_id: i64,
    semester: String,
    year: i32,
    slot_number: i16,
    course_id: i64,
    course_code: String,
    course_name: String,
    category: String,
    credits: i32,
    cluster: Option<String>,
    section_id: i64,
    meeting_label: String,
    score: f32,
    justification: String,
    model_version: String,
    time_preference: String,
    created_at: DateTime<Utc>,
}

/// Registry rows are taken as-is where possible; unparseable optional
/// fields degrade with a warning instead of failing the whole load.
fn student_from_row(row: StudentRow) -> Student {
    let preferred_time = row.preferred_time.as_deref().and_then(|raw| {
        match raw.parse::<TimePreference>() {
            Ok(preference) => Some(preference),
            Err(_) => {
                tracing::warn!(
                    student_id = row.id,
                    value = raw,
                    "Unparseable stored time preference, ignoring"
                );
                None
            }
        }
    });

    Student {
        id: row.id,
        name: row.name,
        program: row.program,
        credits: row.credits,
        semesters_completed: row.semesters_completed.max(0) as u32,
        preferred_time,
    }
}

fn course_from_row(row: CourseRow, prerequisites: Vec<i64>) -> Course {
    let category = match row.category.parse::<CourseCategory>() {
        Ok(category) => category,
        Err(_) => {
            // Core keeps the course out of the automatic pools; it stays
            // reachable through explicit template codes only
            tracing::warn!(
                course_id = row.id,
                value = row.category,
                "Unknown course category, treating as core"
            );
            CourseCategory::Core
        }
    };

    Course {
        id: row.id,
        code: row.code,
        name: row.name,
        category,
        credits: row.credits,
        prerequisites,
    }
}

fn section_from_row(row: SectionRow) -> Option<Section> {
    let semester = match row.semester.parse::<Semester>() {
        Ok(semester) => semester,
        Err(_) => {
            tracing::warn!(
                section_id = row.id,
                value = row.semester,
                "Section has unknown semester, dropping it"
            );
            return None;
        }
    };

    let meeting = match (&row.meeting_days, &row.start_time, &row.end_time) {
        (Some(days), Some(start), Some(end)) => MeetingWindow::parse(days, start, end),
        _ => None,
    };

    Some(Section {
        id: row.id,
        course_id: row.course_id,
        term: Term::new(semester, row.year),
        capacity: row.capacity,
        meeting,
    })
}

fn completion_status_from_row(row: &CompletionRow) -> CompletionStatus {
    match row.status.parse::<CompletionStatus>() {
        Ok(status) => status,
        Err(_) => {
            // An unknown status reads as in progress: the course cannot be
            // recommended again and does not satisfy prerequisites
            tracing::warn!(
                student_id = row.student_id,
                course_id = row.course_id,
                value = row.status,
                "Unknown completion status, treating as in progress"
            );
            CompletionStatus::InProgress
        }
    }
}

fn result_from_row(row: ResultRow) -> Option<RecommendationResult> {
    let semester = match row.semester.parse::<Semester>() {
        Ok(semester) => semester,
        Err(_) => {
            tracing::warn!(
                student_id = row.student_id,
                value = row.semester,
                "Stored recommendation has unknown semester, dropping it"
            );
            return None;
        }
    };
    let category = row.category.parse().unwrap_or(CourseCategory::Core);
    let time_preference = row.time_preference.parse().unwrap_or(TimePreference::Any);

    Some(RecommendationResult {
        student_id: row.student_id,
        term: Term::new(semester, row.year),
        slot_number: row.slot_number,
        course_id: row.course_id,
        course_code: row.course_code,
        course_name: row.course_name,
        category,
        credits: row.credits,
        cluster: row.cluster,
        section_id: row.section_id,
        meeting_label: row.meeting_label,
        score: row.score,
        justification: row.justification,
        model_version: row.model_version,
        time_preference,
        created_at: row.created_at,
    })
}

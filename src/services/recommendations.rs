use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;

use crate::db::RecommendationStore;
use crate::error::{AppError, AppResult};
use crate::models::{
    RecommendationResult, SlotKind, Standing, StudentId, Term, TimePreference, MODEL_VERSION,
};
use crate::services::scheduler::{self, SchedulerConfig};

/// A slot the run could not fill, kept so callers can see why
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SkippedSlot {
    pub slot: SlotKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_code: Option<String>,
    pub reason: String,
}

/// Everything one generation run produced
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationRun {
    pub student_id: StudentId,
    pub standing: Standing,
    #[serde(flatten)]
    pub term: Term,
    pub time_preference: TimePreference,
    pub model_version: &'static str,
    pub results: Vec<RecommendationResult>,
    pub skipped: Vec<SkippedSlot>,
}

/// Generates and persists semester recommendations for one student.
///
/// Loads a snapshot of the registry, plans the five slots against it, then
/// appends the filled slots as one batch. A run with nothing to recommend
/// is still a successful run; only an unknown student, a term with no
/// offerings, or a broken prerequisite graph fails it, and a failed run
/// writes nothing.
pub async fn generate(
    store: Arc<dyn RecommendationStore>,
    config: &SchedulerConfig,
    student_id: StudentId,
    requested_preference: Option<TimePreference>,
    term: Term,
) -> AppResult<RecommendationRun> {
    let start = Instant::now();

    // 1. One consistent snapshot for the whole run
    let snapshot = store.load_snapshot().await?;

    let student = snapshot
        .student(student_id)
        .ok_or_else(|| AppError::NotFound(format!("student {} not found", student_id)))?;

    if !snapshot.term_offered(term) {
        return Err(AppError::NotFound(format!(
            "no sections offered for {}",
            term
        )));
    }

    // 2. Explicit preference wins over the stored one; default is any
    let preference = requested_preference
        .or(student.preferred_time)
        .unwrap_or_default();

    tracing::info!(
        student_id,
        program = %student.program,
        semesters_completed = student.semesters_completed,
        term = %term,
        preference = %preference,
        "Starting recommendation run"
    );

    // 3. Build the five-slot plan
    let plan = scheduler::plan(&snapshot, student, term, preference, config)?;

    let skipped: Vec<SkippedSlot> = plan
        .skipped()
        .map(|(kind, course_code, reason)| SkippedSlot {
            slot: kind,
            course_code: course_code.map(str::to_string),
            reason: reason.to_string(),
        })
        .collect();
    for slot in &skipped {
        tracing::warn!(
            student_id,
            slot = %slot.slot,
            course_code = slot.course_code.as_deref().unwrap_or("-"),
            reason = %slot.reason,
            "Slot left unfilled"
        );
    }

    // 4. Bind the filled slots to this run and persist them as one batch
    let created_at = Utc::now();
    let results = plan.into_results(student_id, term, preference, created_at);
    store.persist_results(results.clone()).await?;

    let elapsed = start.elapsed();
    tracing::info!(
        student_id,
        recommended = results.len(),
        skipped = skipped.len(),
        processing_time_ms = elapsed.as_millis(),
        "Recommendation run completed"
    );

    Ok(RecommendationRun {
        student_id,
        standing: student.standing(),
        term,
        time_preference: preference,
        model_version: MODEL_VERSION,
        results,
        skipped,
    })
}

use axum::{extract::State, Extension, Json};
use serde::Deserialize;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{Semester, StudentId, Term, TimePreference},
    routes::AppState,
    services::recommendations::{self, RecommendationRun},
};

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub student_id: StudentId,
    /// Overrides the student's stored preference for this run
    #[serde(default)]
    pub time_preference: Option<TimePreference>,
    #[serde(default)]
    pub semester: Option<Semester>,
    #[serde(default)]
    pub year: Option<i32>,
}

/// Handler for the recommendation generation endpoint
pub async fn generate(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<GenerateRequest>,
) -> AppResult<Json<RecommendationRun>> {
    // Fall back to the configured target term for anything the caller omits
    let default_term = state.config.default_target_term();
    let term = Term::new(
        request.semester.unwrap_or(default_term.semester),
        request.year.unwrap_or(default_term.year),
    );

    tracing::info!(
        request_id = %request_id,
        student_id = request.student_id,
        term = %term,
        "Processing recommendation request"
    );

    let run = recommendations::generate(
        state.store.clone(),
        &state.scheduler,
        request.student_id,
        request.time_preference,
        term,
    )
    .await?;

    tracing::info!(
        request_id = %request_id,
        student_id = request.student_id,
        recommended = run.results.len(),
        skipped = run.skipped.len(),
        "Recommendation run completed"
    );

    Ok(Json(run))
}

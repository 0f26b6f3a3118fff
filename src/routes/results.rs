use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    db::ResultFilter,
    error::AppResult,
    models::{RecommendationResult, Semester, StudentId},
    routes::AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct ResultsQuery {
    pub student_id: Option<StudentId>,
    pub semester: Option<Semester>,
    pub year: Option<i32>,
}

/// Handler for listing stored recommendation results
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ResultsQuery>,
) -> AppResult<Json<Vec<RecommendationResult>>> {
    let filter = ResultFilter {
        student_id: params.student_id,
        semester: params.semester,
        year: params.year,
    };

    let results = state.store.list_results(filter).await?;
    Ok(Json(results))
}

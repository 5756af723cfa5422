use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::catalog::Course;
use crate::plan::PlanSource;
use crate::recommend::RecommendationRequest;
use crate::types::PlannerState;

/// GET /students/:student/recommendations
///
/// Suggests catalog courses for a semester, ranked by the tags of the courses
/// the student rated. Failures degrade to an empty list.
///
/// Query parameters:
/// - `semester`: catalog semester index
/// - `category` (optional): only suggest courses of this category
pub async fn get_recommendations(
    Path(student): Path<String>,
    State(s): State<Arc<PlannerState>>,
    Query(request): Query<RecommendationRequest>,
) -> Response {
    info!(
        "GET /students/{}/recommendations (semester={}, category={:?})",
        student, request.semester, request.category
    );

    let plan = match s.plans.plan(&student) {
        Ok(plan) => plan,
        Err(e) => {
            // Planned courses must never be suggested, so without a plan there is nothing to rank.
            warn!("Failed to load plan of {}: {}", student, e);
            return (StatusCode::OK, Json(Vec::<Course>::new())).into_response();
        }
    };

    let catalog = s.catalog.get_catalog(false).await;
    let courses = s.recommender.recommend(&catalog, &plan, request);

    (StatusCode::OK, Json(courses)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::PlannedCourse;
    use crate::server::endpoints::test_support::{body_json, course, test_state};

    fn ids(body: &serde_json::Value) -> Vec<&str> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_ranked_by_liked_tags() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let mut liked = PlannedCourse::new(course("252-0027-00L", 1, 7, &[10, 11], &["Programming"]), 1);
        liked.rating = Some(4);
        state.plans.add_course("alice", &liked).unwrap();

        let response = get_recommendations(
            Path("alice".to_string()),
            State(state.clone()),
            Query(RecommendationRequest {
                semester: 11,
                category: None,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            ids(&body_json(response).await),
            vec!["252-0209-00L", "252-0057-00L", "252-0217-00L"]
        );

        let response = get_recommendations(
            Path("alice".to_string()),
            State(state),
            Query(RecommendationRequest {
                semester: 10,
                category: Some(2),
            }),
        )
        .await;
        assert_eq!(
            ids(&body_json(response).await),
            vec!["252-0209-00L", "252-0217-00L"]
        );
    }

    #[tokio::test]
    async fn test_student_without_plan_gets_catalog_order() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let response = get_recommendations(
            Path("bob".to_string()),
            State(state),
            Query(RecommendationRequest {
                semester: 10,
                category: None,
            }),
        )
        .await;
        assert_eq!(
            ids(&body_json(response).await),
            vec!["252-0027-00L", "252-0209-00L", "252-0217-00L"]
        );
    }
}

//! Plan endpoints: editing a student's plan and checking plans against the
//! graduation rules.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::plan::{PlanSource, PlannedCourse};
use crate::requirements::{CreditLedger, RequirementValidator};
use crate::server::types::ApiErrorType;
use crate::types::PlannerState;

#[derive(Debug, Deserialize)]
pub struct AddCourseBody {
    pub course_id: String,
    pub semester: u32,
    #[serde(default)]
    pub passed: bool,
    #[serde(default)]
    pub rating: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct RatingBody {
    /// `null` clears the rating
    pub rating: Option<u8>,
}

/// Course ids of a plan template, either flat or one list per semester.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CourseIds {
    Grouped(Vec<Vec<String>>),
    Flat(Vec<String>),
}

impl CourseIds {
    fn into_groups(self) -> Vec<Vec<String>> {
        match self {
            CourseIds::Grouped(groups) => groups,
            CourseIds::Flat(ids) => vec![ids],
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ValidateBody {
    pub courses: CourseIds,
}

/// Builds the body shared by both validation endpoints.
fn validation_body(validator: &RequirementValidator, ledger: &CreditLedger) -> Value {
    let validation = validator.validate(ledger);
    json!({
        "passed": validation.is_pass(),
        "message": validation.message(),
        "violation": validation.violation(),
        "progress": validator.progress(ledger),
    })
}

/// POST /students/:student/courses
///
/// Adds a catalog course to the student's plan.
pub async fn post_add_course(
    Path(student): Path<String>,
    State(s): State<Arc<PlannerState>>,
    Json(body): Json<AddCourseBody>,
) -> Response {
    info!(
        "POST /students/{}/courses (course_id={}, semester={})",
        student, body.course_id, body.semester
    );

    let catalog = s.catalog.get_catalog(false).await;
    let Some(course) = catalog.into_iter().find(|c| c.id == body.course_id) else {
        return ApiErrorType::from((
            StatusCode::NOT_FOUND,
            "Course not in catalog",
            Some(body.course_id),
        ))
        .into_response();
    };

    let mut planned = PlannedCourse::new(course, body.semester);
    planned.passed = body.passed;
    if let Err(e) = planned.rate(body.rating) {
        return ApiErrorType::from(e).into_response();
    }

    match s.plans.add_course(&student, &planned) {
        Ok(()) => (StatusCode::CREATED, Json(planned)).into_response(),
        Err(e) => {
            error!("Failed to add {} to plan of {}: {}", body.course_id, student, e);
            ApiErrorType::from(e).into_response()
        }
    }
}

/// DELETE /students/:student/courses/:course
pub async fn delete_course(
    Path((student, course_id)): Path<(String, String)>,
    State(s): State<Arc<PlannerState>>,
) -> Response {
    info!("DELETE /students/{}/courses/{}", student, course_id);

    match s.plans.remove_course(&student, &course_id) {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => ApiErrorType::from((
            StatusCode::NOT_FOUND,
            "Course not in plan",
            Some(course_id),
        ))
        .into_response(),
        Err(e) => {
            error!("Failed to remove {} from plan of {}: {}", course_id, student, e);
            ApiErrorType::from(e).into_response()
        }
    }
}

/// PUT /students/:student/courses/:course/rating
pub async fn put_rating(
    Path((student, course_id)): Path<(String, String)>,
    State(s): State<Arc<PlannerState>>,
    Json(body): Json<RatingBody>,
) -> Response {
    info!(
        "PUT /students/{}/courses/{}/rating (rating={:?})",
        student, course_id, body.rating
    );

    match s.plans.set_rating(&student, &course_id, body.rating) {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "course_id": course_id, "rating": body.rating })),
        )
            .into_response(),
        Err(e) => {
            warn!("Failed to rate {} for {}: {}", course_id, student, e);
            ApiErrorType::from(e).into_response()
        }
    }
}

/// GET /students/:student/validation
///
/// Checks the student's plan against the graduation rules.
pub async fn get_validation(
    Path(student): Path<String>,
    State(s): State<Arc<PlannerState>>,
) -> Response {
    info!("GET /students/{}/validation", student);

    match s.plans.plan(&student) {
        Ok(plan) => {
            let ledger = CreditLedger::from_courses(plan.catalog_courses());
            (StatusCode::OK, Json(validation_body(&s.validator, &ledger))).into_response()
        }
        Err(e) => {
            error!("Failed to load plan of {}: {}", student, e);
            ApiErrorType::from(e).into_response()
        }
    }
}

/// POST /validate
///
/// Checks a plan template given as course ids. Ids the catalog does not know
/// are reported under `unknown` and do not count.
pub async fn post_validate(
    State(s): State<Arc<PlannerState>>,
    Json(body): Json<ValidateBody>,
) -> Response {
    let groups = body.courses.into_groups();
    info!("POST /validate ({} groups)", groups.len());

    let resolved = s.catalog.resolve_groups_or_fetch(&groups).await;
    let known: HashSet<&str> = resolved.iter().flatten().map(|c| c.id.as_str()).collect();
    let unknown: Vec<&String> = groups
        .iter()
        .flatten()
        .filter(|id| !known.contains(id.as_str()))
        .collect();

    let ledger = CreditLedger::from_groups(&resolved);
    let mut response = validation_body(&s.validator, &ledger);
    response["unknown"] = json!(unknown);

    (StatusCode::OK, Json(response)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::endpoints::test_support::{body_json, test_state};

    fn add_body(course_id: &str, semester: u32, rating: Option<u8>) -> Json<AddCourseBody> {
        Json(AddCourseBody {
            course_id: course_id.to_string(),
            semester,
            passed: false,
            rating,
        })
    }

    #[tokio::test]
    async fn test_add_rate_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let response = post_add_course(
            Path("alice".to_string()),
            State(state.clone()),
            add_body("252-0057-00L", 2, None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["course"]["credits"], 7);

        let response = put_rating(
            Path(("alice".to_string(), "252-0057-00L".to_string())),
            State(state.clone()),
            Json(RatingBody { rating: Some(3) }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.plans.plan("alice").unwrap().courses[0].rating, Some(3));

        let response = delete_course(
            Path(("alice".to_string(), "252-0057-00L".to_string())),
            State(state.clone()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = delete_course(
            Path(("alice".to_string(), "252-0057-00L".to_string())),
            State(state),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_add_rejects_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let response = post_add_course(
            Path("alice".to_string()),
            State(state.clone()),
            add_body("999-9999-99L", 1, None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Course not in catalog");

        let response = post_add_course(
            Path("alice".to_string()),
            State(state.clone()),
            add_body("252-0057-00L", 1, Some(5)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(state.plans.plan("alice").unwrap().is_empty());

        let response = put_rating(
            Path(("alice".to_string(), "252-0057-00L".to_string())),
            State(state),
            Json(RatingBody { rating: Some(1) }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_student_validation_reports_first_violation() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        post_add_course(
            Path("alice".to_string()),
            State(state.clone()),
            add_body("252-0027-00L", 1, None),
        )
        .await;

        let body = body_json(get_validation(Path("alice".to_string()), State(state)).await).await;
        assert_eq!(body["passed"], false);
        assert_eq!(body["violation"]["rule"], "missing_category_credits");
        assert_eq!(body["violation"]["category_id"], 0);
        assert_eq!(body["progress"].as_array().unwrap().len(), 8);
        assert_eq!(body["progress"][1]["planned"], 7);
    }

    #[tokio::test]
    async fn test_validate_template() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let body: ValidateBody = serde_json::from_value(json!({
            "courses": [["252-0027-00L"], ["252-0209-00L", "252-0217-00L"]]
        }))
        .unwrap();
        let body = body_json(post_validate(State(state), Json(body)).await).await;

        assert_eq!(body["passed"], false);
        assert_eq!(body["progress"][2]["planned"], 16);
        assert_eq!(body["unknown"], json!([]));
    }

    #[test]
    fn test_flat_and_grouped_ids() {
        let flat: ValidateBody = serde_json::from_value(json!({ "courses": ["a", "b"] })).unwrap();
        assert_eq!(flat.courses.into_groups(), vec![vec!["a".to_string(), "b".to_string()]]);

        let grouped: ValidateBody = serde_json::from_value(json!({ "courses": [["a"], []] })).unwrap();
        assert_eq!(grouped.courses.into_groups().len(), 2);
    }
}

use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::server::endpoints::{catalog, plan, recommendations};
use crate::types::PlannerState;

mod endpoints;
mod types;

pub use types::ApiErrorType;

/// Creates a router that can be used by `axum`.
///
/// # Parameters
/// - `app_state`: The app server state.
///
/// # Returns
/// The router.
pub fn create_router(app_state: Arc<PlannerState>) -> Router {
    let catalog_router = Router::new()
        .route("/catalog", get(catalog::get_catalog))
        .route("/catalog/cache_stats", get(catalog::get_cache_stats))
        .route("/semesters", get(catalog::get_semesters));

    // Routes scoped to one student's plan
    let student_router = Router::new()
        .route(
            "/:student/recommendations",
            get(recommendations::get_recommendations),
        )
        .route("/:student/validation", get(plan::get_validation))
        .route("/:student/courses", post(plan::post_add_course))
        .route("/:student/courses/:course", delete(plan::delete_course))
        .route("/:student/courses/:course/rating", put(plan::put_rating));

    Router::new()
        .merge(catalog_router)
        .nest("/students", student_router)
        .route("/validate", post(plan::post_validate))
        .with_state(app_state)
}

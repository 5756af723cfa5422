//! Catalog endpoints: the course list, cache statistics and semester codes.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::catalog::SemesterCode;
use crate::types::PlannerState;

/// Number of semesters listed by `/semesters` unless asked otherwise.
const DEFAULT_SEMESTER_COUNT: usize = 5;

#[derive(Debug, Deserialize)]
pub struct CatalogQueryParams {
    /// If true, bypass the freshness check and refetch the catalog
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Deserialize)]
pub struct SemesterQueryParams {
    pub count: Option<usize>,
}

/// GET /catalog
///
/// Returns the course catalog, served from the local cache when it is fresh.
pub async fn get_catalog(
    State(s): State<Arc<PlannerState>>,
    Query(params): Query<CatalogQueryParams>,
) -> Response {
    info!("GET /catalog (refresh={})", params.refresh);

    let courses = s.catalog.get_catalog(params.refresh).await;
    (StatusCode::OK, Json(courses)).into_response()
}

/// GET /catalog/cache_stats
///
/// Returns cache statistics for monitoring.
pub async fn get_cache_stats(State(s): State<Arc<PlannerState>>) -> Response {
    (StatusCode::OK, Json(s.catalog.stats())).into_response()
}

/// GET /semesters
///
/// Lists the current semester and the ones before it, newest first.
pub async fn get_semesters(Query(params): Query<SemesterQueryParams>) -> Response {
    let count = params.count.unwrap_or(DEFAULT_SEMESTER_COUNT);
    info!("GET /semesters (count={})", count);

    let semesters: Vec<_> = SemesterCode::recent(Utc::now().date_naive(), count)
        .into_iter()
        .map(|code| {
            json!({
                "code": code,
                "index": code.index(),
            })
        })
        .collect();

    (StatusCode::OK, Json(semesters)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::endpoints::test_support::{body_json, test_state};

    #[tokio::test]
    async fn test_catalog_served_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let response = get_catalog(State(state), Query(CatalogQueryParams { refresh: false })).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let ids: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_str().unwrap())
            .collect();
        assert_eq!(
            ids,
            vec!["252-0027-00L", "252-0057-00L", "252-0209-00L", "252-0217-00L"]
        );
    }

    #[tokio::test]
    async fn test_cache_stats() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let body = body_json(get_cache_stats(State(state)).await).await;
        assert_eq!(body["courses"], 4);
        assert_ne!(body["size"], "File does not exist");
    }

    #[tokio::test]
    async fn test_semesters() {
        let body = body_json(get_semesters(Query(SemesterQueryParams { count: Some(3) })).await).await;
        let semesters = body.as_array().unwrap();
        assert_eq!(semesters.len(), 3);

        let newest = semesters[0]["index"].as_i64().unwrap();
        let oldest = semesters[2]["index"].as_i64().unwrap();
        assert_eq!(newest - oldest, 2);
        assert!(semesters[0]["code"].as_str().unwrap().len() == 4);
    }
}

pub mod catalog;
pub mod plan;
pub mod recommendations;

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::response::Response;
    use chrono::Utc;
    use serde_json::Value;

    use crate::catalog::{CatalogCache, CatalogSnapshot, Course, HttpCatalogSource};
    use crate::config::{CatalogEndpoints, PlannerConfig};
    use crate::db::PlanDbManager;
    use crate::types::PlannerState;

    pub fn course(id: &str, category: u32, credits: u32, semesters: &[i32], tags: &[&str]) -> Course {
        Course {
            id: id.to_string(),
            category,
            credits,
            name: format!("Course {id}"),
            semesters: semesters.to_vec(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            vvz: String::new(),
        }
    }

    /// State over a pre-filled, freshly checked catalog cache, so no request
    /// ever reaches the (unreachable) remote.
    pub fn test_state(dir: &Path) -> Arc<PlannerState> {
        let config = PlannerConfig::default();
        let endpoints = CatalogEndpoints {
            catalog_url: "http://127.0.0.1:9/courses".to_string(),
            last_updated_url: "http://127.0.0.1:9/general/lastCourseUpdate".to_string(),
        };
        let source = HttpCatalogSource::new(&endpoints).unwrap();
        let cache = CatalogCache::with_check_interval(dir, source, Duration::from_secs(3600));
        cache
            .store(&CatalogSnapshot {
                courses: vec![
                    course("252-0027-00L", 1, 7, &[10, 11], &["Programming"]),
                    course("252-0057-00L", 1, 7, &[11], &["Theory"]),
                    course("252-0209-00L", 2, 8, &[10, 11], &["Programming", "Systems"]),
                    course("252-0217-00L", 2, 8, &[], &["Theory"]),
                ],
                last_remote_update: Some(Utc::now()),
                last_checked_at: Some(Utc::now()),
            })
            .unwrap();

        let plans = PlanDbManager::open_in_memory().unwrap();
        Arc::new(PlannerState::new(&config, cache, plans))
    }

    pub async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
